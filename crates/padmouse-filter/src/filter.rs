use std::sync::Arc;

use crossbeam_channel::Receiver;
use padmouse_bit_mask::Bitable;
use padmouse_input::{Axis, DeviceId, DeviceIdentity, PointerCoords, RawEvent};
use padmouse_profile::{Method, ProfileTable, Synth};
use smallvec::SmallVec;

use crate::bridge::{Collaborators, CursorInputMapper, PointerController};
use crate::classifier;
use crate::registry::DeviceRegistry;
use crate::verdict::{SynthesizedEvent, Verdict};
use crate::virtual_mouse::{
    ChannelBackend, Handle, ModeSwitch, VirtualMouse, VirtualMouseBackend,
};
use crate::{EventFilter, FilterError};

/// Profile-driven filter context, owned by the host event thread.
#[derive(Debug)]
pub struct InputFilter {
    table: Arc<ProfileTable>,
    registry: DeviceRegistry,
    mouse: VirtualMouse,
    collaborators: Collaborators,
    pointer: PointerCoords,
}

impl InputFilter {
    pub fn new(table: Arc<ProfileTable>) -> Self {
        Self::with_backend(table, Box::new(ChannelBackend::default()))
    }

    pub fn with_backend(table: Arc<ProfileTable>, backend: Box<dyn VirtualMouseBackend>) -> Self {
        Self {
            registry: DeviceRegistry::new(Arc::clone(&table)),
            table,
            mouse: VirtualMouse::new(backend, ModeSwitch::new()),
            collaborators: Collaborators::default(),
            pointer: PointerCoords::default(),
        }
    }

    pub fn table(&self) -> &ProfileTable {
        &self.table
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Handle for flipping volume mode from another thread.
    pub fn mode_switch(&self) -> ModeSwitch {
        self.mouse.modes().clone()
    }

    /// Last pointer position reported for the virtual device.
    pub fn pointer_position(&self) -> PointerCoords {
        self.pointer
    }

    /// Forward everything from `id` untouched. Returns `false` for unknown ids.
    pub fn set_device_passthrough(&mut self, id: DeviceId, enable: bool) -> bool {
        let Some(state) = self.registry.state_mut(id) else {
            return false;
        };
        state.passthrough = enable;
        log::debug!("device {id} passthrough {enable}");
        true
    }

    /// Drop all synthesis bookkeeping, used when the virtual mouse goes away.
    fn reset_synthesis(&mut self) {
        for state in self.registry.physical_states_mut() {
            state.pressed.clear();
            state.held_keys.clear();
            for axis in Axis::ALL {
                let ax = state.axis_mut(*axis);
                ax.unlatch(0);
                ax.unlatch(1);
            }
        }
    }

    /// Stop repeating a rocker key the window did not take.
    fn cancel_rocker_repeat(&mut self, key_code: u16) -> bool {
        let key = Some(Synth::key(key_code));
        let mut cancelled = false;
        for state in self.registry.physical_states_mut() {
            let profile = self.table.profile(state.class());
            for axis in Axis::ALL {
                for (slot, mapping) in profile.axis_slots(*axis).iter().enumerate() {
                    let Some(mapping) = mapping else {
                        continue;
                    };
                    if mapping.method != Method::Rocker || mapping.synth != key {
                        continue;
                    }
                    let ax = state.axis_mut(*axis);
                    if ax.latched[slot] && !ax.repeat_cancelled[slot] {
                        ax.repeat_cancelled[slot] = true;
                        cancelled = true;
                    }
                }
            }
        }
        cancelled
    }
}

impl EventFilter for InputFilter {
    fn filter_new_device(&mut self, fd: i32, id: DeviceId, path: &str, identity: DeviceIdentity) {
        self.registry.add(fd, id, path, identity);
    }

    fn filter_close_device(&mut self, id: DeviceId) {
        self.registry.remove(id);
    }

    fn filter_event(&mut self, event: RawEvent, device: DeviceId) -> Verdict {
        let modes = self.mouse.modes().load();
        let Some(state) = self.registry.state_mut(device) else {
            return Verdict::default();
        };
        let profile = self.table.profile(state.class());
        let outcome = classifier::classify(profile, state, event, modes);

        let target = self.registry.virtual_id();
        let synthesized: SmallVec<[SynthesizedEvent; 2]> = outcome
            .events
            .iter()
            .map(|event| SynthesizedEvent {
                device: target,
                source: device,
                event: *event,
            })
            .collect();
        self.mouse.emit(&synthesized);
        if outcome.hide {
            self.collaborators.fade();
        }
        Verdict {
            original: outcome.original,
            synthesized,
        }
    }

    fn notify_key_state(&mut self, device: DeviceId, key_code: u16, handled: bool) -> bool {
        if self.registry.is_virtual(device) {
            return !handled && self.cancel_rocker_repeat(key_code);
        }
        let Some(state) = self.registry.state_mut(device) else {
            return false;
        };
        let profile = self.table.profile(state.class());
        let Some(mapping) = profile
            .button_for_code(key_code)
            .and_then(|b| profile.button_mapping(b))
        else {
            return false;
        };

        let mut changed = false;
        if mapping.pass_thru && mapping.synthesizes() && state.native_input != handled {
            state.native_input = handled;
            changed = true;
            log::debug!("device {device} native input {handled}");
        }
        if mapping.hide_mouse && handled {
            self.collaborators.fade();
        }
        changed
    }

    fn notify_motion_state(
        &mut self,
        device: DeviceId,
        coords: PointerCoords,
        handled: bool,
    ) -> bool {
        if self.registry.is_virtual(device) {
            self.pointer = coords;
            self.collaborators.activate();
        } else if handled && self.registry.contains(device) {
            self.collaborators.fade();
        }
        false
    }

    fn notify_cursor_pointer_fade(&mut self) {
        self.collaborators.force_fade();
    }

    fn set_volume_mode_state(&mut self, enable: bool) {
        if self.mouse.modes().set_volume_mode(enable) != enable {
            log::info!("volume mode {}", if enable { "on" } else { "off" });
        }
    }

    fn set_virtual_mouse_state(&mut self, enable: bool) -> Result<(), FilterError> {
        let was = self.mouse.is_enabled();
        self.mouse.set_enabled(enable, self.table.capabilities())?;
        if was && !enable {
            self.reset_synthesis();
        }
        Ok(())
    }

    fn mouse_fd(&self) -> Handle {
        self.mouse.handle()
    }

    fn mouse_events(&self) -> Option<Receiver<SynthesizedEvent>> {
        self.mouse.events()
    }

    fn register_virtual_mouse_device(&mut self, id: DeviceId) {
        log::debug!("virtual mouse bound to device {id}");
        self.registry.bind_virtual(id);
    }

    fn register_pointer_controller(&mut self, controller: Arc<dyn PointerController>) {
        self.collaborators.set_pointer(controller);
    }

    fn register_cursor_input_mapper(&mut self, mapper: Arc<dyn CursorInputMapper>, device: DeviceId) {
        self.collaborators.set_cursor(mapper, device);
    }

    fn set_virtual_mouse_bitmasks(&self, key_bits: &mut [u8], rel_bits: &mut [u8]) {
        self.table.capabilities().write_bitmasks(key_bits, rel_bits);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use padmouse_input::codes::*;
    use padmouse_input::DeviceClass;
    use padmouse_profile::VIRTUAL_MOUSE_NAME;

    use super::*;
    use crate::bridge::tests::{CountingPointer, LastDevice};
    use crate::verdict::Response;
    use crate::INVALID_HANDLE;

    const PAD: DeviceId = 4;
    const NV: DeviceId = 5;
    const MOUSE: DeviceId = 9;

    fn filter() -> InputFilter {
        let mut f = InputFilter::new(ProfileTable::builtin().unwrap().into_shared());
        f.filter_new_device(20, PAD, "/dev/input/event4", xbox());
        f.filter_new_device(
            21,
            NV,
            "/dev/input/event5",
            DeviceIdentity::new("NVIDIA Controller v01.04", 0x0955, 0x7214),
        );
        f.register_virtual_mouse_device(MOUSE);
        f.filter_new_device(
            22,
            MOUSE,
            "/dev/input/event9",
            DeviceIdentity::new(VIRTUAL_MOUSE_NAME, 0, 0),
        );
        f.set_virtual_mouse_state(true).unwrap();
        f
    }

    fn xbox() -> DeviceIdentity {
        DeviceIdentity::new("Xbox Wireless Controller", 0x045e, 0x0b12)
    }

    #[test]
    fn synthesized_events_reach_the_queue() {
        let mut f = filter();
        let rx = f.mouse_events().unwrap();
        let verdict = f.filter_event(RawEvent::key(BTN_SOUTH, 1), PAD);
        assert_eq!(verdict.response(), Response::Add);
        let queued = rx.try_recv().unwrap();
        assert_eq!(queued.event, RawEvent::key(BTN_LEFT, 1));
        assert_eq!(queued.device, Some(MOUSE));
        assert_eq!(queued.source, PAD);
    }

    #[test]
    fn virtual_device_events_are_not_filtered() {
        let mut f = filter();
        assert_eq!(f.registry().classify(MOUSE), DeviceClass::VirtualMouse);
        assert!(f.filter_event(RawEvent::rel(REL_X, 4), MOUSE).is_default());
        assert!(f.filter_event(RawEvent::key(BTN_LEFT, 1), MOUSE).is_default());
    }

    #[test]
    fn unhandled_rocker_key_cancels_repeat() {
        let mut f = filter();
        f.set_volume_mode_state(true);
        let press = f.filter_event(RawEvent::abs(ABS_HAT0Y, -1), NV);
        assert_eq!(press.synthesized[0].event, RawEvent::key(KEY_VOLUMEUP, 1));

        assert!(!f.notify_key_state(MOUSE, KEY_VOLUMEUP, true));
        assert!(f.notify_key_state(MOUSE, KEY_VOLUMEUP, false));
        assert!(!f.notify_key_state(MOUSE, KEY_VOLUMEUP, false));

        let held = f.filter_event(RawEvent::abs(ABS_HAT0Y, -1), NV);
        assert!(held.synthesized.is_empty());
        assert_eq!(held.original, Response::Skip);

        let released = f.filter_event(RawEvent::abs(ABS_HAT0Y, 0), NV);
        assert_eq!(released.synthesized[0].event, RawEvent::key(KEY_VOLUMEUP, 0));
        let pressed = f.filter_event(RawEvent::abs(ABS_HAT0Y, -1), NV);
        assert_eq!(pressed.synthesized[0].event, RawEvent::key(KEY_VOLUMEUP, 1));
    }

    #[test]
    fn volume_rocker_needs_volume_mode() {
        let mut f = filter();
        let verdict = f.filter_event(RawEvent::abs(ABS_HAT0Y, -1), NV);
        assert!(verdict.is_default());

        f.mode_switch().set_volume_mode(true);
        let verdict = f.filter_event(RawEvent::abs(ABS_HAT0Y, -1), NV);
        assert_eq!(verdict.response(), Response::Add);
    }

    #[test]
    fn native_input_follows_handled_for_synthesizing_pass_thru() {
        let table = ProfileTable::builder()
            .layout(
                DeviceClass::Controller,
                padmouse_profile::xpad_layout(),
            )
            .rule(padmouse_profile::ClassRule::vendor(0x045e, DeviceClass::Controller))
            .button(
                padmouse_input::Button::A,
                padmouse_profile::ButtonMapping::click(BTN_LEFT)
                    .pass_thru()
                    .on(&[DeviceClass::Controller]),
            )
            .build()
            .unwrap();
        let mut f = InputFilter::new(table.into_shared());
        f.filter_new_device(20, PAD, "/dev/input/event4", xbox());
        f.set_virtual_mouse_state(true).unwrap();

        assert!(f.notify_key_state(PAD, BTN_SOUTH, true));
        assert!(!f.notify_key_state(PAD, BTN_SOUTH, true));
        let verdict = f.filter_event(RawEvent::key(BTN_SOUTH, 1), PAD);
        assert_eq!(verdict.response(), Response::Process);

        assert!(f.notify_key_state(PAD, BTN_SOUTH, false));
        let verdict = f.filter_event(RawEvent::key(BTN_SOUTH, 1), PAD);
        assert_eq!(verdict.response(), Response::Add);
    }

    #[test]
    fn plain_pass_thru_keys_do_not_toggle_native_input() {
        let mut f = filter();
        assert!(!f.notify_key_state(PAD, BTN_EAST, true));
        assert!(!f.notify_key_state(PAD, KEY_ENTER, true));
        assert!(!f.notify_key_state(77, BTN_EAST, true));
    }

    #[test]
    fn hide_mouse_mappings_fade_the_cursor() {
        let mut f = filter();
        let pointer = Arc::new(CountingPointer::default());
        f.register_pointer_controller(pointer.clone());

        f.filter_event(RawEvent::key(BTN_EAST, 1), PAD);
        assert_eq!(pointer.fades.load(Ordering::Relaxed), 1);

        f.notify_motion_state(MOUSE, PointerCoords { x: 3.0, y: 4.0 }, true);
        assert_eq!(pointer.unfades.load(Ordering::Relaxed), 1);

        f.notify_key_state(PAD, BTN_EAST, true);
        assert_eq!(pointer.fades.load(Ordering::Relaxed), 2);

        f.notify_cursor_pointer_fade();
        assert_eq!(pointer.fades.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn virtual_motion_reports_active_device() {
        let mut f = filter();
        let mapper = Arc::new(LastDevice::default());
        f.register_cursor_input_mapper(mapper.clone(), MOUSE);
        let coords = PointerCoords { x: 10.0, y: 20.0 };
        assert!(!f.notify_motion_state(MOUSE, coords, true));
        assert_eq!(mapper.0.load(Ordering::Relaxed), MOUSE);
        assert_eq!(f.pointer_position(), coords);
        assert!(!f.notify_motion_state(77, coords, true));
    }

    #[test]
    fn physical_motion_consumed_by_window_fades() {
        let mut f = filter();
        let pointer = Arc::new(CountingPointer::default());
        f.register_pointer_controller(pointer.clone());
        assert!(!f.notify_motion_state(PAD, PointerCoords::default(), false));
        assert_eq!(pointer.fades.load(Ordering::Relaxed), 0);
        assert!(!f.notify_motion_state(PAD, PointerCoords::default(), true));
        assert_eq!(pointer.fades.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn disabling_resets_synthesis_state() {
        let mut f = filter();
        f.filter_event(RawEvent::key(BTN_SOUTH, 1), PAD);
        f.filter_event(RawEvent::abs(ABS_Z, 255), PAD);
        f.set_virtual_mouse_state(false).unwrap();
        assert_eq!(f.mouse_fd(), INVALID_HANDLE);
        let state = f.registry().state(PAD).unwrap();
        assert!(!state.any_latched());
        assert!(!state.is_pressed(padmouse_input::Button::A));
        assert!(!state.is_key_held(BTN_LEFT));

        let verdict = f.filter_event(RawEvent::key(BTN_SOUTH, 0), PAD);
        assert!(verdict.is_default());
    }

    fn synthesized(f: &mut InputFilter, event: RawEvent) -> Vec<RawEvent> {
        f.filter_event(event, PAD)
            .synthesized
            .iter()
            .map(|s| s.event)
            .collect()
    }

    #[test]
    fn shared_mouse_button_waits_for_last_release() {
        let mut f = filter();
        // A and the right trigger both click BTN_LEFT.
        assert_eq!(
            synthesized(&mut f, RawEvent::key(BTN_SOUTH, 1)),
            vec![RawEvent::key(BTN_LEFT, 1)]
        );
        assert!(synthesized(&mut f, RawEvent::abs(ABS_RZ, 255)).is_empty());
        assert!(synthesized(&mut f, RawEvent::key(BTN_SOUTH, 0)).is_empty());
        assert!(f.registry().state(PAD).unwrap().is_key_held(BTN_LEFT));
        assert_eq!(
            synthesized(&mut f, RawEvent::abs(ABS_RZ, 0)),
            vec![RawEvent::key(BTN_LEFT, 0)]
        );

        // Same the other way round.
        assert_eq!(
            synthesized(&mut f, RawEvent::abs(ABS_RZ, 255)),
            vec![RawEvent::key(BTN_LEFT, 1)]
        );
        assert!(synthesized(&mut f, RawEvent::key(BTN_SOUTH, 1)).is_empty());
        assert!(synthesized(&mut f, RawEvent::abs(ABS_RZ, 0)).is_empty());
        assert_eq!(
            synthesized(&mut f, RawEvent::key(BTN_SOUTH, 0)),
            vec![RawEvent::key(BTN_LEFT, 0)]
        );
        assert!(!f.registry().state(PAD).unwrap().is_key_held(BTN_LEFT));
    }

    fn travel(f: &mut InputFilter, raw: i32) -> i32 {
        let mut total = 0;
        for _ in 0..10 {
            total += synthesized(f, RawEvent::abs(ABS_X, raw))
                .iter()
                .map(|e| e.value)
                .sum::<i32>();
        }
        synthesized(f, RawEvent::abs(ABS_X, 0));
        total
    }

    #[test]
    fn light_deflection_moves_slower() {
        let mut f = filter();
        // Just past the 0.15 threshold, then a bit further.
        let light = travel(&mut f, 5571);
        let firm = travel(&mut f, 6226);
        assert_eq!(light, 4);
        assert_eq!(firm, 9);
    }

    #[test]
    fn passthrough_toggle_bypasses_device() {
        let mut f = filter();
        assert!(f.set_device_passthrough(PAD, true));
        assert!(f.filter_event(RawEvent::key(BTN_SOUTH, 1), PAD).is_default());
        assert!(!f.set_device_passthrough(77, true));
    }

    #[test]
    fn bitmasks_match_table() {
        let f = filter();
        let mut keys = [0u8; KEY_BITMASK_BYTES];
        let mut rels = [0u8; REL_BITMASK_BYTES];
        f.set_virtual_mouse_bitmasks(&mut keys, &mut rels);
        for &code in f.table().capabilities().keys() {
            assert!(padmouse_profile::test_bit(&keys, code));
        }
        assert!(padmouse_profile::test_bit(&rels, REL_WHEEL));
    }
}
