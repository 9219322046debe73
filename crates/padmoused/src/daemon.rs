use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use crossbeam_channel::{never, select, unbounded, Receiver};
use padmouse_control::{ControlError, Injector};
use padmouse_filter::{EventFilter, InputFilter, StubFilter, SynthesizedEvent, INVALID_HANDLE};
use padmouse_gamepad::{GamepadRuntime, HostEvent};
use padmouse_input::codes::{BUS_VIRTUAL, KEY_BITMASK_BYTES, REL_BITMASK_BYTES, REL_X, REL_Y};
use padmouse_input::{DeviceId, DeviceIdentity, EventKind, PointerCoords, RawEvent};
use padmouse_profile::VIRTUAL_MOUSE_NAME;
use thiserror::Error;

use crate::api::{ApiError, ApiTransport, Command, UnixSocket};
use crate::config::{Config, ConfigError, FilterSettings};
use crate::pointer::CursorTracker;
use crate::{print_debug, print_error, print_info, print_warning};

/// Id the virtual pointer is registered under. SDL instance ids never
/// reach it.
pub(crate) const VIRTUAL_DEVICE_ID: DeviceId = i32::MAX;

#[derive(Debug, Error)]
pub(crate) enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("gamepad runtime: {0}")]
    Gamepad(#[from] padmouse_gamepad::Error),
    #[error("control api: {0}")]
    Api(#[from] ApiError),
    #[error(transparent)]
    Control(#[from] ControlError),
}

/// Final stage for synthesized events.
pub(crate) trait Delivery {
    /// Returns whether the desktop accepted the event.
    fn deliver(&mut self, event: RawEvent) -> bool;
}

impl Delivery for Injector {
    fn deliver(&mut self, event: RawEvent) -> bool {
        match self.inject(event) {
            Ok(()) => true,
            Err(e) => {
                print_warning!("failed to inject {event:?}: {e}");
                false
            }
        }
    }
}

/// Event-thread state: the filter, its collaborators and the delivery sink.
pub(crate) struct EventLoop<D> {
    filter: Box<dyn EventFilter>,
    delivery: D,
    cursor: Arc<CursorTracker>,
    pointer: PointerCoords,
    mouse_rx: Receiver<SynthesizedEvent>,
}

impl<D: Delivery> EventLoop<D> {
    pub(crate) fn new(mut filter: Box<dyn EventFilter>, delivery: D, settings: FilterSettings) -> Self {
        let cursor = Arc::new(CursorTracker::default());
        filter.register_pointer_controller(cursor.clone());
        filter.register_cursor_input_mapper(cursor.clone(), VIRTUAL_DEVICE_ID);
        filter.set_volume_mode_state(settings.volume_mode);

        let mut event_loop = Self {
            filter,
            delivery,
            cursor,
            pointer: PointerCoords::default(),
            mouse_rx: never(),
        };
        if settings.virtual_mouse {
            event_loop.set_virtual_mouse(true);
        }
        event_loop
    }

    #[cfg(test)]
    pub(crate) fn filter(&self) -> &dyn EventFilter {
        self.filter.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn cursor(&self) -> &CursorTracker {
        &self.cursor
    }

    pub(crate) fn mouse_events(&self) -> Receiver<SynthesizedEvent> {
        self.mouse_rx.clone()
    }

    fn set_virtual_mouse(&mut self, enable: bool) {
        if let Err(e) = self.filter.set_virtual_mouse_state(enable) {
            print_error!("{e}");
        }
        let handle = self.filter.mouse_fd();
        if handle != INVALID_HANDLE {
            let mut keys = [0u8; KEY_BITMASK_BYTES];
            let mut rels = [0u8; REL_BITMASK_BYTES];
            self.filter.set_virtual_mouse_bitmasks(&mut keys, &mut rels);
            let key_count: u32 = keys.iter().map(|b| b.count_ones()).sum();
            print_debug!("virtual mouse advertises {key_count} keys");

            self.filter.register_virtual_mouse_device(VIRTUAL_DEVICE_ID);
            let identity = DeviceIdentity::new(VIRTUAL_MOUSE_NAME, 0, 0).with_bus(BUS_VIRTUAL);
            self.filter
                .filter_new_device(handle, VIRTUAL_DEVICE_ID, "virtual", identity);
        } else {
            self.filter.filter_close_device(VIRTUAL_DEVICE_ID);
        }
        self.mouse_rx = self.filter.mouse_events().unwrap_or_else(never);
    }

    pub(crate) fn handle_host(&mut self, event: HostEvent) {
        match event {
            HostEvent::Added {
                fd,
                id,
                path,
                identity,
            } => {
                print_info!("device connected: {}", identity.name);
                self.filter.filter_new_device(fd, id, &path, identity);
            }
            HostEvent::Removed(id) => {
                print_info!("device {id} disconnected");
                self.filter.filter_close_device(id);
            }
            HostEvent::Input { id, event } => {
                let verdict = self.filter.filter_event(event, id);
                if !verdict.is_default() {
                    print_debug!("{id}: {event:?} -> {:?}", verdict.response());
                }
                self.drain();
            }
        }
    }

    pub(crate) fn handle_command(&mut self, command: Command) {
        match command {
            Command::SetVirtualMouse(enable) => self.set_virtual_mouse(enable),
            Command::SetVolumeMode(enable) => self.filter.set_volume_mode_state(enable),
            Command::Fade => self.filter.notify_cursor_pointer_fade(),
        }
    }

    /// Deliver everything queued so far.
    pub(crate) fn drain(&mut self) {
        let rx = self.mouse_rx.clone();
        for event in rx.try_iter() {
            self.deliver(event);
        }
    }

    /// Deliver one synthesized event and report the outcome back.
    pub(crate) fn deliver(&mut self, synthesized: SynthesizedEvent) {
        let event = synthesized.event;
        let handled = self.delivery.deliver(event);
        let device = synthesized.device.unwrap_or(VIRTUAL_DEVICE_ID);
        match event.kind {
            EventKind::Key => {
                self.filter.notify_key_state(device, event.code, handled);
            }
            EventKind::Rel if matches!(event.code, REL_X | REL_Y) => {
                if event.code == REL_X {
                    self.pointer.x += event.value as f32;
                } else {
                    self.pointer.y += event.value as f32;
                }
                self.filter.notify_motion_state(device, self.pointer, handled);
            }
            _ => {}
        }
    }
}

/// Run the daemon until `stop` fires or the gamepad runtime goes away.
pub(crate) fn run(
    config: &Config,
    stub: bool,
    runtime_dir: &Path,
    stop: &Receiver<()>,
) -> Result<(), DaemonError> {
    let table = config.profile_table()?.into_shared();
    let filter: Box<dyn EventFilter> = if stub || !config.filter.enabled {
        print_info!("filter disabled, events pass through untouched");
        Box::new(StubFilter)
    } else {
        Box::new(InputFilter::new(table.clone()))
    };

    let injector = Injector::new()?;
    let mut event_loop = EventLoop::new(filter, injector, config.filter);

    let (api_tx, api_rx) = unbounded::<Command>();
    UnixSocket::new(runtime_dir).listen_events(api_tx)?;

    let (host_tx, host_rx) = unbounded::<HostEvent>();
    let _runtime = GamepadRuntime::start(table, host_tx)?;
    print_info!("padmoused started. Listening for controller events.");

    let mut api_open = true;
    loop {
        let mouse_rx = event_loop.mouse_events();
        let commands = if api_open { api_rx.clone() } else { never() };
        select! {
            recv(stop) -> _ => break,
            recv(host_rx) -> msg => match msg {
                Ok(event) => event_loop.handle_host(event),
                Err(_) => {
                    print_error!("gamepad runtime stopped");
                    break;
                }
            },
            recv(commands) -> msg => match msg {
                Ok(command) => event_loop.handle_command(command),
                Err(_) => {
                    print_warning!("control api stopped");
                    api_open = false;
                }
            },
            recv(mouse_rx) -> msg => {
                if let Ok(event) = msg {
                    event_loop.deliver(event);
                }
            },
        }
    }
    print_info!("padmoused stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use padmouse_input::codes::*;
    use padmouse_profile::ProfileTable;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<RawEvent>,
        reject: bool,
    }

    impl Delivery for Recorder {
        fn deliver(&mut self, event: RawEvent) -> bool {
            self.events.push(event);
            !self.reject
        }
    }

    const PAD: DeviceId = 0;
    const NV: DeviceId = 1;

    fn event_loop(settings: FilterSettings) -> EventLoop<Recorder> {
        let table = ProfileTable::builtin().unwrap().into_shared();
        let mut el = EventLoop::new(Box::new(InputFilter::new(table)), Recorder::default(), settings);
        el.handle_host(HostEvent::Added {
            fd: -1,
            id: PAD,
            path: "sdl:0".into(),
            identity: DeviceIdentity::new("Xbox Wireless Controller", 0x045e, 0x0b12),
        });
        el.handle_host(HostEvent::Added {
            fd: -1,
            id: NV,
            path: "sdl:1".into(),
            identity: DeviceIdentity::new("NVIDIA Controller v01.04", 0x0955, 0x7214),
        });
        el
    }

    fn input(el: &mut EventLoop<Recorder>, id: DeviceId, event: RawEvent) {
        el.handle_host(HostEvent::Input { id, event });
    }

    #[test]
    fn clicks_reach_the_desktop() {
        let mut el = event_loop(FilterSettings::default());
        assert_ne!(el.filter().mouse_fd(), INVALID_HANDLE);
        input(&mut el, PAD, RawEvent::key(BTN_SOUTH, 1));
        input(&mut el, PAD, RawEvent::key(BTN_SOUTH, 0));
        assert_eq!(
            el.delivery.events,
            vec![RawEvent::key(BTN_LEFT, 1), RawEvent::key(BTN_LEFT, 0)]
        );
    }

    #[test]
    fn unmapped_input_is_left_to_the_host() {
        let mut el = event_loop(FilterSettings::default());
        input(&mut el, PAD, RawEvent::key(KEY_ESC, 1));
        input(&mut el, PAD, RawEvent::key(KEY_ESC, 0));
        assert!(el.delivery.events.is_empty());
        input(&mut el, PAD, RawEvent::key(BTN_SOUTH, 1));
        assert_eq!(el.delivery.events, vec![RawEvent::key(BTN_LEFT, 1)]);
    }

    #[test]
    fn motion_shows_cursor_on_virtual_device() {
        let mut el = event_loop(FilterSettings::default());
        el.handle_command(Command::Fade);
        assert!(el.cursor().is_faded());
        input(&mut el, PAD, RawEvent::abs(ABS_X, 32000));
        assert_eq!(el.delivery.events[0].code, REL_X);
        assert!(!el.cursor().is_faded());
        assert_eq!(el.cursor().active_device(), Some(VIRTUAL_DEVICE_ID));
    }

    #[test]
    fn nav_buttons_hide_cursor() {
        let mut el = event_loop(FilterSettings::default());
        input(&mut el, PAD, RawEvent::key(BTN_EAST, 1));
        assert!(el.cursor().is_faded());
        assert!(el.delivery.events.is_empty());
    }

    #[test]
    fn disabling_stops_delivery() {
        let mut el = event_loop(FilterSettings::default());
        el.handle_command(Command::SetVirtualMouse(false));
        assert_eq!(el.filter().mouse_fd(), INVALID_HANDLE);
        input(&mut el, PAD, RawEvent::key(BTN_SOUTH, 1));
        assert!(el.delivery.events.is_empty());

        el.handle_command(Command::SetVirtualMouse(true));
        input(&mut el, PAD, RawEvent::key(BTN_SOUTH, 1));
        assert_eq!(el.delivery.events, vec![RawEvent::key(BTN_LEFT, 1)]);
    }

    #[test]
    fn rejected_volume_key_stops_repeating() {
        let settings = FilterSettings {
            volume_mode: true,
            ..FilterSettings::default()
        };
        let mut el = event_loop(settings);
        el.delivery.reject = true;
        input(&mut el, NV, RawEvent::abs(ABS_HAT0Y, -1));
        input(&mut el, NV, RawEvent::abs(ABS_HAT0Y, -1));
        input(&mut el, NV, RawEvent::abs(ABS_HAT0Y, 0));
        assert_eq!(
            el.delivery.events,
            vec![RawEvent::key(KEY_VOLUMEUP, 1), RawEvent::key(KEY_VOLUMEUP, 0)]
        );
    }

    #[test]
    fn volume_mode_toggles_at_runtime() {
        let mut el = event_loop(FilterSettings::default());
        input(&mut el, NV, RawEvent::abs(ABS_HAT0Y, 1));
        assert!(el.delivery.events.is_empty());
        el.handle_command(Command::SetVolumeMode(true));
        input(&mut el, NV, RawEvent::abs(ABS_HAT0Y, 1));
        assert_eq!(el.delivery.events, vec![RawEvent::key(KEY_VOLUMEDOWN, 1)]);
    }

    #[test]
    fn stub_delivers_nothing() {
        let settings = FilterSettings::default();
        let mut el = EventLoop::new(Box::new(StubFilter), Recorder::default(), settings);
        input(&mut el, PAD, RawEvent::key(BTN_SOUTH, 1));
        assert!(el.delivery.events.is_empty());
        assert_eq!(el.filter().mouse_fd(), INVALID_HANDLE);
    }
}
