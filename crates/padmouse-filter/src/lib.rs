//! Event filter that turns controller input into virtual mouse input.
//!
//! The host owns the device event loop. For every raw event it asks the
//! filter for a [`Verdict`], reports back what the focused window did with
//! keys and motion, and drains synthesized events from the virtual mouse
//! queue.

mod bridge;
mod classifier;
mod filter;
mod registry;
mod state;
mod stub;
mod verdict;
mod virtual_mouse;

use std::sync::Arc;

use crossbeam_channel::Receiver;
use padmouse_input::{DeviceId, DeviceIdentity, PointerCoords, RawEvent};
use thiserror::Error;

pub use bridge::{CursorInputMapper, PointerController};
pub use filter::InputFilter;
pub use registry::{DeviceEntry, DeviceRegistry};
pub use state::{AxisState, DeviceState};
pub use stub::StubFilter;
pub use verdict::{Response, SynthesizedEvent, Verdict};
pub use virtual_mouse::{
    ChannelBackend, Handle, Mode, ModeSwitch, Modes, VirtualDevice, VirtualMouse,
    VirtualMouseBackend, INVALID_HANDLE,
};

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("virtual mouse allocation failed: {0}")]
    Allocation(String),
}

/// Boundary between the host event loop and a filter implementation.
///
/// All calls come from the host event thread. Only [`ModeSwitch`] is meant
/// to be shared with other threads.
pub trait EventFilter: Send {
    /// A device was opened. Re-adding a known id resets its state.
    fn filter_new_device(&mut self, fd: i32, id: DeviceId, path: &str, identity: DeviceIdentity);

    /// A device was closed. Unknown ids are ignored.
    fn filter_close_device(&mut self, id: DeviceId);

    /// Decide the fate of one raw event.
    fn filter_event(&mut self, event: RawEvent, device: DeviceId) -> Verdict;

    /// The focused window did (or did not) handle a key from `device`.
    /// Returns `true` when filter state changed.
    fn notify_key_state(&mut self, device: DeviceId, key_code: u16, handled: bool) -> bool;

    /// Pointer motion from `device` was dispatched.
    fn notify_motion_state(&mut self, device: DeviceId, coords: PointerCoords, handled: bool)
        -> bool;

    /// Something else hid the cursor.
    fn notify_cursor_pointer_fade(&mut self);

    fn set_volume_mode_state(&mut self, enable: bool);

    /// Create or destroy the virtual mouse.
    fn set_virtual_mouse_state(&mut self, enable: bool) -> Result<(), FilterError>;

    /// Handle of the virtual mouse, [`INVALID_HANDLE`] when there is none.
    fn mouse_fd(&self) -> Handle;

    /// Queue of synthesized events while the virtual mouse exists.
    fn mouse_events(&self) -> Option<Receiver<SynthesizedEvent>>;

    /// The host opened the virtual mouse under `id`.
    fn register_virtual_mouse_device(&mut self, id: DeviceId);

    fn register_pointer_controller(&mut self, controller: Arc<dyn PointerController>);

    fn register_cursor_input_mapper(&mut self, mapper: Arc<dyn CursorInputMapper>, device: DeviceId);

    /// Fill evdev-style capability bitmasks for the virtual device.
    fn set_virtual_mouse_bitmasks(&self, key_bits: &mut [u8], rel_bits: &mut [u8]);
}

#[cfg(test)]
mod tests {
    use padmouse_input::codes::*;

    use super::*;

    fn boxed() -> Vec<Box<dyn EventFilter>> {
        let table = padmouse_profile::ProfileTable::builtin().unwrap().into_shared();
        vec![Box::new(StubFilter), Box::new(InputFilter::new(table))]
    }

    #[test]
    fn unknown_devices_are_neutral_everywhere() {
        for mut filter in boxed() {
            assert!(filter.filter_event(RawEvent::key(BTN_SOUTH, 1), 3).is_default());
            assert!(!filter.notify_key_state(3, BTN_SOUTH, true));
            assert_eq!(filter.mouse_fd(), INVALID_HANDLE);
        }
    }

    #[test]
    fn stub_never_allocates() {
        let mut stub = StubFilter;
        stub.set_virtual_mouse_state(true).unwrap();
        assert_eq!(stub.mouse_fd(), INVALID_HANDLE);
        assert!(stub.mouse_events().is_none());

        let mut keys = [0u8; KEY_BITMASK_BYTES];
        let mut rels = [0u8; REL_BITMASK_BYTES];
        stub.set_virtual_mouse_bitmasks(&mut keys, &mut rels);
        assert!(keys.iter().chain(rels.iter()).all(|b| *b == 0));
    }
}
