use std::sync::Arc;

use crossbeam_channel::Receiver;
use padmouse_input::{DeviceId, DeviceIdentity, PointerCoords, RawEvent};

use crate::bridge::{CursorInputMapper, PointerController};
use crate::verdict::{SynthesizedEvent, Verdict};
use crate::virtual_mouse::{Handle, INVALID_HANDLE};
use crate::{EventFilter, FilterError};

/// Filter for builds without profile support. Every event passes untouched
/// and no virtual device is ever created.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubFilter;

impl EventFilter for StubFilter {
    fn filter_new_device(&mut self, _fd: i32, _id: DeviceId, _path: &str, _identity: DeviceIdentity) {}

    fn filter_close_device(&mut self, _id: DeviceId) {}

    fn filter_event(&mut self, _event: RawEvent, _device: DeviceId) -> Verdict {
        Verdict::default()
    }

    fn notify_key_state(&mut self, _device: DeviceId, _key_code: u16, _handled: bool) -> bool {
        false
    }

    fn notify_motion_state(
        &mut self,
        _device: DeviceId,
        _coords: PointerCoords,
        _handled: bool,
    ) -> bool {
        false
    }

    fn notify_cursor_pointer_fade(&mut self) {}

    fn set_volume_mode_state(&mut self, _enable: bool) {}

    fn set_virtual_mouse_state(&mut self, _enable: bool) -> Result<(), FilterError> {
        Ok(())
    }

    fn mouse_fd(&self) -> Handle {
        INVALID_HANDLE
    }

    fn mouse_events(&self) -> Option<Receiver<SynthesizedEvent>> {
        None
    }

    fn register_virtual_mouse_device(&mut self, _id: DeviceId) {}

    fn register_pointer_controller(&mut self, _controller: Arc<dyn PointerController>) {}

    fn register_cursor_input_mapper(&mut self, _mapper: Arc<dyn CursorInputMapper>, _device: DeviceId) {}

    fn set_virtual_mouse_bitmasks(&self, _key_bits: &mut [u8], _rel_bits: &mut [u8]) {}
}
