use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use padmouse_filter::{CursorInputMapper, PointerController};
use padmouse_input::DeviceId;

/// Cursor collaborator for hosts without a compositor hook. It records the
/// requested visibility and the device the cursor follows.
#[derive(Debug)]
pub(crate) struct CursorTracker {
    faded: AtomicBool,
    active: AtomicI32,
}

impl Default for CursorTracker {
    fn default() -> Self {
        Self {
            faded: AtomicBool::new(false),
            active: AtomicI32::new(-1),
        }
    }
}

#[cfg(test)]
impl CursorTracker {
    pub(crate) fn is_faded(&self) -> bool {
        self.faded.load(Ordering::Relaxed)
    }

    pub(crate) fn active_device(&self) -> Option<DeviceId> {
        let id = self.active.load(Ordering::Relaxed);
        (id >= 0).then_some(id)
    }
}

impl PointerController for CursorTracker {
    fn fade(&self) {
        if !self.faded.swap(true, Ordering::Relaxed) {
            log::debug!("cursor faded");
        }
    }

    fn unfade(&self) {
        if self.faded.swap(false, Ordering::Relaxed) {
            log::debug!("cursor shown");
        }
    }
}

impl CursorInputMapper for CursorTracker {
    fn set_active_device(&self, device: DeviceId) {
        self.active.store(device, Ordering::Relaxed);
    }
}
