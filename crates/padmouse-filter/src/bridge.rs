use std::sync::Arc;

use padmouse_input::DeviceId;

/// Draws the cursor. The filter only asks it to hide or show.
pub trait PointerController: Send + Sync {
    fn fade(&self);
    fn unfade(&self);
}

/// Tracks which device the cursor currently follows.
pub trait CursorInputMapper: Send + Sync {
    fn set_active_device(&self, device: DeviceId);
}

/// Registered collaborators and the last visibility request sent to them.
#[derive(Default)]
pub(crate) struct Collaborators {
    pointer: Option<Arc<dyn PointerController>>,
    cursor: Option<(Arc<dyn CursorInputMapper>, DeviceId)>,
    faded: bool,
}

impl Collaborators {
    pub(crate) fn set_pointer(&mut self, pointer: Arc<dyn PointerController>) {
        self.pointer = Some(pointer);
        self.faded = false;
    }

    pub(crate) fn set_cursor(&mut self, mapper: Arc<dyn CursorInputMapper>, device: DeviceId) {
        self.cursor = Some((mapper, device));
    }

    /// Fade unless the cursor is already hidden.
    pub(crate) fn fade(&mut self) {
        if !self.faded {
            self.force_fade();
        }
    }

    pub(crate) fn force_fade(&mut self) {
        if let Some(pointer) = &self.pointer {
            pointer.fade();
            self.faded = true;
        }
    }

    /// Show the cursor and make the mapper follow the virtual device.
    pub(crate) fn activate(&mut self) {
        if self.faded {
            if let Some(pointer) = &self.pointer {
                pointer.unfade();
            }
            self.faded = false;
        }
        if let Some((mapper, device)) = &self.cursor {
            mapper.set_active_device(*device);
        }
    }

    #[cfg(test)]
    pub(crate) fn is_faded(&self) -> bool {
        self.faded
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("pointer", &self.pointer.is_some())
            .field("cursor", &self.cursor.as_ref().map(|(_, d)| *d))
            .field("faded", &self.faded)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

    use super::*;

    #[derive(Debug, Default)]
    pub(crate) struct CountingPointer {
        pub(crate) fades: AtomicUsize,
        pub(crate) unfades: AtomicUsize,
    }

    impl PointerController for CountingPointer {
        fn fade(&self) {
            self.fades.fetch_add(1, Ordering::Relaxed);
        }

        fn unfade(&self) {
            self.unfades.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct LastDevice(pub(crate) AtomicI32);

    impl CursorInputMapper for LastDevice {
        fn set_active_device(&self, device: DeviceId) {
            self.0.store(device, Ordering::Relaxed);
        }
    }

    #[test]
    fn fade_is_sent_once_until_unfaded() {
        let pointer = Arc::new(CountingPointer::default());
        let mut c = Collaborators::default();
        c.set_pointer(pointer.clone());
        c.fade();
        c.fade();
        assert_eq!(pointer.fades.load(Ordering::Relaxed), 1);
        c.activate();
        assert_eq!(pointer.unfades.load(Ordering::Relaxed), 1);
        c.force_fade();
        c.force_fade();
        assert_eq!(pointer.fades.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn activate_reports_bound_device() {
        let mapper = Arc::new(LastDevice::default());
        let mut c = Collaborators::default();
        c.set_cursor(mapper.clone(), 9);
        c.activate();
        assert_eq!(mapper.0.load(Ordering::Relaxed), 9);
        assert!(!c.is_faded());
    }

    #[test]
    fn nothing_registered_is_harmless() {
        let mut c = Collaborators::default();
        c.fade();
        c.activate();
        assert!(!c.is_faded());
    }
}
