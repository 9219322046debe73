use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use padmouse_bit_derive::Bit;
use padmouse_bit_mask::{AtomicBitmask, Bitmask};
use padmouse_profile::Capabilities;

use crate::verdict::SynthesizedEvent;
use crate::FilterError;

/// Host handle of the virtual device.
pub type Handle = i32;

/// Returned by `mouse_fd` while no virtual device exists.
pub const INVALID_HANDLE: Handle = -1;

const DEFAULT_QUEUE: usize = 256;

/// Runtime toggles that gate synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Bit)]
pub enum Mode {
    VirtualMouse,
    Volume,
}

pub type Modes = Bitmask<Mode>;

/// Shared view of the mode bits.
///
/// Volume mode may be flipped from any thread. The virtual mouse bit is only
/// published by the filter after the device exists.
#[derive(Debug, Clone, Default)]
pub struct ModeSwitch(Arc<AtomicBitmask<Mode>>);

impl ModeSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn load(&self) -> Modes {
        self.0.load()
    }

    pub fn set_volume_mode(&self, enable: bool) -> bool {
        self.0.set(Mode::Volume, enable)
    }

    pub fn virtual_mouse_enabled(&self) -> bool {
        self.0.contains(Mode::VirtualMouse)
    }

    pub fn volume_mode_enabled(&self) -> bool {
        self.0.contains(Mode::Volume)
    }

    pub(crate) fn set_virtual_mouse(&self, enable: bool) -> bool {
        self.0.set(Mode::VirtualMouse, enable)
    }
}

/// A live virtual device.
#[derive(Debug)]
pub struct VirtualDevice {
    pub handle: Handle,
    pub sender: Sender<SynthesizedEvent>,
    pub receiver: Receiver<SynthesizedEvent>,
}

/// Creates and destroys the synthetic pointer device.
pub trait VirtualMouseBackend: Send {
    fn allocate(&mut self, capabilities: &Capabilities) -> Result<VirtualDevice, FilterError>;
    fn release(&mut self, handle: Handle);
}

/// In-process backend: the device is a bounded channel the host drains.
#[derive(Debug)]
pub struct ChannelBackend {
    capacity: usize,
    next_handle: Handle,
    /// Allocations left before reporting exhaustion.
    remaining: Option<usize>,
}

impl Default for ChannelBackend {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE)
    }
}

impl ChannelBackend {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next_handle: 3,
            remaining: None,
        }
    }

    /// Fail every allocation after the first `limit`.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.remaining = Some(limit);
        self
    }
}

impl VirtualMouseBackend for ChannelBackend {
    fn allocate(&mut self, capabilities: &Capabilities) -> Result<VirtualDevice, FilterError> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Err(FilterError::Allocation("device limit reached".into()));
            }
            *remaining -= 1;
        }
        let (sender, receiver) = crossbeam_channel::bounded(self.capacity);
        let handle = self.next_handle;
        self.next_handle += 1;
        log::debug!(
            "virtual device {handle}: {} keys, {} rel axes",
            capabilities.keys().len(),
            capabilities.rels().len()
        );
        Ok(VirtualDevice {
            handle,
            sender,
            receiver,
        })
    }

    fn release(&mut self, handle: Handle) {
        log::debug!("virtual device {handle} released");
    }
}

/// Lifecycle of the virtual pointer device.
pub struct VirtualMouse {
    backend: Box<dyn VirtualMouseBackend>,
    device: Option<VirtualDevice>,
    modes: ModeSwitch,
    dropped: u64,
}

impl std::fmt::Debug for VirtualMouse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualMouse")
            .field("device", &self.device)
            .field("modes", &self.modes.load())
            .field("dropped", &self.dropped)
            .finish_non_exhaustive()
    }
}

impl VirtualMouse {
    pub fn new(backend: Box<dyn VirtualMouseBackend>, modes: ModeSwitch) -> Self {
        Self {
            backend,
            device: None,
            modes,
            dropped: 0,
        }
    }

    pub fn modes(&self) -> &ModeSwitch {
        &self.modes
    }

    pub fn is_enabled(&self) -> bool {
        self.device.is_some()
    }

    /// Create or destroy the device. Repeating the current state is a no-op.
    pub fn set_enabled(
        &mut self,
        enable: bool,
        capabilities: &Capabilities,
    ) -> Result<(), FilterError> {
        match (enable, self.device.is_some()) {
            (true, false) => {
                let device = match self.backend.allocate(capabilities) {
                    Ok(device) => device,
                    Err(e) => {
                        log::error!("virtual mouse allocation failed: {e}");
                        return Err(e);
                    }
                };
                log::info!("virtual mouse enabled, handle {}", device.handle);
                self.device = Some(device);
                self.modes.set_virtual_mouse(true);
            }
            (false, true) => {
                self.modes.set_virtual_mouse(false);
                if let Some(device) = self.device.take() {
                    // Undelivered events die with the device.
                    let stale = device.receiver.try_iter().count();
                    self.backend.release(device.handle);
                    log::info!("virtual mouse disabled, {stale} events discarded");
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn handle(&self) -> Handle {
        self.device.as_ref().map_or(INVALID_HANDLE, |d| d.handle)
    }

    /// Receiving end the host multiplexes next to physical devices.
    pub fn events(&self) -> Option<Receiver<SynthesizedEvent>> {
        self.device.as_ref().map(|d| d.receiver.clone())
    }

    /// Queue events for delivery. Events are lost when the device is gone or
    /// the host stopped draining it.
    #[inline]
    pub fn emit(&mut self, events: &[SynthesizedEvent]) {
        let Some(device) = self.device.as_ref() else {
            return;
        };
        for event in events {
            match device.sender.try_send(*event) {
                Ok(()) => {}
                Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {
                    self.dropped += 1;
                }
            }
        }
    }

    /// Events lost to a full queue since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
