//! Host side of the event loop: opens controllers and reports them as raw
//! evdev-style events.

mod translate;

#[cfg(feature = "sdl2-backend")]
mod runtime;

use padmouse_input::{DeviceId, DeviceIdentity, RawEvent};
use thiserror::Error;

pub use translate::Translator;

#[cfg(feature = "sdl2-backend")]
pub use runtime::GamepadRuntime;

/// Device descriptor value for devices without a kernel file handle.
pub const NO_FD: i32 = -1;

/// Everything the host loop learns about input devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Added {
        fd: i32,
        id: DeviceId,
        path: String,
        identity: DeviceIdentity,
    },
    Removed(DeviceId),
    Input {
        id: DeviceId,
        event: RawEvent,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("SDL error: {0}")]
    Sdl(String),
    #[error("gamepad runtime exited before it was ready")]
    NotReady,
}
