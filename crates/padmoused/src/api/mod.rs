mod unix_sock;

use std::path::PathBuf;
use std::thread::JoinHandle;

pub(crate) use unix_sock::UnixSocket;

use bitcode::{Decode, Encode};
use crossbeam_channel::Sender;
use thiserror::Error;

/// Error type for api operations.
#[derive(Error, Debug)]
pub(crate) enum ApiError {
    #[error("socket I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("daemon rejected the request: {0}")]
    Rejected(String),
}

/// Convenient result alias for api operations.
pub(crate) type ApiResult<T> = std::result::Result<T, ApiError>;

/// padmoused api control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub(crate) enum Command {
    SetVirtualMouse(bool),
    SetVolumeMode(bool),
    Fade,
}

/// padmoused api events transport.
/// Listener receives commands from the outer world and forwards them to
/// the event thread; sender delivers one command to a running daemon.
pub(crate) trait ApiTransport {
    fn listen_events(&self, tx: Sender<Command>) -> ApiResult<JoinHandle<()>>;
    fn send_event(&self, event: Command) -> ApiResult<()>;
}

/// Where the control socket lives unless `--runtime-dir` says otherwise.
pub(crate) fn default_runtime_dir() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join("padmoused")
}
