use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use colored::Colorize;
use crossbeam_channel::Sender;

use super::{ApiError, ApiResult, ApiTransport, Command};
use crate::{print_debug, print_error, print_info};

const SOCKET_FILE_NAME: &str = "api.sock";
const MAX_FRAME: usize = 1024;

pub(crate) struct UnixSocket {
    socket_path: PathBuf,
}

impl UnixSocket {
    pub(crate) fn new<P: AsRef<Path>>(runtime_dir: P) -> Self {
        let socket_path = runtime_dir.as_ref().join(SOCKET_FILE_NAME);

        Self { socket_path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.socket_path
    }
}

/// Read one length-prefixed frame and decode it.
fn read_command(stream: &mut UnixStream) -> Result<Command, String> {
    let mut length_buffer = [0u8; 4];
    stream
        .read_exact(&mut length_buffer)
        .map_err(|e| format!("read failed: {e}"))?;

    let length = u32::from_be_bytes(length_buffer) as usize;
    if length == 0 {
        return Err("empty".into());
    }
    if length > MAX_FRAME {
        return Err(format!("frame too large: {length}"));
    }

    let mut data_buffer = vec![0u8; length];
    stream
        .read_exact(&mut data_buffer)
        .map_err(|e| format!("read failed: {e}"))?;
    bitcode::decode(&data_buffer).map_err(|e| e.to_string())
}

fn handle_connection(mut stream: UnixStream, tx: &Sender<Command>) {
    let reply = match read_command(&mut stream) {
        Ok(command) => {
            print_debug!("api command: {command:?}");
            if tx.send(command).is_ok() {
                "OK\n".to_string()
            } else {
                "ERR daemon is shutting down\n".to_string()
            }
        }
        Err(err) => {
            print_error!("failed to decode command: {err}");
            format!("ERR {err}\n")
        }
    };
    let _ = stream.write_all(reply.as_bytes());
}

impl ApiTransport for UnixSocket {
    fn listen_events(&self, tx: Sender<Command>) -> ApiResult<JoinHandle<()>> {
        let socket_path = self.socket_path.clone();
        if let Some(dir) = socket_path.parent() {
            fs::create_dir_all(dir)?;
        }
        if socket_path.exists() {
            fs::remove_file(&socket_path)?;
        }
        let listener = UnixListener::bind(&socket_path)?;
        print_info!("unix socket api listening at {}", socket_path.display());

        let handle = thread::Builder::new()
            .name("padmoused-socket-api".into())
            .spawn(move || {
                for stream in listener.incoming() {
                    match stream {
                        Ok(stream) => handle_connection(stream, &tx),
                        Err(e) => {
                            print_error!("control socket accept error: {}", e);
                            break;
                        }
                    }
                }
            })?;
        Ok(handle)
    }

    fn send_event(&self, event: Command) -> ApiResult<()> {
        let mut stream = UnixStream::connect(&self.socket_path)?;
        let encoded = bitcode::encode(&event);
        let length = encoded.len() as u32;
        stream.write_all(&length.to_be_bytes())?;
        stream.write_all(&encoded)?;
        stream.flush()?;

        let mut reply = String::new();
        BufReader::new(stream).read_line(&mut reply)?;
        match reply.trim_end().strip_prefix("ERR ") {
            Some(reason) => Err(ApiError::Rejected(reason.to_string())),
            None => Ok(()),
        }
    }
}
