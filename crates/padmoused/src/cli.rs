use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::api::Command as ApiCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub(crate) fn enabled(self) -> bool {
        self == Toggle::On
    }
}

#[derive(Debug, Subcommand, PartialEq)]
pub(crate) enum Request {
    /// Create or remove the virtual pointer.
    VirtualMouse { state: Toggle },
    /// Let volume-only mappings fire.
    VolumeMode { state: Toggle },
    /// Hide the cursor now.
    Fade,
}

impl Request {
    pub(crate) fn to_command(&self) -> ApiCommand {
        match self {
            Request::VirtualMouse { state } => ApiCommand::SetVirtualMouse(state.enabled()),
            Request::VolumeMode { state } => ApiCommand::SetVolumeMode(state.enabled()),
            Request::Fade => ApiCommand::Fade,
        }
    }
}

#[derive(Debug, Subcommand, PartialEq)]
pub(crate) enum Command {
    /// Run the daemon in the foreground.
    Run {
        /// Configuration file
        #[clap(short, long)]
        config: Option<PathBuf>,
        /// Forward every event untouched
        #[clap(long)]
        stub: bool,
    },
    /// Send a request to the running daemon.
    Send {
        #[clap(subcommand)]
        request: Request,
    },
}

/// Turns gamepads into a pointing device.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Turn debugging information on
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Directory holding the control socket
    #[arg(long)]
    pub runtime_dir: Option<PathBuf>,

    /// The command to run
    #[clap(subcommand)]
    pub command: Command,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from(["padmoused", "-v", "run", "--stub", "-c", "pad.yaml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(
            cli.command,
            Command::Run {
                config: Some(PathBuf::from("pad.yaml")),
                stub: true
            }
        );
    }

    #[test]
    fn parses_send_requests() {
        let cli = Cli::try_parse_from(["padmoused", "send", "volume-mode", "on"]).unwrap();
        let Command::Send { request } = cli.command else {
            panic!("expected send");
        };
        assert_eq!(request.to_command(), ApiCommand::SetVolumeMode(true));

        let cli = Cli::try_parse_from(["padmoused", "send", "virtual-mouse", "off"]).unwrap();
        let Command::Send { request } = cli.command else {
            panic!("expected send");
        };
        assert_eq!(request.to_command(), ApiCommand::SetVirtualMouse(false));
        assert!(Cli::try_parse_from(["padmoused", "send", "volume-mode", "maybe"]).is_err());
    }
}
