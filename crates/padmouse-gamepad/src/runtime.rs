use std::sync::Arc;
use std::thread::{self, JoinHandle};

use ahash::AHashMap;
use crossbeam_channel::{Receiver, Sender};
use padmouse_input::{Axis, Button, DeviceId, DeviceIdentity};
use padmouse_profile::ProfileTable;
use sdl2::controller::{Axis as SdlAxis, Button as SdlButton, GameController};
use sdl2::event::Event;
use sdl2::GameControllerSubsystem;

use crate::translate::Translator;
use crate::{Error, HostEvent, NO_FD};

enum Command {
    Shutdown,
}

/// SDL2-backed controller thread.
///
/// Opened controllers are announced as [`HostEvent::Added`] and their input
/// is reported as native codes of the device's class layout.
pub struct GamepadRuntime {
    commands: Sender<Command>,
    thread: Option<JoinHandle<()>>,
}

impl GamepadRuntime {
    /// Start the runtime and wait until initial enumeration is done.
    pub fn start(table: Arc<ProfileTable>, events: Sender<HostEvent>) -> Result<Self, Error> {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        let thread = thread::Builder::new()
            .name("gamepad".into())
            .spawn(move || run(table, events, cmd_rx, ready_tx))
            .map_err(|e| Error::Sdl(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                commands: cmd_tx,
                thread: Some(thread),
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(Error::NotReady),
        }
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for GamepadRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(
    table: Arc<ProfileTable>,
    events: Sender<HostEvent>,
    commands: Receiver<Command>,
    ready: Sender<Result<(), Error>>,
) {
    // SDL must live entirely within this thread
    let init = sdl2::init().and_then(|sdl| {
        let controllers = sdl.game_controller()?;
        let pump = sdl.event_pump()?;
        Ok((sdl, controllers, pump))
    });
    let (_sdl, subsystem, mut pump) = match init {
        Ok(parts) => parts,
        Err(e) => {
            let _ = ready.send(Err(Error::Sdl(e)));
            return;
        }
    };

    let mut host = Host {
        subsystem,
        opened: AHashMap::new(),
        translator: Translator::new(table),
        events,
    };
    host.enumerate();
    let _ = ready.send(Ok(()));

    loop {
        // Wait for an SDL event or timeout to reduce idle CPU usage
        if let Some(event) = pump.wait_event_timeout(10) {
            host.handle(event);
            for event in pump.poll_iter() {
                host.handle(event);
            }
        }
        match commands.try_recv() {
            Ok(Command::Shutdown) | Err(crossbeam_channel::TryRecvError::Disconnected) => break,
            Err(crossbeam_channel::TryRecvError::Empty) => {}
        }
    }
    log::debug!("gamepad runtime stopped");
}

struct Host {
    subsystem: GameControllerSubsystem,
    opened: AHashMap<DeviceId, GameController>,
    translator: Translator,
    events: Sender<HostEvent>,
}

impl Host {
    fn enumerate(&mut self) {
        let count = match self.subsystem.num_joysticks() {
            Ok(count) => count,
            Err(e) => {
                log::warn!("cannot enumerate joysticks: {e}");
                return;
            }
        };
        for index in 0..count {
            if self.subsystem.is_game_controller(index) {
                self.open(index);
            }
        }
    }

    fn open(&mut self, index: u32) {
        let controller = match self.subsystem.open(index) {
            Ok(controller) => controller,
            Err(e) => {
                log::warn!("cannot open controller {index}: {e}");
                return;
            }
        };
        let id = controller.instance_id() as DeviceId;
        let identity = DeviceIdentity::new(
            &controller.name(),
            controller.vendor_id().unwrap_or(0),
            controller.product_id().unwrap_or(0),
        );
        self.translator.add(id, &identity);
        self.opened.insert(id, controller);
        self.send(HostEvent::Added {
            fd: NO_FD,
            id,
            path: format!("sdl:{index}"),
            identity,
        });
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::ControllerDeviceAdded { which, .. } => self.open(which),
            Event::ControllerDeviceRemoved { which, .. } => {
                let id = which as DeviceId;
                self.opened.remove(&id);
                self.translator.remove(id);
                self.send(HostEvent::Removed(id));
            }
            Event::ControllerButtonDown { which, button, .. } => {
                self.button(which as DeviceId, button, true);
            }
            Event::ControllerButtonUp { which, button, .. } => {
                self.button(which as DeviceId, button, false);
            }
            Event::ControllerAxisMotion {
                which, axis, value, ..
            } => {
                let id = which as DeviceId;
                if let Some(event) = self.translator.axis(id, map_sdl_axis(axis), value) {
                    self.send(HostEvent::Input { id, event });
                }
            }
            _ => {}
        }
    }

    fn button(&mut self, id: DeviceId, button: SdlButton, pressed: bool) {
        let Some(button) = map_sdl_button(button) else {
            return;
        };
        for event in self.translator.button(id, button, pressed) {
            self.send(HostEvent::Input { id, event });
        }
    }

    fn send(&self, event: HostEvent) {
        if self.events.send(event).is_err() {
            log::debug!("host event receiver is gone");
        }
    }
}

fn map_sdl_button(button: SdlButton) -> Option<Button> {
    Some(match button {
        SdlButton::A => Button::A,
        SdlButton::B => Button::B,
        SdlButton::X => Button::X,
        SdlButton::Y => Button::Y,
        SdlButton::Back => Button::Select,
        SdlButton::Guide => Button::Home,
        SdlButton::Start => Button::Start,
        SdlButton::LeftStick => Button::ThumbL,
        SdlButton::RightStick => Button::ThumbR,
        SdlButton::LeftShoulder => Button::L1,
        SdlButton::RightShoulder => Button::R1,
        SdlButton::DPadUp => Button::DPadUp,
        SdlButton::DPadDown => Button::DPadDown,
        SdlButton::DPadLeft => Button::DPadLeft,
        SdlButton::DPadRight => Button::DPadRight,
        SdlButton::Misc1 => Button::Mute,
        _ => return None,
    })
}

fn map_sdl_axis(axis: SdlAxis) -> Axis {
    match axis {
        SdlAxis::LeftX => Axis::LsX,
        SdlAxis::LeftY => Axis::LsY,
        SdlAxis::RightX => Axis::RsX,
        SdlAxis::RightY => Axis::RsY,
        SdlAxis::TriggerLeft => Axis::LTrigger,
        SdlAxis::TriggerRight => Axis::RTrigger,
    }
}
