use enigo::{
    Axis, Button, Coordinate,
    Direction::{Click, Press, Release},
    Enigo, Key, Keyboard, Mouse, Settings,
};
use padmouse_input::RawEvent;

use crate::action::{Action, PointerButton, ScrollAxis, SystemKey};
use crate::ControlError;

/// Replays synthesized events as desktop input.
pub struct Injector {
    enigo: Enigo,
}

impl Injector {
    pub fn new() -> Result<Self, ControlError> {
        let enigo = Enigo::new(&Settings::default())?;
        Ok(Self { enigo })
    }

    /// Inject one event. Events without a desktop equivalent are dropped.
    pub fn inject(&mut self, event: RawEvent) -> Result<(), ControlError> {
        let Some(action) = Action::from_event(event) else {
            log::trace!("no desktop action for {event:?}");
            return Ok(());
        };
        self.perform(action)
    }

    pub fn perform(&mut self, action: Action) -> Result<(), ControlError> {
        match action {
            Action::Button { button, down } => {
                let direction = if down { Press } else { Release };
                self.enigo.button(map_button(button), direction)?;
            }
            Action::Key { key, down } => {
                let direction = if down { Press } else { Release };
                self.enigo.key(map_key(key), direction)?;
            }
            Action::KeyRepeat(key) => self.enigo.key(map_key(key), Click)?,
            Action::Move { dx, dy } => self.enigo.move_mouse(dx, dy, Coordinate::Rel)?,
            // enigo scrolls down and right for positive lengths.
            Action::Scroll {
                axis: ScrollAxis::Vertical,
                amount,
            } => self.enigo.scroll(-amount, Axis::Vertical)?,
            Action::Scroll {
                axis: ScrollAxis::Horizontal,
                amount,
            } => self.enigo.scroll(amount, Axis::Horizontal)?,
        }
        Ok(())
    }
}

fn map_button(button: PointerButton) -> Button {
    match button {
        PointerButton::Left => Button::Left,
        PointerButton::Right => Button::Right,
        PointerButton::Middle => Button::Middle,
        PointerButton::Back => Button::Back,
        PointerButton::Forward => Button::Forward,
    }
}

fn map_key(key: SystemKey) -> Key {
    match key {
        SystemKey::VolumeUp => Key::VolumeUp,
        SystemKey::VolumeDown => Key::VolumeDown,
        SystemKey::Mute => Key::VolumeMute,
        SystemKey::Enter => Key::Return,
        SystemKey::Escape => Key::Escape,
    }
}
