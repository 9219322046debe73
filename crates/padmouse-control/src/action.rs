use padmouse_input::codes::*;
use padmouse_input::{EventKind, RawEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAxis {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemKey {
    VolumeUp,
    VolumeDown,
    Mute,
    Enter,
    Escape,
}

/// Desktop-level meaning of one synthesized event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Button { button: PointerButton, down: bool },
    Key { key: SystemKey, down: bool },
    /// Key held long enough to auto-repeat.
    KeyRepeat(SystemKey),
    Move { dx: i32, dy: i32 },
    /// Positive values scroll up or right, as evdev reports them.
    Scroll { axis: ScrollAxis, amount: i32 },
}

impl Action {
    /// Desktop action for an event, `None` for codes the desktop has no
    /// equivalent for.
    pub fn from_event(event: RawEvent) -> Option<Self> {
        match event.kind {
            EventKind::Key => key_action(event.code, event.value),
            EventKind::Rel => rel_action(event.code, event.value),
            _ => None,
        }
    }
}

fn key_action(code: u16, value: i32) -> Option<Action> {
    let button = match code {
        BTN_LEFT => Some(PointerButton::Left),
        BTN_RIGHT => Some(PointerButton::Right),
        BTN_MIDDLE => Some(PointerButton::Middle),
        BTN_SIDE => Some(PointerButton::Back),
        BTN_EXTRA => Some(PointerButton::Forward),
        _ => None,
    };
    if let Some(button) = button {
        // Pointer buttons do not auto-repeat.
        return match value {
            RawEvent::PRESS => Some(Action::Button { button, down: true }),
            RawEvent::RELEASE => Some(Action::Button { button, down: false }),
            _ => None,
        };
    }

    let key = match code {
        KEY_VOLUMEUP => SystemKey::VolumeUp,
        KEY_VOLUMEDOWN => SystemKey::VolumeDown,
        KEY_MUTE => SystemKey::Mute,
        KEY_ENTER => SystemKey::Enter,
        KEY_ESC => SystemKey::Escape,
        _ => return None,
    };
    Some(match value {
        RawEvent::RELEASE => Action::Key { key, down: false },
        RawEvent::PRESS => Action::Key { key, down: true },
        _ => Action::KeyRepeat(key),
    })
}

fn rel_action(code: u16, value: i32) -> Option<Action> {
    if value == 0 {
        return None;
    }
    Some(match code {
        REL_X => Action::Move { dx: value, dy: 0 },
        REL_Y => Action::Move { dx: 0, dy: value },
        REL_WHEEL => Action::Scroll {
            axis: ScrollAxis::Vertical,
            amount: value,
        },
        REL_HWHEEL => Action::Scroll {
            axis: ScrollAxis::Horizontal,
            amount: value,
        },
        _ => return None,
    })
}
