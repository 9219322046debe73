//! Static device profiles: how each class of input device is recognized and
//! how its buttons and axes map onto the virtual mouse.

mod builtin;
mod capabilities;
mod layout;
mod mapping;
mod overrides;
mod profile;
mod rules;
mod table;

use padmouse_input::{Axis, Button, DeviceClass};
use thiserror::Error;

pub use builtin::{button_board_layout, nv_layout, xpad_layout, VIRTUAL_MOUSE_NAME};
pub use capabilities::{test_bit, Capabilities};
pub use layout::{AxisSource, Layout};
pub use mapping::{AxisMapping, ButtonMapping, ClassSet, Method, Polarity, Synth, SynthKind};
pub use overrides::{override_rules, DeviceOverride, RawId};
pub use profile::{AxisSlots, Profile};
pub use rules::{ClassRule, Matcher};
pub use table::{ProfileTable, ProfileTableBuilder};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{0} mapping targets no device class")]
    NoDevices(String),
    #[error("{0}: layout registered twice")]
    DuplicateLayout(DeviceClass),
    #[error("{class}: button {button:?} mapped twice")]
    DuplicateButton { class: DeviceClass, button: Button },
    #[error("{class}: button {button:?} has no physical code in the layout")]
    MissingButtonSource { class: DeviceClass, button: Button },
    #[error("{class}: axis {axis:?} has no physical code in the layout")]
    MissingAxisSource { class: DeviceClass, axis: Axis },
    #[error("{class}: axis {axis:?} has more than two mappings")]
    TooManyAxisMappings { class: DeviceClass, axis: Axis },
    #[error("{class}: axis {axis:?} mappings overlap in polarity")]
    OverlappingPolarity { class: DeviceClass, axis: Axis },
    #[error("axis {axis:?}: trigger level {level} outside [-1, 1]")]
    InvalidTriggerLevel { axis: Axis, level: f32 },
    #[error("axis {axis:?}: scale must be finite and non-zero")]
    InvalidScale { axis: Axis },
    #[error("axis {axis:?}: method needs a synthesized code")]
    MissingSynth { axis: Axis },
    #[error("{kind} code {code:#x} is outside the virtual mouse capability space")]
    CodeOutOfRange { kind: &'static str, code: u16 },
    #[error("{class}: axis code {code:#x} has empty range {min}..{max}")]
    InvalidRange {
        class: DeviceClass,
        code: u16,
        min: i32,
        max: i32,
    },
    #[error("invalid {0}: {1}")]
    InvalidId(&'static str, String),
    #[error("unknown device class: {0}")]
    UnknownClass(String),
}
