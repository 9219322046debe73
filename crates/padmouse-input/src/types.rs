use std::fmt;
use std::str::FromStr;

use padmouse_bit_derive::Bit;
use padmouse_bit_mask::Bitable;
use thiserror::Error;

/// Identifier the host event loop assigns to an opened device.
pub type DeviceId = i32;

/// Logical controller buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Bit)]
pub enum Button {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
    ThumbL,
    ThumbR,
    Home,
    Back,
    Mute,
    DPadLeft,
    DPadRight,
    DPadUp,
    DPadDown,
    LTrigger,
    RTrigger,
}

impl Button {
    pub const COUNT: usize = 21;
}

/// Logical controller axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Bit)]
pub enum Axis {
    LsX,
    LsY,
    RsX,
    RsY,
    LTrigger,
    RTrigger,
    DPadX,
    DPadY,
}

impl Axis {
    pub const COUNT: usize = 8;

    /// Dpad buttons reporting the same physical control, negative side first.
    pub fn dpad_buttons(self) -> Option<(Button, Button)> {
        match self {
            Axis::DPadX => Some((Button::DPadLeft, Button::DPadRight)),
            Axis::DPadY => Some((Button::DPadUp, Button::DPadDown)),
            _ => None,
        }
    }
}

/// Device classes a profile table can assign at connect time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Bit)]
pub enum DeviceClass {
    #[default]
    Default,
    Unsupported,
    VirtualMouse,
    ButtonBoard,
    NvController,
    Controller,
}

impl DeviceClass {
    pub const COUNT: usize = 6;

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceClass::Default => "default",
            DeviceClass::Unsupported => "unsupported",
            DeviceClass::VirtualMouse => "virtual_mouse",
            DeviceClass::ButtonBoard => "button_board",
            DeviceClass::NvController => "nv_controller",
            DeviceClass::Controller => "controller",
        }
    }
}

/// Returned when a class name does not match any `DeviceClass`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown device class: {0}")]
pub struct UnknownClass(pub Box<str>);

impl FromStr for DeviceClass {
    type Err = UnknownClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase().replace('-', "_");
        DeviceClass::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == name)
            .ok_or_else(|| UnknownClass(s.into()))
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity reported once when a device is opened.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceIdentity {
    pub name: Box<str>,
    pub bus: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

impl DeviceIdentity {
    pub fn new(name: &str, vendor: u16, product: u16) -> Self {
        Self {
            name: name.into(),
            vendor,
            product,
            ..Self::default()
        }
    }

    pub fn with_bus(mut self, bus: u16) -> Self {
        self.bus = bus;
        self
    }

    pub fn with_version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bus=0x{:04x} vid=0x{:04x} pid=0x{:04x} ver=0x{:04x}",
            self.name, self.bus, self.vendor, self.product, self.version
        )
    }
}

/// Kind of a raw input event, mirroring the evdev event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Syn,
    Key,
    Rel,
    Abs,
    Other(u16),
}

impl EventKind {
    pub fn from_type(ty: u16) -> Self {
        match ty {
            crate::codes::EV_SYN => EventKind::Syn,
            crate::codes::EV_KEY => EventKind::Key,
            crate::codes::EV_REL => EventKind::Rel,
            crate::codes::EV_ABS => EventKind::Abs,
            other => EventKind::Other(other),
        }
    }

    pub fn as_type(self) -> u16 {
        match self {
            EventKind::Syn => crate::codes::EV_SYN,
            EventKind::Key => crate::codes::EV_KEY,
            EventKind::Rel => crate::codes::EV_REL,
            EventKind::Abs => crate::codes::EV_ABS,
            EventKind::Other(ty) => ty,
        }
    }
}

/// One raw hardware sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: EventKind,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    pub const RELEASE: i32 = 0;
    pub const PRESS: i32 = 1;
    pub const REPEAT: i32 = 2;

    pub const fn new(kind: EventKind, code: u16, value: i32) -> Self {
        Self { kind, code, value }
    }

    pub const fn key(code: u16, value: i32) -> Self {
        Self::new(EventKind::Key, code, value)
    }

    pub const fn abs(code: u16, value: i32) -> Self {
        Self::new(EventKind::Abs, code, value)
    }

    pub const fn rel(code: u16, value: i32) -> Self {
        Self::new(EventKind::Rel, code, value)
    }
}

/// Pointer coordinates reported back after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerCoords {
    pub x: f32,
    pub y: f32,
}
