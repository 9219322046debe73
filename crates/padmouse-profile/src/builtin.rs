//! Profiles shipped with the filter.
//!
//! Sticks drive the pointer and the wheel, face buttons click, triggers
//! act as mouse buttons. System buttons keep their native meaning but hide
//! the cursor, since they usually navigate a non-pointer UI.

use padmouse_input::codes::*;
use padmouse_input::{Axis, Button, DeviceClass};

use crate::layout::{AxisSource, Layout};
use crate::mapping::{AxisMapping, ButtonMapping, Polarity, Synth};
use crate::rules::ClassRule;
use crate::table::ProfileTableBuilder;

/// Name the virtual pointer device is created with.
pub const VIRTUAL_MOUSE_NAME: &str = "padmouse virtual pointer";

const NVIDIA: u16 = 0x0955;
const STICK_LEVEL: f32 = 0.15;
const STICK_GAIN: f32 = 24.0;
const WHEEL_LEVEL: f32 = 0.5;
const TRIGGER_LEVEL: f32 = 0.5;
const HAT_LEVEL: f32 = 0.5;

const PADS: &[DeviceClass] = &[DeviceClass::NvController, DeviceClass::Controller];
const NAV: &[DeviceClass] = &[
    DeviceClass::NvController,
    DeviceClass::Controller,
    DeviceClass::ButtonBoard,
];
const NV: &[DeviceClass] = &[DeviceClass::NvController];
const XPAD: &[DeviceClass] = &[DeviceClass::Controller];

/// Controllers known to use the xpad layout.
const KNOWN_PADS: &[(u16, u16)] = &[
    (0x045e, 0x028e), // Xbox 360
    (0x045e, 0x02ea), // Xbox One S
    (0x045e, 0x0b12), // Xbox Series
    (0x054c, 0x05c4), // DualShock 4
    (0x054c, 0x09cc), // DualShock 4 v2
    (0x054c, 0x0ce6), // DualSense
    (0x057e, 0x2009), // Switch Pro
    (0x046d, 0xc21d), // F310
];

fn face_buttons(layout: Layout) -> Layout {
    layout
        .button(BTN_SOUTH, Button::A)
        .button(BTN_EAST, Button::B)
        .button(BTN_NORTH, Button::X)
        .button(BTN_WEST, Button::Y)
        .button(BTN_TL, Button::L1)
        .button(BTN_TR, Button::R1)
        .button(BTN_TL2, Button::L2)
        .button(BTN_TR2, Button::R2)
        .button(BTN_SELECT, Button::Select)
        .button(BTN_START, Button::Start)
        .button(BTN_MODE, Button::Home)
        .button(BTN_THUMBL, Button::ThumbL)
        .button(BTN_THUMBR, Button::ThumbR)
}

fn hats(layout: Layout) -> Layout {
    layout
        .axis(AxisSource::new(ABS_HAT0X, Axis::DPadX, -1, 1))
        .axis(AxisSource::new(ABS_HAT0Y, Axis::DPadY, -1, 1))
}

/// Generic xpad-style controller.
pub fn xpad_layout() -> Layout {
    let layout = face_buttons(Layout::new())
        .button(BTN_DPAD_LEFT, Button::DPadLeft)
        .button(BTN_DPAD_RIGHT, Button::DPadRight)
        .button(BTN_DPAD_UP, Button::DPadUp)
        .button(BTN_DPAD_DOWN, Button::DPadDown)
        .button(KEY_BACK, Button::Back)
        .axis(AxisSource::new(ABS_X, Axis::LsX, -32768, 32767))
        .axis(AxisSource::new(ABS_Y, Axis::LsY, -32768, 32767))
        .axis(AxisSource::new(ABS_RX, Axis::RsX, -32768, 32767))
        .axis(AxisSource::new(ABS_RY, Axis::RsY, -32768, 32767))
        .axis(AxisSource::new(ABS_Z, Axis::LTrigger, 0, 255))
        .axis(AxisSource::new(ABS_RZ, Axis::RTrigger, 0, 255));
    hats(layout)
}

/// NVIDIA controller: right stick on Z/RZ, triggers on brake/gas and
/// system buttons reported as keys.
pub fn nv_layout() -> Layout {
    let layout = face_buttons(Layout::new())
        .button(KEY_HOMEPAGE, Button::Home)
        .button(KEY_BACK, Button::Back)
        .button(KEY_MUTE, Button::Mute)
        .axis(AxisSource::new(ABS_X, Axis::LsX, -32768, 32767))
        .axis(AxisSource::new(ABS_Y, Axis::LsY, -32768, 32767))
        .axis(AxisSource::new(ABS_Z, Axis::RsX, -32768, 32767))
        .axis(AxisSource::new(ABS_RZ, Axis::RsY, -32768, 32767))
        .axis(AxisSource::new(ABS_BRAKE, Axis::LTrigger, 0, 255))
        .axis(AxisSource::new(ABS_GAS, Axis::RTrigger, 0, 255));
    hats(layout)
}

/// Front-panel GPIO buttons.
pub fn button_board_layout() -> Layout {
    Layout::new()
        .button(KEY_HOMEPAGE, Button::Home)
        .button(KEY_BACK, Button::Back)
}

/// Built-in classification rules, in priority order.
///
/// `extra` rules are consulted right after the virtual pointer rule, so a
/// user override can never reclassify the pointer itself.
pub fn rules(extra: Vec<ClassRule>) -> Vec<ClassRule> {
    let mut rules = vec![ClassRule::name(VIRTUAL_MOUSE_NAME, DeviceClass::VirtualMouse)];
    rules.extend(extra);
    rules.push(ClassRule::product(NVIDIA, 0x7210, DeviceClass::NvController));
    rules.push(ClassRule::product(NVIDIA, 0x7214, DeviceClass::NvController));
    rules.push(ClassRule::vendor(NVIDIA, DeviceClass::Unsupported));
    rules.push(ClassRule::name_contains("gpio-keys", DeviceClass::ButtonBoard));
    for (vendor, product) in KNOWN_PADS {
        rules.push(ClassRule::product(*vendor, *product, DeviceClass::Controller));
    }
    for needle in ["gamepad", "controller", "joystick"] {
        rules.push(ClassRule::name_contains(needle, DeviceClass::Controller));
    }
    rules
}

/// Builder preloaded with the built-in layouts, mappings and rules.
pub fn builder(extra: Vec<ClassRule>) -> ProfileTableBuilder {
    let hide = |m: ButtonMapping| m.pass_thru().hide_mouse();

    ProfileTableBuilder::default()
        .rules(rules(extra))
        .layout(DeviceClass::Controller, xpad_layout())
        .layout(DeviceClass::NvController, nv_layout())
        .layout(DeviceClass::ButtonBoard, button_board_layout())
        // Clicks
        .button(Button::A, ButtonMapping::click(BTN_LEFT).on(PADS))
        .button(Button::X, ButtonMapping::click(BTN_RIGHT).on(PADS))
        .button(Button::Y, ButtonMapping::click(BTN_MIDDLE).on(PADS))
        .button(Button::L1, ButtonMapping::click(BTN_SIDE).on(PADS))
        .button(Button::R1, ButtonMapping::click(BTN_EXTRA).on(PADS))
        // Native navigation
        .button(Button::B, hide(ButtonMapping::pass().on(PADS)))
        .button(Button::Start, hide(ButtonMapping::pass().on(PADS)))
        .button(Button::Select, hide(ButtonMapping::pass().on(PADS)))
        .button(Button::Home, hide(ButtonMapping::pass().on(NAV)))
        .button(Button::Back, hide(ButtonMapping::pass().on(NAV)))
        .button(Button::Mute, hide(ButtonMapping::pass().on(NV)))
        .button(Button::DPadLeft, hide(ButtonMapping::pass().on(XPAD)))
        .button(Button::DPadRight, hide(ButtonMapping::pass().on(XPAD)))
        .button(Button::DPadUp, hide(ButtonMapping::pass().on(XPAD)))
        .button(Button::DPadDown, hide(ButtonMapping::pass().on(XPAD)))
        // Pointer
        .axis(Axis::LsX, AxisMapping::rel_x(Polarity::Negative, STICK_LEVEL, STICK_GAIN).on(PADS))
        .axis(Axis::LsX, AxisMapping::rel_x(Polarity::Positive, STICK_LEVEL, STICK_GAIN).on(PADS))
        .axis(Axis::LsY, AxisMapping::rel_y(Polarity::Negative, STICK_LEVEL, STICK_GAIN).on(PADS))
        .axis(Axis::LsY, AxisMapping::rel_y(Polarity::Positive, STICK_LEVEL, STICK_GAIN).on(PADS))
        // Wheel: stick up scrolls up
        .axis(
            Axis::RsY,
            AxisMapping::rocker(Polarity::Negative, WHEEL_LEVEL, Synth::rel(REL_WHEEL)).on(PADS),
        )
        .axis(
            Axis::RsY,
            AxisMapping::rocker(Polarity::Positive, WHEEL_LEVEL, Synth::rel(REL_WHEEL))
                .scale(-1.0)
                .on(PADS),
        )
        .axis(
            Axis::RsX,
            AxisMapping::rocker(Polarity::Negative, WHEEL_LEVEL, Synth::rel(REL_HWHEEL))
                .scale(-1.0)
                .on(PADS),
        )
        .axis(
            Axis::RsX,
            AxisMapping::rocker(Polarity::Positive, WHEEL_LEVEL, Synth::rel(REL_HWHEEL)).on(PADS),
        )
        // Triggers
        .axis(
            Axis::LTrigger,
            AxisMapping::button(Polarity::Any, TRIGGER_LEVEL, Synth::key(BTN_RIGHT)).on(PADS),
        )
        .axis(
            Axis::RTrigger,
            AxisMapping::button(Polarity::Any, TRIGGER_LEVEL, Synth::key(BTN_LEFT)).on(PADS),
        )
        // Volume rocker on the NV dpad
        .axis(
            Axis::DPadY,
            AxisMapping::rocker(Polarity::Negative, HAT_LEVEL, Synth::key(KEY_VOLUMEUP))
                .volume_only()
                .on(NV),
        )
        .axis(
            Axis::DPadY,
            AxisMapping::rocker(Polarity::Positive, HAT_LEVEL, Synth::key(KEY_VOLUMEDOWN))
                .volume_only()
                .on(NV),
        )
}
