use std::sync::Arc;

use ahash::AHashMap;
use padmouse_input::{Axis, Button, DeviceClass, DeviceId, DeviceIdentity, RawEvent};
use padmouse_profile::{AxisSource, Layout, ProfileTable};
use smallvec::SmallVec;

/// Range SDL reports for sticks.
const STICK_RANGE: (i32, i32) = (i16::MIN as i32, i16::MAX as i32);
/// Range SDL reports for triggers.
const TRIGGER_RANGE: (i32, i32) = (0, i16::MAX as i32);

#[derive(Debug, Clone, Copy, Default)]
struct Opened {
    class: DeviceClass,
    /// Dpad buttons held on controllers that report the dpad as a hat.
    hat: [bool; 4],
}

/// Turns logical controller input back into the native codes of the
/// device's class layout, so the filter sees what the kernel would report.
#[derive(Debug)]
pub struct Translator {
    table: Arc<ProfileTable>,
    devices: AHashMap<DeviceId, Opened>,
}

impl Translator {
    pub fn new(table: Arc<ProfileTable>) -> Self {
        Self {
            table,
            devices: AHashMap::new(),
        }
    }

    pub fn add(&mut self, id: DeviceId, identity: &DeviceIdentity) -> DeviceClass {
        let class = self.table.classify(identity);
        self.devices.insert(
            id,
            Opened {
                class,
                ..Opened::default()
            },
        );
        class
    }

    pub fn remove(&mut self, id: DeviceId) {
        self.devices.remove(&id);
    }

    fn layout(&self, class: DeviceClass) -> &Layout {
        self.table.profile(class).layout()
    }

    /// Native events for a button edge. Empty when the layout has no code
    /// for the button.
    pub fn button(&mut self, id: DeviceId, button: Button, pressed: bool) -> SmallVec<[RawEvent; 2]> {
        let mut out = SmallVec::new();
        let Some(opened) = self.devices.get(&id).copied() else {
            return out;
        };
        let layout = self.layout(opened.class);
        if let Some(code) = layout.code_for_button(button) {
            let value = if pressed {
                RawEvent::PRESS
            } else {
                RawEvent::RELEASE
            };
            out.push(RawEvent::key(code, value));
            return out;
        }

        let Some((axis, slot)) = hat_slot(button) else {
            return out;
        };
        let Some(source) = layout.source_for_axis(axis).copied() else {
            return out;
        };
        let Some(opened) = self.devices.get_mut(&id) else {
            return out;
        };
        opened.hat[slot] = pressed;
        let (neg, pos) = if axis == Axis::DPadX { (0, 1) } else { (2, 3) };
        let direction = i32::from(opened.hat[pos]) - i32::from(opened.hat[neg]);
        out.push(RawEvent::abs(source.code, hat_value(&source, direction)));
        out
    }

    /// Native event for an SDL axis sample.
    pub fn axis(&self, id: DeviceId, axis: Axis, value: i16) -> Option<RawEvent> {
        let opened = self.devices.get(&id)?;
        let source = self.layout(opened.class).source_for_axis(axis)?;
        let from = match axis {
            Axis::LTrigger | Axis::RTrigger => TRIGGER_RANGE,
            _ => STICK_RANGE,
        };
        Some(RawEvent::abs(source.code, rescale(i32::from(value), from, source)))
    }
}

fn hat_slot(button: Button) -> Option<(Axis, usize)> {
    Some(match button {
        Button::DPadLeft => (Axis::DPadX, 0),
        Button::DPadRight => (Axis::DPadX, 1),
        Button::DPadUp => (Axis::DPadY, 2),
        Button::DPadDown => (Axis::DPadY, 3),
        _ => return None,
    })
}

fn hat_value(source: &AxisSource, direction: i32) -> i32 {
    match direction {
        d if d < 0 => source.min,
        d if d > 0 => source.max,
        _ => source.min + (source.max - source.min) / 2,
    }
}

/// Linear map of `value` from `from` onto the native range of `source`.
fn rescale(value: i32, from: (i32, i32), source: &AxisSource) -> i32 {
    let (lo, hi) = (i64::from(from.0), i64::from(from.1));
    let value = i64::from(value).clamp(lo, hi);
    let (min, max) = (i64::from(source.min), i64::from(source.max));
    (min + (value - lo) * (max - min) / (hi - lo)) as i32
}
