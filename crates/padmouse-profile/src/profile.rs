use padmouse_bit_mask::{Bitable, Bitmask};
use padmouse_input::{Axis, Button, DeviceClass};

use crate::layout::{AxisSource, Layout};
use crate::mapping::{AxisMapping, ButtonMapping};

/// Both direction slots of one logical axis.
pub type AxisSlots = [Option<AxisMapping>; 2];

/// Mapping records and physical layout of one device class.
#[derive(Debug, Clone)]
pub struct Profile {
    class: DeviceClass,
    layout: Layout,
    buttons: [Option<ButtonMapping>; Button::COUNT],
    axes: [AxisSlots; Axis::COUNT],
    dpad_routed: Bitmask<Axis>,
}

impl Profile {
    pub(crate) fn new(class: DeviceClass) -> Self {
        Self {
            class,
            layout: Layout::new(),
            buttons: [None; Button::COUNT],
            axes: [[None; 2]; Axis::COUNT],
            dpad_routed: Bitmask::empty(),
        }
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Whether the class has anything to filter at all.
    pub fn is_empty(&self) -> bool {
        self.buttons.iter().all(Option::is_none)
            && self.axes.iter().flatten().all(Option::is_none)
    }

    #[inline]
    pub fn button_for_code(&self, code: u16) -> Option<Button> {
        self.layout.button_for_code(code)
    }

    #[inline]
    pub fn button_mapping(&self, button: Button) -> Option<&ButtonMapping> {
        self.buttons[button.index() as usize].as_ref()
    }

    #[inline]
    pub fn axis_source(&self, code: u16) -> Option<&AxisSource> {
        self.layout.axis_source(code)
    }

    #[inline]
    pub fn axis_slots(&self, axis: Axis) -> &AxisSlots {
        &self.axes[axis.index() as usize]
    }

    /// Whether hat samples on `axis` are delivered through the dpad buttons.
    #[inline]
    pub fn routes_dpad(&self, axis: Axis) -> bool {
        self.dpad_routed.contains(axis)
    }

    pub fn button_mappings(&self) -> impl Iterator<Item = (Button, &ButtonMapping)> + '_ {
        Button::ALL
            .iter()
            .zip(self.buttons.iter())
            .filter_map(|(b, m)| m.as_ref().map(|m| (*b, m)))
    }

    pub fn axis_mappings(&self) -> impl Iterator<Item = (Axis, &AxisMapping)> + '_ {
        Axis::ALL.iter().zip(self.axes.iter()).flat_map(|(a, slots)| {
            slots.iter().flatten().map(move |m| (*a, m))
        })
    }

    pub(crate) fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    pub(crate) fn button_slot(&mut self, button: Button) -> &mut Option<ButtonMapping> {
        &mut self.buttons[button.index() as usize]
    }

    pub(crate) fn axis_slots_mut(&mut self, axis: Axis) -> &mut AxisSlots {
        &mut self.axes[axis.index() as usize]
    }

    /// Recompute which hat axes defer to dpad button mappings.
    pub(crate) fn refresh_dpad_routing(&mut self) {
        let mut routed = Bitmask::empty();
        for axis in [Axis::DPadX, Axis::DPadY] {
            let Some((neg, pos)) = axis.dpad_buttons() else {
                continue;
            };
            if self.button_mapping(neg).is_some() || self.button_mapping(pos).is_some() {
                routed.insert(axis);
            }
        }
        self.dpad_routed = routed;
    }
}
