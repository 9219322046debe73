use padmouse_bit_mask::{Bitable, Bitmask};
use padmouse_input::{Axis, Button, DeviceClass};
use smallvec::SmallVec;

/// Analog bookkeeping for one logical axis, per direction slot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisState {
    /// Last normalized sample.
    pub value: f32,
    /// Whether the slot's mapping is currently past its threshold.
    pub latched: [bool; 2],
    /// Sub-unit relative motion carried to the next sample.
    pub remainder: [f32; 2],
    /// Rocker repeat suppressed until the axis leaves its threshold.
    pub repeat_cancelled: [bool; 2],
}

impl AxisState {
    pub(crate) fn unlatch(&mut self, slot: usize) {
        self.latched[slot] = false;
        self.remainder[slot] = 0.0;
        self.repeat_cancelled[slot] = false;
    }
}

/// Synthesized key codes currently held down, with the number of controls
/// holding each. Only the first hold presses and only the last one releases.
#[derive(Debug, Clone, Default)]
pub(crate) struct KeyHolds(SmallVec<[(u16, u8); 4]>);

impl KeyHolds {
    /// Take a hold on `code`. Returns `true` for the first one.
    pub(crate) fn acquire(&mut self, code: u16) -> bool {
        match self.0.iter_mut().find(|(c, _)| *c == code) {
            Some((_, count)) => {
                *count = count.saturating_add(1);
                false
            }
            None => {
                self.0.push((code, 1));
                true
            }
        }
    }

    /// Drop a hold on `code`. Returns `true` when it was the last one.
    pub(crate) fn release(&mut self, code: u16) -> bool {
        let Some(i) = self.0.iter().position(|(c, _)| *c == code) else {
            return false;
        };
        self.0[i].1 -= 1;
        if self.0[i].1 == 0 {
            self.0.swap_remove(i);
            true
        } else {
            false
        }
    }

    pub(crate) fn is_held(&self, code: u16) -> bool {
        self.0.iter().any(|(c, _)| *c == code)
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

/// Filter state of one open device.
#[derive(Debug, Clone)]
pub struct DeviceState {
    class: DeviceClass,
    axes: [AxisState; Axis::COUNT],
    /// Logical buttons whose press was synthesized and not yet released.
    pub(crate) pressed: Bitmask<Button>,
    /// Dpad buttons currently held through a routed hat.
    pub(crate) hat_held: Bitmask<Button>,
    pub(crate) held_keys: KeyHolds,
    /// Forward everything from this device untouched.
    pub passthrough: bool,
    /// The focused window consumes this device natively.
    pub native_input: bool,
}

impl DeviceState {
    pub fn new(class: DeviceClass) -> Self {
        Self {
            class,
            axes: [AxisState::default(); Axis::COUNT],
            pressed: Bitmask::empty(),
            hat_held: Bitmask::empty(),
            held_keys: KeyHolds::default(),
            passthrough: false,
            native_input: false,
        }
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    #[inline]
    pub fn axis(&self, axis: Axis) -> &AxisState {
        &self.axes[axis.index() as usize]
    }

    #[inline]
    pub(crate) fn axis_mut(&mut self, axis: Axis) -> &mut AxisState {
        &mut self.axes[axis.index() as usize]
    }

    #[inline]
    pub(crate) fn axis_and_keys(&mut self, axis: Axis) -> (&mut AxisState, &mut KeyHolds) {
        (&mut self.axes[axis.index() as usize], &mut self.held_keys)
    }

    /// Whether a synthesized press of `code` is still outstanding.
    pub fn is_key_held(&self, code: u16) -> bool {
        self.held_keys.is_held(code)
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.pressed.contains(button)
    }

    /// Whether any axis slot is latched active.
    pub fn any_latched(&self) -> bool {
        self.axes.iter().any(|a| a.latched.iter().any(|l| *l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_idle() {
        let state = DeviceState::new(DeviceClass::Controller);
        assert_eq!(state.class(), DeviceClass::Controller);
        assert!(!state.any_latched());
        assert!(!state.is_pressed(Button::A));
        assert_eq!(state.axis(Axis::LsX).value, 0.0);
    }

    #[test]
    fn unlatch_clears_slot_only() {
        let mut axis = AxisState {
            latched: [true, true],
            remainder: [0.4, 0.2],
            repeat_cancelled: [true, false],
            ..AxisState::default()
        };
        axis.unlatch(0);
        assert_eq!(axis.latched, [false, true]);
        assert_eq!(axis.remainder, [0.0, 0.2]);
        assert!(!axis.repeat_cancelled[0]);
    }

    #[test]
    fn key_holds_count_sources() {
        let mut holds = KeyHolds::default();
        assert!(holds.acquire(272));
        assert!(!holds.acquire(272));
        assert!(holds.acquire(273));
        assert!(!holds.release(272));
        assert!(holds.is_held(272));
        assert!(holds.release(272));
        assert!(!holds.is_held(272));
        assert!(!holds.release(272));
        holds.clear();
        assert!(!holds.is_held(273));
    }
}
