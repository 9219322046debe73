use padmouse_input::codes::{BTN_LEFT, KEY_MAX, REL_MAX, REL_X, REL_Y};
use smallvec::SmallVec;

use crate::mapping::{AxisMapping, ButtonMapping, Method, SynthKind};

/// Key and relative-axis codes the virtual mouse advertises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    keys: SmallVec<[u16; 16]>,
    rels: SmallVec<[u16; 4]>,
}

impl Default for Capabilities {
    /// A pointer always moves on X/Y and has a primary button.
    fn default() -> Self {
        let mut caps = Self {
            keys: SmallVec::new(),
            rels: SmallVec::new(),
        };
        caps.add_key(BTN_LEFT);
        caps.add_rel(REL_X);
        caps.add_rel(REL_Y);
        caps
    }
}

impl Capabilities {
    pub fn keys(&self) -> &[u16] {
        &self.keys
    }

    pub fn rels(&self) -> &[u16] {
        &self.rels
    }

    pub fn has_key(&self, code: u16) -> bool {
        self.keys.contains(&code)
    }

    pub fn has_rel(&self, code: u16) -> bool {
        self.rels.contains(&code)
    }

    pub(crate) fn add_button(&mut self, mapping: &ButtonMapping) {
        if let Some(code) = mapping.mouse_code {
            self.add_key(code);
        }
    }

    pub(crate) fn add_axis(&mut self, mapping: &AxisMapping) {
        match mapping.method {
            Method::RelAxisX => self.add_rel(REL_X),
            Method::RelAxisY => self.add_rel(REL_Y),
            Method::Button | Method::Rocker => match mapping.synth {
                Some(s) if s.kind == SynthKind::Key => self.add_key(s.code),
                Some(s) => self.add_rel(s.code),
                None => {}
            },
            Method::Ignore => {}
        }
    }

    fn add_key(&mut self, code: u16) {
        if code <= KEY_MAX && !self.keys.contains(&code) {
            self.keys.push(code);
            self.keys.sort_unstable();
        }
    }

    fn add_rel(&mut self, code: u16) {
        if code <= REL_MAX && !self.rels.contains(&code) {
            self.rels.push(code);
            self.rels.sort_unstable();
        }
    }

    /// Set the advertised bits in evdev-style capability arrays.
    ///
    /// Bits that fall outside a short buffer are left out; nothing is cleared.
    pub fn write_bitmasks(&self, key_bits: &mut [u8], rel_bits: &mut [u8]) {
        write_bits(&self.keys, key_bits);
        write_bits(&self.rels, rel_bits);
    }
}

fn write_bits(codes: &[u16], bits: &mut [u8]) {
    for &code in codes {
        let code = usize::from(code);
        if let Some(byte) = bits.get_mut(code / 8) {
            *byte |= 1 << (code % 8);
        }
    }
}

/// Test whether `code` is set in an evdev-style bit array.
pub fn test_bit(bits: &[u8], code: u16) -> bool {
    let code = usize::from(code);
    bits.get(code / 8).is_some_and(|b| b & (1 << (code % 8)) != 0)
}

#[cfg(test)]
mod tests {
    use padmouse_input::codes::{BTN_RIGHT, KEY_BITMASK_BYTES, REL_BITMASK_BYTES, REL_WHEEL};

    use super::*;
    use crate::mapping::{Polarity, Synth};

    #[test]
    fn baseline_is_a_pointer() {
        let caps = Capabilities::default();
        assert_eq!(caps.keys(), &[BTN_LEFT]);
        assert_eq!(caps.rels(), &[REL_X, REL_Y]);
    }

    #[test]
    fn codes_are_deduplicated() {
        let mut caps = Capabilities::default();
        caps.add_button(&ButtonMapping::click(BTN_RIGHT));
        caps.add_button(&ButtonMapping::click(BTN_RIGHT));
        caps.add_axis(&AxisMapping::rocker(Polarity::Positive, 0.5, Synth::rel(REL_WHEEL)));
        caps.add_axis(&AxisMapping::rel_x(Polarity::Negative, 0.1, 4.0));
        assert_eq!(caps.keys(), &[BTN_LEFT, BTN_RIGHT]);
        assert_eq!(caps.rels(), &[REL_X, REL_Y, REL_WHEEL]);
    }

    #[test]
    fn bitmasks_follow_evdev_layout() {
        let mut caps = Capabilities::default();
        caps.add_button(&ButtonMapping::click(BTN_RIGHT));
        let mut keys = [0u8; KEY_BITMASK_BYTES];
        let mut rels = [0u8; REL_BITMASK_BYTES];
        caps.write_bitmasks(&mut keys, &mut rels);

        // BTN_LEFT = 0x110 lands in byte 34, bit 0.
        assert_eq!(keys[34], 0b0000_0011);
        assert_eq!(rels[0], 0b0000_0011);
        assert!(test_bit(&keys, BTN_RIGHT));
        assert!(!test_bit(&keys, 0x112));
    }

    #[test]
    fn short_buffers_are_not_overrun() {
        let caps = Capabilities::default();
        let mut keys = [0u8; 4];
        let mut rels = [0u8; 0];
        caps.write_bitmasks(&mut keys, &mut rels);
        assert_eq!(keys, [0; 4]);
    }
}
