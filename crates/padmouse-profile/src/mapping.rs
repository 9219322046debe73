use padmouse_bit_mask::Bitmask;
use padmouse_input::DeviceClass;

/// Classes a mapping record applies to.
pub type ClassSet = Bitmask<DeviceClass>;

/// Which signed direction of an axis a mapping listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Any,
    Negative,
    Positive,
}

/// How an axis mapping turns analog samples into output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Drop the axis.
    Ignore,
    /// Threshold crossing becomes a press/release.
    Button,
    /// Press on crossing, one repeat tick per sample while held.
    Rocker,
    /// Continuous relative pointer motion on X.
    RelAxisX,
    /// Continuous relative pointer motion on Y.
    RelAxisY,
}

/// Event type of a synthesized output code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SynthKind {
    Key,
    Rel,
}

/// Output type/code pair used by `Button` and `Rocker` axis mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Synth {
    pub kind: SynthKind,
    pub code: u16,
}

impl Synth {
    pub const fn key(code: u16) -> Self {
        Self { kind: SynthKind::Key, code }
    }

    pub const fn rel(code: u16) -> Self {
        Self { kind: SynthKind::Rel, code }
    }
}

/// What happens when one logical button changes state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonMapping {
    pub devices: ClassSet,
    /// Key or mouse button code emitted through the virtual mouse.
    pub mouse_code: Option<u16>,
    /// Forward the original event as well.
    pub pass_thru: bool,
    /// Request a cursor fade when the button fires.
    pub hide_mouse: bool,
    /// Active only while volume mode is on.
    pub volume_only: bool,
}

impl ButtonMapping {
    /// Button that clicks `code` on the virtual mouse and swallows the original.
    pub fn click(code: u16) -> Self {
        Self {
            devices: ClassSet::empty(),
            mouse_code: Some(code),
            pass_thru: false,
            hide_mouse: false,
            volume_only: false,
        }
    }

    /// Button that keeps its original meaning.
    pub fn pass() -> Self {
        Self {
            devices: ClassSet::empty(),
            mouse_code: None,
            pass_thru: true,
            hide_mouse: false,
            volume_only: false,
        }
    }

    /// Button that is swallowed without producing anything.
    pub fn swallow() -> Self {
        Self {
            pass_thru: false,
            ..Self::pass()
        }
    }

    pub fn on(mut self, devices: &[DeviceClass]) -> Self {
        self.devices = ClassSet::new(devices);
        self
    }

    pub fn pass_thru(mut self) -> Self {
        self.pass_thru = true;
        self
    }

    pub fn hide_mouse(mut self) -> Self {
        self.hide_mouse = true;
        self
    }

    pub fn volume_only(mut self) -> Self {
        self.volume_only = true;
        self
    }

    /// Whether the mapping produces anything on the virtual mouse.
    pub fn synthesizes(&self) -> bool {
        self.mouse_code.is_some()
    }
}

/// What happens when one direction of a logical axis moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMapping {
    pub devices: ClassSet,
    pub polarity: Polarity,
    /// Threshold on the normalized, direction-adjusted value.
    pub trigger_level: f32,
    /// Values below the threshold count as active.
    pub trigger_low: bool,
    pub method: Method,
    pub pass_thru: bool,
    pub hide_mouse: bool,
    pub volume_only: bool,
    pub synth: Option<Synth>,
    /// Pointer gain for relative motion, tick size and sign for relative
    /// rockers.
    pub scale: f32,
}

impl AxisMapping {
    fn with(polarity: Polarity, trigger_level: f32, method: Method) -> Self {
        Self {
            devices: ClassSet::empty(),
            polarity,
            trigger_level,
            trigger_low: false,
            method,
            pass_thru: false,
            hide_mouse: false,
            volume_only: false,
            synth: None,
            scale: 1.0,
        }
    }

    pub fn ignore(polarity: Polarity) -> Self {
        Self::with(polarity, 0.0, Method::Ignore)
    }

    pub fn button(polarity: Polarity, trigger_level: f32, synth: Synth) -> Self {
        Self {
            synth: Some(synth),
            ..Self::with(polarity, trigger_level, Method::Button)
        }
    }

    pub fn rocker(polarity: Polarity, trigger_level: f32, synth: Synth) -> Self {
        Self {
            synth: Some(synth),
            ..Self::with(polarity, trigger_level, Method::Rocker)
        }
    }

    pub fn rel_x(polarity: Polarity, trigger_level: f32, scale: f32) -> Self {
        Self {
            scale,
            ..Self::with(polarity, trigger_level, Method::RelAxisX)
        }
    }

    pub fn rel_y(polarity: Polarity, trigger_level: f32, scale: f32) -> Self {
        Self {
            scale,
            ..Self::with(polarity, trigger_level, Method::RelAxisY)
        }
    }

    pub fn on(mut self, devices: &[DeviceClass]) -> Self {
        self.devices = ClassSet::new(devices);
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn trigger_low(mut self) -> Self {
        self.trigger_low = true;
        self
    }

    pub fn pass_thru(mut self) -> Self {
        self.pass_thru = true;
        self
    }

    pub fn hide_mouse(mut self) -> Self {
        self.hide_mouse = true;
        self
    }

    pub fn volume_only(mut self) -> Self {
        self.volume_only = true;
        self
    }

    /// Whether the mapping produces anything on the virtual mouse.
    pub fn synthesizes(&self) -> bool {
        !matches!(self.method, Method::Ignore)
    }

    /// Direction-adjusted value, or `None` when the sample has the wrong sign
    /// for this mapping's polarity.
    #[inline]
    pub fn directed(&self, value: f32) -> Option<f32> {
        match self.polarity {
            Polarity::Any => Some(value),
            Polarity::Positive if value > 0.0 => Some(value),
            Polarity::Negative if value < 0.0 => Some(-value),
            _ => None,
        }
    }

    /// Whether `value` lies on the active side of the threshold.
    #[inline]
    pub fn is_active(&self, value: f32) -> bool {
        let Some(d) = self.directed(value) else {
            return false;
        };
        if self.trigger_low {
            d < self.trigger_level
        } else {
            d > self.trigger_level
        }
    }

    /// How far an active sample lies beyond the threshold.
    #[inline]
    pub fn excess(&self, value: f32) -> f32 {
        let d = self.directed(value).unwrap_or(0.0);
        (d - self.trigger_level).abs()
    }

    /// Sign applied to relative output: negative mappings move backwards.
    #[inline]
    pub fn direction(&self) -> f32 {
        match self.polarity {
            Polarity::Negative => -1.0,
            Polarity::Any | Polarity::Positive => 1.0,
        }
    }

    /// Whether two mappings can be active for the same sample.
    pub fn overlaps(&self, other: &AxisMapping) -> bool {
        self.polarity == Polarity::Any
            || other.polarity == Polarity::Any
            || self.polarity == other.polarity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polarity_filters_wrong_sign() {
        let neg = AxisMapping::rel_x(Polarity::Negative, 0.1, 10.0);
        assert!(neg.is_active(-0.5));
        assert!(!neg.is_active(0.5));
        assert_eq!(neg.directed(0.5), None);
        assert_eq!(neg.directed(-0.5), Some(0.5));
    }

    #[test]
    fn trigger_low_inverts_active_side() {
        let low = AxisMapping::button(Polarity::Any, -0.5, Synth::key(1)).trigger_low();
        assert!(low.is_active(-0.9));
        assert!(!low.is_active(0.0));
    }

    #[test]
    fn threshold_is_exclusive() {
        let m = AxisMapping::button(Polarity::Any, 0.5, Synth::key(1));
        assert!(!m.is_active(0.5));
        assert!(m.is_active(0.5001));
    }

    #[test]
    fn overlap_detection() {
        let any = AxisMapping::ignore(Polarity::Any);
        let pos = AxisMapping::ignore(Polarity::Positive);
        let neg = AxisMapping::ignore(Polarity::Negative);
        assert!(any.overlaps(&neg));
        assert!(pos.overlaps(&pos));
        assert!(!pos.overlaps(&neg));
    }
}
