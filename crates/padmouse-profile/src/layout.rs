use padmouse_input::{Axis, Button};
use smallvec::SmallVec;

/// A physical absolute axis and the native range it reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSource {
    pub code: u16,
    pub axis: Axis,
    pub min: i32,
    pub max: i32,
}

impl AxisSource {
    pub const fn new(code: u16, axis: Axis, min: i32, max: i32) -> Self {
        Self {
            code,
            axis,
            min,
            max,
        }
    }

    /// Map a native sample onto the normalized range.
    ///
    /// Signed ranges land in `[-1, 1]` centered on zero, unsigned ranges
    /// (triggers) in `[0, 1]`.
    #[inline]
    pub fn normalize(&self, raw: i32) -> f32 {
        if self.min < 0 {
            let span = self.min.unsigned_abs().max(self.max.unsigned_abs()) as f32;
            (raw as f32 / span).clamp(-1.0, 1.0)
        } else {
            let span = (i64::from(self.max) - i64::from(self.min)) as f32;
            ((i64::from(raw) - i64::from(self.min)) as f32 / span).clamp(0.0, 1.0)
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.min < self.max
    }
}

/// Physical codes a device class reports and the logical controls they carry.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    buttons: SmallVec<[(u16, Button); 24]>,
    axes: SmallVec<[AxisSource; 8]>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn button(mut self, code: u16, button: Button) -> Self {
        self.buttons.push((code, button));
        self
    }

    pub fn axis(mut self, source: AxisSource) -> Self {
        self.axes.push(source);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty() && self.axes.is_empty()
    }

    #[inline]
    pub fn button_for_code(&self, code: u16) -> Option<Button> {
        self.buttons
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, b)| *b)
    }

    /// First physical code that reports `button`.
    pub fn code_for_button(&self, button: Button) -> Option<u16> {
        self.buttons
            .iter()
            .find(|(_, b)| *b == button)
            .map(|(c, _)| *c)
    }

    #[inline]
    pub fn axis_source(&self, code: u16) -> Option<&AxisSource> {
        self.axes.iter().find(|s| s.code == code)
    }

    pub fn source_for_axis(&self, axis: Axis) -> Option<&AxisSource> {
        self.axes.iter().find(|s| s.axis == axis)
    }

    pub fn buttons(&self) -> impl Iterator<Item = (u16, Button)> + '_ {
        self.buttons.iter().copied()
    }

    pub fn axes(&self) -> impl Iterator<Item = &AxisSource> + '_ {
        self.axes.iter()
    }
}
