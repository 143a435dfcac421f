// File: crates/chart-axis/src/scale.rs
// Summary: Axis transform seams (value <-> linear space) and the pixel mapping on top of them.

/// Axis value coordinate (e.g., a millisecond timestamp).
pub type Value = f64;
/// Evenly spaced internal coordinate produced by ordinal/break transforms.
pub type Linear = f64;

/// Conversion between true axis values and the evenly spaced linear space.
pub trait AxisTransform {
    fn to_linear(&self, value: Value) -> Linear;
    fn from_linear(&self, linear: Linear) -> Value;
}

/// Mapping between axis values and pixels.
pub trait PixelTranslate {
    fn translate(&self, value: Value) -> f64;
    fn untranslate(&self, px: f64) -> Value;
}

/// Plain linear axes: linear space equals value space.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl AxisTransform for Identity {
    #[inline]
    fn to_linear(&self, value: Value) -> Linear { value }
    #[inline]
    fn from_linear(&self, linear: Linear) -> Value { linear }
}

// Pixel space equal to value space; used where no geometry is involved.
impl PixelTranslate for Identity {
    fn translate(&self, value: Value) -> f64 { value }
    fn untranslate(&self, px: f64) -> Value { px }
}

/// Linear-space window `[lin_min, lin_max]` laid onto `length_px` pixels starting at `left_px`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelScale {
    pub left_px: f64,
    pub length_px: f64,
    pub lin_min: Linear,
    pub lin_max: Linear,
}

impl PixelScale {
    pub fn new(left_px: f64, length_px: f64, lin_min: Linear, lin_max: Linear) -> Self {
        let mut s = Self { left_px, length_px: length_px.max(1.0), lin_min, lin_max };
        if !(s.lin_max - s.lin_min).is_finite() || (s.lin_max - s.lin_min).abs() < 1e-12 {
            s.lin_max = s.lin_min + 1.0;
        }
        s
    }

    /// Pixels per linear unit.
    #[inline]
    pub fn ratio(&self) -> f64 {
        self.length_px / (self.lin_max - self.lin_min)
    }

    #[inline]
    pub fn to_px(&self, linear: Linear) -> f64 {
        self.left_px + (linear - self.lin_min) * self.ratio()
    }

    #[inline]
    pub fn from_px(&self, px: f64) -> Linear {
        self.lin_min + (px - self.left_px) / self.ratio()
    }
}

impl PixelTranslate for PixelScale {
    fn translate(&self, value: Value) -> f64 { self.to_px(value) }
    fn untranslate(&self, px: f64) -> Value { self.from_px(px) }
}
