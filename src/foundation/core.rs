use crate::foundation::error::{ImageError, ImageResult};
use crate::foundation::math::unit_to_u8;

pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Largest width or height a buffer may have.
pub const MAX_DIMENSION: u32 = u16::MAX as u32;

/// Straight (non-premultiplied) RGBA color with `f32` components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);
    pub const GRAY: Color = Color::new(0.5, 0.5, 0.5, 1.0);
    pub const LIGHT_GRAY: Color = Color::new(2.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Gray level plus alpha.
    pub const fn white(level: f32, a: f32) -> Self {
        Self::new(level, level, level, a)
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(s: &str) -> ImageResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 && hex.len() != 8 {
            return Err(ImageError::invalid_image(format!(
                "color '{s}' must be #rrggbb or #rrggbbaa"
            )));
        }
        let byte = |i: usize| -> ImageResult<u8> {
            hex.get(i..i + 2)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| ImageError::invalid_image(format!("invalid hex digits in '{s}'")))
        };
        let a = if hex.len() == 8 { byte(6)? } else { 255 };
        Ok(Self::from_rgba8(byte(0)?, byte(2)?, byte(4)?, a))
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Clamp every component into `[0, 1]`; NaN becomes 0.
    pub fn clamped(self) -> Self {
        fn c(v: f32) -> f32 {
            if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
        }
        Self::new(c(self.r), c(self.g), c(self.b), c(self.a))
    }

    /// Component-wise linear interpolation in straight space.
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Premultiplied components as `f32` in `[0, 1]`.
    pub fn to_premul_f32(self) -> [f32; 4] {
        let c = self.clamped();
        [c.r * c.a, c.g * c.a, c.b * c.a, c.a]
    }

    /// Premultiplied RGBA8.
    pub fn to_premul_rgba8(self) -> [u8; 4] {
        let [r, g, b, a] = self.to_premul_f32();
        [unit_to_u8(r), unit_to_u8(g), unit_to_u8(b), unit_to_u8(a)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// One stop of a gradient ramp.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorStop {
    pub color: Color,
    /// Location along the ramp in `[0, 1]`.
    pub position: f32,
}

impl ColorStop {
    pub fn new(color: Color, position: f32) -> Self {
        Self { color, position }
    }

    /// Spread `colors` evenly over `[0, 1]`, first at 0 and last at 1.
    pub fn evenly_spaced(colors: &[Color]) -> Vec<ColorStop> {
        let n = colors.len();
        colors
            .iter()
            .enumerate()
            .map(|(i, &color)| {
                let position = if n <= 1 {
                    0.0
                } else {
                    i as f32 / (n - 1) as f32
                };
                ColorStop { color, position }
            })
            .collect()
    }
}

/// How a source rectangle maps into a differently sized target during resize.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ContentMode {
    #[default]
    ScaleToFill,
    ScaleAspectFit,
    ScaleAspectFill,
}

/// Horizontal placement of each text line inside its layout rectangle.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TextAlignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Convert a target size into pixel dimensions.
///
/// Each side is rounded to the nearest pixel and must land in `1..=MAX_DIMENSION`.
pub fn pixel_dimensions(size: Size) -> ImageResult<(u32, u32)> {
    Ok((
        pixel_extent(size.width, "width")?,
        pixel_extent(size.height, "height")?,
    ))
}

pub(crate) fn pixel_extent(v: f64, what: &str) -> ImageResult<u32> {
    if !v.is_finite() {
        return Err(ImageError::invalid_image(format!("{what} must be finite")));
    }
    let px = v.round();
    if px < 1.0 {
        return Err(ImageError::invalid_image(format!(
            "{what} must be > 0 (got {v})"
        )));
    }
    if px > f64::from(MAX_DIMENSION) {
        return Err(ImageError::invalid_image(format!(
            "{what} {v} exceeds {MAX_DIMENSION}"
        )));
    }
    Ok(px as u32)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
