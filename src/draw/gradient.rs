use crate::foundation::core::{Color, ColorStop};
use crate::foundation::error::{ImageError, ImageResult};
use crate::raster::composite::PremulF32;

/// Sorted, clamped color stops ready for sampling.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct GradientRamp {
    stops: Vec<ColorStop>,
}

impl GradientRamp {
    pub(crate) fn new(stops: &[ColorStop]) -> ImageResult<Self> {
        if stops.is_empty() {
            return Err(ImageError::invalid_image("gradient needs at least one color stop"));
        }
        let mut stops: Vec<ColorStop> = stops
            .iter()
            .map(|s| ColorStop {
                color: s.color.clamped(),
                position: if s.position.is_nan() {
                    0.0
                } else {
                    s.position.clamp(0.0, 1.0)
                },
            })
            .collect();
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        Ok(Self { stops })
    }

    /// Straight color at `t`, padded with the end colors outside the stop range.
    pub(crate) fn color_at(&self, t: f32) -> Color {
        let first = self.stops[0];
        if t <= first.position {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.position {
                let span = b.position - a.position;
                if span <= f32::EPSILON {
                    return b.color;
                }
                return a.color.lerp(b.color, (t - a.position) / span);
            }
        }
        self.stops[self.stops.len() - 1].color
    }

    pub(crate) fn premul_at(&self, t: f32) -> PremulF32 {
        self.color_at(t).to_premul_f32()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/draw/gradient.rs"]
mod tests;
