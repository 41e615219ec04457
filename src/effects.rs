use crate::draw::context::DrawingContext;
use crate::foundation::core::Color;
use crate::foundation::error::{ImageError, ImageResult};
use crate::raster::buffer::{PixelFormat, RasterBuffer};

/// Blur, saturation and tint applied together, as in frosted-glass style backgrounds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BlurEffect {
    /// Gaussian-equivalent blur radius in points; scaled by the image's scale.
    pub radius: f64,
    /// Color composited over the blurred result.
    pub tint: Option<Color>,
    /// `1.0` leaves saturation unchanged, `0.0` is grayscale, negative inverts hue.
    pub saturation: f32,
}

impl BlurEffect {
    pub fn light() -> Self {
        Self {
            radius: 30.0,
            tint: Some(Color::white(1.0, 0.3)),
            saturation: 1.8,
        }
    }

    pub fn extra_light() -> Self {
        Self {
            radius: 20.0,
            tint: Some(Color::white(0.97, 0.82)),
            saturation: 1.8,
        }
    }

    pub fn dark() -> Self {
        Self {
            radius: 20.0,
            tint: Some(Color::white(0.11, 0.73)),
            saturation: 1.8,
        }
    }

    /// Strong desaturation under a translucent `color` wash.
    pub fn tint(color: Color) -> Self {
        Self {
            radius: 10.0,
            tint: Some(color.with_alpha(0.6)),
            saturation: -1.0,
        }
    }

    /// Look up a preset by its command-line name.
    pub fn preset(name: &str) -> ImageResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::light()),
            "extra_light" | "extra-light" => Ok(Self::extra_light()),
            "dark" => Ok(Self::dark()),
            other => Err(ImageError::invalid_image(format!(
                "unknown effect preset '{other}'"
            ))),
        }
    }
}

impl RasterBuffer {
    /// Blurred, saturation-adjusted and tinted copy in premultiplied RGBA.
    #[tracing::instrument(level = "debug", skip(self), fields(w = self.width(), h = self.height()))]
    pub fn apply_blur(&self, effect: &BlurEffect) -> ImageResult<RasterBuffer> {
        if !effect.radius.is_finite() || effect.radius < 0.0 {
            return Err(ImageError::invalid_image(format!(
                "blur radius {} must be finite and >= 0",
                effect.radius
            )));
        }
        let (w, h) = (self.width(), self.height());
        let mut rgba = self.to_premul_rgba8();

        let kernel = box_kernel_size(effect.radius * self.scale());
        if kernel > 1 {
            let mut tmp = vec![0u8; rgba.len()];
            for _ in 0..3 {
                horizontal_box(&rgba, &mut tmp, w, h, kernel);
                vertical_box(&tmp, &mut rgba, w, h, kernel);
            }
        }
        if (effect.saturation - 1.0).abs() > 1e-4 {
            saturate_in_place(&mut rgba, effect.saturation);
        }

        let blurred = RasterBuffer::from_premul_rgba8(w, h, rgba)?.with_scale(self.scale());
        let Some(tint) = effect.tint else {
            return Ok(blurred);
        };
        DrawingContext::render(w, h, PixelFormat::RGBA_PREMUL, self.scale(), |ctx| {
            ctx.draw_image(blurred.bounds(), &blurred);
            ctx.fill_rect(ctx.bounds(), tint);
            Ok(())
        })
    }

    pub fn apply_light_effect(&self) -> ImageResult<RasterBuffer> {
        self.apply_blur(&BlurEffect::light())
    }

    pub fn apply_extra_light_effect(&self) -> ImageResult<RasterBuffer> {
        self.apply_blur(&BlurEffect::extra_light())
    }

    pub fn apply_dark_effect(&self) -> ImageResult<RasterBuffer> {
        self.apply_blur(&BlurEffect::dark())
    }

    pub fn apply_tint_effect(&self, color: Color) -> ImageResult<RasterBuffer> {
        self.apply_blur(&BlurEffect::tint(color))
    }
}

// Three box passes of this odd size approximate a Gaussian of the given radius.
fn box_kernel_size(radius: f64) -> u32 {
    if radius < 0.1 {
        return 1;
    }
    let d = (radius * 3.0 * (2.0 * std::f64::consts::PI).sqrt() / 4.0 + 0.5).floor() as u32;
    if d % 2 == 1 { d } else { d + 1 }
}

fn horizontal_box(src: &[u8], dst: &mut [u8], width: u32, height: u32, kernel: u32) {
    let w = width as i64;
    let r = i64::from(kernel / 2);
    let k = kernel.max(1);
    for y in 0..height as i64 {
        let row = (y * w) as usize * 4;
        let px = |x: i64, c: usize| -> u32 {
            u32::from(src[row + (x.clamp(0, w - 1) as usize) * 4 + c])
        };
        let mut acc = [0u32; 4];
        for dx in -r..=r {
            for c in 0..4 {
                acc[c] += px(dx, c);
            }
        }
        for x in 0..w {
            let out = row + x as usize * 4;
            for c in 0..4 {
                dst[out + c] = ((acc[c] + k / 2) / k) as u8;
                acc[c] = acc[c] + px(x + r + 1, c) - px(x - r, c);
            }
        }
    }
}

fn vertical_box(src: &[u8], dst: &mut [u8], width: u32, height: u32, kernel: u32) {
    let w = width as usize;
    let h = height as i64;
    let r = i64::from(kernel / 2);
    let k = kernel.max(1);
    for x in 0..w {
        let px = |y: i64, c: usize| -> u32 {
            u32::from(src[(y.clamp(0, h - 1) as usize * w + x) * 4 + c])
        };
        let mut acc = [0u32; 4];
        for dy in -r..=r {
            for c in 0..4 {
                acc[c] += px(dy, c);
            }
        }
        for y in 0..h {
            let out = (y as usize * w + x) * 4;
            for c in 0..4 {
                dst[out + c] = ((acc[c] + k / 2) / k) as u8;
                acc[c] = acc[c] + px(y + r + 1, c) - px(y - r, c);
            }
        }
    }
}

// Rec. 709 luma; premultiplied color stays within [0, alpha].
fn saturate_in_place(rgba: &mut [u8], s: f32) {
    for px in rgba.chunks_exact_mut(4) {
        let a = f32::from(px[3]);
        let (r, g, b) = (f32::from(px[0]), f32::from(px[1]), f32::from(px[2]));
        let l = 0.2126 * r + 0.7152 * g + 0.0722 * b;
        for (i, c) in [r, g, b].into_iter().enumerate() {
            px[i] = (l + s * (c - l)).round().clamp(0.0, a) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/effects.rs"]
mod tests;
