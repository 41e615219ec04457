use std::sync::Arc;

use crate::foundation::{
    core::{MAX_DIMENSION, Rect, Size},
    error::{ImageError, ImageResult},
    math::{luma_u8, premul_rgba8, unpremul_rgba8},
};

/// Color channel layout of a [`RasterBuffer`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum ChannelLayout {
    /// Four bytes per pixel; byte order depends on the [`AlphaMode`].
    Rgba,
    /// One luminance byte per pixel, never with alpha.
    Gray,
}

impl ChannelLayout {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ChannelLayout::Rgba => 4,
            ChannelLayout::Gray => 1,
        }
    }
}

/// Where the alpha channel sits and whether color is premultiplied by it.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum AlphaMode {
    /// No alpha; the fourth RGBA byte is padding.
    None,
    /// Straight alpha stored before the color bytes (`ARGB`).
    First,
    /// Straight alpha stored after the color bytes (`RGBA`).
    Last,
    /// Premultiplied `ARGB`.
    PremultipliedFirst,
    /// Premultiplied `RGBA`.
    PremultipliedLast,
}

impl AlphaMode {
    pub fn has_alpha(self) -> bool {
        !matches!(self, AlphaMode::None)
    }

    pub fn is_premultiplied(self) -> bool {
        matches!(
            self,
            AlphaMode::PremultipliedFirst | AlphaMode::PremultipliedLast
        )
    }

    fn alpha_first(self) -> bool {
        matches!(self, AlphaMode::First | AlphaMode::PremultipliedFirst)
    }
}

/// Channel layout plus alpha mode.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PixelFormat {
    pub layout: ChannelLayout,
    pub alpha: AlphaMode,
}

impl PixelFormat {
    /// Premultiplied `RGBA`, the default drawing target.
    pub const RGBA_PREMUL: PixelFormat = PixelFormat {
        layout: ChannelLayout::Rgba,
        alpha: AlphaMode::PremultipliedLast,
    };
    /// Premultiplied `ARGB`, produced by alpha normalization.
    pub const ARGB_PREMUL: PixelFormat = PixelFormat {
        layout: ChannelLayout::Rgba,
        alpha: AlphaMode::PremultipliedFirst,
    };
    /// Opaque `RGBX`.
    pub const RGB_OPAQUE: PixelFormat = PixelFormat {
        layout: ChannelLayout::Rgba,
        alpha: AlphaMode::None,
    };
    /// Opaque single-channel luminance.
    pub const GRAY: PixelFormat = PixelFormat {
        layout: ChannelLayout::Gray,
        alpha: AlphaMode::None,
    };

    pub fn bytes_per_pixel(self) -> usize {
        self.layout.bytes_per_pixel()
    }

    pub fn has_alpha(self) -> bool {
        self.alpha.has_alpha()
    }

    /// Reject combinations no buffer can hold.
    pub fn validate(self) -> ImageResult<()> {
        if self.layout == ChannelLayout::Gray && self.alpha != AlphaMode::None {
            return Err(ImageError::invalid_image(format!(
                "unsupported pixel format: gray with {:?} alpha",
                self.alpha
            )));
        }
        Ok(())
    }

    /// The closest format a drawing context can target: straight alpha becomes premultiplied.
    pub fn renderable(self) -> PixelFormat {
        let alpha = match self.alpha {
            AlphaMode::First => AlphaMode::PremultipliedFirst,
            AlphaMode::Last => AlphaMode::PremultipliedLast,
            other => other,
        };
        PixelFormat { alpha, ..self }
    }

    pub(crate) fn decode_premul(self, px: &[u8]) -> [u8; 4] {
        match (self.layout, self.alpha) {
            (ChannelLayout::Gray, _) => [px[0], px[0], px[0], 255],
            (ChannelLayout::Rgba, AlphaMode::None) => [px[0], px[1], px[2], 255],
            (ChannelLayout::Rgba, AlphaMode::Last) => premul_rgba8([px[0], px[1], px[2], px[3]]),
            (ChannelLayout::Rgba, AlphaMode::First) => premul_rgba8([px[1], px[2], px[3], px[0]]),
            (ChannelLayout::Rgba, AlphaMode::PremultipliedLast) => [px[0], px[1], px[2], px[3]],
            (ChannelLayout::Rgba, AlphaMode::PremultipliedFirst) => [px[1], px[2], px[3], px[0]],
        }
    }

    pub(crate) fn encode_premul(self, premul: [u8; 4], out: &mut [u8]) {
        match self.layout {
            ChannelLayout::Gray => out[0] = luma_u8(premul[0], premul[1], premul[2]),
            ChannelLayout::Rgba => {
                let px = if self.alpha.is_premultiplied() || self.alpha == AlphaMode::None {
                    premul
                } else {
                    unpremul_rgba8(premul)
                };
                let px = if self.alpha == AlphaMode::None {
                    [px[0], px[1], px[2], 255]
                } else {
                    px
                };
                if self.alpha.alpha_first() {
                    out.copy_from_slice(&[px[3], px[0], px[1], px[2]]);
                } else {
                    out.copy_from_slice(&px);
                }
            }
        }
    }
}

/// Immutable in-memory bitmap.
///
/// Row-major and tightly packed: `pixels.len() == width * height * bytes_per_pixel`. Clones
/// share the pixel store.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    scale: f64,
    format: PixelFormat,
    pixels: Arc<Vec<u8>>,
}

impl RasterBuffer {
    /// Wrap raw bytes laid out according to `format`.
    pub fn from_pixels(
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: Vec<u8>,
    ) -> ImageResult<Self> {
        check_dimensions(width, height)?;
        format.validate()?;
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if pixels.len() != expected {
            return Err(ImageError::invalid_image(format!(
                "pixel store holds {} bytes, {width}x{height} {:?} needs {expected}",
                pixels.len(),
                format.layout
            )));
        }
        Ok(Self {
            width,
            height,
            scale: 1.0,
            format,
            pixels: Arc::new(pixels),
        })
    }

    /// Wrap premultiplied RGBA8 bytes.
    pub fn from_premul_rgba8(width: u32, height: u32, rgba8_premul: Vec<u8>) -> ImageResult<Self> {
        Self::from_pixels(width, height, PixelFormat::RGBA_PREMUL, rgba8_premul)
    }

    /// Encode a premultiplied RGBA8 working store into `format`.
    pub(crate) fn encode(
        width: u32,
        height: u32,
        format: PixelFormat,
        rgba8_premul: &[u8],
    ) -> ImageResult<Self> {
        if format == PixelFormat::RGBA_PREMUL {
            return Self::from_premul_rgba8(width, height, rgba8_premul.to_vec());
        }
        let bpp = format.bytes_per_pixel();
        let mut out = vec![0u8; rgba8_premul.len() / 4 * bpp];
        for (src, dst) in rgba8_premul.chunks_exact(4).zip(out.chunks_exact_mut(bpp)) {
            format.encode_premul([src[0], src[1], src[2], src[3]], dst);
        }
        Self::from_pixels(width, height, format, out)
    }

    /// Same pixels tagged with a different device scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        if scale.is_finite() && scale > 0.0 {
            self.scale = scale;
        }
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixels per point.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn channel_layout(&self) -> ChannelLayout {
        self.format.layout
    }

    pub fn alpha_mode(&self) -> AlphaMode {
        self.format.alpha
    }

    pub fn pixels(&self) -> &[u8] {
        self.pixels.as_slice()
    }

    /// Size in pixels.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Size in points (pixels divided by scale).
    pub fn point_size(&self) -> Size {
        Size::new(
            f64::from(self.width) / self.scale,
            f64::from(self.height) / self.scale,
        )
    }

    /// Pixel-space bounds anchored at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size((0.0, 0.0), self.size())
    }

    /// `true` iff the alpha mode declares an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.format.has_alpha()
    }

    pub fn bytes_per_row(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// Pixel at `(x, y)` as premultiplied RGBA8.
    pub fn pixel_premul(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let idx = (y as usize * self.width as usize + x as usize) * bpp;
        Some(self.format.decode_premul(&self.pixels[idx..idx + bpp]))
    }

    /// Whole buffer as premultiplied RGBA8.
    pub fn to_premul_rgba8(&self) -> Vec<u8> {
        if self.format == PixelFormat::RGBA_PREMUL {
            return self.pixels.as_ref().clone();
        }
        let bpp = self.format.bytes_per_pixel();
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for px in self.pixels.chunks_exact(bpp) {
            out.extend_from_slice(&self.format.decode_premul(px));
        }
        out
    }

    /// Whole buffer as straight (unpremultiplied) RGBA8, e.g. for PNG encoding.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.to_premul_rgba8();
        for px in out.chunks_exact_mut(4) {
            let un = unpremul_rgba8([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&un);
        }
        out
    }
}

pub(crate) fn check_dimensions(width: u32, height: u32) -> ImageResult<()> {
    if width == 0 || height == 0 {
        return Err(ImageError::invalid_image(format!(
            "zero-area image {width}x{height}"
        )));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(ImageError::invalid_image(format!(
            "image {width}x{height} exceeds {MAX_DIMENSION}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/raster/buffer.rs"]
mod tests;
