use crate::draw::context::DrawingContext;
use crate::foundation::core::{Affine, Color, ColorStop, ContentMode, Point, Rect, Size};
use crate::foundation::error::{ImageError, ImageResult};
use crate::raster::buffer::{PixelFormat, RasterBuffer};
use crate::raster::composite::BlendMode;
use crate::settings::Interpolation;

/// Buffer-to-buffer operations. Each returns a new buffer; `self` is never modified.
impl RasterBuffer {
    /// Copy with an alpha channel.
    ///
    /// Buffers that already declare alpha are returned as-is; opaque ones are re-rendered into
    /// premultiplied `ARGB` with identical visible pixels.
    pub fn apply_alpha(&self) -> ImageResult<RasterBuffer> {
        if self.has_alpha() {
            return Ok(self.clone());
        }
        DrawingContext::render(
            self.width(),
            self.height(),
            PixelFormat::ARGB_PREMUL,
            self.scale(),
            |ctx| {
                ctx.draw_image(self.bounds(), self);
                Ok(())
            },
        )
    }

    /// Surround the image with a fully transparent margin of `padding` pixels.
    #[tracing::instrument(level = "debug", skip(self), fields(w = self.width(), h = self.height()))]
    pub fn apply_padding(&self, padding: u32) -> ImageResult<RasterBuffer> {
        let image = self.apply_alpha()?;
        let extra = padding.checked_mul(2).ok_or_else(|| {
            ImageError::invalid_image(format!("padding {padding} overflows"))
        })?;
        let w = image.width().checked_add(extra);
        let h = image.height().checked_add(extra);
        let (Some(w), Some(h)) = (w, h) else {
            return Err(ImageError::invalid_image(format!(
                "padding {padding} overflows"
            )));
        };

        let p = f64::from(padding);
        let inner = Rect::new(p, p, p + f64::from(image.width()), p + f64::from(image.height()));
        let mask = DrawingContext::render(w, h, PixelFormat::GRAY, 1.0, |ctx| {
            ctx.fill_rect(ctx.bounds(), Color::BLACK);
            ctx.fill_rect(inner, Color::WHITE);
            Ok(())
        })?;

        DrawingContext::render(w, h, image.format().renderable(), image.scale(), |ctx| {
            ctx.draw_image(inner, &image);
            Ok(())
        })?
        .mask_with(&mask)
    }

    /// Keep only what `mask` covers: its alpha if it has one, else its luminance.
    ///
    /// `mask` must have the same pixel dimensions as `self`.
    pub fn mask_with(&self, mask: &RasterBuffer) -> ImageResult<RasterBuffer> {
        if mask.width() != self.width() || mask.height() != self.height() {
            return Err(ImageError::invalid_image(format!(
                "mask {}x{} does not match image {}x{}",
                mask.width(),
                mask.height(),
                self.width(),
                self.height()
            )));
        }
        let format = self.format().renderable();
        let format = if format.has_alpha() {
            format
        } else {
            PixelFormat::ARGB_PREMUL
        };
        DrawingContext::render(self.width(), self.height(), format, self.scale(), |ctx| {
            ctx.clip_to_mask(self.bounds(), mask);
            ctx.set_blend_mode(BlendMode::Copy);
            ctx.draw_image(self.bounds(), self);
            Ok(())
        })
    }

    /// Verbatim sub-rectangle of the pixel data.
    ///
    /// `bounds` is expanded to whole pixels and must lie within `[0, width] × [0, height]`.
    pub fn crop(&self, bounds: Rect) -> ImageResult<RasterBuffer> {
        let finite = [bounds.x0, bounds.y0, bounds.x1, bounds.y1]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(ImageError::invalid_bounds(format!(
                "crop bounds {bounds:?} are not finite"
            )));
        }
        let b = bounds.abs();
        let (x0, y0, x1, y1) = (b.x0.floor(), b.y0.floor(), b.x1.ceil(), b.y1.ceil());
        if x0 < 0.0 || y0 < 0.0 || x1 > f64::from(self.width()) || y1 > f64::from(self.height()) {
            return Err(ImageError::invalid_bounds(format!(
                "crop bounds {bounds:?} exceed {}x{}",
                self.width(),
                self.height()
            )));
        }
        if x1 <= x0 || y1 <= y0 {
            return Err(ImageError::invalid_image(format!(
                "crop bounds {bounds:?} are empty"
            )));
        }

        let (x0, y0, x1, y1) = (x0 as usize, y0 as usize, x1 as usize, y1 as usize);
        let bpp = self.format().bytes_per_pixel();
        let stride = self.bytes_per_row();
        let mut out = Vec::with_capacity((x1 - x0) * (y1 - y0) * bpp);
        for row in self.pixels().chunks_exact(stride).skip(y0).take(y1 - y0) {
            out.extend_from_slice(&row[x0 * bpp..x1 * bpp]);
        }
        RasterBuffer::from_pixels((x1 - x0) as u32, (y1 - y0) as u32, self.format(), out)
            .map(|img| img.with_scale(self.scale()))
    }

    /// Largest centred square; its side is `min(width, height)`.
    pub fn crop_to_square(&self) -> ImageResult<RasterBuffer> {
        let side = self.width().min(self.height());
        let left = (self.width() - side) / 2;
        let top = (self.height() - side) / 2;
        self.crop(Rect::new(
            f64::from(left),
            f64::from(top),
            f64::from(left + side),
            f64::from(top + side),
        ))
    }

    /// Scale by a ratio chosen from `mode` and `target`.
    ///
    /// `ScaleAspectFit` uses the smaller of the two axis ratios and never exceeds `target`;
    /// `ScaleAspectFill` uses the larger and always covers it. `ScaleToFill` keeps a ratio of
    /// one, so the output has the source's size. Orientation metadata is not consulted.
    #[tracing::instrument(level = "debug", skip(self), fields(w = self.width(), h = self.height()))]
    pub fn resize(&self, target: Size, mode: ContentMode) -> ImageResult<RasterBuffer> {
        if !(target.width.is_finite() && target.height.is_finite())
            || target.width <= 0.0
            || target.height <= 0.0
        {
            return Err(ImageError::invalid_image(format!(
                "resize target {target:?} must be positive"
            )));
        }
        let (sw, sh) = (f64::from(self.width()), f64::from(self.height()));
        let horizontal = target.width / sw;
        let vertical = target.height / sh;
        let ratio = match mode {
            ContentMode::ScaleToFill => 1.0,
            ContentMode::ScaleAspectFill => horizontal.max(vertical),
            ContentMode::ScaleAspectFit => horizontal.min(vertical),
        };

        const EPS: f64 = 1e-9;
        let snap = |v: f64| -> f64 {
            match mode {
                ContentMode::ScaleAspectFit => (v + EPS).floor(),
                ContentMode::ScaleAspectFill => (v - EPS).ceil(),
                ContentMode::ScaleToFill => v.round(),
            }
        };
        let w = crate::foundation::core::pixel_extent(snap(sw * ratio).max(1.0), "resized width")?;
        let h = crate::foundation::core::pixel_extent(snap(sh * ratio).max(1.0), "resized height")?;

        DrawingContext::render(w, h, PixelFormat::RGBA_PREMUL, self.scale(), |ctx| {
            ctx.concat_transform(Affine::IDENTITY);
            ctx.set_interpolation(Interpolation::High);
            ctx.draw_image(ctx.bounds(), self);
            Ok(())
        })
    }

    /// Clip to a rectangle with circular corners of `radius` pixels; `radius <= 0` clips to the
    /// plain bounds.
    #[tracing::instrument(level = "debug", skip(self), fields(w = self.width(), h = self.height()))]
    pub fn round_corners(&self, radius: f64) -> ImageResult<RasterBuffer> {
        let image = self.apply_alpha()?;
        let rect = image.bounds();
        DrawingContext::render(
            image.width(),
            image.height(),
            image.format().renderable(),
            image.scale(),
            |ctx| {
                if radius.is_finite() && radius > 0.0 {
                    let rounded = kurbo::RoundedRect::from_rect(rect, radius);
                    ctx.clip_to_shape(&rounded);
                } else {
                    ctx.clip_to_rect(rect);
                }
                ctx.draw_image(rect, &image);
                Ok(())
            },
        )
    }

    pub fn round_corners_with_border(
        &self,
        radius: f64,
        border: f64,
        color: Color,
    ) -> ImageResult<RasterBuffer> {
        self.round_corners(radius)?.apply_border(border, color)
    }

    /// Centred circle cut from the largest square.
    pub fn round_corners_to_circle(&self) -> ImageResult<RasterBuffer> {
        let square = self.crop_to_square()?;
        square.round_corners(f64::from(square.width()) / 2.0)
    }

    pub fn round_corners_to_circle_with_border(
        &self,
        border: f64,
        color: Color,
    ) -> ImageResult<RasterBuffer> {
        let square = self.crop_to_square()?;
        square.round_corners_with_border(f64::from(square.width()) / 2.0, border, color)
    }

    /// Stroke the ellipse inscribed in the bounds inset by `width`, then draw the image into
    /// that inset rectangle.
    #[tracing::instrument(level = "debug", skip(self), fields(w = self.width(), h = self.height()))]
    pub fn apply_border(&self, width: f64, color: Color) -> ImageResult<RasterBuffer> {
        if !width.is_finite() || width < 0.0 {
            return Err(ImageError::invalid_image(format!(
                "border width {width} must be finite and >= 0"
            )));
        }
        let bounds = self.bounds();
        let inset = Rect::new(
            bounds.x0 + width,
            bounds.y0 + width,
            bounds.x1 - width,
            bounds.y1 - width,
        );
        if inset.width() <= 0.0 || inset.height() <= 0.0 {
            return Err(ImageError::invalid_image(format!(
                "border width {width} leaves no room inside {}x{}",
                self.width(),
                self.height()
            )));
        }
        DrawingContext::render(
            self.width(),
            self.height(),
            self.format().renderable(),
            self.scale(),
            |ctx| {
                ctx.stroke_ellipse(inset, color, width);
                ctx.draw_image(inset, self);
                Ok(())
            },
        )
    }

    /// Overlay a top-to-bottom gradient, clipped to the image's own alpha and combined with
    /// `blend_mode`.
    #[tracing::instrument(level = "debug", skip(self, stops), fields(stops = stops.len()))]
    pub fn apply_gradient_colors(
        &self,
        stops: &[ColorStop],
        blend_mode: BlendMode,
    ) -> ImageResult<RasterBuffer> {
        DrawingContext::render(
            self.width(),
            self.height(),
            PixelFormat::RGBA_PREMUL,
            self.scale(),
            |ctx| {
                let rect = self.bounds();
                ctx.set_blend_mode(BlendMode::Normal);
                ctx.draw_image(rect, self);
                ctx.clip_to_mask(rect, self);
                ctx.set_blend_mode(blend_mode);
                ctx.draw_linear_gradient(stops, Point::ZERO, Point::new(0.0, rect.y1))
            },
        )
    }
}

#[cfg(test)]
#[path = "../tests/unit/transform.rs"]
mod tests;
