//! Constructors that synthesize new buffers.
//!
//! Sizes are in pixels and rounded to whole pixels; a side that rounds below one pixel or
//! above [`MAX_DIMENSION`](crate::MAX_DIMENSION) fails with
//! [`ImageError::InvalidImage`](crate::ImageError::InvalidImage).

use crate::draw::context::DrawingContext;
use crate::draw::text::Font;
use crate::foundation::core::{
    Color, ColorStop, Point, Rect, Size, TextAlignment, Vec2, pixel_dimensions,
};
use crate::foundation::error::ImageResult;
use crate::raster::buffer::{PixelFormat, RasterBuffer};

/// Anything that can paint itself into a drawing context, such as a composed view.
pub trait Drawable {
    /// Size of the surface in pixels.
    fn size(&self) -> Size;

    fn render_into(&self, ctx: &mut DrawingContext) -> ImageResult<()>;
}

/// Every pixel set to `color`.
#[tracing::instrument(level = "debug")]
pub fn solid_color(color: Color, size: Size) -> ImageResult<RasterBuffer> {
    let (w, h) = pixel_dimensions(size)?;
    DrawingContext::render(w, h, PixelFormat::RGBA_PREMUL, 1.0, |ctx| {
        ctx.fill_rect(ctx.bounds(), color);
        Ok(())
    })
}

/// Vertical gradient: the first stop at the top edge, the last at the bottom edge.
#[tracing::instrument(level = "debug", skip(stops), fields(stops = stops.len()))]
pub fn linear_gradient(stops: &[ColorStop], size: Size) -> ImageResult<RasterBuffer> {
    let (w, h) = pixel_dimensions(size)?;
    DrawingContext::render(w, h, PixelFormat::RGBA_PREMUL, 1.0, |ctx| {
        let bottom = f64::from(ctx.height());
        ctx.draw_linear_gradient(stops, Point::ZERO, Point::new(0.0, bottom))
    })
}

/// Opaque radial gradient.
///
/// `center_fraction` is relative to the size and `radius_fraction` to its shorter side;
/// `end` fills everything beyond the radius.
#[tracing::instrument(level = "debug")]
pub fn radial_gradient(
    start: Color,
    end: Color,
    center_fraction: Point,
    radius_fraction: f64,
    size: Size,
) -> ImageResult<RasterBuffer> {
    let (w, h) = pixel_dimensions(size)?;
    let (wf, hf) = (f64::from(w), f64::from(h));
    let center = Point::new(center_fraction.x * wf, center_fraction.y * hf);
    let radius = wf.min(hf) * radius_fraction;
    let stops = [ColorStop::new(start, 0.0), ColorStop::new(end, 1.0)];
    DrawingContext::render(w, h, PixelFormat::RGB_OPAQUE, 1.0, |ctx| {
        ctx.draw_radial_gradient(&stops, center, 0.0, radius, true)
    })
}

/// Background fill, then `text` centred in a `size` rect shifted by `offset`.
#[tracing::instrument(level = "debug", skip(font))]
pub fn text_label(
    text: &str,
    font: &Font,
    text_color: Color,
    background: Color,
    size: Size,
    offset: Vec2,
) -> ImageResult<RasterBuffer> {
    let (w, h) = pixel_dimensions(size)?;
    DrawingContext::render(w, h, PixelFormat::RGBA_PREMUL, 1.0, |ctx| {
        ctx.fill_rect(ctx.bounds(), background);
        let rect = Rect::from_origin_size(offset.to_point(), size);
        ctx.draw_text(text, font, text_color, rect, TextAlignment::Center)
    })
}

/// Capture a [`Drawable`] into a new buffer of its size.
pub fn from_snapshot(surface: &dyn Drawable) -> ImageResult<RasterBuffer> {
    let (w, h) = pixel_dimensions(surface.size())?;
    DrawingContext::render(w, h, PixelFormat::RGBA_PREMUL, 1.0, |ctx| {
        surface.render_into(ctx)
    })
}

#[cfg(test)]
#[path = "../tests/unit/factory.rs"]
mod tests;
