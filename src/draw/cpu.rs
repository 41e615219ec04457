use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Point, Rect};
use crate::foundation::error::{ImageError, ImageResult};
use crate::raster::buffer::RasterBuffer;
use crate::settings::{Interpolation, RenderSettings};

/// Paint used when a layer only records coverage; the alpha channel is the coverage.
pub(crate) const COVERAGE_PAINT: vello_cpu::peniko::Color =
    vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255);

/// A transparent vello_cpu scene the size of the canvas, rendered once into premultiplied
/// RGBA8.
pub(crate) struct CpuLayer {
    ctx: vello_cpu::RenderContext,
    width: u16,
    height: u16,
}

impl CpuLayer {
    pub(crate) fn new(width: u16, height: u16, settings: &RenderSettings) -> Self {
        let mut ctx = vello_cpu::RenderContext::new(width, height);
        if !settings.antialias {
            ctx.set_aliasing_threshold(Some(128));
        }
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        Self { ctx, width, height }
    }

    pub(crate) fn ctx(&mut self) -> &mut vello_cpu::RenderContext {
        &mut self.ctx
    }

    pub(crate) fn into_premul(mut self) -> Vec<u8> {
        self.ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.render_to_pixmap(&mut pixmap);
        pixmap.data_as_u8_slice().to_vec()
    }

    /// Alpha channel of the rendered layer, one byte per pixel.
    pub(crate) fn into_coverage(self) -> Vec<u8> {
        self.into_premul().chunks_exact(4).map(|px| px[3]).collect()
    }
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

pub(crate) fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

pub(crate) fn canvas_dim(v: u32, what: &str) -> ImageResult<u16> {
    u16::try_from(v).map_err(|_| ImageError::invalid_image(format!("{what} {v} exceeds u16")))
}

pub(crate) fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> ImageResult<vello_cpu::Pixmap> {
    let w = canvas_dim(width, "image width")?;
    let h = canvas_dim(height, "image height")?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(ImageError::invalid_image("premultiplied byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

/// Image paint over `image`'s own pixel grid, padded at the edges.
pub(crate) fn image_paint(
    image: &RasterBuffer,
    interpolation: Interpolation,
) -> ImageResult<vello_cpu::Image> {
    let pixmap = premul_bytes_to_pixmap(&image.to_premul_rgba8(), image.width(), image.height())?;
    let quality = match interpolation {
        Interpolation::None => vello_cpu::peniko::ImageQuality::Low,
        Interpolation::Low | Interpolation::Medium => vello_cpu::peniko::ImageQuality::Medium,
        Interpolation::High => vello_cpu::peniko::ImageQuality::High,
    };
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler {
            quality,
            ..vello_cpu::peniko::ImageSampler::default()
        },
    })
}

#[cfg(test)]
#[path = "../../tests/unit/draw/cpu.rs"]
mod tests;
