use std::sync::Arc;

use kurbo::Shape;
use rayon::prelude::*;

use crate::draw::coverage::ClipMask;
use crate::draw::cpu::{
    COVERAGE_PAINT, CpuLayer, affine_to_cpu, bezpath_to_cpu, canvas_dim, image_paint, rect_to_cpu,
};
use crate::draw::gradient::GradientRamp;
use crate::draw::text::{Font, TextBrushRgba8, TextLayoutEngine, fill_runs};
use crate::foundation::core::{
    Affine, BezPath, Color, ColorStop, Point, Rect, Size, TextAlignment, pixel_dimensions,
};
use crate::foundation::error::{ImageError, ImageResult};
use crate::foundation::math::{luma_u8, u8_to_unit, unit_to_u8};
use crate::raster::buffer::{
    AlphaMode, ChannelLayout, PixelFormat, RasterBuffer, check_dimensions,
};
use crate::raster::composite::{BlendMode, PremulF32, blend};
use crate::settings::{Interpolation, RenderSettings};

#[derive(Clone, Debug)]
struct GraphicsState {
    transform: Affine,
    clip: Option<Arc<ClipMask>>,
    blend: BlendMode,
    interpolation: Interpolation,
}

/// Off-screen immediate-mode drawing surface bound to one output buffer.
///
/// Pixels are kept as premultiplied RGBA8 while drawing and encoded into the target
/// [`PixelFormat`] by [`DrawingContext::finish`]. Every operation honours the current
/// transform, clip and blend mode; [`save_state`](Self::save_state) and
/// [`restore_state`](Self::restore_state) push and pop that state.
pub struct DrawingContext {
    width: u32,
    height: u32,
    cpu_size: (u16, u16),
    format: PixelFormat,
    scale: f64,
    pixels: Vec<u8>,
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    settings: RenderSettings,
    text: Option<TextLayoutEngine>,
}

impl std::fmt::Debug for DrawingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawingContext")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("depth", &self.saved.len())
            .finish()
    }
}

impl DrawingContext {
    pub fn new(width: u32, height: u32, format: PixelFormat) -> ImageResult<Self> {
        check_dimensions(width, height)?;
        format.validate()?;
        if matches!(format.alpha, AlphaMode::First | AlphaMode::Last) {
            return Err(ImageError::invalid_image(format!(
                "cannot draw into straight {:?} alpha; use a premultiplied format",
                format.alpha
            )));
        }

        let fill: [u8; 4] = if format.has_alpha() {
            [0, 0, 0, 0]
        } else {
            [0, 0, 0, 255]
        };
        let pixels = fill.repeat(width as usize * height as usize);
        let cpu_size = (
            canvas_dim(width, "canvas width")?,
            canvas_dim(height, "canvas height")?,
        );
        let settings = RenderSettings::shared().clone();
        Ok(Self {
            width,
            height,
            cpu_size,
            format,
            scale: 1.0,
            pixels,
            state: GraphicsState {
                transform: Affine::IDENTITY,
                clip: None,
                blend: BlendMode::Normal,
                interpolation: settings.interpolation,
            },
            saved: Vec::new(),
            settings,
            text: None,
        })
    }

    /// Context for a size in pixels, rounded to whole pixels.
    pub fn for_size(size: Size, format: PixelFormat) -> ImageResult<Self> {
        let (w, h) = pixel_dimensions(size)?;
        Self::new(w, h, format)
    }

    /// Create a context, run `draw` against it, and encode the result.
    ///
    /// The context is dropped on every exit path, including early `?` returns from `draw`.
    pub fn render<F>(
        width: u32,
        height: u32,
        format: PixelFormat,
        scale: f64,
        draw: F,
    ) -> ImageResult<RasterBuffer>
    where
        F: FnOnce(&mut DrawingContext) -> ImageResult<()>,
    {
        let mut ctx = Self::new(width, height, format)?.with_scale(scale);
        draw(&mut ctx)?;
        ctx.finish()
    }

    /// Replace the process-wide [`RenderSettings::shared`] for this context.
    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.state.interpolation = settings.interpolation;
        self.settings = settings;
        self
    }

    /// Scale tag carried into the finished buffer.
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

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    pub fn transform(&self) -> Affine {
        self.state.transform
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Encode the working store into the target format.
    pub fn finish(self) -> ImageResult<RasterBuffer> {
        RasterBuffer::encode(self.width, self.height, self.format, &self.pixels)
            .map(|img| img.with_scale(self.scale))
    }

    pub fn save_state(&mut self) {
        self.saved.push(self.state.clone());
    }

    /// Pop the most recently saved state.
    ///
    /// # Panics
    ///
    /// Panics when there is no matching [`save_state`](Self::save_state).
    pub fn restore_state(&mut self) {
        match self.saved.pop() {
            Some(state) => self.state = state,
            None => panic!("restore_state called without a matching save_state"),
        }
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.state.interpolation = interpolation;
    }

    /// Post-multiply `affine` onto the current transform (user → device).
    pub fn concat_transform(&mut self, affine: Affine) {
        self.state.transform = self.state.transform * affine;
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fill_shape(&rect, color);
    }

    /// Fill with the non-zero winding rule.
    pub fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.fill_shape(path, color);
    }

    pub fn fill_shape<S>(&mut self, shape: &S, color: Color)
    where
        S: Shape,
    {
        let path = bezpath_to_cpu(&shape.to_path(PATH_TOLERANCE));
        let coverage = self.cover(|ctx| ctx.fill_path(&path));
        let premul = color.to_premul_f32();
        self.blend_coverage(&coverage, |_| premul);
    }

    /// Stroke the ellipse inscribed in `rect`, centred on its outline.
    pub fn stroke_ellipse(&mut self, rect: Rect, color: Color, line_width: f64) {
        if !(line_width.is_finite() && line_width > 0.0) {
            return;
        }
        let ellipse = kurbo::Ellipse::from_rect(rect.abs());
        let path = bezpath_to_cpu(&ellipse.to_path(PATH_TOLERANCE));
        let coverage = self.cover(|ctx| {
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(line_width));
            ctx.stroke_path(&path);
        });
        let premul = color.to_premul_f32();
        self.blend_coverage(&coverage, |_| premul);
    }

    /// Draw `image` stretched into `rect`.
    pub fn draw_image(&mut self, rect: Rect, image: &RasterBuffer) {
        if rect.width() == 0.0 || rect.height() == 0.0 || self.degenerate() {
            return;
        }
        let rect = rect.abs();
        let (iw, ih) = (f64::from(image.width()), f64::from(image.height()));
        let placement = self.state.transform
            * Affine::translate((rect.x0, rect.y0))
            * Affine::scale_non_uniform(rect.width() / iw, rect.height() / ih);
        let interpolation = if pixel_aligned(placement) {
            Interpolation::None
        } else {
            self.state.interpolation
        };
        let paint = match image_paint(image, interpolation) {
            Ok(paint) => paint,
            Err(e) => {
                tracing::warn!(error = %e, "image paint unavailable; draw skipped");
                return;
            }
        };
        let source_rect = rect_to_cpu(Rect::new(0.0, 0.0, iw, ih));

        let coverage = self.cover(|ctx| {
            ctx.set_transform(affine_to_cpu(placement));
            ctx.fill_rect(&source_rect);
        });
        let mut layer = self.layer();
        let ctx = layer.ctx();
        ctx.set_transform(affine_to_cpu(placement));
        ctx.set_paint(paint);
        ctx.fill_rect(&source_rect);
        let sampled = layer.into_premul();

        self.blend_coverage(&coverage, |i| uncover(&sampled[i * 4..i * 4 + 4], coverage[i]));
    }

    pub fn clip_to_rect(&mut self, rect: Rect) {
        self.clip_to_shape(&rect.abs());
    }

    pub fn clip_to_path(&mut self, path: &BezPath) {
        self.clip_to_shape(path);
    }

    /// Intersect the clip with an anti-aliased shape.
    pub fn clip_to_shape<S>(&mut self, shape: &S)
    where
        S: Shape,
    {
        let path = bezpath_to_cpu(&shape.to_path(PATH_TOLERANCE));
        let coverage = self.cover(|ctx| ctx.fill_path(&path));
        self.intersect_clip(ClipMask::from_coverage(self.width, coverage));
    }

    /// Intersect the clip with `mask` stretched into `rect`; everything outside `rect` is clipped.
    ///
    /// The mask value is its alpha when it has one, its luminance when it is gray, and full
    /// coverage for opaque RGB.
    pub fn clip_to_mask(&mut self, rect: Rect, mask: &RasterBuffer) {
        let rect = rect.abs();
        let inverse = self.state.transform.inverse();
        let width = self.width;
        let mut coverage = vec![0u8; self.width as usize * self.height as usize];
        if inverse.is_finite() && rect.width() > 0.0 && rect.height() > 0.0 {
            let (mw, mh) = (mask.width(), mask.height());
            let value = |x: u32, y: u32| -> u8 {
                let Some(px) = mask.pixel_premul(x, y) else {
                    return 0;
                };
                match (mask.channel_layout(), mask.has_alpha()) {
                    (_, true) => px[3],
                    (ChannelLayout::Gray, false) => luma_u8(px[0], px[1], px[2]),
                    (ChannelLayout::Rgba, false) => 255,
                }
            };
            coverage
                .par_chunks_mut(width as usize)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, out) in row.iter_mut().enumerate() {
                        let p = inverse * Point::new(x as f64 + 0.5, y as f64 + 0.5);
                        if !rect.contains(p) {
                            continue;
                        }
                        let u = ((p.x - rect.x0) / rect.width() * f64::from(mw)).floor();
                        let v = ((p.y - rect.y0) / rect.height() * f64::from(mh)).floor();
                        let u = (u.max(0.0) as u32).min(mw - 1);
                        let v = (v.max(0.0) as u32).min(mh - 1);
                        *out = value(u, v);
                    }
                });
        }
        self.intersect_clip(ClipMask::from_coverage(width, coverage));
    }

    fn intersect_clip(&mut self, next: ClipMask) {
        let merged = ClipMask::intersect(self.state.clip.as_deref(), next);
        self.state.clip = Some(Arc::new(merged));
    }

    /// Fill the clip region with a linear gradient from `start` to `end`, padded beyond both ends.
    pub fn draw_linear_gradient(
        &mut self,
        stops: &[ColorStop],
        start: Point,
        end: Point,
    ) -> ImageResult<()> {
        let ramp = GradientRamp::new(stops)?;
        let axis = end - start;
        let len2 = axis.hypot2();
        self.paint(|p| {
            let t = if len2 <= f64::EPSILON {
                0.0
            } else {
                (p - start).dot(axis) / len2
            };
            Some(ramp.premul_at(t as f32))
        });
        Ok(())
    }

    /// Fill rings around `center` from `start_radius` to `end_radius`.
    ///
    /// Nothing is drawn inside `start_radius`; beyond `end_radius` the last color is drawn
    /// only when `draws_after_end` is set.
    pub fn draw_radial_gradient(
        &mut self,
        stops: &[ColorStop],
        center: Point,
        start_radius: f64,
        end_radius: f64,
        draws_after_end: bool,
    ) -> ImageResult<()> {
        let ramp = GradientRamp::new(stops)?;
        let span = end_radius - start_radius;
        self.paint(|p| {
            let d = (p - center).hypot();
            if d < start_radius {
                return None;
            }
            let t = if span <= f64::EPSILON {
                1.0
            } else {
                (d - start_radius) / span
            };
            if t > 1.0 && !draws_after_end {
                return None;
            }
            Some(ramp.premul_at(t.min(1.0) as f32))
        });
        Ok(())
    }

    /// Lay out `text` inside `rect` and draw it, clipped to `rect`. Empty text draws nothing.
    ///
    /// Lines start at the top of `rect`; each is aligned inside `rect.width()`.
    pub fn draw_text(
        &mut self,
        text: &str,
        font: &Font,
        color: Color,
        rect: Rect,
        alignment: TextAlignment,
    ) -> ImageResult<()> {
        if text.is_empty() || self.degenerate() {
            return Ok(());
        }
        let rect = rect.abs();
        // Glyphs are laid out in an opaque brush so the layer alpha is pure coverage.
        let brush = TextBrushRgba8 {
            r: 255,
            g: 255,
            b: 255,
            a: 255,
        };
        let engine = self.text.get_or_insert_with(TextLayoutEngine::new);
        let runs = engine.layout_aligned(text, font, brush, rect.width() as f32, alignment)?;
        let transform = self.state.transform * Affine::translate((rect.x0, rect.y0));
        let local_clip = Rect::new(0.0, 0.0, rect.width(), rect.height());

        let mut layer = self.layer();
        fill_runs(&mut layer, &runs, font, transform, Some(local_clip));
        let coverage = layer.into_coverage();
        let premul = color.to_premul_f32();
        self.blend_coverage(&coverage, |_| premul);
        Ok(())
    }

    // Nothing drawn under a singular or non-finite transform reaches the canvas.
    fn degenerate(&self) -> bool {
        let t = self.state.transform;
        !t.is_finite() || t.determinant() == 0.0
    }

    fn layer(&self) -> CpuLayer {
        let (w, h) = self.cpu_size;
        CpuLayer::new(w, h, &self.settings)
    }

    // Render `draw` in the coverage paint under the current transform; returns per-pixel alpha.
    fn cover<F>(&self, draw: F) -> Vec<u8>
    where
        F: FnOnce(&mut vello_cpu::RenderContext),
    {
        if self.degenerate() {
            return vec![0; self.width as usize * self.height as usize];
        }
        let mut layer = self.layer();
        let ctx = layer.ctx();
        ctx.set_transform(affine_to_cpu(self.state.transform));
        ctx.set_paint(COVERAGE_PAINT);
        draw(ctx);
        layer.into_coverage()
    }

    // Blend `source(pixel index)` through shape coverage times clip with the current mode.
    // Pixels outside the shape are left alone whatever the mode.
    fn blend_coverage<S>(&mut self, coverage: &[u8], source: S)
    where
        S: Fn(usize) -> PremulF32 + Sync,
    {
        let width = self.width as usize;
        let mode = self.state.blend;
        let clip = self.state.clip.clone();
        self.pixels
            .par_chunks_mut(width * 4)
            .zip(coverage.par_chunks(width))
            .enumerate()
            .for_each(|(y, (row, cov_row))| {
                for (x, &cov) in cov_row.iter().enumerate() {
                    if cov == 0 {
                        continue;
                    }
                    let clip_cov = clip.as_ref().map_or(1.0, |c| c.unit_at(x as u32, y as u32));
                    if clip_cov <= 0.0 {
                        continue;
                    }
                    let i = x * 4;
                    let src = source(y * width + x);
                    blend_into(&mut row[i..i + 4], mode, src, u8_to_unit(cov) * clip_cov);
                }
            });
    }

    // Gradient loop: `source` sampled at each pixel centre in user space, blended through
    // the clip over the whole canvas.
    fn paint<S>(&mut self, source: S)
    where
        S: Fn(Point) -> Option<PremulF32> + Sync,
    {
        let inverse = self.state.transform.inverse();
        if !inverse.is_finite() {
            return;
        }
        let mode = self.state.blend;
        let clip = self.state.clip.clone();
        let width = self.width as usize;
        self.pixels
            .par_chunks_mut(width * 4)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..width {
                    let coverage = clip.as_ref().map_or(1.0, |c| c.unit_at(x as u32, y as u32));
                    if coverage <= 0.0 {
                        continue;
                    }
                    let centre = inverse * Point::new(x as f64 + 0.5, y as f64 + 0.5);
                    let Some(src) = source(centre) else {
                        continue;
                    };
                    let i = x * 4;
                    blend_into(&mut row[i..i + 4], mode, src, coverage);
                }
            });
    }
}

const PATH_TOLERANCE: f64 = 0.1;

// Unit scale and whole-pixel offset: every texel lands on exactly one device pixel.
fn pixel_aligned(t: Affine) -> bool {
    let [a, b, c, d, e, f] = t.as_coeffs();
    let near = |v: f64, to: f64| (v - to).abs() < 1e-9;
    near(a, 1.0)
        && near(b, 0.0)
        && near(c, 0.0)
        && near(d, 1.0)
        && near(e, e.round())
        && near(f, f.round())
}

fn blend_into(px: &mut [u8], mode: BlendMode, src: PremulF32, coverage: f32) {
    let dst = [
        u8_to_unit(px[0]),
        u8_to_unit(px[1]),
        u8_to_unit(px[2]),
        u8_to_unit(px[3]),
    ];
    let out = blend(mode, src, dst);
    for c in 0..4 {
        px[c] = unit_to_u8(dst[c] + (out[c] - dst[c]) * coverage);
    }
}

// Divide edge coverage back out of a rendered pixel to recover the sampled source.
fn uncover(px: &[u8], coverage: u8) -> PremulF32 {
    let k = if coverage == 0 {
        0.0
    } else {
        255.0 / f32::from(coverage)
    };
    [
        (u8_to_unit(px[0]) * k).min(1.0),
        (u8_to_unit(px[1]) * k).min(1.0),
        (u8_to_unit(px[2]) * k).min(1.0),
        (u8_to_unit(px[3]) * k).min(1.0),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/draw/context.rs"]
mod tests;
