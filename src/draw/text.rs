use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use kurbo::Shape as _;

use crate::draw::cpu::{CpuLayer, affine_to_cpu, rect_to_cpu};
use crate::foundation::core::{Rect, TextAlignment};
use crate::foundation::error::{ImageError, ImageResult};

/// Font bytes plus a pixel size.
#[derive(Clone)]
pub struct Font {
    data: Arc<Vec<u8>>,
    size_px: f32,
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("bytes", &self.data.len())
            .field("size_px", &self.size_px)
            .finish()
    }
}

impl Font {
    pub fn from_bytes(data: Vec<u8>, size_px: f32) -> ImageResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ImageError::invalid_image(
                "font size_px must be finite and > 0",
            ));
        }
        if data.is_empty() {
            return Err(ImageError::invalid_image("font data is empty"));
        }
        Ok(Self {
            data: Arc::new(data),
            size_px,
        })
    }

    /// Read a TTF/OTF file from disk.
    pub fn load(path: impl AsRef<Path>, size_px: f32) -> ImageResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .with_context(|| format!("read font '{}'", path.display()))?;
        Self::from_bytes(data, size_px)
    }

    /// Same face at a different size.
    pub fn with_size(&self, size_px: f32) -> ImageResult<Self> {
        Self::from_bytes(self.data.as_ref().clone(), size_px)
    }

    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        self.data.as_slice()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color carried through Parley layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Glyph positioned in layout space, relative to the layout rect's origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PlacedGlyph {
    pub(crate) id: u32,
    pub(crate) x: f32,
    pub(crate) y: f32,
}

/// A shaped run ready to rasterize.
#[derive(Clone, Debug)]
pub(crate) struct PlacedRun {
    pub(crate) brush: TextBrushRgba8,
    pub(crate) font_size: f32,
    pub(crate) glyphs: Vec<PlacedGlyph>,
}

/// Stateful helper for shaping text with Parley.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape `text`, wrap it to `max_width`, and align every line inside that width.
    pub(crate) fn layout_aligned(
        &mut self,
        text: &str,
        font: &Font,
        brush: TextBrushRgba8,
        max_width: f32,
        alignment: TextAlignment,
    ) -> ImageResult<Vec<PlacedRun>> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes().to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| {
                ImageError::invalid_image("no font families registered from font bytes")
            })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ImageError::invalid_image("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size_px()));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        let wrap = (max_width.is_finite() && max_width > 0.0).then_some(max_width);
        layout.break_all_lines(wrap);
        layout.align(
            wrap,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );

        let mut runs = Vec::new();
        for line in layout.lines() {
            let advance = line.metrics().advance;
            let dx = match (alignment, wrap) {
                (TextAlignment::Left, _) | (_, None) => 0.0,
                (TextAlignment::Center, Some(w)) => (w - advance) * 0.5,
                (TextAlignment::Right, Some(w)) => w - advance,
            };
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                // Absolute pen positions: x along the line, y on its baseline.
                let glyphs = run
                    .positioned_glyphs()
                    .map(|g| PlacedGlyph {
                        id: g.id,
                        x: g.x + dx,
                        y: g.y,
                    })
                    .collect();
                runs.push(PlacedRun {
                    brush: run.style().brush,
                    font_size: run.run().font_size(),
                    glyphs,
                });
            }
        }
        Ok(runs)
    }
}

/// Fill shaped runs into `layer` under `transform`, clipped to `clip` in layout space.
pub(crate) fn fill_runs(
    layer: &mut CpuLayer,
    runs: &[PlacedRun],
    font: &Font,
    transform: kurbo::Affine,
    clip: Option<Rect>,
) {
    let font_data =
        vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font.bytes().to_vec()), 0);
    let ctx = layer.ctx();
    ctx.set_transform(affine_to_cpu(transform));
    if let Some(clip) = clip {
        ctx.push_clip_layer(&rect_to_cpu(clip).to_path(0.1));
    }
    for run in runs {
        let b = run.brush;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(b.r, b.g, b.b, b.a));
        let glyphs = run.glyphs.iter().map(|g| vello_cpu::Glyph {
            id: g.id,
            x: g.x,
            y: g.y,
        });
        ctx.glyph_run(&font_data)
            .font_size(run.font_size)
            .fill_glyphs(glyphs);
    }
    if clip.is_some() {
        ctx.pop_layer();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/draw/text.rs"]
mod tests;
