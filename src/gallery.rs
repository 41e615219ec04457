//! Demo gallery: the example grid of the image helpers, rendered to a single contact sheet.
//!
//! Sections and item titles follow the demo application. Items whose operation fails (a crop
//! that does not fit the photo, text without a font) are skipped with a warning.

use std::time::Duration;

use crate::draw::context::DrawingContext;
use crate::draw::text::Font;
use crate::effects::BlurEffect;
use crate::factory::{linear_gradient, radial_gradient, solid_color, text_label};
use crate::foundation::core::{Color, ColorStop, Point, Rect, Size, TextAlignment, Vec2};
use crate::foundation::error::{ImageError, ImageResult};
use crate::raster::buffer::{PixelFormat, RasterBuffer};
use crate::raster::composite::BlendMode;
use crate::remote::cache::RemoteImageCache;
use crate::remote::queue::CallbackQueue;
use crate::remote::slot::ImageSlot;

/// Cell side, in points, of the demo grid.
pub const CELL_POINTS: f64 = 140.0;

#[derive(Clone, Debug, PartialEq)]
pub struct GalleryItem {
    pub title: String,
    pub image: RasterBuffer,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GallerySection {
    pub title: String,
    pub items: Vec<GalleryItem>,
}

impl GallerySection {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_owned(),
            items: Vec::new(),
        }
    }

    fn push(&mut self, title: &str, image: ImageResult<RasterBuffer>) {
        match image {
            Ok(image) => self.items.push(GalleryItem {
                title: title.to_owned(),
                image,
            }),
            Err(err) => tracing::warn!(item = title, error = %err, "gallery item skipped"),
        }
    }
}

/// Stand-in photo used when no source image is supplied: sky over sand, with a sun.
pub fn sample_photo(width: u32, height: u32) -> ImageResult<RasterBuffer> {
    let (w, h) = (f64::from(width), f64::from(height));
    DrawingContext::render(width, height, PixelFormat::RGB_OPAQUE, 1.0, |ctx| {
        let sky = ColorStop::evenly_spaced(&[
            Color::new(0.227, 0.525, 0.851, 1.0),
            Color::new(0.678, 0.847, 0.961, 1.0),
        ]);
        ctx.draw_linear_gradient(&sky, Point::ZERO, Point::new(0.0, h * 0.6))?;

        let sun = [
            ColorStop::new(Color::new(1.0, 0.957, 0.741, 1.0), 0.0),
            ColorStop::new(Color::new(1.0, 0.827, 0.392, 0.0), 1.0),
        ];
        ctx.draw_radial_gradient(&sun, Point::new(w * 0.72, h * 0.28), 0.0, h * 0.22, false)?;

        let sand = Rect::new(0.0, h * 0.6, w, h);
        ctx.save_state();
        ctx.clip_to_rect(sand);
        let stops = ColorStop::evenly_spaced(&[
            Color::new(0.957, 0.878, 0.698, 1.0),
            Color::new(0.851, 0.733, 0.525, 1.0),
        ]);
        let result = ctx.draw_linear_gradient(&stops, Point::new(0.0, sand.y0), Point::new(0.0, h));
        ctx.restore_state();
        result
    })
}

/// Build every demo section from `photo`.
///
/// `cell` is the item side in pixels; lengths given in points are scaled by
/// `cell / CELL_POINTS`. The text item needs `font`.
#[tracing::instrument(level = "debug", skip(photo, font))]
pub fn demo_sections(
    photo: &RasterBuffer,
    font: Option<&Font>,
    cell: u32,
) -> ImageResult<Vec<GallerySection>> {
    if cell == 0 {
        return Err(ImageError::invalid_image("gallery cell size must be > 0"));
    }
    let side = f64::from(cell);
    let scale = side / CELL_POINTS;
    let size = Size::new(side, side);

    let mut colors = GallerySection::new("Colors & Gradients");
    colors.push(
        "Solid Color",
        solid_color(Color::new(0.0, 0.502, 1.0, 1.0), size),
    );
    colors.push(
        "Gradient Color",
        linear_gradient(
            &ColorStop::evenly_spaced(&[
                Color::new(0.808, 0.863, 0.902, 1.0),
                Color::new(0.349, 0.412, 0.443, 1.0),
            ]),
            size,
        ),
    );
    colors.push(
        "Gradient Overlay",
        photo.apply_gradient_colors(
            &ColorStop::evenly_spaced(&[
                Color::new(0.996, 0.769, 0.494, 1.0),
                Color::new(0.969, 0.608, 0.212, 0.2),
            ]),
            BlendMode::Normal,
        ),
    );
    colors.push(
        "Gradient More",
        photo.apply_gradient_colors(
            &[
                ColorStop::new(Color::RED, 0.0),
                ColorStop::new(Color::GREEN, 0.25),
                ColorStop::new(Color::BLUE, 0.99),
            ],
            BlendMode::Normal,
        ),
    );
    colors.push(
        "Radial Gradient",
        radial_gradient(
            Color::new(0.996, 1.0, 1.0, 1.0),
            Color::new(0.627, 0.835, 0.922, 1.0),
            Point::new(0.5, 0.5),
            0.5,
            size,
        ),
    );

    let mut text = GallerySection::new("Text");
    let label = match font {
        Some(font) => font.with_size((64.0 * scale) as f32).and_then(|font| {
            text_label("M", &font, Color::WHITE, Color::RED, size, Vec2::ZERO)?
                .round_corners_to_circle()
        }),
        None => Err(ImageError::invalid_image("no font supplied for text items")),
    };
    text.push("Text Image", label);

    let mut corners = GallerySection::new("Rounded Edges & Borders");
    corners.push("Circle", photo.round_corners_to_circle());
    corners.push(
        "Circle + Border",
        photo.round_corners_to_circle_with_border(12.0 * scale, Color::LIGHT_GRAY),
    );
    corners.push("Round Corners", photo.round_corners(12.0));

    let mut cropping = GallerySection::new("Cropping");
    cropping.push(
        "Crop + Resize",
        photo.crop(Rect::new(40.0, 40.0, 40.0 + side, 40.0 + side / 2.0)),
    );

    let mut effects = GallerySection::new("Image Effects");
    effects.push("Dark Effect", photo.apply_dark_effect());
    effects.push("Light Effect", photo.apply_light_effect());
    effects.push("Extra Light Effect", photo.apply_extra_light_effect());
    effects.push("Tint Effect", photo.apply_tint_effect(Color::RED));
    effects.push(
        "Blur Effect",
        photo.apply_blur(&BlurEffect {
            radius: 10.0,
            tint: Some(Color::white(1.0, 0.3)),
            saturation: 1.8,
        }),
    );

    let mut web = GallerySection::new("Web Image");
    web.push("From URL", solid_color(Color::RED, size));

    Ok(vec![colors, text, corners, cropping, effects, web])
}

/// Load `url` through `cache` into a slot showing a red placeholder, waiting up to `timeout`
/// on `queue` for the completion.
///
/// The slot's image is returned either way: the fetched image, or the placeholder if the
/// fetch failed or did not finish in time.
pub fn web_image_item(
    cache: &RemoteImageCache,
    queue: &CallbackQueue,
    url: &str,
    cell: u32,
    timeout: Duration,
) -> ImageResult<GalleryItem> {
    let side = f64::from(cell);
    let placeholder = solid_color(Color::RED, Size::new(side, side))?;
    let slot = ImageSlot::new();
    slot.load_from_url(cache, url, placeholder, true, |image| {
        tracing::debug!(w = image.width(), h = image.height(), "web image loaded");
    });
    if queue.run_until(1, timeout) == 0 {
        tracing::warn!(url, "web image did not arrive in time; keeping placeholder");
    }
    let image = slot
        .image()
        .ok_or_else(|| ImageError::invalid_image("image slot is empty"))?;
    Ok(GalleryItem {
        title: "From URL".to_owned(),
        image,
    })
}

/// Placement of one item within a contact sheet, in sheet pixels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ManifestItem {
    pub title: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub source_width: u32,
    pub source_height: u32,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ManifestSection {
    pub title: String,
    pub items: Vec<ManifestItem>,
}

/// Index of a rendered contact sheet.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GalleryManifest {
    pub width: u32,
    pub height: u32,
    pub cell: u32,
    pub sections: Vec<ManifestSection>,
}

impl GalleryManifest {
    pub fn to_json_pretty(&self) -> ImageResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ImageError::Other(anyhow::anyhow!("serialize gallery manifest: {e}")))
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

const MARGIN: u32 = 16;
const GAP: u32 = 12;

struct SheetLayout {
    cell: u32,
    header: u32,
    caption: u32,
    columns: u32,
}

impl SheetLayout {
    fn row_height(&self) -> u32 {
        self.header + self.cell + self.caption + GAP
    }

    fn width(&self) -> u32 {
        2 * MARGIN + self.columns * self.cell + self.columns.saturating_sub(1) * GAP
    }

    fn cell_origin(&self, row: u32, column: u32) -> (u32, u32) {
        (
            MARGIN + column * (self.cell + GAP),
            MARGIN + row * self.row_height() + self.header,
        )
    }
}

/// Draw every item aspect-fit into a grid, one row per section.
///
/// With a font, section titles and item captions are drawn too. Returns the sheet and the
/// manifest describing where each item landed.
#[tracing::instrument(level = "debug", skip(sections, font), fields(sections = sections.len()))]
pub fn contact_sheet(
    sections: &[GallerySection],
    font: Option<&Font>,
    cell: u32,
) -> ImageResult<(RasterBuffer, GalleryManifest)> {
    if cell == 0 {
        return Err(ImageError::invalid_image("gallery cell size must be > 0"));
    }
    let columns = sections
        .iter()
        .map(|s| s.items.len() as u32)
        .max()
        .unwrap_or(0)
        .max(1);
    let layout = SheetLayout {
        cell,
        header: if font.is_some() { 28 } else { 4 },
        caption: if font.is_some() { 22 } else { 0 },
        columns,
    };
    let width = layout.width();
    let height = 2 * MARGIN + sections.len().max(1) as u32 * layout.row_height();

    let title_font = font.map(|f| f.with_size(18.0)).transpose()?;
    let caption_font = font.map(|f| f.with_size(13.0)).transpose()?;

    let mut manifest = GalleryManifest {
        width,
        height,
        cell,
        sections: Vec::with_capacity(sections.len()),
    };

    let sheet = DrawingContext::render(width, height, PixelFormat::RGB_OPAQUE, 1.0, |ctx| {
        ctx.fill_rect(ctx.bounds(), Color::WHITE);
        for (row, section) in sections.iter().enumerate() {
            let row = row as u32;
            let (_, top) = layout.cell_origin(row, 0);
            if let Some(font) = &title_font {
                let header = Rect::new(
                    f64::from(MARGIN),
                    f64::from(top - layout.header),
                    f64::from(width - MARGIN),
                    f64::from(top),
                );
                ctx.draw_text(&section.title, font, Color::BLACK, header, TextAlignment::Left)?;
            }

            let mut items = Vec::with_capacity(section.items.len());
            for (column, item) in section.items.iter().enumerate() {
                let (x, y) = layout.cell_origin(row, column as u32);
                let slot = Rect::new(
                    f64::from(x),
                    f64::from(y),
                    f64::from(x + cell),
                    f64::from(y + cell),
                );
                let placed = aspect_fit(item.image.size(), slot);
                ctx.draw_image(placed, &item.image);

                if let Some(font) = &caption_font {
                    let caption = Rect::new(slot.x0, slot.y1 + 4.0, slot.x1, slot.y1 + 4.0 + 18.0);
                    ctx.draw_text(&item.title, font, Color::GRAY, caption, TextAlignment::Center)?;
                }
                items.push(ManifestItem {
                    title: item.title.clone(),
                    x: placed.x0.round() as u32,
                    y: placed.y0.round() as u32,
                    width: placed.width().round() as u32,
                    height: placed.height().round() as u32,
                    source_width: item.image.width(),
                    source_height: item.image.height(),
                });
            }
            manifest.sections.push(ManifestSection {
                title: section.title.clone(),
                items,
            });
        }
        Ok(())
    })?;
    Ok((sheet, manifest))
}

// Largest rect with the aspect of `size`, centred in `slot`.
fn aspect_fit(size: Size, slot: Rect) -> Rect {
    let ratio = (slot.width() / size.width).min(slot.height() / size.height);
    let (w, h) = (size.width * ratio, size.height * ratio);
    let x = slot.x0 + (slot.width() - w) / 2.0;
    let y = slot.y0 + (slot.height() - h) / 2.0;
    Rect::new(x, y, x + w, y + h)
}

#[cfg(test)]
#[path = "../tests/unit/gallery.rs"]
mod tests;
