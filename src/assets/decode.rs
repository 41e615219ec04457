use std::io::Cursor;
use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{ImageError, ImageResult};
use crate::foundation::math::premul_rgba8;
use crate::raster::buffer::{PixelFormat, RasterBuffer};

/// Decode PNG/JPEG/GIF/WebP/BMP bytes.
///
/// Sources with alpha become premultiplied `RGBA`, 8/16-bit luminance becomes `Gray`, and
/// everything else opaque `RGBX`.
pub fn decode_image(bytes: &[u8]) -> ImageResult<RasterBuffer> {
    if bytes.is_empty() {
        return Err(ImageError::decode("empty image data"));
    }
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| ImageError::decode(format!("decode image from memory: {e}")))?;
    let (width, height) = (dyn_img.width(), dyn_img.height());
    let color = dyn_img.color();

    if color.has_alpha() {
        let mut rgba = dyn_img.to_rgba8().into_raw();
        premultiply_rgba8_in_place(&mut rgba);
        return RasterBuffer::from_pixels(width, height, PixelFormat::RGBA_PREMUL, rgba);
    }
    if matches!(color, image::ColorType::L8 | image::ColorType::L16) {
        let luma = dyn_img.to_luma8().into_raw();
        return RasterBuffer::from_pixels(width, height, PixelFormat::GRAY, luma);
    }
    let mut rgbx = Vec::with_capacity(width as usize * height as usize * 4);
    for px in dyn_img.to_rgb8().pixels() {
        rgbx.extend_from_slice(&[px[0], px[1], px[2], 255]);
    }
    RasterBuffer::from_pixels(width, height, PixelFormat::RGB_OPAQUE, rgbx)
}

/// Encode as straight-alpha RGBA PNG.
pub fn encode_png(image: &RasterBuffer) -> ImageResult<Vec<u8>> {
    let rgba = image::RgbaImage::from_raw(image.width(), image.height(), image.to_straight_rgba8())
        .ok_or_else(|| ImageError::invalid_image("pixel store does not match dimensions"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(rgba)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

pub fn save_png(image: &RasterBuffer, path: impl AsRef<Path>) -> ImageResult<()> {
    let path = path.as_ref();
    let bytes = encode_png(image)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let out = premul_rgba8([px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&out);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
