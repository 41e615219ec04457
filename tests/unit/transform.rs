use super::*;

use crate::raster::buffer::AlphaMode;

// Opaque RGBX image whose pixels encode their own coordinates.
fn gradient_rgb(w: u32, h: u32) -> RasterBuffer {
    let mut px = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            px.extend_from_slice(&[(x * 7 % 256) as u8, (y * 11 % 256) as u8, 90, 255]);
        }
    }
    RasterBuffer::from_pixels(w, h, PixelFormat::RGB_OPAQUE, px).unwrap()
}

fn solid_premul(w: u32, h: u32, px: [u8; 4]) -> RasterBuffer {
    RasterBuffer::from_premul_rgba8(w, h, px.repeat((w * h) as usize)).unwrap()
}

#[test]
fn apply_alpha_adds_premultiplied_first() {
    let img = gradient_rgb(5, 4);
    let out = img.apply_alpha().unwrap();
    assert_eq!(out.alpha_mode(), AlphaMode::PremultipliedFirst);
    assert_eq!(out.to_premul_rgba8(), img.to_premul_rgba8());

    let already = solid_premul(2, 2, [1, 2, 3, 4]);
    assert_eq!(already.apply_alpha().unwrap(), already);
}

#[test]
fn padding_round_trip_recovers_interior() {
    let img = gradient_rgb(20, 12);
    let cropped = img.crop(Rect::new(3.0, 2.0, 15.0, 10.0)).unwrap();
    let padded = cropped.apply_padding(4).unwrap();
    assert_eq!((padded.width(), padded.height()), (20, 16));
    assert!(padded.has_alpha());
    assert_eq!(padded.pixel_premul(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(padded.pixel_premul(19, 15), Some([0, 0, 0, 0]));

    let interior = padded.crop(Rect::new(4.0, 4.0, 16.0, 12.0)).unwrap();
    assert_eq!(interior.to_premul_rgba8(), cropped.to_premul_rgba8());
}

#[test]
fn zero_padding_keeps_size() {
    let img = gradient_rgb(3, 3);
    let out = img.apply_padding(0).unwrap();
    assert_eq!(out.to_premul_rgba8(), img.to_premul_rgba8());
}

#[test]
fn mask_with_requires_matching_size() {
    let img = gradient_rgb(3, 3);
    let mask = RasterBuffer::from_pixels(2, 2, PixelFormat::GRAY, vec![255; 4]).unwrap();
    assert!(img.mask_with(&mask).is_err());
}

#[test]
fn crop_is_verbatim_and_checks_bounds() {
    let img = gradient_rgb(10, 10);
    let c = img.crop(Rect::new(2.0, 3.0, 5.0, 4.0)).unwrap();
    assert_eq!((c.width(), c.height()), (3, 1));
    assert_eq!(c.format(), img.format());
    assert_eq!(c.pixels(), &[14, 33, 90, 255, 21, 33, 90, 255, 28, 33, 90, 255]);

    let expanded = img.crop(Rect::new(1.5, 1.5, 2.2, 2.2)).unwrap();
    assert_eq!((expanded.width(), expanded.height()), (2, 2));

    assert!(matches!(
        img.crop(Rect::new(-1.0, 0.0, 5.0, 5.0)).unwrap_err(),
        ImageError::InvalidBounds(_)
    ));
    assert!(matches!(
        img.crop(Rect::new(0.0, 0.0, 11.0, 5.0)).unwrap_err(),
        ImageError::InvalidBounds(_)
    ));
    assert!(matches!(
        img.crop(Rect::new(0.0, f64::NAN, 1.0, 1.0)).unwrap_err(),
        ImageError::InvalidBounds(_)
    ));
    assert!(matches!(
        img.crop(Rect::new(4.0, 4.0, 4.0, 4.0)).unwrap_err(),
        ImageError::InvalidImage(_)
    ));
}

#[test]
fn crop_to_square_uses_shortest_side() {
    for (w, h) in [(10, 4), (4, 10), (7, 7), (5, 2), (1, 9)] {
        let sq = gradient_rgb(w, h).crop_to_square().unwrap();
        assert_eq!(sq.width(), w.min(h));
        assert_eq!(sq.height(), w.min(h));
    }
    let sq = gradient_rgb(10, 4).crop_to_square().unwrap();
    // Left offset is (10 - 4) / 2 = 3, so the first pixel has x = 3.
    assert_eq!(sq.pixel_premul(0, 0).unwrap()[0], 21);
}

#[test]
fn resize_fit_never_exceeds_and_fill_always_covers() {
    let img = gradient_rgb(40, 30);
    for (tw, th) in [(10.0, 10.0), (100.0, 20.0), (33.0, 77.0), (40.0, 30.0), (7.5, 3.2)] {
        let target = Size::new(tw, th);
        let fit = img.resize(target, ContentMode::ScaleAspectFit).unwrap();
        assert!(f64::from(fit.width()) <= tw && f64::from(fit.height()) <= th.max(1.0));
        let fill = img.resize(target, ContentMode::ScaleAspectFill).unwrap();
        assert!(f64::from(fill.width()) >= tw && f64::from(fill.height()) >= th);
        assert_eq!(fill.alpha_mode(), AlphaMode::PremultipliedLast);
    }
}

#[test]
fn resize_scale_to_fill_keeps_source_size() {
    let img = gradient_rgb(12, 8);
    let out = img.resize(Size::new(50.0, 50.0), ContentMode::ScaleToFill).unwrap();
    assert_eq!((out.width(), out.height()), (12, 8));
    assert_eq!(out.to_premul_rgba8(), img.to_premul_rgba8());
}

#[test]
fn resize_rejects_degenerate_target() {
    let img = gradient_rgb(4, 4);
    assert!(img.resize(Size::new(0.0, 4.0), ContentMode::ScaleAspectFit).is_err());
    assert!(img.resize(Size::new(f64::INFINITY, 4.0), ContentMode::ScaleAspectFill).is_err());
}

#[test]
fn zero_radius_matches_apply_alpha() {
    let img = gradient_rgb(9, 6);
    assert_eq!(img.round_corners(0.0).unwrap(), img.apply_alpha().unwrap());
}

#[test]
fn rounded_corners_clear_the_corners() {
    let img = solid_premul(40, 40, [0, 0, 255, 255]);
    let out = img.round_corners(10.0).unwrap();
    assert_eq!(out.pixel_premul(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(out.pixel_premul(20, 20), Some([0, 0, 255, 255]));
    assert_eq!(out.pixel_premul(20, 0), Some([0, 0, 255, 255]));
}

#[test]
fn circle_is_square_with_clear_corners() {
    let img = solid_premul(30, 20, [255, 255, 255, 255]);
    let out = img.round_corners_to_circle().unwrap();
    assert_eq!((out.width(), out.height()), (20, 20));
    assert_eq!(out.pixel_premul(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(out.pixel_premul(10, 10), Some([255, 255, 255, 255]));
}

#[test]
fn border_strokes_inset_ellipse() {
    let img = solid_premul(100, 100, [0, 255, 0, 255]);
    let out = img.apply_border(10.0, Color::RED).unwrap();
    assert_eq!(out.pixel_premul(50, 7), Some([255, 0, 0, 255]));
    assert_eq!(out.pixel_premul(7, 50), Some([255, 0, 0, 255]));
    assert_eq!(out.pixel_premul(2, 2), Some([0, 0, 0, 0]));
    assert_eq!(out.pixel_premul(50, 50), Some([0, 255, 0, 255]));
    assert_eq!(out.pixel_premul(12, 12), Some([0, 255, 0, 255]));
}

#[test]
fn border_that_swallows_the_image_fails() {
    let img = solid_premul(10, 10, [0, 0, 0, 255]);
    assert!(img.apply_border(5.0, Color::RED).is_err());
    assert!(img.apply_border(-1.0, Color::RED).is_err());
}

#[test]
fn circle_with_border_has_ring() {
    let img = solid_premul(50, 40, [0, 0, 255, 255]);
    let out = img.round_corners_to_circle_with_border(4.0, Color::RED).unwrap();
    assert_eq!((out.width(), out.height()), (40, 40));
    assert_eq!(out.pixel_premul(20, 3), Some([255, 0, 0, 255]));
    assert_eq!(out.pixel_premul(20, 20), Some([0, 0, 255, 255]));
}

#[test]
fn gradient_overlay_respects_alpha_and_order() {
    // Left half opaque white, right half transparent.
    let mut px = Vec::new();
    for _y in 0..10 {
        for x in 0..10 {
            px.extend_from_slice(if x < 5 { &[255, 255, 255, 255] } else { &[0, 0, 0, 0] });
        }
    }
    let img = RasterBuffer::from_premul_rgba8(10, 10, px).unwrap();
    let stops = ColorStop::evenly_spaced(&[Color::RED, Color::BLUE]);
    let out = img.apply_gradient_colors(&stops, BlendMode::Normal).unwrap();

    let top = out.pixel_premul(0, 0).unwrap();
    let bottom = out.pixel_premul(0, 9).unwrap();
    assert!(top[0] > 200 && top[2] < 60);
    assert!(bottom[2] > 200 && bottom[0] < 60);
    assert_eq!(out.pixel_premul(8, 5), Some([0, 0, 0, 0]));
}

#[test]
fn gradient_overlay_multiply_darkens() {
    let img = solid_premul(4, 4, [255, 255, 255, 255]);
    let stops = ColorStop::evenly_spaced(&[Color::BLACK, Color::BLACK]);
    let out = img.apply_gradient_colors(&stops, BlendMode::Multiply).unwrap();
    assert_eq!(out.pixel_premul(2, 2), Some([0, 0, 0, 255]));
}
