use super::*;

#[test]
fn from_pixels_validates_length_and_dimensions() {
    assert!(RasterBuffer::from_pixels(2, 2, PixelFormat::RGBA_PREMUL, vec![0; 16]).is_ok());
    assert!(RasterBuffer::from_pixels(2, 2, PixelFormat::RGBA_PREMUL, vec![0; 15]).is_err());
    assert!(RasterBuffer::from_pixels(0, 2, PixelFormat::GRAY, vec![]).is_err());
    assert!(RasterBuffer::from_pixels(70_000, 1, PixelFormat::GRAY, vec![0; 70_000]).is_err());
}

#[test]
fn gray_with_alpha_is_rejected() {
    let fmt = PixelFormat {
        layout: ChannelLayout::Gray,
        alpha: AlphaMode::Last,
    };
    let err = RasterBuffer::from_pixels(1, 1, fmt, vec![0]).unwrap_err();
    assert!(matches!(err, ImageError::InvalidImage(_)));
}

#[test]
fn decode_premul_handles_every_layout() {
    let straight_last = PixelFormat {
        layout: ChannelLayout::Rgba,
        alpha: AlphaMode::Last,
    };
    let straight_first = PixelFormat {
        layout: ChannelLayout::Rgba,
        alpha: AlphaMode::First,
    };
    assert_eq!(straight_last.decode_premul(&[200, 100, 0, 128]), [100, 50, 0, 128]);
    assert_eq!(straight_first.decode_premul(&[128, 200, 100, 0]), [100, 50, 0, 128]);
    assert_eq!(PixelFormat::ARGB_PREMUL.decode_premul(&[9, 1, 2, 3]), [1, 2, 3, 9]);
    assert_eq!(PixelFormat::RGB_OPAQUE.decode_premul(&[1, 2, 3, 0]), [1, 2, 3, 255]);
    assert_eq!(PixelFormat::GRAY.decode_premul(&[77]), [77, 77, 77, 255]);
}

#[test]
fn encode_writes_target_byte_order() {
    let premul = [100u8, 50, 0, 128];
    let img = RasterBuffer::encode(1, 1, PixelFormat::ARGB_PREMUL, &premul).unwrap();
    assert_eq!(img.pixels(), &[128, 100, 50, 0]);

    let opaque = RasterBuffer::encode(1, 1, PixelFormat::RGB_OPAQUE, &premul).unwrap();
    assert_eq!(opaque.pixels(), &[100, 50, 0, 255]);

    let gray = RasterBuffer::encode(1, 1, PixelFormat::GRAY, &[255, 255, 255, 255]).unwrap();
    assert_eq!(gray.pixels(), &[255]);
}

#[test]
fn point_size_divides_by_scale() {
    let img = RasterBuffer::from_premul_rgba8(4, 2, vec![0; 32])
        .unwrap()
        .with_scale(2.0);
    assert_eq!(img.size(), Size::new(4.0, 2.0));
    assert_eq!(img.point_size(), Size::new(2.0, 1.0));
    assert_eq!(img.clone().with_scale(-1.0).scale(), 2.0);
}

#[test]
fn straight_export_unpremultiplies() {
    let img = RasterBuffer::from_premul_rgba8(1, 1, vec![100, 50, 0, 128]).unwrap();
    assert_eq!(img.to_straight_rgba8(), vec![199, 100, 0, 128]);
    assert_eq!(img.pixel_premul(0, 0), Some([100, 50, 0, 128]));
    assert_eq!(img.pixel_premul(1, 0), None);
}
