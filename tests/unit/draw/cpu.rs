use super::*;

#[test]
fn pixmap_keeps_premultiplied_bytes() {
    let bytes = vec![10, 20, 30, 40, 255, 255, 255, 255];
    let pixmap = premul_bytes_to_pixmap(&bytes, 2, 1).unwrap();
    assert_eq!(pixmap.width(), 2);
    assert_eq!(pixmap.data_as_u8_slice(), bytes.as_slice());
}

#[test]
fn pixmap_rejects_length_mismatch() {
    assert!(premul_bytes_to_pixmap(&[0; 7], 2, 1).is_err());
    assert!(canvas_dim(70_000, "width").is_err());
}

#[test]
fn path_conversion_keeps_every_element() {
    let mut path = BezPath::new();
    path.move_to((0.0, 0.0));
    path.quad_to((1.0, 2.0), (3.0, 4.0));
    path.curve_to((5.0, 6.0), (7.0, 8.0), (9.0, 10.0));
    path.close_path();
    let cpu = bezpath_to_cpu(&path);
    assert_eq!(cpu.elements().len(), 4);
    assert_eq!(cpu.elements()[2], path.elements()[2]);
}

#[test]
fn coverage_layer_reports_alpha() {
    let mut layer = CpuLayer::new(4, 1, &RenderSettings::default());
    let ctx = layer.ctx();
    ctx.set_paint(COVERAGE_PAINT);
    ctx.fill_rect(&rect_to_cpu(Rect::new(1.0, 0.0, 3.0, 1.0)));
    assert_eq!(layer.into_coverage(), vec![0, 255, 255, 0]);
}

#[test]
fn interpolation_picks_sampler_quality() {
    let img = RasterBuffer::from_premul_rgba8(1, 1, vec![0, 0, 0, 255]).unwrap();
    let nearest = image_paint(&img, Interpolation::None).unwrap();
    assert_eq!(nearest.sampler.quality, vello_cpu::peniko::ImageQuality::Low);
    let high = image_paint(&img, Interpolation::High).unwrap();
    assert_eq!(high.sampler.quality, vello_cpu::peniko::ImageQuality::High);
}
