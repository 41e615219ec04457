use super::*;

#[test]
fn font_rejects_bad_sizes_and_empty_data() {
    assert!(Font::from_bytes(vec![0; 4], 0.0).is_err());
    assert!(Font::from_bytes(vec![0; 4], f32::NAN).is_err());
    assert!(Font::from_bytes(Vec::new(), 12.0).is_err());
    let f = Font::from_bytes(vec![0; 4], 12.0).unwrap();
    assert_eq!(f.size_px(), 12.0);
    assert_eq!(f.with_size(20.0).unwrap().size_px(), 20.0);
}

#[test]
fn font_debug_hides_bytes() {
    let f = Font::from_bytes(vec![1, 2, 3], 10.0).unwrap();
    let s = format!("{f:?}");
    assert!(s.contains("bytes: 3"));
}

#[test]
fn missing_font_file_is_an_error() {
    let err = Font::load("/definitely/not/a/font.ttf", 12.0).unwrap_err();
    assert!(err.to_string().contains("read font"));
}

#[test]
fn garbage_font_bytes_do_not_shape() {
    let font = Font::from_bytes(vec![0xAB; 64], 12.0).unwrap();
    let mut engine = TextLayoutEngine::new();
    let res = engine.layout_aligned(
        "hi",
        &font,
        TextBrushRgba8::default(),
        100.0,
        TextAlignment::Center,
    );
    assert!(res.is_err());
}

#[test]
fn empty_run_list_rasterizes_transparent() {
    let font = Font::from_bytes(vec![0; 4], 12.0).unwrap();
    let mut layer = CpuLayer::new(4, 3, &crate::settings::RenderSettings::default());
    fill_runs(
        &mut layer,
        &[],
        &font,
        kurbo::Affine::IDENTITY,
        Some(Rect::new(0.0, 0.0, 4.0, 3.0)),
    );
    let pixels = layer.into_premul();
    assert_eq!(pixels.len(), 4 * 3 * 4);
    assert!(pixels.iter().all(|&b| b == 0));
}

fn fixture_font(size_px: f32) -> Font {
    Font::load(
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/fonts/DejaVuSans.ttf"),
        size_px,
    )
    .unwrap()
}

#[test]
fn glyphs_advance_along_the_baseline() {
    let font = fixture_font(24.0);
    let mut engine = TextLayoutEngine::new();
    let runs = engine
        .layout_aligned("WWWW", &font, TextBrushRgba8::default(), 200.0, TextAlignment::Left)
        .unwrap();
    let glyphs: Vec<_> = runs.iter().flat_map(|r| r.glyphs.iter()).collect();
    assert_eq!(glyphs.len(), 4);
    for pair in glyphs.windows(2) {
        assert!(pair[1].x > pair[0].x + 5.0, "{:?}", pair);
    }
    // Baseline sits below the layout top by roughly the ascent.
    assert!(glyphs.iter().all(|g| g.y > 10.0 && g.y < 30.0));
}

#[test]
fn centred_lines_are_offset_by_half_the_slack() {
    let font = fixture_font(20.0);
    let mut engine = TextLayoutEngine::new();
    let brush = TextBrushRgba8::default();
    let left = engine
        .layout_aligned("Hi", &font, brush, 300.0, TextAlignment::Left)
        .unwrap();
    let centre = engine
        .layout_aligned("Hi", &font, brush, 300.0, TextAlignment::Center)
        .unwrap();
    let right = engine
        .layout_aligned("Hi", &font, brush, 300.0, TextAlignment::Right)
        .unwrap();
    let x0 = |runs: &[PlacedRun]| runs[0].glyphs[0].x;
    let shift = x0(&centre) - x0(&left);
    assert!(shift > 100.0 && shift < 150.0, "shift {shift}");
    assert!((x0(&right) - x0(&left) - 2.0 * shift).abs() < 1.0);
}

#[test]
fn filled_runs_land_inside_the_clip() {
    let font = fixture_font(24.0);
    let white = TextBrushRgba8 {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };
    let mut engine = TextLayoutEngine::new();
    let runs = engine
        .layout_aligned("WWWW", &font, white, 200.0, TextAlignment::Left)
        .unwrap();
    let settings = crate::settings::RenderSettings::default();

    let mut open = CpuLayer::new(200, 40, &settings);
    fill_runs(&mut open, &runs, &font, kurbo::Affine::IDENTITY, None);
    let open = open.into_coverage();
    assert!(open.iter().filter(|&&a| a > 0).count() > 50);

    // Clip to the left 20 px: nothing survives to its right.
    let mut clipped = CpuLayer::new(200, 40, &settings);
    fill_runs(
        &mut clipped,
        &runs,
        &font,
        kurbo::Affine::IDENTITY,
        Some(Rect::new(0.0, 0.0, 20.0, 40.0)),
    );
    let clipped = clipped.into_coverage();
    for (i, &a) in clipped.iter().enumerate() {
        if i % 200 >= 21 {
            assert_eq!(a, 0, "pixel {} lit past the clip", i);
        }
    }
    assert!(clipped.iter().any(|&a| a > 0));
}
