use super::*;

use crate::remote::fetch::{Fetcher, ImageCodec};
use crate::settings::FetchSettings;

#[test]
fn sample_photo_is_opaque_with_sky_above_sand() {
    let photo = sample_photo(64, 48).unwrap();
    assert_eq!((photo.width(), photo.height()), (64, 48));
    assert!(!photo.has_alpha());
    let sky = photo.pixel_premul(2, 2).unwrap();
    let sand = photo.pixel_premul(2, 46).unwrap();
    assert!(sky[2] > sky[0], "sky should be blue: {sky:?}");
    assert!(sand[0] > sand[2], "sand should be warm: {sand:?}");
}

#[test]
fn demo_sections_without_font_skip_only_text() {
    let photo = sample_photo(120, 90).unwrap();
    let sections = demo_sections(&photo, None, 60).unwrap();
    let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        [
            "Colors & Gradients",
            "Text",
            "Rounded Edges & Borders",
            "Cropping",
            "Image Effects",
            "Web Image"
        ]
    );
    let counts: Vec<_> = sections.iter().map(|s| s.items.len()).collect();
    assert_eq!(counts, [5, 0, 3, 1, 5, 1]);

    let circle = &sections[2].items[0].image;
    assert_eq!((circle.width(), circle.height()), (90, 90));
    let crop = &sections[3].items[0].image;
    assert_eq!((crop.width(), crop.height()), (60, 30));
}

#[test]
fn crop_that_does_not_fit_is_skipped() {
    let photo = sample_photo(50, 50).unwrap();
    let sections = demo_sections(&photo, None, 40).unwrap();
    assert!(sections[3].items.is_empty());
}

#[test]
fn zero_cell_is_rejected() {
    let photo = sample_photo(8, 8).unwrap();
    assert!(demo_sections(&photo, None, 0).is_err());
}

#[test]
fn contact_sheet_places_items_in_grid() {
    let red = solid_color(Color::RED, Size::new(20.0, 10.0)).unwrap();
    let blue = solid_color(Color::BLUE, Size::new(10.0, 10.0)).unwrap();
    let sections = vec![
        GallerySection {
            title: "A".into(),
            items: vec![
                GalleryItem {
                    title: "red".into(),
                    image: red,
                },
                GalleryItem {
                    title: "blue".into(),
                    image: blue,
                },
            ],
        },
        GallerySection {
            title: "B".into(),
            items: vec![],
        },
    ];
    let (sheet, manifest) = contact_sheet(&sections, None, 40).unwrap();
    assert_eq!((sheet.width(), sheet.height()), (manifest.width, manifest.height));
    assert_eq!(manifest.width, 2 * MARGIN + 2 * 40 + GAP);
    assert_eq!(manifest.item_count(), 2);

    let red_item = &manifest.sections[0].items[0];
    assert_eq!((red_item.width, red_item.height), (40, 20));
    let px = sheet
        .pixel_premul(red_item.x + 20, red_item.y + 10)
        .unwrap();
    assert_eq!(px, [255, 0, 0, 255]);
    assert_eq!(sheet.pixel_premul(0, 0).unwrap(), [255, 255, 255, 255]);

    let json = manifest.to_json_pretty().unwrap();
    let back: GalleryManifest = serde_json::from_str(&json).unwrap();
    assert_eq!(back, manifest);
}

struct Unreachable;

impl Fetcher for Unreachable {
    fn fetch(&self, url: &str) -> ImageResult<Vec<u8>> {
        Err(ImageError::fetch(format!("no route to {url}")))
    }
}

struct NeverCalled;

impl ImageCodec for NeverCalled {
    fn decode(&self, _bytes: &[u8]) -> ImageResult<RasterBuffer> {
        Err(ImageError::decode("unused"))
    }
}

#[test]
fn web_item_keeps_red_placeholder_on_failure() {
    let queue = CallbackQueue::new();
    let cache = RemoteImageCache::new(
        Unreachable,
        NeverCalled,
        queue.sender(),
        &FetchSettings::default(),
    )
    .unwrap();
    let item = web_image_item(&cache, &queue, "http://x/y.png", 8, Duration::from_secs(5)).unwrap();
    assert_eq!(item.title, "From URL");
    assert_eq!(item.image.pixel_premul(4, 4).unwrap(), [255, 0, 0, 255]);
}
