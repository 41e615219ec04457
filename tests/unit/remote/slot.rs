use super::*;

use crate::foundation::error::ImageError;
use crate::remote::fetch::{Fetcher, ImageCodec};
use crate::remote::queue::CallbackQueue;
use crate::settings::FetchSettings;

fn solid(w: u32, h: u32, px: [u8; 4]) -> RasterBuffer {
    RasterBuffer::from_premul_rgba8(w, h, px.repeat((w * h) as usize)).unwrap()
}

struct Fixed(Option<[u8; 4]>);

impl Fetcher for Fixed {
    fn fetch(&self, _url: &str) -> ImageResult<Vec<u8>> {
        match self.0 {
            Some(px) => Ok(px.to_vec()),
            None => Err(ImageError::fetch("offline")),
        }
    }
}

struct Raw;

impl ImageCodec for Raw {
    fn decode(&self, bytes: &[u8]) -> ImageResult<RasterBuffer> {
        RasterBuffer::from_premul_rgba8(1, 1, bytes.to_vec())
    }
}

#[test]
fn crossfade_endpoints_and_midpoint() {
    let fade = Crossfade::new(solid(2, 2, [0, 0, 0, 255]), solid(1, 1, [255, 255, 255, 255]));
    let start = fade.frame_at(Duration::ZERO).unwrap();
    assert_eq!((start.width(), start.height()), (1, 1));
    assert_eq!(start.to_premul_rgba8(), vec![0, 0, 0, 255]);

    let mid = fade.frame_at(FADE_DURATION / 2).unwrap().to_premul_rgba8();
    assert!((i32::from(mid[0]) - 128).abs() <= 2, "{mid:?}");

    assert_eq!(fade.frame_at(FADE_DURATION * 2).unwrap(), fade.to);
    assert!(fade.is_finished(FADE_DURATION));
    assert!(!fade.is_finished(Duration::from_millis(100)));
}

#[test]
fn load_swaps_in_fetched_image_with_fade() {
    let queue = CallbackQueue::new();
    let cache = RemoteImageCache::new(
        Fixed(Some([0, 255, 0, 255])),
        Raw,
        queue.sender(),
        &FetchSettings::default(),
    )
    .unwrap();
    let slot = ImageSlot::new();
    let placeholder = solid(1, 1, [255, 0, 0, 255]);
    let loaded = Arc::new(Mutex::new(false));
    let loaded2 = Arc::clone(&loaded);

    slot.load_from_url(&cache, "green", placeholder.clone(), true, move |_| {
        *loaded2.lock().unwrap() = true;
    });
    assert_eq!(slot.image(), Some(placeholder.clone()));

    assert_eq!(queue.run_until(1, Duration::from_secs(5)), 1);
    assert!(*loaded.lock().unwrap());
    assert_eq!(slot.image().unwrap().to_premul_rgba8(), vec![0, 255, 0, 255]);
    let fade = slot.transition().unwrap();
    assert_eq!(fade.from, placeholder);
    assert_eq!(fade.duration, FADE_DURATION);
}

#[test]
fn failed_load_keeps_placeholder() {
    let queue = CallbackQueue::new();
    let cache =
        RemoteImageCache::new(Fixed(None), Raw, queue.sender(), &FetchSettings::default()).unwrap();
    let slot = ImageSlot::new();
    let placeholder = solid(1, 1, [255, 0, 0, 255]);
    slot.load_from_url(&cache, "gone", placeholder.clone(), true, |_| {
        panic!("on_loaded must not run on failure")
    });
    assert_eq!(queue.run_until(1, Duration::from_secs(5)), 1);
    assert_eq!(slot.image(), Some(placeholder));
    assert!(slot.transition().is_none());
}

#[test]
fn completion_before_placeholder_keeps_fetched_image() {
    let slot = ImageSlot::new();
    let old = solid(1, 1, [9, 9, 9, 255]);
    slot.set_image(Some(old.clone()));
    let fetched = solid(1, 1, [0, 255, 0, 255]);

    // The queue is drained on another thread and the completion wins the race.
    let ticket = slot.begin_load();
    assert!(slot.land(ticket, fetched.clone(), true));
    slot.show_pending(ticket, solid(1, 1, [255, 0, 0, 255]));

    assert_eq!(slot.image(), Some(fetched.clone()));
    let fade = slot.transition().unwrap();
    assert_eq!(fade.from, old);
    assert_eq!(fade.to, fetched);
}

#[test]
fn superseded_load_is_dropped() {
    let slot = ImageSlot::new();
    let first = slot.begin_load();
    let second = slot.begin_load();
    slot.show_pending(first, solid(1, 1, [1, 1, 1, 255]));
    assert_eq!(slot.image(), None);

    slot.show_pending(second, solid(1, 1, [2, 2, 2, 255]));
    assert!(!slot.land(first, solid(1, 1, [3, 3, 3, 255]), false));
    assert_eq!(slot.image().unwrap().to_premul_rgba8(), vec![2, 2, 2, 255]);

    slot.set_image(None);
    assert!(!slot.land(second, solid(1, 1, [4, 4, 4, 255]), false));
    assert_eq!(slot.image(), None);
}
