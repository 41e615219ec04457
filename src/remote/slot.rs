use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::draw::context::DrawingContext;
use crate::foundation::error::ImageResult;
use crate::raster::buffer::{PixelFormat, RasterBuffer};
use crate::raster::composite::crossfade_in_place;
use crate::remote::cache::RemoteImageCache;

/// Time a fetched image takes to fade in over the previous one.
pub const FADE_DURATION: Duration = Duration::from_millis(500);

/// Timed blend from the previously shown image to a new one.
#[derive(Clone, Debug, PartialEq)]
pub struct Crossfade {
    pub from: RasterBuffer,
    pub to: RasterBuffer,
    pub duration: Duration,
}

impl Crossfade {
    pub fn new(from: RasterBuffer, to: RasterBuffer) -> Self {
        Self {
            from,
            to,
            duration: FADE_DURATION,
        }
    }

    /// Fraction of the fade completed after `elapsed`, in `[0, 1]`.
    pub fn progress(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        self.progress(elapsed) >= 1.0
    }

    /// Frame shown `elapsed` into the fade, at the size of `to`.
    pub fn frame_at(&self, elapsed: Duration) -> ImageResult<RasterBuffer> {
        let t = self.progress(elapsed);
        if t >= 1.0 {
            return Ok(self.to.clone());
        }
        let (w, h) = (self.to.width(), self.to.height());
        // Previous image stretched over the new one's bounds.
        let from = DrawingContext::render(w, h, PixelFormat::RGBA_PREMUL, self.to.scale(), |ctx| {
            ctx.draw_image(ctx.bounds(), &self.from);
            Ok(())
        })?;
        let a = from.to_premul_rgba8();
        let b = self.to.to_premul_rgba8();
        let mut out = vec![0u8; b.len()];
        crossfade_in_place(&mut out, &a, &b, t)?;
        RasterBuffer::from_premul_rgba8(w, h, out).map(|img| img.with_scale(self.to.scale()))
    }
}

#[derive(Debug, Default)]
struct SlotState {
    image: Option<RasterBuffer>,
    transition: Option<Crossfade>,
    // Bumped by every load and every `set_image`; only the latest load may land.
    generation: u64,
    // Generation whose fetched image has been applied.
    landed: u64,
}

/// Shared holder for the image an on-screen element displays.
///
/// Clones refer to the same slot, so a completion running on the callback queue updates what
/// every holder sees.
#[derive(Clone, Debug, Default)]
pub struct ImageSlot {
    state: Arc<Mutex<SlotState>>,
}

impl ImageSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self) -> Option<RasterBuffer> {
        self.lock().image.clone()
    }

    /// Show `image` now; any load still in flight is abandoned.
    pub fn set_image(&self, image: Option<RasterBuffer>) {
        let mut state = self.lock();
        state.generation += 1;
        state.image = image;
        state.transition = None;
    }

    /// Fade recorded by the most recent load with `fade_in`, if any.
    pub fn transition(&self) -> Option<Crossfade> {
        self.lock().transition.clone()
    }

    /// Show `placeholder` (or the cached image) now and swap in the fetched image when it
    /// arrives.
    ///
    /// `on_loaded` runs on the cache's callback queue, only when a freshly fetched image was
    /// applied. Cache hits and failures leave the immediately shown image in place. A later
    /// load or [`set_image`](Self::set_image) supersedes this one, and its image is dropped.
    pub fn load_from_url<F>(
        &self,
        cache: &RemoteImageCache,
        url: &str,
        placeholder: RasterBuffer,
        fade_in: bool,
        on_loaded: F,
    ) where
        F: FnOnce(&RasterBuffer) + Send + 'static,
    {
        let ticket = self.begin_load();
        let slot = self.clone();
        let shown = cache.fetch(url, placeholder, true, move |image| {
            let Some(image) = image else {
                return;
            };
            if slot.land(ticket, image.clone(), fade_in) {
                on_loaded(&image);
            }
        });
        self.show_pending(ticket, shown);
    }

    fn begin_load(&self) -> u64 {
        let mut state = self.lock();
        state.generation += 1;
        state.generation
    }

    // Apply a fetched image if `ticket` is still the latest load.
    fn land(&self, ticket: u64, image: RasterBuffer, fade_in: bool) -> bool {
        let mut state = self.lock();
        if state.generation != ticket {
            tracing::debug!(ticket, current = state.generation, "superseded image load dropped");
            return false;
        }
        state.transition = match (fade_in, state.image.take()) {
            (true, Some(previous)) => Some(Crossfade::new(previous, image.clone())),
            _ => None,
        };
        state.image = Some(image);
        state.landed = ticket;
        true
    }

    // Show the immediate image unless the fetch already landed or a newer load took over.
    fn show_pending(&self, ticket: u64, shown: RasterBuffer) {
        let mut state = self.lock();
        if state.generation == ticket && state.landed != ticket {
            state.image = Some(shown);
            state.transition = None;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/remote/slot.rs"]
mod tests;
