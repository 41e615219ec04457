use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::foundation::error::ImageResult;
use crate::raster::buffer::RasterBuffer;
use crate::remote::fetch::{DefaultCodec, FileFetcher, Fetcher, ImageCodec};
use crate::remote::queue::CallbackSender;
use crate::settings::FetchSettings;

/// Lifecycle of one URL key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryState {
    Absent,
    /// At least one fetch for the key is running and nothing is cached yet.
    Fetching,
    Cached,
}

/// Process-scoped, URL-keyed cache of decoded images.
///
/// Construct one at startup and hand clones of the handle to consumers. Fetch and decode run
/// on a dedicated rayon pool; completions are posted to the [`CallbackSender`] given at
/// construction so they always run on the queue owner's thread. Entries are never evicted.
#[derive(Clone)]
pub struct RemoteImageCache {
    inner: Arc<Inner>,
}

struct Inner {
    fetcher: Arc<dyn Fetcher>,
    codec: Arc<dyn ImageCodec>,
    callbacks: CallbackSender,
    pool: rayon::ThreadPool,
    entries: RwLock<HashMap<String, RasterBuffer>>,
    in_flight: Mutex<HashMap<String, usize>>,
}

impl std::fmt::Debug for RemoteImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteImageCache")
            .field("entries", &self.len())
            .field("threads", &self.inner.pool.current_num_threads())
            .finish_non_exhaustive()
    }
}

impl RemoteImageCache {
    pub fn new(
        fetcher: impl Fetcher + 'static,
        codec: impl ImageCodec + 'static,
        callbacks: CallbackSender,
        settings: &FetchSettings,
    ) -> ImageResult<Self> {
        let pool = settings.build_pool()?;
        Ok(Self {
            inner: Arc::new(Inner {
                fetcher: Arc::new(fetcher),
                codec: Arc::new(codec),
                callbacks,
                pool,
                entries: RwLock::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Local-file fetcher, `image` codec and env-derived settings.
    pub fn with_defaults(callbacks: CallbackSender) -> ImageResult<Self> {
        Self::new(FileFetcher, DefaultCodec, callbacks, &FetchSettings::from_env())
    }

    /// Start loading `url` and return what to show meanwhile.
    ///
    /// With `should_cache` and a cached entry, the cached image is returned and
    /// `on_complete` receives `None`. Otherwise `placeholder` is returned and a background
    /// fetch begins; `on_complete` later receives the decoded image, or `None` on any
    /// failure. `on_complete` runs exactly once, on the callback queue. Concurrent requests
    /// for one key each fetch independently.
    #[tracing::instrument(level = "debug", skip(self, placeholder, on_complete))]
    pub fn fetch<F>(
        &self,
        url: &str,
        placeholder: RasterBuffer,
        should_cache: bool,
        on_complete: F,
    ) -> RasterBuffer
    where
        F: FnOnce(Option<RasterBuffer>) + Send + 'static,
    {
        let url = url.trim();
        if url.is_empty() {
            tracing::warn!("empty image url; nothing to fetch");
            self.inner.callbacks.dispatch(move || on_complete(None));
            return placeholder;
        }
        if should_cache && let Some(hit) = self.get(url) {
            tracing::debug!(url, "image cache hit");
            self.inner.callbacks.dispatch(move || on_complete(None));
            return hit;
        }

        tracing::debug!(url, should_cache, "image cache miss; fetching");
        self.inner.begin(url);
        let inner = Arc::clone(&self.inner);
        let url = url.to_owned();
        self.inner.pool.spawn(move || {
            let result = inner
                .fetcher
                .fetch(&url)
                .and_then(|bytes| inner.codec.decode(&bytes));
            let image = match result {
                Ok(image) => {
                    if should_cache {
                        inner.insert(&url, image.clone());
                    }
                    Some(image)
                }
                Err(err) => {
                    tracing::warn!(url = %url, error = %err, "image fetch failed");
                    None
                }
            };
            inner.finish(&url);
            inner.callbacks.dispatch(move || on_complete(image));
        });
        placeholder
    }

    pub fn get(&self, url: &str) -> Option<RasterBuffer> {
        self.inner
            .entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(url)
            .cloned()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.get(url).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner
            .entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn state(&self, url: &str) -> EntryState {
        if self.contains(url) {
            return EntryState::Cached;
        }
        let fetching = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(url)
            .is_some_and(|&n| n > 0);
        if fetching {
            EntryState::Fetching
        } else {
            EntryState::Absent
        }
    }
}

impl Inner {
    fn begin(&self, url: &str) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        *in_flight.entry(url.to_owned()).or_insert(0) += 1;
    }

    fn finish(&self, url: &str) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(n) = in_flight.get_mut(url) {
            *n = n.saturating_sub(1);
            if *n == 0 {
                in_flight.remove(url);
            }
        }
    }

    // Racing fetches for one key overwrite each other; the last one wins.
    fn insert(&self, url: &str, image: RasterBuffer) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.to_owned(), image);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/remote/cache.rs"]
mod tests;
