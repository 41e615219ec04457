use std::sync::OnceLock;

use crate::foundation::error::{ImageError, ImageResult};

/// Image resampling quality used by `draw_image`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Nearest neighbour.
    None,
    Low,
    #[default]
    Medium,
    /// Bicubic.
    High,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderSettings {
    /// Analytic anti-aliasing; when off, pixels are painted if coverage exceeds one half.
    pub antialias: bool,
    pub interpolation: Interpolation,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            antialias: true,
            interpolation: Interpolation::default(),
        }
    }
}

impl RenderSettings {
    /// Defaults, with `IMAGEHELPER_ANTIALIAS` (`0`/`false` or `1`/`true`) and
    /// `IMAGEHELPER_INTERPOLATION` (`none`, `low`, `medium`, `high`) applied when they parse.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let antialias = std::env::var("IMAGEHELPER_ANTIALIAS")
            .ok()
            .and_then(|v| parse_switch(&v))
            .unwrap_or(defaults.antialias);
        let interpolation = std::env::var("IMAGEHELPER_INTERPOLATION")
            .ok()
            .and_then(|v| {
                let name = serde_json::Value::String(v.trim().to_ascii_lowercase());
                serde_json::from_value(name).ok()
            })
            .unwrap_or(defaults.interpolation);
        Self {
            antialias,
            interpolation,
        }
    }

    /// Process-wide settings, read from the environment on first use.
    ///
    /// Every [`DrawingContext`](crate::DrawingContext) starts from these; use
    /// `with_settings` to override one context.
    pub fn shared() -> &'static RenderSettings {
        static SHARED: OnceLock<RenderSettings> = OnceLock::new();
        SHARED.get_or_init(Self::from_env)
    }
}

fn parse_switch(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" => Some(true),
        "0" | "false" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchSettings {
    /// Background fetch threads; `None` lets rayon choose.
    pub worker_threads: Option<usize>,
}

impl FetchSettings {
    /// Defaults, with `IMAGEHELPER_FETCH_THREADS` applied when it parses to a value > 0.
    pub fn from_env() -> Self {
        let worker_threads = std::env::var("IMAGEHELPER_FETCH_THREADS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0);
        Self { worker_threads }
    }

    pub(crate) fn build_pool(&self) -> ImageResult<rayon::ThreadPool> {
        if self.worker_threads == Some(0) {
            return Err(ImageError::invalid_image(
                "fetch 'worker_threads' must be >= 1 when set",
            ));
        }
        let mut builder = rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("imagehelper-fetch-{i}"));
        if let Some(n) = self.worker_threads {
            builder = builder.num_threads(n);
        }
        builder.build().map_err(|e| {
            ImageError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}"))
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/settings.rs"]
mod tests;
