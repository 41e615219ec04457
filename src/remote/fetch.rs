use std::path::PathBuf;

use crate::assets::decode::decode_image;
use crate::foundation::error::{ImageError, ImageResult};
use crate::raster::buffer::RasterBuffer;

/// Transport that turns a URL into raw bytes. Called on fetch worker threads.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> ImageResult<Vec<u8>>;
}

/// Turns fetched bytes into a buffer. Called on fetch worker threads.
pub trait ImageCodec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> ImageResult<RasterBuffer>;
}

/// Reads local files, addressed either as plain paths or `file://` URLs.
///
/// Any other scheme is a [`ImageError::FetchFailure`]; there is no network stack here.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileFetcher;

impl FileFetcher {
    fn resolve(url: &str) -> ImageResult<PathBuf> {
        if let Some(rest) = url.strip_prefix("file://") {
            // `file://localhost/x` and `file:///x` both name `/x`.
            let path = rest.strip_prefix("localhost").unwrap_or(rest);
            return Ok(PathBuf::from(path));
        }
        match url.split_once("://") {
            Some((scheme, _)) => Err(ImageError::fetch(format!(
                "unsupported URL scheme '{scheme}' in '{url}'"
            ))),
            None => Ok(PathBuf::from(url)),
        }
    }
}

impl Fetcher for FileFetcher {
    fn fetch(&self, url: &str) -> ImageResult<Vec<u8>> {
        let path = Self::resolve(url)?;
        std::fs::read(&path)
            .map_err(|e| ImageError::fetch(format!("read '{}': {e}", path.display())))
    }
}

/// [`ImageCodec`] backed by the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCodec;

impl ImageCodec for DefaultCodec {
    fn decode(&self, bytes: &[u8]) -> ImageResult<RasterBuffer> {
        decode_image(bytes)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/remote/fetch.rs"]
mod tests;
