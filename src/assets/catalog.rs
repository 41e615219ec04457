use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use anyhow::Context;

use crate::assets::decode::decode_image;
use crate::foundation::error::{ImageError, ImageResult};
use crate::raster::buffer::RasterBuffer;

/// Extensions tried, in order, when a name has none.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "webp", "gif", "bmp"];

/// Named images bundled under a root directory, decoded once and then shared.
#[derive(Clone, Debug)]
pub struct AssetCatalog {
    root: PathBuf,
    loaded: Arc<RwLock<HashMap<String, RasterBuffer>>>,
}

impl AssetCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            loaded: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load `name` (e.g. `"beach"` or `"photos/beach.jpg"`) relative to the root.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn image_named(&self, name: &str) -> ImageResult<RasterBuffer> {
        let key = normalize_rel_path(name)?;
        if let Some(img) = self.read_map()?.get(&key) {
            return Ok(img.clone());
        }

        let path = self.resolve(&key)?;
        let bytes =
            std::fs::read(&path).with_context(|| format!("read asset '{}'", path.display()))?;
        let img = decode_image(&bytes)?;
        tracing::debug!(asset = %key, w = img.width(), h = img.height(), "asset decoded");

        self.loaded
            .write()
            .map_err(|_| ImageError::Other(anyhow::anyhow!("asset catalog lock poisoned")))?
            .insert(key, img.clone());
        Ok(img)
    }

    fn read_map(
        &self,
    ) -> ImageResult<std::sync::RwLockReadGuard<'_, HashMap<String, RasterBuffer>>> {
        self.loaded
            .read()
            .map_err(|_| ImageError::Other(anyhow::anyhow!("asset catalog lock poisoned")))
    }

    fn resolve(&self, key: &str) -> ImageResult<PathBuf> {
        let direct = self.root.join(key);
        if Path::new(key).extension().is_some() {
            return Ok(direct);
        }
        IMAGE_EXTENSIONS
            .iter()
            .map(|ext| direct.with_extension(ext))
            .find(|p| p.is_file())
            .ok_or_else(|| {
                ImageError::Other(anyhow::anyhow!(
                    "no image named '{key}' under '{}'",
                    self.root.display()
                ))
            })
    }
}

/// Normalize and validate catalog-relative names.
///
/// Uses `/` separators, drops `.` segments, and rejects absolute paths or `..` traversal.
pub(crate) fn normalize_rel_path(source: &str) -> ImageResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(ImageError::invalid_image("asset names must be relative"));
    }
    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ImageError::invalid_image("asset names must not contain '..'"));
        }
        out.push(part);
    }
    if out.is_empty() {
        return Err(ImageError::invalid_image("asset name must contain a file name"));
    }
    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/catalog.rs"]
mod tests;
