//! Firmware images: loading user files and sharing built-in images.
//!
//! A hardware model asks for each ROM slot in two steps: the user-supplied
//! file (if configured) through a [`RomLoader`], then the built-in image of
//! the same slot from the [`RomCache`]. The cache is owned by the host and
//! shared by every machine instance, so a built-in image is decoded once per
//! session no matter how many machines are created or power-cycled.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};
use thiserror::Error;

/// Failure to obtain a ROM image.
#[derive(Debug, Error)]
pub enum RomError {
    #[error("ROM image `{name}` not found")]
    NotFound { name: String },
    #[error("ROM image `{name}` is empty")]
    Empty { name: String },
    #[error("failed to read ROM image `{name}`")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Source of user-supplied ROM images, addressed by name.
pub trait RomLoader: Send + Sync {
    fn load(&self, name: &str) -> Result<Vec<u8>, RomError>;
}

/// Loads `<root>/<name>` from the filesystem.
#[derive(Debug, Clone)]
pub struct DirRomLoader {
    root: PathBuf,
}

impl DirRomLoader {
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl RomLoader for DirRomLoader {
    fn load(&self, name: &str) -> Result<Vec<u8>, RomError> {
        let path = self.root.join(name);
        match std::fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => Err(RomError::Empty {
                name: name.to_string(),
            }),
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(RomError::NotFound {
                name: name.to_string(),
            }),
            Err(source) => Err(RomError::Io {
                name: name.to_string(),
                source,
            }),
        }
    }
}

/// In-memory image set.
#[derive(Debug, Clone, Default)]
pub struct MapRomLoader {
    images: HashMap<String, Vec<u8>>,
}

impl MapRomLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, image: Vec<u8>) {
        self.images.insert(name.into(), image);
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, image: Vec<u8>) -> Self {
        self.insert(name, image);
        self
    }
}

impl RomLoader for MapRomLoader {
    fn load(&self, name: &str) -> Result<Vec<u8>, RomError> {
        match self.images.get(name) {
            Some(image) if image.is_empty() => Err(RomError::Empty {
                name: name.to_string(),
            }),
            Some(image) => Ok(image.clone()),
            None => Err(RomError::NotFound {
                name: name.to_string(),
            }),
        }
    }
}

/// Built-in ROM images shared across machine instances.
#[derive(Debug, Default)]
pub struct RomCache {
    images: Mutex<HashMap<String, Arc<[u8]>>>,
}

impl RomCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the built-in image for a logical slot.
    pub fn insert_builtin(&self, name: impl Into<String>, image: impl Into<Arc<[u8]>>) {
        self.lock().insert(name.into(), image.into());
    }

    /// The built-in image for a slot, if one was registered.
    #[must_use]
    pub fn builtin(&self, name: &str) -> Option<Arc<[u8]>> {
        self.lock().get(name).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<[u8]>>> {
        self.images.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resolve one ROM slot: the user file if configured and loadable,
/// otherwise the built-in image. The result is truncated to `max_len`.
///
/// A failed user load is not fatal: it is logged and the built-in image is
/// used instead. `None` means the slot stays unmapped (open bus).
#[must_use]
pub fn load_slot(
    loader: &dyn RomLoader,
    cache: &RomCache,
    file: Option<&str>,
    builtin: &str,
    max_len: usize,
) -> Option<Arc<[u8]>> {
    if let Some(file) = file {
        match loader.load(file) {
            Ok(mut image) => {
                image.truncate(max_len);
                debug!("loaded ROM `{file}` ({} bytes)", image.len());
                return Some(image.into());
            }
            Err(err) => warn!("{err}; falling back to built-in `{builtin}`"),
        }
    }
    let image = cache.builtin(builtin);
    match &image {
        Some(image) if image.len() > max_len => Some(Arc::from(&image[..max_len])),
        Some(_) => image,
        None => {
            debug!("no built-in image `{builtin}`, range left unmapped");
            None
        }
    }
}

/// Load an optional user image with no built-in fallback.
#[must_use]
pub fn load_optional(loader: &dyn RomLoader, file: Option<&str>, max_len: usize) -> Option<Arc<[u8]>> {
    let file = file?;
    match loader.load(file) {
        Ok(mut image) => {
            image.truncate(max_len);
            Some(image.into())
        }
        Err(err) => {
            warn!("{err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_file_wins_over_builtin() {
        let loader = MapRomLoader::new().with("user.rom", vec![1, 2, 3]);
        let cache = RomCache::new();
        cache.insert_builtin("os", vec![9u8; 4]);

        let image = load_slot(&loader, &cache, Some("user.rom"), "os", 0x4000);
        assert_eq!(image.as_deref(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn missing_user_file_falls_back_to_builtin() {
        let loader = MapRomLoader::new();
        let cache = RomCache::new();
        cache.insert_builtin("os", vec![9u8; 4]);

        let image = load_slot(&loader, &cache, Some("missing.rom"), "os", 0x4000);
        assert_eq!(image.as_deref(), Some(&[9u8; 4][..]));
    }

    #[test]
    fn no_image_at_all_leaves_slot_unmapped() {
        let loader = MapRomLoader::new();
        let cache = RomCache::new();
        assert!(load_slot(&loader, &cache, None, "os", 0x4000).is_none());
        assert!(load_optional(&loader, Some("x.rom"), 0x100).is_none());
    }

    #[test]
    fn images_are_truncated() {
        let loader = MapRomLoader::new().with("big.rom", vec![0xAA; 0x5000]);
        let cache = RomCache::new();
        cache.insert_builtin("os", vec![0x55; 0x5000]);

        let user = load_slot(&loader, &cache, Some("big.rom"), "os", 0x4000);
        assert_eq!(user.map(|i| i.len()), Some(0x4000));
        let builtin = load_slot(&loader, &cache, None, "os", 0x4000);
        assert_eq!(builtin.map(|i| i.len()), Some(0x4000));
    }

    #[test]
    fn empty_image_is_an_error() {
        let loader = MapRomLoader::new().with("empty.rom", Vec::new());
        assert!(matches!(loader.load("empty.rom"), Err(RomError::Empty { .. })));
    }

    #[test]
    fn dir_loader_reports_missing_file() {
        let loader = DirRomLoader::new(std::env::temp_dir().join("kc-core-no-such-dir"));
        assert!(matches!(loader.load("os.rom"), Err(RomError::NotFound { .. })));
    }
}
