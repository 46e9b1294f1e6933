//! File format dispatch.
//!
//! Loading a file goes through a [`LoaderRegistry`]: the file's extension
//! picks an [`ImageFormat`], and the registry hands the path to whichever
//! [`ImageLoader`] is registered for it. Only XPM ships with the crate.
//! Applications register PNG or JPEG loaders backed by their own codecs.

use std::collections::HashMap;
use std::path::Path;

use crate::buffer::PixelBuffer;
use crate::{PixbufError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Xpm,
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Identifies the format from the file extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// [`PixbufError::UnsupportedFormat`] for a missing or unknown extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| PixbufError::UnsupportedFormat(path.display().to_string()))?;
        match ext.as_str() {
            "xpm" => Ok(Self::Xpm),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            _ => Err(PixbufError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Xpm => "XPM",
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that can turn a file into a [`PixelBuffer`].
///
/// Loaders for external codecs typically decode to raw RGB or RGBA bytes and
/// finish with [`PixelBuffer::from_raw_channels`].
pub trait ImageLoader {
    fn load(&self, path: &Path) -> Result<PixelBuffer>;
}

/// The built-in XPM loader.
#[derive(Debug, Clone, Copy, Default)]
pub struct XpmLoader;

impl ImageLoader for XpmLoader {
    fn load(&self, path: &Path) -> Result<PixelBuffer> {
        crate::xpm::decode_xpm_file(path)
    }
}

/// Loaders keyed by [`ImageFormat`].
#[derive(Default)]
pub struct LoaderRegistry {
    loaders: HashMap<ImageFormat, Box<dyn ImageLoader>>,
}

impl LoaderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in XPM loader.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ImageFormat::Xpm, XpmLoader);
        registry
    }

    /// Registers `loader` for `format`, replacing any previous one.
    pub fn register<L: ImageLoader + 'static>(&mut self, format: ImageFormat, loader: L) {
        self.loaders.insert(format, Box::new(loader));
    }

    pub fn supports(&self, format: ImageFormat) -> bool {
        self.loaders.contains_key(&format)
    }

    /// Loads `path` with the loader registered for its format.
    ///
    /// # Errors
    ///
    /// [`PixbufError::UnsupportedFormat`] if the extension is unknown or no
    /// loader is registered for it, otherwise whatever the loader returns.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<PixelBuffer> {
        let path = path.as_ref();
        let format = ImageFormat::from_path(path)?;
        let loader = self.loaders.get(&format).ok_or_else(|| {
            log::debug!("no loader registered for {format}");
            PixbufError::UnsupportedFormat(format!("no loader for {format}"))
        })?;
        log::debug!("loading {} as {format}", path.display());
        loader.load(path)
    }
}

impl std::fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("formats", &self.loaders.keys().collect::<Vec<_>>())
            .finish()
    }
}
