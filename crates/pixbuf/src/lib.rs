//! # pixbuf
//!
//! In-memory RGB/RGBA pixel buffers and the byte-exact operations around them.
//!
//! ## Features
//!
//! - **Buffers**: row-major `R,G,B[,A]` storage with bounds-checked accessors
//! - **Compositing**: fill, copy and alpha blending with bit-exact rounding
//! - **Scaling**: box-filter downscale, nearest-neighbour upscale and mixed resizes
//! - **Transforms**: 90/180/270 degree rotation and horizontal/vertical flips
//! - **XPM**: a decoder for the XPM text image format
//! - **Packing**: RGB to native display pixel codes (true color, grayscale, palette)
//!
//! ## Quick Start
//!
//! ### Decoding an XPM and scaling it
//!
//! ```rust
//! use pixbuf::{decode_xpm, scale};
//!
//! let xpm = br#"/* XPM */
//! static char *dot[] = {
//! "2 2 2 1",
//! "r c #ff0000",
//! "b c #0000ff",
//! "rb",
//! "br"
//! };"#;
//! let image = decode_xpm(xpm)?;
//! let big = scale(&image, 4, 4)?;
//! assert_eq!((big.width(), big.height()), (4, 4));
//! # Ok::<(), pixbuf::PixbufError>(())
//! ```
//!
//! ### Packing pixels for a 16-bit display
//!
//! ```rust
//! use pixbuf::{pack_buffer, ChannelOrder, DisplayFormat, PixelBuffer, Rgba, TrueColorDepth};
//!
//! let mut image = PixelBuffer::new_rgb(2, 1)?;
//! pixbuf::fill(&mut image, Rgba::new(255, 255, 255, 255));
//! let format = DisplayFormat::TrueColor {
//!     depth: TrueColorDepth::Depth16,
//!     order: ChannelOrder::Rgb,
//! };
//! assert_eq!(pack_buffer(&image, &format), vec![0xffff, 0xffff]);
//! # Ok::<(), pixbuf::PixbufError>(())
//! ```

use thiserror::Error;

pub mod buffer;
pub mod composite;
pub mod format;
pub mod pack;
pub mod quantize;
pub mod scale;
pub mod transform;
pub mod xpm;

pub use buffer::{PixelBuffer, Rect, Rgb, Rgba};
pub use composite::{blend_channel, composite, composite_region, copy, copy_composite, fill};
pub use format::{ImageFormat, ImageLoader, LoaderRegistry, XpmLoader};
pub use pack::{
    alpha_mask, grayscale_pack, pack_buffer, pack_truecolor, unpack_truecolor, ChannelOrder,
    DisplayFormat, TrueColorDepth,
};
pub use quantize::{
    adaptive_palette, color_cube, nearest_palette_index, quantize_indexed, IndexedImage,
    PaletteEntry,
};
pub use scale::{scale, scale_down, scale_up};
pub use transform::{
    flip_horizontal, flip_vertical, rotate180, rotate270, rotate90, transform, Transform,
};
pub use xpm::{
    decode_xpm, decode_xpm_file, decode_xpm_reader, decode_xpm_with, ColorResolver,
    X11ColorResolver, XpmOptions,
};

/// Errors produced by buffer operations, decoding and packing.
#[derive(Debug, Error)]
pub enum PixbufError {
    /// Malformed, truncated or oversized XPM input
    #[error("invalid XPM data: {0}")]
    Parse(String),

    /// Width or height is zero, or the byte size does not fit in memory arithmetic
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Buffer size doesn't match expected size for dimensions
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Pixel or channel access outside the buffer
    #[error("pixel ({x}, {y}) channel {channel} out of range for {width}x{height} buffer")]
    OutOfRange {
        x: u32,
        y: u32,
        channel: usize,
        width: u32,
        height: u32,
    },

    /// A rectangle does not fit inside the buffer it refers to
    #[error("region {rect:?} does not fit in {width}x{height} buffer")]
    RegionOutOfBounds { rect: Rect, width: u32, height: u32 },

    /// Scaling was requested in the wrong direction for the chosen routine
    #[error("cannot scale {from_width}x{from_height} to {to_width}x{to_height} with {routine}")]
    InvalidScale {
        routine: &'static str,
        from_width: u32,
        from_height: u32,
        to_width: u32,
        to_height: u32,
    },

    /// Backing storage could not be obtained
    #[error("failed to allocate {0} bytes of pixel storage")]
    Allocation(usize),

    /// Palette generation failed
    #[error("quantization error: {0}")]
    Quantization(String),

    /// Unknown file extension, missing loader, bad channel count or bit depth
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The input stream could not be read
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`PixbufError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Dimension,
    Allocation,
    UnsupportedFormat,
    Quantization,
    Io,
}

impl PixbufError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PixbufError::Parse(_) => ErrorKind::Parse,
            PixbufError::InvalidDimensions { .. }
            | PixbufError::BufferSizeMismatch { .. }
            | PixbufError::OutOfRange { .. }
            | PixbufError::RegionOutOfBounds { .. }
            | PixbufError::InvalidScale { .. } => ErrorKind::Dimension,
            PixbufError::Allocation(_) => ErrorKind::Allocation,
            PixbufError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            PixbufError::Quantization(_) => ErrorKind::Quantization,
            PixbufError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type for pixbuf operations.
pub type Result<T> = core::result::Result<T, PixbufError>;
