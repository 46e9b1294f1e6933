//! Lossless geometric transforms: quarter-turn rotations and mirror flips.
//!
//! Rotations are clockwise. Every transform moves whole pixels (alpha
//! included) and allocates a new buffer with the same channel layout.

use crate::buffer::PixelBuffer;
use crate::Result;

/// A lossless geometric transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    /// Quarter turn clockwise.
    Rotate90,
    /// Half turn.
    Rotate180,
    /// Quarter turn counter-clockwise.
    Rotate270,
    /// Mirror left-right.
    FlipHorizontal,
    /// Mirror top-bottom.
    FlipVertical,
}

impl Transform {
    /// Whether the output has width and height exchanged.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Rotate90 | Self::Rotate270)
    }

    /// The transform that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Self::Rotate90 => Self::Rotate270,
            Self::Rotate270 => Self::Rotate90,
            other => other,
        }
    }

    /// Output dimensions for a `width` x `height` input.
    pub fn output_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }

    // Destination coordinate of source pixel (x, y) in a w x h image
    #[inline]
    fn map(self, x: u32, y: u32, w: u32, h: u32) -> (u32, u32) {
        match self {
            Self::Rotate90 => (h - 1 - y, x),
            Self::Rotate180 => (w - 1 - x, h - 1 - y),
            Self::Rotate270 => (y, w - 1 - x),
            Self::FlipHorizontal => (w - 1 - x, y),
            Self::FlipVertical => (x, h - 1 - y),
        }
    }
}

/// Applies `t` to `img`, returning a new buffer.
pub fn transform(img: &PixelBuffer, t: Transform) -> Result<PixelBuffer> {
    let (w, h) = (img.width(), img.height());
    let (new_w, new_h) = t.output_dimensions(w, h);
    let mut out = PixelBuffer::new(new_w, new_h, img.has_alpha())?;
    let channels = img.channel_count();

    for y in 0..h {
        let src_row = img.row(y);
        for (x, px) in (0..w).zip(src_row.chunks_exact(channels)) {
            let (nx, ny) = t.map(x, y, w, h);
            let dst = out.offset(nx, ny);
            out.as_bytes_mut()[dst..dst + channels].copy_from_slice(px);
        }
    }

    Ok(out)
}

#[inline]
pub fn rotate90(img: &PixelBuffer) -> Result<PixelBuffer> {
    transform(img, Transform::Rotate90)
}

#[inline]
pub fn rotate180(img: &PixelBuffer) -> Result<PixelBuffer> {
    transform(img, Transform::Rotate180)
}

#[inline]
pub fn rotate270(img: &PixelBuffer) -> Result<PixelBuffer> {
    transform(img, Transform::Rotate270)
}

#[inline]
pub fn flip_horizontal(img: &PixelBuffer) -> Result<PixelBuffer> {
    transform(img, Transform::FlipHorizontal)
}

#[inline]
pub fn flip_vertical(img: &PixelBuffer) -> Result<PixelBuffer> {
    transform(img, Transform::FlipVertical)
}
