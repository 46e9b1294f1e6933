//! Translation from RGB to the integer pixel codes a display expects.
//!
//! Nothing here talks to a display. The caller describes the target with a
//! [`DisplayFormat`] (bit depth, channel order or palette) and receives
//! packed codes ready to be written into a native image.

use crate::buffer::{PixelBuffer, Rgb};
use crate::quantize::{nearest_palette_index, PaletteEntry};
use crate::{PixbufError, Result};

/// Arrangement of R, G and B within a packed 24/32-bit pixel, most
/// significant channel first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Rbg,
    Brg,
    Bgr,
    Grb,
    Gbr,
}

impl ChannelOrder {
    /// Derives the order from a visual's channel masks: the channel with the
    /// largest mask is packed highest.
    ///
    /// Masks that are not strictly ordered fall back to [`ChannelOrder::Rgb`].
    ///
    /// ```rust
    /// use pixbuf::ChannelOrder;
    /// assert_eq!(ChannelOrder::from_masks(0xff0000, 0x00ff00, 0x0000ff), ChannelOrder::Rgb);
    /// assert_eq!(ChannelOrder::from_masks(0x0000ff, 0x00ff00, 0xff0000), ChannelOrder::Bgr);
    /// ```
    pub fn from_masks(red_mask: u32, green_mask: u32, blue_mask: u32) -> Self {
        let (r, g, b) = (red_mask, green_mask, blue_mask);
        if r > g && g > b {
            Self::Rgb
        } else if r > b && b > g {
            Self::Rbg
        } else if b > r && r > g {
            Self::Brg
        } else if b > g && g > r {
            Self::Bgr
        } else if g > r && r > b {
            Self::Grb
        } else if g > b && b > r {
            Self::Gbr
        } else {
            Self::Rgb
        }
    }

    /// Bit shifts for (r, g, b) in a 24-bit word.
    fn shifts(self) -> (u32, u32, u32) {
        match self {
            Self::Rgb => (16, 8, 0),
            Self::Rbg => (16, 0, 8),
            Self::Brg => (8, 0, 16),
            Self::Bgr => (0, 8, 16),
            Self::Grb => (8, 16, 0),
            Self::Gbr => (0, 16, 8),
        }
    }
}

/// Bit depths a true-color display can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrueColorDepth {
    /// 5 bits per channel
    Depth15,
    /// 5/6/5 bits
    Depth16,
    /// 8 bits per channel
    Depth24,
    /// 8 bits per channel, top byte unused
    Depth32,
}

impl TryFrom<u8> for TrueColorDepth {
    type Error = PixbufError;

    fn try_from(depth: u8) -> Result<Self> {
        match depth {
            15 => Ok(Self::Depth15),
            16 => Ok(Self::Depth16),
            24 => Ok(Self::Depth24),
            32 => Ok(Self::Depth32),
            other => Err(PixbufError::UnsupportedFormat(format!(
                "true color depth {other}"
            ))),
        }
    }
}

/// Packs an RGB value into a true-color pixel code.
///
/// 15 and 16-bit layouts are always R-G-B from the top; `order` only
/// affects 24 and 32-bit packing.
#[inline]
pub fn pack_truecolor(color: Rgb, depth: TrueColorDepth, order: ChannelOrder) -> u32 {
    let (r, g, b) = (u32::from(color.r), u32::from(color.g), u32::from(color.b));
    match depth {
        TrueColorDepth::Depth15 => ((r & 0xf8) << 7) | ((g & 0xf8) << 2) | ((b & 0xf8) >> 3),
        TrueColorDepth::Depth16 => ((r & 0xf8) << 8) | ((g & 0xfc) << 3) | ((b & 0xf8) >> 3),
        TrueColorDepth::Depth24 | TrueColorDepth::Depth32 => {
            let (rs, gs, bs) = order.shifts();
            (r << rs) | (g << gs) | (b << bs)
        }
    }
}

/// Recovers RGB from a true-color pixel code. Bits dropped by 15/16-bit
/// packing come back as zero.
#[inline]
pub fn unpack_truecolor(code: u32, depth: TrueColorDepth, order: ChannelOrder) -> Rgb {
    match depth {
        TrueColorDepth::Depth15 => Rgb::new(
            ((code >> 7) & 0xf8) as u8,
            ((code >> 2) & 0xf8) as u8,
            ((code << 3) & 0xf8) as u8,
        ),
        TrueColorDepth::Depth16 => Rgb::new(
            ((code >> 8) & 0xf8) as u8,
            ((code >> 3) & 0xfc) as u8,
            ((code << 3) & 0xf8) as u8,
        ),
        TrueColorDepth::Depth24 | TrueColorDepth::Depth32 => {
            let (rs, gs, bs) = order.shifts();
            Rgb::new((code >> rs) as u8, (code >> gs) as u8, (code >> bs) as u8)
        }
    }
}

/// Packs RGB into a gray level for a `depth`-bit grayscale display using
/// integer luma weights 77/151/28.
///
/// # Errors
///
/// [`PixbufError::UnsupportedFormat`] unless `1 <= depth <= 16`.
#[inline]
pub fn grayscale_pack(color: Rgb, depth: u8) -> Result<u32> {
    if depth == 0 || depth > 16 {
        return Err(PixbufError::UnsupportedFormat(format!(
            "grayscale depth {depth}"
        )));
    }
    Ok(luma(color) >> (16 - u32::from(depth)))
}

#[inline]
fn luma(color: Rgb) -> u32 {
    u32::from(color.r) * 77 + u32::from(color.g) * 151 + u32::from(color.b) * 28
}

/// Native pixel format of a display surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayFormat {
    TrueColor {
        depth: TrueColorDepth,
        order: ChannelOrder,
    },
    /// Gray levels with `depth` bits, validated when the format is built
    /// through [`DisplayFormat::grayscale`].
    Grayscale { depth: u8 },
    /// Palette-based display; pixels map to the nearest entry's native code.
    Indexed(Vec<PaletteEntry>),
}

impl DisplayFormat {
    /// Builds a grayscale format, rejecting depths outside `1..=16`.
    pub fn grayscale(depth: u8) -> Result<Self> {
        grayscale_pack(Rgb::BLACK, depth)?;
        Ok(Self::Grayscale { depth })
    }

    /// Builds a palette format. An empty palette can't represent any color.
    pub fn indexed(palette: Vec<PaletteEntry>) -> Result<Self> {
        if palette.is_empty() {
            return Err(PixbufError::UnsupportedFormat("empty palette".to_string()));
        }
        Ok(Self::Indexed(palette))
    }

    /// Native code for one color.
    pub fn pack(&self, color: Rgb) -> u32 {
        match self {
            DisplayFormat::TrueColor { depth, order } => pack_truecolor(color, *depth, *order),
            DisplayFormat::Grayscale { depth } => {
                luma(color) >> 16u32.saturating_sub(u32::from(*depth))
            }
            DisplayFormat::Indexed(palette) => nearest_palette_index(palette, color)
                .map(|idx| palette[idx].native_code)
                .unwrap_or(0),
        }
    }
}

/// Packs every pixel of `img` in row-major order. Alpha is ignored.
pub fn pack_buffer(img: &PixelBuffer, format: &DisplayFormat) -> Vec<u32> {
    img.as_bytes()
        .chunks_exact(img.channel_count())
        .map(|px| format.pack(Rgb::new(px[0], px[1], px[2])))
        .collect()
}

/// Shape mask for `img`: `true` where alpha is at least 127.
///
/// Returns `None` for buffers without alpha, which are fully opaque.
pub fn alpha_mask(img: &PixelBuffer) -> Option<Vec<bool>> {
    if !img.has_alpha() {
        return None;
    }
    Some(img.as_bytes().chunks_exact(4).map(|px| px[3] >= 127).collect())
}
