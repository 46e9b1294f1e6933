use crate::{PixbufError, Result};

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub const fn with_alpha(self, a: u8) -> Rgba {
        Rgba::new(self.r, self.g, self.b, a)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

/// An RGB color with an alpha channel (0 = transparent, 255 = opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    #[inline]
    pub const fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

impl From<[u8; 4]> for Rgba {
    fn from(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<Rgba> for [u8; 4] {
    fn from(c: Rgba) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

/// A rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true if the rectangle lies entirely inside a `width` x `height` area.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        let right = u64::from(self.x) + u64::from(self.width);
        let bottom = u64::from(self.y) + u64::from(self.height);
        right <= u64::from(width) && bottom <= u64::from(height)
    }
}

/// A row-major RGB or RGBA image held in memory.
///
/// Channels are always stored as `R, G, B[, A]` regardless of what the
/// eventual display wants; conversion to native pixel codes is done by
/// [`crate::pack`]. Whether the buffer carries alpha is fixed when it is
/// created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    has_alpha: bool,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Creates a zero-filled buffer.
    ///
    /// With alpha the pixels are transparent black; without alpha they read
    /// back as opaque black.
    pub fn new(width: u32, height: u32, has_alpha: bool) -> Result<Self> {
        let len = byte_len(width, height, has_alpha)?;
        let mut data = alloc_bytes(len)?;
        data.resize(len, 0);
        Ok(Self {
            width,
            height,
            has_alpha,
            data,
        })
    }

    #[inline]
    pub fn new_rgb(width: u32, height: u32) -> Result<Self> {
        Self::new(width, height, false)
    }

    #[inline]
    pub fn new_rgba(width: u32, height: u32) -> Result<Self> {
        Self::new(width, height, true)
    }

    /// Copies `data` into a new buffer.
    ///
    /// # Errors
    ///
    /// Returns [`PixbufError::BufferSizeMismatch`] unless
    /// `data.len() == width * height * (3 or 4)`.
    pub fn from_bytes(data: &[u8], width: u32, height: u32, has_alpha: bool) -> Result<Self> {
        let expected = byte_len(width, height, has_alpha)?;
        if data.len() != expected {
            return Err(PixbufError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        let mut owned = alloc_bytes(expected)?;
        owned.extend_from_slice(data);
        Ok(Self {
            width,
            height,
            has_alpha,
            data: owned,
        })
    }

    /// Takes ownership of `data` without copying.
    pub fn from_vec(data: Vec<u8>, width: u32, height: u32, has_alpha: bool) -> Result<Self> {
        let expected = byte_len(width, height, has_alpha)?;
        if data.len() != expected {
            return Err(PixbufError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            has_alpha,
            data,
        })
    }

    /// Builds a buffer from decoded bitmap data described by a channel count,
    /// as handed over by an external image loader.
    pub fn from_raw_channels(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Result<Self> {
        match channels {
            3 => Self::from_vec(data, width, height, false),
            4 => Self::from_vec(data, width, height, true),
            other => Err(PixbufError::UnsupportedFormat(format!(
                "{other} channels per pixel"
            ))),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// 3 for RGB, 4 for RGBA.
    #[inline]
    pub fn channel_count(&self) -> usize {
        if self.has_alpha {
            4
        } else {
            3
        }
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * self.channel_count()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Byte slice of row `y`. Panics if `y >= height`.
    #[inline]
    pub(crate) fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    #[inline]
    pub(crate) fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// Byte offset of the first channel of pixel `(x, y)`; caller checks bounds.
    #[inline]
    pub(crate) fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride() + x as usize * self.channel_count()
    }

    fn check_bounds(&self, x: u32, y: u32, channel: usize) -> Result<()> {
        if x >= self.width || y >= self.height || channel >= self.channel_count() {
            return Err(PixbufError::OutOfRange {
                x,
                y,
                channel,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Reads one channel of one pixel.
    pub fn get(&self, x: u32, y: u32, channel: usize) -> Result<u8> {
        self.check_bounds(x, y, channel)?;
        Ok(self.data[self.offset(x, y) + channel])
    }

    /// Writes one channel of one pixel.
    pub fn set(&mut self, x: u32, y: u32, channel: usize, value: u8) -> Result<()> {
        self.check_bounds(x, y, channel)?;
        let idx = self.offset(x, y) + channel;
        self.data[idx] = value;
        Ok(())
    }

    /// Reads a pixel. Alpha is reported as 255 for buffers without alpha.
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<Rgba> {
        self.check_bounds(x, y, 0)?;
        let idx = self.offset(x, y);
        let px = &self.data[idx..idx + self.channel_count()];
        let a = if self.has_alpha { px[3] } else { 255 };
        Ok(Rgba::new(px[0], px[1], px[2], a))
    }

    /// Writes the RGB channels of a pixel; alpha is left untouched.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) -> Result<()> {
        self.check_bounds(x, y, 0)?;
        let idx = self.offset(x, y);
        self.data[idx..idx + 3].copy_from_slice(&[color.r, color.g, color.b]);
        Ok(())
    }

    /// Blends `color` over the existing pixel using `color.a` as weight.
    ///
    /// On a buffer without alpha this is [`set_pixel`](Self::set_pixel) and
    /// `color.a` is ignored. The stored alpha is never changed.
    pub fn set_pixel_blended(&mut self, x: u32, y: u32, color: Rgba) -> Result<()> {
        if !self.has_alpha {
            return self.set_pixel(x, y, color.rgb());
        }
        self.check_bounds(x, y, 0)?;
        let idx = self.offset(x, y);
        let px = &mut self.data[idx..idx + 3];
        px[0] = crate::composite::blend_channel(color.r, color.a, px[0]);
        px[1] = crate::composite::blend_channel(color.g, color.a, px[1]);
        px[2] = crate::composite::blend_channel(color.b, color.a, px[2]);
        Ok(())
    }

    /// Returns an RGBA copy; alpha is 255 everywhere if this buffer had none.
    pub fn to_rgba(&self) -> Result<Self> {
        if self.has_alpha {
            return Ok(self.clone());
        }
        let mut out = Self::new_rgba(self.width, self.height)?;
        for (dst, src) in out.data.chunks_exact_mut(4).zip(self.data.chunks_exact(3)) {
            dst[..3].copy_from_slice(src);
            dst[3] = 255;
        }
        Ok(out)
    }

    /// Returns an RGB copy with the alpha channel dropped.
    pub fn to_rgb(&self) -> Result<Self> {
        if !self.has_alpha {
            return Ok(self.clone());
        }
        let mut out = Self::new_rgb(self.width, self.height)?;
        for (dst, src) in out.data.chunks_exact_mut(3).zip(self.data.chunks_exact(4)) {
            dst.copy_from_slice(&src[..3]);
        }
        Ok(out)
    }
}

fn byte_len(width: u32, height: u32, has_alpha: bool) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(PixbufError::InvalidDimensions { width, height });
    }
    let channels = if has_alpha { 4 } else { 3 };
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(PixbufError::InvalidDimensions { width, height })
}

/// Reserves an empty vector with room for `len` bytes, reporting failure
/// instead of aborting.
pub(crate) fn alloc_bytes(len: usize) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| PixbufError::Allocation(len))?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_new_rgb_is_opaque_black() {
        let buf = PixelBuffer::new_rgb(4, 3).unwrap();
        assert_eq!(buf.as_bytes().len(), 4 * 3 * 3);
        assert_eq!(buf.channel_count(), 3);
        assert_eq!(buf.stride(), 12);
        assert_eq!(buf.get_pixel(3, 2).unwrap(), Rgba::new(0, 0, 0, 255));
    }

    #[test]
    fn test_new_rgba_is_transparent_black() {
        let buf = PixelBuffer::new_rgba(2, 2).unwrap();
        assert_eq!(buf.as_bytes().len(), 16);
        assert_eq!(buf.get_pixel(1, 1).unwrap(), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let err = PixelBuffer::new_rgb(0, 5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Dimension);
        assert!(PixelBuffer::new_rgba(5, 0).is_err());
    }

    #[test]
    fn test_from_bytes_size_mismatch() {
        let err = PixelBuffer::from_bytes(&[0u8; 11], 2, 2, false).unwrap_err();
        assert!(matches!(
            err,
            PixbufError::BufferSizeMismatch {
                expected: 12,
                actual: 11
            }
        ));
        assert!(PixelBuffer::from_bytes(&[0u8; 16], 2, 2, true).is_ok());
    }

    #[test]
    fn test_from_raw_channels() {
        assert!(PixelBuffer::from_raw_channels(vec![0; 6], 2, 1, 3).is_ok());
        let err = PixelBuffer::from_raw_channels(vec![0; 4], 2, 1, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_bounds_use_strict_comparison() {
        let mut buf = PixelBuffer::new_rgb(3, 2).unwrap();
        assert!(buf.get_pixel(2, 1).is_ok());
        assert!(buf.get_pixel(3, 1).is_err());
        assert!(buf.get_pixel(2, 2).is_err());
        assert!(buf.set_pixel(3, 0, Rgb::new(1, 2, 3)).is_err());
        assert!(buf.set_pixel(0, 2, Rgb::new(1, 2, 3)).is_err());
    }

    #[test]
    fn test_channel_accessors() {
        let mut buf = PixelBuffer::new_rgba(2, 2).unwrap();
        buf.set(1, 0, 3, 77).unwrap();
        assert_eq!(buf.get(1, 0, 3).unwrap(), 77);
        assert_eq!(buf.as_bytes()[7], 77);
        assert!(buf.get(0, 0, 4).is_err());

        let rgb = PixelBuffer::new_rgb(2, 2).unwrap();
        assert!(rgb.get(0, 0, 3).is_err());
    }

    #[test]
    fn test_set_pixel_keeps_alpha() {
        let mut buf = PixelBuffer::new_rgba(1, 1).unwrap();
        buf.set(0, 0, 3, 99).unwrap();
        buf.set_pixel(0, 0, Rgb::new(10, 20, 30)).unwrap();
        assert_eq!(buf.get_pixel(0, 0).unwrap(), Rgba::new(10, 20, 30, 99));
    }

    #[test]
    fn test_set_pixel_blended() {
        let mut buf = PixelBuffer::new_rgba(1, 1).unwrap();
        buf.set(0, 0, 3, 200).unwrap();
        buf.set_pixel(0, 0, Rgb::new(0, 0, 0)).unwrap();
        buf.set_pixel_blended(0, 0, Rgba::new(255, 255, 255, 128))
            .unwrap();
        // 255*128 + 0*127 + 128 = 32768; (32768 + 128) >> 8 = 128
        assert_eq!(buf.get_pixel(0, 0).unwrap(), Rgba::new(128, 128, 128, 200));
    }

    #[test]
    fn test_set_pixel_blended_without_alpha_overwrites() {
        let mut buf = PixelBuffer::new_rgb(1, 1).unwrap();
        buf.set_pixel_blended(0, 0, Rgba::new(9, 8, 7, 0)).unwrap();
        assert_eq!(buf.get_pixel(0, 0).unwrap(), Rgba::opaque(9, 8, 7));
    }

    #[test]
    fn test_clone_is_deep() {
        let mut a = PixelBuffer::new_rgb(1, 1).unwrap();
        let b = a.clone();
        a.set_pixel(0, 0, Rgb::new(1, 1, 1)).unwrap();
        assert_ne!(a, b);
        assert!(!b.has_alpha());
    }

    #[test]
    fn test_channel_conversion() {
        let rgb = PixelBuffer::from_bytes(&[1, 2, 3, 4, 5, 6], 2, 1, false).unwrap();
        let rgba = rgb.to_rgba().unwrap();
        assert_eq!(rgba.as_bytes(), &[1, 2, 3, 255, 4, 5, 6, 255]);
        assert_eq!(rgba.to_rgb().unwrap(), rgb);
    }

    #[test]
    fn test_rect_fits_within() {
        assert!(Rect::new(0, 0, 4, 4).fits_within(4, 4));
        assert!(!Rect::new(1, 0, 4, 4).fits_within(4, 4));
        assert!(!Rect::new(u32::MAX, 0, 2, 1).fits_within(4, 4));
    }
}
