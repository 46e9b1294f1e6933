//! Palette handling for indexed displays.
//!
//! [`nearest_palette_index`] is the mapping used when packing for a
//! palette display. [`color_cube`] lists the colors such a display is
//! usually asked to allocate, and [`adaptive_palette`] builds an
//! image-specific palette with quantette.

use crate::buffer::{PixelBuffer, Rgb};
use crate::{PixbufError, Result};
use quantette::{
    deps::palette::Srgb, dither::FloydSteinberg, ImageRef, PaletteSize, Pipeline, QuantizeMethod,
};

/// One color a palette display can show, with the native code that selects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaletteEntry {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub native_code: u32,
}

impl PaletteEntry {
    #[inline]
    pub const fn new(color: Rgb, native_code: u32) -> Self {
        Self {
            r: color.r,
            g: color.g,
            b: color.b,
            native_code,
        }
    }

    #[inline]
    pub const fn rgb(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

/// Index of the palette entry closest to `color` by L1 distance
/// (sum of absolute channel differences).
///
/// Ties go to the earliest entry. Returns `None` for an empty palette.
///
/// ```rust
/// use pixbuf::{nearest_palette_index, PaletteEntry, Rgb};
/// let palette = [
///     PaletteEntry::new(Rgb::new(0, 0, 0), 0),
///     PaletteEntry::new(Rgb::new(255, 255, 255), 1),
/// ];
/// assert_eq!(nearest_palette_index(&palette, Rgb::new(10, 10, 10)), Some(0));
/// assert_eq!(nearest_palette_index(&palette, Rgb::new(250, 250, 250)), Some(1));
/// ```
pub fn nearest_palette_index(palette: &[PaletteEntry], color: Rgb) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (idx, entry) in palette.iter().enumerate() {
        let dist = u32::from(color.r.abs_diff(entry.r))
            + u32::from(color.g.abs_diff(entry.g))
            + u32::from(color.b.abs_diff(entry.b));
        match best {
            Some((_, min)) if dist >= min => {}
            _ => best = Some((idx, dist)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// The 3-3-2 color cube for a display with `depth` bits per pixel.
///
/// Entry `i` of `1 << depth` takes `ii = i * 256 / n` and splits it as
/// `RRRGGGBB`.
///
/// # Errors
///
/// [`PixbufError::UnsupportedFormat`] unless `1 <= depth <= 8`.
pub fn color_cube(depth: u8) -> Result<Vec<Rgb>> {
    if depth == 0 || depth > 8 {
        return Err(PixbufError::UnsupportedFormat(format!(
            "palette depth {depth}"
        )));
    }
    let n = 1usize << depth;
    Ok((0..n)
        .map(|i| {
            let ii = (i * 256 / n) as u8;
            Rgb::new(ii & 0xe0, (ii & 0x1c) << 3, (ii & 0x03) << 6)
        })
        .collect())
}

/// An image reduced to a palette plus one palette index per pixel.
#[derive(Debug, Clone)]
pub struct IndexedImage {
    pub width: u32,
    pub height: u32,
    pub palette: Vec<PaletteEntry>,
    /// Row-major palette indices
    pub indices: Vec<u8>,
}

/// Reduces `img` to at most `max_colors` colors (clamped to 2..=256) using
/// Wu's method with Floyd-Steinberg dithering. Alpha is ignored.
///
/// Palette entries get their index as `native_code`.
pub fn quantize_indexed(img: &PixelBuffer, max_colors: u16) -> Result<IndexedImage> {
    let pixels: Vec<Srgb<u8>> = img
        .as_bytes()
        .chunks_exact(img.channel_count())
        .map(|c| Srgb::new(c[0], c[1], c[2]))
        .collect();

    let palette_size = u8::try_from(max_colors.clamp(2, 256))
        .ok()
        .and_then(|n| PaletteSize::try_from(n).ok())
        .unwrap_or(PaletteSize::MAX);

    let image = ImageRef::new(img.width(), img.height(), &pixels)
        .map_err(|e| PixbufError::Quantization(e.to_string()))?;

    let indexed = Pipeline::new()
        .palette_size(palette_size)
        .quantize_method(QuantizeMethod::Wu)
        .ditherer(FloydSteinberg::new())
        .input_image(image)
        .output_srgb8_indexed_image();

    let palette = indexed
        .palette()
        .iter()
        .enumerate()
        .map(|(idx, c)| PaletteEntry::new(Rgb::new(c.red, c.green, c.blue), idx as u32))
        .collect();

    log::debug!(
        "quantized {}x{} image to {} colors",
        img.width(),
        img.height(),
        indexed.palette().len()
    );

    Ok(IndexedImage {
        width: img.width(),
        height: img.height(),
        palette,
        indices: indexed.indices().to_vec(),
    })
}

/// Builds a palette of at most `max_colors` colors tailored to `img`.
pub fn adaptive_palette(img: &PixelBuffer, max_colors: u16) -> Result<Vec<PaletteEntry>> {
    Ok(quantize_indexed(img, max_colors)?.palette)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Rgba;
    use crate::composite::fill;

    fn entry(r: u8, g: u8, b: u8) -> PaletteEntry {
        PaletteEntry::new(Rgb::new(r, g, b), 0)
    }

    #[test]
    fn test_nearest_black_white() {
        let palette = [entry(0, 0, 0), entry(255, 255, 255)];
        assert_eq!(nearest_palette_index(&palette, Rgb::new(10, 10, 10)), Some(0));
        assert_eq!(nearest_palette_index(&palette, Rgb::new(250, 250, 250)), Some(1));
    }

    #[test]
    fn test_nearest_uses_l1_distance() {
        // 60 vs 75 by L1; squared distance would prefer the gray (3600 vs 1875)
        let palette = [entry(60, 0, 0), entry(25, 25, 25)];
        assert_eq!(nearest_palette_index(&palette, Rgb::new(0, 0, 0)), Some(0));
    }

    #[test]
    fn test_nearest_ties_pick_first() {
        let palette = [entry(0, 0, 10), entry(0, 10, 0), entry(0, 0, 10)];
        assert_eq!(nearest_palette_index(&palette, Rgb::new(0, 5, 5)), Some(0));
        assert_eq!(nearest_palette_index(&palette, Rgb::new(0, 0, 10)), Some(0));
    }

    #[test]
    fn test_nearest_empty_palette() {
        assert_eq!(nearest_palette_index(&[], Rgb::BLACK), None);
    }

    #[test]
    fn test_color_cube() {
        let cube = color_cube(8).unwrap();
        assert_eq!(cube.len(), 256);
        assert_eq!(cube[0], Rgb::new(0, 0, 0));
        assert_eq!(cube[0xff], Rgb::new(0xe0, 0xe0, 0xc0));
        assert_eq!(cube[0b101_010_01], Rgb::new(0xa0, 0x40, 0x40));

        let small = color_cube(2).unwrap();
        // ii = 0, 64, 128, 192
        assert_eq!(
            small,
            vec![
                Rgb::new(0, 0, 0),
                Rgb::new(0x40, 0, 0),
                Rgb::new(0x80, 0, 0),
                Rgb::new(0xc0, 0, 0)
            ]
        );
        assert!(color_cube(0).is_err());
        assert!(color_cube(9).is_err());
    }

    #[test]
    fn test_adaptive_palette_two_colors() {
        let mut img = PixelBuffer::new_rgb(4, 4).unwrap();
        fill(&mut img, Rgba::opaque(255, 0, 0));
        for y in 0..4 {
            img.set_pixel(0, y, Rgb::new(0, 0, 255)).unwrap();
        }
        let palette = adaptive_palette(&img, 16).unwrap();
        assert!(!palette.is_empty());
        assert!(palette.len() <= 16);
        let red = nearest_palette_index(&palette, Rgb::new(255, 0, 0)).unwrap();
        assert!(palette[red].r > 200 && palette[red].b < 55);
        assert_eq!(palette[red].native_code, red as u32);
    }

    #[test]
    fn test_quantize_indexed_shapes() {
        let img = PixelBuffer::new_rgba(3, 2).unwrap();
        let indexed = quantize_indexed(&img, 256).unwrap();
        assert_eq!(indexed.indices.len(), 6);
        assert_eq!((indexed.width, indexed.height), (3, 2));
    }
}
