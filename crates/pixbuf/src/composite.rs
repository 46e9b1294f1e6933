//! Fill, copy and alpha compositing between [`PixelBuffer`]s.
//!
//! All alpha mixing goes through [`blend_channel`], an integer blend that
//! rounds to nearest. Results are bit-exact across platforms.

use crate::buffer::{PixelBuffer, Rect, Rgba};
use crate::{PixbufError, Result};

/// Blends one channel: `fg` over `bg` with weight `alpha`.
///
/// ```rust
/// use pixbuf::blend_channel;
/// assert_eq!(blend_channel(200, 0, 10), 10);
/// assert_eq!(blend_channel(200, 255, 10), 200);
/// assert_eq!(blend_channel(255, 128, 0), 128);
/// ```
#[inline]
pub fn blend_channel(fg: u8, alpha: u8, bg: u8) -> u8 {
    match alpha {
        0 => bg,
        255 => fg,
        _ => {
            let alpha = u16::from(alpha);
            let t = u16::from(fg) * alpha + u16::from(bg) * (255 - alpha) + 128;
            ((t + (t >> 8)) >> 8) as u8
        }
    }
}

/// Sets every pixel to `color`. The alpha component is only stored when the
/// buffer has an alpha channel.
pub fn fill(buf: &mut PixelBuffer, color: Rgba) {
    if buf.has_alpha() {
        let px: [u8; 4] = color.into();
        for chunk in buf.as_bytes_mut().chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    } else {
        let px = [color.r, color.g, color.b];
        for chunk in buf.as_bytes_mut().chunks_exact_mut(3) {
            chunk.copy_from_slice(&px);
        }
    }
}

fn check_regions(
    dest: &PixelBuffer,
    src: &PixelBuffer,
    src_rect: Rect,
    dest_x: u32,
    dest_y: u32,
) -> Result<()> {
    if !src_rect.fits_within(src.width(), src.height()) {
        return Err(PixbufError::RegionOutOfBounds {
            rect: src_rect,
            width: src.width(),
            height: src.height(),
        });
    }
    let dest_rect = Rect::new(dest_x, dest_y, src_rect.width, src_rect.height);
    if !dest_rect.fits_within(dest.width(), dest.height()) {
        return Err(PixbufError::RegionOutOfBounds {
            rect: dest_rect,
            width: dest.width(),
            height: dest.height(),
        });
    }
    Ok(())
}

/// Copies `src_rect` of `src` verbatim to `(dest_x, dest_y)` in `dest`.
///
/// When `src` has no alpha but `dest` does, copied pixels become fully
/// opaque. When `src` has alpha but `dest` doesn't, alpha is dropped.
///
/// # Errors
///
/// [`PixbufError::RegionOutOfBounds`] if the rectangle does not fit in
/// `src`, or the destination area does not fit in `dest`.
pub fn copy(
    dest: &mut PixelBuffer,
    src: &PixelBuffer,
    src_rect: Rect,
    dest_x: u32,
    dest_y: u32,
) -> Result<()> {
    check_regions(dest, src, src_rect, dest_x, dest_y)?;

    let sbc = src.channel_count();
    let dbc = dest.channel_count();
    let width = src_rect.width as usize;

    for row in 0..src_rect.height {
        let src_row = src.row(src_rect.y + row);
        let src_span = &src_row[src_rect.x as usize * sbc..(src_rect.x as usize + width) * sbc];
        let dest_row = dest.row_mut(dest_y + row);
        let dest_span = &mut dest_row[dest_x as usize * dbc..(dest_x as usize + width) * dbc];

        if sbc == dbc {
            dest_span.copy_from_slice(src_span);
            continue;
        }
        for (d, s) in dest_span.chunks_exact_mut(dbc).zip(src_span.chunks_exact(sbc)) {
            d[..3].copy_from_slice(&s[..3]);
            if dbc == 4 {
                d[3] = 0xff;
            }
        }
    }
    Ok(())
}

/// Alpha-blends all of `src` onto `dest` at `(dest_x, dest_y)`.
///
/// `src`'s own alpha is the blend weight; `dest`'s alpha channel, if any,
/// is left as it was. Falls back to [`copy`] when `src` has no alpha.
pub fn composite(dest: &mut PixelBuffer, src: &PixelBuffer, dest_x: u32, dest_y: u32) -> Result<()> {
    let whole = Rect::new(0, 0, src.width(), src.height());
    if !src.has_alpha() {
        return copy(dest, src, whole, dest_x, dest_y);
    }
    check_regions(dest, src, whole, dest_x, dest_y)?;

    let dbc = dest.channel_count();
    let width = src.width() as usize;
    for row in 0..src.height() {
        let src_row = src.row(row);
        let dest_row = dest.row_mut(dest_y + row);
        let dest_span = &mut dest_row[dest_x as usize * dbc..(dest_x as usize + width) * dbc];
        for (d, s) in dest_span.chunks_exact_mut(dbc).zip(src_row.chunks_exact(4)) {
            let a = s[3];
            d[0] = blend_channel(s[0], a, d[0]);
            d[1] = blend_channel(s[1], a, d[1]);
            d[2] = blend_channel(s[2], a, d[2]);
        }
    }
    Ok(())
}

/// Alpha-blends `src_rect` of `src` onto `dest`, shifting each source
/// alpha by `alpha_adjust` (clamped to `0..=255`) first.
///
/// A negative `alpha_adjust` fades the source out. When `dest` has an
/// alpha channel it receives the adjusted source alpha. Falls back to
/// [`copy`] when `src` has no alpha.
pub fn composite_region(
    dest: &mut PixelBuffer,
    src: &PixelBuffer,
    src_rect: Rect,
    dest_x: u32,
    dest_y: u32,
    alpha_adjust: i32,
) -> Result<()> {
    if !src.has_alpha() {
        return copy(dest, src, src_rect, dest_x, dest_y);
    }
    check_regions(dest, src, src_rect, dest_x, dest_y)?;

    let dbc = dest.channel_count();
    let width = src_rect.width as usize;
    for row in 0..src_rect.height {
        let src_row = src.row(src_rect.y + row);
        let src_span = &src_row[src_rect.x as usize * 4..(src_rect.x as usize + width) * 4];
        let dest_row = dest.row_mut(dest_y + row);
        let dest_span = &mut dest_row[dest_x as usize * dbc..(dest_x as usize + width) * dbc];
        for (d, s) in dest_span.chunks_exact_mut(dbc).zip(src_span.chunks_exact(4)) {
            let a = (i32::from(s[3]) + alpha_adjust).clamp(0, 255) as u8;
            d[0] = blend_channel(s[0], a, d[0]);
            d[1] = blend_channel(s[1], a, d[1]);
            d[2] = blend_channel(s[2], a, d[2]);
            if dbc == 4 {
                d[3] = a;
            }
        }
    }
    Ok(())
}

/// [`composite_region`] without an alpha adjustment.
#[inline]
pub fn copy_composite(
    dest: &mut PixelBuffer,
    src: &PixelBuffer,
    src_rect: Rect,
    dest_x: u32,
    dest_y: u32,
) -> Result<()> {
    composite_region(dest, src, src_rect, dest_x, dest_y, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Rgb;
    use crate::ErrorKind;

    fn reference_blend(fg: u8, alpha: u8, bg: u8) -> u8 {
        // Same sequence in wider integers; must agree for every input
        if alpha == 0 {
            return bg;
        }
        if alpha == 255 {
            return fg;
        }
        let t = fg as u32 * alpha as u32 + bg as u32 * (255 - alpha as u32) + 128;
        ((t + (t >> 8)) >> 8) as u8
    }

    #[test]
    fn test_blend_channel_exhaustive() {
        for fg in (0..=255u8).step_by(5) {
            for bg in (0..=255u8).step_by(3) {
                for alpha in 0..=255u8 {
                    assert_eq!(blend_channel(fg, alpha, bg), reference_blend(fg, alpha, bg));
                }
            }
        }
    }

    #[test]
    fn test_blend_channel_known_values() {
        assert_eq!(blend_channel(100, 0, 50), 50);
        assert_eq!(blend_channel(100, 255, 50), 100);
        // 0*1 + 255*254 + 128 = 64898; (64898 + 253) >> 8 = 254
        assert_eq!(blend_channel(0, 1, 255), 254);
        assert_eq!(blend_channel(255, 254, 0), 254);
    }

    #[test]
    fn test_fill_rgb_ignores_alpha() {
        let mut buf = PixelBuffer::new_rgb(3, 3).unwrap();
        fill(&mut buf, Rgba::new(10, 20, 30, 40));
        assert_eq!(buf.get_pixel(2, 2).unwrap(), Rgba::new(10, 20, 30, 255));
    }

    #[test]
    fn test_fill_rgba_stores_alpha() {
        let mut buf = PixelBuffer::new_rgba(3, 3).unwrap();
        fill(&mut buf, Rgba::new(10, 20, 30, 40));
        assert_eq!(buf.get_pixel(1, 1).unwrap(), Rgba::new(10, 20, 30, 40));
    }

    #[test]
    fn test_copy_rgb_into_rgba_forces_opaque() {
        let mut src = PixelBuffer::new_rgb(2, 2).unwrap();
        fill(&mut src, Rgba::opaque(1, 2, 3));
        let mut dest = PixelBuffer::new_rgba(4, 4).unwrap();
        copy(&mut dest, &src, Rect::new(0, 0, 2, 2), 1, 1).unwrap();
        assert_eq!(dest.get_pixel(1, 1).unwrap(), Rgba::new(1, 2, 3, 255));
        assert_eq!(dest.get_pixel(2, 2).unwrap(), Rgba::new(1, 2, 3, 255));
        assert_eq!(dest.get_pixel(0, 0).unwrap(), Rgba::TRANSPARENT);
        assert_eq!(dest.get_pixel(3, 3).unwrap(), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_copy_rgba_into_rgb_drops_alpha() {
        let mut src = PixelBuffer::new_rgba(1, 1).unwrap();
        fill(&mut src, Rgba::new(7, 8, 9, 10));
        let mut dest = PixelBuffer::new_rgb(1, 1).unwrap();
        copy(&mut dest, &src, Rect::new(0, 0, 1, 1), 0, 0).unwrap();
        assert_eq!(dest.as_bytes(), &[7, 8, 9]);
    }

    #[test]
    fn test_copy_sub_rectangle() {
        let src = PixelBuffer::from_bytes(
            &[
                0, 0, 0, 1, 1, 1, 2, 2, 2, //
                3, 3, 3, 4, 4, 4, 5, 5, 5,
            ],
            3,
            2,
            false,
        )
        .unwrap();
        let mut dest = PixelBuffer::new_rgb(2, 1).unwrap();
        copy(&mut dest, &src, Rect::new(1, 1, 2, 1), 0, 0).unwrap();
        assert_eq!(dest.as_bytes(), &[4, 4, 4, 5, 5, 5]);
    }

    #[test]
    fn test_copy_out_of_bounds() {
        let src = PixelBuffer::new_rgb(2, 2).unwrap();
        let mut dest = PixelBuffer::new_rgb(2, 2).unwrap();
        let err = copy(&mut dest, &src, Rect::new(0, 0, 3, 1), 0, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Dimension);
        assert!(copy(&mut dest, &src, Rect::new(0, 0, 2, 2), 1, 0).is_err());
    }

    #[test]
    fn test_composite_transparent_source_is_noop() {
        let mut dest = PixelBuffer::new_rgb(3, 3).unwrap();
        fill(&mut dest, Rgba::opaque(50, 60, 70));
        let before = dest.clone();
        let mut src = PixelBuffer::new_rgba(2, 2).unwrap();
        fill(&mut src, Rgba::new(255, 0, 0, 0));
        composite(&mut dest, &src, 1, 1).unwrap();
        assert_eq!(dest, before);
    }

    #[test]
    fn test_composite_opaque_source_replaces() {
        let mut dest = PixelBuffer::new_rgba(3, 3).unwrap();
        fill(&mut dest, Rgba::new(50, 60, 70, 80));
        let mut src = PixelBuffer::new_rgba(2, 2).unwrap();
        fill(&mut src, Rgba::new(255, 0, 0, 255));
        composite(&mut dest, &src, 1, 1).unwrap();
        // dest alpha untouched
        assert_eq!(dest.get_pixel(2, 2).unwrap(), Rgba::new(255, 0, 0, 80));
        assert_eq!(dest.get_pixel(0, 0).unwrap(), Rgba::new(50, 60, 70, 80));
    }

    #[test]
    fn test_composite_without_alpha_copies() {
        let mut dest = PixelBuffer::new_rgba(2, 1).unwrap();
        let mut src = PixelBuffer::new_rgb(1, 1).unwrap();
        src.set_pixel(0, 0, Rgb::new(4, 5, 6)).unwrap();
        composite(&mut dest, &src, 1, 0).unwrap();
        assert_eq!(dest.as_bytes(), &[0, 0, 0, 0, 4, 5, 6, 255]);
    }

    #[test]
    fn test_composite_region_alpha_adjust() {
        let mut dest = PixelBuffer::new_rgba(1, 1).unwrap();
        fill(&mut dest, Rgba::new(0, 0, 0, 255));
        let mut src = PixelBuffer::new_rgba(1, 1).unwrap();
        fill(&mut src, Rgba::new(255, 255, 255, 100));

        let mut faded = dest.clone();
        composite_region(&mut faded, &src, Rect::new(0, 0, 1, 1), 0, 0, -200).unwrap();
        assert_eq!(faded.get_pixel(0, 0).unwrap(), Rgba::new(0, 0, 0, 0));

        let mut boosted = dest.clone();
        composite_region(&mut boosted, &src, Rect::new(0, 0, 1, 1), 0, 0, 500).unwrap();
        assert_eq!(boosted.get_pixel(0, 0).unwrap(), Rgba::new(255, 255, 255, 255));

        let mut plain = dest.clone();
        copy_composite(&mut plain, &src, Rect::new(0, 0, 1, 1), 0, 0).unwrap();
        let v = blend_channel(255, 100, 0);
        assert_eq!(plain.get_pixel(0, 0).unwrap(), Rgba::new(v, v, v, 100));
    }

    #[test]
    fn test_composite_region_into_rgb() {
        let mut dest = PixelBuffer::new_rgb(2, 1).unwrap();
        let src = PixelBuffer::from_bytes(&[10, 20, 30, 255, 200, 200, 200, 255], 2, 1, true)
            .unwrap();
        composite_region(&mut dest, &src, Rect::new(1, 0, 1, 1), 0, 0, 0).unwrap();
        assert_eq!(dest.as_bytes(), &[200, 200, 200, 0, 0, 0]);
    }
}
