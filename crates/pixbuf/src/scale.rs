//! Resizing: box-filter downscale, nearest-neighbour upscale, and the
//! two-pass combination for resizes that grow one axis and shrink the other.

use crate::buffer::PixelBuffer;
use crate::{PixbufError, Result};

fn invalid_scale(routine: &'static str, img: &PixelBuffer, w: u32, h: u32) -> PixbufError {
    PixbufError::InvalidScale {
        routine,
        from_width: img.width(),
        from_height: img.height(),
        to_width: w,
        to_height: h,
    }
}

/// Sample boundaries `i * src / dst` for `i` in `0..=dst`.
fn sample_bounds(src: u32, dst: u32) -> Vec<usize> {
    (0..=u64::from(dst))
        .map(|i| (i * u64::from(src) / u64::from(dst)) as usize)
        .collect()
}

/// Shrinks `img` with an unweighted box filter.
///
/// Each destination pixel is the per-channel integer mean of the source
/// pixels in its box. Boxes are bounded by `i * width / new_width` (floor),
/// so edge boxes can hold a different number of pixels than interior ones.
///
/// # Errors
///
/// [`PixbufError::InvalidScale`] if either target dimension is larger than
/// the source or zero.
pub fn scale_down(img: &PixelBuffer, new_width: u32, new_height: u32) -> Result<PixelBuffer> {
    if new_width == 0
        || new_height == 0
        || new_width > img.width()
        || new_height > img.height()
    {
        return Err(invalid_scale("scale_down", img, new_width, new_height));
    }

    let mut scaled = PixelBuffer::new(new_width, new_height, img.has_alpha())?;
    let channels = img.channel_count();
    let xsample = sample_bounds(img.width(), new_width);
    let ysample = sample_bounds(img.height(), new_height);

    let mut dest_idx = 0usize;
    for y in 0..new_height as usize {
        let (y0, y1) = (ysample[y], ysample[y + 1]);
        for x in 0..new_width as usize {
            let (x0, x1) = (xsample[x], xsample[x + 1]);
            let samples = (x1 - x0) * (y1 - y0);

            if samples == 1 {
                let src = img.offset(x0 as u32, y0 as u32);
                scaled.as_bytes_mut()[dest_idx..dest_idx + channels]
                    .copy_from_slice(&img.as_bytes()[src..src + channels]);
                dest_idx += channels;
                continue;
            }

            let mut sums = [0usize; 4];
            for sy in y0..y1 {
                let row = img.row(sy as u32);
                for px in row[x0 * channels..x1 * channels].chunks_exact(channels) {
                    for (sum, &v) in sums.iter_mut().zip(px) {
                        *sum += usize::from(v);
                    }
                }
            }
            let out = &mut scaled.as_bytes_mut()[dest_idx..dest_idx + channels];
            for (o, sum) in out.iter_mut().zip(sums) {
                *o = (sum / samples) as u8;
            }
            dest_idx += channels;
        }
    }

    Ok(scaled)
}

/// Enlarges `img` by nearest-neighbour sampling.
///
/// Destination pixel `(x, y)` takes source pixel
/// `(x * width / new_width, y * height / new_height)`.
///
/// # Errors
///
/// [`PixbufError::InvalidScale`] if either target dimension is smaller than
/// the source.
pub fn scale_up(img: &PixelBuffer, new_width: u32, new_height: u32) -> Result<PixelBuffer> {
    if new_width < img.width() || new_height < img.height() {
        return Err(invalid_scale("scale_up", img, new_width, new_height));
    }

    let mut scaled = PixelBuffer::new(new_width, new_height, img.has_alpha())?;
    let channels = img.channel_count();
    let src_cols: Vec<usize> = (0..u64::from(new_width))
        .map(|x| (x * u64::from(img.width()) / u64::from(new_width)) as usize * channels)
        .collect();

    for y in 0..new_height {
        let yy = (u64::from(y) * u64::from(img.height()) / u64::from(new_height)) as u32;
        let src_row = img.row(yy);
        let dest_row = scaled.row_mut(y);
        for (dst, &col) in dest_row.chunks_exact_mut(channels).zip(&src_cols) {
            dst.copy_from_slice(&src_row[col..col + channels]);
        }
    }

    Ok(scaled)
}

/// Resizes `img` to `new_width` x `new_height`.
///
/// Growing both axes uses [`scale_up`], shrinking both uses [`scale_down`].
/// Mixed resizes run both: the horizontal pass first at the source height,
/// then the vertical pass. The intermediate buffer is dropped before
/// returning.
///
/// ```rust
/// use pixbuf::{scale, PixelBuffer};
/// let img = PixelBuffer::new_rgb(8, 8)?;
/// let wide = scale(&img, 16, 4)?;
/// assert_eq!((wide.width(), wide.height()), (16, 4));
/// # Ok::<(), pixbuf::PixbufError>(())
/// ```
pub fn scale(img: &PixelBuffer, new_width: u32, new_height: u32) -> Result<PixelBuffer> {
    let (w, h) = (img.width(), img.height());

    if new_width >= w && new_height >= h {
        return scale_up(img, new_width, new_height);
    }
    if new_width <= w && new_height <= h {
        return scale_down(img, new_width, new_height);
    }

    if new_width >= w {
        // wider and shorter
        let wide = scale_up(img, new_width, h)?;
        scale_down(&wide, new_width, new_height)
    } else {
        // narrower and taller
        let narrow = scale_down(img, new_width, h)?;
        scale_up(&narrow, new_width, new_height)
    }
}
