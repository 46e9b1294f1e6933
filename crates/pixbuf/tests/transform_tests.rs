use pixbuf::*;
use pretty_assertions::assert_eq;

fn numbered(width: u32, height: u32, has_alpha: bool) -> PixelBuffer {
    let mut img = PixelBuffer::new(width, height, has_alpha).unwrap();
    for (i, b) in img.as_bytes_mut().iter_mut().enumerate() {
        *b = (i % 253) as u8;
    }
    img
}

const SIZES: &[(u32, u32)] = &[(1, 1), (1, 4), (5, 1), (3, 3), (4, 4), (3, 5), (6, 4), (7, 2)];

#[test]
fn test_four_quarter_turns_are_identity() {
    for &(w, h) in SIZES {
        for alpha in [false, true] {
            let img = numbered(w, h, alpha);
            let mut out = img.clone();
            for _ in 0..4 {
                out = rotate90(&out).unwrap();
            }
            assert_eq!(out, img, "{w}x{h} alpha={alpha}");

            let mut out = img.clone();
            for _ in 0..4 {
                out = rotate270(&out).unwrap();
            }
            assert_eq!(out, img, "{w}x{h} alpha={alpha}");
        }
    }
}

#[test]
fn test_half_turn_and_flips_are_involutions() {
    for &(w, h) in SIZES {
        let img = numbered(w, h, true);
        assert_eq!(rotate180(&rotate180(&img).unwrap()).unwrap(), img, "{w}x{h}");
        assert_eq!(flip_horizontal(&flip_horizontal(&img).unwrap()).unwrap(), img);
        assert_eq!(flip_vertical(&flip_vertical(&img).unwrap()).unwrap(), img);
    }
}

#[test]
fn test_rotations_compose() {
    for &(w, h) in SIZES {
        let img = numbered(w, h, false);
        let twice = rotate90(&rotate90(&img).unwrap()).unwrap();
        assert_eq!(twice, rotate180(&img).unwrap(), "{w}x{h}");
        let thrice = rotate90(&twice).unwrap();
        assert_eq!(thrice, rotate270(&img).unwrap(), "{w}x{h}");
        let both_flips = flip_vertical(&flip_horizontal(&img).unwrap()).unwrap();
        assert_eq!(both_flips, rotate180(&img).unwrap(), "{w}x{h}");
    }
}

#[test]
fn test_quarter_turn_swaps_dimensions() {
    let img = numbered(7, 2, false);
    let out = rotate90(&img).unwrap();
    assert_eq!((out.width(), out.height()), (2, 7));
    assert_eq!(Transform::Rotate90.output_dimensions(7, 2), (2, 7));
    assert!(!Transform::FlipVertical.swaps_dimensions());

    // top-left goes to top-right
    assert_eq!(out.get_pixel(1, 0).unwrap(), img.get_pixel(0, 0).unwrap());
    // bottom-left goes to top-left
    assert_eq!(out.get_pixel(0, 0).unwrap(), img.get_pixel(0, 1).unwrap());
}
