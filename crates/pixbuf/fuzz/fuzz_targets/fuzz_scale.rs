#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pixbuf::{scale, PixelBuffer};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    width: u8,
    height: u8,
    new_width: u8,
    new_height: u8,
    has_alpha: bool,
    pixels: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let width = u32::from(input.width).clamp(1, 64);
    let height = u32::from(input.height).clamp(1, 64);
    let channels = if input.has_alpha { 4 } else { 3 };

    let expected_size = (width * height) as usize * channels;
    if input.pixels.len() < expected_size {
        return;
    }

    let img = match PixelBuffer::from_bytes(
        &input.pixels[..expected_size],
        width,
        height,
        input.has_alpha,
    ) {
        Ok(img) => img,
        Err(_) => return,
    };

    let (nw, nh) = (u32::from(input.new_width), u32::from(input.new_height));
    match scale(&img, nw, nh) {
        Ok(out) => {
            assert_eq!((out.width(), out.height()), (nw, nh));
            assert_eq!(out.has_alpha(), img.has_alpha());
        }
        // Only a zero target may fail
        Err(_) => assert!(nw == 0 || nh == 0),
    }

    assert_eq!(scale(&img, width, height).ok().as_ref(), Some(&img));
});
