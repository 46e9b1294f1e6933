#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pixbuf::{transform, PixelBuffer, Transform};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    width: u8,
    height: u8,
    has_alpha: bool,
    pixels: Vec<u8>,
}

const ALL: [Transform; 5] = [
    Transform::Rotate90,
    Transform::Rotate180,
    Transform::Rotate270,
    Transform::FlipHorizontal,
    Transform::FlipVertical,
];

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

    for t in ALL {
        let there = transform(&img, t).expect("transform of a valid buffer");
        assert_eq!(
            (there.width(), there.height()),
            t.output_dimensions(width, height)
        );
        let back = transform(&there, t.inverse()).expect("inverse transform");
        assert_eq!(back, img, "{t:?} then {:?}", t.inverse());
    }
});
