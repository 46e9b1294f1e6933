#![no_main]

use libfuzzer_sys::fuzz_target;
use pixbuf::{decode_xpm_with, X11ColorResolver, XpmOptions};

fuzz_target!(|data: &[u8]| {
    // Keep allocations small so the fuzzer explores the parser, not the allocator
    let opts = XpmOptions {
        max_width: 256,
        max_height: 256,
        ..XpmOptions::default()
    };

    if let Ok(img) = decode_xpm_with(data, &opts, &X11ColorResolver) {
        let expected = img.width() as usize * img.height() as usize * img.channel_count();
        assert_eq!(img.as_bytes().len(), expected);
    }
});
