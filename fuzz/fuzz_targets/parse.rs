#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate pe_image;

use pe_image::pe::{Image, ParseOptions};

fuzz_target!(|data: &[u8]| {
    let mut image = Image::new_from_bytes(data, ParseOptions::default());
    let _ = image.parse();
});
