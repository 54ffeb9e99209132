#[macro_use]
extern crate afl;

use pe_image::pe::{Image, ParseOptions};

fn main() {
    fuzz!(|data: &[u8]| {
        let mut image = Image::new_from_bytes(data, ParseOptions::default());
        let _ = image.parse();
    });
}
