#![allow(dead_code)]

pub mod image_server;

use image::{ImageBuffer, ImageFormat, Rgb};
use std::io::Cursor;

/// Solid-colour PNG; different `shade` values give different bytes.
pub fn png(width: u32, height: u32, shade: u8) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_pixel(width, height, Rgb([shade, shade / 2, 255 - shade]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode png");
    out.into_inner()
}
