//! Shared test utilities: descriptor/batch builders and image/zip fixtures.
//!
//! URLs point at the reserved `.test` TLD; nothing here touches the network.

use crate::types::{BatchState, ImageDescriptor};
use image::{ImageEncoder, RgbImage};
use std::io::Cursor;

/// Descriptor with distinct preview and download URLs for item `n`.
pub fn descriptor(n: usize, caption: &str) -> ImageDescriptor {
    ImageDescriptor {
        preview_url: format!("https://img.test/{n}/preview"),
        download_url: format!("https://img.test/{n}/full"),
        caption: caption.to_string(),
    }
}

/// Batch of `count` descriptors numbered from 1.
pub fn batch_of(count: usize, output_size: u32) -> BatchState {
    BatchState::new(
        (1..=count).map(|n| descriptor(n, &format!("item {n}"))).collect(),
        output_size,
    )
}

/// A solid-color PNG.
pub fn png_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, image::Rgb(rgb));
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Entry names of a zip, in archive order.
pub fn zip_entry_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}
