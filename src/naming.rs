//! Output filename conventions.
//!
//! | Output | Pattern | Example |
//! |---|---|---|
//! | Archive entry | `photo_{NN}_{size}.{ext}` | `photo_01_1000.jpg` |
//! | Archive file | `photos_{count}_{size}.zip` | `photos_12_1000.zip` |
//! | Collage file | `collage_{count}_{cell}.png` | `collage_9_512.png` |
//!
//! Entry indices are 1-based and zero-padded to two digits, so a full
//! 60-image batch still sorts lexically in batch order.

/// Pick a file extension from a declared content type.
///
/// Anything mentioning `png` is a PNG; everything else, including a missing
/// header, is treated as JPEG.
pub fn extension_for_content_type(content_type: Option<&str>) -> &'static str {
    match content_type {
        Some(ct) if ct.to_ascii_lowercase().contains("png") => "png",
        _ => "jpg",
    }
}

/// Name of an archive entry. `index` is 0-based batch position.
pub fn archive_entry_name(index: usize, output_size: u32, extension: &str) -> String {
    format!("photo_{:02}_{}.{}", index + 1, output_size, extension)
}

/// Name of the archive file. `count` is the number of items attempted.
pub fn archive_filename(count: usize, output_size: u32) -> String {
    format!("photos_{}_{}.zip", count, output_size)
}

/// Name of the collage file. `count` is the number of images actually drawn.
pub fn collage_filename(count: usize, cell_size: u32) -> String {
    format!("collage_{}_{}.png", count, cell_size)
}
