//! Collage export.
//!
//! Composes the batch previews into one PNG:
//!
//! 1. Load every preview concurrently (rayon). A failed download or decode
//!    becomes `None`, never an error.
//! 2. Drop the failures, keeping batch order.
//! 3. Lay the rest out on a [`GridLayout`] and draw each into a
//!    rounded-rectangle cell on a [`Canvas`].
//! 4. Encode the canvas as PNG.
//!
//! The module is split into:
//! - **Layout**: pure grid and pixel arithmetic (unit testable)
//! - **Canvas**: the raster surface and its draw/clip primitives
//! - **Composer** (this file): loading, composition and export

mod canvas;
mod layout;

pub use canvas::{Canvas, inside_rounded_rect};
pub use layout::{Geometry, GridLayout};

use crate::config::{CollageConfig, ConfigError};
use crate::naming::collage_filename;
use crate::transport::{Request, Transport};
use crate::types::{BatchState, DEFAULT_CELL_SIZE, size_or_default};
use image::DynamicImage;
use rayon::prelude::*;
use thiserror::Error;

/// Refuse to allocate canvases beyond this many pixels.
pub const MAX_CANVAS_PIXELS: u64 = 16384 * 16384;

#[derive(Error, Debug)]
pub enum CollageError {
    #[error("nothing to export: the batch is empty")]
    EmptyBatch,
    #[error("none of the {attempted} previews could be loaded")]
    NoPreviewLoaded { attempted: usize },
    #[error("collage of {width}x{height} pixels is too large")]
    TooLarge { width: u64, height: u64 },
    #[error("collage export blocked: {0}")]
    ExportBlocked(String),
}

/// How the collage looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollageStyle {
    pub cell_size: u32,
    pub padding: u32,
    pub corner_radius: u32,
    pub background: [u8; 3],
}

impl CollageStyle {
    /// Style from config, with an optional per-run cell size.
    ///
    /// Zero or missing cell sizes fall back to the config, then to 512.
    pub fn from_config(config: &CollageConfig, cell_override: Option<u32>) -> Result<Self, ConfigError> {
        let configured = size_or_default(Some(config.cell_size), DEFAULT_CELL_SIZE);
        Ok(Self {
            cell_size: size_or_default(cell_override, configured),
            padding: config.padding,
            corner_radius: config.corner_radius,
            background: config.background_rgb()?,
        })
    }
}

impl Default for CollageStyle {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            padding: 6,
            corner_radius: 18,
            background: [0x0b, 0x10, 0x24],
        }
    }
}

/// A finished collage, ready to be saved by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollageExport {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Number of images drawn
    pub images: usize,
    pub layout: GridLayout,
    pub width: u32,
    pub height: u32,
}

fn load_preview(transport: &impl Transport, url: &str) -> Option<DynamicImage> {
    let response = transport.get(&Request::get(url)).ok()?;
    if !response.is_success() {
        return None;
    }
    image::load_from_memory(&response.body).ok()
}

/// Load every preview in parallel. Output order matches batch order.
pub fn load_previews(transport: &impl Transport, batch: &BatchState) -> Vec<Option<DynamicImage>> {
    batch
        .items
        .par_iter()
        .map(|item| load_preview(transport, &item.preview_url))
        .collect()
}

/// Draw `images` onto a fresh canvas.
pub fn compose(images: &[DynamicImage], style: &CollageStyle) -> Result<(Canvas, GridLayout), CollageError> {
    let geometry = Geometry::new(images.len(), style.cell_size, style.padding);
    let (width, height) = geometry.canvas_size();
    if width.saturating_mul(height) > MAX_CANVAS_PIXELS {
        return Err(CollageError::TooLarge { width, height });
    }

    let mut canvas = Canvas::new(width as u32, height as u32, style.background);
    for (i, image) in images.iter().enumerate() {
        let (x, y) = geometry.cell_origin(i);
        canvas.draw_rounded(image, x, y, style.cell_size, style.cell_size, style.corner_radius);
    }
    Ok((canvas, geometry.layout))
}

/// Load, compose and encode.
pub fn export_collage(
    transport: &impl Transport,
    batch: &BatchState,
    style: &CollageStyle,
) -> Result<CollageExport, CollageError> {
    if batch.is_empty() {
        return Err(CollageError::EmptyBatch);
    }

    let loaded: Vec<DynamicImage> = load_previews(transport, batch).into_iter().flatten().collect();
    if loaded.is_empty() {
        return Err(CollageError::NoPreviewLoaded {
            attempted: batch.len(),
        });
    }

    let (canvas, layout) = compose(&loaded, style)?;
    let bytes = canvas
        .encode_png()
        .map_err(|e| CollageError::ExportBlocked(e.to_string()))?;

    Ok(CollageExport {
        filename: collage_filename(loaded.len(), style.cell_size),
        bytes,
        images: loaded.len(),
        layout,
        width: canvas.width(),
        height: canvas.height(),
    })
}
