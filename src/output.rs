//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Tiles lead with their positional index and caption; URLs follow as
//! indented context lines. Notices are one line each, except per-item
//! failures, which add the failing URL underneath.
//!
//! ```text
//! 001 by Jane Doe
//!     Preview: https://images.example/abc?w=400&h=400&fit=crop
//! 002 (untitled)
//!     Preview: https://images.example/def?w=400&h=400&fit=crop
//!
//! Packed 3/5
//! Skipped 004
//!     https://images.example/ghi?w=1000&h=1000&fit=crop (HTTP 404)
//! ZIP ready: photos_5_1000.zip (4 files)
//! ```
//!
//! # Architecture
//!
//! Each `format_*` function returns `Vec<String>` and is pure; the `print_*`
//! wrappers write to stdout.

use crate::grid::Tile;
use crate::notice::Notice;
use crate::types::Source;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn source_label(source: Source) -> &'static str {
    match source {
        Source::Placeholder => "placeholder images",
        Source::Search => "search",
    }
}

/// Format a notice as display lines.
pub fn format_notice(notice: &Notice) -> Vec<String> {
    match notice {
        Notice::MissingSearchInput => vec!["Enter a search query and API key".to_string()],
        Notice::SearchLoaded { count } => vec![format!("Loaded {} results from search", count)],
        Notice::FetchFailed { source, reason } => {
            vec![format!("Loading {} failed: {}", source_label(*source), reason)]
        }
        Notice::Rendered { count, .. } => vec![format!("Rendered preview ({} images)", count)],
        Notice::RenderFirst => vec!["Render first".to_string()],
        Notice::Packed { done, total } => vec![format!("Packed {}/{}", done, total)],
        Notice::ItemFailed { index, url, reason } => vec![
            format!("Skipped {}", format_index(index + 1)),
            format!("    {} ({})", url, reason),
        ],
        Notice::ArchiveReady { filename, entries } => {
            vec![format!("ZIP ready: {} ({} files)", filename, entries)]
        }
        Notice::NoPreviewLoaded => vec!["Could not load any preview".to_string()],
        Notice::CollageSaved { filename, images } => {
            vec![format!("Collage saved: {} ({} images)", filename, images)]
        }
        Notice::ExportBlocked { reason } => vec![format!("Export blocked: {}", reason)],
        Notice::Busy { operation } => vec![format!("{} already running", operation.label())],
    }
}

/// Format the preview tiles.
pub fn format_tiles(tiles: &[Tile]) -> Vec<String> {
    let mut lines = Vec::new();
    for tile in tiles {
        let caption = if tile.caption.is_empty() {
            "(untitled)"
        } else {
            tile.caption.as_str()
        };
        lines.push(format!("{} {}", format_index(tile.index), caption));
        lines.push(format!("    Preview: {}", tile.src));
    }
    lines
}

/// Format the line reporting a saved file.
pub fn format_saved(path: &std::path::Path, bytes: usize) -> String {
    format!("Wrote {} ({} bytes)", path.display(), bytes)
}

pub fn print_notice(notice: &Notice) {
    for line in format_notice(notice) {
        println!("{}", line);
    }
}

pub fn print_tiles(tiles: &[Tile]) {
    for line in format_tiles(tiles) {
        println!("{}", line);
    }
}
