//! Preview grid.
//!
//! Projects a [`BatchState`] onto tiles: one per descriptor, in batch order,
//! each showing the preview image and its caption. Rendering is always a
//! full replace; nothing here keeps state between renders.
//!
//! Two surfaces consume the tiles:
//! - [`render_page`] builds a standalone HTML page (the CLI writes it as
//!   `preview.html`). Images load lazily with `crossorigin="anonymous"` so
//!   a browser can read their pixels back.
//! - [`crate::output::format_tiles`] lists them on the terminal.
//!
//! HTML is produced with [maud](https://maud.lambda.xyz/), so captions coming
//! from a remote API are escaped.

use crate::types::BatchState;
use maud::{DOCTYPE, Markup, html};

/// File name of the HTML preview written next to exports.
pub const PREVIEW_FILENAME: &str = "preview.html";

const CSS: &str = "\
body{margin:0;padding:1.5rem;background:#0b1024;color:#e6e8f2;font-family:system-ui,sans-serif}\
h1{font-size:1rem;font-weight:600;margin:0 0 1rem}\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(200px,1fr));gap:12px}\
.tile{margin:0;background:#141a38;border-radius:18px;overflow:hidden}\
.tile img{display:block;width:100%;aspect-ratio:1/1;object-fit:cover}\
.cap{padding:.4rem .6rem;font-size:.8rem;color:#9aa3c7;min-height:1em}\
.empty{color:#9aa3c7}";

/// One displayed image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    /// 1-based position in the batch
    pub index: usize,
    pub src: String,
    pub caption: String,
    pub alt: String,
}

/// One tile per descriptor, same order.
pub fn tiles(batch: &BatchState) -> Vec<Tile> {
    batch
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| Tile {
            index: i + 1,
            src: item.preview_url.clone(),
            caption: item.caption.clone(),
            alt: if item.caption.is_empty() {
                "Image".to_string()
            } else {
                item.caption.clone()
            },
        })
        .collect()
}

fn render_tile(tile: &Tile) -> Markup {
    html! {
        figure.tile {
            img src=(tile.src) alt=(tile.alt) loading="lazy" crossorigin="anonymous";
            figcaption.cap { (tile.caption) }
        }
    }
}

/// Standalone HTML page for the whole batch.
pub fn render_page(batch: &BatchState) -> String {
    let tiles = tiles(batch);
    let heading = format!("{} images at {}px", tiles.len(), batch.output_size);
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Photo batch" }
                style { (CSS) }
            }
            body {
                h1 { (heading) }
                @if tiles.is_empty() {
                    p.empty { "Nothing rendered yet." }
                } @else {
                    main.grid {
                        @for tile in &tiles {
                            (render_tile(tile))
                        }
                    }
                }
            }
        }
    }
    .into_string()
}
