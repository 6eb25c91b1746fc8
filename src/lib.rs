//! # photo-batch
//!
//! Fetch a batch of square photos, preview them, and export them either as a
//! zip of full-resolution files or as a single collage PNG.
//!
//! # Workflow
//!
//! ```text
//! 1. Render    source + query + count  →  batch      (descriptors, no pixels)
//! 2. Zip       batch                   →  photos_N_SIZE.zip
//! 3. Collage   batch                   →  collage_N_CELL.png
//! ```
//!
//! A batch only holds URLs and captions. Images are downloaded when an export
//! needs them: full-resolution files for the zip, 400×400 previews for the
//! collage. The CLI keeps the batch between commands as `batch.json` in its
//! temp directory, so `render` can be followed by any number of exports.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`provider`] | Builds a batch from the placeholder service or the photo search API |
//! | [`session`] | UI-agnostic controller: current batch, command handlers, in-flight guards |
//! | [`grid`] | Preview tiles and the standalone HTML preview page |
//! | [`archive`] | Sequential full-resolution download into a zip |
//! | [`collage`] | Parallel preview load, grid layout, rounded-cell composition, PNG encode |
//! | [`transport`] | `Transport` trait (HTTP GET seam) and the reqwest implementation |
//! | [`config`] | `config.toml` loading over stock defaults, validation |
//! | [`types`] | Shared types: `ImageDescriptor`, `BatchState`, `Source` |
//! | [`naming`] | Output filename conventions |
//! | [`notice`] | Status notices reported while commands run |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Exports Return Bytes
//!
//! Export commands return the finished file (`filename` + `bytes`) instead of
//! writing it. Saving is left to the front end.
//!
//! ## Partial Failure Is Normal
//!
//! A batch of sixty remote images will rarely download cleanly. The zip skips
//! failed items and keeps the original numbering; the collage draws whatever
//! previews loaded. A failed search page aborts the whole render and leaves
//! the batch empty.
//!
//! ## Blocking I/O
//!
//! Everything is a sequence of plain blocking calls, except collage preview
//! loads which fan out on rayon. There is no async runtime to carry.

pub mod archive;
pub mod collage;
pub mod config;
pub mod grid;
pub mod naming;
pub mod notice;
pub mod output;
pub mod provider;
pub mod session;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
