//! Shared types passed between the provider, the session and the exporters.
//!
//! `BatchState` is also the on-disk handoff between CLI invocations
//! (`render` writes it, `zip` and `collage` read it back), so everything
//! here is serde-serializable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default full-resolution edge when the caller passes nothing (or zero).
pub const DEFAULT_OUTPUT_SIZE: u32 = 1000;

/// Default collage cell edge when the caller passes nothing (or zero).
pub const DEFAULT_CELL_SIZE: u32 = 512;

/// Fixed preview edge for every provider.
pub const PREVIEW_SIZE: u32 = 400;

/// Bounds applied to the requested item count before dispatch.
pub const MIN_COUNT: u32 = 1;
pub const MAX_COUNT: u32 = 60;

/// One image in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    /// 400×400 preview, shown in the grid and used for the collage
    pub preview_url: String,
    /// Square image at the batch's output size, packed into the archive
    pub download_url: String,
    /// Short display line; may be empty
    #[serde(default)]
    pub caption: String,
}

/// The result of the most recent completed render.
///
/// Never mutated in place: a render builds a new value and swaps it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchState {
    pub items: Vec<ImageDescriptor>,
    pub output_size: u32,
}

impl BatchState {
    pub fn new(items: Vec<ImageDescriptor>, output_size: u32) -> Self {
        Self { items, output_size }
    }

    /// An empty batch, as left behind by a reset or a failed fetch.
    pub fn empty(output_size: u32) -> Self {
        Self::new(Vec::new(), output_size)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl Default for BatchState {
    fn default() -> Self {
        Self::empty(DEFAULT_OUTPUT_SIZE)
    }
}

/// Where a batch comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Seeded placeholder images; no network needed to build the batch
    #[default]
    Placeholder,
    /// Paginated photo search API; needs a query and an access key
    Search,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Placeholder => f.write_str("placeholder"),
            Source::Search => f.write_str("search"),
        }
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "placeholder" | "picsum" => Ok(Source::Placeholder),
            "search" | "unsplash" => Ok(Source::Search),
            other => Err(format!(
                "unknown source '{other}' (expected 'placeholder' or 'search')"
            )),
        }
    }
}

/// Clamp a requested item count to `MIN_COUNT..=MAX_COUNT`.
///
/// Zero counts as "not given" and becomes one.
pub fn clamp_count(requested: u32) -> u32 {
    requested.clamp(MIN_COUNT, MAX_COUNT)
}

/// "Truthy or default": `None` and `Some(0)` both mean the default.
pub fn size_or_default(requested: Option<u32>, default: u32) -> u32 {
    match requested {
        Some(n) if n > 0 => n,
        _ => default,
    }
}
