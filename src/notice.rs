//! Status notices emitted by the session.
//!
//! These are the only thing that crosses to the user: short, human-readable
//! events. Typed errors are still returned to library callers; notices are
//! the parallel channel a front end displays. They travel over an
//! `mpsc::Sender` so the CLI can print them as they happen.

use crate::types::Source;
use std::sync::mpsc::Sender;

/// Operations guarded against concurrent re-invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Render,
    Archive,
    Collage,
}

impl Operation {
    pub fn label(self) -> &'static str {
        match self {
            Operation::Render => "render",
            Operation::Archive => "archive export",
            Operation::Collage => "collage export",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Search source chosen without a query or key; nothing was fetched.
    MissingSearchInput,
    /// Search pages fetched successfully.
    SearchLoaded { count: usize },
    /// Building the batch failed; the render was aborted.
    FetchFailed { source: Source, reason: String },
    /// A new batch is in place.
    Rendered { source: Source, count: usize },
    /// An export was requested with no batch to export.
    RenderFirst,
    /// Archive progress, sent after every third successful download.
    Packed { done: usize, total: usize },
    /// One archive download failed and was skipped.
    ItemFailed {
        index: usize,
        url: String,
        reason: String,
    },
    /// Archive finalized.
    ArchiveReady { filename: String, entries: usize },
    /// None of the collage previews could be loaded.
    NoPreviewLoaded,
    /// Collage encoded.
    CollageSaved { filename: String, images: usize },
    /// The composed collage could not be encoded.
    ExportBlocked { reason: String },
    /// The operation is already running.
    Busy { operation: Operation },
}

/// Send a notice if anyone is listening. A dropped receiver is not an error.
pub(crate) fn emit(sender: Option<&Sender<Notice>>, notice: Notice) {
    if let Some(tx) = sender {
        tx.send(notice).ok();
    }
}
