//! UI-agnostic controller.
//!
//! A [`Session`] owns everything one user's workflow needs: the transport,
//! the effective config, and the current batch snapshot. Front ends call
//! three command handlers:
//!
//! | Command | Reads | Writes | Result |
//! |---|---|---|---|
//! | [`Session::render`] | request | batch | new batch snapshot |
//! | [`Session::export_archive`] | batch snapshot | - | zip bytes |
//! | [`Session::export_collage`] | batch snapshot | - | PNG bytes |
//!
//! ## Batch lifecycle
//!
//! The batch lives behind an `Arc` that is swapped, never mutated. An export
//! clones the `Arc` once at its start and works on that snapshot, so it never
//! sees a half-built batch even if a render runs meanwhile.
//!
//! A render first validates its input (search needs query and key); a
//! validation failure leaves the batch untouched. After that the batch is
//! reset to empty and only replaced once the whole fetch succeeds, so a
//! failed search leaves an empty batch rather than a partial one.
//!
//! ## Re-entrancy
//!
//! Each command has its own in-flight flag. Invoking a command while the
//! same command is still running returns [`SessionError::Busy`]; different
//! commands may overlap.

use crate::archive::{self, ArchiveError};
use crate::collage::{self, CollageError, CollageStyle};
use crate::config::{ConfigError, StudioConfig};
use crate::notice::{Notice, Operation, emit};
use crate::provider::{self, Endpoints, FetchParams, ProviderError};
use crate::transport::Transport;
use crate::types::{BatchState, DEFAULT_OUTPUT_SIZE, Source, size_or_default};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("enter a search query and an API key")]
    MissingSearchInput,
    #[error("{} is already running", .0.label())]
    Busy(Operation),
    #[error("render a batch first")]
    EmptyBatch,
    #[error(transparent)]
    Provider(ProviderError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Collage(#[from] CollageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Inputs of one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub source: Source,
    pub query: String,
    pub api_key: String,
    /// Clamped to 1..=60 at dispatch
    pub count: u32,
    /// `None` or zero means 1000
    pub size: Option<u32>,
}

impl RenderRequest {
    /// Request built from the `[batch]` and `[search]` config sections.
    pub fn from_config(config: &StudioConfig) -> Self {
        Self {
            source: config.batch.source,
            query: config.search.query.clone(),
            api_key: config.search.api_key.clone(),
            count: config.batch.count,
            size: Some(config.batch.size),
        }
    }
}

/// A produced file. Saving it is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Archive entries or collage images actually included
    pub included: usize,
}

/// One in-flight flag.
#[derive(Default)]
struct InFlight(AtomicBool);

/// Clears its flag on drop.
struct FlightGuard<'a>(&'a AtomicBool);

impl InFlight {
    fn try_begin(&self) -> Option<FlightGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard(&self.0))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Session<T: Transport> {
    transport: T,
    config: StudioConfig,
    endpoints: Endpoints,
    batch: RwLock<Arc<BatchState>>,
    notices: Option<Sender<Notice>>,
    rendering: InFlight,
    archiving: InFlight,
    composing: InFlight,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, config: StudioConfig) -> Self {
        let endpoints = Endpoints::from_config(&config);
        Self {
            transport,
            config,
            endpoints,
            batch: RwLock::new(Arc::new(BatchState::default())),
            notices: None,
            rendering: InFlight::default(),
            archiving: InFlight::default(),
            composing: InFlight::default(),
        }
    }

    /// Report notices to `tx`.
    pub fn with_notices(mut self, tx: Sender<Notice>) -> Self {
        self.notices = Some(tx);
        self
    }

    /// Start from a previously rendered batch.
    pub fn with_batch(self, batch: BatchState) -> Self {
        self.install(batch);
        self
    }

    /// Current batch snapshot.
    pub fn batch(&self) -> Arc<BatchState> {
        self.batch
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn install(&self, batch: BatchState) -> Arc<BatchState> {
        let batch = Arc::new(batch);
        *self.batch.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&batch);
        batch
    }

    fn notify(&self, notice: Notice) {
        emit(self.notices.as_ref(), notice);
    }

    fn begin<'a>(&self, flag: &'a InFlight, operation: Operation) -> Result<FlightGuard<'a>, SessionError> {
        flag.try_begin().ok_or_else(|| {
            self.notify(Notice::Busy { operation });
            SessionError::Busy(operation)
        })
    }

    /// Fetch a new batch and make it current.
    pub fn render(&self, request: &RenderRequest) -> Result<Arc<BatchState>, SessionError> {
        let _guard = self.begin(&self.rendering, Operation::Render)?;

        let params = FetchParams {
            query: request.query.clone(),
            api_key: request.api_key.clone(),
            output_size: size_or_default(request.size, DEFAULT_OUTPUT_SIZE),
        };
        if request.source == Source::Search && provider::search_input(&params).is_err() {
            self.notify(Notice::MissingSearchInput);
            return Err(SessionError::MissingSearchInput);
        }

        self.install(BatchState::empty(params.output_size));

        let items = provider::fetch_batch(
            &self.transport,
            &self.endpoints,
            request.source,
            &params,
            request.count,
        )
        .map_err(|e| {
            self.notify(Notice::FetchFailed {
                source: request.source,
                reason: e.to_string(),
            });
            SessionError::Provider(e)
        })?;

        let count = items.len();
        let batch = self.install(BatchState::new(items, params.output_size));
        if request.source == Source::Search {
            self.notify(Notice::SearchLoaded { count });
        }
        self.notify(Notice::Rendered {
            source: request.source,
            count,
        });
        Ok(batch)
    }

    fn snapshot_for_export(&self) -> Result<Arc<BatchState>, SessionError> {
        let batch = self.batch();
        if batch.is_empty() {
            self.notify(Notice::RenderFirst);
            return Err(SessionError::EmptyBatch);
        }
        Ok(batch)
    }

    /// Download the current batch at full size and pack it into a zip.
    pub fn export_archive(&self) -> Result<Export, SessionError> {
        let _guard = self.begin(&self.archiving, Operation::Archive)?;
        let batch = self.snapshot_for_export()?;

        let export = archive::export_archive(&self.transport, &batch, self.notices.as_ref())
            .map_err(|e| self.archive_failed(e))?;
        self.notify(Notice::ArchiveReady {
            filename: export.filename.clone(),
            entries: export.entries.len(),
        });
        Ok(Export {
            filename: export.filename,
            bytes: export.bytes,
            included: export.entries.len(),
        })
    }

    fn archive_failed(&self, e: ArchiveError) -> SessionError {
        match &e {
            ArchiveError::EmptyBatch => self.notify(Notice::RenderFirst),
            ArchiveError::Zip(_) | ArchiveError::Io(_) => self.notify(Notice::ExportBlocked {
                reason: e.to_string(),
            }),
        }
        SessionError::Archive(e)
    }

    /// Compose the current batch's previews into one PNG.
    ///
    /// `cell` overrides the configured cell size for this export only.
    pub fn export_collage(&self, cell: Option<u32>) -> Result<Export, SessionError> {
        let _guard = self.begin(&self.composing, Operation::Collage)?;
        let batch = self.snapshot_for_export()?;
        let style = CollageStyle::from_config(&self.config.collage, cell)?;

        let export = collage::export_collage(&self.transport, &batch, &style).map_err(|e| {
            match &e {
                CollageError::NoPreviewLoaded { .. } => self.notify(Notice::NoPreviewLoaded),
                CollageError::ExportBlocked(reason) => self.notify(Notice::ExportBlocked {
                    reason: reason.clone(),
                }),
                CollageError::TooLarge { .. } => self.notify(Notice::ExportBlocked {
                    reason: e.to_string(),
                }),
                CollageError::EmptyBatch => self.notify(Notice::RenderFirst),
            }
            SessionError::Collage(e)
        })?;

        self.notify(Notice::CollageSaved {
            filename: export.filename.clone(),
            images: export.images,
        });
        Ok(Export {
            filename: export.filename,
            bytes: export.bytes,
            included: export.images,
        })
    }
}
