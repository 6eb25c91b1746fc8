//! Provider adapter: turns a source, its parameters and a count into an
//! ordered list of [`ImageDescriptor`]s.
//!
//! | Source | Module | Network |
//! |---|---|---|
//! | Placeholder | [`placeholder`] | none while building the batch |
//! | Search | [`search`] | one GET per result page |
//!
//! The requested count is clamped to `1..=60` here, before either strategy
//! sees it.

pub mod placeholder;
pub mod search;

use crate::config::StudioConfig;
use crate::transport::{Transport, TransportError};
use crate::types::{ImageDescriptor, Source, clamp_count};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("search needs both a query and an API key")]
    MissingSearchInput,
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("search page {page} returned HTTP {status}")]
    Status { page: u32, status: u16 },
    #[error("search page {page} is not valid JSON: {source}")]
    Decode {
        page: u32,
        #[source]
        source: serde_json::Error,
    },
}

/// Base URLs of the two providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub placeholder: String,
    pub search: String,
}

impl Endpoints {
    pub fn from_config(config: &StudioConfig) -> Self {
        Self {
            placeholder: config.placeholder.base_url.clone(),
            search: config.search.base_url.clone(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::from_config(&StudioConfig::default())
    }
}

/// Per-render inputs besides source and count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchParams {
    pub query: String,
    pub api_key: String,
    /// Full-resolution square edge, already defaulted.
    pub output_size: u32,
}

/// Query and key after trimming, guaranteed non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchInput<'a> {
    pub query: &'a str,
    pub api_key: &'a str,
}

/// Check that search mode has what it needs, without touching the network.
pub fn search_input(params: &FetchParams) -> Result<SearchInput<'_>, ProviderError> {
    let query = params.query.trim();
    let api_key = params.api_key.trim();
    if query.is_empty() || api_key.is_empty() {
        return Err(ProviderError::MissingSearchInput);
    }
    Ok(SearchInput { query, api_key })
}

/// Build a batch from the given source.
///
/// Placeholder batches never fail on the network because nothing is fetched;
/// search batches fail on missing input, on any non-success page, or on a
/// page that does not decode.
pub fn fetch_batch(
    transport: &impl Transport,
    endpoints: &Endpoints,
    source: Source,
    params: &FetchParams,
    count: u32,
) -> Result<Vec<ImageDescriptor>, ProviderError> {
    let count = clamp_count(count);
    match source {
        Source::Placeholder => {
            placeholder::generate(&endpoints.placeholder, count as usize, params.output_size)
        }
        Source::Search => {
            let input = search_input(params)?;
            search::fetch(
                transport,
                &endpoints.search,
                input,
                count as usize,
                params.output_size,
            )
        }
    }
}
