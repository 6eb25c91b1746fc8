//! Paginated photo search.
//!
//! `GET {base}/search/photos?query=..&per_page=..&page=..` with an
//! `Authorization: Client-ID {key}` header. Pages are requested one after
//! another until one of:
//!
//! - enough results have accumulated,
//! - a page comes back empty,
//! - a page comes back shorter than `per_page` (end of results).
//!
//! Any non-success status aborts the whole fetch; no partial batch is kept.

use super::{ProviderError, SearchInput};
use crate::transport::{Request, Transport};
use crate::types::{ImageDescriptor, PREVIEW_SIZE};
use serde::Deserialize;

/// Largest page the API serves.
pub const MAX_PER_PAGE: usize = 30;

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Option<Vec<SearchHit>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub urls: HitUrls,
    #[serde(default)]
    pub user: Option<HitUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HitUrls {
    pub raw: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HitUser {
    #[serde(default)]
    pub name: Option<String>,
}

/// URL of one result page.
pub fn page_url(
    base: &str,
    query: &str,
    per_page: usize,
    page: u32,
) -> Result<String, ProviderError> {
    let endpoint = format!("{}/search/photos", base.trim_end_matches('/'));
    let url = reqwest::Url::parse_with_params(
        &endpoint,
        &[
            ("query", query.to_string()),
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ],
    )
    .map_err(|e| ProviderError::InvalidUrl(format!("{endpoint}: {e}")))?;
    Ok(url.to_string())
}

/// Raw image URL cropped to a `size`×`size` square.
pub fn sized_url(raw: &str, size: u32) -> String {
    let separator = if raw.contains('?') { '&' } else { '?' };
    format!("{raw}{separator}w={size}&h={size}&fit=crop")
}

/// `"by <name>"` when the hit has an author name, otherwise empty.
pub fn caption(hit: &SearchHit) -> String {
    match hit.user.as_ref().and_then(|u| u.name.as_deref()) {
        Some(name) if !name.is_empty() => format!("by {name}"),
        _ => String::new(),
    }
}

pub fn descriptor(hit: &SearchHit, size: u32) -> ImageDescriptor {
    ImageDescriptor {
        preview_url: sized_url(&hit.urls.raw, PREVIEW_SIZE),
        download_url: sized_url(&hit.urls.raw, size),
        caption: caption(hit),
    }
}

/// Collect up to `count` hits, one page at a time.
pub fn collect_hits(
    transport: &impl Transport,
    base: &str,
    input: SearchInput<'_>,
    count: usize,
) -> Result<Vec<SearchHit>, ProviderError> {
    let per_page = count.min(MAX_PER_PAGE);
    let authorization = format!("Client-ID {}", input.api_key);
    let mut hits = Vec::with_capacity(count);
    let mut page = 1u32;

    while hits.len() < count {
        let request = Request::get(page_url(base, input.query, per_page, page)?)
            .header("Authorization", authorization.as_str());
        let response = transport.get(&request)?;
        if !response.is_success() {
            return Err(ProviderError::Status {
                page,
                status: response.status,
            });
        }
        let batch = serde_json::from_slice::<SearchPage>(&response.body)
            .map_err(|source| ProviderError::Decode { page, source })?
            .results
            .unwrap_or_default();

        if batch.is_empty() {
            break;
        }
        let short_page = batch.len() < per_page;
        hits.extend(batch);
        if short_page {
            break;
        }
        page += 1;
    }

    hits.truncate(count);
    Ok(hits)
}

/// Search and map hits to descriptors.
pub fn fetch(
    transport: &impl Transport,
    base: &str,
    input: SearchInput<'_>,
    count: usize,
    size: u32,
) -> Result<Vec<ImageDescriptor>, ProviderError> {
    let hits = collect_hits(transport, base, input, count)?;
    Ok(hits.iter().map(|hit| descriptor(hit, size)).collect())
}
