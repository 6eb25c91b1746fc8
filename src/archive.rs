//! Zip export of full-resolution images.
//!
//! Downloads every descriptor's `download_url` strictly in batch order, one
//! at a time, and packs the successes into a single zip held in memory.
//! A failed download is reported and skipped; it never aborts the batch.
//! Entry names keep the original batch index, so gaps show which items
//! were skipped:
//!
//! ```text
//! photos_5_1000.zip
//! ├── photo_01_1000.jpg
//! ├── photo_02_1000.jpg
//! ├── photo_04_1000.png      # item 3 failed
//! └── photo_05_1000.jpg
//! ```
//!
//! Entries are stored uncompressed: the payloads are already JPEG/PNG.

use crate::naming::{archive_entry_name, archive_filename, extension_for_content_type};
use crate::notice::{Notice, emit};
use crate::transport::{Request, Transport};
use crate::types::BatchState;
use std::io::{Cursor, Write};
use std::sync::mpsc::Sender;
use thiserror::Error;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// A progress notice goes out after every this-many successful downloads.
pub const PROGRESS_EVERY: usize = 3;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("nothing to export: the batch is empty")]
    EmptyBatch,
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A finished archive, ready to be saved by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveExport {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Entry names in the order they were added
    pub entries: Vec<String>,
    /// 0-based batch indices that were skipped
    pub skipped: Vec<usize>,
}

fn download(transport: &impl Transport, url: &str) -> Result<(Option<String>, Vec<u8>), String> {
    let request = Request::get(url).header("Cache-Control", "no-store");
    let response = transport.get(&request).map_err(|e| e.to_string())?;
    if !response.is_success() {
        return Err(format!("HTTP {}", response.status));
    }
    Ok((response.content_type, response.body))
}

/// Download and pack the batch.
///
/// Only an empty batch or a zip writer failure is an error. If every
/// download fails the result is a valid, empty archive.
pub fn export_archive(
    transport: &impl Transport,
    batch: &BatchState,
    notices: Option<&Sender<Notice>>,
) -> Result<ArchiveExport, ArchiveError> {
    if batch.is_empty() {
        return Err(ArchiveError::EmptyBatch);
    }

    let total = batch.len();
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut entries = Vec::with_capacity(total);
    let mut skipped = Vec::new();

    for (index, item) in batch.items.iter().enumerate() {
        let (content_type, body) = match download(transport, &item.download_url) {
            Ok(payload) => payload,
            Err(reason) => {
                emit(
                    notices,
                    Notice::ItemFailed {
                        index,
                        url: item.download_url.clone(),
                        reason,
                    },
                );
                skipped.push(index);
                continue;
            }
        };

        let name = archive_entry_name(
            index,
            batch.output_size,
            extension_for_content_type(content_type.as_deref()),
        );
        writer.start_file(name.as_str(), options)?;
        writer.write_all(&body)?;
        entries.push(name);

        if entries.len() % PROGRESS_EVERY == 0 {
            emit(
                notices,
                Notice::Packed {
                    done: entries.len(),
                    total,
                },
            );
        }
    }

    let bytes = writer.finish()?.into_inner();
    Ok(ArchiveExport {
        filename: archive_filename(total, batch.output_size),
        bytes,
        entries,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{batch_of, zip_entry_names};
    use crate::transport::tests::MockTransport;
    use std::sync::mpsc;

    fn script_all(transport: &MockTransport, batch: &BatchState) {
        for item in &batch.items {
            transport.respond_ok(&item.download_url, "image/jpeg", b"jpeg-bytes".to_vec());
        }
    }

    #[test]
    fn empty_batch_is_rejected() {
        let transport = MockTransport::new();
        let result = export_archive(&transport, &BatchState::default(), None);
        assert!(matches!(result, Err(ArchiveError::EmptyBatch)));
        assert!(transport.get_requests().is_empty());
    }

    #[test]
    fn packs_every_success_in_order() {
        let batch = batch_of(4, 1000);
        let transport = MockTransport::new();
        script_all(&transport, &batch);

        let export = export_archive(&transport, &batch, None).unwrap();
        assert_eq!(export.filename, "photos_4_1000.zip");
        assert_eq!(
            export.entries,
            vec![
                "photo_01_1000.jpg",
                "photo_02_1000.jpg",
                "photo_03_1000.jpg",
                "photo_04_1000.jpg"
            ]
        );
        assert_eq!(zip_entry_names(&export.bytes), export.entries);
        assert!(export.skipped.is_empty());
    }

    #[test]
    fn fetches_sequentially_in_batch_order_without_cache() {
        let batch = batch_of(3, 1000);
        let transport = MockTransport::new();
        script_all(&transport, &batch);
        export_archive(&transport, &batch, None).unwrap();

        let requests = transport.get_requests();
        let urls: Vec<_> = requests.iter().map(|r| r.url.clone()).collect();
        let expected: Vec<_> = batch.items.iter().map(|i| i.download_url.clone()).collect();
        assert_eq!(urls, expected);
        assert!(
            requests
                .iter()
                .all(|r| r.headers.contains(&("Cache-Control".into(), "no-store".into())))
        );
    }

    #[test]
    fn failed_item_is_skipped_and_index_preserved() {
        let batch = batch_of(5, 1000);
        let transport = MockTransport::new();
        script_all(&transport, &batch);
        transport.respond_status(&batch.items[2].download_url, 404);

        let (tx, rx) = mpsc::channel();
        let export = export_archive(&transport, &batch, Some(&tx)).unwrap();
        drop(tx);

        assert_eq!(export.filename, "photos_5_1000.zip");
        assert_eq!(
            zip_entry_names(&export.bytes),
            vec![
                "photo_01_1000.jpg",
                "photo_02_1000.jpg",
                "photo_04_1000.jpg",
                "photo_05_1000.jpg"
            ]
        );
        assert_eq!(export.skipped, vec![2]);

        let notices: Vec<_> = rx.iter().collect();
        assert!(notices.iter().any(|n| matches!(
            n,
            Notice::ItemFailed { index: 2, reason, .. } if reason == "HTTP 404"
        )));
    }

    #[test]
    fn png_content_type_gets_png_extension() {
        let batch = batch_of(2, 640);
        let transport = MockTransport::new();
        transport.respond_ok(&batch.items[0].download_url, "image/png", vec![1]);
        transport.respond(
            &batch.items[1].download_url,
            crate::transport::Response {
                status: 200,
                content_type: None,
                body: vec![2],
            },
        );

        let export = export_archive(&transport, &batch, None).unwrap();
        assert_eq!(export.entries, vec!["photo_01_640.png", "photo_02_640.jpg"]);
    }

    #[test]
    fn progress_every_third_success() {
        let batch = batch_of(7, 1000);
        let transport = MockTransport::new();
        script_all(&transport, &batch);

        let (tx, rx) = mpsc::channel();
        export_archive(&transport, &batch, Some(&tx)).unwrap();
        drop(tx);

        let packed: Vec<_> = rx
            .iter()
            .filter_map(|n| match n {
                Notice::Packed { done, total } => Some((done, total)),
                _ => None,
            })
            .collect();
        assert_eq!(packed, vec![(3, 7), (6, 7)]);
    }

    #[test]
    fn all_failures_produce_empty_archive() {
        let batch = batch_of(3, 1000);
        let transport = MockTransport::new();

        let export = export_archive(&transport, &batch, None).unwrap();
        assert!(export.entries.is_empty());
        assert_eq!(export.skipped, vec![0, 1, 2]);
        assert!(zip_entry_names(&export.bytes).is_empty());
        assert_eq!(export.filename, "photos_3_1000.zip");
    }

    #[test]
    fn stored_bytes_are_unchanged() {
        use std::io::Read;

        let batch = batch_of(1, 1000);
        let transport = MockTransport::new();
        transport.respond_ok(&batch.items[0].download_url, "image/jpeg", b"payload".to_vec());

        let export = export_archive(&transport, &batch, None).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(export.bytes)).unwrap();
        let mut file = archive.by_name("photo_01_1000.jpg").unwrap();
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"payload");
    }
}
