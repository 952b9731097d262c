//! Progress-callback trait for per-document extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through the XML folder.
//!
//! # Example
//!
//! ```rust
//! use xml_media_extract::{ExtractionConfig, ExtractionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     found: Arc<AtomicUsize>,
//! }
//!
//! impl ExtractionProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, file_name: &str, media_found: usize) {
//!         self.found.fetch_add(media_found, Ordering::SeqCst);
//!         eprintln!("{file_name}: {media_found} media nodes");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     found: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ExtractionConfig::builder()
//!     .xml_folder("pages")
//!     .output_folder("out")
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::ExtractionStats;
use std::sync::Arc;

/// Called by the extraction pipeline as it processes each document.
///
/// The pipeline is sequential, but the trait is `Send + Sync` so a callback
/// can be shared with a pipeline running under `spawn_blocking`. All methods
/// have default no-op implementations.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once after the XML folder has been listed.
    ///
    /// # Arguments
    /// * `total_documents`: number of `*.xml` files that will be processed
    fn on_extraction_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called just before a document is parsed.
    fn on_document_start(&self, file_name: &str) {
        let _ = file_name;
    }

    /// Called when a document parsed successfully.
    ///
    /// # Arguments
    /// * `file_name`: document file name within the XML folder
    /// * `media_found`: media nodes with a `src` found in it (duplicates included)
    fn on_document_complete(&self, file_name: &str, media_found: usize) {
        let _ = (file_name, media_found);
    }

    /// Called when a document could not be read or parsed.
    fn on_document_error(&self, file_name: &str, error: &str) {
        let _ = (file_name, error);
    }

    /// Called during the copy stage for each referenced file that is absent.
    fn on_media_missing(&self, filename: &str) {
        let _ = filename;
    }

    /// Called once after the report has been written.
    fn on_extraction_complete(&self, stats: &ExtractionStats) {
        let _ = stats;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        started_total: Arc<AtomicUsize>,
        completes: Arc<AtomicUsize>,
        errors: Arc<AtomicUsize>,
        media: Arc<AtomicUsize>,
    }

    impl ExtractionProgressCallback for TrackingCallback {
        fn on_extraction_start(&self, total_documents: usize) {
            self.started_total.store(total_documents, Ordering::SeqCst);
        }

        fn on_document_complete(&self, _file_name: &str, media_found: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
            self.media.fetch_add(media_found, Ordering::SeqCst);
        }

        fn on_document_error(&self, _file_name: &str, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_extraction_start(2);
        cb.on_document_start("a.xml");
        cb.on_document_complete("a.xml", 3);
        cb.on_document_error("b.xml", "mismatched tag");
        cb.on_media_missing("cover.jpg");
        cb.on_extraction_complete(&ExtractionStats::default());
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            started_total: Arc::new(AtomicUsize::new(0)),
            completes: Arc::new(AtomicUsize::new(0)),
            errors: Arc::new(AtomicUsize::new(0)),
            media: Arc::new(AtomicUsize::new(0)),
        };

        tracker.on_extraction_start(3);
        tracker.on_document_complete("1.xml", 2);
        tracker.on_document_complete("2.xml", 5);
        tracker.on_document_error("3.xml", "unexpected end of stream");

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.media.load(Ordering::SeqCst), 7);
    }
}
