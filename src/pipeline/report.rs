//! Human-readable extraction report.
//!
//! The report is accumulated in memory while the pipeline runs and written
//! to `media_extraction_report.txt` once at the end. Every recoverable
//! failure (broken book XML, unparseable document, missing media file) ends
//! up here as a line of text.

use crate::error::DocumentError;
use crate::output::{CopySummary, DocumentResult, MediaCounts};
use std::fmt::Write as _;
use std::path::Path;

/// Builds the report text section by section.
#[derive(Debug)]
pub struct ReportBuilder {
    text: String,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportBuilder {
    /// Start a report with its title block.
    pub fn new() -> Self {
        Self {
            text: String::from("XML Media Extraction Report\n==========================\n\n"),
        }
    }

    /// Outcome of loading the book XML.
    pub fn title_index_loaded(&mut self, mappings: usize) {
        let _ = writeln!(self.text, "Loaded {mappings} page mappings from book XML.\n");
    }

    pub fn title_index_missing(&mut self, path: &Path) {
        let _ = writeln!(self.text, "Book XML not found: {}\n", path.display());
    }

    pub fn title_index_failed(&mut self, error: &DocumentError) {
        let _ = writeln!(self.text, "Error loading book XML: {error}\n");
    }

    /// The XML folder itself could not be listed.
    pub fn folder_unreadable(&mut self, path: &Path, error: &std::io::Error) {
        let _ = writeln!(self.text, "Error reading XML folder {}: {error}\n", path.display());
    }

    pub fn documents_found(&mut self, count: usize) {
        let _ = writeln!(self.text, "Found {count} XML files to process.\n");
    }

    /// Per-document block: an error line, or one entry per media item.
    ///
    /// Documents without media produce no output.
    pub fn document(&mut self, doc: &DocumentResult) {
        if let Some(ref error) = doc.error {
            let _ = writeln!(self.text, "Error processing {}: {error}\n", doc.file_name);
            return;
        }
        if doc.media.is_empty() {
            return;
        }

        let _ = writeln!(self.text, "File: {}", doc.file_name);
        for m in &doc.media {
            let _ = writeln!(self.text, "  - {}: {} (src: {})", m.media_type, m.title, m.source);
            let _ = writeln!(
                self.text,
                "    Page: {} (ID: {})",
                m.page_title,
                m.page_id.as_deref().unwrap_or("none")
            );
        }
        self.text.push('\n');
    }

    /// Totals over the distinct, sorted references.
    pub fn summary(&mut self, counts: &MediaCounts) {
        self.text.push_str("\nSummary\n=======\n");
        let _ = writeln!(self.text, "Total media files referenced: {}", counts.total());
        let _ = writeln!(self.text, "Images: {}", counts.images);
        let _ = writeln!(self.text, "Videos: {}", counts.videos);
        let _ = writeln!(self.text, "Audio: {}\n", counts.audio);
    }

    pub fn csv_written(&mut self, path: &Path) {
        let _ = writeln!(
            self.text,
            "CSV export of all media references created at: {}",
            path.display()
        );
    }

    pub fn media_folder_missing(&mut self, path: &Path) {
        let _ = writeln!(self.text, "\nMedia folder not found: {}", path.display());
    }

    /// The copy-stage section: missing files, failures and the two counters.
    pub fn copy_results(&mut self, summary: &CopySummary) {
        self.text.push_str("\nMedia File Copy Results\n=====================\n");
        for name in &summary.missing_files {
            let _ = writeln!(self.text, "Missing media file: {name}");
        }
        for failure in &summary.failed_files {
            let _ = writeln!(self.text, "Failed to copy media file: {failure}");
        }
        let _ = writeln!(
            self.text,
            "\nCopied {} media files to {}",
            summary.copied,
            summary.media_output_dir.display()
        );
        let _ = writeln!(self.text, "Missing media files: {}", summary.missing);
        if summary.failed > 0 {
            let _ = writeln!(self.text, "Failed media copies: {}", summary.failed);
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn finish(self) -> String {
        self.text
    }
}
