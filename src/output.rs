//! Result types produced by an extraction run.
//!
//! Everything here is plain data: it is built once by [`crate::extract`]
//! and handed back to the caller. All types are `serde`-serialisable so the
//! CLI can emit the whole run as JSON with `--json`.

use crate::error::DocumentError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Placeholder page title for documents with no resolvable title.
pub const UNKNOWN_PAGE: &str = "Unknown Page";

/// Placeholder media title for nodes without a `title` attribute.
pub const NO_TITLE: &str = "No Title";

/// Source path → reference, in insertion order until sorted.
pub type MediaReferences = IndexMap<String, MediaReference>;

/// The three media node kinds found in page documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Audio,
}

impl MediaType {
    /// All kinds, in the order documents are scanned for them.
    pub const ALL: [MediaType; 3] = [MediaType::Image, MediaType::Video, MediaType::Audio];

    /// Lower-case name used in the report and the CSV.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }

    /// XML element name carrying this kind of media.
    pub fn node_name(self) -> &'static str {
        match self {
            MediaType::Image => "image_node",
            MediaType::Video => "video_node",
            MediaType::Audio => "audio_node",
        }
    }

    /// Folder under `media/` that holds copies of this kind (`images`, `videos`, `audios`).
    pub fn folder_name(self) -> String {
        format!("{}s", self.as_str())
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One media node found in a page document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    /// Value of the node's `src` attribute; the mapping key.
    pub source: String,
    pub media_type: MediaType,
    /// Value of the node's `title` attribute, or [`NO_TITLE`].
    pub title: String,
    /// File name of the page document the reference came from.
    pub xml_file: String,
    /// Page id of that document, when one could be determined.
    pub page_id: Option<String>,
    /// Resolved page title (index document first, then embedded, then [`UNKNOWN_PAGE`]).
    pub page_title: String,
}

/// Outcome of processing a single page document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    /// File name within the XML folder.
    pub file_name: String,
    pub page_id: Option<String>,
    pub page_title: String,
    /// Media found in this document, in scan order (duplicates included).
    pub media: Vec<MediaReference>,
    /// Set when the document could not be read or parsed.
    pub error: Option<DocumentError>,
}

/// Per-type counts over a reference mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCounts {
    pub images: usize,
    pub videos: usize,
    pub audio: usize,
}

impl MediaCounts {
    /// Count the references in `refs` by media type.
    pub fn from_references(refs: &MediaReferences) -> Self {
        let mut counts = Self::default();
        for r in refs.values() {
            match r.media_type {
                MediaType::Image => counts.images += 1,
                MediaType::Video => counts.videos += 1,
                MediaType::Audio => counts.audio += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.images + self.videos + self.audio
    }
}

/// Results of the media-copy stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CopySummary {
    /// `<output>/media`, the root of the type tree.
    pub media_output_dir: PathBuf,
    /// References whose file was copied into both trees.
    pub copied: usize,
    /// References with no matching file in the media folder.
    pub missing: usize,
    /// References whose file existed but could not be copied.
    pub failed: usize,
    /// Basenames of the missing files, in sorted-reference order.
    pub missing_files: Vec<String>,
    /// One description per failed copy.
    pub failed_files: Vec<String>,
}

/// Aggregate statistics for one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// `*.xml` files found in the XML folder.
    pub documents_found: usize,
    /// Documents parsed successfully.
    pub documents_processed: usize,
    /// Documents skipped because they could not be read or parsed.
    pub documents_failed: usize,
    /// Page mappings loaded from the book XML (0 when absent or broken).
    pub title_mappings: usize,
    /// Distinct references by type.
    pub counts: MediaCounts,
    pub total_duration_ms: u64,
}

/// Everything produced by [`crate::extract`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Distinct references, sorted by page title.
    pub references: MediaReferences,
    /// One entry per document, in processing order.
    pub documents: Vec<DocumentResult>,
    /// Full text of `media_extraction_report.txt`.
    pub report: String,
    pub report_path: PathBuf,
    pub csv_path: PathBuf,
    pub stats: ExtractionStats,
    /// Present only when a media folder was supplied and exists.
    pub copy: Option<CopySummary>,
}
