//! Configuration types for an extraction run.
//!
//! All run inputs are collected in [`ExtractionConfig`], built via its
//! [`ExtractionConfigBuilder`]. Only the XML folder and the output folder are
//! required; the book XML and the media folder are optional stages.

use crate::error::MediaExtractError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::{Path, PathBuf};

/// File name of the human-readable report written into the output folder.
pub const REPORT_FILE_NAME: &str = "media_extraction_report.txt";

/// File name of the CSV export written into the output folder.
pub const CSV_FILE_NAME: &str = "media_references.csv";

/// Configuration for one extraction run.
///
/// # Example
/// ```rust
/// use xml_media_extract::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .xml_folder("pages")
///     .output_folder("out")
///     .book_xml("book.xml")
///     .build()
///     .unwrap();
/// assert!(config.media_folder.is_none());
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Folder containing the page documents (`*.xml`, top level only).
    pub xml_folder: PathBuf,

    /// Folder receiving the report, the CSV and the organised media.
    /// Created if it does not exist.
    pub output_folder: PathBuf,

    /// Optional book XML mapping page ids to canonical titles.
    pub book_xml: Option<PathBuf>,

    /// Optional flat folder holding the actual media files.
    /// When `None` (or missing on disk) the copy stage is skipped.
    pub media_folder: Option<PathBuf>,

    /// Optional per-document progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("xml_folder", &self.xml_folder)
            .field("output_folder", &self.output_folder)
            .field("book_xml", &self.book_xml)
            .field("media_folder", &self.media_folder)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder::default()
    }

    /// Path of the report file inside the output folder.
    pub fn report_path(&self) -> PathBuf {
        self.output_folder.join(REPORT_FILE_NAME)
    }

    /// Path of the CSV export inside the output folder.
    pub fn csv_path(&self) -> PathBuf {
        self.output_folder.join(CSV_FILE_NAME)
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Default)]
pub struct ExtractionConfigBuilder {
    xml_folder: Option<PathBuf>,
    output_folder: Option<PathBuf>,
    book_xml: Option<PathBuf>,
    media_folder: Option<PathBuf>,
    progress_callback: Option<ProgressCallback>,
}

impl ExtractionConfigBuilder {
    pub fn xml_folder(mut self, path: impl AsRef<Path>) -> Self {
        self.xml_folder = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn output_folder(mut self, path: impl AsRef<Path>) -> Self {
        self.output_folder = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn book_xml(mut self, path: impl AsRef<Path>) -> Self {
        self.book_xml = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn media_folder(mut self, path: impl AsRef<Path>) -> Self {
        self.media_folder = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating that the required folders are set.
    pub fn build(self) -> Result<ExtractionConfig, MediaExtractError> {
        let xml_folder = self
            .xml_folder
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| MediaExtractError::InvalidConfig("XML folder is required".into()))?;
        let output_folder = self
            .output_folder
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| MediaExtractError::InvalidConfig("Output folder is required".into()))?;

        Ok(ExtractionConfig {
            xml_folder,
            output_folder,
            book_xml: self.book_xml,
            media_folder: self.media_folder,
            progress_callback: self.progress_callback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_xml_folder() {
        let err = ExtractionConfig::builder()
            .output_folder("out")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("XML folder"), "got: {err}");
    }

    #[test]
    fn build_rejects_empty_output_folder() {
        let err = ExtractionConfig::builder()
            .xml_folder("pages")
            .output_folder("")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Output folder"), "got: {err}");
    }

    #[test]
    fn output_paths_live_in_output_folder() {
        let config = ExtractionConfig::builder()
            .xml_folder("pages")
            .output_folder("/tmp/out")
            .build()
            .unwrap();
        assert_eq!(
            config.report_path(),
            PathBuf::from("/tmp/out/media_extraction_report.txt")
        );
        assert_eq!(config.csv_path(), PathBuf::from("/tmp/out/media_references.csv"));
    }

    #[test]
    fn debug_hides_callback() {
        let config = ExtractionConfig::builder()
            .xml_folder("pages")
            .output_folder("out")
            .progress_callback(std::sync::Arc::new(crate::progress::NoopProgressCallback))
            .build()
            .unwrap();
        let dbg = format!("{config:?}");
        assert!(dbg.contains("<dyn ExtractionProgressCallback>"), "got: {dbg}");
    }
}
