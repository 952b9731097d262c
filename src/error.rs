//! Error types for the xml-media-extract library.
//!
//! Three error types reflect three failure scopes:
//!
//! * [`MediaExtractError`] (**Fatal**): the run cannot produce its report at
//!   all (output folder cannot be created, report or CSV cannot be written,
//!   an archive input is unreadable). Returned as `Err(MediaExtractError)`
//!   from the top-level `extract*` functions.
//!
//! * [`DocumentError`] (**Non-fatal**): a single page document could not be
//!   read or parsed. Stored inside [`crate::output::DocumentResult`] and
//!   written to the report; every other document is still processed.
//!
//! * [`CopyError`] (**Non-fatal**): a single media file could not be copied
//!   into the organised folders. Counted and reported, never propagated.
//!
//! Everything recoverable surfaces as a line in the report text, which is the
//! primary diagnostic channel for callers.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the xml-media-extract library.
///
/// Document-level failures use [`DocumentError`] and are stored in
/// [`crate::output::DocumentResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum MediaExtractError {
    // ── Output errors ─────────────────────────────────────────────────────
    /// The output folder could not be created.
    #[error("Failed to create output folder '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The report, CSV or archive file could not be written.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Staging errors ────────────────────────────────────────────────────
    /// A `.zip` input could not be opened or unpacked.
    #[error("Failed to unpack archive '{path}': {detail}")]
    ArchiveFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page document.
///
/// The document contributes nothing to the reference mapping; the run
/// continues with the next document.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// The file could not be read (permissions, not UTF-8, vanished).
    #[error("{detail}")]
    ReadFailed { detail: String },

    /// The file is not well-formed XML.
    #[error("{detail}")]
    ParseFailed { detail: String },
}

/// A non-fatal error while copying one media file.
#[derive(Debug, Error)]
pub enum CopyError {
    /// No file with the reference's basename exists in the media folder.
    #[error("media file '{filename}' not found")]
    Missing { filename: String },

    /// The file exists but copying it failed.
    #[error("failed to copy '{filename}' to '{dest}': {source}")]
    Io {
        filename: String,
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_error_display_is_bare_detail() {
        let e = DocumentError::ParseFailed {
            detail: "unexpected end of stream".into(),
        };
        assert_eq!(e.to_string(), "unexpected end of stream");
    }

    #[test]
    fn output_write_failed_display() {
        let e = MediaExtractError::OutputWriteFailed {
            path: PathBuf::from("/out/media_references.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = e.to_string();
        assert!(msg.contains("media_references.csv"), "got: {msg}");
        assert!(msg.contains("denied"), "got: {msg}");
    }

    #[test]
    fn copy_missing_display() {
        let e = CopyError::Missing {
            filename: "cover.jpg".into(),
        };
        assert!(e.to_string().contains("cover.jpg"));
    }

    #[test]
    fn document_error_serialises() {
        let e = DocumentError::ReadFailed {
            detail: "stream did not contain valid UTF-8".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("ReadFailed"), "got: {json}");
    }
}
