//! # xml-media-extract
//!
//! Extract image, video and audio references from a folder of page XML
//! documents, attach a human-readable page title to each, and write a
//! sorted report, a CSV and (optionally) organised copies of the media.
//!
//! ## Pipeline Overview
//!
//! ```text
//! pages/*.xml (+ book.xml, + media/)
//!  │
//!  ├─ 1. Titles    page id → title from the optional book XML
//!  ├─ 2. Collect   media nodes per document, keyed by src (last write wins)
//!  ├─ 3. Sort      numeric page titles first, then text titles
//!  ├─ 4. Export    media_references.csv
//!  ├─ 5. Organise  media/<type>s/… and media_by_page/<title>/…
//!  └─ 6. Report    media_extraction_report.txt
//! ```
//!
//! Nothing is fatal except failing to write the outputs: broken documents,
//! a broken book XML and missing media files all end up as report lines.
//!
//! ## Page documents
//!
//! ```xml
//! <page>
//!   <page_node id="12" title="Getting Started"/>
//!   <section>
//!     <image_node src="img/cover.jpg" title="Cover"/>
//!     <video_node src="intro.mp4"/>
//!   </section>
//! </page>
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use xml_media_extract::{extract, ExtractionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder()
//!         .xml_folder("pages")
//!         .output_folder("out")
//!         .book_xml("book.xml")
//!         .media_folder("media")
//!         .build()?;
//!     let output = extract(&config)?;
//!     println!("{} distinct media references", output.references.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `xmlmedia` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod archive;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use archive::archive_output;
pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::{CopyError, DocumentError, MediaExtractError};
pub use extract::{extract, extract_async};
pub use output::{
    CopySummary, DocumentResult, ExtractionOutput, ExtractionStats, MediaCounts, MediaReference,
    MediaReferences, MediaType,
};
pub use pipeline::input::{resolve_input, InputKind, ResolvedInput};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
