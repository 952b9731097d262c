//! Extraction entry points.
//!
//! [`extract`] runs the whole pipeline synchronously: resolve titles, collect
//! references document by document, sort, write the CSV, copy media, write
//! the report. [`extract_async`] runs the same work on Tokio's blocking pool
//! for callers that live inside an async runtime.

use crate::config::ExtractionConfig;
use crate::error::MediaExtractError;
use crate::output::{ExtractionOutput, ExtractionStats, MediaCounts};
use crate::pipeline::collect::{self, Collector};
use crate::pipeline::report::ReportBuilder;
use crate::pipeline::titles::TitleIndex;
use crate::pipeline::{csv, organize, sort};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Extract media references from the page documents named in `config`.
///
/// # Returns
/// `Ok(ExtractionOutput)` whenever the report could be written, even if
/// some documents failed to parse or some media files were missing (check
/// `output.stats` and `output.copy`).
///
/// # Errors
/// Only when the output folder cannot be created or the report/CSV cannot
/// be written.
pub fn extract(config: &ExtractionConfig) -> Result<ExtractionOutput, MediaExtractError> {
    let start = Instant::now();
    let progress = config.progress_callback.as_ref();
    info!("Starting extraction: {}", config.xml_folder.display());

    // ── Step 1: Prepare output folder ────────────────────────────────────
    std::fs::create_dir_all(&config.output_folder).map_err(|source| {
        MediaExtractError::OutputDirFailed {
            path: config.output_folder.clone(),
            source,
        }
    })?;

    let mut report = ReportBuilder::new();

    // ── Step 2: Resolve page titles ──────────────────────────────────────
    let titles = resolve_titles(config.book_xml.as_deref(), &mut report);

    // ── Step 3: List page documents ──────────────────────────────────────
    let documents = match collect::list_documents(&config.xml_folder) {
        Ok(docs) => docs,
        Err(e) => {
            warn!("Cannot read XML folder {}: {}", config.xml_folder.display(), e);
            report.folder_unreadable(&config.xml_folder, &e);
            Vec::new()
        }
    };
    report.documents_found(documents.len());
    info!("Found {} XML files", documents.len());
    if let Some(cb) = progress {
        cb.on_extraction_start(documents.len());
    }

    // ── Step 4: Collect references ───────────────────────────────────────
    let mut collector = Collector::new();
    for doc in &documents {
        if let Some(cb) = progress {
            cb.on_document_start(&doc.file_name);
        }
        let result = collect::collect_document(doc, &titles);
        if let Some(cb) = progress {
            match &result.error {
                None => cb.on_document_complete(&result.file_name, result.media.len()),
                Some(e) => cb.on_document_error(&result.file_name, &e.to_string()),
            }
        }
        report.document(&result);
        collector.add(result);
    }
    let (references, document_results) = collector.finish();

    // ── Step 5: Sort and summarise ───────────────────────────────────────
    let references = sort::sort_references(references);
    let counts = MediaCounts::from_references(&references);
    report.summary(&counts);
    debug!("{} distinct references after dedup", references.len());

    // ── Step 6: CSV export ───────────────────────────────────────────────
    let csv_path = config.csv_path();
    write_atomic(&csv_path, &csv::render_csv(&references))?;
    report.csv_written(&csv_path);

    // ── Step 7: Organise media files ─────────────────────────────────────
    let copy = match config.media_folder.as_deref() {
        Some(dir) if dir.is_dir() => {
            let summary =
                organize::organize_media(&references, dir, &config.output_folder, progress);
            report.copy_results(&summary);
            Some(summary)
        }
        Some(dir) => {
            warn!("Media folder not found: {}", dir.display());
            report.media_folder_missing(dir);
            None
        }
        None => None,
    };

    // ── Step 8: Write report ─────────────────────────────────────────────
    let report_path = config.report_path();
    let report_text = report.finish();
    write_atomic(&report_path, &report_text)?;

    let documents_failed = document_results.iter().filter(|d| d.error.is_some()).count();
    let stats = ExtractionStats {
        documents_found: documents.len(),
        documents_processed: documents.len() - documents_failed,
        documents_failed,
        title_mappings: titles.len(),
        counts,
        total_duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Extraction complete: {} references from {}/{} documents, report at {}",
        counts.total(),
        stats.documents_processed,
        stats.documents_found,
        report_path.display()
    );
    if let Some(cb) = progress {
        cb.on_extraction_complete(&stats);
    }

    Ok(ExtractionOutput {
        references,
        documents: document_results,
        report: report_text,
        report_path,
        csv_path,
        stats,
        copy,
    })
}

/// Run [`extract`] on Tokio's blocking thread pool.
pub async fn extract_async(config: &ExtractionConfig) -> Result<ExtractionOutput, MediaExtractError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || extract(&config))
        .await
        .map_err(|e| MediaExtractError::Internal(format!("Extraction task panicked: {}", e)))?
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Load the book XML when one is configured; every failure degrades to an
/// empty index and a report line.
fn resolve_titles(book_xml: Option<&Path>, report: &mut ReportBuilder) -> TitleIndex {
    let Some(path) = book_xml else {
        return TitleIndex::default();
    };

    if !path.exists() {
        warn!("Book XML not found: {}", path.display());
        report.title_index_missing(path);
        return TitleIndex::default();
    }

    match TitleIndex::load(path) {
        Ok(index) => {
            report.title_index_loaded(index.len());
            index
        }
        Err(e) => {
            warn!("Error loading book XML {}: {}", path.display(), e);
            report.title_index_failed(&e);
            TitleIndex::default()
        }
    }
}

/// Write `contents` to a sibling temp file, then rename it over `path`.
fn write_atomic(path: &Path, contents: &str) -> Result<(), MediaExtractError> {
    let write_failed = |source: std::io::Error| MediaExtractError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    std::fs::write(&tmp_path, contents).map_err(write_failed)?;
    std::fs::rename(&tmp_path, path).map_err(write_failed)
}
