//! CLI binary for xml-media-extract.
//!
//! A thin shim over the library crate that stages the inputs, maps CLI
//! flags to `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use xml_media_extract::archive::ARCHIVE_FILE_NAME;
use xml_media_extract::{
    archive_output, extract_async, resolve_input, ExtractionConfig, ExtractionOutput,
    ExtractionProgressCallback, ExtractionStats, InputKind, ProgressCallback,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar over the page documents plus one
/// log line per document and per missing media file.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Per-document wall-clock start times.
    start_times: Mutex<HashMap<String, Instant>>,
    missing: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_extraction_start` reports the document count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading book XML…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            missing: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Scanning");
        self.bar.reset_eta();
    }

    fn elapsed_ms(&self, file_name: &str) -> u128 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut times| times.remove(file_name))
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0)
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_documents: usize) {
        self.activate_bar(total_documents);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Scanning {total_documents} XML files…"))
        ));
    }

    fn on_document_start(&self, file_name: &str) {
        if let Ok(mut times) = self.start_times.lock() {
            times.insert(file_name.to_string(), Instant::now());
        }
        self.bar.set_message(file_name.to_string());
    }

    fn on_document_complete(&self, file_name: &str, media_found: usize) {
        let elapsed_ms = self.elapsed_ms(file_name);
        self.bar.println(format!(
            "  {} {:<32}  {:<10}  {}",
            green("✓"),
            file_name,
            dim(&format!("{media_found:>3} media")),
            dim(&format!("{elapsed_ms}ms")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, file_name: &str, error: &str) {
        let elapsed_ms = self.elapsed_ms(file_name);

        // Keep one line per document.
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:<32}  {}  {}",
            red("✗"),
            file_name,
            red(&msg),
            dim(&format!("{elapsed_ms}ms")),
        ));
        self.bar.inc(1);
    }

    fn on_media_missing(&self, filename: &str) {
        if self.missing.fetch_add(1, Ordering::SeqCst) == 0 {
            self.bar.set_prefix("Copying");
        }
        self.bar
            .println(format!("  {} missing media file {}", yellow("⚠"), filename));
    }

    fn on_extraction_complete(&self, stats: &ExtractionStats) {
        self.bar.finish_and_clear();

        if stats.documents_failed == 0 {
            eprintln!(
                "{} {} documents scanned, {} media references",
                green("✔"),
                bold(&stats.documents_processed.to_string()),
                bold(&stats.counts.total().to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} documents scanned  ({} failed), {} media references",
                if stats.documents_failed == stats.documents_found {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&stats.documents_processed.to_string()),
                stats.documents_found,
                red(&stats.documents_failed.to_string()),
                bold(&stats.counts.total().to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Report and CSV only
  xmlmedia pages/ out/

  # Resolve page titles from the book XML
  xmlmedia pages/ out/ --book-xml book.xml

  # Also copy media into out/media and out/media_by_page
  xmlmedia pages/ out/ --book-xml book.xml --media-folder media/

  # Zip archives work for both inputs
  xmlmedia pages.zip out/ --media-folder media.zip

  # Bundle the results (default name: media_extraction_results.zip)
  xmlmedia pages/ out/ --media-folder media/ --archive

  # Machine-readable output
  xmlmedia --json pages/ out/ > run.json

OUTPUT FILES:
  media_extraction_report.txt   Human-readable log of the run
  media_references.csv          media_type,source,title,xml_file,page_id,page_title
  media/<type>s/                Copies grouped by type (with --media-folder)
  media_by_page/<page title>/   Copies grouped by page (with --media-folder)

ENVIRONMENT VARIABLES:
  XMLMEDIA_BOOK_XML       Default for --book-xml
  XMLMEDIA_MEDIA_FOLDER   Default for --media-folder
  RUST_LOG                Override the log filter (e.g. xml_media_extract=debug)
"#;

/// Extract media references from page XML documents.
#[derive(Parser, Debug)]
#[command(
    name = "xmlmedia",
    version,
    about = "Extract image, video and audio references from page XML documents",
    long_about = "Scan a folder of page XML documents for image_node, video_node and audio_node \
elements, resolve each page's title (optionally from a book XML), and write a sorted report, \
a CSV export and organised copies of the referenced media files.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder (or .zip) containing the page XML documents.
    #[arg(env = "XMLMEDIA_XML_FOLDER")]
    xml_folder: PathBuf,

    /// Folder receiving the report, the CSV and the organised media.
    #[arg(env = "XMLMEDIA_OUTPUT_FOLDER")]
    output_folder: PathBuf,

    /// Book XML mapping page ids to canonical titles.
    #[arg(long, env = "XMLMEDIA_BOOK_XML")]
    book_xml: Option<PathBuf>,

    /// Flat folder (or .zip) with the media files to copy.
    #[arg(long, env = "XMLMEDIA_MEDIA_FOLDER")]
    media_folder: Option<PathBuf>,

    /// Zip the output folder afterwards (optionally to this path).
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    archive: Option<Option<PathBuf>>,

    /// Print the report text to stdout.
    #[arg(long, env = "XMLMEDIA_PRINT_REPORT")]
    print_report: bool,

    /// Output structured JSON (ExtractionOutput) on stdout.
    #[arg(long, env = "XMLMEDIA_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "XMLMEDIA_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "XMLMEDIA_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "XMLMEDIA_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs are dropped while the progress bar is drawing.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Stage inputs ─────────────────────────────────────────────────────
    // Unpacked archives live in temp folders owned by these bindings.
    let xml_input = resolve_input(&cli.xml_folder, InputKind::Documents)
        .with_context(|| format!("Failed to stage XML input {}", cli.xml_folder.display()))?;
    let media_input = cli
        .media_folder
        .as_deref()
        .map(|path| resolve_input(path, InputKind::Media))
        .transpose()
        .context("Failed to stage media input")?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };

    let mut builder = ExtractionConfig::builder()
        .xml_folder(xml_input.path())
        .output_folder(&cli.output_folder);
    if let Some(ref book_xml) = cli.book_xml {
        builder = builder.book_xml(book_xml);
    }
    if let Some(ref media) = media_input {
        builder = builder.media_folder(media.path());
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run extraction ───────────────────────────────────────────────────
    let output = extract_async(&config)
        .await
        .context("Extraction failed")?;

    // ── Optional archive ─────────────────────────────────────────────────
    let archived = match cli.archive.clone() {
        Some(path) => {
            let archive_path =
                path.unwrap_or_else(|| cli.output_folder.join(ARCHIVE_FILE_NAME));
            let output_folder = cli.output_folder.clone();
            let target = archive_path.clone();
            let stored =
                tokio::task::spawn_blocking(move || archive_output(&output_folder, &target))
                    .await
                    .context("Archive task panicked")?
                    .context("Failed to archive output folder")?;
            Some((archive_path, stored))
        }
        None => None,
    };

    // ── Emit results ─────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if cli.print_report {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.report.as_bytes())
            .context("Failed to write to stdout")?;
    }

    if !cli.quiet && !cli.json {
        print_summary(&output, show_progress);
        if let Some((path, stored)) = archived {
            eprintln!(
                "   {} files archived  →  {}",
                dim(&stored.to_string()),
                bold(&path.display().to_string())
            );
        }
    }

    Ok(())
}

/// Closing lines on stderr (the callback already printed the document tally).
fn print_summary(output: &ExtractionOutput, show_progress: bool) {
    let stats = &output.stats;
    if !show_progress {
        eprintln!(
            "Scanned {}/{} documents in {}ms",
            stats.documents_processed, stats.documents_found, stats.total_duration_ms
        );
        if stats.documents_failed > 0 {
            eprintln!("  {} documents failed", stats.documents_failed);
        }
    }

    eprintln!(
        "   {} images  /  {} videos  /  {} audio  —  {}ms total",
        dim(&stats.counts.images.to_string()),
        dim(&stats.counts.videos.to_string()),
        dim(&stats.counts.audio.to_string()),
        stats.total_duration_ms,
    );
    if let Some(ref copy) = output.copy {
        eprintln!(
            "   {} copied  /  {} missing  /  {} failed  →  {}",
            green(&copy.copied.to_string()),
            if copy.missing > 0 {
                yellow(&copy.missing.to_string())
            } else {
                copy.missing.to_string()
            },
            if copy.failed > 0 {
                red(&copy.failed.to_string())
            } else {
                copy.failed.to_string()
            },
            copy.media_output_dir.display(),
        );
    }
    eprintln!(
        "{}  report  →  {}",
        green("✔"),
        bold(&output.report_path.display().to_string())
    );
}
