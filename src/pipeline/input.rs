//! Input staging: turn a user-supplied folder or `.zip` archive into a
//! plain folder the pipeline can read.
//!
//! A folder is used as-is. An archive is unpacked into a `TempDir` that is
//! cleaned up when the [`ResolvedInput`] is dropped. Only files with the
//! extensions expected for the input kind are kept, and every kept file is
//! placed at the top level of the staging folder: the collector and the
//! organizer never look into sub-folders.

use crate::error::MediaExtractError;
use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};
use zip::ZipArchive;

/// Media extensions accepted from a media archive.
pub const MEDIA_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".mp4", ".mov", ".mp3", ".wav", ".ogg",
];

/// What a staged folder is expected to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Page documents (`.xml`).
    Documents,
    /// Media files (see [`MEDIA_EXTENSIONS`]).
    Media,
}

impl InputKind {
    /// Whether an archive entry name is kept for this kind.
    ///
    /// macOS resource forks (`__MACOSX/…`) and dot-files are always dropped.
    pub fn accepts(self, entry_name: &str) -> bool {
        if entry_name.starts_with("__MACOSX/") || entry_name.starts_with('.') {
            return false;
        }
        let lower = entry_name.to_lowercase();
        match self {
            InputKind::Documents => lower.ends_with(".xml"),
            InputKind::Media => MEDIA_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)),
        }
    }
}

/// A staged input folder, either the caller's own or an unpacked archive.
pub enum ResolvedInput {
    /// Input was already a folder (or does not exist; the pipeline reports it).
    Local(PathBuf),
    /// Input was an archive; its files were unpacked into a temp directory.
    /// The `TempDir` is kept alive until processing completes.
    Extracted { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// The folder to hand to the pipeline.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Extracted { path, .. } => path,
        }
    }
}

/// `true` when `path` is an existing file with a `.zip` extension.
pub fn is_zip(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

/// Resolve an input path to a folder, unpacking it first if it is a `.zip`.
pub fn resolve_input(path: &Path, kind: InputKind) -> Result<ResolvedInput, MediaExtractError> {
    if !is_zip(path) {
        debug!("Using input folder: {}", path.display());
        return Ok(ResolvedInput::Local(path.to_path_buf()));
    }

    let archive_failed = |detail: String| MediaExtractError::ArchiveFailed {
        path: path.to_path_buf(),
        detail,
    };

    let file = File::open(path).map_err(|e| archive_failed(e.to_string()))?;
    let temp_dir = TempDir::new().map_err(|e| MediaExtractError::Internal(e.to_string()))?;
    let staged = unpack_flattened(file, temp_dir.path(), kind).map_err(archive_failed)?;
    info!(
        "Unpacked {} files from {} into {}",
        staged,
        path.display(),
        temp_dir.path().display()
    );

    Ok(ResolvedInput::Extracted {
        path: temp_dir.path().to_path_buf(),
        _temp_dir: temp_dir,
    })
}

/// Unpack the accepted entries of a zip archive into the top level of `dest`.
///
/// Top-level entries are written first; nested entries follow in archive
/// order. A name that is already taken becomes `<stem>_<n><ext>`.
/// Returns the number of files written.
pub fn unpack_flattened<R: Read + Seek>(
    reader: R,
    dest: &Path,
    kind: InputKind,
) -> Result<usize, String> {
    let mut archive = ZipArchive::new(reader).map_err(|e| e.to_string())?;

    let mut top_level = Vec::new();
    let mut nested = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(|e| e.to_string())?;
        if entry.is_dir() || !kind.accepts(entry.name()) {
            continue;
        }
        let Some(filename) = entry
            .enclosed_name()
            .and_then(|p| p.file_name().map(|n| n.to_os_string()))
        else {
            debug!("Skipping unsafe archive entry: {}", entry.name());
            continue;
        };
        if entry.name().trim_end_matches('/').contains('/') {
            nested.push((i, filename));
        } else {
            top_level.push((i, filename));
        }
    }

    let mut written = 0;
    for (i, filename) in top_level.into_iter().chain(nested) {
        let mut entry = archive.by_index(i).map_err(|e| e.to_string())?;
        let target = unique_destination(dest, Path::new(&filename));
        let mut out = File::create(&target).map_err(|e| e.to_string())?;
        io::copy(&mut entry, &mut out).map_err(|e| e.to_string())?;
        written += 1;
    }
    Ok(written)
}

/// `dir/name`, or `dir/<stem>_<n><ext>` with the smallest free `n ≥ 1`.
pub fn unique_destination(dir: &Path, name: &Path) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1;
    loop {
        let candidate = dir.join(format!("{stem}_{n}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
