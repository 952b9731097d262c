//! Media organisation: copy referenced files into type and page folders.
//!
//! Files are looked up by the basename of their `src` in the top level of
//! the media folder only. Each found file is copied twice:
//!
//! ```text
//! <output>/media/<type>s/<filename>
//! <output>/media_by_page/<page title with / and \ replaced by ->/<filename>
//! ```
//!
//! A missing or uncopyable file is counted and reported; it never stops the
//! stage. Copies are not rolled back, so a failure part-way leaves earlier
//! copies in place.

use crate::error::CopyError;
use crate::output::{CopySummary, MediaReference, MediaReferences};
use crate::progress::ProgressCallback;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the type-organised tree inside the output folder.
pub const MEDIA_DIR: &str = "media";

/// Name of the page-organised tree inside the output folder.
pub const MEDIA_BY_PAGE_DIR: &str = "media_by_page";

/// Folder name for a page title: path separators become `-`, nothing else changes.
pub fn sanitize_page_title(title: &str) -> String {
    title.replace(['/', '\\'], "-")
}

/// Basename of a stored `src` value.
fn source_filename(source: &str) -> Option<String> {
    Path::new(source)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}

/// Copy `src` to `dest`, carrying over the modification time when possible.
fn copy_preserving_mtime(src: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(src, dest)?;
    let mtime = fs::metadata(src).and_then(|m| m.modified());
    match mtime {
        Ok(mtime) => {
            if let Err(e) = fs::File::options()
                .write(true)
                .open(dest)
                .and_then(|f| f.set_modified(mtime))
            {
                debug!("Could not preserve mtime on {}: {}", dest.display(), e);
            }
        }
        Err(e) => debug!("No mtime for {}: {}", src.display(), e),
    }
    Ok(())
}

struct Layout<'a> {
    media_folder: &'a Path,
    media_root: PathBuf,
    page_root: PathBuf,
}

impl Layout<'_> {
    fn copy_one(&self, r: &MediaReference) -> Result<(), CopyError> {
        let filename = source_filename(&r.source).ok_or_else(|| CopyError::Missing {
            filename: r.source.clone(),
        })?;
        let source_path = self.media_folder.join(&filename);
        if !source_path.is_file() {
            return Err(CopyError::Missing { filename });
        }

        let type_dir = self.media_root.join(r.media_type.folder_name());
        let page_dir = self.page_root.join(sanitize_page_title(&r.page_title));

        for dir in [type_dir, page_dir] {
            let dest = dir.join(&filename);
            fs::create_dir_all(&dir)
                .and_then(|()| copy_preserving_mtime(&source_path, &dest))
                .map_err(|source| CopyError::Io {
                    filename: filename.clone(),
                    dest,
                    source,
                })?;
        }
        Ok(())
    }
}

/// Copy every referenced file found in `media_folder` into both trees under
/// `output_folder`.
///
/// Never fails as a whole: a tree root that cannot be created makes each
/// found file fail its copy, and every per-file problem is recorded in the
/// returned [`CopySummary`].
pub fn organize_media(
    refs: &MediaReferences,
    media_folder: &Path,
    output_folder: &Path,
    progress: Option<&ProgressCallback>,
) -> CopySummary {
    let layout = Layout {
        media_folder,
        media_root: output_folder.join(MEDIA_DIR),
        page_root: output_folder.join(MEDIA_BY_PAGE_DIR),
    };
    for root in [&layout.media_root, &layout.page_root] {
        if let Err(e) = fs::create_dir_all(root) {
            warn!("Cannot create media folder {}: {}", root.display(), e);
        }
    }

    let mut summary = CopySummary {
        media_output_dir: layout.media_root.clone(),
        ..CopySummary::default()
    };

    for r in refs.values() {
        match layout.copy_one(r) {
            Ok(()) => summary.copied += 1,
            Err(CopyError::Missing { filename }) => {
                debug!("Missing media file: {}", filename);
                if let Some(cb) = progress {
                    cb.on_media_missing(&filename);
                }
                summary.missing += 1;
                summary.missing_files.push(filename);
            }
            Err(e) => {
                warn!("{}", e);
                summary.failed += 1;
                summary.failed_files.push(e.to_string());
            }
        }
    }

    info!(
        "Copied {} media files ({} missing, {} failed)",
        summary.copied, summary.missing, summary.failed
    );
    summary
}
