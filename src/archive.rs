//! Bundle an output folder into a single zip file.
//!
//! Entry names are paths relative to the output folder with `/` separators.
//! Only files are stored; the archive being written is skipped when it lives
//! inside the folder it bundles.

use crate::error::MediaExtractError;
use std::fs::File;
use std::io;
use std::path::{Component, Path};
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

/// Default file name for the bundled results.
pub const ARCHIVE_FILE_NAME: &str = "media_extraction_results.zip";

/// Zip every file below `output_folder` into `archive_path`.
///
/// Returns the number of files stored.
pub fn archive_output(output_folder: &Path, archive_path: &Path) -> Result<usize, MediaExtractError> {
    let write_failed = |source: io::Error| MediaExtractError::OutputWriteFailed {
        path: archive_path.to_path_buf(),
        source,
    };

    if let Some(parent) = archive_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_failed)?;
    }
    let file = File::create(archive_path).map_err(write_failed)?;
    let archive_canonical = archive_path.canonicalize().map_err(write_failed)?;

    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut stored = 0;

    for entry in WalkDir::new(output_folder).sort_by_file_name() {
        let entry = entry.map_err(|e| write_failed(io::Error::other(e)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().canonicalize().ok().as_deref() == Some(archive_canonical.as_path()) {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(output_folder) else {
            continue;
        };
        let name = archive_name(relative);
        debug!("Archiving {}", name);

        zip.start_file(name, options)
            .map_err(|e| write_failed(io::Error::other(e)))?;
        let mut src = File::open(entry.path()).map_err(write_failed)?;
        io::copy(&mut src, &mut zip).map_err(write_failed)?;
        stored += 1;
    }

    zip.finish().map_err(|e| write_failed(io::Error::other(e)))?;
    info!("Archived {} files into {}", stored, archive_path.display());
    Ok(stored)
}

fn archive_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::ZipArchive;

    #[test]
    fn archives_files_with_relative_names() {
        let out = tempfile::tempdir().unwrap();
        std::fs::write(out.path().join("media_references.csv"), "header\n").unwrap();
        std::fs::create_dir_all(out.path().join("media/images")).unwrap();
        std::fs::write(out.path().join("media/images/a.jpg"), b"jpeg").unwrap();

        let dest = tempfile::tempdir().unwrap();
        let archive_path = dest.path().join("results.zip");
        let stored = archive_output(out.path(), &archive_path).unwrap();
        assert_eq!(stored, 2);

        let mut archive = ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
        let mut names: Vec<_> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["media/images/a.jpg", "media_references.csv"]);
    }

    #[test]
    fn archive_inside_output_skips_itself() {
        let out = tempfile::tempdir().unwrap();
        std::fs::write(out.path().join("media_extraction_report.txt"), "report").unwrap();
        let archive_path = out.path().join(ARCHIVE_FILE_NAME);

        let stored = archive_output(out.path(), &archive_path).unwrap();
        assert_eq!(stored, 1);
    }
}
