//! Container extraction and repacking.
//!
//! A report container is a plain ZIP archive. Extraction unpacks every entry
//! into a scratch directory, preserving the internal hierarchy; repacking
//! walks the scratch tree and writes one entry per file. The container is
//! never mutated in place: repacking always builds a `.part` sibling of the
//! destination and renames it over only when complete, so a failure during
//! repack leaves the destination (and the original) untouched.
//!
//! Compression policy: the data-model blob is already compressed internally,
//! so recompressing it wastes time and can break the consuming application's
//! structural assumptions. That one entry is stored; everything else is
//! deflated.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::{Error, Result};

/// Name of the single entry that is stored uncompressed.
pub const DATA_MODEL: &str = "DataModel";

/// Result of repacking one container.
#[must_use = "build result should be checked to verify the expected entries were written"]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildResult {
    /// Total entries written to the archive.
    pub entries_written: usize,
    /// Entries written without compression.
    pub stored: usize,
    /// Entries written with deflate compression.
    pub deflated: usize,
}

/// Extracts every entry of `container` into `scratch`.
///
/// Relative directory structure is preserved; entries are not filtered.
/// Returns the number of file entries written. Fails with
/// [`Error::Archive`] if the source is not a valid ZIP archive and with
/// [`Error::PathTraversal`] if an entry name would escape `scratch`.
pub fn extract(container: &Path, scratch: &Path) -> Result<usize> {
    let file = File::open(container)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    fs::create_dir_all(scratch)?;

    let mut extracted = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(Error::PathTraversal {
                entry: entry.name().to_string(),
            });
        };
        let destination = scratch.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&destination)?;
            continue;
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&destination)?;
        io::copy(&mut entry, &mut out)?;
        extracted += 1;
    }

    debug!(
        "extracted {extracted} entries from {} into {}",
        container.display(),
        scratch.display()
    );
    Ok(extracted)
}

/// Repacks `scratch` into a container at `dest`.
///
/// Every file below `scratch` becomes one archive entry whose internal path
/// is the file's path relative to the scratch root. Entries are written in
/// sorted order so identical trees produce identical archives.
pub fn build(scratch: &Path, dest: &Path) -> Result<BuildResult> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let part = part_path(dest);

    let result = write_archive(scratch, &part);
    if result.is_err() {
        // Best effort: do not leave a half-written sibling behind.
        let _ = fs::remove_file(&part);
    }
    let result = result?;

    fs::rename(&part, dest)?;
    debug!(
        "repacked {} entries from {} into {}",
        result.entries_written,
        scratch.display(),
        dest.display()
    );
    Ok(result)
}

fn write_archive(scratch: &Path, part: &Path) -> Result<BuildResult> {
    let mut writer = ZipWriter::new(BufWriter::new(File::create(part)?));
    let mut result = BuildResult::default();

    for entry in WalkDir::new(scratch).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(scratch).unwrap_or(entry.path());
        let arcname = archive_name(relative);

        let method = if entry.file_name() == DATA_MODEL {
            result.stored += 1;
            CompressionMethod::Stored
        } else {
            result.deflated += 1;
            CompressionMethod::Deflated
        };

        writer.start_file(
            arcname,
            SimpleFileOptions::default().compression_method(method),
        )?;
        let mut source = File::open(entry.path())?;
        io::copy(&mut source, &mut writer)?;
        result.entries_written += 1;
    }

    writer.finish()?.flush()?;
    Ok(result)
}

/// Archive-internal name for a scratch-relative path.
///
/// Archive entries always use `/` separators.
fn archive_name(relative: &Path) -> String {
    let name = relative.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        name.into_owned()
    } else {
        name.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// The temporary sibling a container is built at before the final rename.
fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
