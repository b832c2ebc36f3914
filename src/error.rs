//! Error types for container roll-forward operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when discovering, unpacking, patching, and repacking report
//! containers, along with a convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. Two
//! variants abort a run before any container is touched
//! ([`InvalidConfig`][Error::InvalidConfig] and
//! [`WorkDirMissing`][Error::WorkDirMissing]); every other variant is scoped
//! to a single container and is caught at the batch boundary so the rest of
//! the batch keeps going:
//!
//! ```rust,no_run
//! use pbixroll::{Error, Result, Workspace};
//!
//! fn open_root(path: &str) -> Result<Workspace> {
//!     match Workspace::open(path) {
//!         Ok(ws) => Ok(ws),
//!         Err(Error::WorkDirMissing(p)) => {
//!             eprintln!("No such working directory: {}", p.display());
//!             Err(Error::WorkDirMissing(p))
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use std::io;
use std::path::PathBuf;

/// The main error type for container roll-forward operations.
///
/// # Error Categories
///
/// | Category | Variants | Scope |
/// |----------|----------|-------|
/// | Startup | [`InvalidConfig`][Self::InvalidConfig], [`WorkDirMissing`][Self::WorkDirMissing] | Whole run |
/// | Archive | [`Archive`][Self::Archive], [`PathTraversal`][Self::PathTraversal] | One container |
/// | Layout | [`LayoutMissing`][Self::LayoutMissing], [`Encoding`][Self::Encoding] | One container |
/// | I/O | [`Io`][Self::Io], [`ContainerMissing`][Self::ContainerMissing] | One container |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred during file operations.
    ///
    /// This wraps [`std::io::Error`] and is returned when filesystem
    /// operations fail: permission denied, disk full, a manifest that cannot
    /// be read, and so on. Fatal to the current container only.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The container is not a valid ZIP archive, or repacking it failed.
    #[error("Invalid report container: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// An archive entry's name would escape the extraction directory.
    ///
    /// Entries such as `../../etc/passwd` are rejected rather than written
    /// outside the scratch tree.
    #[error("Entry '{entry}' escapes the extraction directory")]
    PathTraversal {
        /// The offending entry name as stored in the archive.
        entry: String,
    },

    /// The explicitly requested container does not exist.
    #[error("Container not found: {0}")]
    ContainerMissing(PathBuf),

    /// The working directory to scan for containers does not exist.
    ///
    /// Reported at startup, before any container is touched.
    #[error("Working directory not found: {0}")]
    WorkDirMissing(PathBuf),

    /// The requested option combination is invalid.
    ///
    /// Reported at startup, before any container is touched.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The container has no layout resource at the expected path.
    #[error("Layout resource not found: {0}")]
    LayoutMissing(PathBuf),

    /// The layout resource could not be decoded as UTF-16LE.
    ///
    /// The consuming application requires this exact encoding, so a resource
    /// that fails to decode is left untouched and the container is skipped.
    #[error("Layout resource at {path} is not valid UTF-16LE: {reason}")]
    Encoding {
        /// Path of the resource inside the scratch tree.
        path: PathBuf,
        /// What failed: odd byte count or an invalid code unit sequence.
        reason: String,
    },

    /// A replacement rule pattern failed to compile.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// A specialized [`Result`](std::result::Result) type for roll-forward operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns `true` for errors that abort the whole run rather than a
    /// single container.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidConfig(_) | Self::WorkDirMissing(_))
    }
}
