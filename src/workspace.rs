//! Working-directory layout and container discovery.
//!
//! The working directory holds report containers in arbitrary workspace
//! subdirectories, plus three reserved trees the tool maintains for itself:
//! `#BACKUP` (timestamped per-run copies of originals), `#TEMP` (per-container
//! scratch trees), and `#RESULTS` (repacked output). Reserved names carry the
//! `#` marker and are skipped during discovery, so the tool never picks up
//! its own output as input.

use std::fmt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{Error, Result};

/// Marker prefix of directory names reserved for tool output.
pub const RESERVED_PREFIX: char = '#';

/// Reserved subdirectory for per-run backups of original containers.
pub const BACKUP_DIR: &str = "#BACKUP";

/// Reserved subdirectory for per-container scratch trees.
pub const TEMP_DIR: &str = "#TEMP";

/// Reserved subdirectory for repacked containers.
pub const RESULTS_DIR: &str = "#RESULTS";

/// File extension of report containers.
pub const CONTAINER_EXT: &str = "pbix";

/// One discovered container: its workspace subdirectory (relative to the
/// working-directory root, possibly empty) and its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRef {
    /// Workspace subdirectory relative to the root.
    pub subdir: PathBuf,
    /// Container file name, extension included.
    pub file_name: String,
}

impl ContainerRef {
    /// Creates a reference from a workspace subdirectory and a file name.
    pub fn new(subdir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            subdir: subdir.into(),
            file_name: file_name.into(),
        }
    }

    /// The file name without the container extension.
    pub fn stem(&self) -> &str {
        self.file_name
            .strip_suffix(&format!(".{CONTAINER_EXT}"))
            .unwrap_or(&self.file_name)
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subdir.as_os_str().is_empty() {
            write!(f, "{}", self.file_name)
        } else {
            write!(f, "{}/{}", self.subdir.display(), self.file_name)
        }
    }
}

/// An immutable handle on the working directory.
///
/// All path derivation goes through this value; no component keeps global
/// path state.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Opens a working directory, failing if it does not exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::WorkDirMissing(root));
        }
        Ok(Self { root })
    }

    /// The working-directory root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Recursively finds every container under the root.
    ///
    /// Paths under reserved (`#`-prefixed) directories are skipped. Results
    /// are in sorted traversal order.
    pub fn discover(&self) -> Result<Vec<ContainerRef>> {
        let mut containers = Vec::new();

        let walk = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_reserved(e.file_name()));

        for entry in walk {
            let entry = entry.map_err(std::io::Error::from)?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().is_none_or(|ext| ext != CONTAINER_EXT)
            {
                continue;
            }

            let subdir = path
                .parent()
                .and_then(|p| p.strip_prefix(&self.root).ok())
                .unwrap_or(Path::new(""))
                .to_path_buf();
            let file_name = entry.file_name().to_string_lossy().into_owned();
            containers.push(ContainerRef::new(subdir, file_name));
        }

        Ok(containers)
    }

    /// Absolute path of a container.
    pub fn container_path(&self, container: &ContainerRef) -> PathBuf {
        self.root.join(&container.subdir).join(&container.file_name)
    }

    /// Scratch directory for one container, unique per container.
    pub fn scratch_path(&self, container: &ContainerRef) -> PathBuf {
        self.root
            .join(TEMP_DIR)
            .join(&container.subdir)
            .join(container.stem())
    }

    /// Output path of a repacked container in the results tree.
    pub fn results_path(&self, container: &ContainerRef) -> PathBuf {
        self.root
            .join(RESULTS_DIR)
            .join(&container.subdir)
            .join(&container.file_name)
    }

    /// Backup path of an original container for the run stamped `stamp`.
    pub fn backup_path(&self, stamp: &str, container: &ContainerRef) -> PathBuf {
        self.root
            .join(BACKUP_DIR)
            .join(stamp)
            .join(&container.subdir)
            .join(&container.file_name)
    }
}

fn is_reserved(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with(RESERVED_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_skips_reserved_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Sales")).unwrap();
        fs::create_dir_all(root.join(RESULTS_DIR).join("Sales")).unwrap();
        fs::create_dir_all(root.join(TEMP_DIR)).unwrap();

        fs::write(root.join("Sales/monthly.pbix"), b"zip").unwrap();
        fs::write(root.join("top.pbix"), b"zip").unwrap();
        fs::write(root.join("Sales/notes.txt"), b"text").unwrap();
        fs::write(root.join(RESULTS_DIR).join("Sales/monthly.pbix"), b"zip").unwrap();

        let ws = Workspace::open(root).unwrap();
        let found = ws.discover().unwrap();
        assert_eq!(
            found,
            vec![
                ContainerRef::new("Sales", "monthly.pbix"),
                ContainerRef::new("", "top.pbix"),
            ]
        );
    }

    #[test]
    fn test_missing_root_is_a_startup_error() {
        let err = Workspace::open("/no/such/directory").unwrap_err();
        assert!(matches!(err, Error::WorkDirMissing(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_path_derivation() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::open(dir.path()).unwrap();
        let container = ContainerRef::new("Sales", "monthly.pbix");

        assert_eq!(
            ws.scratch_path(&container),
            dir.path().join("#TEMP/Sales/monthly")
        );
        assert_eq!(
            ws.results_path(&container),
            dir.path().join("#RESULTS/Sales/monthly.pbix")
        );
        assert_eq!(
            ws.backup_path("20240415-120000", &container),
            dir.path().join("#BACKUP/20240415-120000/Sales/monthly.pbix")
        );
        assert_eq!(container.stem(), "monthly");
        assert_eq!(container.to_string(), "Sales/monthly.pbix");
    }
}
