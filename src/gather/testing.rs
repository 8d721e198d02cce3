//! In-memory [`FileSystem`] double for unit tests.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};

use crate::gather::traits::{DirEntryInfo, FileSystem};

#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    dirs: BTreeSet<PathBuf>,
    files: BTreeMap<PathBuf, Vec<u8>>,
    subdirs: BTreeSet<PathBuf>,
    unreadable: BTreeSet<PathBuf>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        let path = PathBuf::from(path);
        self.add_parent(&path);
        self.files.insert(path, content.into());
        self
    }

    /// A listed file whose read fails.
    pub fn with_unreadable_file(mut self, path: &str) -> Self {
        let path = PathBuf::from(path);
        self.add_parent(&path);
        self.files.insert(path.clone(), Vec::new());
        self.unreadable.insert(path);
        self
    }

    /// A child directory entry.
    pub fn with_dir_entry(mut self, path: &str) -> Self {
        let path = PathBuf::from(path);
        self.add_parent(&path);
        self.subdirs.insert(path);
        self
    }

    fn add_parent(&mut self, path: &Path) {
        if let Some(parent) = path.parent() {
            self.dirs.insert(parent.to_path_buf());
        }
    }

    fn name_of(path: &Path) -> OsString {
        path.file_name().map(OsStr::to_os_string).unwrap_or_default()
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        if !self.dirs.contains(dir) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"));
        }
        let files = self
            .files
            .iter()
            .filter(|(path, _)| path.parent() == Some(dir))
            .map(|(path, content)| DirEntryInfo {
                name: Self::name_of(path),
                size: content.len() as u64,
                is_file: true,
            });
        let subdirs = self
            .subdirs
            .iter()
            .filter(|path| path.parent() == Some(dir))
            .map(|path| DirEntryInfo {
                name: Self::name_of(path),
                size: 0,
                is_file: false,
            });
        // Reverse so callers cannot rely on listing order.
        let mut entries: Vec<_> = files.chain(subdirs).collect();
        entries.reverse();
        Ok(entries)
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        if self.unreadable.contains(path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}
