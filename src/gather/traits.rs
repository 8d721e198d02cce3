//! Core traits and types for the custom inventory gatherer.
//!
//! This module defines the seams of the gather pipeline:
//! - The gatherer capability via [`Gatherer`]
//! - Injectable filesystem access via [`FileSystem`]
//! - Classified failures for discovery, validation and whole runs

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::config::Config;
use crate::model::InventoryItem;
use crate::traits::StopType;

// ============================================================================
// Gatherer Trait
// ============================================================================

/// An inventory gatherer that produces items from a [`Config`].
///
/// A run is a single blocking pass. Gatherers keep no state between runs,
/// so calling [`Gatherer::run`] twice over unchanged input yields the same
/// items apart from capture timestamps.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so the owning executor can move
/// them onto a blocking worker thread.
pub trait Gatherer: Send + Sync {
    /// Returns the fixed name of this gatherer.
    ///
    /// Also used as the key into the inventory policy document.
    fn name(&self) -> &str;

    /// Gathers inventory items.
    ///
    /// # Errors
    ///
    /// Returns [`GatherError`] only when the run as a whole has to be
    /// abandoned. Problems with individual inputs are logged and skipped.
    fn run(&self, config: &Config) -> Result<Vec<InventoryItem>, GatherError>;

    /// Requests that a running gather stops.
    ///
    /// Best effort. The default implementation does nothing and succeeds.
    fn request_stop(&self, _stop_type: StopType) -> Result<(), GatherError> {
        Ok(())
    }
}

// ============================================================================
// Filesystem Access
// ============================================================================

/// A direct child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    /// File name without the directory part, exactly as the OS returned it
    pub name: OsString,

    /// Size in bytes
    pub size: u64,

    /// Whether the entry is a regular file (symlinks are resolved)
    pub is_file: bool,
}

/// Read-only filesystem primitives used by the gatherer.
///
/// Injected so tests can drive discovery and per-file failures without
/// touching disk.
pub trait FileSystem: Send + Sync {
    /// Lists the direct children of `dir`.
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>>;

    /// Reads the full contents of `path`.
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();
        for entry in skip_unreadable_entries(dir, std::fs::read_dir(dir)?) {
            // Follows symlinks; entries whose target is gone are skipped.
            let Ok(metadata) = std::fs::metadata(entry.path()) else {
                continue;
            };
            entries.push(DirEntryInfo {
                name: entry.file_name(),
                size: metadata.len(),
                is_file: metadata.is_file(),
            });
        }
        Ok(entries)
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Drops directory entries the OS failed to return, keeping the rest.
fn skip_unreadable_entries<T>(
    dir: &Path,
    entries: impl IntoIterator<Item = io::Result<T>>,
) -> impl Iterator<Item = T> {
    let dir = dir.to_path_buf();
    entries.into_iter().filter_map(move |entry| match entry {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!(folder = %dir.display(), error = %e, "Skipping unreadable directory entry");
            None
        }
    })
}

// ============================================================================
// Error Types
// ============================================================================

/// Failure classes of the gather pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    DiscoveryCountExceeded,
    DirectoryUnavailable,
    FileReadError,
    DecodeError,
    NameValidationError,
    SchemaVersionFormatError,
    ContentTypeError,
    AttributeCountExceeded,
    AttributeNameError,
    AttributeValueError,
    DuplicateTypeName,
}

/// Errors that can occur while discovering fragment files.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// More qualifying files than a single run may process
    #[error("Total custom inventory file count ({count}) exceeds limit ({limit})")]
    CountExceeded { count: usize, limit: usize },
}

/// Reasons a single fragment file is rejected.
///
/// None of these abort a run; the file is logged and skipped.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The file could not be read
    #[error("Failed to read file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The bytes are not a JSON object of the fragment shape
    #[error("Failed to decode custom inventory content: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Custom inventory item has missing or empty TypeName")]
    EmptyTypeName,

    #[error("Custom inventory item TypeName ({type_name})'s length {length} exceeded the limit: {limit}")]
    TypeNameTooLong {
        type_name: String,
        length: usize,
        limit: usize,
    },

    #[error("Custom inventory item's TypeName ({type_name}) has to start with {prefix}")]
    MissingTypeNamePrefix {
        type_name: String,
        prefix: &'static str,
    },

    #[error("Custom inventory item ({type_name}) is missing SchemaVersion")]
    MissingSchemaVersion { type_name: String },

    #[error(
        "Custom inventory item ({type_name}) has invalid SchemaVersion ({schema_version}), \
         the valid schema version has to be like 1.0, 1.1, 2.0, 3.9, etc."
    )]
    InvalidSchemaVersion {
        type_name: String,
        schema_version: String,
    },

    #[error("Custom inventory item ({type_name}) is missing Content")]
    MissingContent { type_name: String },

    #[error("Custom inventory item ({type_name})'s Content is a JSON {found}, expected an object")]
    ContentNotObject {
        type_name: String,
        found: &'static str,
    },

    #[error("Custom inventory item ({type_name})'s content has {count} attributes, exceeding the limit {limit}")]
    AttributeCountExceeded {
        type_name: String,
        count: usize,
        limit: usize,
    },

    #[error("Custom inventory ({type_name}) contains an empty attribute name")]
    EmptyAttributeName { type_name: String },

    #[error("Custom inventory ({type_name})'s attribute name ({attribute}) length {length} exceeded the limit: {limit}")]
    AttributeNameTooLong {
        type_name: String,
        attribute: String,
        length: usize,
        limit: usize,
    },

    #[error(
        "Custom inventory ({type_name})'s attribute ({attribute}) has a {found} value, \
         only string values are supported"
    )]
    AttributeValueNotString {
        type_name: String,
        attribute: String,
        found: &'static str,
    },

    #[error("Attribute ({attribute}) of custom inventory ({type_name}) has value length {length}, exceeding the limit: {limit}")]
    AttributeValueTooLong {
        type_name: String,
        attribute: String,
        length: usize,
        limit: usize,
    },
}

impl ValidationError {
    /// Failure class this error belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Read { .. } => FailureKind::FileReadError,
            Self::Decode(_) => FailureKind::DecodeError,
            Self::EmptyTypeName | Self::TypeNameTooLong { .. } | Self::MissingTypeNamePrefix { .. } => {
                FailureKind::NameValidationError
            }
            Self::MissingSchemaVersion { .. } | Self::InvalidSchemaVersion { .. } => {
                FailureKind::SchemaVersionFormatError
            }
            Self::MissingContent { .. } | Self::ContentNotObject { .. } => {
                FailureKind::ContentTypeError
            }
            Self::AttributeCountExceeded { .. } => FailureKind::AttributeCountExceeded,
            Self::EmptyAttributeName { .. } | Self::AttributeNameTooLong { .. } => {
                FailureKind::AttributeNameError
            }
            Self::AttributeValueNotString { .. } | Self::AttributeValueTooLong { .. } => {
                FailureKind::AttributeValueError
            }
        }
    }
}

/// Errors that abort a whole gather run.
#[derive(Error, Debug)]
pub enum GatherError {
    /// Discovery refused the input set
    #[error("Failed to get inventory files from folder {}: {source}", folder.display())]
    Discovery {
        folder: PathBuf,
        #[source]
        source: DiscoveryError,
    },

    /// The executor could not schedule or join the blocking run
    #[error("Executor error: {0}")]
    Executor(String),
}

impl GatherError {
    /// Failure class for run-level errors that map onto the pipeline taxonomy.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Discovery {
                source: DiscoveryError::CountExceeded { .. },
                ..
            } => Some(FailureKind::DiscoveryCountExceeded),
            Self::Executor(_) => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
