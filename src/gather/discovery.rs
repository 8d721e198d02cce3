//! Fragment file discovery.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::gather::traits::{DiscoveryError, FileSystem};

/// File suffix of custom inventory fragments.
pub const FILE_SUFFIX: &str = ".json";

/// Maximum number of fragment files a single run may process.
pub const CUSTOM_INVENTORY_COUNT_LIMIT: usize = 20;

/// A fragment file selected for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Lists regular files directly under `folder` whose name ends with `suffix`.
///
/// An unlistable folder (missing, permission denied) yields an empty list.
/// Results are ordered by file name.
///
/// # Errors
///
/// Returns [`DiscoveryError::CountExceeded`] when more than
/// [`CUSTOM_INVENTORY_COUNT_LIMIT`] files qualify.
pub fn discover(
    fs: &dyn FileSystem,
    folder: &Path,
    suffix: &str,
) -> Result<Vec<DiscoveredFile>, DiscoveryError> {
    let entries = match fs.read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            error!(folder = %folder.display(), error = %e, "Read directory failed");
            return Ok(Vec::new());
        }
    };

    let mut qualifying: Vec<_> = entries
        .into_iter()
        .filter(|entry| entry.is_file && has_suffix(&entry.name, suffix))
        .collect();
    qualifying.sort_by(|a, b| a.name.cmp(&b.name));

    if qualifying.len() > CUSTOM_INVENTORY_COUNT_LIMIT {
        let err = DiscoveryError::CountExceeded {
            count: qualifying.len(),
            limit: CUSTOM_INVENTORY_COUNT_LIMIT,
        };
        error!(folder = %folder.display(), "{}", err);
        return Err(err);
    }

    let total_bytes: u64 = qualifying.iter().map(|entry| entry.size).sum();
    debug!(
        files = qualifying.len(),
        total_bytes,
        "Discovered custom inventory files"
    );

    Ok(qualifying
        .into_iter()
        .map(|entry| DiscoveredFile {
            path: folder.join(&entry.name),
            size: entry.size,
        })
        .collect())
}

/// Suffix test on the raw name, so names that are not valid UTF-8 still match.
fn has_suffix(name: &OsStr, suffix: &str) -> bool {
    name.as_encoded_bytes().ends_with(suffix.as_bytes())
}
