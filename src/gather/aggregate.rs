//! Per-run accumulation and type-name deduplication.

use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, error};

use crate::gather::traits::{FailureKind, ValidationError};
use crate::model::InventoryItem;

/// Collects the items of one gather run.
///
/// The first item seen for a type name is kept; later items with the same
/// name are logged and dropped. The seen-name set lives only as long as the
/// aggregator.
#[derive(Debug, Default)]
pub struct Aggregator {
    seen: HashSet<String>,
    items: Vec<InventoryItem>,
    rejected: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a validated item. Returns `false` if it was a duplicate.
    pub fn accept(&mut self, path: &Path, item: InventoryItem) -> bool {
        if self.seen.contains(&item.name) {
            self.rejected += 1;
            error!(
                type_name = %item.name,
                file = %path.display(),
                kind = ?FailureKind::DuplicateTypeName,
                "Custom inventory typeName already exists in another file under the same folder, \
                 please remove the duplicate custom inventory file"
            );
            return false;
        }
        debug!(type_name = %item.name, file = %path.display(), "Accepted custom inventory item");
        self.seen.insert(item.name.clone());
        self.items.push(item);
        true
    }

    /// Records a file that failed to produce an item.
    pub fn reject(&mut self, path: &Path, err: &ValidationError) {
        self.rejected += 1;
        error!(
            file = %path.display(),
            kind = ?err.kind(),
            error = %err,
            "Failed to get item from file, continuing"
        );
    }

    /// Number of files skipped so far, duplicates included.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn finish(self) -> Vec<InventoryItem> {
        self.items
    }
}
