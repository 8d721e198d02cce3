//! Custom inventory gather pipeline.
//!
//! [`CustomGatherer`] drives one run through the stages:
//! 1. **Resolve**: pick the configured folder or the platform default
//! 2. **Discovery**: list `*.json` fragments, enforcing the file count limit
//! 3. **Validation**: read and convert each fragment into an [`InventoryItem`]
//! 4. **Aggregation**: drop duplicate type names, keep everything else
//!
//! Only the discovery count limit fails a run. Every other problem is logged
//! and the offending file skipped.

use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::config::Config;
use crate::gather::aggregate::Aggregator;
use crate::gather::discovery::{discover, FILE_SUFFIX};
use crate::gather::traits::{FileSystem, GatherError, Gatherer, LocalFileSystem};
use crate::gather::validate::read_item;
use crate::model::InventoryItem;
use crate::traits::StopType;

/// Name of the custom inventory gatherer.
pub const GATHERER_NAME: &str = "CustomInventory";

/// Gatherer for user-authored custom inventory fragments.
///
/// # Example
///
/// ```ignore
/// use custom_inventory::config::Config;
/// use custom_inventory::gather::{CustomGatherer, Gatherer};
///
/// let gatherer = CustomGatherer::new();
/// let items = gatherer.run(&Config::with_location("/etc/inventory/custom"))?;
/// println!("gathered {} custom items", items.len());
/// ```
pub struct CustomGatherer {
    /// Filesystem used for listing and reading fragments
    fs: Arc<dyn FileSystem>,
}

impl CustomGatherer {
    /// Creates a gatherer reading from the local filesystem.
    pub fn new() -> Self {
        Self {
            fs: Arc::new(LocalFileSystem),
        }
    }

    /// Replaces the filesystem collaborator.
    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }
}

impl Default for CustomGatherer {
    fn default() -> Self {
        Self::new()
    }
}

impl Gatherer for CustomGatherer {
    fn name(&self) -> &str {
        GATHERER_NAME
    }

    #[instrument(skip(self, config), fields(gatherer = GATHERER_NAME))]
    fn run(&self, config: &Config) -> Result<Vec<InventoryItem>, GatherError> {
        let folder = config.resolve_location();

        let files = discover(self.fs.as_ref(), &folder, FILE_SUFFIX).map_err(|source| {
            let err = GatherError::Discovery {
                folder: folder.clone(),
                source,
            };
            error!("{}", err);
            err
        })?;

        let mut aggregator = Aggregator::new();
        for file in &files {
            match read_item(self.fs.as_ref(), &file.path) {
                Ok(item) => {
                    aggregator.accept(&file.path, item);
                }
                Err(e) => aggregator.reject(&file.path, &e),
            }
        }

        debug!(
            items = aggregator.len(),
            skipped = aggregator.rejected(),
            "Count of custom inventory items"
        );
        if aggregator.is_empty() {
            info!(folder = %folder.display(), "No custom inventory item found");
        }

        Ok(aggregator.finish())
    }

    fn request_stop(&self, stop_type: StopType) -> Result<(), GatherError> {
        // Runs are short and blocking; they always finish once started.
        debug!(?stop_type, "Stop requested for custom inventory gatherer");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CUSTOM_INVENTORY_FOLDER;
    use crate::gather::testing::MemoryFileSystem;
    use std::path::Path;

    fn gatherer(fs: MemoryFileSystem) -> CustomGatherer {
        CustomGatherer::new().with_file_system(Arc::new(fs))
    }

    fn config() -> Config {
        Config::with_location("/inv")
    }

    const APP: &str = r#"{"TypeName":"Custom:App","SchemaVersion":"1.0","Content":{"k":"v"}}"#;

    #[test]
    fn test_single_valid_fragment() {
        let items = gatherer(MemoryFileSystem::new().with_file("/inv/a.json", APP))
            .run(&config())
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Custom:App");
        assert_eq!(items[0].schema_version, "1.0");
        assert_eq!(items[0].content[0]["k"], "v");
    }

    #[test]
    fn test_invalid_fragments_are_skipped() {
        let fs = MemoryFileSystem::new()
            .with_file("/inv/a.json", APP)
            .with_file(
                "/inv/b.json",
                r#"{"TypeName":"App","SchemaVersion":"1.0","Content":{}}"#,
            )
            .with_file(
                "/inv/c.json",
                r#"{"TypeName":"Custom:Num","SchemaVersion":"1.0","Content":{"k":1}}"#,
            )
            .with_file("/inv/d.json", "garbage")
            .with_unreadable_file("/inv/e.json");

        let items = gatherer(fs).run(&config()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Custom:App");
    }

    #[test]
    fn test_duplicate_type_name_keeps_first_file() {
        let fs = MemoryFileSystem::new()
            .with_file(
                "/inv/d.json",
                r#"{"TypeName":"Custom:X","SchemaVersion":"1.0","Content":{"from":"d"}}"#,
            )
            .with_file(
                "/inv/c.json",
                r#"{"TypeName":"Custom:X","SchemaVersion":"1.0","Content":{"from":"c"}}"#,
            );

        let items = gatherer(fs).run(&config()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content[0]["from"], "c");
    }

    #[test]
    fn test_too_many_files_fails_run() {
        let mut fs = MemoryFileSystem::new();
        for i in 0..21 {
            fs = fs.with_file(
                &format!("/inv/{i:02}.json"),
                format!(r#"{{"TypeName":"Custom:T{i}","SchemaVersion":"1.0","Content":{{}}}}"#),
            );
        }

        let err = gatherer(fs).run(&config()).unwrap_err();
        assert!(matches!(err, GatherError::Discovery { .. }));
    }

    #[test]
    fn test_missing_folder_is_empty_success() {
        let items = gatherer(MemoryFileSystem::new()).run(&config()).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_default_location_used_when_unset() {
        let path = Path::new(DEFAULT_CUSTOM_INVENTORY_FOLDER).join("a.json");
        let fs = MemoryFileSystem::new().with_file(&path.to_string_lossy(), APP);

        let items = gatherer(fs).run(&Config::default()).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_name_and_request_stop() {
        let gatherer = CustomGatherer::new();
        assert_eq!(gatherer.name(), "CustomInventory");
        assert!(gatherer.request_stop(StopType::Soft).is_ok());
        assert!(gatherer.request_stop(StopType::Hard).is_ok());
    }
}
