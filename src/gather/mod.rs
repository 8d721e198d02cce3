//! Gather module - custom inventory discovery and validation pipeline.
//!
//! This module provides the building blocks of the custom inventory gatherer:
//! - **Traits**: [`Gatherer`] and the injectable [`FileSystem`]
//! - **Discovery**: fragment listing with a per-run file limit
//! - **Validation**: schema and size checks producing [`crate::model::InventoryItem`]
//! - **Aggregation**: type-name deduplication across one run
//! - **Pipeline**: the [`CustomGatherer`] orchestrator

pub mod aggregate;
pub mod discovery;
pub mod pipeline;
pub mod traits;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use traits::{
    DirEntryInfo, DiscoveryError, FailureKind, FileSystem, GatherError, Gatherer,
    LocalFileSystem, ValidationError,
};

pub use aggregate::Aggregator;
pub use discovery::{discover, DiscoveredFile, CUSTOM_INVENTORY_COUNT_LIMIT, FILE_SUFFIX};
pub use pipeline::{CustomGatherer, GATHERER_NAME};
pub use validate::{convert_to_item, read_item};
