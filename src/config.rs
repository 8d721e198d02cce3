//! Gatherer configuration and inventory policy documents.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::{lookup_field, string_field};

/// Folder scanned for custom inventory fragments when no location is configured.
#[cfg(windows)]
pub const DEFAULT_CUSTOM_INVENTORY_FOLDER: &str =
    r"C:\ProgramData\Amazon\SSM\InstanceData\inventory\custom";

/// Folder scanned for custom inventory fragments when no location is configured.
#[cfg(not(windows))]
pub const DEFAULT_CUSTOM_INVENTORY_FOLDER: &str = "/var/lib/amazon/ssm/inventory/custom";

/// Properties that can be supplied to a gatherer.
///
/// Not every property applies to every gatherer. The custom gatherer only
/// looks at `location`. Field names match case-insensitively when decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    pub collection: String,
    pub filters: Vec<String>,
    pub location: String,
}

impl Config {
    /// Config pointing at an explicit folder.
    pub fn with_location(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    /// Folder to scan: the configured location, or the platform default.
    pub fn resolve_location(&self) -> PathBuf {
        if self.location.is_empty() {
            PathBuf::from(DEFAULT_CUSTOM_INVENTORY_FOLDER)
        } else {
            PathBuf::from(&self.location)
        }
    }
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        let filters = match lookup_field(&fields, "Filters") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => Vec::<String>::deserialize(value).map_err(D::Error::custom)?,
        };
        Ok(Self {
            collection: string_field(&fields, "Collection").map_err(D::Error::custom)?,
            filters,
            location: string_field(&fields, "Location").map_err(D::Error::custom)?,
        })
    }
}

/// Inventory policy document: per-gatherer configuration keyed by gatherer name.
///
/// The `InventoryPolicy` key matches case-insensitively; gatherer names do not.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Policy {
    #[serde(rename = "InventoryPolicy")]
    pub inventory_policy: HashMap<String, Config>,
}

impl<'de> Deserialize<'de> for Policy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        let inventory_policy = match lookup_field(&fields, "InventoryPolicy") {
            None | Some(Value::Null) => HashMap::new(),
            Some(value) => {
                HashMap::<String, Config>::deserialize(value).map_err(D::Error::custom)?
            }
        };
        Ok(Self { inventory_policy })
    }
}

impl Policy {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&bytes)
    }

    /// Config for `gatherer`, or the default config if the policy has no entry.
    pub fn config_for(&self, gatherer: &str) -> Config {
        self.inventory_policy
            .get(gatherer)
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read policy file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse policy document: {0}")]
    Parse(#[from] serde_json::Error),
}
