//! Inventory core plugin: owns the gatherers and runs them through the executor.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::Policy;
use crate::executor::InventoryExecutor;
use crate::gather::{CustomGatherer, Gatherer};
use crate::model::InventoryItem;
use crate::traits::{CorePlugin, PluginError, StopType};

/// Name of the inventory core plugin.
pub const INVENTORY_PLUGIN_NAME: &str = "Inventory";

pub struct InventoryPlugin {
    executor: InventoryExecutor,
    gatherers: Vec<Arc<dyn Gatherer>>,
    policy: Policy,
}

impl InventoryPlugin {
    /// Plugin with no gatherers and an empty policy.
    pub fn new() -> Self {
        Self {
            executor: InventoryExecutor::default(),
            gatherers: Vec::new(),
            policy: Policy::default(),
        }
    }

    /// Plugin with the custom inventory gatherer registered.
    pub fn with_custom_gatherer(policy: Policy) -> Self {
        Self::new()
            .with_policy(policy)
            .with_gatherer(Arc::new(CustomGatherer::new()))
    }

    /// Builds the default plugin from a policy document on disk.
    pub fn from_policy_file(path: &Path) -> Result<Self, PluginError> {
        let policy =
            Policy::load(path).map_err(|e| PluginError::Initialization(e.to_string()))?;
        Ok(Self::with_custom_gatherer(policy))
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_gatherer(mut self, gatherer: Arc<dyn Gatherer>) -> Self {
        self.gatherers.push(gatherer);
        self
    }

    pub fn with_executor(mut self, executor: InventoryExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Runs every gatherer once, in registration order.
    ///
    /// Each gatherer receives its entry from the policy document, or the
    /// default config when it has none. The first failing gatherer aborts
    /// collection.
    #[instrument(skip(self))]
    pub async fn collect(&self) -> Result<Vec<InventoryItem>, PluginError> {
        let mut items = Vec::new();
        for gatherer in &self.gatherers {
            let config = self.policy.config_for(gatherer.name());
            let gathered = self.executor.execute(Arc::clone(gatherer), config).await?;
            items.extend(gathered);
        }
        info!(items = items.len(), "Collected inventory items");
        Ok(items)
    }
}

impl Default for InventoryPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CorePlugin for InventoryPlugin {
    fn name(&self) -> &str {
        INVENTORY_PLUGIN_NAME
    }

    async fn execute(&self) -> Result<(), PluginError> {
        // Uploading to the inventory service happens downstream.
        let items = self.collect().await?;
        info!(items = items.len(), "Inventory collection finished");
        Ok(())
    }

    async fn request_stop(&self, stop_type: StopType) -> Result<(), PluginError> {
        for gatherer in &self.gatherers {
            if let Err(e) = gatherer.request_stop(stop_type) {
                warn!(gatherer = gatherer.name(), error = %e, "Stop request failed");
            }
        }
        Ok(())
    }
}
