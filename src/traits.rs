use async_trait::async_trait;
use thiserror::Error;

use crate::gather::GatherError;

/// How urgently a component is asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopType {
    Soft,
    Hard,
}

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Gather failed: {0}")]
    Gather(#[from] GatherError),
    #[error("Plugin initialization failed: {0}")]
    Initialization(String),
}

#[async_trait]
pub trait CorePlugin: Send + Sync {
    /// Returns the fixed name identifying this plugin (e.g., "Inventory").
    fn name(&self) -> &str;

    /// Runs one pass of the plugin's work.
    async fn execute(&self) -> Result<(), PluginError>;

    /// Best-effort request to stop in-flight work.
    async fn request_stop(&self, stop_type: StopType) -> Result<(), PluginError>;
}
