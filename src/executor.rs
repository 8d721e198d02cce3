use crate::config::Config;
use crate::gather::{GatherError, Gatherer};
use crate::model::InventoryItem;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, instrument};

/// Runs blocking gatherers off the async runtime.
///
/// Gatherers assume a single caller at a time; the semaphore serializes
/// overlapping callers (one permit by default).
pub struct InventoryExecutor {
    semaphore: Arc<Semaphore>,
}

impl InventoryExecutor {
    pub fn new(concurrency_limit: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency_limit)),
        }
    }

    #[instrument(skip(self, gatherer, config), fields(gatherer = gatherer.name()))]
    pub async fn execute<G>(
        &self,
        gatherer: Arc<G>,
        config: Config,
    ) -> Result<Vec<InventoryItem>, GatherError>
    where
        G: Gatherer + ?Sized + 'static,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| GatherError::Executor(format!("Semaphore error: {}", e)))?;

        info!("Starting gather: {}", gatherer.name());

        let worker = Arc::clone(&gatherer);
        let result = tokio::task::spawn_blocking(move || worker.run(&config))
            .await
            .map_err(|e| GatherError::Executor(format!("Task join error: {}", e)))?;

        info!("Finished gather: {}", gatherer.name());
        result
    }
}

impl Default for InventoryExecutor {
    fn default() -> Self {
        Self::new(1)
    }
}
