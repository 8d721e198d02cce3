//! Ordered registry of core plugins.
//!
//! A [`PluginRegistry`] is normally built once at startup and passed by
//! reference to whoever drives the plugins. [`registered_core_plugins`] offers
//! a process-wide instance whose construction runs exactly once, however
//! many threads race to read it first.

use std::fmt::Display;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error};

use crate::traits::CorePlugin;

#[derive(Default, Clone)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn CorePlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a plugin. Registration order is preserved.
    pub fn register(mut self, plugin: Arc<dyn CorePlugin>) -> Self {
        debug!(plugin = plugin.name(), "Registered core plugin");
        self.plugins.push(plugin);
        self
    }

    /// Appends a plugin whose construction may have failed.
    ///
    /// A failed construction is logged and skipped so the remaining plugins
    /// still load.
    pub fn register_fallible<E: Display>(self, plugin: Result<Arc<dyn CorePlugin>, E>) -> Self {
        match plugin {
            Ok(plugin) => self.register(plugin),
            Err(e) => {
                error!(error = %e, "Failed to initialize core plugin, skipping");
                self
            }
        }
    }

    /// Plugins in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn CorePlugin>> {
        self.plugins.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

static REGISTERED_CORE_PLUGINS: OnceLock<PluginRegistry> = OnceLock::new();

/// Returns the process-wide registry, building it with `load` on first access.
///
/// Later calls return the same registry and never invoke their `load`.
pub fn registered_core_plugins<F>(load: F) -> &'static PluginRegistry
where
    F: FnOnce() -> PluginRegistry,
{
    REGISTERED_CORE_PLUGINS.get_or_init(load)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{PluginError, StopType};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NamedPlugin(&'static str);

    #[async_trait]
    impl CorePlugin for NamedPlugin {
        fn name(&self) -> &str {
            self.0
        }

        async fn execute(&self) -> Result<(), PluginError> {
            Ok(())
        }

        async fn request_stop(&self, _stop_type: StopType) -> Result<(), PluginError> {
            Ok(())
        }
    }

    #[test]
    fn test_registration_order_preserved() {
        let registry = PluginRegistry::new()
            .register(Arc::new(NamedPlugin("HealthCheck")))
            .register(Arc::new(NamedPlugin("MessageProcessor")))
            .register(Arc::new(NamedPlugin("Inventory")));

        assert_eq!(
            registry.names(),
            vec!["HealthCheck", "MessageProcessor", "Inventory"]
        );
        assert_eq!(registry.len(), 3);
    }

    /// Appends its name to a shared log when executed.
    struct RecordingPlugin {
        name: &'static str,
        log: Arc<std::sync::Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl CorePlugin for RecordingPlugin {
        fn name(&self) -> &str {
            self.name
        }

        async fn execute(&self) -> Result<(), PluginError> {
            self.log.lock().unwrap().push(self.name);
            Ok(())
        }

        async fn request_stop(&self, _stop_type: StopType) -> Result<(), PluginError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_iter_executes_in_registration_order() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let registry = ["HealthCheck", "StartupProcessor", "Inventory"]
            .into_iter()
            .fold(PluginRegistry::new(), |registry, name| {
                registry.register(Arc::new(RecordingPlugin {
                    name,
                    log: Arc::clone(&log),
                }))
            });

        for plugin in registry.iter() {
            plugin.execute().await.unwrap();
        }

        assert_eq!(
            *log.lock().unwrap(),
            vec!["HealthCheck", "StartupProcessor", "Inventory"]
        );
    }

    #[test]
    fn test_failed_plugin_is_skipped() {
        let failed: Result<Arc<dyn CorePlugin>, String> = Err("offline processor".to_string());
        let registry = PluginRegistry::new()
            .register(Arc::new(NamedPlugin("HealthCheck")))
            .register_fallible(failed)
            .register_fallible::<String>(Ok(Arc::new(NamedPlugin("StartupProcessor"))));

        assert_eq!(registry.names(), vec!["HealthCheck", "StartupProcessor"]);
    }

    #[test]
    fn test_global_registry_loads_once() {
        static LOADS: AtomicUsize = AtomicUsize::new(0);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    registered_core_plugins(|| {
                        LOADS.fetch_add(1, Ordering::SeqCst);
                        PluginRegistry::new().register(Arc::new(NamedPlugin("Inventory")))
                    })
                    .len()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
        let again = registered_core_plugins(PluginRegistry::new);
        assert_eq!(again.names(), vec!["Inventory"]);
        assert_eq!(LOADS.load(Ordering::SeqCst), 1);
    }
}
