pub mod config;
pub mod executor;
pub mod gather;
pub mod model;
pub mod plugin;
pub mod registry;
pub mod traits;

// Re-export common types for convenience
pub use config::*;
pub use executor::*;
pub use model::*;
pub use plugin::*;
pub use registry::*;
pub use traits::*;
