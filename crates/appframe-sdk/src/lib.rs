//! Public SDK for the appframe app-loading platform.
//!
//! This crate re-exports all platform functionality:
//!
//! ```ignore
//! use appframe_sdk::prelude::*;
//!
//! let mut registry = AppRegistry::new();
//! registry.register_fn("com_example_news", |instance| {
//!     Ok(Box::new(NewsApp::new(instance)) as Box<dyn AppClass>)
//! });
//!
//! let coordinator = LoadCoordinator::new(transport, HostConfig::new(location))
//!     .with_registry(registry);
//!
//! let report = coordinator
//!     .load_one(AppRequest::new("com_example_news", manifest_url))
//!     .await?;
//! ```

pub use appframe_core;
pub use appframe_loader;
pub use appframe_transport;

/// Prelude for convenient imports.
pub mod prelude {
    pub use appframe_core::*;
    pub use appframe_loader::*;
    pub use appframe_transport::*;
}
