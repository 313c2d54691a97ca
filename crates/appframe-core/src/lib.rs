//! Core abstractions for the appframe app-loading platform.
//!
//! This crate provides the fundamental types:
//! - `AppRequest` / `ManifestResponse` / `ResourceBundle` - Loading data model
//! - `Document` / `DomNode` - Host-page document model
//! - `AppRegistry` - Explicit appId-to-factory registry
//! - `HostConfig` - Host page configuration

mod config;
mod document;
mod error;
mod model;
mod registry;

pub use config::*;
pub use document::*;
pub use error::*;
pub use model::*;
pub use registry::*;
