//! URL resolution and transport layer for the appframe platform.
//!
//! This crate provides:
//! - `resolver` - URL parsing, absolutization, origin classification
//! - `Transport` trait - The injected network collaborator
//! - `TransportAdapter` - GET/POST/JSONP with query encoding and cache busting
//! - `JsonpCallbacks` - Per-adapter JSONP correlation table

mod adapter;
mod error;
mod jsonp;
pub mod resolver;
mod transport;

pub use adapter::*;
pub use error::*;
pub use jsonp::*;
pub use transport::*;
