//! The asynchronous multi-phase app loading pipeline.
//!
//! This crate provides:
//! - `ManifestAggregator` - Request dedup, endpoint fan-out, response merge
//! - `ResourceActivator` - Styles, scripts, and app instantiation in order
//! - `LoadCoordinator` - The public entry point for one load call
//! - Loader strategy traits for host-supplied style/script handling

mod activator;
mod aggregator;
mod coordinator;
mod error;
mod strategy;

pub use activator::*;
pub use aggregator::*;
pub use coordinator::*;
pub use error::*;
pub use strategy::*;

#[cfg(test)]
mod test_support;
