//! Host-supplied loader strategies.
//!
//! Each strategy fully replaces the corresponding default behavior when
//! configured. Contracts mirror the defaults: a strategy future completing
//! is the one-and-only "done" signal for its step.

use async_trait::async_trait;

use appframe_core::InstanceMap;

use crate::error::LoadError;

/// Replaces default `<link>` injection for an entire load call.
#[async_trait]
pub trait StyleLoader: Send + Sync {
    /// Load every style href in the bundle. Dedup is the strategy's
    /// responsibility once it takes over.
    async fn load_styles(&self, hrefs: &[String]) -> Result<(), LoadError>;
}

/// Replaces default script loading for an entire load call.
///
/// Contract: the returned future must complete exactly once, after all
/// `paths` and `inlines` are ready. An error blocks instantiation for the
/// whole call.
#[async_trait]
pub trait ScriptLoader: Send + Sync {
    /// Load the external batch, then run inline sources in order.
    async fn load_scripts(&self, paths: &[String], inlines: &[String]) -> Result<(), LoadError>;
}

/// Receives placements after HTML resolution, before any script work.
///
/// This is the host's chance to put each instance's root into the page so
/// scripts find it when they run.
pub trait PlacementHandler: Send + Sync {
    /// Act on the resolved placements for this load call.
    fn place(&self, instances: &InstanceMap);
}

/// Evaluates one inline script source.
///
/// Failures are logged and isolated; they never abort sibling inline
/// scripts or the pipeline.
pub trait InlineEvaluator: Send + Sync {
    /// Evaluate a single inline source.
    fn evaluate(&self, source: &str) -> anyhow::Result<()>;
}
