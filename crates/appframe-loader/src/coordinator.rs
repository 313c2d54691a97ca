//! The public entry point: one load call, end to end.

use std::sync::Arc;

use tracing::debug;

use appframe_core::{
    AppRegistry, AppRequest, Document, HostConfig, InstanceMap, SharedDocument,
};
use appframe_transport::{Transport, TransportAdapter};

use crate::activator::ResourceActivator;
use crate::aggregator::ManifestAggregator;
use crate::error::{AppFailure, EndpointFailure, LoadError};
use crate::strategy::{InlineEvaluator, PlacementHandler, ScriptLoader, StyleLoader};

/// The settled result of one load call.
///
/// The load future resolves only after instantiation, so a returned report
/// means every surviving app is running. Failures along the way are listed,
/// not raised.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Instance descriptors keyed by appId, one entry per placement.
    pub instances: InstanceMap,
    /// Manifest endpoints whose contribution was lost.
    pub failed_endpoints: Vec<EndpointFailure>,
    /// Apps that did not reach a running state.
    pub failed_apps: Vec<AppFailure>,
}

impl LoadReport {
    /// Total number of instantiated apps across all appIds.
    pub fn instance_count(&self) -> usize {
        self.instances.values().map(Vec::len).sum()
    }

    /// Instances created for one appId, in request order.
    pub fn instances_of(&self, app_id: &str) -> &[appframe_core::AppInstance] {
        self.instances.get(app_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check whether every endpoint responded and every app started.
    pub fn is_clean(&self) -> bool {
        self.failed_endpoints.is_empty() && self.failed_apps.is_empty()
    }
}

/// Wires the aggregator and activator into a single load call.
///
/// Holds the live document, the app registry, and the transport adapter;
/// one coordinator serves any number of sequential or interleaved load
/// calls against the same page.
pub struct LoadCoordinator {
    config: HostConfig,
    adapter: Arc<TransportAdapter>,
    registry: Arc<AppRegistry>,
    document: SharedDocument,
    style_loader: Option<Arc<dyn StyleLoader>>,
    script_loader: Option<Arc<dyn ScriptLoader>>,
    placement: Option<Arc<dyn PlacementHandler>>,
    evaluator: Option<Arc<dyn InlineEvaluator>>,
}

impl LoadCoordinator {
    /// Create a coordinator over a transport, with a fresh document and an
    /// empty registry.
    pub fn new(transport: Arc<dyn Transport>, config: HostConfig) -> Self {
        let adapter = Arc::new(
            TransportAdapter::new(transport)
                .with_location(config.location.clone())
                .with_jsonp_prefix(config.jsonp_prefix.clone()),
        );
        Self {
            config,
            adapter,
            registry: Arc::new(AppRegistry::new()),
            document: Document::shared(),
            style_loader: None,
            script_loader: None,
            placement: None,
            evaluator: None,
        }
    }

    /// Use a startup-populated app registry.
    pub fn with_registry(mut self, registry: AppRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Share an existing live document.
    pub fn with_document(mut self, document: SharedDocument) -> Self {
        self.document = document;
        self
    }

    /// Replace default style injection with a host strategy.
    pub fn with_style_loader(mut self, loader: Arc<dyn StyleLoader>) -> Self {
        self.style_loader = Some(loader);
        self
    }

    /// Replace default script loading with a host strategy.
    pub fn with_script_loader(mut self, loader: Arc<dyn ScriptLoader>) -> Self {
        self.script_loader = Some(loader);
        self
    }

    /// Receive placements before the script phase.
    pub fn with_placement_handler(mut self, handler: Arc<dyn PlacementHandler>) -> Self {
        self.placement = Some(handler);
        self
    }

    /// Set the inline script evaluator.
    pub fn with_inline_evaluator(mut self, evaluator: Arc<dyn InlineEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// The live document this coordinator activates into.
    pub fn document(&self) -> SharedDocument {
        self.document.clone()
    }

    /// The registry this coordinator resolves appIds against.
    pub fn registry(&self) -> Arc<AppRegistry> {
        self.registry.clone()
    }

    /// The adapter this coordinator issues requests through.
    pub fn adapter(&self) -> Arc<TransportAdapter> {
        self.adapter.clone()
    }

    /// Load a batch of apps: fetch and merge their manifests, activate the
    /// combined bundle, and settle once every surviving app is running.
    pub async fn load(&self, requests: Vec<AppRequest>) -> Result<LoadReport, LoadError> {
        if requests.is_empty() {
            return Ok(LoadReport::default());
        }
        debug!(requests = requests.len(), "load call started");

        let aggregator =
            ManifestAggregator::new(self.adapter.clone(), self.config.endpoint_timeout);
        let aggregate = aggregator.fetch(requests).await?;

        let mut activator = ResourceActivator::new(
            self.document.clone(),
            self.registry.clone(),
            self.adapter.clone(),
        )
        .with_cache(self.config.use_cache)
        .with_script_timeout(self.config.script_error_timeout);
        if let Some(loader) = &self.style_loader {
            activator = activator.with_style_loader(loader.clone());
        }
        if let Some(loader) = &self.script_loader {
            activator = activator.with_script_loader(loader.clone());
        }
        if let Some(handler) = &self.placement {
            activator = activator.with_placement_handler(handler.clone());
        }
        if let Some(evaluator) = &self.evaluator {
            activator = activator.with_inline_evaluator(evaluator.clone());
        }

        let activation = activator.activate(aggregate.bundle).await?;

        let report = LoadReport {
            instances: activation.instances,
            failed_endpoints: aggregate.failures,
            failed_apps: activation.failed_apps,
        };
        debug!(
            instances = report.instance_count(),
            failed_endpoints = report.failed_endpoints.len(),
            failed_apps = report.failed_apps.len(),
            "load call settled"
        );
        Ok(report)
    }

    /// Load a single app; the one-request form of [`load`](Self::load).
    pub async fn load_one(&self, request: AppRequest) -> Result<LoadReport, LoadError> {
        self.load(vec![request]).await
    }
}

impl std::fmt::Debug for LoadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadCoordinator")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}
