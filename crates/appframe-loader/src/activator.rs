//! Ordered resource activation: styles, markup, scripts, instantiation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use appframe_core::{
    AppInstance, AppRegistry, DomNode, InstanceId, InstanceMap, ResourceBundle, SharedDocument,
};
use appframe_transport::{TransportAdapter, TransportError};

use crate::error::{AppFailure, AppFailureReason, LoadError};
use crate::strategy::{InlineEvaluator, PlacementHandler, ScriptLoader, StyleLoader};

/// The result of activating one bundle.
#[derive(Debug)]
pub struct ActivationOutcome {
    /// Instance descriptors keyed by appId.
    pub instances: InstanceMap,
    /// Apps that did not reach a running state.
    pub failed_apps: Vec<AppFailure>,
}

/// One resolved placement, in request order.
struct Placement {
    instance: AppInstance,
    pre_rendered: bool,
}

/// Activates a merged resource bundle against the live document.
///
/// Phases run in strict order over the whole bundle, each a global barrier:
/// styles, then HTML placement, then the external script batch, then inline
/// scripts, then instantiation. A script batch failure blocks everything
/// after it; endpoint and per-app failures never do.
pub struct ResourceActivator {
    document: SharedDocument,
    registry: Arc<AppRegistry>,
    adapter: Arc<TransportAdapter>,
    use_cache: bool,
    script_timeout: Option<Duration>,
    style_loader: Option<Arc<dyn StyleLoader>>,
    script_loader: Option<Arc<dyn ScriptLoader>>,
    placement: Option<Arc<dyn PlacementHandler>>,
    evaluator: Option<Arc<dyn InlineEvaluator>>,
}

impl ResourceActivator {
    /// Create an activator over the live document, the app registry, and
    /// the adapter used for default script fetching.
    pub fn new(
        document: SharedDocument,
        registry: Arc<AppRegistry>,
        adapter: Arc<TransportAdapter>,
    ) -> Self {
        Self {
            document,
            registry,
            adapter,
            use_cache: true,
            script_timeout: None,
            style_loader: None,
            script_loader: None,
            placement: None,
            evaluator: None,
        }
    }

    /// Set whether default script fetches may be cached.
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Bound how long each default script fetch may take before its failure
    /// is reported.
    pub fn with_script_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout = Some(timeout);
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

    /// Hand placements to the host instead of appending to the document.
    pub fn with_placement_handler(mut self, handler: Arc<dyn PlacementHandler>) -> Self {
        self.placement = Some(handler);
        self
    }

    /// Set the inline script evaluator.
    pub fn with_inline_evaluator(mut self, evaluator: Arc<dyn InlineEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Activate the bundle: styles, placement, scripts, instantiation.
    pub async fn activate(&self, bundle: ResourceBundle) -> Result<ActivationOutcome, LoadError> {
        debug!(
            styles = bundle.styles.len(),
            scripts = bundle.scripts.len(),
            inline_scripts = bundle.inline_scripts.len(),
            apps = bundle.apps.len(),
            "activating bundle"
        );

        self.load_styles(&bundle.styles).await?;

        let mut failed_apps = Vec::new();
        let placed = self.place_html(&bundle, &mut failed_apps);

        let mut instances = InstanceMap::new();
        for placement in &placed {
            instances
                .entry(placement.instance.app_id.clone())
                .or_default()
                .push(placement.instance.clone());
        }

        // The host gets the roots before any script runs against them.
        match &self.placement {
            Some(handler) => handler.place(&instances),
            None => {
                let mut doc = self.document.lock().expect("document poisoned");
                for placement in placed.iter().filter(|p| !p.pre_rendered) {
                    doc.append_body(placement.instance.root.clone());
                }
            }
        }

        self.load_scripts(&bundle).await?;
        self.instantiate(&placed, &mut failed_apps);

        Ok(ActivationOutcome {
            instances,
            failed_apps,
        })
    }

    async fn load_styles(&self, hrefs: &[String]) -> Result<(), LoadError> {
        if hrefs.is_empty() {
            return Ok(());
        }
        if let Some(loader) = &self.style_loader {
            return loader.load_styles(hrefs).await;
        }
        // Batch insert; hrefs already on the page are skipped.
        let mut doc = self.document.lock().expect("document poisoned");
        doc.append_links(hrefs.iter().cloned());
        Ok(())
    }

    fn place_html(&self, bundle: &ResourceBundle, failed: &mut Vec<AppFailure>) -> Vec<Placement> {
        let mut placed = Vec::new();
        for request in bundle.requests.iter().filter(|r| !r.app_id.is_empty()) {
            let (root, pre_rendered) = match &request.root {
                Some(root) => (root.clone(), true),
                None => match bundle.html_for(&request.app_id, &request.manifest_url) {
                    Some(html) => (DomNode::from_html(html), false),
                    None => {
                        warn!(app_id = %request.app_id, "manifest returned no markup");
                        failed.push(AppFailure {
                            app_id: request.app_id.clone(),
                            instance_id: None,
                            reason: AppFailureReason::MissingMarkup,
                        });
                        continue;
                    }
                },
            };

            placed.push(Placement {
                instance: AppInstance {
                    instance_id: InstanceId::generate(),
                    app_id: request.app_id.clone(),
                    root,
                    context: request.context.clone(),
                },
                pre_rendered,
            });
        }
        placed
    }

    async fn load_scripts(&self, bundle: &ResourceBundle) -> Result<(), LoadError> {
        if bundle.scripts.is_empty() && bundle.inline_scripts.is_empty() {
            return Ok(());
        }
        if let Some(loader) = &self.script_loader {
            return loader
                .load_scripts(&bundle.scripts, &bundle.inline_scripts)
                .await;
        }

        // The external batch is a single gate: every script must be ready
        // before any inline source runs.
        if !bundle.scripts.is_empty() {
            let fetches = bundle.scripts.iter().map(|src| async move {
                (src.clone(), self.fetch_script(src).await)
            });
            for (src, result) in futures::future::join_all(fetches).await {
                match result {
                    Ok(response) if response.is_success() => {
                        self.document
                            .lock()
                            .expect("document poisoned")
                            .append_script(&src);
                    }
                    Ok(response) => {
                        return Err(LoadError::ScriptBatch {
                            url: src.clone(),
                            source: TransportError::Http {
                                status: response.status,
                                url: src,
                            },
                        })
                    }
                    Err(source) => return Err(LoadError::ScriptBatch { url: src, source }),
                }
            }
        }

        for source in &bundle.inline_scripts {
            let result = match &self.evaluator {
                Some(evaluator) => evaluator.evaluate(source),
                None => Ok(()),
            };
            match result {
                Ok(()) => {
                    self.document
                        .lock()
                        .expect("document poisoned")
                        .record_inline(source);
                }
                Err(error) => {
                    warn!(error = %error, source = %source, "error loading inline script");
                }
            }
        }
        Ok(())
    }

    async fn fetch_script(
        &self,
        src: &str,
    ) -> Result<appframe_transport::TransportResponse, TransportError> {
        let fetch = self.adapter.get(src, None, self.use_cache);
        match self.script_timeout {
            Some(budget) => tokio::time::timeout(budget, fetch)
                .await
                .map_err(|_| TransportError::Timeout(budget))?,
            None => fetch.await,
        }
    }

    fn instantiate(&self, placed: &[Placement], failed: &mut Vec<AppFailure>) {
        for placement in placed {
            let instance = &placement.instance;
            let Some(factory) = self.registry.get(&instance.app_id) else {
                warn!(app_id = %instance.app_id, "no app class registered");
                failed.push(AppFailure {
                    app_id: instance.app_id.clone(),
                    instance_id: Some(instance.instance_id.clone()),
                    reason: AppFailureReason::Unregistered,
                });
                continue;
            };

            match factory.create(instance).and_then(|mut app| app.init()) {
                Ok(()) => {
                    debug!(app_id = %instance.app_id, instance_id = %instance.instance_id, "app instantiated");
                }
                Err(error) => {
                    warn!(app_id = %instance.app_id, error = %error, "app failed to start");
                    failed.push(AppFailure {
                        app_id: instance.app_id.clone(),
                        instance_id: Some(instance.instance_id.clone()),
                        reason: AppFailureReason::App(error),
                    });
                }
            }
        }
    }
}
