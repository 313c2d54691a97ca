//! Manifest request dedup, endpoint fan-out, and response aggregation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use appframe_core::{AppRequest, ManifestResponse, ResourceBundle};
use appframe_transport::TransportAdapter;

use crate::error::{EndpointError, EndpointFailure, LoadError};

/// The result of one fan-out: the merged bundle plus every endpoint that
/// failed to contribute.
#[derive(Debug)]
pub struct AggregateOutcome {
    /// Merged resources across all responding endpoints.
    pub bundle: ResourceBundle,
    /// Endpoints whose contribution was lost.
    pub failures: Vec<EndpointFailure>,
}

/// Groups app requests by manifest endpoint, issues exactly one POST per
/// distinct endpoint, and merges the responses.
///
/// The fan-out is a join barrier: every endpoint settles (response,
/// failure, or timeout) before the merge happens, and a failed endpoint
/// never blocks the others' contribution.
pub struct ManifestAggregator {
    adapter: Arc<TransportAdapter>,
    timeout: Duration,
}

impl ManifestAggregator {
    /// Create an aggregator over a transport adapter with a total budget
    /// per endpoint call.
    pub fn new(adapter: Arc<TransportAdapter>, timeout: Duration) -> Self {
        Self { adapter, timeout }
    }

    /// Fetch and merge manifests for the given requests.
    ///
    /// Requests with an empty manifest URL are pre-rendered: they skip the
    /// network entirely and must carry a root.
    pub async fn fetch(&self, requests: Vec<AppRequest>) -> Result<AggregateOutcome, LoadError> {
        for request in &requests {
            if request.is_pre_rendered() && request.root.is_none() {
                return Err(LoadError::Configuration(format!(
                    "request '{}' has no manifest url and no root",
                    request.app_id
                )));
            }
        }

        // Group by endpoint, preserving first-seen order.
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<&str, Vec<&AppRequest>> = HashMap::new();
        for request in requests.iter().filter(|r| !r.is_pre_rendered()) {
            if !groups.contains_key(request.manifest_url.as_str()) {
                order.push(request.manifest_url.clone());
            }
            groups
                .entry(request.manifest_url.as_str())
                .or_default()
                .push(request);
        }

        debug!(
            requests = requests.len(),
            endpoints = order.len(),
            "manifest fan-out"
        );

        // One serialized `params` payload per distinct endpoint.
        let mut endpoints: Vec<(String, String)> = Vec::with_capacity(order.len());
        for url in &order {
            let params = serde_json::to_string(&groups[url.as_str()])?;
            endpoints.push((url.clone(), params));
        }
        drop(groups);

        let calls = endpoints.iter().map(|(url, params)| {
            let data = vec![("params".to_string(), params.clone())];
            async move {
                let post = self.adapter.post(url, Some(data));
                match tokio::time::timeout(self.timeout, post).await {
                    Err(_) => Err(EndpointError::Timeout(self.timeout)),
                    Ok(Err(e)) => Err(EndpointError::Transport(e)),
                    Ok(Ok(response)) if !response.is_success() => {
                        Err(EndpointError::Status(response.status))
                    }
                    Ok(Ok(response)) => serde_json::from_str::<ManifestResponse>(&response.body)
                        .map_err(|e| EndpointError::Malformed(e.to_string())),
                }
            }
        });
        let results = futures::future::join_all(calls).await;

        let mut bundle = ResourceBundle::new(requests);
        let mut failures = Vec::new();
        for ((url, _), result) in endpoints.iter().zip(results) {
            match result {
                Ok(response) => bundle.push(url, response),
                Err(err) => {
                    error!(url = %url, error = %err, "manifest endpoint failed");
                    failures.push(EndpointFailure {
                        url: url.clone(),
                        error: err,
                    });
                }
            }
        }

        Ok(AggregateOutcome { bundle, failures })
    }
}
