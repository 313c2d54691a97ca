//! Error taxonomy for the loading pipeline.
//!
//! `LoadError` aborts a load call. Endpoint and per-app failures are
//! recorded, not raised: the pipeline keeps going with what it has and
//! reports them in the final `LoadReport`.

use std::time::Duration;

use appframe_core::{AppError, InstanceId};
use appframe_transport::TransportError;

/// Fatal error for one load call.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The caller's input was unusable.
    #[error("configuration: {0}")]
    Configuration(String),

    /// The external script batch failed; inline scripts and instantiation
    /// are blocked for the whole call.
    #[error("script batch failed loading {url}")]
    ScriptBatch {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to encode manifest request: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A host-supplied loader strategy failed.
    #[error(transparent)]
    Strategy(#[from] anyhow::Error),
}

/// Why one manifest endpoint's contribution was lost.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("endpoint returned status {0}")]
    Status(u16),

    #[error("endpoint timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed manifest: {0}")]
    Malformed(String),
}

/// A manifest endpoint that failed during fan-out. The rest of the load
/// call proceeds without its contribution.
#[derive(Debug)]
pub struct EndpointFailure {
    /// The endpoint URL.
    pub url: String,
    /// What went wrong.
    pub error: EndpointError,
}

/// Why one app did not reach a running state.
#[derive(Debug, thiserror::Error)]
pub enum AppFailureReason {
    #[error("no app class registered")]
    Unregistered,

    #[error("manifest returned no markup")]
    MissingMarkup,

    #[error(transparent)]
    App(#[from] AppError),
}

/// A single app's failure. Sibling apps keep loading.
#[derive(Debug)]
pub struct AppFailure {
    /// The appId that failed.
    pub app_id: String,
    /// The instance, if one had been created before the failure.
    pub instance_id: Option<InstanceId>,
    /// What went wrong.
    pub reason: AppFailureReason,
}
