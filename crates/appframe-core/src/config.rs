//! Host page configuration.

use std::time::Duration;

/// Configuration for the host page's loading pipeline.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// The host page's own URL, the base for origin classification and for
    /// absolutizing relative resource URLs.
    pub location: String,
    /// Whether query-string requests may be cached. When false a random
    /// cache-busting token is appended.
    pub use_cache: bool,
    /// Prefix for synthesized JSONP callback names.
    pub jsonp_prefix: String,
    /// Total budget for a single manifest endpoint call.
    pub endpoint_timeout: Duration,
    /// How long a script is given before its failure is reported.
    pub script_error_timeout: Duration,
    /// Enable verbose pipeline logging.
    pub debug: bool,
}

impl HostConfig {
    /// Create a configuration for a host page at the given location.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    /// Set whether query-string requests may be cached.
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Set the JSONP callback name prefix.
    pub fn with_jsonp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.jsonp_prefix = prefix.into();
        self
    }

    /// Set the per-endpoint call timeout.
    pub fn with_endpoint_timeout(mut self, timeout: Duration) -> Self {
        self.endpoint_timeout = timeout;
        self
    }

    /// Set the script error timeout.
    pub fn with_script_error_timeout(mut self, timeout: Duration) -> Self {
        self.script_error_timeout = timeout;
        self
    }

    /// Enable or disable debug logging.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            location: "http://localhost/".to_string(),
            use_cache: true,
            jsonp_prefix: "appframe_cb".to_string(),
            endpoint_timeout: Duration::from_secs(10),
            script_error_timeout: Duration::from_secs(7),
            debug: false,
        }
    }
}
