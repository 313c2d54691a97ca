//! Loading data model: requests, manifest payloads, merged bundles.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::document::DomNode;

/// Arbitrary caller-supplied context handed to an app at construction.
pub type AppContext = serde_json::Map<String, serde_json::Value>;

/// Unique identifier for one instantiated app.
///
/// Unique per instantiation, not per appId: the same app preloaded into two
/// roots yields two distinct instance ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InstanceId(pub String);

impl InstanceId {
    /// Generate a new RFC 4122 v4 instance id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Create from an existing id string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One app the caller wants loaded.
///
/// `manifest_url` is the dedup/grouping key for manifest requests. A request
/// carrying a `root` is pre-rendered: its markup is already on the page, so
/// no HTML is taken from the manifest for placement. Only `app_id` and
/// `context` go over the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRequest {
    /// Identifier the registry resolves to an app class.
    pub app_id: String,
    /// Context forwarded to the manifest endpoint and the app instance.
    pub context: AppContext,
    /// Manifest endpoint URL. Empty for pre-rendered requests.
    #[serde(skip)]
    pub manifest_url: String,
    /// Pre-rendered root node, if the app is already placed.
    #[serde(skip)]
    pub root: Option<DomNode>,
}

impl AppRequest {
    /// Create a request that fetches its resources from a manifest endpoint.
    pub fn new(app_id: impl Into<String>, manifest_url: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            context: AppContext::new(),
            manifest_url: manifest_url.into(),
            root: None,
        }
    }

    /// Create a pre-rendered request: no manifest fetch, root supplied.
    pub fn pre_rendered(app_id: impl Into<String>, root: DomNode) -> Self {
        Self {
            app_id: app_id.into(),
            context: AppContext::new(),
            manifest_url: String::new(),
            root: Some(root),
        }
    }

    /// Set the context object.
    pub fn with_context(mut self, context: AppContext) -> Self {
        self.context = context;
        self
    }

    /// Add a single context value.
    pub fn with_context_value(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Attach a pre-rendered root to this request.
    pub fn with_root(mut self, root: DomNode) -> Self {
        self.root = Some(root);
        self
    }

    /// Check whether this request skips the manifest fetch entirely.
    pub fn is_pre_rendered(&self) -> bool {
        self.manifest_url.is_empty()
    }
}

/// Per-app entry in a manifest response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestApp {
    /// Identifier matching the requested appId.
    #[serde(default)]
    pub app_id: String,
    /// HTML fragment for the app's root.
    #[serde(default)]
    pub html: String,
}

/// One manifest endpoint's payload. Any field may be absent or empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestResponse {
    /// Stylesheet URLs to link.
    #[serde(default)]
    pub styles: Vec<String>,
    /// External script URLs to load.
    #[serde(default)]
    pub scripts: Vec<String>,
    /// Inline script sources to evaluate after external scripts are ready.
    #[serde(default)]
    pub inline_scripts: Vec<String>,
    /// Per-app HTML entries.
    #[serde(default)]
    pub apps: Vec<ManifestApp>,
}

impl ManifestResponse {
    /// Check whether the response carries nothing at all.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
            && self.scripts.is_empty()
            && self.inline_scripts.is_empty()
            && self.apps.is_empty()
    }
}

/// One merged app entry, tagged with the endpoint that supplied it.
///
/// The tag keeps markup pairable per request: the same appId requested
/// from two different endpoints gets each endpoint's own fragment.
#[derive(Debug, Clone)]
pub struct BundleApp {
    /// The manifest endpoint whose response carried this entry.
    pub manifest_url: String,
    /// Identifier matching the requested appId.
    pub app_id: String,
    /// HTML fragment for the app's root.
    pub html: String,
}

/// The merged result of one load call across every manifest endpoint.
///
/// Field-wise, order-preserving concatenation of each endpoint's response,
/// plus the originating requests so activation can pair markup with the
/// instance that asked for it.
#[derive(Debug, Default)]
pub struct ResourceBundle {
    /// Stylesheet URLs, in merge order.
    pub styles: Vec<String>,
    /// External script URLs, in merge order.
    pub scripts: Vec<String>,
    /// Inline script sources, in merge order.
    pub inline_scripts: Vec<String>,
    /// App HTML entries, in merge order, each tagged with its endpoint.
    pub apps: Vec<BundleApp>,
    /// The requests this bundle was built for, in caller order.
    pub requests: Vec<AppRequest>,
}

impl ResourceBundle {
    /// Create an empty bundle for the given requests.
    pub fn new(requests: Vec<AppRequest>) -> Self {
        Self {
            requests,
            ..Self::default()
        }
    }

    /// Append one endpoint's response, preserving list order.
    pub fn push(&mut self, manifest_url: &str, response: ManifestResponse) {
        self.styles.extend(response.styles);
        self.scripts.extend(response.scripts);
        self.inline_scripts.extend(response.inline_scripts);
        self.apps.extend(response.apps.into_iter().map(|app| BundleApp {
            manifest_url: manifest_url.to_string(),
            app_id: app.app_id,
            html: app.html,
        }));
    }

    /// Find the HTML entry for an appId, preferring an entry supplied by
    /// the request's own manifest endpoint, then falling back to the first
    /// entry for the appId in merge order.
    pub fn html_for(&self, app_id: &str, manifest_url: &str) -> Option<&str> {
        self.apps
            .iter()
            .find(|a| a.app_id == app_id && a.manifest_url == manifest_url)
            .or_else(|| self.apps.iter().find(|a| a.app_id == app_id))
            .map(|a| a.html.as_str())
    }

    /// Check whether the bundle carries any resources or apps.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
            && self.scripts.is_empty()
            && self.inline_scripts.is_empty()
            && self.apps.is_empty()
    }
}

/// One instantiated app: its id, resolved root, and context.
///
/// Ownership of `root` transfers to the app class at construction; the
/// descriptor keeps a handle for the host's bookkeeping.
#[derive(Debug, Clone)]
pub struct AppInstance {
    /// Unique id for this instantiation.
    pub instance_id: InstanceId,
    /// The appId this instance was created for.
    pub app_id: String,
    /// Resolved DOM root for the instance.
    pub root: DomNode,
    /// Context the instance was constructed with.
    pub context: AppContext,
}

/// Instance descriptors keyed by appId.
///
/// A Vec per id: requesting the same appId against two roots produces two
/// instances.
pub type InstanceMap = HashMap<String, Vec<AppInstance>>;
