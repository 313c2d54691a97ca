//! The transport adapter: one logical GET/POST/JSONP exchange.

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::error::TransportError;
use crate::jsonp::JsonpCallbacks;
use crate::resolver;
use crate::transport::{Method, Transport, TransportRequest, TransportResponse};

/// Query-string or form data, in caller order.
pub type QueryData = Vec<(String, String)>;

/// Parameters for a unified [`TransportAdapter::request`] call.
#[derive(Debug, Clone)]
pub struct RequestParams {
    /// Target URL. Required; an empty URL fails before any dispatch.
    pub url: String,
    /// Explicit method, or `None` to pick by origin: JSONP when
    /// cross-origin, POST otherwise. GET is never auto-selected.
    pub method: Option<Method>,
    /// Data to serialize into the query string (GET/JSONP) or form body
    /// (POST).
    pub data: Option<QueryData>,
}

impl RequestParams {
    /// Parameters with no explicit method and no data.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: None,
            data: None,
        }
    }

    /// Set an explicit method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Attach data.
    pub fn with_data(mut self, data: QueryData) -> Self {
        self.data = Some(data);
        self
    }
}

/// Response from a unified [`TransportAdapter::request`] call.
#[derive(Debug)]
pub enum AdapterResponse {
    /// Raw response from a GET or POST exchange.
    Http(TransportResponse),
    /// Parsed payload from a JSONP exchange.
    Jsonp(serde_json::Value),
}

/// Issues single logical requests through an injected [`Transport`],
/// applying origin classification, query-string encoding, cache busting,
/// and JSONP callback wiring.
///
/// Guarantee: every call settles exactly once. No timeout is enforced at
/// this layer.
pub struct TransportAdapter {
    transport: Arc<dyn Transport>,
    location: String,
    jsonp_prefix: String,
    callbacks: JsonpCallbacks,
}

impl TransportAdapter {
    /// Create an adapter over a transport, with default location and
    /// callback prefix.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            location: "http://localhost/".to_string(),
            jsonp_prefix: "appframe_cb".to_string(),
            callbacks: JsonpCallbacks::new(),
        }
    }

    /// Set the host page location used for origin classification.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the JSONP callback name prefix.
    pub fn with_jsonp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.jsonp_prefix = prefix.into();
        self
    }

    /// The host page location this adapter classifies origins against.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The pending JSONP correlation table.
    pub fn callbacks(&self) -> &JsonpCallbacks {
        &self.callbacks
    }

    /// Issue a GET with data serialized into the query string.
    pub async fn get(
        &self,
        url: &str,
        data: Option<QueryData>,
        use_cache: bool,
    ) -> Result<TransportResponse, TransportError> {
        let params = RequestParams {
            url: url.to_string(),
            method: Some(Method::Get),
            data,
        };
        match self.request(params, use_cache).await? {
            AdapterResponse::Http(resp) => Ok(resp),
            AdapterResponse::Jsonp(_) => unreachable!("explicit GET never goes through jsonp"),
        }
    }

    /// Issue a POST with data form-encoded into the body.
    pub async fn post(
        &self,
        url: &str,
        data: Option<QueryData>,
    ) -> Result<TransportResponse, TransportError> {
        let params = RequestParams {
            url: url.to_string(),
            method: Some(Method::Post),
            data,
        };
        match self.request(params, true).await? {
            AdapterResponse::Http(resp) => Ok(resp),
            AdapterResponse::Jsonp(_) => unreachable!("explicit POST never goes through jsonp"),
        }
    }

    /// Issue a JSONP exchange and resolve with the invoked payload.
    pub async fn jsonp(
        &self,
        url: &str,
        data: Option<QueryData>,
        use_cache: bool,
    ) -> Result<serde_json::Value, TransportError> {
        let params = RequestParams {
            url: url.to_string(),
            method: Some(Method::Jsonp),
            data,
        };
        match self.request(params, use_cache).await? {
            AdapterResponse::Jsonp(payload) => Ok(payload),
            AdapterResponse::Http(_) => unreachable!("explicit JSONP never returns raw http"),
        }
    }

    /// Unified request entry point.
    ///
    /// Fails fast on a missing URL. Same-origin URLs are never treated as
    /// cross-origin regardless of caller intent; when no method is given,
    /// JSONP is picked for cross-origin targets and POST otherwise.
    pub async fn request(
        &self,
        params: RequestParams,
        use_cache: bool,
    ) -> Result<AdapterResponse, TransportError> {
        if params.url.trim().is_empty() {
            return Err(TransportError::MissingUrl);
        }

        let cross_origin = !resolver::is_same_origin(&params.url, &self.location)?;
        let method = params.method.unwrap_or(if cross_origin {
            Method::Jsonp
        } else {
            Method::Post
        });

        debug!(
            url = %params.url,
            method = method.wire_verb(),
            cross_origin,
            "dispatching request"
        );

        match method {
            Method::Jsonp => self
                .jsonp_exchange(&params.url, params.data.as_ref(), use_cache)
                .await
                .map(AdapterResponse::Jsonp),
            other => {
                let request = self.prepare(&params.url, other, params.data.as_ref(), use_cache, None);
                self.transport.send(request).await.map(AdapterResponse::Http)
            }
        }
    }

    async fn jsonp_exchange(
        &self,
        url: &str,
        data: Option<&QueryData>,
        use_cache: bool,
    ) -> Result<serde_json::Value, TransportError> {
        let name = self.callback_name();
        let rx = self.callbacks.register(&name);
        let request = self.prepare(url, Method::Jsonp, data, use_cache, Some(&name));

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                self.callbacks.remove(&name);
                return Err(e);
            }
        };

        if !response.is_success() {
            self.callbacks.remove(&name);
            return Err(TransportError::Http {
                status: response.status,
                url: url.to_string(),
            });
        }

        if let Err(e) = self.callbacks.dispatch(&response.body) {
            self.callbacks.remove(&name);
            return Err(e);
        }

        rx.await
            .map_err(|_| TransportError::Jsonp("callback settled without a payload".to_string()))
    }

    fn prepare(
        &self,
        url: &str,
        method: Method,
        data: Option<&QueryData>,
        use_cache: bool,
        callback: Option<&str>,
    ) -> TransportRequest {
        let mut url = url.trim().to_string();
        let mut body = None;

        if method.uses_query_string() {
            if let Some(data) = data.filter(|d| !d.is_empty()) {
                url = append_query(&url, &encode_query(data));
            }
            if let Some(name) = callback {
                url = append_query(&url, &format!("callback={name}"));
            }
            if !use_cache {
                url = append_query(&url, &cache_buster());
            }
        } else if let Some(data) = data.filter(|d| !d.is_empty()) {
            body = Some(encode_query(data));
        }

        TransportRequest { url, method, body }
    }

    /// Synthesize a callback name from the configured prefix and a random
    /// 0-999999 suffix. Collisions in this space are possible and not
    /// detected; a documented limitation of the JSONP scheme.
    fn callback_name(&self) -> String {
        let suffix: u32 = rand::rng().random_range(0..1_000_000);
        format!("{}_{}", self.jsonp_prefix, suffix)
    }
}

impl std::fmt::Debug for TransportAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportAdapter")
            .field("location", &self.location)
            .field("jsonp_prefix", &self.jsonp_prefix)
            .field("pending_callbacks", &self.callbacks.pending_count())
            .finish()
    }
}

/// Percent-encode data pairs into a query string.
pub fn encode_query(data: &QueryData) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(data.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish()
}

fn append_query(url: &str, piece: &str) -> String {
    let delim = if url.contains('?') { '&' } else { '?' };
    format!("{url}{delim}{piece}")
}

fn cache_buster() -> String {
    let token: u32 = rand::rng().random_range(0..1_000_000);
    token.to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    type Responder =
        Box<dyn Fn(&TransportRequest) -> Result<TransportResponse, TransportError> + Send + Sync>;

    struct MockTransport {
        requests: Mutex<Vec<TransportRequest>>,
        responder: Responder,
    }

    impl MockTransport {
        fn returning(responder: Responder) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                responder,
            })
        }

        fn ok(body: &str) -> Arc<Self> {
            let body = body.to_string();
            Self::returning(Box::new(move |_| Ok(TransportResponse::ok(body.clone()))))
        }

        /// Echo a padded JSONP response using the request's callback param.
        fn jsonp_echo(payload: &str) -> Arc<Self> {
            let payload = payload.to_string();
            Self::returning(Box::new(move |req| {
                let name = callback_param(&req.url).expect("no callback param");
                Ok(TransportResponse::ok(format!("{name}({payload})")))
            }))
        }

        fn sent(&self) -> Vec<TransportRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Transport for MockTransport {
        async fn send(
            &self,
            request: TransportRequest,
        ) -> Result<TransportResponse, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            (self.responder)(&request)
        }
    }

    fn callback_param(url: &str) -> Option<String> {
        url.split(['?', '&'])
            .find_map(|piece| piece.strip_prefix("callback="))
            .map(str::to_string)
    }

    fn adapter_at(transport: Arc<MockTransport>, location: &str) -> TransportAdapter {
        TransportAdapter::new(transport).with_location(location)
    }

    // === Fail-Fast Tests ===

    #[tokio::test]
    async fn test_missing_url_fails_before_dispatch() {
        let mock = MockTransport::ok("{}");
        let adapter = adapter_at(mock.clone(), "http://h.example/");

        let err = adapter.request(RequestParams::new("  "), true).await;
        assert!(matches!(err, Err(TransportError::MissingUrl)));
        assert!(mock.sent().is_empty());
    }

    // === Method Selection Tests ===

    #[tokio::test]
    async fn test_same_origin_defaults_to_post() {
        let mock = MockTransport::ok("{}");
        let adapter = adapter_at(mock.clone(), "http://h.example/page");

        adapter
            .request(RequestParams::new("http://h.example/manifest"), true)
            .await
            .unwrap();

        let sent = mock.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::Post);
    }

    #[tokio::test]
    async fn test_cross_origin_defaults_to_jsonp() {
        let mock = MockTransport::jsonp_echo("{}");
        let adapter = adapter_at(mock.clone(), "http://h.example/page");

        adapter
            .request(RequestParams::new("http://other.example/manifest"), true)
            .await
            .unwrap();

        let sent = mock.sent();
        assert_eq!(sent[0].method, Method::Jsonp);
        assert!(callback_param(&sent[0].url).is_some());
    }

    #[tokio::test]
    async fn test_same_origin_relative_url_defaults_to_post() {
        let mock = MockTransport::ok("{}");
        let adapter = adapter_at(mock.clone(), "http://h.example/page");

        adapter
            .request(RequestParams::new("/manifest"), true)
            .await
            .unwrap();

        assert_eq!(mock.sent()[0].method, Method::Post);
    }

    // === Query Encoding Tests ===

    #[tokio::test]
    async fn test_get_serializes_data_into_query() {
        let mock = MockTransport::ok("{}");
        let adapter = adapter_at(mock.clone(), "http://h.example/");

        adapter
            .get(
                "http://h.example/api",
                Some(vec![
                    ("a b".to_string(), "1&2".to_string()),
                    ("c".to_string(), "3".to_string()),
                ]),
                true,
            )
            .await
            .unwrap();

        let url = &mock.sent()[0].url;
        assert_eq!(url, "http://h.example/api?a+b=1%262&c=3");
    }

    #[tokio::test]
    async fn test_get_appends_after_existing_query() {
        let mock = MockTransport::ok("{}");
        let adapter = adapter_at(mock.clone(), "http://h.example/");

        adapter
            .get(
                "http://h.example/api?x=1",
                Some(vec![("y".to_string(), "2".to_string())]),
                true,
            )
            .await
            .unwrap();

        assert_eq!(mock.sent()[0].url, "http://h.example/api?x=1&y=2");
    }

    #[tokio::test]
    async fn test_get_without_data_leaves_url_untouched() {
        let mock = MockTransport::ok("{}");
        let adapter = adapter_at(mock.clone(), "http://h.example/");

        adapter.get("http://h.example/api", None, true).await.unwrap();

        assert_eq!(mock.sent()[0].url, "http://h.example/api");
    }

    #[tokio::test]
    async fn test_cache_busting_appends_token() {
        let mock = MockTransport::ok("{}");
        let adapter = adapter_at(mock.clone(), "http://h.example/");

        adapter.get("http://h.example/api", None, false).await.unwrap();

        let url = &mock.sent()[0].url;
        let (base, token) = url.split_once('?').unwrap();
        assert_eq!(base, "http://h.example/api");
        let token: u32 = token.parse().unwrap();
        assert!(token < 1_000_000);
    }

    #[tokio::test]
    async fn test_post_form_encodes_body() {
        let mock = MockTransport::ok("{}");
        let adapter = adapter_at(mock.clone(), "http://h.example/");

        adapter
            .post(
                "http://h.example/manifest",
                Some(vec![("params".to_string(), r#"[{"appId":"x"}]"#.to_string())]),
            )
            .await
            .unwrap();

        let sent = mock.sent();
        assert_eq!(sent[0].url, "http://h.example/manifest");
        let body = sent[0].body.as_deref().unwrap();
        assert!(body.starts_with("params=%5B%7B%22appId%22"));
    }

    // === JSONP Tests ===

    #[tokio::test]
    async fn test_jsonp_resolves_payload_and_clears_table() {
        let mock = MockTransport::jsonp_echo(r#"{"styles":["a.css"]}"#);
        let adapter = adapter_at(mock.clone(), "http://h.example/");

        let payload = adapter
            .jsonp("http://other.example/manifest", None, true)
            .await
            .unwrap();

        assert_eq!(payload["styles"][0], "a.css");
        assert_eq!(adapter.callbacks().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_jsonp_callback_name_uses_prefix() {
        let mock = MockTransport::jsonp_echo("{}");
        let adapter = adapter_at(mock.clone(), "http://h.example/").with_jsonp_prefix("cb");

        adapter
            .jsonp("http://other.example/m", None, true)
            .await
            .unwrap();

        let name = callback_param(&mock.sent()[0].url).unwrap();
        assert!(name.starts_with("cb_"));
        let suffix: u32 = name["cb_".len()..].parse().unwrap();
        assert!(suffix < 1_000_000);
    }

    #[tokio::test]
    async fn test_jsonp_transport_error_clears_table() {
        let mock = MockTransport::returning(Box::new(|_| {
            Err(TransportError::Connection("refused".to_string()))
        }));
        let adapter = adapter_at(mock, "http://h.example/");

        let result = adapter.jsonp("http://other.example/m", None, true).await;

        assert!(matches!(result, Err(TransportError::Connection(_))));
        assert_eq!(adapter.callbacks().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_jsonp_http_failure_clears_table() {
        let mock = MockTransport::returning(Box::new(|_| {
            Ok(TransportResponse {
                status: 500,
                body: String::new(),
            })
        }));
        let adapter = adapter_at(mock, "http://h.example/");

        let result = adapter.jsonp("http://other.example/m", None, true).await;

        assert!(matches!(result, Err(TransportError::Http { status: 500, .. })));
        assert_eq!(adapter.callbacks().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_jsonp_unpadded_body_is_an_error() {
        let mock = MockTransport::ok(r#"{"plain":"json"}"#);
        let adapter = adapter_at(mock, "http://h.example/");

        let result = adapter.jsonp("http://other.example/m", None, true).await;

        assert!(matches!(result, Err(TransportError::Jsonp(_))));
        assert_eq!(adapter.callbacks().pending_count(), 0);
    }
}
