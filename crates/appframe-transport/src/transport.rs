//! The transport collaborator: one network exchange in, one response out.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::TransportError;

/// Request method at the adapter level.
///
/// JSONP goes over the wire as a GET; the variant survives here so the
/// adapter can apply query-string encoding and callback wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Jsonp,
}

impl Method {
    /// The HTTP verb a transport should actually issue.
    pub fn wire_verb(&self) -> &'static str {
        match self {
            Self::Get | Self::Jsonp => "GET",
            Self::Post => "POST",
        }
    }

    /// Check whether this method carries its data in the query string.
    pub fn uses_query_string(&self) -> bool {
        matches!(self, Self::Get | Self::Jsonp)
    }
}

/// A single logical request handed to the transport.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Fully prepared URL, query string included.
    pub url: String,
    /// Request method.
    pub method: Method,
    /// Form-encoded body, for POST.
    pub body: Option<String>,
}

/// The raw response a transport returns.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl TransportResponse {
    /// Create a successful response with a body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Check whether the response was successful (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_str(&self.body)
            .map_err(|e| TransportError::Deserialization(e.to_string()))
    }
}

/// Performs the actual network I/O for one request.
///
/// The pipeline never constructs sockets itself; the host injects whatever
/// transport fits its runtime. Implementations must settle exactly once per
/// call: a returned `Ok` or `Err`, never both, never neither.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one network exchange.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_wire_verbs() {
        assert_eq!(Method::Get.wire_verb(), "GET");
        assert_eq!(Method::Jsonp.wire_verb(), "GET");
        assert_eq!(Method::Post.wire_verb(), "POST");
    }

    #[test]
    fn test_query_string_methods() {
        assert!(Method::Get.uses_query_string());
        assert!(Method::Jsonp.uses_query_string());
        assert!(!Method::Post.uses_query_string());
    }

    #[test]
    fn test_response_json() {
        let resp = TransportResponse::ok(r#"{"a":1}"#);
        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value["a"], 1);

        let bad = TransportResponse::ok("not json");
        assert!(bad.json::<serde_json::Value>().is_err());
    }
}
