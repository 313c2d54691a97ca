//! Shared test fixtures for the pipeline's unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use appframe_transport::{Transport, TransportError, TransportRequest, TransportResponse};

/// Canned response for one routed URL.
pub enum Route {
    Body(String),
    Status(u16),
    Error(String),
    Delay(Duration, String),
}

/// In-memory transport with per-URL canned responses. Routes match the
/// request URL with its query string stripped; unrouted URLs get a 404.
#[derive(Default)]
pub struct RouteTransport {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<TransportRequest>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl RouteTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(self: &Arc<Self>, url: &str, body: &str) -> Arc<Self> {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Body(body.to_string()));
        self.clone()
    }

    pub fn route_status(self: &Arc<Self>, url: &str, status: u16) -> Arc<Self> {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Status(status));
        self.clone()
    }

    pub fn route_error(self: &Arc<Self>, url: &str, message: &str) -> Arc<Self> {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Error(message.to_string()));
        self.clone()
    }

    pub fn route_delayed(self: &Arc<Self>, url: &str, delay: Duration, body: &str) -> Arc<Self> {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Delay(delay, body.to_string()));
        self.clone()
    }

    pub fn sent(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn sent_urls(&self) -> Vec<String> {
        self.sent().into_iter().map(|r| r.url).collect()
    }

    /// Ordered event log shared with other fixtures, for barrier checks.
    pub fn event_log(&self) -> Arc<Mutex<Vec<String>>> {
        self.log.clone()
    }

    pub fn record(&self, event: impl Into<String>) {
        self.log.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RouteTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let key = request.url.split('?').next().unwrap_or_default().to_string();
        self.record(format!("fetch:{key}"));

        let delayed = {
            let routes = self.routes.lock().unwrap();
            match routes.get(&key) {
                None => return Ok(TransportResponse {
                    status: 404,
                    body: String::new(),
                }),
                Some(Route::Body(body)) => return Ok(TransportResponse::ok(body.clone())),
                Some(Route::Status(status)) => {
                    return Ok(TransportResponse {
                        status: *status,
                        body: String::new(),
                    })
                }
                Some(Route::Error(message)) => {
                    return Err(TransportError::Connection(message.clone()))
                }
                Some(Route::Delay(delay, body)) => (*delay, body.clone()),
            }
        };

        tokio::time::sleep(delayed.0).await;
        Ok(TransportResponse::ok(delayed.1))
    }
}
