//! JSONP callback correlation.
//!
//! Classic JSONP installs callbacks on a shared global namespace; here
//! each adapter owns its own correlation table. An entry lives from
//! registration until the padded response (or a transport failure) settles
//! it, and is removed on every path.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::oneshot;

use crate::error::TransportError;

/// Per-adapter table of pending JSONP callbacks.
#[derive(Debug, Default)]
pub struct JsonpCallbacks {
    pending: Mutex<HashMap<String, oneshot::Sender<serde_json::Value>>>,
}

impl JsonpCallbacks {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback name and get the receiver its payload resolves.
    pub fn register(&self, name: &str) -> oneshot::Receiver<serde_json::Value> {
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .expect("jsonp table poisoned")
            .insert(name.to_string(), tx);
        rx
    }

    /// Remove a pending entry without resolving it.
    pub fn remove(&self, name: &str) {
        self.pending.lock().expect("jsonp table poisoned").remove(name);
    }

    /// Resolve a pending callback with its payload. Returns false if the
    /// name is unknown or already settled.
    pub fn resolve(&self, name: &str, payload: serde_json::Value) -> bool {
        let sender = self.pending.lock().expect("jsonp table poisoned").remove(name);
        match sender {
            Some(tx) => tx.send(payload).is_ok(),
            None => false,
        }
    }

    /// Unwrap a padded response body `name(payload)` and resolve the
    /// matching entry.
    pub fn dispatch(&self, body: &str) -> Result<(), TransportError> {
        let (name, payload) = unwrap_padding(body)?;
        if self.resolve(name, payload) {
            Ok(())
        } else {
            Err(TransportError::Jsonp(format!(
                "no pending callback named {name}"
            )))
        }
    }

    /// Number of callbacks still pending.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().expect("jsonp table poisoned").len()
    }
}

/// Split a padded body `name(payload);` into the callback name and the
/// parsed JSON payload.
fn unwrap_padding(body: &str) -> Result<(&str, serde_json::Value), TransportError> {
    let body = body.trim();
    let open = body
        .find('(')
        .ok_or_else(|| TransportError::Jsonp("response is not padded".to_string()))?;
    let name = body[..open].trim();
    let rest = body[open + 1..].trim_end_matches(';').trim_end();
    let inner = rest
        .strip_suffix(')')
        .ok_or_else(|| TransportError::Jsonp("unterminated padding".to_string()))?;
    let payload = serde_json::from_str(inner)
        .map_err(|e| TransportError::Jsonp(format!("invalid payload: {e}")))?;
    Ok((name, payload))
}
