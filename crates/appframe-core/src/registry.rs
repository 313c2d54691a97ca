//! Explicit appId-to-class registry.
//!
//! Populated at startup by the host, then read-only during load calls.
//! Resolving an unregistered appId at activation time is reported per app,
//! it never aborts the load.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::AppError;
use crate::model::AppInstance;

/// A running app instance, constructed by its factory.
pub trait AppClass: Send {
    /// Initialization entry point, invoked once after construction.
    fn init(&mut self) -> Result<(), AppError>;
}

/// Constructs app instances for one appId.
pub trait AppFactory: Send + Sync {
    /// Construct an app against its resolved instance descriptor.
    fn create(&self, instance: &AppInstance) -> Result<Box<dyn AppClass>, AppError>;
}

impl<F> AppFactory for F
where
    F: Fn(&AppInstance) -> Result<Box<dyn AppClass>, AppError> + Send + Sync,
{
    fn create(&self, instance: &AppInstance) -> Result<Box<dyn AppClass>, AppError> {
        self(instance)
    }
}

/// Registry mapping appIds to constructible app classes.
#[derive(Default, Clone)]
pub struct AppRegistry {
    factories: HashMap<String, Arc<dyn AppFactory>>,
}

impl AppRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for an appId, replacing any previous registration.
    pub fn register(&mut self, app_id: impl Into<String>, factory: Arc<dyn AppFactory>) {
        self.factories.insert(app_id.into(), factory);
    }

    /// Register a closure factory for an appId.
    pub fn register_fn<F>(&mut self, app_id: impl Into<String>, factory: F)
    where
        F: Fn(&AppInstance) -> Result<Box<dyn AppClass>, AppError> + Send + Sync + 'static,
    {
        self.register(app_id, Arc::new(factory));
    }

    /// Resolve an appId to its factory.
    pub fn get(&self, app_id: &str) -> Option<Arc<dyn AppFactory>> {
        self.factories.get(app_id).cloned()
    }

    /// Check whether an appId is registered.
    pub fn contains(&self, app_id: &str) -> bool {
        self.factories.contains_key(app_id)
    }

    /// Number of registered appIds.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for AppRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppRegistry")
            .field("app_ids", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
