//! Errors raised by app classes during construction and initialization.

/// Error type for app class operations.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("app construction failed: {0}")]
    Construct(String),

    #[error("app init failed: {0}")]
    Init(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Construction failure with a message.
    pub fn construct(message: impl Into<String>) -> Self {
        Self::Construct(message.into())
    }

    /// Initialization failure with a message.
    pub fn init(message: impl Into<String>) -> Self {
        Self::Init(message.into())
    }
}
