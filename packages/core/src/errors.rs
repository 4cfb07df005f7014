//! Error types for the issuer registry and certificate engine

use std::time::Duration;

/// A Result alias where the Err case is [`IssuerError`].
pub type Result<T> = std::result::Result<T, IssuerError>;

/// Errors surfaced by the registry, issuers and value specs
#[derive(Debug, thiserror::Error)]
pub enum IssuerError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Registry storage error: {context}")]
    RegistryIo {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Issuer is disabled: {0}")]
    IssuerDisabled(String),
    #[error("Issuer already exists: {0}")]
    AlreadyExists(String),
    #[error("Issuer metadata is corrupt: {0}")]
    Metadata(String),
    #[error("Registry lock poisoned")]
    LockPoisoned,
    #[error("Registry task failed: {0}")]
    TaskFailed(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl IssuerError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::RegistryIo {
            context: context.into(),
            source,
        }
    }

    /// Whether the failure was caused by the caller's input rather than the system
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::InvalidArgument(_) | Self::AlreadyExists(_) | Self::IssuerDisabled(_) => true,
            Self::Engine(engine) => engine.is_invalid_spec(),
            _ => false,
        }
    }
}

/// Certificate generation engine failures
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Certificate spec rejected: {0}")]
    InvalidSpec(String),
    #[error("PEM decoding failed: {0}")]
    Pem(String),
    #[error("Certificate generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("Certificate engine failure: {0}")]
    Internal(String),
}

impl EngineError {
    #[must_use]
    pub fn is_invalid_spec(&self) -> bool {
        matches!(self, Self::InvalidSpec(_) | Self::Pem(_))
    }
}

// Call sites that parse caller input map to InvalidSpec explicitly
impl From<rcgen::Error> for EngineError {
    fn from(err: rcgen::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
