//! Errors shared by every storage provider.

use thiserror::Error;

/// Errors raised by storage providers and volume sources.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum StorageError {
    /// Raised when a required entity (environment identity, instance,
    /// attachment record) cannot be found.
    #[error("{0} not found")]
    NotFound(String),
    /// Raised when the provider does not offer the requested capability.
    #[error("{0} not supported")]
    NotSupported(String),
    /// Raised when a volume identifier does not carry a zone.
    #[error("malformed volume id {volume_id:?}")]
    MalformedVolumeId {
        /// Identifier passed by the caller.
        volume_id: String,
    },
    /// Raised when the target instance is not running (or does not exist).
    #[error("cannot attach to non-running instance {instance_id}")]
    NonRunningInstance {
        /// Provider instance identifier.
        instance_id: String,
    },
    /// Raised when the environment configuration cannot be used.
    #[error("environment configuration error: {0}")]
    Config(String),
    /// Raised when request parameters are unusable.
    #[error("invalid volume parameters: {0}")]
    Validation(String),
    /// Wrapper for failures reported by the cloud connection.
    #[error("{context}: {message}")]
    Backend {
        /// Operation that was being performed.
        context: String,
        /// Message returned by the connection.
        message: String,
    },
    /// Adds operation context to an inner storage error.
    #[error("{context}: {source}")]
    Annotated {
        /// Operation that was being performed.
        context: String,
        /// Underlying failure.
        #[source]
        source: Box<StorageError>,
    },
}

impl StorageError {
    /// Wraps a connection failure with the operation that produced it.
    pub fn backend(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Backend {
            context: context.into(),
            message: err.to_string(),
        }
    }

    /// Prefixes this error with additional context.
    #[must_use]
    pub fn annotate(self, context: impl Into<String>) -> Self {
        Self::Annotated {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping any annotations.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Annotated { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Reports whether the innermost error is a [`StorageError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), Self::NotFound(_))
    }

    /// Reports whether the innermost error is a
    /// [`StorageError::NotSupported`].
    #[must_use]
    pub fn is_not_supported(&self) -> bool {
        matches!(self.root_cause(), Self::NotSupported(_))
    }
}
