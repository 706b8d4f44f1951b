//! Error types for the Compute API client.

use thiserror::Error;

/// Errors raised by [`super::ComputeClient`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ComputeError {
    /// Raised when the HTTP client cannot be built.
    #[error("cannot build HTTP client: {message}")]
    Client {
        /// Message returned by `reqwest`.
        message: String,
    },
    /// Raised when the configured API endpoint is not a usable base URL.
    #[error("invalid compute API endpoint {endpoint:?}: {message}")]
    InvalidEndpoint {
        /// Endpoint as configured.
        endpoint: String,
        /// Parser message.
        message: String,
    },
    /// Raised when a request cannot be sent or its body cannot be read.
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Request URL.
        url: String,
        /// Message returned by `reqwest`.
        message: String,
    },
    /// Raised when the API answers with a non-success status.
    #[error("compute API returned {status} for {url}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Request URL.
        url: String,
        /// Response body.
        message: String,
    },
    /// Raised when a response body cannot be decoded.
    #[error("cannot decode response from {url}: {message}")]
    Decode {
        /// Request URL.
        url: String,
        /// Decoder message.
        message: String,
    },
    /// Raised when a zone operation reports errors.
    #[error("operation {operation} failed: {message}")]
    Operation {
        /// Operation name.
        operation: String,
        /// Joined error messages reported by the operation.
        message: String,
    },
    /// Raised when a zone operation does not finish in time.
    #[error("timeout waiting for operation {operation}")]
    Timeout {
        /// Operation name.
        operation: String,
    },
    /// Raised when an attached disk cannot be found on the instance.
    #[error("disk {volume_name} is not attached to instance {instance_id}")]
    NotAttached {
        /// Disk name.
        volume_name: String,
        /// Instance name.
        instance_id: String,
    },
}
