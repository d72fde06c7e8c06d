//! Outbound network collaborator.

use async_trait::async_trait;
use shelter_core::{Request, Response};

/// Result type for network fetches.
pub type FetchResult<T> = Result<T, FetchError>;

/// Error type for network fetches.
///
/// Any variant counts as "network failure" to the interceptor; the
/// distinction exists for logging and for host-level handling.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// No route to the server (offline, DNS failure).
    #[error("network unreachable: {0}")]
    Unreachable(String),

    /// Connection established but broken mid-exchange.
    #[error("connection error: {0}")]
    Connection(String),

    /// The request could not be issued at all.
    #[error("request error: {0}")]
    Request(String),
}

/// The outbound network. Timeouts, if any, belong to the implementation;
/// the agent imposes none of its own.
#[async_trait]
pub trait Network: Send + Sync {
    /// Issue a request and return the response.
    async fn fetch(&self, request: &Request) -> FetchResult<Response>;
}
