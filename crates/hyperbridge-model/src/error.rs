//! Error taxonomy for the transport adapter.
//!
//! Each failure class has a distinct home so callers can tell a caller bug
//! (translation), a rejected configuration, and a runtime network condition
//! apart without string matching:
//!
//! - [`ConfigurationError`]: invalid pool/TLS settings, raised when the
//!   engine client is built, before any network activity.
//! - [`TranslationError`]: a malformed request shape, raised synchronously
//!   from `execute` before any I/O begins.
//! - [`BridgeError::Transport`] / [`BridgeError::Protocol`]: asynchronous
//!   network and response-integrity failures, surfaced exactly once through
//!   the response handler's error path and the completion signal.
//! - [`BridgeError::Closed`] / [`BridgeError::Cancelled`]: per-call
//!   lifecycle outcomes; neither affects other in-flight requests.
//!
//! [`BridgeError`] is `Clone` so a single failure can resolve the completion
//! signal, notify the handler, and terminate a partially delivered body
//! stream without inventing separate error values for each path.

use std::fmt;
use std::sync::Arc;

/// Boxed error type used at the boundary to the underlying engine.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Convenience result alias for adapter operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Top-level error type for the adapter.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BridgeError {
    /// The client configuration was rejected at build time.
    #[error("configuration rejected: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The request could not be translated into the engine's representation.
    /// This is a caller bug, not a network condition.
    #[error("request translation failed: {0}")]
    Translation(#[from] TranslationError),

    /// The underlying engine failed to execute the request: connection
    /// failure, timeout, TLS failure, or a mid-stream body error.
    #[error("transport failure: {0}")]
    Transport(#[source] TransportFailure),

    /// The engine produced a response the adapter could not accept, e.g. a
    /// body shorter or longer than the declared `content-length`.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// The operation was attempted after the adapter was closed.
    #[error("client is closed")]
    Closed,

    /// The caller cancelled the outstanding request. Cooperative, not a
    /// transport failure.
    #[error("request cancelled")]
    Cancelled,
}

impl BridgeError {
    /// Wrap an engine-side error as a transport failure.
    pub fn transport(source: impl Into<BoxError>) -> Self {
        Self::Transport(TransportFailure(Arc::new(source.into())))
    }

    /// Whether this error is terminal for the whole adapter (`Closed`) as
    /// opposed to terminal for one call.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Whether this error represents cooperative cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Shared wrapper around an engine error, so [`BridgeError`] stays `Clone`
/// while preserving the original error as a `source`.
#[derive(Debug, Clone)]
pub struct TransportFailure(Arc<BoxError>);

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for TransportFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.0.as_ref().as_ref())
    }
}

/// Rejected client configuration, detected when the engine client is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// The connection pool must admit at least one connection.
    #[error("connection pool size must be at least 1")]
    InvalidPoolSize,

    /// A zero idle timeout would evict every pooled connection immediately.
    #[error("idle-connection timeout must be non-zero")]
    InvalidIdleTimeout,

    /// Caller-supplied trust roots contained no parsable certificate.
    #[error("custom trust roots contained no usable certificates")]
    EmptyTrustRoots,

    /// Caller-supplied trust roots could not be read as PEM.
    #[error("failed to read custom trust roots: {0}")]
    InvalidTrustRoots(String),

    /// The platform certificate store could not be loaded.
    #[error("failed to load platform trust roots: {0}")]
    TrustStoreUnavailable(String),
}

/// Structurally invalid request input, detected before any network I/O.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslationError {
    /// The method is not one the adapter forwards.
    #[error("unsupported HTTP method: {0:?}")]
    UnsupportedMethod(String),

    /// The target URI failed to parse.
    #[error("invalid target URI {uri:?}: {reason}")]
    InvalidUri {
        /// The offending URI as supplied by the caller.
        uri: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The target URI has no scheme or authority; client requests must be
    /// absolute so the engine knows where to connect.
    #[error("target URI {0:?} must be absolute")]
    RelativeUri(String),

    /// A header name is not a valid HTTP field name.
    #[error("invalid header name {0:?}")]
    InvalidHeaderName(String),

    /// A header value contains bytes HTTP cannot carry.
    #[error("invalid value for header {0:?}")]
    InvalidHeaderValue(String),
}
