//! Crate-level error types.
//!
//! [`FeedError`] unifies every error source (configuration, I/O, TLS,
//! WebSocket, JSON) behind a single enum so callers can match on the
//! variant they care about while still using the `?` operator for easy
//! propagation.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FeedError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The gateway configuration is invalid (bad ring capacity, empty
    /// instrument id, …).
    #[error("configuration error: {0}")]
    Config(String),

    /// A socket-level operation (resolve, connect, read, write) failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS setup failed (e.g. the configured host is not a valid SNI name).
    #[error("tls error: {0}")]
    Tls(String),

    /// A WebSocket operation (handshake, send, receive) failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
