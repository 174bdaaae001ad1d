//! Market-data gateway for the OKX public order-book WebSocket feed.
//!
//! Subscribes to the `books` channel over TLS, maintains per-instrument
//! price-aggregated order books, and emits a best-bid/best-ask quote with
//! a tick-to-book latency stamp on every accepted update. One session
//! thread owns the socket and frame decoding; one worker thread owns the
//! books; a lock-free SPSC ring connects them.

pub mod book;
pub mod config;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod models;
pub mod ring;
pub mod tls;

pub use config::GatewayConfig;
pub use error::{FeedError, Result};
pub use gateway::{BestQuote, BookUpdate, Gateway};
