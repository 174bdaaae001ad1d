//! The market-data gateway engine.
//!
//! [`Gateway`] owns two long-lived threads: a session thread that maintains
//! the TLS WebSocket to the exchange and decodes `books` frames
//! ([`session`]), and a worker thread that drains the SPSC ring, applies
//! updates to the per-instrument books, and fires the best-quote callback
//! ([`worker`]). The calling thread only configures, starts, and stops.

mod session;
mod update;
mod worker;

pub use session::decode_book_update;
pub use update::BookUpdate;
pub use worker::BookWorker;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::info;

use crate::Result;
use crate::config::GatewayConfig;
use crate::ring;
use session::Session;

/// Where the session thread currently is in its connection lifecycle.
/// Transitions are driven by the session thread alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Resolving,
    Connecting,
    TlsHandshaking,
    WsHandshaking,
    Subscribed,
    Draining,
}

impl SessionState {
    /// Lower-case name used in log fields.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Resolving => "resolving",
            SessionState::Connecting => "connecting",
            SessionState::TlsHandshaking => "tls_handshaking",
            SessionState::WsHandshaking => "ws_handshaking",
            SessionState::Subscribed => "subscribed",
            SessionState::Draining => "draining",
        }
    }
}

/// Top-of-book event emitted on every applied update. A missing side is
/// reported as zero price and zero size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestQuote {
    pub instrument_id: String,
    pub bid_price: Decimal,
    pub bid_size: Decimal,
    pub ask_price: Decimal,
    pub ask_size: Decimal,
    /// Nanoseconds between the frame read and this quote being ready.
    pub tick_to_book_ns: u64,
}

/// Consumer callback, invoked synchronously on the worker thread for every
/// applied update. Must not block and must not call back into the gateway.
pub type QuoteCallback = Box<dyn FnMut(&BestQuote) + Send>;

/// Market-data gateway for the OKX public `books` channel.
///
/// Lifecycle: configure ([`GatewayConfig`]), register the callback, then
/// [`start`](Self::start) and eventually [`stop`](Self::stop). The
/// instrument set and the callback are fixed once started.
pub struct Gateway {
    config: GatewayConfig,
    callback: Option<QuoteCallback>,
    running: Arc<AtomicBool>,
    shutdown_tx: Option<mpsc::UnboundedSender<()>>,
    session_handle: Option<thread::JoinHandle<()>>,
    worker_handle: Option<thread::JoinHandle<()>>,
}

impl Gateway {
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            callback: None,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx: None,
            session_handle: None,
            worker_handle: None,
        }
    }

    /// Registers the best-quote callback. Must be called before
    /// [`start`](Self::start); re-binding after start is not supported.
    pub fn set_quote_callback(&mut self, callback: impl FnMut(&BestQuote) + Send + 'static) {
        self.callback = Some(Box::new(callback));
    }

    /// Spawns the session and worker threads. Idempotent: a second call on
    /// a running gateway does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Config`](crate::FeedError::Config) for an
    /// invalid configuration and [`FeedError::Io`](crate::FeedError::Io)
    /// if a thread or the session runtime cannot be spawned. Network
    /// failures are not surfaced here; the session retries them forever.
    pub fn start(&mut self) -> Result<()> {
        self.config.validate()?;

        if self.running.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        match self.spawn_pipeline() {
            Ok(()) => Ok(()),
            Err(e) => {
                self.running.store(false, Ordering::Release);
                self.shutdown_tx = None;
                if let Some(handle) = self.worker_handle.take() {
                    let _ = handle.join();
                }
                Err(e)
            }
        }
    }

    fn spawn_pipeline(&mut self) -> Result<()> {
        let (producer, consumer) = ring::channel(self.config.ring_capacity);
        let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();
        self.shutdown_tx = Some(shutdown_tx);

        let worker = BookWorker::new(&self.config.instruments, self.callback.take());
        let running = Arc::clone(&self.running);
        let idle_sleep = self.config.worker_idle_sleep;
        self.worker_handle = Some(
            thread::Builder::new()
                .name("okxfeed-worker".to_string())
                .spawn(move || worker.run(consumer, running, idle_sleep))?,
        );

        let tls = Arc::new(crate::tls::build_tls_config());
        let session = Session::new(
            self.config.clone(),
            tls,
            producer,
            Arc::clone(&self.running),
        );
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        self.session_handle = Some(
            thread::Builder::new()
                .name("okxfeed-session".to_string())
                .spawn(move || runtime.block_on(session.run(shutdown_rx)))?,
        );

        info!(
            instruments = ?self.config.instruments,
            ring_capacity = self.config.ring_capacity,
            "gateway started"
        );
        Ok(())
    }

    /// Stops both threads and joins them. Idempotent. The pending read is
    /// unblocked immediately; the worker drains the ring before exiting,
    /// so no enqueued update is silently lost.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }

        // Closing the channel wakes the session out of a blocked read or a
        // backoff sleep.
        self.shutdown_tx = None;

        if let Some(handle) = self.session_handle.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.worker_handle.take() {
            let _ = handle.join();
        }

        info!("gateway stopped");
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.stop();
    }
}
