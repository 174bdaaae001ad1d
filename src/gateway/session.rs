//! The session thread: connection lifecycle and frame decoding.
//!
//! [`Session::run`] drives the connect → TLS → WebSocket → subscribe →
//! read-loop state machine on a current-thread Tokio runtime, forever,
//! until the shutdown channel closes. Every failure along the way is
//! transient: log, back off, reconnect. Decoded and checksum-verified
//! updates are handed to the worker through the SPSC ring; a full ring
//! drops the update rather than stalling the socket.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use futures_util::{SinkExt, StreamExt};
use rustls::pki_types::ServerName;
use tokio::net::{TcpStream, lookup_host};
use tokio::sync::mpsc;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_tungstenite::{WebSocketStream, client_async};
use tracing::{debug, info, warn};
use tungstenite::Message;
use tungstenite::client::IntoClientRequest;
use tungstenite::http::{HeaderValue, header};

use super::SessionState;
use super::update::BookUpdate;
use crate::config::GatewayConfig;
use crate::models::SubscribeRequest;
use crate::models::book::{BOOKS_CHANNEL, BookMessage, book_checksum, parse_levels};
use crate::ring::Producer;
use crate::{FeedError, Result};

type WsStream = WebSocketStream<TlsStream<TcpStream>>;

/// Why the read loop handed control back.
enum ReadOutcome {
    /// The connection died; reconnect.
    Reconnect,
    /// Stop was requested; exit the session.
    Shutdown,
}

pub(crate) struct Session {
    config: GatewayConfig,
    connector: TlsConnector,
    producer: Producer<BookUpdate>,
    running: Arc<AtomicBool>,
    state: SessionState,
}

impl Session {
    pub(crate) fn new(
        config: GatewayConfig,
        tls: Arc<rustls::ClientConfig>,
        producer: Producer<BookUpdate>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            connector: TlsConnector::from(tls),
            producer,
            running,
            state: SessionState::Disconnected,
        }
    }

    /// Runs the reconnect loop until `shutdown` closes or the running flag
    /// drops.
    pub(crate) async fn run(mut self, mut shutdown: mpsc::UnboundedReceiver<()>) {
        while self.running.load(Ordering::Acquire) {
            let connected = tokio::select! {
                result = self.connect_and_subscribe() => result,
                _ = shutdown.recv() => break,
            };

            match connected {
                Ok(mut ws) => {
                    match self.read_loop(&mut ws, &mut shutdown).await {
                        ReadOutcome::Shutdown => break,
                        ReadOutcome::Reconnect => {
                            self.set_state(SessionState::Disconnected);
                            warn!("session disconnected, reconnecting");
                        }
                    }
                }
                Err(e) => {
                    self.set_state(SessionState::Disconnected);
                    warn!(
                        error = %e,
                        backoff_secs = self.config.reconnect_backoff.as_secs(),
                        "connect failed, backing off before retry"
                    );
                    tokio::select! {
                        () = tokio::time::sleep(self.config.reconnect_backoff) => {}
                        _ = shutdown.recv() => break,
                    }
                }
            }
        }

        self.set_state(SessionState::Draining);
    }

    /// Resolve → TCP connect → TLS handshake (SNI) → WebSocket handshake →
    /// subscribe. Each step is a distinct state transition.
    async fn connect_and_subscribe(&mut self) -> Result<WsStream> {
        let host = self.config.host.clone();

        self.set_state(SessionState::Resolving);
        let addrs: Vec<SocketAddr> = lookup_host((host.as_str(), self.config.port))
            .await?
            .collect();

        self.set_state(SessionState::Connecting);
        let mut last_err: Option<io::Error> = None;
        let mut tcp = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(stream) => {
                    tcp = Some(stream);
                    break;
                }
                Err(e) => last_err = Some(e),
            }
        }
        let tcp = match tcp {
            Some(stream) => stream,
            None => {
                return Err(last_err
                    .unwrap_or_else(|| {
                        io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses")
                    })
                    .into());
            }
        };

        self.set_state(SessionState::TlsHandshaking);
        let server_name = ServerName::try_from(host.clone())
            .map_err(|e| FeedError::Tls(format!("invalid SNI host name {host:?}: {e}")))?;
        let tls = self.connector.connect(server_name, tcp).await?;

        self.set_state(SessionState::WsHandshaking);
        let url = format!("wss://{host}{}", self.config.path);
        let mut request = url.as_str().into_client_request()?;
        request.headers_mut().insert(
            header::USER_AGENT,
            HeaderValue::from_static(concat!("okxfeed/", env!("CARGO_PKG_VERSION"))),
        );
        let (mut ws, _response) = client_async(request, tls).await?;

        let subscribe = SubscribeRequest::books(&self.config.instruments);
        let json = serde_json::to_string(&subscribe)?;
        ws.send(Message::Text(json.into())).await?;

        self.set_state(SessionState::Subscribed);
        info!(instruments = ?self.config.instruments, "subscribed to books channel");
        Ok(ws)
    }

    /// Reads frames until the connection fails or stop is requested.
    async fn read_loop(
        &mut self,
        ws: &mut WsStream,
        shutdown: &mut mpsc::UnboundedReceiver<()>,
    ) -> ReadOutcome {
        loop {
            tokio::select! {
                msg = ws.next() => {
                    let received_at = Instant::now();
                    match msg {
                        Some(Ok(Message::Text(text))) => self.enqueue_frame(&text, received_at),
                        Some(Ok(Message::Close(frame))) => {
                            warn!(?frame, "server closed the connection");
                            return ReadOutcome::Reconnect;
                        }
                        // Ping/pong are answered by the websocket layer;
                        // the exchange sends no binary frames we care about.
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!(error = %e, "websocket read failed");
                            return ReadOutcome::Reconnect;
                        }
                        None => {
                            warn!("websocket stream ended");
                            return ReadOutcome::Reconnect;
                        }
                    }
                }
                _ = shutdown.recv() => return ReadOutcome::Shutdown,
            }

            if !self.running.load(Ordering::Acquire) {
                return ReadOutcome::Shutdown;
            }
        }
    }

    fn enqueue_frame(&mut self, text: &str, received_at: Instant) {
        let Some(update) = decode_book_update(text, received_at) else {
            return;
        };

        if let Err(update) = self.producer.try_push(update) {
            warn!(
                instrument = %update.instrument_id,
                "ring full, dropping book update"
            );
        }
    }

    fn set_state(&mut self, state: SessionState) {
        debug!(from = self.state.as_str(), to = state.as_str(), "session state");
        self.state = state;
    }
}

/// Decodes one WebSocket text frame into a [`BookUpdate`].
///
/// Returns `None` for everything that must not reach the worker: frames
/// that are not JSON objects (heartbeats, acks, errors), channels other
/// than `books`, frames without a data payload, unparseable levels, and
/// frames whose checksum does not match the canonical CRC-32 (logged at
/// warn; the book is left untouched).
#[must_use]
pub fn decode_book_update(text: &str, received_at: Instant) -> Option<BookUpdate> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;

    let channel = value
        .get("arg")
        .and_then(|arg| arg.get("channel"))
        .and_then(|channel| channel.as_str())?;
    if channel != BOOKS_CHANNEL {
        return None;
    }
    value.get("data")?;

    let message: BookMessage = match serde_json::from_value(value) {
        Ok(message) => message,
        Err(e) => {
            debug!(error = %e, "malformed books frame, ignoring");
            return None;
        }
    };

    let is_snapshot = message.is_snapshot();
    let instrument_id = message.arg.inst_id;
    let data = message.data.into_iter().next()?;

    let Some(bids) = parse_levels(&data.bids) else {
        warn!(instrument = %instrument_id, "unparseable bid level, skipping frame");
        return None;
    };
    let Some(asks) = parse_levels(&data.asks) else {
        warn!(instrument = %instrument_id, "unparseable ask level, skipping frame");
        return None;
    };

    if let Some(cs) = data.cs.as_deref().filter(|cs| !cs.is_empty()) {
        let computed = book_checksum(&bids, &asks);
        if cs != computed {
            warn!(
                instrument = %instrument_id,
                received = cs,
                computed = %computed,
                "checksum mismatch, skipping update"
            );
            return None;
        }
    }

    Some(BookUpdate {
        instrument_id,
        is_snapshot,
        bids,
        asks,
        received_at,
        checksum: data.cs,
    })
}
