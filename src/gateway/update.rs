//! The message handed from the session thread to the book worker.

use std::time::Instant;

use crate::models::book::PriceLevel;

/// One validated book event, constructed by the session thread into a ring
/// slot and moved out by the worker. Moving it never copies the level
/// vectors.
#[derive(Debug)]
pub struct BookUpdate {
    /// Which book to route to (taken from the frame's `arg`, which is
    /// authoritative).
    pub instrument_id: String,
    /// `true` replaces the book; `false` applies deltas.
    pub is_snapshot: bool,
    /// Bid levels in frame order.
    pub bids: Vec<PriceLevel>,
    /// Ask levels in frame order.
    pub asks: Vec<PriceLevel>,
    /// Monotonic timestamp captured immediately after the frame read; the
    /// worker stamps tick-to-book latency as `received_at.elapsed()`.
    pub received_at: Instant,
    /// Exchange-supplied checksum, if the frame carried one. Already
    /// verified by the session before enqueue.
    pub checksum: Option<String>,
}
