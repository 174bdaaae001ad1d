//! `books` channel models and checksum computation.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::Deserialize;

/// Wire name of the full-depth public book channel.
pub const BOOKS_CHANNEL: &str = "books";

/// `action` value marking a full book replacement.
pub const ACTION_SNAPSHOT: &str = "snapshot";

/// Number of levels per side that enter the checksum payload.
const CHECKSUM_DEPTH: usize = 25;

/// A single aggregated price level: `(price, size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLevel {
    pub price: Decimal,
    pub size: Decimal,
}

/// A push message from the `books` channel.
#[derive(Debug, Clone, Deserialize)]
pub struct BookMessage {
    pub arg: BookArg,
    /// `"snapshot"` or `"update"`; absent on some feeds, meaning update.
    #[serde(default)]
    pub action: Option<String>,
    pub data: Vec<BookData>,
}

/// Routing metadata. `inst_id` here is authoritative; the data payload is
/// not consulted for the instrument.
#[derive(Debug, Clone, Deserialize)]
pub struct BookArg {
    pub channel: String,
    #[serde(rename = "instId")]
    pub inst_id: String,
}

/// Book content of a push message.
///
/// Levels arrive as arrays of strings, `[price, size, …]`; elements past
/// the first two carry order-count metadata and are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct BookData {
    #[serde(default)]
    pub bids: Vec<Vec<String>>,
    #[serde(default)]
    pub asks: Vec<Vec<String>>,
    /// Exchange-supplied checksum over the top levels, as a decimal string.
    #[serde(default)]
    pub cs: Option<String>,
}

impl BookMessage {
    /// Whether this message replaces the whole book.
    #[must_use]
    pub fn is_snapshot(&self) -> bool {
        self.action.as_deref() == Some(ACTION_SNAPSHOT)
    }
}

/// Converts raw `[price, size, …]` string rows into [`PriceLevel`]s.
///
/// Rows with fewer than two elements are skipped. Returns `None` if any
/// price or size fails to parse as a decimal number, in which case the
/// whole frame should be discarded rather than half-applied.
#[must_use]
pub fn parse_levels(raw: &[Vec<String>]) -> Option<Vec<PriceLevel>> {
    let mut levels = Vec::with_capacity(raw.len());
    for row in raw {
        if row.len() < 2 {
            continue;
        }
        let price = row[0].parse().ok()?;
        let size = row[1].parse().ok()?;
        levels.push(PriceLevel { price, size });
    }
    Some(levels)
}

/// Builds the canonical checksum payload for a book frame.
///
/// The first 25 bid levels followed by the first 25 ask levels, each
/// rendered as `price:size:` with exactly 8 fractional digits, with the
/// trailing `:` removed.
#[must_use]
pub fn checksum_payload(bids: &[PriceLevel], asks: &[PriceLevel]) -> String {
    let mut payload = String::new();
    for level in bids.iter().take(CHECKSUM_DEPTH) {
        let _ = write!(payload, "{:.8}:{:.8}:", level.price, level.size);
    }
    for level in asks.iter().take(CHECKSUM_DEPTH) {
        let _ = write!(payload, "{:.8}:{:.8}:", level.price, level.size);
    }
    payload.pop();
    payload
}

/// Computes the CRC-32 book checksum as the exchange encodes it: the
/// decimal string of the unsigned 32-bit CRC (IEEE polynomial) over the
/// canonical payload.
#[must_use]
pub fn book_checksum(bids: &[PriceLevel], asks: &[PriceLevel]) -> String {
    crc32fast::hash(checksum_payload(bids, asks).as_bytes()).to_string()
}
