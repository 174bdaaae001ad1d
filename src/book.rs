//! Price-aggregated order book for a single instrument.
//!
//! Both sides are `BTreeMap<Decimal, Decimal>` keyed by price, giving
//! logarithmic insert/delete and O(1) best-level retrieval at either end.
//! `Decimal` is totally ordered, so prices need no wrapper type.
//!
//! The book has a single mutator (the worker thread); no operation here
//! can fail.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

/// Aggregated limit order book bound to one instrument.
#[derive(Debug)]
pub struct OrderBook {
    instrument_id: String,
    bids: BTreeMap<Decimal, Decimal>,
    asks: BTreeMap<Decimal, Decimal>,
}

impl OrderBook {
    /// Creates an empty book for `instrument_id`.
    #[must_use]
    pub fn new(instrument_id: impl Into<String>) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
        }
    }

    /// The instrument this book belongs to.
    #[must_use]
    pub fn instrument_id(&self) -> &str {
        &self.instrument_id
    }

    /// Empties both sides.
    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
    }

    /// Replaces both sides from `(price, size)` pairs. Zero-size levels
    /// are dropped so the book never stores an empty level.
    pub fn apply_snapshot<B, A>(&mut self, bids: B, asks: A)
    where
        B: IntoIterator<Item = (Decimal, Decimal)>,
        A: IntoIterator<Item = (Decimal, Decimal)>,
    {
        self.bids = bids
            .into_iter()
            .filter(|(_, size)| *size != Decimal::ZERO)
            .collect();
        self.asks = asks
            .into_iter()
            .filter(|(_, size)| *size != Decimal::ZERO)
            .collect();
    }

    /// Applies one bid delta: size 0 removes the level (no-op if absent),
    /// any other size inserts or replaces it.
    pub fn apply_delta_bid(&mut self, price: Decimal, size: Decimal) {
        if size == Decimal::ZERO {
            self.bids.remove(&price);
        } else {
            self.bids.insert(price, size);
        }
    }

    /// Applies one ask delta; same contract as [`apply_delta_bid`](Self::apply_delta_bid).
    pub fn apply_delta_ask(&mut self, price: Decimal, size: Decimal) {
        if size == Decimal::ZERO {
            self.asks.remove(&price);
        } else {
            self.asks.insert(price, size);
        }
    }

    /// Highest-priced bid level, or `(0, 0)` if the side is empty.
    #[must_use]
    pub fn best_bid(&self) -> (Decimal, Decimal) {
        self.bids
            .last_key_value()
            .map_or((Decimal::ZERO, Decimal::ZERO), |(price, size)| {
                (*price, *size)
            })
    }

    /// Lowest-priced ask level, or `(0, 0)` if the side is empty.
    #[must_use]
    pub fn best_ask(&self) -> (Decimal, Decimal) {
        self.asks
            .first_key_value()
            .map_or((Decimal::ZERO, Decimal::ZERO), |(price, size)| {
                (*price, *size)
            })
    }

    /// Number of resting bid levels.
    #[must_use]
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Number of resting ask levels.
    #[must_use]
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }
}
