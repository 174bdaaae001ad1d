//! The book worker thread: drains the ring, owns the books, emits quotes.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::warn;

use super::update::BookUpdate;
use super::{BestQuote, QuoteCallback};
use crate::book::OrderBook;
use crate::ring::Consumer;

/// Sole mutator of the per-instrument order books. The instrument set is
/// fixed at construction; routing an update to an unregistered instrument
/// is a configuration bug and is dropped with a warning.
pub struct BookWorker {
    books: HashMap<String, OrderBook>,
    callback: Option<QuoteCallback>,
}

impl BookWorker {
    #[must_use]
    pub fn new(instruments: &[String], callback: Option<QuoteCallback>) -> Self {
        let books = instruments
            .iter()
            .map(|inst| (inst.clone(), OrderBook::new(inst.clone())))
            .collect();
        Self { books, callback }
    }

    /// Drains `consumer` until `running` drops, sleeping `idle_sleep` when
    /// the ring is empty, then drains whatever is still queued so shutdown
    /// loses no update.
    pub fn run(
        mut self,
        mut consumer: Consumer<BookUpdate>,
        running: Arc<AtomicBool>,
        idle_sleep: Duration,
    ) {
        while running.load(Ordering::Acquire) {
            match consumer.try_pop() {
                Some(update) => self.apply(update),
                None => thread::sleep(idle_sleep),
            }
        }

        while let Some(update) = consumer.try_pop() {
            self.apply(update);
        }
    }

    /// Applies one update to its book and fires the callback with the
    /// resulting best quote. Invoked for every update, whether or not the
    /// top of book changed; deduplication is the consumer's business.
    pub fn apply(&mut self, update: BookUpdate) {
        let Some(book) = self.books.get_mut(&update.instrument_id) else {
            warn!(
                instrument = %update.instrument_id,
                "no book registered for instrument, dropping update"
            );
            return;
        };

        if update.is_snapshot {
            book.apply_snapshot(
                update.bids.iter().map(|level| (level.price, level.size)),
                update.asks.iter().map(|level| (level.price, level.size)),
            );
        } else {
            for level in &update.bids {
                book.apply_delta_bid(level.price, level.size);
            }
            for level in &update.asks {
                book.apply_delta_ask(level.price, level.size);
            }
        }

        let (bid_price, bid_size) = book.best_bid();
        let (ask_price, ask_size) = book.best_ask();

        let quote = BestQuote {
            instrument_id: update.instrument_id,
            bid_price,
            bid_size,
            ask_price,
            ask_size,
            tick_to_book_ns: update.received_at.elapsed().as_nanos() as u64,
        };

        match self.callback.as_mut() {
            Some(callback) => callback(&quote),
            None => warn!(instrument = %quote.instrument_id, "no quote callback registered"),
        }
    }
}
