//! Per-instrument update and latency metrics with a periodic reporter.
//!
//! [`MetricsRegistry`] holds relaxed atomic counters keyed by instrument;
//! the key set is fixed at construction so the hot-path increment takes no
//! lock. [`MetricsReporter`] runs a thread that logs updates/sec and
//! average tick-to-book latency at fixed intervals.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

#[derive(Default)]
struct InstrumentMetrics {
    updates: AtomicU64,
    latency_total_ns: AtomicU64,
    latency_count: AtomicU64,
}

/// Counters for a fixed set of instruments. Cheap to share behind an
/// [`Arc`]; recording for an unregistered instrument is a no-op.
pub struct MetricsRegistry {
    instruments: HashMap<String, InstrumentMetrics>,
}

impl MetricsRegistry {
    #[must_use]
    pub fn new(instruments: &[String]) -> Self {
        Self {
            instruments: instruments
                .iter()
                .map(|inst| (inst.clone(), InstrumentMetrics::default()))
                .collect(),
        }
    }

    pub fn record_update(&self, instrument: &str) {
        if let Some(metrics) = self.instruments.get(instrument) {
            metrics.updates.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_latency_ns(&self, instrument: &str, latency_ns: u64) {
        if let Some(metrics) = self.instruments.get(instrument) {
            metrics.latency_total_ns.fetch_add(latency_ns, Ordering::Relaxed);
            metrics.latency_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Returns and resets the update count for `instrument`.
    pub fn take_updates(&self, instrument: &str) -> u64 {
        self.instruments
            .get(instrument)
            .map_or(0, |metrics| metrics.updates.swap(0, Ordering::AcqRel))
    }

    /// Returns and resets the accumulated `(total_ns, count)` latency pair
    /// for `instrument`.
    pub fn take_latency(&self, instrument: &str) -> (u64, u64) {
        self.instruments.get(instrument).map_or((0, 0), |metrics| {
            (
                metrics.latency_total_ns.swap(0, Ordering::AcqRel),
                metrics.latency_count.swap(0, Ordering::AcqRel),
            )
        })
    }

    pub fn instruments(&self) -> impl Iterator<Item = &str> {
        self.instruments.keys().map(String::as_str)
    }
}

/// Interval between update-rate report lines.
const RATE_INTERVAL: Duration = Duration::from_secs(5);

/// Interval between latency report lines.
const LATENCY_INTERVAL: Duration = Duration::from_secs(60);

/// How often the reporter thread wakes to check its deadlines.
const TICK: Duration = Duration::from_millis(200);

/// Background thread that periodically logs the registry's counters.
pub struct MetricsReporter {
    registry: Arc<MetricsRegistry>,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MetricsReporter {
    #[must_use]
    pub fn new(registry: Arc<MetricsRegistry>) -> Self {
        Self {
            registry,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Spawns the reporter thread. Idempotent.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }

        let registry = Arc::clone(&self.registry);
        let running = Arc::clone(&self.running);
        self.handle = Some(thread::spawn(move || report_loop(&registry, &running)));
    }

    /// Stops and joins the reporter thread. Idempotent.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MetricsReporter {
    fn drop(&mut self) {
        self.stop();
    }
}

fn report_loop(registry: &MetricsRegistry, running: &AtomicBool) {
    let mut next_rate = Instant::now() + RATE_INTERVAL;
    let mut next_latency = Instant::now() + LATENCY_INTERVAL;

    while running.load(Ordering::Acquire) {
        thread::sleep(TICK);
        let now = Instant::now();

        if now >= next_rate {
            for instrument in registry.instruments() {
                let updates = registry.take_updates(instrument);
                let rate = updates as f64 / RATE_INTERVAL.as_secs_f64();
                info!(instrument, updates_per_sec = rate, "update rate");
            }
            next_rate = now + RATE_INTERVAL;
        }

        if now >= next_latency {
            for instrument in registry.instruments() {
                let (total_ns, count) = registry.take_latency(instrument);
                if count > 0 {
                    let avg_us = total_ns as f64 / count as f64 / 1_000.0;
                    info!(
                        instrument,
                        avg_tick_to_book_us = avg_us,
                        samples = count,
                        "tick-to-book latency"
                    );
                } else {
                    info!(instrument, samples = 0_u64, "tick-to-book latency");
                }
            }
            next_latency = now + LATENCY_INTERVAL;
        }
    }
}
