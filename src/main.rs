use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use okxfeed::metrics::{MetricsRegistry, MetricsReporter};
use okxfeed::{BestQuote, Gateway, GatewayConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let instruments = vec!["BTC-USDT-SWAP".to_string(), "ETH-USDT-SWAP".to_string()];
    let registry = Arc::new(MetricsRegistry::new(&instruments));

    let mut gateway = Gateway::new(GatewayConfig::new(instruments));

    let metrics = Arc::clone(&registry);
    let mut last_quotes: HashMap<String, BestQuote> = HashMap::new();
    gateway.set_quote_callback(move |quote| {
        metrics.record_update(&quote.instrument_id);
        metrics.record_latency_ns(&quote.instrument_id, quote.tick_to_book_ns);

        // Log only top-of-book changes; the callback fires on every update.
        let changed = last_quotes.get(&quote.instrument_id).is_none_or(|last| {
            last.bid_price != quote.bid_price
                || last.bid_size != quote.bid_size
                || last.ask_price != quote.ask_price
                || last.ask_size != quote.ask_size
        });
        if changed {
            info!(
                instrument = %quote.instrument_id,
                bid = %quote.bid_price,
                bid_size = %quote.bid_size,
                ask = %quote.ask_price,
                ask_size = %quote.ask_size,
                "top of book"
            );
            last_quotes.insert(quote.instrument_id.clone(), quote.clone());
        }
    });

    gateway.start().expect("failed to start gateway");

    let mut reporter = MetricsReporter::new(registry);
    reporter.start();

    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl-c");

    gateway.stop();
    reporter.stop();
    info!("shutdown complete");
}
