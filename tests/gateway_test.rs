//! Live-network tests against the real OKX endpoint.
//!
//! These require network access. Run with:
//! `cargo test --features integration-tests`

#![cfg(feature = "integration-tests")]

use std::sync::mpsc;
use std::time::Duration;

use okxfeed::{Gateway, GatewayConfig};
use rust_decimal::Decimal;

#[test]
fn receives_quotes_from_the_live_books_channel() {
    let (tx, rx) = mpsc::channel();

    let mut gateway = Gateway::new(GatewayConfig::new(vec!["BTC-USDT-SWAP".to_string()]));
    gateway.set_quote_callback(move |quote| {
        let _ = tx.send(quote.clone());
    });
    gateway.start().expect("failed to start gateway");

    let quote = rx
        .recv_timeout(Duration::from_secs(30))
        .expect("no quote within 30s");
    assert_eq!(quote.instrument_id, "BTC-USDT-SWAP");
    assert!(quote.bid_price > Decimal::ZERO);
    assert!(quote.ask_price >= quote.bid_price);

    gateway.stop();
}

#[test]
fn stop_joins_cleanly_while_connected() {
    let mut gateway = Gateway::new(GatewayConfig::new(vec!["ETH-USDT-SWAP".to_string()]));
    gateway.set_quote_callback(|_| {});
    gateway.start().expect("failed to start gateway");

    std::thread::sleep(Duration::from_secs(3));
    gateway.stop();
    // Idempotent.
    gateway.stop();
}
