//! Wire-protocol decoding and checksum conformance.

use std::time::Instant;

use okxfeed::gateway::decode_book_update;
use okxfeed::models::SubscribeRequest;
use okxfeed::models::book::{PriceLevel, book_checksum, checksum_payload, parse_levels};
use rust_decimal_macros::dec;

fn level(price: &str, size: &str) -> PriceLevel {
    PriceLevel {
        price: price.parse().unwrap(),
        size: size.parse().unwrap(),
    }
}

#[test]
fn subscribe_request_serializes_to_okx_shape() {
    let instruments = vec!["BTC-USDT-SWAP".to_string(), "ETH-USDT-SWAP".to_string()];
    let request = SubscribeRequest::books(&instruments);

    let json = serde_json::to_string(&request).expect("failed to serialize subscribe request");
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["op"], "subscribe");
    assert_eq!(value["args"][0]["channel"], "books");
    assert_eq!(value["args"][0]["instId"], "BTC-USDT-SWAP");
    assert_eq!(value["args"][1]["instId"], "ETH-USDT-SWAP");
}

#[test]
fn snapshot_frame_decodes() {
    let frame = r#"{
        "arg": {"channel": "books", "instId": "BTC-USDT-SWAP"},
        "action": "snapshot",
        "data": [{
            "bids": [["30000.0", "1.5", "0", "4"], ["29999.5", "2.0", "0", "1"]],
            "asks": [["30000.5", "1.2", "0", "2"]],
            "ts": "1700000000000"
        }]
    }"#;

    let update = decode_book_update(frame, Instant::now()).expect("frame should decode");
    assert_eq!(update.instrument_id, "BTC-USDT-SWAP");
    assert!(update.is_snapshot);
    assert_eq!(update.bids.len(), 2);
    assert_eq!(update.asks.len(), 1);
    assert_eq!(update.bids[0], level("30000.0", "1.5"));
    assert_eq!(update.asks[0], level("30000.5", "1.2"));
    assert!(update.checksum.is_none());
}

#[test]
fn update_frame_decodes_as_delta() {
    let frame = r#"{
        "arg": {"channel": "books", "instId": "ETH-USDT-SWAP"},
        "action": "update",
        "data": [{"bids": [["2000.1", "0"]], "asks": []}]
    }"#;

    let update = decode_book_update(frame, Instant::now()).unwrap();
    assert!(!update.is_snapshot);
    assert_eq!(update.bids[0].size, dec!(0));
    assert!(update.asks.is_empty());
}

#[test]
fn missing_action_means_delta() {
    let frame = r#"{
        "arg": {"channel": "books", "instId": "ETH-USDT-SWAP"},
        "data": [{"bids": [["2000.1", "3.0"]], "asks": []}]
    }"#;

    let update = decode_book_update(frame, Instant::now()).unwrap();
    assert!(!update.is_snapshot);
}

#[test]
fn control_frames_are_ignored() {
    let received_at = Instant::now();

    // Subscription ack: has arg.channel == books but no data payload.
    let ack = r#"{"event": "subscribe", "arg": {"channel": "books", "instId": "BTC-USDT-SWAP"}}"#;
    assert!(decode_book_update(ack, received_at).is_none());

    // Other channels.
    let trades = r#"{"arg": {"channel": "trades", "instId": "BTC-USDT-SWAP"}, "data": [{}]}"#;
    assert!(decode_book_update(trades, received_at).is_none());

    // Non-object roots and plain garbage.
    assert!(decode_book_update("[1, 2, 3]", received_at).is_none());
    assert!(decode_book_update("\"pong\"", received_at).is_none());
    assert!(decode_book_update("not json at all", received_at).is_none());

    // Empty data array.
    let empty = r#"{"arg": {"channel": "books", "instId": "BTC-USDT-SWAP"}, "data": []}"#;
    assert!(decode_book_update(empty, received_at).is_none());
}

#[test]
fn unparseable_level_numbers_reject_the_frame() {
    let frame = r#"{
        "arg": {"channel": "books", "instId": "BTC-USDT-SWAP"},
        "action": "update",
        "data": [{"bids": [["not-a-price", "1.0"]], "asks": []}]
    }"#;
    assert!(decode_book_update(frame, Instant::now()).is_none());
}

#[test]
fn short_level_rows_are_skipped() {
    let raw = vec![
        vec!["30000.0".to_string(), "1.5".to_string()],
        vec!["29999.0".to_string()],
        vec![],
    ];
    let levels = parse_levels(&raw).unwrap();
    assert_eq!(levels, vec![level("30000.0", "1.5")]);
}

#[test]
fn checksum_payload_is_the_canonical_colon_string() {
    let bids = [level("30000.0", "1.5"), level("29999.5", "2.0")];
    let asks = [level("30000.5", "1.2")];

    assert_eq!(
        checksum_payload(&bids, &asks),
        "30000.00000000:1.50000000:29999.50000000:2.00000000:30000.50000000:1.20000000"
    );
}

#[test]
fn checksum_payload_of_empty_book_is_empty() {
    assert_eq!(checksum_payload(&[], &[]), "");
}

#[test]
fn checksum_only_covers_the_first_25_levels_per_side() {
    let deep: Vec<PriceLevel> = (0..30)
        .map(|i| PriceLevel {
            price: rust_decimal::Decimal::from(30_000 - i),
            size: dec!(1.0),
        })
        .collect();

    assert_eq!(book_checksum(&deep, &[]), book_checksum(&deep[..25], &[]));
    assert_ne!(book_checksum(&deep[..24], &[]), book_checksum(&deep[..25], &[]));
}

#[test]
fn checksum_is_a_decimal_u32_string() {
    let bids = [level("30000.0", "1.5")];
    let cs = book_checksum(&bids, &[]);
    cs.parse::<u32>().expect("checksum must be an unsigned decimal string");
}

#[test]
fn matching_checksum_passes_the_frame_through() {
    let bids = [level("30000.0", "1.5")];
    let asks = [level("30000.5", "1.2")];
    let cs = book_checksum(&bids, &asks);

    let frame = format!(
        r#"{{
            "arg": {{"channel": "books", "instId": "BTC-USDT-SWAP"}},
            "action": "snapshot",
            "data": [{{"bids": [["30000.0", "1.5"]], "asks": [["30000.5", "1.2"]], "cs": "{cs}"}}]
        }}"#
    );

    let update = decode_book_update(&frame, Instant::now()).expect("valid checksum must pass");
    assert_eq!(update.checksum.as_deref(), Some(cs.as_str()));
}

#[test]
fn checksum_mismatch_drops_the_frame() {
    let frame = r#"{
        "arg": {"channel": "books", "instId": "BTC-USDT-SWAP"},
        "action": "snapshot",
        "data": [{"bids": [["30000.0", "1.5"]], "asks": [["30000.5", "1.2"]], "cs": "1"}]
    }"#;

    assert!(decode_book_update(frame, Instant::now()).is_none());
}
