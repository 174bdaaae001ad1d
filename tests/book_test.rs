//! Order book behavior: snapshots, deltas, best-quote retrieval.

use okxfeed::book::OrderBook;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Small two-level book around 30000 used by most tests here.
fn seeded_book() -> OrderBook {
    let mut book = OrderBook::new("BTC-USDT-SWAP");
    book.apply_snapshot(
        [(dec!(30000.0), dec!(1.5)), (dec!(29999.5), dec!(2.0))],
        [(dec!(30000.5), dec!(1.2)), (dec!(30001.0), dec!(3.0))],
    );
    book
}

#[test]
fn snapshot_sets_best_quote_and_level_counts() {
    let book = seeded_book();
    assert_eq!(book.best_bid(), (dec!(30000.0), dec!(1.5)));
    assert_eq!(book.best_ask(), (dec!(30000.5), dec!(1.2)));
    assert_eq!(book.bid_levels(), 2);
    assert_eq!(book.ask_levels(), 2);
}

#[test]
fn delta_increases_size_and_removes_level() {
    let mut book = seeded_book();
    book.apply_delta_bid(dec!(30000.0), dec!(2.5));
    book.apply_delta_ask(dec!(30000.5), Decimal::ZERO);

    assert_eq!(book.best_bid(), (dec!(30000.0), dec!(2.5)));
    assert_eq!(book.best_ask(), (dec!(30001.0), dec!(3.0)));
    assert_eq!(book.ask_levels(), 1);
}

#[test]
fn new_better_ask_takes_the_top() {
    let mut book = seeded_book();
    book.apply_delta_bid(dec!(30000.0), dec!(2.5));
    book.apply_delta_ask(dec!(30000.5), Decimal::ZERO);
    book.apply_delta_ask(dec!(30000.25), dec!(4.2));

    assert_eq!(book.best_ask(), (dec!(30000.25), dec!(4.2)));
    // Sanity on the feed data itself: the book stays uncrossed.
    assert!(book.best_bid().0 < book.best_ask().0);
}

#[test]
fn removing_a_non_best_bid_shrinks_the_side() {
    let mut book = seeded_book();
    book.apply_delta_bid(dec!(29999.5), Decimal::ZERO);

    assert_eq!(book.bid_levels(), 1);
    assert_eq!(book.best_bid(), (dec!(30000.0), dec!(1.5)));
}

#[test]
fn snapshot_resets_a_grown_book() {
    let mut book = seeded_book();
    for i in 0..5 {
        book.apply_delta_bid(dec!(29990) + Decimal::from(i), dec!(1.0));
    }
    assert!(book.bid_levels() > 2);

    book.apply_snapshot(
        [(dec!(31000.0), dec!(0.5)), (dec!(30999.0), dec!(0.7))],
        [(dec!(31001.0), dec!(0.9))],
    );

    assert_eq!(book.bid_levels(), 2);
    assert_eq!(book.ask_levels(), 1);
    assert_eq!(book.best_bid(), (dec!(31000.0), dec!(0.5)));
    assert_eq!(book.best_ask(), (dec!(31001.0), dec!(0.9)));
}

#[test]
fn empty_sides_report_zero_quote() {
    let book = OrderBook::new("ETH-USDT-SWAP");
    assert_eq!(book.best_bid(), (Decimal::ZERO, Decimal::ZERO));
    assert_eq!(book.best_ask(), (Decimal::ZERO, Decimal::ZERO));
    assert_eq!(book.bid_levels(), 0);
    assert_eq!(book.ask_levels(), 0);
}

#[test]
fn clear_empties_both_sides() {
    let mut book = seeded_book();
    book.clear();
    assert_eq!(book.bid_levels(), 0);
    assert_eq!(book.ask_levels(), 0);
    assert_eq!(book.best_bid(), (Decimal::ZERO, Decimal::ZERO));
}

#[test]
fn delta_application_is_idempotent() {
    let mut book = seeded_book();
    book.apply_delta_bid(dec!(30000.0), dec!(2.5));
    book.apply_delta_bid(dec!(30000.0), dec!(2.5));

    assert_eq!(book.best_bid(), (dec!(30000.0), dec!(2.5)));
    assert_eq!(book.bid_levels(), 2);
}

#[test]
fn zero_size_delta_on_absent_level_is_a_noop() {
    let mut book = seeded_book();
    book.apply_delta_bid(dec!(12345.0), Decimal::ZERO);
    book.apply_delta_ask(dec!(54321.0), Decimal::ZERO);

    assert_eq!(book.bid_levels(), 2);
    assert_eq!(book.ask_levels(), 2);
}

#[test]
fn zero_size_snapshot_levels_are_never_stored() {
    let mut book = OrderBook::new("BTC-USDT-SWAP");
    book.apply_snapshot(
        [(dec!(100.0), dec!(1.0)), (dec!(99.0), Decimal::ZERO)],
        [(dec!(101.0), Decimal::ZERO)],
    );

    assert_eq!(book.bid_levels(), 1);
    assert_eq!(book.ask_levels(), 0);
}

#[test]
fn peeling_greater_bids_walks_the_snapshot_in_order() {
    let levels = [
        (dec!(30002.0), dec!(0.4)),
        (dec!(30001.0), dec!(1.1)),
        (dec!(30000.0), dec!(2.2)),
        (dec!(29999.0), dec!(0.9)),
    ];
    let mut book = OrderBook::new("BTC-USDT-SWAP");
    book.apply_snapshot(levels, []);

    // Deleting every strictly-greater level must surface each level as the
    // best bid, top down.
    for (price, size) in levels {
        assert_eq!(book.best_bid(), (price, size));
        book.apply_delta_bid(price, Decimal::ZERO);
    }
    assert_eq!(book.bid_levels(), 0);
}

#[test]
fn insertion_order_is_irrelevant() {
    let mut forward = OrderBook::new("BTC-USDT-SWAP");
    let mut reverse = OrderBook::new("BTC-USDT-SWAP");
    let levels = [
        (dec!(30000.0), dec!(1.5)),
        (dec!(29999.5), dec!(2.0)),
        (dec!(30000.5), dec!(0.3)),
    ];

    for (price, size) in levels {
        forward.apply_delta_bid(price, size);
    }
    for (price, size) in levels.iter().rev() {
        reverse.apply_delta_bid(*price, *size);
    }

    assert_eq!(forward.best_bid(), reverse.best_bid());
    assert_eq!(forward.bid_levels(), reverse.bid_levels());
}
