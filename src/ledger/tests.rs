//! Tests for the ledger module

use super::*;
use crate::types::{Action, Transaction};
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

fn ledger() -> Ledger {
    Ledger::new("SEK")
}

#[test]
fn buy_creates_position_lazily() {
    let mut ledger = ledger();
    assert!(ledger.position("BTC").is_none());

    let records = ledger
        .apply(Transaction::buy("BTC", dec!(100), dec!(10), dec!(5)))
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action, Action::Buy);
    assert_eq!(records[0].currency, "SEK");

    let pos = ledger.position("BTC").unwrap();
    assert_eq!(pos.quantity(), dec!(10));
    assert_eq!(pos.total_cost(), dec!(1005));
}

#[test]
fn position_lookup_never_creates() {
    let ledger = ledger();
    assert!(ledger.position("ETH").is_none());
    assert!(ledger.position("ETH").is_none());
}

#[test]
fn sell_routes_to_position_and_records() {
    let mut ledger = ledger();
    ledger
        .apply(Transaction::buy("BTC", dec!(100), dec!(10), dec!(5)))
        .unwrap();
    ledger
        .apply(Transaction::buy("BTC", dec!(110), dec!(5), dec!(2)))
        .unwrap();
    ledger
        .apply(Transaction::sell("BTC", dec!(120), dec!(8), dec!(3)))
        .unwrap();

    let pos = ledger.position("BTC").unwrap();
    assert_eq!(pos.quantity(), dec!(7));
    assert_eq!(pos.total_cost(), dec!(726.6));
    assert_eq!(ledger.total_realized_profit_loss(), dec!(126.6));
    assert_eq!(ledger.audit_trail().len(), 3);
}

#[test]
fn oversell_fails_and_leaves_ledger_untouched() {
    let mut ledger = ledger();
    ledger
        .apply(Transaction::buy("BTC", dec!(100), dec!(5), Decimal::ZERO))
        .unwrap();

    let err = ledger
        .apply(Transaction::sell("BTC", dec!(120), dec!(6), Decimal::ZERO))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientHoldings { .. }));

    let pos = ledger.position("BTC").unwrap();
    assert_eq!(pos.quantity(), dec!(5));
    assert_eq!(pos.total_cost(), dec!(500));
    // failed apply appends nothing
    assert_eq!(ledger.audit_trail().len(), 1);
}

#[test]
fn failed_sell_on_unseen_asset_creates_no_position() {
    let mut ledger = ledger();
    let err = ledger
        .apply(Transaction::sell("DOGE", dec!(1), dec!(5), Decimal::ZERO))
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::InsufficientHoldings {
            requested: dec!(5),
            available: Decimal::ZERO,
        }
    );

    // no phantom zeroed position and no spurious report line
    assert!(ledger.position("DOGE").is_none());
    assert!(ledger.realized_by_asset().is_empty());
    assert!(ledger.audit_trail().is_empty());
}

#[test]
fn deposit_is_a_zero_cost_buy() {
    let mut ledger = ledger();
    ledger.apply(Transaction::deposit("ETH", dec!(3))).unwrap();

    let pos = ledger.position("ETH").unwrap();
    assert_eq!(pos.quantity(), dec!(3));
    assert_eq!(pos.total_cost(), Decimal::ZERO);
    assert_eq!(pos.average_price(), Decimal::ZERO);
}

#[test]
fn deposit_of_non_positive_quantity_is_invalid() {
    let mut ledger = ledger();
    let err = ledger
        .apply(Transaction::deposit("ETH", Decimal::ZERO))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAction(_)));
    assert!(ledger.position("ETH").is_none());
    assert!(ledger.audit_trail().is_empty());
}

#[test]
fn deposited_units_sell_at_full_profit() {
    let mut ledger = ledger();
    ledger.apply(Transaction::deposit("ETH", dec!(2))).unwrap();
    ledger
        .apply(Transaction::sell("ETH", dec!(500), dec!(2), Decimal::ZERO))
        .unwrap();
    // no acquisition cost, so the whole proceeds are realized
    assert_eq!(ledger.total_realized_profit_loss(), dec!(1000));
}

#[test]
fn conversion_splits_into_sell_and_buy_legs() {
    let mut ledger = ledger();
    // BTC position: quantity 1, cost 1000, average price 1000
    ledger
        .apply(Transaction::buy("BTC", dec!(1000), dec!(1), Decimal::ZERO))
        .unwrap();

    let records = ledger
        .apply(Transaction::convert(
            "BTC",
            "ETH",
            dec!(300),
            dec!(2),
            Decimal::ZERO,
        ))
        .unwrap();

    // acquisition cost 600 backs out 0.6 BTC at the 1000 average
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].action, Action::Sell);
    assert_eq!(records[0].asset, "BTC");
    assert_eq!(records[0].price, dec!(1000));
    assert_eq!(records[0].quantity, dec!(0.6));
    assert_eq!(records[1].action, Action::Buy);
    assert_eq!(records[1].asset, "ETH");
    assert_eq!(records[1].quantity, dec!(2));
    assert_eq!(records[1].fee, Decimal::ZERO);

    let btc = ledger.position("BTC").unwrap();
    assert_eq!(btc.quantity(), dec!(0.4));
    assert_eq!(btc.total_cost(), dec!(400));

    let eth = ledger.position("ETH").unwrap();
    assert_eq!(eth.quantity(), dec!(2));
    assert_eq!(eth.total_cost(), dec!(600));

    // fee-free conversion realizes exactly zero on the sell leg
    assert_eq!(ledger.total_realized_profit_loss(), Decimal::ZERO);
}

#[test]
fn conversion_fee_realizes_as_loss() {
    let mut ledger = ledger();
    ledger
        .apply(Transaction::buy("BTC", dec!(1000), dec!(1), Decimal::ZERO))
        .unwrap();
    ledger
        .apply(Transaction::convert("BTC", "ETH", dec!(100), dec!(2), dec!(7)))
        .unwrap();

    // the stated fee is charged on the sell leg and nowhere else
    assert_eq!(ledger.total_realized_profit_loss(), dec!(-7));
    // the fee is part of the funded acquisition cost: (200 + 7) / 1000
    assert_eq!(ledger.position("BTC").unwrap().quantity(), dec!(0.793));
    assert_eq!(ledger.position("ETH").unwrap().total_cost(), dec!(200));
}

#[test]
fn conversion_legs_share_the_timestamp() {
    let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let mut ledger = ledger();
    ledger
        .apply(Transaction::buy("BTC", dec!(1000), dec!(1), Decimal::ZERO))
        .unwrap();
    let records = ledger
        .apply(Transaction::convert("BTC", "ETH", dec!(300), dec!(2), Decimal::ZERO).at(ts))
        .unwrap();
    assert_eq!(records[0].timestamp, Some(ts));
    assert_eq!(records[1].timestamp, Some(ts));
}

#[test]
fn conversion_without_target_fails() {
    let mut ledger = ledger();
    ledger
        .apply(Transaction::buy("BTC", dec!(1000), dec!(1), Decimal::ZERO))
        .unwrap();

    let mut tx = Transaction::convert("BTC", "ETH", dec!(300), dec!(1), Decimal::ZERO);
    tx.to_asset = None;
    let err = ledger.apply(tx).unwrap_err();
    assert!(matches!(err, LedgerError::MissingConversionTarget { .. }));
}

#[test]
fn conversion_to_same_asset_fails() {
    let mut ledger = ledger();
    ledger
        .apply(Transaction::buy("BTC", dec!(1000), dec!(1), Decimal::ZERO))
        .unwrap();
    let err = ledger
        .apply(Transaction::convert("BTC", "BTC", dec!(300), dec!(1), Decimal::ZERO))
        .unwrap_err();
    assert!(matches!(err, LedgerError::MissingConversionTarget { .. }));
}

#[test]
fn conversion_from_unknown_asset_fails() {
    let mut ledger = ledger();
    let err = ledger
        .apply(Transaction::convert("BTC", "ETH", dec!(300), dec!(1), Decimal::ZERO))
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::NoHoldings {
            asset: "BTC".to_string()
        }
    );
    assert!(ledger.position("ETH").is_none());
}

#[test]
fn conversion_from_emptied_position_fails() {
    let mut ledger = ledger();
    ledger
        .apply(Transaction::buy("BTC", dec!(1000), dec!(1), Decimal::ZERO))
        .unwrap();
    ledger
        .apply(Transaction::sell("BTC", dec!(1000), dec!(1), Decimal::ZERO))
        .unwrap();

    let err = ledger
        .apply(Transaction::convert("BTC", "ETH", dec!(300), dec!(1), Decimal::ZERO))
        .unwrap_err();
    assert!(matches!(err, LedgerError::NoHoldings { .. }));
}

#[test]
fn conversion_exceeding_holdings_fails_atomically() {
    let mut ledger = ledger();
    ledger
        .apply(Transaction::buy("BTC", dec!(1000), dec!(1), Decimal::ZERO))
        .unwrap();

    // would need 1.2 BTC at the 1000 average
    let err = ledger
        .apply(Transaction::convert("BTC", "ETH", dec!(600), dec!(2), Decimal::ZERO))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientHoldings { .. }));

    assert_eq!(ledger.position("BTC").unwrap().quantity(), dec!(1));
    assert!(ledger.position("ETH").is_none());
    assert_eq!(ledger.audit_trail().len(), 1);
}

#[test]
fn emptied_position_keeps_its_history() {
    let mut ledger = ledger();
    ledger
        .apply(Transaction::buy("BTC", dec!(1000), dec!(1), Decimal::ZERO))
        .unwrap();
    ledger
        .apply(Transaction::sell("BTC", dec!(1200), dec!(1), Decimal::ZERO))
        .unwrap();

    let pos = ledger.position("BTC").unwrap();
    assert_eq!(pos.quantity(), Decimal::ZERO);
    assert_eq!(pos.realized(), &[dec!(200)]);
}

#[test]
fn aggregate_equals_sum_over_positions() {
    let mut ledger = ledger();
    ledger
        .apply(Transaction::buy("BTC", dec!(100), dec!(10), Decimal::ZERO))
        .unwrap();
    ledger
        .apply(Transaction::buy("ETH", dec!(10), dec!(100), Decimal::ZERO))
        .unwrap();
    ledger
        .apply(Transaction::sell("BTC", dec!(120), dec!(5), Decimal::ZERO))
        .unwrap();
    ledger
        .apply(Transaction::sell("ETH", dec!(8), dec!(50), Decimal::ZERO))
        .unwrap();

    let by_position: Decimal = ledger
        .positions()
        .map(|(_, p)| p.total_realized_profit_loss())
        .sum();
    assert_eq!(ledger.total_realized_profit_loss(), by_position);
    assert_eq!(ledger.total_realized_profit_loss(), dec!(0));

    let by_asset = ledger.realized_by_asset();
    assert_eq!(
        by_asset,
        vec![
            ("BTC".to_string(), dec!(100)),
            ("ETH".to_string(), dec!(-100)),
        ]
    );
}

#[test]
fn audit_trail_preserves_application_order() {
    let mut ledger = ledger();
    ledger
        .apply(Transaction::buy("BTC", dec!(1000), dec!(1), Decimal::ZERO))
        .unwrap();
    ledger.apply(Transaction::deposit("SOL", dec!(10))).unwrap();
    ledger
        .apply(Transaction::convert("BTC", "ETH", dec!(100), dec!(2), Decimal::ZERO))
        .unwrap();

    let actions: Vec<Action> = ledger.audit_trail().iter().map(|r| r.action).collect();
    assert_eq!(
        actions,
        vec![Action::Buy, Action::Deposit, Action::Sell, Action::Buy]
    );
}

#[test]
fn unknown_action_strings_are_rejected_at_parse() {
    let err = "withdrawal".parse::<Action>().unwrap_err();
    assert_eq!(err, LedgerError::UnknownAction("withdrawal".to_string()));
    assert_eq!("BUY".parse::<Action>().unwrap(), Action::Buy);
}
