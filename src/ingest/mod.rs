//! Coinbase CSV ingestion
//!
//! Turns a raw Coinbase transaction-history export into the normalized,
//! chronologically ordered [`Transaction`] sequence the ledger consumes:
//! currency-string cleanup, timestamp parsing, provider-vocabulary mapping
//! and extraction of the conversion destination from the free-text Notes
//! column all happen here, never in the ledger.
//!
//! Rows that cannot be normalized (missing quantity, unknown transaction
//! type, unresolvable conversion target) are logged and skipped; whether to
//! abort instead is this layer's policy, not the ledger's.


use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use crate::error::Result;
use crate::ledger::Ledger;
use crate::types::{Action, Transaction};

/// Metadata lines Coinbase prepends before the actual header row
const METADATA_LINES: usize = 2;

/// One raw row of a Coinbase export. Amount columns arrive as display
/// strings ("kr1,234.56") and are cleaned up during normalization.
#[derive(Debug, Deserialize)]
struct CoinbaseRow {
    #[serde(rename = "ID", default)]
    id: String,
    #[serde(rename = "Timestamp", default)]
    timestamp: String,
    #[serde(rename = "Transaction Type", default)]
    transaction_type: String,
    #[serde(rename = "Asset", default)]
    asset: String,
    #[serde(rename = "Quantity Transacted", default)]
    quantity: String,
    #[serde(rename = "Price at Transaction", default)]
    price: String,
    #[serde(rename = "Fees and/or Spread", default)]
    fees: String,
    #[serde(rename = "Notes", default)]
    notes: String,
}

/// Outcome of normalizing one export file
#[derive(Debug)]
pub struct NormalizedBatch {
    /// Transactions in chronological order, ready for `Ledger::apply`
    pub transactions: Vec<Transaction>,
    /// Rows dropped during normalization
    pub skipped: usize,
}

/// Outcome of running a full export through a fresh ledger
#[derive(Debug)]
pub struct IngestReport {
    pub ledger: Ledger,
    /// Transactions the ledger accepted
    pub applied: usize,
    /// Rows dropped during normalization plus records the ledger rejected
    pub skipped: usize,
}

/// Read and normalize a Coinbase CSV export.
pub fn read_coinbase_csv(path: impl AsRef<Path>, base_currency: &str) -> Result<NormalizedBatch> {
    let raw = std::fs::read_to_string(path)?;
    normalize(&raw, base_currency)
}

/// Normalize raw export contents into a chronological transaction batch.
pub fn normalize(raw: &str, base_currency: &str) -> Result<NormalizedBatch> {
    let body = skip_metadata(raw);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut transactions = Vec::new();
    let mut skipped = 0usize;
    for row in reader.deserialize::<CoinbaseRow>() {
        // a malformed record is skipped like any other bad row, it never
        // aborts the rest of the file
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("skipping malformed record: {e}");
                skipped += 1;
                continue;
            }
        };
        match normalize_row(&row, base_currency) {
            Some(tx) => transactions.push(tx),
            None => skipped += 1,
        }
    }

    // the ledger does not sort; ordering is settled here
    transactions.sort_by_key(|tx| tx.timestamp);

    Ok(NormalizedBatch {
        transactions,
        skipped,
    })
}

/// Run a full export through a fresh ledger, skipping records the ledger
/// rejects.
pub fn process_file(
    path: impl AsRef<Path>,
    base_currency: &str,
) -> Result<IngestReport> {
    let batch = read_coinbase_csv(path, base_currency)?;
    let mut ledger = Ledger::new(base_currency);
    let mut applied = 0usize;
    let mut skipped = batch.skipped;

    for tx in batch.transactions {
        let summary = format!("{} {} {}", tx.action, tx.quantity, tx.asset);
        match ledger.apply(tx) {
            Ok(_) => applied += 1,
            Err(e) => {
                tracing::warn!("skipping rejected transaction ({summary}): {e}");
                skipped += 1;
            }
        }
    }

    Ok(IngestReport {
        ledger,
        applied,
        skipped,
    })
}

fn skip_metadata(raw: &str) -> String {
    raw.lines()
        .skip(METADATA_LINES)
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_row(row: &CoinbaseRow, base_currency: &str) -> Option<Transaction> {
    // rows without a positive transacted quantity (fiat movements, zeroed
    // or corrupted entries) carry no ledger-relevant information
    let quantity = match parse_amount(&row.quantity) {
        Some(q) if q > Decimal::ZERO => q,
        _ => {
            tracing::debug!("row {}: missing or non-positive quantity, skipping", row.id);
            return None;
        }
    };
    let price = parse_amount(&row.price).unwrap_or(Decimal::ZERO);
    let fee = parse_amount(&row.fees).unwrap_or(Decimal::ZERO);
    let timestamp = parse_timestamp(&row.timestamp);

    let action = match row.transaction_type.as_str() {
        "Advanced Trade Buy" => Action::Buy,
        "Advanced Trade Sell" => Action::Sell,
        other => match Action::from_str(other) {
            Ok(action) => action,
            Err(e) => {
                tracing::warn!("row {}: {e}, skipping", row.id);
                return None;
            }
        },
    };

    let tx = match action {
        Action::Buy => Transaction::buy(row.asset.clone(), price, quantity, fee),
        Action::Sell => Transaction::sell(row.asset.clone(), price, quantity, fee),
        Action::Deposit => {
            if row.asset == base_currency {
                // fiat deposit, nothing enters the ledger
                return None;
            }
            Transaction::deposit(row.asset.clone(), quantity)
        }
        Action::Convert => {
            let to_asset = match extract_to_asset(&row.notes, &row.asset) {
                Some(to) => to,
                None => {
                    tracing::warn!(
                        "row {}: cannot determine conversion target from notes {:?}, skipping",
                        row.id,
                        row.notes
                    );
                    return None;
                }
            };
            Transaction::convert(row.asset.clone(), to_asset, price, quantity, fee)
        }
    };

    Some(match timestamp {
        Some(ts) => tx.at(ts),
        None => tx,
    })
}

/// Strip currency formatting ("kr1,234.56" -> 1234.56). Empty or
/// unparseable strings yield `None`.
fn parse_amount(value: &str) -> Option<Decimal> {
    let cleaned = value.replace("kr", "").replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(cleaned).ok()
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    // older exports use a naive "YYYY-MM-DD HH:MM:SS" format, taken as UTC
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Best-effort extraction of the conversion destination from a note like
/// "Converted BTC to ETH": the token after the word "to", provided it
/// differs from the source asset.
fn extract_to_asset(notes: &str, from_asset: &str) -> Option<String> {
    let mut parts = notes.split_whitespace();
    while let Some(word) = parts.next() {
        if word == "to" {
            return match parts.next() {
                Some(to) if to != from_asset => Some(to.to_string()),
                _ => None,
            };
        }
    }
    None
}
