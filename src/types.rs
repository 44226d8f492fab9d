//! Core data types shared across the ledger, ingestion and reporting layers

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ledger::LedgerError;

/// The four canonical transaction actions the ledger understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
    /// Receipt of an asset with no tracked acquisition cost (airdrop,
    /// externally acquired units entering tracking)
    Deposit,
    /// Asset-to-asset exchange, decomposed into a sell and a buy leg
    Convert,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "buy"),
            Action::Sell => write!(f, "sell"),
            Action::Deposit => write!(f, "deposit"),
            Action::Convert => write!(f, "convert"),
        }
    }
}

impl FromStr for Action {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(Action::Buy),
            "sell" => Ok(Action::Sell),
            "deposit" => Ok(Action::Deposit),
            "convert" => Ok(Action::Convert),
            other => Err(LedgerError::UnknownAction(other.to_string())),
        }
    }
}

/// A normalized transaction record, ready to be applied to the ledger.
///
/// Amounts are already expressed in the ledger's base currency; the
/// ingestion layer is responsible for currency cleanup, timestamp parsing
/// and chronological ordering before records reach `Ledger::apply`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub action: Action,
    /// Asset being transacted (the source asset for a conversion)
    pub asset: String,
    /// Destination asset; required and only meaningful for conversions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_asset: Option<String>,
    /// Unit price in base currency (zero for deposits)
    pub price: Decimal,
    /// Units transacted
    pub quantity: Decimal,
    /// Transaction fee in base currency
    #[serde(default)]
    pub fee: Decimal,
    /// Opaque ordering/display field, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn buy(asset: impl Into<String>, price: Decimal, quantity: Decimal, fee: Decimal) -> Self {
        Self {
            action: Action::Buy,
            asset: asset.into(),
            to_asset: None,
            price,
            quantity,
            fee,
            timestamp: None,
        }
    }

    pub fn sell(asset: impl Into<String>, price: Decimal, quantity: Decimal, fee: Decimal) -> Self {
        Self {
            action: Action::Sell,
            asset: asset.into(),
            to_asset: None,
            price,
            quantity,
            fee,
            timestamp: None,
        }
    }

    pub fn deposit(asset: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            action: Action::Deposit,
            asset: asset.into(),
            to_asset: None,
            price: Decimal::ZERO,
            quantity,
            fee: Decimal::ZERO,
            timestamp: None,
        }
    }

    pub fn convert(
        asset: impl Into<String>,
        to_asset: impl Into<String>,
        price: Decimal,
        quantity: Decimal,
        fee: Decimal,
    ) -> Self {
        Self {
            action: Action::Convert,
            asset: asset.into(),
            to_asset: Some(to_asset.into()),
            price,
            quantity,
            fee,
            timestamp: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// One entry of the ledger's append-only audit trail.
///
/// A buy, sell or deposit appends exactly one record; a conversion appends
/// two (the synthesized sell leg and buy leg, sharing a timestamp).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub action: Action,
    pub asset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_asset: Option<String>,
    pub price: Decimal,
    pub quantity: Decimal,
    pub fee: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Base currency all amounts are expressed in (informational)
    pub currency: String,
}
