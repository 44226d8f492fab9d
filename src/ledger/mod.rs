//! Cost-basis ledger
//!
//! Owns one [`Position`] per asset, applies normalized transactions to
//! them, and keeps an append-only audit trail of everything applied.
//!
//! A conversion between two assets has no market price of its own: the
//! only objective inputs are the destination asset's base-currency price
//! and the source asset's existing cost basis. It is therefore decomposed
//! into a sell of the source asset at its own average price (realizing
//! exactly `-fee`) and a zero-fee buy of the destination asset.
//!
//! The ledger is single-writer and synchronous; callers sequence `apply`
//! calls in the order transactions should be economically applied.

mod position;
#[cfg(test)]
mod tests;

pub use position::Position;

use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;

use crate::types::{Action, AuditRecord, Transaction};

/// Validation failures surfaced by [`Ledger::apply`].
///
/// Every failure leaves the ledger exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("cannot sell {requested} units, only {available} held")]
    InsufficientHoldings {
        requested: Decimal,
        available: Decimal,
    },

    #[error("invalid {0}")]
    InvalidAction(String),

    #[error("unknown action '{0}', must be buy, sell, deposit or convert")]
    UnknownAction(String),

    #[error("conversion from {asset} requires a distinct destination asset")]
    MissingConversionTarget { asset: String },

    #[error("no holdings of {asset} to convert from")]
    NoHoldings { asset: String },
}

/// Portfolio-wide ledger: asset symbol -> [`Position`], plus the audit
/// trail of applied transactions.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    positions: HashMap<String, Position>,
    audit: Vec<AuditRecord>,
    base_currency: String,
}

impl Ledger {
    pub fn new(base_currency: impl Into<String>) -> Self {
        Self {
            positions: HashMap::new(),
            audit: Vec::new(),
            base_currency: base_currency.into(),
        }
    }

    /// Base currency all amounts are expressed in. Informational only; the
    /// ledger performs no conversion.
    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    /// Apply one transaction, returning the audit records it produced (one
    /// for buy/sell/deposit, two for a conversion).
    ///
    /// On error nothing is mutated and nothing is appended to the trail.
    pub fn apply(&mut self, tx: Transaction) -> Result<Vec<AuditRecord>, LedgerError> {
        match tx.action {
            Action::Buy => {
                self.position_mut(&tx.asset).buy(tx.price, tx.quantity, tx.fee);
                Ok(vec![self.record(&tx)])
            }
            Action::Sell => {
                // only buys and deposits create positions; a sell against an
                // untracked asset must not leave an empty entry behind
                let position = self.positions.get_mut(&tx.asset).ok_or_else(|| {
                    LedgerError::InsufficientHoldings {
                        requested: tx.quantity,
                        available: Decimal::ZERO,
                    }
                })?;
                position.sell(tx.price, tx.quantity, tx.fee)?;
                Ok(vec![self.record(&tx)])
            }
            Action::Deposit => {
                if tx.quantity <= Decimal::ZERO {
                    return Err(LedgerError::InvalidAction(format!(
                        "deposit of non-positive quantity {}",
                        tx.quantity
                    )));
                }
                // a deposit is a zero-cost buy: units enter tracking with
                // no acquisition cost
                self.position_mut(&tx.asset)
                    .buy(Decimal::ZERO, tx.quantity, Decimal::ZERO);
                Ok(vec![self.record(&tx)])
            }
            Action::Convert => self.convert(&tx),
        }
    }

    /// Two-legged conversion: liquidate enough of the source asset (at its
    /// own average price) to fund acquiring `tx.quantity` units of the
    /// destination at `tx.price`, fee charged on the sell leg only.
    fn convert(&mut self, tx: &Transaction) -> Result<Vec<AuditRecord>, LedgerError> {
        let to_asset = match tx.to_asset.as_deref() {
            Some(to) if to != tx.asset => to.to_string(),
            _ => {
                return Err(LedgerError::MissingConversionTarget {
                    asset: tx.asset.clone(),
                })
            }
        };

        let (avg_price, available) = match self.positions.get(&tx.asset) {
            Some(source) if !source.quantity().is_zero() => {
                (source.average_price(), source.quantity())
            }
            // a missing or emptied position cannot fund an acquisition
            _ => {
                return Err(LedgerError::NoHoldings {
                    asset: tx.asset.clone(),
                })
            }
        };

        let acquisition_cost = tx.price * tx.quantity + tx.fee;
        let quantity_to_sell = acquisition_cost / avg_price;
        if quantity_to_sell > available {
            return Err(LedgerError::InsufficientHoldings {
                requested: quantity_to_sell,
                available,
            });
        }

        // all checks passed, mutate both legs
        let source = self.position_mut(&tx.asset);
        // selling at the position's own average price makes this leg
        // realized-P/L-neutral apart from the fee
        source.sell(avg_price, quantity_to_sell, tx.fee)?;
        self.position_mut(&to_asset)
            .buy(tx.price, tx.quantity, Decimal::ZERO);

        let sell_leg = AuditRecord {
            action: Action::Sell,
            asset: tx.asset.clone(),
            to_asset: None,
            price: avg_price,
            quantity: quantity_to_sell,
            fee: tx.fee,
            timestamp: tx.timestamp,
            currency: self.base_currency.clone(),
        };
        let buy_leg = AuditRecord {
            action: Action::Buy,
            asset: to_asset,
            to_asset: None,
            price: tx.price,
            quantity: tx.quantity,
            fee: Decimal::ZERO,
            timestamp: tx.timestamp,
            currency: self.base_currency.clone(),
        };
        self.audit.push(sell_leg.clone());
        self.audit.push(buy_leg.clone());
        Ok(vec![sell_leg, buy_leg])
    }

    fn record(&mut self, tx: &Transaction) -> AuditRecord {
        let record = AuditRecord {
            action: tx.action,
            asset: tx.asset.clone(),
            to_asset: tx.to_asset.clone(),
            price: tx.price,
            quantity: tx.quantity,
            fee: tx.fee,
            timestamp: tx.timestamp,
            currency: self.base_currency.clone(),
        };
        self.audit.push(record.clone());
        record
    }

    fn position_mut(&mut self, asset: &str) -> &mut Position {
        self.positions.entry(asset.to_string()).or_default()
    }

    /// Look up a position without creating it.
    pub fn position(&self, asset: &str) -> Option<&Position> {
        self.positions.get(asset)
    }

    /// Iterate over all tracked assets and their positions.
    pub fn positions(&self) -> impl Iterator<Item = (&str, &Position)> {
        self.positions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Realized profit/loss summed over every position.
    pub fn total_realized_profit_loss(&self) -> Decimal {
        self.positions
            .values()
            .map(Position::total_realized_profit_loss)
            .sum()
    }

    /// Per-asset realized profit/loss, sorted by asset symbol.
    pub fn realized_by_asset(&self) -> Vec<(String, Decimal)> {
        let mut rows: Vec<(String, Decimal)> = self
            .positions
            .iter()
            .map(|(asset, pos)| (asset.clone(), pos.total_realized_profit_loss()))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    /// Accumulated audit trail, in application order.
    pub fn audit_trail(&self) -> &[AuditRecord] {
        &self.audit
    }
}
