//! Realized-gains tax reporting
//!
//! Derived arithmetic layered on top of the ledger's aggregates. Nothing
//! here mutates or re-reads ledger internals beyond the public accessors;
//! the tax bracket rules stay outside the ledger.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::TaxConfig;
use crate::ledger::Ledger;

/// Realized profit/loss for one asset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetLine {
    pub asset: String,
    pub realized_profit_loss: Decimal,
}

/// Summary of a processed export: total and per-asset realized P/L plus
/// the resulting tax position.
#[derive(Debug, Clone, Serialize)]
pub struct TaxReport {
    pub currency: String,
    pub total_realized_profit_loss: Decimal,
    /// Tax due when the net result is a profit
    pub tax_due: Decimal,
    /// Deductible amount when the net result is a loss
    pub deductible_loss: Decimal,
    pub assets: Vec<AssetLine>,
}

impl TaxReport {
    /// Build a report from the ledger's aggregates: profit is taxed at the
    /// configured rate, and the configured share of a net loss is
    /// deductible.
    pub fn from_ledger(ledger: &Ledger, tax: &TaxConfig) -> Self {
        let total = ledger.total_realized_profit_loss();
        let (tax_due, deductible_loss) = if total > Decimal::ZERO {
            (total * tax.profit_rate, Decimal::ZERO)
        } else if total < Decimal::ZERO {
            (Decimal::ZERO, total.abs() * tax.loss_deductible_rate)
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };

        let assets = ledger
            .realized_by_asset()
            .into_iter()
            .map(|(asset, realized_profit_loss)| AssetLine {
                asset,
                realized_profit_loss,
            })
            .collect();

        Self {
            currency: ledger.base_currency().to_string(),
            total_realized_profit_loss: total,
            tax_due,
            deductible_loss,
            assets,
        }
    }
}
