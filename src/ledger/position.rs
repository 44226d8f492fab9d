//! Per-asset average-cost position tracking

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::LedgerError;

/// The accounting record for a single asset: units held, accumulated cost
/// basis and the history of realized profit/loss events.
///
/// Cost basis follows the average-cost method: all held units share one
/// blended acquisition price, and a partial sale removes cost at that
/// average, never at the sale price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    quantity: Decimal,
    total_cost: Decimal,
    realized: Vec<Decimal>,
}

impl Position {
    pub fn new() -> Self {
        Self::default()
    }

    /// Units currently held. Never negative.
    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Cumulative acquisition cost (price * quantity + fees), reduced
    /// proportionally on each sale.
    pub fn total_cost(&self) -> Decimal {
        self.total_cost
    }

    /// Blended acquisition price per unit, zero when nothing is held.
    pub fn average_price(&self) -> Decimal {
        if self.quantity.is_zero() {
            Decimal::ZERO
        } else {
            self.total_cost / self.quantity
        }
    }

    /// Realized profit/loss events, one per completed sale, oldest first.
    pub fn realized(&self) -> &[Decimal] {
        &self.realized
    }

    pub fn total_realized_profit_loss(&self) -> Decimal {
        self.realized.iter().sum()
    }

    /// Record an acquisition. Fees fold into the cost basis.
    pub fn buy(&mut self, price: Decimal, quantity: Decimal, fee: Decimal) {
        self.total_cost += price * quantity + fee;
        self.quantity += quantity;
    }

    /// Record a sale of `quantity` units at `price`, returning the realized
    /// profit or loss.
    ///
    /// Cost basis is removed at the pre-sale average price. Selling the
    /// entire holding removes the exact remaining `total_cost` instead of
    /// `average_price * quantity`, so a full liquidation leaves no division
    /// dust in either running total.
    pub fn sell(
        &mut self,
        price: Decimal,
        quantity: Decimal,
        fee: Decimal,
    ) -> Result<Decimal, LedgerError> {
        if quantity > self.quantity {
            return Err(LedgerError::InsufficientHoldings {
                requested: quantity,
                available: self.quantity,
            });
        }

        let proceeds = price * quantity - fee;
        let cost_removed = if quantity == self.quantity {
            self.total_cost
        } else {
            self.average_price() * quantity
        };
        let profit_loss = proceeds - cost_removed;

        self.total_cost -= cost_removed;
        self.quantity -= quantity;
        self.realized.push(profit_loss);

        Ok(profit_loss)
    }
}
