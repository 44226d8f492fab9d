//! Account growth projections
//!
//! Two simulated savings accounts under monthly compounding and periodic
//! taxation, independent of the ledger:
//!
//! - **ISK** (tax-advantaged): taxed yearly on a standard income computed
//!   from the average of the four quarter-start balances plus the year's
//!   deposits, regardless of realized gains.
//! - **AF** (standard): untaxed during the holding period, the final gain
//!   taxed once at the configured rate.


use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

/// Statutory floor for the ISK standard rate
const ISK_MIN_STANDARD_RATE: Decimal = dec!(0.0125);
/// Markup over the government borrowing rate
const ISK_RATE_MARKUP: Decimal = dec!(0.01);
/// Tax share of the ISK standard income
const ISK_TAX_SHARE: Decimal = dec!(0.30);

/// Inputs shared by both projections
#[derive(Debug, Clone)]
pub struct ProjectionParams {
    /// Starting capital
    pub capital: Decimal,
    /// Amount deposited at the start of every month
    pub monthly_investment: Decimal,
    /// Expected annual return, as a decimal (0.05 = 5%)
    pub annual_return: Decimal,
    /// Simulation horizon
    pub years: u32,
}

/// Month-by-month result series. Index 0 is the starting state; each later
/// index is the end of that month.
#[derive(Debug, Clone)]
pub struct GrowthSeries {
    pub values: Vec<Decimal>,
    /// Cumulative tax paid up to each month
    pub tax_paid: Vec<Decimal>,
    /// Cumulative gain (value minus everything invested) up to each month
    pub gains: Vec<Decimal>,
}

impl GrowthSeries {
    pub fn final_value(&self) -> Decimal {
        *self.values.last().unwrap_or(&Decimal::ZERO)
    }

    pub fn total_tax(&self) -> Decimal {
        *self.tax_paid.last().unwrap_or(&Decimal::ZERO)
    }

    pub fn total_gain(&self) -> Decimal {
        *self.gains.last().unwrap_or(&Decimal::ZERO)
    }
}

/// Yearly ISK tax from the four quarter-start balances and the year's
/// deposits: average those over four quarters, apply the standard rate
/// (government borrowing rate plus one percentage point, floored at 1.25%),
/// tax 30% of the resulting standard income.
pub fn isk_tax(
    quarterly_values: &[Decimal; 4],
    annual_deposits: Decimal,
    gov_interest_rate: Decimal,
) -> Decimal {
    let total: Decimal = quarterly_values.iter().sum();
    let average_value = (total + annual_deposits) / dec!(4);
    let standard_rate = (gov_interest_rate + ISK_RATE_MARKUP).max(ISK_MIN_STANDARD_RATE);
    average_value * standard_rate * ISK_TAX_SHARE
}

fn monthly_return(annual_return: Decimal) -> Decimal {
    (Decimal::ONE + annual_return).powd(Decimal::ONE / dec!(12)) - Decimal::ONE
}

/// Simulate an ISK account month by month, deducting the standard tax at
/// the end of every year.
pub fn project_isk(params: &ProjectionParams, gov_interest_rate: Decimal) -> GrowthSeries {
    let monthly_return = monthly_return(params.annual_return);
    let total_months = params.years * 12;

    let mut value = params.capital;
    let mut invested = params.capital;
    let mut total_tax = Decimal::ZERO;
    let mut quarterly_values: Vec<Decimal> = Vec::with_capacity(4);
    let mut annual_deposits = Decimal::ZERO;

    let mut series = GrowthSeries {
        values: vec![value],
        tax_paid: vec![Decimal::ZERO],
        gains: vec![Decimal::ZERO],
    };

    for month in 1..=total_months {
        // quarter-start balance, sampled before the month's deposit and
        // return
        if matches!((month - 1) % 12, 0 | 3 | 6 | 9) {
            quarterly_values.push(value);
        }

        value += params.monthly_investment;
        annual_deposits += params.monthly_investment;
        invested += params.monthly_investment;

        value *= Decimal::ONE + monthly_return;

        if month % 12 == 0 {
            let quarters: [Decimal; 4] = [
                quarterly_values[0],
                quarterly_values[1],
                quarterly_values[2],
                quarterly_values[3],
            ];
            let tax = isk_tax(&quarters, annual_deposits, gov_interest_rate);
            value -= tax;
            total_tax += tax;
            quarterly_values.clear();
            annual_deposits = Decimal::ZERO;
        }

        series.values.push(value);
        series.tax_paid.push(total_tax);
        series.gains.push(value - invested);
    }

    series
}

/// Simulate a standard (AF) account: untaxed growth, one tax on the final
/// gain.
pub fn project_af(params: &ProjectionParams, af_tax_rate: Decimal) -> GrowthSeries {
    let monthly_return = monthly_return(params.annual_return);
    let total_months = params.years * 12;

    let mut value = params.capital;
    let mut invested = params.capital;

    let mut series = GrowthSeries {
        values: vec![value],
        tax_paid: vec![Decimal::ZERO],
        gains: vec![Decimal::ZERO],
    };

    for _ in 1..=total_months {
        value += params.monthly_investment;
        invested += params.monthly_investment;
        value *= Decimal::ONE + monthly_return;

        series.values.push(value);
        series.tax_paid.push(Decimal::ZERO);
        series.gains.push(value - invested);
    }

    // tax the whole gain once at the end
    let gain = value - invested;
    let tax = (gain * af_tax_rate).max(Decimal::ZERO);
    let after_tax = value - tax;

    if let Some(last) = series.values.last_mut() {
        *last = after_tax;
    }
    if let Some(last) = series.tax_paid.last_mut() {
        *last = tax;
    }
    if let Some(last) = series.gains.last_mut() {
        *last = after_tax - invested;
    }

    series
}
