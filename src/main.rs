//! Gainsledger CLI
//!
//! Processes Coinbase transaction exports into realized capital gains and
//! tax figures, and compares ISK vs AF account growth.

use clap::{Parser, Subcommand};
use gainsledger::{
    config::Config,
    ingest,
    projection::{self, ProjectionParams},
    report::TaxReport,
};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gainsledger")]
#[command(about = "Average-cost ledger and capital gains reporting for crypto holdings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute realized profit/loss and tax from a Coinbase CSV export
    Report {
        /// Path to the export file
        file: PathBuf,
        /// Emit the report as JSON instead of text
        #[arg(long)]
        json: bool,
        /// Also list remaining holdings per asset
        #[arg(long)]
        positions: bool,
    },
    /// Print the audit trail of applied transactions for an export
    Audit {
        /// Path to the export file
        file: PathBuf,
    },
    /// Compare ISK and AF account growth under the configured assumptions
    Project {
        /// Starting capital override
        #[arg(long)]
        capital: Option<Decimal>,
        /// Monthly investment override
        #[arg(long)]
        monthly: Option<Decimal>,
        /// Annual return override (0.05 = 5%)
        #[arg(long)]
        annual_return: Option<Decimal>,
        /// Investment period override in years
        #[arg(long)]
        years: Option<u32>,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Report {
            file,
            json,
            positions,
        } => run_report(config, &file, json, positions),
        Commands::Audit { file } => run_audit(config, &file),
        Commands::Project {
            capital,
            monthly,
            annual_return,
            years,
        } => run_projection(config, capital, monthly, annual_return, years),
    }
}

fn run_report(config: Config, file: &PathBuf, json: bool, positions: bool) -> anyhow::Result<()> {
    let outcome = ingest::process_file(file, &config.base_currency)?;
    tracing::info!(
        "applied {} transactions, skipped {}",
        outcome.applied,
        outcome.skipped
    );

    let report = TaxReport::from_ledger(&outcome.ledger, &config.tax);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let currency = &report.currency;
    println!(
        "Total Realized Profit/Loss: {:.2} {currency}",
        report.total_realized_profit_loss
    );
    if report.tax_due > Decimal::ZERO {
        println!("Total Tax to Pay: {:.2} {currency}", report.tax_due);
    } else if report.deductible_loss > Decimal::ZERO {
        println!(
            "Total Deductible Loss: {:.2} {currency}",
            report.deductible_loss
        );
    } else {
        println!("No profit or loss.");
    }

    println!("\nDetailed Profit/Loss per Asset:");
    for line in &report.assets {
        println!("- {}: {:.2} {currency}", line.asset, line.realized_profit_loss);
    }

    if positions {
        println!("\nRemaining Holdings:");
        let mut rows: Vec<_> = outcome.ledger.positions().collect();
        rows.sort_by_key(|(asset, _)| asset.to_string());
        for (asset, pos) in rows {
            println!(
                "- {asset}: quantity {:.8}, average price {:.2}, cost basis {:.2}",
                pos.quantity(),
                pos.average_price(),
                pos.total_cost()
            );
        }
    }

    Ok(())
}

fn run_audit(config: Config, file: &PathBuf) -> anyhow::Result<()> {
    let outcome = ingest::process_file(file, &config.base_currency)?;

    for record in outcome.ledger.audit_trail() {
        let when = record
            .timestamp
            .map(|ts| ts.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{when}  {:<8} {:<6} qty {:.8} @ {:.2} fee {:.2} {}",
            record.action.to_string(),
            record.asset,
            record.quantity,
            record.price,
            record.fee,
            record.currency
        );
    }

    Ok(())
}

fn run_projection(
    config: Config,
    capital: Option<Decimal>,
    monthly: Option<Decimal>,
    annual_return: Option<Decimal>,
    years: Option<u32>,
) -> anyhow::Result<()> {
    let defaults = &config.projection;
    let params = ProjectionParams {
        capital: capital.unwrap_or(defaults.capital),
        monthly_investment: monthly.unwrap_or(defaults.monthly_investment),
        annual_return: annual_return.unwrap_or(defaults.annual_return),
        years: years.unwrap_or(defaults.years),
    };

    let isk = projection::project_isk(&params, defaults.gov_interest_rate);
    let af = projection::project_af(&params, defaults.af_tax_rate);

    println!(
        "ISK vs AF over {} years ({} capital, {} monthly, {:.1}% annual return)",
        params.years,
        params.capital,
        params.monthly_investment,
        params.annual_return * Decimal::ONE_HUNDRED
    );
    println!("\n{:>6}  {:>14}  {:>14}", "Year", "ISK", "AF");
    for year in 0..=params.years {
        let month = (year * 12) as usize;
        println!(
            "{year:>6}  {:>14.2}  {:>14.2}",
            isk.values[month], af.values[month]
        );
    }

    println!("\nFinal value:   ISK {:.2} | AF {:.2}", isk.final_value(), af.final_value());
    println!("Total tax:     ISK {:.2} | AF {:.2}", isk.total_tax(), af.total_tax());
    println!("Total gain:    ISK {:.2} | AF {:.2}", isk.total_gain(), af.total_gain());

    Ok(())
}
