//! Gainsledger
//!
//! Average-cost ledger and capital gains reporting for crypto holdings.
//!
//! ## Architecture
//!
//! ```text
//! Coinbase CSV → Ingest (normalize, sort) → Ledger.apply → Position mutations
//!                                               ↓                 ↓
//!                                          Audit trail      Realized P/L → Tax report
//! ```
//!
//! The ISK-vs-AF growth projection is an independent numeric simulation
//! with no ledger state.

pub mod config;
pub mod error;
pub mod ingest;
pub mod ledger;
pub mod projection;
pub mod report;
pub mod types;
