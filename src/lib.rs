//! # Laundry Accounting
//!
//! Accounting and transaction-posting engine for a multi-branch laundry chain.
//!
//! ## Features
//!
//! - **Transaction posting**: sales, purchases, stock mutations, expenses,
//!   collections and supplier payments as balanced double-entry documents
//! - **Inventory costing**: per-branch materials with average-cost valuation and
//!   recipe explosion of sold services into material consumption
//! - **Party ledgers**: customer receivables and supplier payables
//! - **Financial reporting**: profit & loss, balance sheet, cash flow and branch
//!   performance from a point-in-time ledger snapshot
//! - **Storage abstraction**: postings commit through the [`BookStorage`] trait
//!
//! ## Quick Start
//!
//! ```rust
//! use laundry_accounting::{BranchFilter, MemoryStorage, ReportPeriod, TransactionPoster};
//!
//! # async fn run() -> laundry_accounting::LedgerResult<()> {
//! let poster = TransactionPoster::with_standard_chart(MemoryStorage::new())?;
//! let snapshot = poster.snapshot().await?;
//! let period = ReportPeriod::monthly(2024, 1)?;
//! let pnl = snapshot.reports().profit_and_loss(&period, &BranchFilter::All);
//! assert_eq!(pnl.net_income, bigdecimal::BigDecimal::from(0));
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod config;
pub mod inventory;
pub mod ledger;
pub mod parties;
pub mod posting;
pub mod reports;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use assets::*;
pub use self::config::*;
pub use inventory::*;
pub use ledger::*;
pub use parties::*;
pub use posting::*;
pub use reports::*;
pub use traits::*;
pub use types::*;
pub use utils::MemoryStorage;
