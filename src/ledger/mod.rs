//! Ledger module containing the chart of accounts and the journal

pub mod chart;
pub mod journal;

pub use chart::*;
pub use journal::*;
