//! Core types and data structures for the accounting engine

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account categories of the laundry chart of accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountCategory {
    /// Cash, receivables, inventory, prepaid expenses
    AssetCurrent,
    /// Equipment and its accumulated depreciation
    AssetFixed,
    /// What the business owes (Accounts Payable, ...)
    Liability,
    /// Owner's capital and retained earnings
    Equity,
    /// Service revenue
    Revenue,
    /// Cost of sales (materials consumed by services)
    CostOfSales,
    /// Salaries, rent, utilities, depreciation, ...
    OperatingExpense,
}

impl AccountCategory {
    /// Every category, in statement order
    pub const ALL: [AccountCategory; 7] = [
        AccountCategory::AssetCurrent,
        AccountCategory::AssetFixed,
        AccountCategory::Liability,
        AccountCategory::Equity,
        AccountCategory::Revenue,
        AccountCategory::CostOfSales,
        AccountCategory::OperatingExpense,
    ];

    /// Side that counts as positive when summing postings inside a period.
    ///
    /// Revenue is credit-positive; everything else is read debit-positive.
    pub fn period_sign(&self) -> EntryType {
        match self {
            AccountCategory::Revenue => EntryType::Credit,
            AccountCategory::CostOfSales
            | AccountCategory::OperatingExpense
            | AccountCategory::AssetCurrent
            | AccountCategory::AssetFixed
            | AccountCategory::Liability
            | AccountCategory::Equity => EntryType::Debit,
        }
    }

    /// Side that counts as positive when summing postings up to a cutoff date
    pub fn cumulative_sign(&self) -> EntryType {
        match self {
            AccountCategory::AssetCurrent
            | AccountCategory::AssetFixed
            | AccountCategory::CostOfSales
            | AccountCategory::OperatingExpense => EntryType::Debit,
            AccountCategory::Liability | AccountCategory::Equity | AccountCategory::Revenue => {
                EntryType::Credit
            }
        }
    }

    /// Whether the category belongs on the balance sheet
    pub fn is_balance_sheet(&self) -> bool {
        matches!(
            self,
            AccountCategory::AssetCurrent
                | AccountCategory::AssetFixed
                | AccountCategory::Liability
                | AccountCategory::Equity
        )
    }
}

/// Types of entries in double-entry bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    Debit,
    Credit,
}

impl EntryType {
    /// Signed contribution of a posting line when this side is the positive one
    pub fn signed(&self, debit: &BigDecimal, credit: &BigDecimal) -> BigDecimal {
        match self {
            EntryType::Debit => debit - credit,
            EntryType::Credit => credit - debit,
        }
    }
}

/// Chart of accounts entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account code, e.g. `1-100`
    pub code: String,
    /// Human-readable account name
    pub name: String,
    pub category: AccountCategory,
}

impl Account {
    pub fn new(code: impl Into<String>, name: impl Into<String>, category: AccountCategory) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            category,
        }
    }
}

/// One debit-or-credit line of the journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalPosting {
    pub id: Uuid,
    /// Document number of the owning transaction
    pub transaction_id: String,
    pub date: NaiveDate,
    pub branch_id: String,
    pub account_code: String,
    pub debit: BigDecimal,
    pub credit: BigDecimal,
    pub description: String,
}

impl JournalPosting {
    /// Contribution of this line when `side` is the positive side
    pub fn signed_amount(&self, side: EntryType) -> BigDecimal {
        side.signed(&self.debit, &self.credit)
    }
}

/// Business document kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Sales,
    Purchase,
    Expense,
    Asset,
    Adjustment,
}

/// Settlement state of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Outstanding, e.g. a sale on credit
    Draft,
    /// Settled in cash
    Posted,
}

/// How a sale or purchase is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    Paid,
    Unpaid,
}

/// Document header. Postings reference it through `transaction_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Document number, e.g. `INV/2024/00231`
    pub id: String,
    pub branch_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub kind: TransactionKind,
    pub total_amount: BigDecimal,
    pub status: TransactionStatus,
    /// Customer or supplier id
    pub party_id: Option<String>,
    /// Amount still to be collected on a draft sale
    pub outstanding: BigDecimal,
}

/// Branch selector used by queries
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BranchFilter {
    #[default]
    All,
    Branch(String),
}

impl BranchFilter {
    pub fn branch(id: impl Into<String>) -> Self {
        BranchFilter::Branch(id.into())
    }

    pub fn matches(&self, branch_id: &str) -> bool {
        match self {
            BranchFilter::All => true,
            BranchFilter::Branch(id) => id == branch_id,
        }
    }
}

/// Errors that can occur in the accounting engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Validation error on `{field}`: {message}")]
    Validation { field: String, message: String },
    #[error(
        "Insufficient stock for material '{material_id}': requested {requested}, available {available}"
    )]
    InsufficientStock {
        material_id: String,
        requested: BigDecimal,
        available: BigDecimal,
    },
    #[error("Imbalanced posting for '{transaction_id}': debits = {debits}, credits = {credits}")]
    ImbalancedPosting {
        transaction_id: String,
        debits: BigDecimal,
        credits: BigDecimal,
    },
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LedgerError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        LedgerError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Validation error for a reference that does not resolve
    pub fn unknown(field: &str, id: &str) -> Self {
        Self::validation(field, format!("unknown reference '{id}'"))
    }

    /// Recoverable errors can be reported back to the user for a retry
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LedgerError::Validation { .. } | LedgerError::InsufficientStock { .. }
        )
    }
}

impl From<config::ConfigError> for LedgerError {
    fn from(err: config::ConfigError) -> Self {
        LedgerError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_tables() {
        assert_eq!(AccountCategory::Revenue.period_sign(), EntryType::Credit);
        assert_eq!(AccountCategory::Liability.period_sign(), EntryType::Debit);
        assert_eq!(AccountCategory::Liability.cumulative_sign(), EntryType::Credit);
        assert_eq!(AccountCategory::CostOfSales.cumulative_sign(), EntryType::Debit);
        assert!(AccountCategory::AssetFixed.is_balance_sheet());
        assert!(!AccountCategory::OperatingExpense.is_balance_sheet());
    }

    #[test]
    fn test_signed_amount() {
        let d = BigDecimal::from(100);
        let c = BigDecimal::from(30);
        assert_eq!(EntryType::Debit.signed(&d, &c), BigDecimal::from(70));
        assert_eq!(EntryType::Credit.signed(&d, &c), BigDecimal::from(-70));
    }

    #[test]
    fn test_branch_filter() {
        assert!(BranchFilter::All.matches("b1"));
        assert!(BranchFilter::branch("b1").matches("b1"));
        assert!(!BranchFilter::branch("b1").matches("b2"));
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(LedgerError::validation("qty", "must be positive").is_recoverable());
        assert!(!LedgerError::ImbalancedPosting {
            transaction_id: "INV/2024/00001".to_string(),
            debits: BigDecimal::from(1),
            credits: BigDecimal::from(2),
        }
        .is_recoverable());
    }
}
