//! Storage abstraction for the accounting engine

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::assets::FixedAsset;
use crate::inventory::{InventoryStore, ServiceProduct};
use crate::ledger::{Journal, PostingLine};
use crate::parties::{Customer, Supplier};
use crate::types::*;

/// State change applied together with a document's postings
#[derive(Debug, Clone, PartialEq)]
pub enum BookEffect {
    /// `stock += delta`; the result must not be negative
    AdjustStock {
        material_id: String,
        delta: BigDecimal,
    },
    SetAverageCost {
        material_id: String,
        cost: BigDecimal,
    },
    /// The result must not be negative
    AdjustReceivable {
        customer_id: String,
        delta: BigDecimal,
    },
    /// The result must not be negative
    AdjustPayable {
        supplier_id: String,
        delta: BigDecimal,
    },
    /// Collect part of a draft sale; the sale becomes POSTED once fully collected
    SettleDocument {
        transaction_id: String,
        amount: BigDecimal,
    },
    /// Add to an asset's accumulated depreciation, up to its cost, once per month
    Depreciate {
        asset_id: String,
        amount: BigDecimal,
        date: NaiveDate,
    },
}

/// One document's worth of changes, committed all-or-nothing.
///
/// The document number is assigned at commit time from `prefix` and the
/// year of `date`.
#[derive(Debug, Clone, PartialEq)]
pub struct PostingBatch {
    pub prefix: String,
    pub branch_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub party_id: Option<String>,
    pub total_amount: BigDecimal,
    pub lines: Vec<PostingLine>,
    pub effects: Vec<BookEffect>,
}

impl PostingBatch {
    /// Header for the committed document
    pub fn header(&self, id: String) -> Transaction {
        let outstanding = match self.status {
            TransactionStatus::Draft => self.total_amount.clone(),
            TransactionStatus::Posted => BigDecimal::from(0),
        };
        Transaction {
            id,
            branch_id: self.branch_id.clone(),
            date: self.date,
            description: self.description.clone(),
            kind: self.kind,
            total_amount: self.total_amount.clone(),
            status: self.status,
            party_id: self.party_id.clone(),
            outstanding,
        }
    }
}

/// Storage abstraction for the books of the laundry chain
///
/// Master data (customers, suppliers, services, materials, assets) is owned
/// elsewhere; the engine only reads it and moves balances through
/// [`BookStorage::commit`].
#[async_trait]
pub trait BookStorage: Send + Sync {
    async fn get_customer(&self, customer_id: &str) -> LedgerResult<Option<Customer>>;

    async fn get_supplier(&self, supplier_id: &str) -> LedgerResult<Option<Supplier>>;

    async fn get_service(&self, service_id: &str) -> LedgerResult<Option<ServiceProduct>>;

    async fn get_fixed_asset(&self, asset_id: &str) -> LedgerResult<Option<FixedAsset>>;

    /// Point-in-time copy of the materials inventory
    async fn inventory(&self) -> LedgerResult<InventoryStore>;

    async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<Option<Transaction>>;

    /// Document headers in commit order
    async fn list_transactions(&self, branch: &BranchFilter) -> LedgerResult<Vec<Transaction>>;

    /// Point-in-time copy of the journal. Never contains part of a document.
    async fn journal(&self) -> LedgerResult<Journal>;

    /// Validate and apply a batch atomically, returning the stored header.
    ///
    /// Effects are re-checked against current state; on any error nothing is
    /// applied and no document number is consumed.
    async fn commit(&self, batch: PostingBatch) -> LedgerResult<Transaction>;
}
