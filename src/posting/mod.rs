//! Transaction poster: turns business events into balanced journal postings
//! and the inventory and party-balance changes that go with them.
//!
//! Every operation validates its input, reads what it needs, builds one
//! [`PostingBatch`] and hands it to [`BookStorage::commit`], which applies
//! the whole document or nothing. Postings for the same branch are
//! serialized so a document's reads and its commit see the same stock.

mod purchase;
mod sale;
mod settlement;

pub use purchase::*;
pub use sale::*;
pub use settlement::*;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::inventory::InventoryMaterial;
use crate::ledger::{ChartOfAccounts, JournalBuilder};
use crate::reports::LedgerSnapshot;
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::*;

/// One lock per branch, created on first use
#[derive(Debug, Default)]
struct BranchLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl BranchLocks {
    async fn acquire(&self, branch_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(branch_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// Direction of a manual stock mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationDirection {
    /// Cash restock outside the purchase flow
    In,
    /// Shrinkage or internal use
    Out,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMutationRequest {
    pub material_id: String,
    pub direction: MutationDirection,
    pub qty: BigDecimal,
    pub date: NaiveDate,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRequest {
    pub branch_id: String,
    pub date: NaiveDate,
    /// Operating expense account to charge
    pub account_code: String,
    pub amount: BigDecimal,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalContributionRequest {
    pub branch_id: String,
    pub date: NaiveDate,
    pub amount: BigDecimal,
    pub description: String,
}

/// Posts business events against a [`BookStorage`]
pub struct TransactionPoster<S: BookStorage> {
    storage: S,
    chart: ChartOfAccounts,
    config: EngineConfig,
    branch_locks: BranchLocks,
}

impl<S: BookStorage> TransactionPoster<S> {
    /// Create a poster, checking the configured accounts against the chart
    pub fn new(storage: S, chart: ChartOfAccounts, config: EngineConfig) -> LedgerResult<Self> {
        config.validate(&chart)?;
        Ok(Self {
            storage,
            chart,
            config,
            branch_locks: BranchLocks::default(),
        })
    }

    /// Create a poster over the standard laundry chart with default configuration
    pub fn with_standard_chart(storage: S) -> LedgerResult<Self> {
        Self::new(
            storage,
            ChartOfAccounts::laundry_standard(),
            EngineConfig::default(),
        )
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn chart(&self) -> &ChartOfAccounts {
        &self.chart
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn money(&self, amount: &BigDecimal) -> BigDecimal {
        amount.round(self.config.money_scale)
    }

    async fn commit(&self, batch: PostingBatch) -> LedgerResult<Transaction> {
        let transaction = self.storage.commit(batch).await?;
        info!(
            transaction_id = %transaction.id,
            branch_id = %transaction.branch_id,
            kind = ?transaction.kind,
            status = ?transaction.status,
            total = %transaction.total_amount,
            "posted transaction"
        );
        Ok(transaction)
    }

    /// Record a manual stock movement valued at the material's average cost
    pub async fn post_stock_mutation(&self, request: StockMutationRequest) -> LedgerResult<String> {
        let material_id = request.material_id.clone();
        self.stock_mutation(request)
            .await
            .inspect_err(|err| warn!(%material_id, error = %err, "stock mutation rejected"))
            .map(|t| t.id)
    }

    async fn stock_mutation(&self, request: StockMutationRequest) -> LedgerResult<Transaction> {
        validate_reference("material_id", &request.material_id)?;
        validate_positive_amount("qty", &request.qty)?;
        validate_description(&request.description)?;

        let branch_id = self
            .storage
            .inventory()
            .await?
            .require(&request.material_id)?
            .branch_id
            .clone();
        let _guard = self.branch_locks.acquire(&branch_id).await;

        let inventory = self.storage.inventory().await?;
        let material = inventory.require(&request.material_id)?;
        let total_value = self.money(&(&request.qty * &material.avg_cost));
        if total_value <= BigDecimal::from(0) {
            return Err(LedgerError::validation(
                "material_id",
                format!(
                    "material '{}' has no average cost to value the mutation",
                    material.id
                ),
            ));
        }

        let accounts = &self.config.accounts;
        let (lines, delta) = match request.direction {
            MutationDirection::In => (
                JournalBuilder::new()
                    .pair(
                        &accounts.inventory,
                        &accounts.cash,
                        &total_value,
                        &format!("Restock: {}", material.name),
                    )
                    .build()?,
                request.qty.clone(),
            ),
            MutationDirection::Out => {
                if request.qty > material.stock {
                    return Err(LedgerError::InsufficientStock {
                        material_id: material.id.clone(),
                        requested: request.qty.clone(),
                        available: material.stock.clone(),
                    });
                }
                let usage = match request.description.trim() {
                    "" => format!("Usage: {}", material.name),
                    reason => format!("Usage: {} ({})", material.name, reason),
                };
                (
                    JournalBuilder::new()
                        .pair(
                            &accounts.cost_of_sales,
                            &accounts.inventory,
                            &total_value,
                            &usage,
                        )
                        .build()?,
                    -request.qty.clone(),
                )
            }
        };

        let description = if request.description.trim().is_empty() {
            format!("Stock mutation: {}", material.name)
        } else {
            request.description.clone()
        };

        self.commit(PostingBatch {
            prefix: "MUT".to_string(),
            branch_id,
            date: request.date,
            description,
            kind: TransactionKind::Adjustment,
            status: TransactionStatus::Posted,
            party_id: None,
            total_amount: total_value,
            lines,
            effects: vec![BookEffect::AdjustStock {
                material_id: material.id.clone(),
                delta,
            }],
        })
        .await
    }

    /// Charge an operating expense paid in cash
    pub async fn post_expense(&self, request: ExpenseRequest) -> LedgerResult<String> {
        let account_code = request.account_code.clone();
        self.expense(request)
            .await
            .inspect_err(|err| warn!(%account_code, error = %err, "expense rejected"))
            .map(|t| t.id)
    }

    async fn expense(&self, request: ExpenseRequest) -> LedgerResult<Transaction> {
        validate_reference("branch_id", &request.branch_id)?;
        validate_positive_amount("amount", &request.amount)?;
        validate_description(&request.description)?;
        let account = self
            .chart
            .require_in(&request.account_code, AccountCategory::OperatingExpense)?;

        let amount = self.money(&request.amount);
        let lines = JournalBuilder::new()
            .pair(&account.code, &self.config.accounts.cash, &amount, &request.description)
            .build()?;

        let _guard = self.branch_locks.acquire(&request.branch_id).await;
        self.commit(PostingBatch {
            prefix: "EXP".to_string(),
            branch_id: request.branch_id,
            date: request.date,
            description: request.description,
            kind: TransactionKind::Expense,
            status: TransactionStatus::Posted,
            party_id: None,
            total_amount: amount,
            lines,
            effects: Vec::new(),
        })
        .await
    }

    /// Record cash put into a branch by the owner
    pub async fn post_capital_contribution(
        &self,
        request: CapitalContributionRequest,
    ) -> LedgerResult<String> {
        self.capital_contribution(request)
            .await
            .inspect_err(|err| warn!(error = %err, "capital contribution rejected"))
            .map(|t| t.id)
    }

    async fn capital_contribution(
        &self,
        request: CapitalContributionRequest,
    ) -> LedgerResult<Transaction> {
        validate_reference("branch_id", &request.branch_id)?;
        validate_positive_amount("amount", &request.amount)?;
        validate_description(&request.description)?;

        let accounts = &self.config.accounts;
        let amount = self.money(&request.amount);
        let lines = JournalBuilder::new()
            .pair(&accounts.cash, &accounts.owner_equity, &amount, &request.description)
            .build()?;

        let _guard = self.branch_locks.acquire(&request.branch_id).await;
        self.commit(PostingBatch {
            prefix: "OP".to_string(),
            branch_id: request.branch_id,
            date: request.date,
            description: request.description,
            kind: TransactionKind::Adjustment,
            status: TransactionStatus::Posted,
            party_id: None,
            total_amount: amount,
            lines,
            effects: Vec::new(),
        })
        .await
    }

    /// Book one month of depreciation for a fixed asset
    pub async fn post_depreciation(&self, asset_id: &str, date: NaiveDate) -> LedgerResult<String> {
        self.depreciation(asset_id, date)
            .await
            .inspect_err(|err| warn!(%asset_id, error = %err, "depreciation rejected"))
            .map(|t| t.id)
    }

    async fn depreciation(&self, asset_id: &str, date: NaiveDate) -> LedgerResult<Transaction> {
        validate_reference("asset_id", asset_id)?;
        let branch_id = self
            .storage
            .get_fixed_asset(asset_id)
            .await?
            .ok_or_else(|| LedgerError::unknown("asset_id", asset_id))?
            .branch_id;
        let _guard = self.branch_locks.acquire(&branch_id).await;

        let asset = self
            .storage
            .get_fixed_asset(asset_id)
            .await?
            .ok_or_else(|| LedgerError::unknown("asset_id", asset_id))?;
        asset.ensure_depreciable_on(date)?;
        let charge = asset.monthly_charge(self.config.money_scale)?;

        let accounts = &self.config.accounts;
        let description = format!("Depreciation: {}", asset.name);
        let lines = JournalBuilder::new()
            .pair(
                &accounts.depreciation_expense,
                &accounts.accumulated_depreciation,
                &charge,
                &description,
            )
            .build()?;

        self.commit(PostingBatch {
            prefix: "DEP".to_string(),
            branch_id,
            date,
            description,
            kind: TransactionKind::Asset,
            status: TransactionStatus::Posted,
            party_id: None,
            total_amount: charge.clone(),
            lines,
            effects: vec![BookEffect::Depreciate {
                asset_id: asset.id,
                amount: charge,
                date,
            }],
        })
        .await
    }

    /// Consistent copy of the chart and journal for reporting
    pub async fn snapshot(&self) -> LedgerResult<LedgerSnapshot> {
        Ok(LedgerSnapshot::new(
            self.chart.clone(),
            self.storage.journal().await?,
        ))
    }

    /// Materials at or below their minimum stock
    pub async fn low_stock_set(&self, filter: &BranchFilter) -> LedgerResult<Vec<InventoryMaterial>> {
        let inventory = self.storage.inventory().await?;
        Ok(inventory.low_stock_set(filter).into_iter().cloned().collect())
    }

    /// Stock on hand valued at average cost
    pub async fn valuation_total(&self, filter: &BranchFilter) -> LedgerResult<BigDecimal> {
        Ok(self.storage.inventory().await?.valuation_total(filter))
    }

    pub async fn transaction(&self, transaction_id: &str) -> LedgerResult<Transaction> {
        self.storage
            .get_transaction(transaction_id)
            .await?
            .ok_or_else(|| LedgerError::TransactionNotFound(transaction_id.to_string()))
    }

    pub async fn transactions(&self, filter: &BranchFilter) -> LedgerResult<Vec<Transaction>> {
        self.storage.list_transactions(filter).await
    }
}
