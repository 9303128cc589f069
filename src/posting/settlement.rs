use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

use super::TransactionPoster;
use crate::ledger::JournalBuilder;
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::*;

/// Collection against an unpaid sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivableSettlement {
    pub transaction_id: String,
    pub date: NaiveDate,
    pub amount: BigDecimal,
}

/// Payment of part of a supplier's payable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayableSettlement {
    pub supplier_id: String,
    pub branch_id: String,
    pub date: NaiveDate,
    pub amount: BigDecimal,
}

impl<S: BookStorage> TransactionPoster<S> {
    /// Collect cash against a draft sale.
    ///
    /// Partial collections are allowed. The sale flips to posted once its
    /// outstanding amount reaches zero.
    pub async fn settle_receivable(&self, request: ReceivableSettlement) -> LedgerResult<String> {
        let transaction_id = request.transaction_id.clone();
        self.receivable_settlement(request)
            .await
            .inspect_err(|err| warn!(%transaction_id, error = %err, "collection rejected"))
            .map(|t| t.id)
    }

    async fn receivable_settlement(&self, request: ReceivableSettlement) -> LedgerResult<Transaction> {
        validate_reference("transaction_id", &request.transaction_id)?;
        validate_positive_amount("amount", &request.amount)?;
        let amount = self.money(&request.amount);

        let branch_id = self.transaction(&request.transaction_id).await?.branch_id;
        let _guard = self.branch_locks.acquire(&branch_id).await;

        let sale = self.transaction(&request.transaction_id).await?;
        if sale.kind != TransactionKind::Sales || sale.status != TransactionStatus::Draft {
            return Err(LedgerError::validation(
                "transaction_id",
                format!("'{}' is not an open sale", sale.id),
            ));
        }
        if amount > sale.outstanding {
            return Err(LedgerError::validation(
                "amount",
                format!("'{}' has {} outstanding", sale.id, sale.outstanding),
            ));
        }
        let customer_id = sale.party_id.clone().ok_or_else(|| {
            LedgerError::validation("transaction_id", format!("'{}' has no customer", sale.id))
        })?;

        let accounts = &self.config.accounts;
        let description = format!("Collection for {}", sale.id);
        let lines = JournalBuilder::new()
            .pair(&accounts.cash, &accounts.receivable, &amount, &description)
            .build()?;

        self.commit(PostingBatch {
            prefix: "RCV".to_string(),
            branch_id,
            date: request.date,
            description,
            kind: TransactionKind::Sales,
            status: TransactionStatus::Posted,
            party_id: Some(customer_id.clone()),
            total_amount: amount.clone(),
            lines,
            effects: vec![
                BookEffect::AdjustReceivable {
                    customer_id,
                    delta: -amount.clone(),
                },
                BookEffect::SettleDocument {
                    transaction_id: sale.id,
                    amount,
                },
            ],
        })
        .await
    }

    /// Pay a supplier out of a branch's cash.
    ///
    /// A branch can only pay down what it owes the supplier through its own
    /// purchases and payments.
    pub async fn settle_payable(&self, request: PayableSettlement) -> LedgerResult<String> {
        let supplier_id = request.supplier_id.clone();
        self.payable_settlement(request)
            .await
            .inspect_err(|err| warn!(%supplier_id, error = %err, "supplier payment rejected"))
            .map(|t| t.id)
    }

    async fn payable_settlement(&self, request: PayableSettlement) -> LedgerResult<Transaction> {
        validate_reference("supplier_id", &request.supplier_id)?;
        validate_reference("branch_id", &request.branch_id)?;
        validate_positive_amount("amount", &request.amount)?;
        let amount = self.money(&request.amount);

        let _guard = self.branch_locks.acquire(&request.branch_id).await;

        let supplier = self
            .storage
            .get_supplier(&request.supplier_id)
            .await?
            .ok_or_else(|| LedgerError::unknown("supplier_id", &request.supplier_id))?;

        let accounts = &self.config.accounts;
        let owed = self.branch_payable(&supplier.id, &request.branch_id).await?;
        if amount > owed {
            return Err(LedgerError::validation(
                "amount",
                format!(
                    "branch '{}' owes {} to '{}'",
                    request.branch_id, owed, supplier.id
                ),
            ));
        }

        let description = format!("Payment to {}", supplier.name);
        let lines = JournalBuilder::new()
            .pair(&accounts.payable, &accounts.cash, &amount, &description)
            .build()?;

        self.commit(PostingBatch {
            prefix: "PAY".to_string(),
            branch_id: request.branch_id,
            date: request.date,
            description,
            kind: TransactionKind::Purchase,
            status: TransactionStatus::Posted,
            party_id: Some(supplier.id.clone()),
            total_amount: amount.clone(),
            lines,
            effects: vec![BookEffect::AdjustPayable {
                supplier_id: supplier.id,
                delta: -amount,
            }],
        })
        .await
    }

    /// Payable balance one branch carries for one supplier
    async fn branch_payable(&self, supplier_id: &str, branch_id: &str) -> LedgerResult<BigDecimal> {
        let documents: HashSet<String> = self
            .storage
            .list_transactions(&BranchFilter::branch(branch_id))
            .await?
            .into_iter()
            .filter(|t| t.party_id.as_deref() == Some(supplier_id))
            .map(|t| t.id)
            .collect();
        let journal = self.storage.journal().await?;
        Ok(journal
            .postings()
            .iter()
            .filter(|p| {
                p.account_code == self.config.accounts.payable
                    && documents.contains(&p.transaction_id)
            })
            .map(|p| p.signed_amount(EntryType::Credit))
            .sum())
    }
}
