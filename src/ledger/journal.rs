//! Append-only journal and the builder that produces balanced posting lines

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::types::*;

/// A posting line before it is stamped with its document number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingLine {
    pub account_code: String,
    pub debit: BigDecimal,
    pub credit: BigDecimal,
    pub description: String,
}

/// Sum the debit and credit sides of a set of lines
pub fn line_totals<'a>(lines: impl IntoIterator<Item = &'a PostingLine>) -> (BigDecimal, BigDecimal) {
    lines.into_iter().fold(
        (BigDecimal::from(0), BigDecimal::from(0)),
        |(debits, credits), line| (debits + &line.debit, credits + &line.credit),
    )
}

/// Builder for the lines of one document.
///
/// Lines are added as debit/credit pairs of the same amount, so a built set
/// is always balanced.
#[derive(Debug, Default)]
pub struct JournalBuilder {
    lines: Vec<PostingLine>,
}

impl JournalBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a debit line and a credit line for the same amount
    pub fn pair(
        mut self,
        debit_account: &str,
        credit_account: &str,
        amount: &BigDecimal,
        description: &str,
    ) -> Self {
        self.lines.push(PostingLine {
            account_code: debit_account.to_string(),
            debit: amount.clone(),
            credit: BigDecimal::from(0),
            description: description.to_string(),
        });
        self.lines.push(PostingLine {
            account_code: credit_account.to_string(),
            debit: BigDecimal::from(0),
            credit: amount.clone(),
            description: description.to_string(),
        });
        self
    }

    /// Add a pair only when the amount is positive
    pub fn pair_if_positive(
        self,
        debit_account: &str,
        credit_account: &str,
        amount: &BigDecimal,
        description: &str,
    ) -> Self {
        if *amount > BigDecimal::from(0) {
            self.pair(debit_account, credit_account, amount, description)
        } else {
            self
        }
    }

    /// Finish the document, checking the double-entry rules
    pub fn build(self) -> LedgerResult<Vec<PostingLine>> {
        validate_lines("<unassigned>", &self.lines)?;
        Ok(self.lines)
    }
}

/// Check that a document's lines are well formed and balanced
pub fn validate_lines(transaction_id: &str, lines: &[PostingLine]) -> LedgerResult<()> {
    if lines.len() < 2 {
        return Err(LedgerError::validation(
            "postings",
            "a transaction needs at least two posting lines",
        ));
    }

    let zero = BigDecimal::from(0);
    for line in lines {
        if line.debit < zero || line.credit < zero {
            return Err(LedgerError::validation(
                "postings",
                format!("negative amount on account '{}'", line.account_code),
            ));
        }
    }

    let (debits, credits) = line_totals(lines);
    if debits != credits {
        tracing::error!(%transaction_id, %debits, %credits, "imbalanced posting");
        return Err(LedgerError::ImbalancedPosting {
            transaction_id: transaction_id.to_string(),
            debits,
            credits,
        });
    }
    if debits == zero {
        return Err(LedgerError::validation(
            "postings",
            "a transaction must move a positive amount",
        ));
    }

    Ok(())
}

/// The ledger: an append-only collection of journal postings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Journal {
    postings: Vec<JournalPosting>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp the lines of one document and append them.
    ///
    /// Nothing is appended if the lines are not balanced.
    pub fn append(
        &mut self,
        transaction_id: &str,
        date: NaiveDate,
        branch_id: &str,
        lines: Vec<PostingLine>,
    ) -> LedgerResult<()> {
        validate_lines(transaction_id, &lines)?;

        self.postings.extend(lines.into_iter().map(|line| JournalPosting {
            id: Uuid::new_v4(),
            transaction_id: transaction_id.to_string(),
            date,
            branch_id: branch_id.to_string(),
            account_code: line.account_code,
            debit: line.debit,
            credit: line.credit,
            description: line.description,
        }));
        Ok(())
    }

    pub fn postings(&self) -> &[JournalPosting] {
        &self.postings
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Postings of one document, in append order
    pub fn postings_for<'a>(
        &'a self,
        transaction_id: &'a str,
    ) -> impl Iterator<Item = &'a JournalPosting> + 'a {
        self.postings
            .iter()
            .filter(move |p| p.transaction_id == transaction_id)
    }

    /// Documents whose debits and credits differ. Empty for a healthy ledger.
    pub fn unbalanced_transactions(&self) -> Vec<String> {
        let mut sums: BTreeMap<&str, BigDecimal> = BTreeMap::new();
        for posting in &self.postings {
            *sums
                .entry(posting.transaction_id.as_str())
                .or_insert_with(|| BigDecimal::from(0)) += &posting.debit - &posting.credit;
        }
        sums.into_iter()
            .filter(|(_, diff)| *diff != BigDecimal::from(0))
            .map(|(id, _)| id.to_string())
            .collect()
    }
}

/// Common posting patterns shared by the poster
pub mod patterns {
    use super::*;
    use crate::config::PostingAccounts;

    /// Revenue recognised against cash or a receivable
    pub fn sale_revenue(
        accounts: &PostingAccounts,
        mode: PaymentMode,
        amount: &BigDecimal,
        builder: JournalBuilder,
    ) -> JournalBuilder {
        let debit = match mode {
            PaymentMode::Paid => &accounts.cash,
            PaymentMode::Unpaid => &accounts.receivable,
        };
        builder.pair(debit, &accounts.revenue, amount, "Service revenue")
    }

    /// Materials moved out of inventory into cost of sales
    pub fn consumption(
        accounts: &PostingAccounts,
        amount: &BigDecimal,
        description: &str,
        builder: JournalBuilder,
    ) -> JournalBuilder {
        builder.pair_if_positive(&accounts.cost_of_sales, &accounts.inventory, amount, description)
    }

    /// Materials received into inventory against cash or a payable
    pub fn stock_receipt(
        accounts: &PostingAccounts,
        mode: PaymentMode,
        amount: &BigDecimal,
        description: &str,
    ) -> JournalBuilder {
        let credit = match mode {
            PaymentMode::Paid => &accounts.cash,
            PaymentMode::Unpaid => &accounts.payable,
        };
        JournalBuilder::new().pair(&accounts.inventory, credit, amount, description)
    }
}
