use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::TransactionPoster;
use crate::inventory::ConsumptionPlan;
use crate::ledger::{patterns, JournalBuilder};
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    pub service_id: String,
    /// Kilograms for weight-based services, pieces otherwise
    pub qty: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRequest {
    pub customer_id: String,
    pub branch_id: String,
    pub date: NaiveDate,
    pub payment_mode: PaymentMode,
    pub lines: Vec<SaleLine>,
}

impl<S: BookStorage> TransactionPoster<S> {
    /// Post a laundry sale and the materials its services consume.
    ///
    /// Revenue goes to cash when paid and to the customer's receivable
    /// otherwise; an unpaid sale stays in draft until it is collected.
    /// Returns the new document number.
    pub async fn post_sale(&self, request: SaleRequest) -> LedgerResult<String> {
        let customer_id = request.customer_id.clone();
        self.sale(request)
            .await
            .inspect_err(|err| warn!(%customer_id, error = %err, "sale rejected"))
            .map(|t| t.id)
    }

    async fn sale(&self, request: SaleRequest) -> LedgerResult<Transaction> {
        validate_reference("customer_id", &request.customer_id)?;
        validate_reference("branch_id", &request.branch_id)?;
        validate_lines_present(&request.lines)?;
        for line in &request.lines {
            validate_reference("service_id", &line.service_id)?;
            validate_positive_amount("qty", &line.qty)?;
        }

        let _guard = self.branch_locks.acquire(&request.branch_id).await;

        let customer = self
            .storage
            .get_customer(&request.customer_id)
            .await?
            .ok_or_else(|| LedgerError::unknown("customer_id", &request.customer_id))?;

        let mut services = Vec::with_capacity(request.lines.len());
        for line in &request.lines {
            let service = self
                .storage
                .get_service(&line.service_id)
                .await?
                .ok_or_else(|| LedgerError::unknown("service_id", &line.service_id))?;
            services.push(service);
        }

        let gross: BigDecimal = services
            .iter()
            .zip(&request.lines)
            .map(|(service, line)| &service.price * &line.qty)
            .sum();
        let grand_total = self.money(&gross);
        validate_positive_amount("total", &grand_total)?;

        let inventory = self.storage.inventory().await?;
        let plan = ConsumptionPlan::explode(
            &inventory,
            &request.branch_id,
            services.iter().zip(request.lines.iter().map(|l| &l.qty)),
        )?;
        plan.ensure_available()?;
        let cogs = self.money(&plan.total_cost());
        debug!(
            branch_id = %request.branch_id,
            revenue = %grand_total,
            cogs = %cogs,
            "priced sale"
        );

        let accounts = &self.config.accounts;
        let lines = patterns::consumption(
            accounts,
            &cogs,
            "Materials used",
            patterns::sale_revenue(accounts, request.payment_mode, &grand_total, JournalBuilder::new()),
        )
        .build()?;

        let mut effects: Vec<BookEffect> = plan
            .items()
            .iter()
            .map(|c| BookEffect::AdjustStock {
                material_id: c.material_id.clone(),
                delta: -c.quantity.clone(),
            })
            .collect();

        let status = match request.payment_mode {
            PaymentMode::Paid => TransactionStatus::Posted,
            PaymentMode::Unpaid => {
                effects.push(BookEffect::AdjustReceivable {
                    customer_id: customer.id.clone(),
                    delta: grand_total.clone(),
                });
                TransactionStatus::Draft
            }
        };

        self.commit(PostingBatch {
            prefix: "INV".to_string(),
            branch_id: request.branch_id,
            date: request.date,
            description: format!("Laundry service - {} item(s)", request.lines.len()),
            kind: TransactionKind::Sales,
            status,
            party_id: Some(customer.id),
            total_amount: grand_total,
            lines,
            effects,
        })
        .await
    }
}
