use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::TransactionPoster;
use crate::inventory::next_average_cost;
use crate::ledger::patterns;
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub material_id: String,
    pub qty: BigDecimal,
    /// Defaults to the material's current average cost
    pub unit_cost: Option<BigDecimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub supplier_id: String,
    pub branch_id: String,
    pub date: NaiveDate,
    pub payment_mode: PaymentMode,
    pub lines: Vec<PurchaseLine>,
}

impl<S: BookStorage> TransactionPoster<S> {
    /// Receive materials from a supplier into a branch's inventory.
    ///
    /// Average costs are recomputed per line under the configured costing
    /// policy. Purchases are always posted; an unpaid purchase raises the
    /// supplier's payable instead of spending cash.
    pub async fn post_purchase(&self, request: PurchaseRequest) -> LedgerResult<String> {
        let supplier_id = request.supplier_id.clone();
        self.purchase(request)
            .await
            .inspect_err(|err| warn!(%supplier_id, error = %err, "purchase rejected"))
            .map(|t| t.id)
    }

    async fn purchase(&self, request: PurchaseRequest) -> LedgerResult<Transaction> {
        validate_reference("supplier_id", &request.supplier_id)?;
        validate_reference("branch_id", &request.branch_id)?;
        validate_lines_present(&request.lines)?;
        for line in &request.lines {
            validate_reference("material_id", &line.material_id)?;
            validate_positive_amount("qty", &line.qty)?;
            if let Some(unit_cost) = &line.unit_cost {
                if *unit_cost < BigDecimal::from(0) {
                    return Err(LedgerError::validation(
                        "unit_cost",
                        format!("cannot be negative, got {unit_cost}"),
                    ));
                }
            }
        }

        let _guard = self.branch_locks.acquire(&request.branch_id).await;

        let supplier = self
            .storage
            .get_supplier(&request.supplier_id)
            .await?
            .ok_or_else(|| LedgerError::unknown("supplier_id", &request.supplier_id))?;
        let inventory = self.storage.inventory().await?;

        // (stock, average cost) as each line is received
        let mut running: BTreeMap<String, (BigDecimal, BigDecimal)> = BTreeMap::new();
        let mut effects = Vec::new();
        let mut gross = BigDecimal::from(0);

        for line in &request.lines {
            let material = inventory.require(&line.material_id)?;
            if material.branch_id != request.branch_id {
                return Err(LedgerError::validation(
                    "material_id",
                    format!(
                        "material '{}' belongs to branch '{}'",
                        material.id, material.branch_id
                    ),
                ));
            }

            let (stock, avg_cost) = running
                .entry(material.id.clone())
                .or_insert_with(|| (material.stock.clone(), material.avg_cost.clone()));
            let unit_cost = line.unit_cost.clone().unwrap_or_else(|| avg_cost.clone());
            let next_avg = next_average_cost(
                self.config.costing,
                stock,
                avg_cost,
                &line.qty,
                &unit_cost,
                self.config.cost_scale,
            );
            *stock += &line.qty;
            *avg_cost = next_avg;

            gross += &line.qty * &unit_cost;
            effects.push(BookEffect::AdjustStock {
                material_id: material.id.clone(),
                delta: line.qty.clone(),
            });
        }

        for (material_id, (stock, avg_cost)) in running {
            debug!(%material_id, %stock, %avg_cost, "received material");
            effects.push(BookEffect::SetAverageCost {
                material_id,
                cost: avg_cost,
            });
        }

        let grand_total = self.money(&gross);
        validate_positive_amount("total", &grand_total)?;

        let description = format!("Purchase from {}", supplier.name);
        let lines = patterns::stock_receipt(
            &self.config.accounts,
            request.payment_mode,
            &grand_total,
            &description,
        )
        .build()?;

        if request.payment_mode == PaymentMode::Unpaid {
            effects.push(BookEffect::AdjustPayable {
                supplier_id: supplier.id.clone(),
                delta: grand_total.clone(),
            });
        }

        self.commit(PostingBatch {
            prefix: "PO".to_string(),
            branch_id: request.branch_id,
            date: request.date,
            description,
            kind: TransactionKind::Purchase,
            status: TransactionStatus::Posted,
            party_id: Some(supplier.id),
            total_amount: grand_total,
            lines,
            effects,
        })
        .await
    }
}
