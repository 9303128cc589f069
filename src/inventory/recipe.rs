//! Recipe explosion: turning sold services into material consumption

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{InventoryStore, ServiceProduct};
use crate::types::*;

/// Total consumption of one material by a sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consumption {
    /// Branch-local material record that is drawn down
    pub material_id: String,
    pub material_name: String,
    pub quantity: BigDecimal,
    /// Average cost read once, before any stock is moved
    pub unit_cost: BigDecimal,
    pub available: BigDecimal,
}

impl Consumption {
    pub fn cost(&self) -> BigDecimal {
        &self.quantity * &self.unit_cost
    }
}

/// Consumption deltas for a whole sale, computed before anything is applied
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConsumptionPlan {
    items: Vec<Consumption>,
}

impl ConsumptionPlan {
    /// Explode every line's recipe against the branch inventory.
    ///
    /// Components are visited in line order, then recipe order. Repeated
    /// materials are merged so availability is checked on the combined need.
    pub fn explode<'a>(
        inventory: &InventoryStore,
        branch_id: &str,
        lines: impl IntoIterator<Item = (&'a ServiceProduct, &'a BigDecimal)>,
    ) -> LedgerResult<Self> {
        let mut items: Vec<Consumption> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (service, qty) in lines {
            for component in &service.recipe {
                let material = inventory.resolve_in_branch(&component.material_id, branch_id)?;
                let consumed = &component.quantity_per_unit * qty;

                match index.get(&material.id) {
                    Some(&pos) => items[pos].quantity += consumed,
                    None => {
                        index.insert(material.id.clone(), items.len());
                        items.push(Consumption {
                            material_id: material.id.clone(),
                            material_name: material.name.clone(),
                            quantity: consumed,
                            unit_cost: material.avg_cost.clone(),
                            available: material.stock.clone(),
                        });
                    }
                }
            }
        }

        tracing::debug!(%branch_id, materials = items.len(), "exploded sale recipes");
        Ok(Self { items })
    }

    /// Reject the plan if any material would go below zero
    pub fn ensure_available(&self) -> LedgerResult<()> {
        match self.items.iter().find(|c| c.quantity > c.available) {
            Some(short) => Err(LedgerError::InsufficientStock {
                material_id: short.material_id.clone(),
                requested: short.quantity.clone(),
                available: short.available.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Unrounded cost of everything consumed
    pub fn total_cost(&self) -> BigDecimal {
        self.items.iter().map(|c| c.cost()).sum()
    }

    pub fn items(&self) -> &[Consumption] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
