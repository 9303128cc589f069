//! Per-branch materials inventory valued at average cost

pub mod catalog;
pub mod recipe;

pub use catalog::*;
pub use recipe::*;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::CostingPolicy;
use crate::types::*;

/// A consumable material held by one branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryMaterial {
    pub id: String,
    pub branch_id: String,
    pub name: String,
    /// Unit of measure, e.g. `Liter`, `Kg`
    pub unit: String,
    pub stock: BigDecimal,
    pub min_stock: BigDecimal,
    /// Average unit cost used to value consumption
    pub avg_cost: BigDecimal,
}

impl InventoryMaterial {
    pub fn new(
        id: impl Into<String>,
        branch_id: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            branch_id: branch_id.into(),
            name: name.into(),
            unit: unit.into(),
            stock: BigDecimal::from(0),
            min_stock: BigDecimal::from(0),
            avg_cost: BigDecimal::from(0),
        }
    }

    pub fn with_stock(mut self, stock: BigDecimal, avg_cost: BigDecimal) -> Self {
        self.stock = stock;
        self.avg_cost = avg_cost;
        self
    }

    pub fn with_min_stock(mut self, min_stock: BigDecimal) -> Self {
        self.min_stock = min_stock;
        self
    }

    /// Stock on hand valued at average cost
    pub fn value(&self) -> BigDecimal {
        &self.stock * &self.avg_cost
    }

    pub fn is_low(&self) -> bool {
        self.stock <= self.min_stock
    }
}

/// Average cost after receiving `qty` units at `unit_cost`
pub fn next_average_cost(
    policy: CostingPolicy,
    stock: &BigDecimal,
    avg_cost: &BigDecimal,
    qty: &BigDecimal,
    unit_cost: &BigDecimal,
    scale: i64,
) -> BigDecimal {
    let zero = BigDecimal::from(0);
    match policy {
        CostingPolicy::LastCost => unit_cost.round(scale),
        // Non-positive stock carries no value to blend with.
        CostingPolicy::WeightedAverage if *stock <= zero => unit_cost.round(scale),
        CostingPolicy::WeightedAverage => {
            let total_qty = stock + qty;
            let total_value = stock * avg_cost + qty * unit_cost;
            (total_value / total_qty).round(scale)
        }
    }
}

/// Quantity ledger of materials, keyed by material id.
///
/// The store does not enforce a stock floor; callers that decrease stock
/// check availability first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InventoryStore {
    materials: BTreeMap<String, InventoryMaterial>,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material
    pub fn insert(&mut self, material: InventoryMaterial) -> LedgerResult<()> {
        let zero = BigDecimal::from(0);
        if material.id.trim().is_empty() {
            return Err(LedgerError::validation("id", "material id cannot be empty"));
        }
        if material.branch_id.trim().is_empty() {
            return Err(LedgerError::validation(
                "branch_id",
                format!("material '{}' has no branch", material.id),
            ));
        }
        if material.stock < zero || material.avg_cost < zero || material.min_stock < zero {
            return Err(LedgerError::validation(
                "stock",
                format!("material '{}' has negative stock or cost", material.id),
            ));
        }
        if self.materials.contains_key(&material.id) {
            return Err(LedgerError::validation(
                "id",
                format!("material '{}' already exists", material.id),
            ));
        }
        self.materials.insert(material.id.clone(), material);
        Ok(())
    }

    /// Replace a material record, e.g. when merging staged changes
    pub fn upsert(&mut self, material: InventoryMaterial) {
        self.materials.insert(material.id.clone(), material);
    }

    pub fn get(&self, material_id: &str) -> Option<&InventoryMaterial> {
        self.materials.get(material_id)
    }

    pub fn require(&self, material_id: &str) -> LedgerResult<&InventoryMaterial> {
        self.get(material_id)
            .ok_or_else(|| LedgerError::unknown("material_id", material_id))
    }

    /// `stock += delta`, returning the new stock
    pub fn adjust_stock(&mut self, material_id: &str, delta: &BigDecimal) -> LedgerResult<BigDecimal> {
        let material = self
            .materials
            .get_mut(material_id)
            .ok_or_else(|| LedgerError::unknown("material_id", material_id))?;
        material.stock += delta;
        Ok(material.stock.clone())
    }

    /// Overwrite the average unit cost
    pub fn set_average_cost(&mut self, material_id: &str, cost: &BigDecimal) -> LedgerResult<()> {
        if *cost < BigDecimal::from(0) {
            return Err(LedgerError::validation(
                "avg_cost",
                "average cost cannot be negative",
            ));
        }
        let material = self
            .materials
            .get_mut(material_id)
            .ok_or_else(|| LedgerError::unknown("material_id", material_id))?;
        material.avg_cost = cost.clone();
        Ok(())
    }

    /// Find the record `material_id` stands for inside `branch_id`.
    ///
    /// The same material may exist once per branch under different ids, so a
    /// reference to another branch's record resolves by name.
    pub fn resolve_in_branch(
        &self,
        material_id: &str,
        branch_id: &str,
    ) -> LedgerResult<&InventoryMaterial> {
        let referenced = self.require(material_id)?;
        if referenced.branch_id == branch_id {
            return Ok(referenced);
        }
        self.materials
            .values()
            .find(|m| m.branch_id == branch_id && m.name == referenced.name)
            .ok_or_else(|| {
                LedgerError::validation(
                    "material_id",
                    format!(
                        "material '{}' ({}) is not stocked in branch '{}'",
                        material_id, referenced.name, branch_id
                    ),
                )
            })
    }

    pub fn iter(&self, filter: &BranchFilter) -> impl Iterator<Item = &InventoryMaterial> {
        let filter = filter.clone();
        self.materials
            .values()
            .filter(move |m| filter.matches(&m.branch_id))
    }

    /// Total stock value over the matching materials
    pub fn valuation_total(&self, filter: &BranchFilter) -> BigDecimal {
        self.iter(filter).map(|m| m.value()).sum()
    }

    /// Materials at or below their minimum stock
    pub fn low_stock_set(&self, filter: &BranchFilter) -> Vec<&InventoryMaterial> {
        self.iter(filter).filter(|m| m.is_low()).collect()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn store() -> InventoryStore {
        let mut store = InventoryStore::new();
        store
            .insert(
                InventoryMaterial::new("m1", "b1", "Liquid Detergent", "Liter")
                    .with_stock(dec("50"), dec("25000"))
                    .with_min_stock(dec("10")),
            )
            .unwrap();
        store
            .insert(
                InventoryMaterial::new("m4", "b2", "Liquid Detergent", "Liter")
                    .with_stock(dec("5"), dec("20000"))
                    .with_min_stock(dec("10")),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_adjust_stock_has_no_floor() {
        let mut store = store();
        let stock = store.adjust_stock("m4", &dec("-7")).unwrap();
        assert_eq!(stock, dec("-2"));
    }

    #[test]
    fn test_valuation_and_low_stock() {
        let store = store();
        assert_eq!(store.valuation_total(&BranchFilter::All), dec("1350000"));
        assert_eq!(store.valuation_total(&BranchFilter::branch("b2")), dec("100000"));

        let low: Vec<_> = store
            .low_stock_set(&BranchFilter::All)
            .into_iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(low, vec!["m4"]);
    }

    #[test]
    fn test_resolve_in_branch_by_name() {
        let store = store();
        assert_eq!(store.resolve_in_branch("m1", "b1").unwrap().id, "m1");
        assert_eq!(store.resolve_in_branch("m1", "b2").unwrap().id, "m4");
        assert!(store.resolve_in_branch("m1", "b3").is_err());
    }

    #[test]
    fn test_weighted_average_cost() {
        let avg = next_average_cost(
            CostingPolicy::WeightedAverage,
            &dec("50"),
            &dec("25000"),
            &dec("100"),
            &dec("26000"),
            4,
        );
        assert_eq!(avg, dec("25666.6667"));

        let last = next_average_cost(
            CostingPolicy::LastCost,
            &dec("50"),
            &dec("25000"),
            &dec("100"),
            &dec("26000"),
            4,
        );
        assert_eq!(last, dec("26000"));
    }

    #[test]
    fn test_negative_cost_rejected() {
        let mut store = store();
        assert!(store.set_average_cost("m1", &dec("-1")).is_err());
        assert!(store.set_average_cost("missing", &dec("1")).is_err());
    }
}
