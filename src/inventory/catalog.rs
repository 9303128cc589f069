//! Sellable services and their bills of materials

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::*;

/// How a service is measured at the counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceCategory {
    /// Priced per kilogram
    WeightBased,
    /// Priced per piece
    UnitBased,
}

/// Material consumed per sold unit (kg or piece)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeComponent {
    pub material_id: String,
    pub quantity_per_unit: BigDecimal,
}

impl RecipeComponent {
    pub fn new(material_id: impl Into<String>, quantity_per_unit: BigDecimal) -> Self {
        Self {
            material_id: material_id.into(),
            quantity_per_unit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceProduct {
    pub id: String,
    pub name: String,
    pub price: BigDecimal,
    pub category: ServiceCategory,
    pub recipe: Vec<RecipeComponent>,
}

impl ServiceProduct {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: BigDecimal,
        category: ServiceCategory,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            category,
            recipe: Vec::new(),
        }
    }

    pub fn with_component(mut self, material_id: impl Into<String>, quantity: BigDecimal) -> Self {
        self.recipe.push(RecipeComponent::new(material_id, quantity));
        self
    }

    pub fn validate(&self) -> LedgerResult<()> {
        let zero = BigDecimal::from(0);
        if self.id.trim().is_empty() {
            return Err(LedgerError::validation("id", "service id cannot be empty"));
        }
        if self.price < zero {
            return Err(LedgerError::validation(
                "price",
                format!("service '{}' has a negative price", self.id),
            ));
        }
        if let Some(component) = self.recipe.iter().find(|c| c.quantity_per_unit <= zero) {
            return Err(LedgerError::validation(
                "recipe",
                format!(
                    "service '{}' consumes a non-positive quantity of '{}'",
                    self.id, component.material_id
                ),
            ));
        }
        Ok(())
    }
}

/// Service/product catalog
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Catalog {
    services: BTreeMap<String, ServiceProduct>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, service: ServiceProduct) -> LedgerResult<()> {
        service.validate()?;
        if self.services.contains_key(&service.id) {
            return Err(LedgerError::validation(
                "id",
                format!("service '{}' already exists", service.id),
            ));
        }
        self.services.insert(service.id.clone(), service);
        Ok(())
    }

    pub fn get(&self, service_id: &str) -> Option<&ServiceProduct> {
        self.services.get(service_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceProduct> {
        self.services.values()
    }
}
