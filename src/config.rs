//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ledger::ChartOfAccounts;
use crate::types::*;

/// How a purchase updates a material's average cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostingPolicy {
    /// `(old_stock * old_avg + qty * unit_cost) / (old_stock + qty)`
    #[default]
    WeightedAverage,
    /// Overwrite the average with the latest unit cost
    LastCost,
}

/// Account codes the poster books against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostingAccounts {
    pub cash: String,
    pub receivable: String,
    pub inventory: String,
    pub payable: String,
    pub revenue: String,
    pub cost_of_sales: String,
    pub owner_equity: String,
    pub depreciation_expense: String,
    pub accumulated_depreciation: String,
}

impl Default for PostingAccounts {
    fn default() -> Self {
        Self {
            cash: "1-100".to_string(),
            receivable: "1-200".to_string(),
            inventory: "1-300".to_string(),
            payable: "2-100".to_string(),
            revenue: "4-100".to_string(),
            cost_of_sales: "5-100".to_string(),
            owner_equity: "3-100".to_string(),
            depreciation_expense: "6-400".to_string(),
            accumulated_depreciation: "1-510".to_string(),
        }
    }
}

impl PostingAccounts {
    /// Check every configured code exists in the chart with the expected category
    pub fn validate(&self, chart: &ChartOfAccounts) -> LedgerResult<()> {
        use AccountCategory::*;

        let expected = [
            ("cash", &self.cash, AssetCurrent),
            ("receivable", &self.receivable, AssetCurrent),
            ("inventory", &self.inventory, AssetCurrent),
            ("payable", &self.payable, Liability),
            ("revenue", &self.revenue, Revenue),
            ("cost_of_sales", &self.cost_of_sales, CostOfSales),
            ("owner_equity", &self.owner_equity, Equity),
            ("depreciation_expense", &self.depreciation_expense, OperatingExpense),
            ("accumulated_depreciation", &self.accumulated_depreciation, AssetFixed),
        ];

        for (role, code, category) in expected {
            match chart.category_of(code) {
                Some(found) if found == category => {}
                Some(found) => {
                    return Err(LedgerError::Config(format!(
                        "{role} account '{code}' is {found:?}, expected {category:?}"
                    )))
                }
                None => {
                    return Err(LedgerError::Config(format!(
                        "{role} account '{code}' is not in the chart of accounts"
                    )))
                }
            }
        }
        Ok(())
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub costing: CostingPolicy,
    /// Decimal places kept on posted money amounts
    pub money_scale: i64,
    /// Decimal places kept on average unit costs
    pub cost_scale: i64,
    pub accounts: PostingAccounts,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            costing: CostingPolicy::WeightedAverage,
            money_scale: 2,
            cost_scale: 4,
            accounts: PostingAccounts::default(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from `LAUNDRY__*` environment variables
    pub fn from_env() -> LedgerResult<Self> {
        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("LAUNDRY")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Loads configuration from a file (format picked from the extension),
    /// with `LAUNDRY__*` environment variables layered on top
    pub fn from_file(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("LAUNDRY")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    pub fn with_costing(mut self, costing: CostingPolicy) -> Self {
        self.costing = costing;
        self
    }

    pub fn validate(&self, chart: &ChartOfAccounts) -> LedgerResult<()> {
        if !(0..=8).contains(&self.money_scale) {
            return Err(LedgerError::Config(format!(
                "money_scale must be between 0 and 8, got {}",
                self.money_scale
            )));
        }
        if self.cost_scale < self.money_scale {
            return Err(LedgerError::Config(
                "cost_scale must not be smaller than money_scale".to_string(),
            ));
        }
        self.accounts.validate(chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_standard_chart() {
        let chart = ChartOfAccounts::laundry_standard();
        EngineConfig::default().validate(&chart).unwrap();
    }

    #[test]
    fn test_wrong_category_rejected() {
        let chart = ChartOfAccounts::laundry_standard();
        let mut config = EngineConfig::default();
        config.accounts.cash = "4-100".to_string();
        assert!(matches!(config.validate(&chart), Err(LedgerError::Config(_))));
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"costing": "last_cost", "accounts": {"cash": "1-101"}}"#)
                .unwrap();
        assert_eq!(config.costing, CostingPolicy::LastCost);
        assert_eq!(config.money_scale, 2);
        assert_eq!(config.accounts.cash, "1-101");
        assert_eq!(config.accounts.inventory, "1-300");
    }

    #[test]
    fn test_env_and_file_layered_over_defaults() {
        let path = std::env::temp_dir().join(format!("laundry-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "cost_scale = 6\n").unwrap();
        std::env::set_var("LAUNDRY__COSTING", "last_cost");
        std::env::set_var("LAUNDRY__MONEY_SCALE", "3");
        std::env::set_var("LAUNDRY__ACCOUNTS__CASH", "1-101");

        let from_env = EngineConfig::from_env();
        let from_file = EngineConfig::from_file(&path);
        std::env::set_var("LAUNDRY__ACCOUNTS__CASH", "4-100");
        let misfiled = EngineConfig::from_env();

        for key in ["LAUNDRY__COSTING", "LAUNDRY__MONEY_SCALE", "LAUNDRY__ACCOUNTS__CASH"] {
            std::env::remove_var(key);
        }
        std::fs::remove_file(&path).unwrap();

        let config = from_env.unwrap();
        assert_eq!(config.costing, CostingPolicy::LastCost);
        assert_eq!(config.money_scale, 3);
        assert_eq!(config.cost_scale, 4);
        assert_eq!(config.accounts.cash, "1-101");
        assert_eq!(config.accounts.inventory, "1-300");

        let config = from_file.unwrap();
        assert_eq!(config.cost_scale, 6);
        assert_eq!(config.money_scale, 3);
        assert_eq!(config.accounts.cash, "1-101");

        let chart = ChartOfAccounts::laundry_standard();
        assert!(matches!(
            misfiled.unwrap().validate(&chart),
            Err(LedgerError::Config(_))
        ));
    }
}
