//! Chart of accounts registry

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::*;

/// Static mapping of account code to account, loaded once
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartOfAccounts {
    accounts: BTreeMap<String, Account>,
}

impl ChartOfAccounts {
    /// Build a chart from a list of accounts, rejecting duplicate or empty codes
    pub fn new(accounts: Vec<Account>) -> LedgerResult<Self> {
        let mut chart = Self::default();
        for account in accounts {
            if account.code.trim().is_empty() {
                return Err(LedgerError::validation("code", "account code cannot be empty"));
            }
            if account.name.trim().is_empty() {
                return Err(LedgerError::validation(
                    "name",
                    format!("account '{}' has an empty name", account.code),
                ));
            }
            if chart.accounts.contains_key(&account.code) {
                return Err(LedgerError::validation(
                    "code",
                    format!("account '{}' is defined twice", account.code),
                ));
            }
            chart.accounts.insert(account.code.clone(), account);
        }
        Ok(chart)
    }

    pub fn get(&self, code: &str) -> Option<&Account> {
        self.accounts.get(code)
    }

    /// Get an account, returning a validation error if the code is unknown
    pub fn require(&self, code: &str) -> LedgerResult<&Account> {
        self.get(code)
            .ok_or_else(|| LedgerError::unknown("account_code", code))
    }

    /// Get an account and check it belongs to `category`
    pub fn require_in(&self, code: &str, category: AccountCategory) -> LedgerResult<&Account> {
        let account = self.require(code)?;
        if account.category != category {
            return Err(LedgerError::validation(
                "account_code",
                format!(
                    "account '{}' is {:?}, expected {:?}",
                    code, account.category, category
                ),
            ));
        }
        Ok(account)
    }

    pub fn category_of(&self, code: &str) -> Option<AccountCategory> {
        self.get(code).map(|a| a.category)
    }

    /// Accounts of one category, ordered by code
    pub fn accounts_in(&self, category: AccountCategory) -> impl Iterator<Item = &Account> {
        self.accounts.values().filter(move |a| a.category == category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// The chart used by every branch of the laundry chain
    pub fn laundry_standard() -> Self {
        use AccountCategory::*;

        let accounts = [
            ("1-100", "Cash & Bank", AssetCurrent),
            ("1-200", "Accounts Receivable", AssetCurrent),
            ("1-300", "Materials Inventory", AssetCurrent),
            ("1-400", "Prepaid Rent", AssetCurrent),
            ("1-500", "Fixed Assets - Equipment", AssetFixed),
            ("1-510", "Accumulated Depreciation - Equipment", AssetFixed),
            ("2-100", "Accounts Payable", Liability),
            ("3-100", "Owner's Capital", Equity),
            ("3-200", "Retained Earnings", Equity),
            ("4-100", "Laundry Service Revenue", Revenue),
            ("5-100", "Cost of Services", CostOfSales),
            ("6-100", "Salaries Expense", OperatingExpense),
            ("6-200", "Rent Expense", OperatingExpense),
            ("6-300", "Electricity & Water Expense", OperatingExpense),
            ("6-400", "Depreciation Expense", OperatingExpense),
            ("6-900", "Other Expenses", OperatingExpense),
        ];

        Self {
            accounts: accounts
                .into_iter()
                .map(|(code, name, category)| (code.to_string(), Account::new(code, name, category)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_chart() {
        let chart = ChartOfAccounts::laundry_standard();
        assert_eq!(chart.len(), 16);
        assert_eq!(chart.category_of("4-100"), Some(AccountCategory::Revenue));
        assert_eq!(chart.accounts_in(AccountCategory::OperatingExpense).count(), 5);
        assert!(chart.require("9-999").is_err());
    }

    #[test]
    fn test_require_in_checks_category() {
        let chart = ChartOfAccounts::laundry_standard();
        assert!(chart.require_in("6-300", AccountCategory::OperatingExpense).is_ok());
        let err = chart
            .require_in("1-100", AccountCategory::OperatingExpense)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation { .. }));
    }

    #[test]
    fn test_duplicate_codes_rejected() {
        let result = ChartOfAccounts::new(vec![
            Account::new("1-100", "Cash", AccountCategory::AssetCurrent),
            Account::new("1-100", "Bank", AccountCategory::AssetCurrent),
        ]);
        assert!(result.is_err());
    }
}
