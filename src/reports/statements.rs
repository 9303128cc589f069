//! Financial statement shapes produced by the report engine

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ReportPeriod;
use crate::types::*;

/// Balance of one account inside a statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account: Account,
    pub balance: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitAndLoss {
    pub period: ReportPeriod,
    pub branch: BranchFilter,
    pub revenue: BigDecimal,
    pub cost_of_sales: BigDecimal,
    pub gross_profit: BigDecimal,
    pub operating_expense: BigDecimal,
    pub net_income: BigDecimal,
    /// Revenue, cost of sales and operating expense accounts
    pub accounts: Vec<AccountBalance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub as_of_date: NaiveDate,
    pub branch: BranchFilter,
    pub current_assets: BigDecimal,
    pub fixed_assets: BigDecimal,
    pub total_assets: BigDecimal,
    pub liabilities: BigDecimal,
    pub equity: BigDecimal,
    pub total_liabilities_equity: BigDecimal,
    /// Residual that stands in for profit not yet closed into equity
    pub retained_earnings_plug: BigDecimal,
    pub accounts: Vec<AccountBalance>,
}

impl BalanceSheet {
    pub fn is_balanced(&self) -> bool {
        self.total_assets == &self.total_liabilities_equity + &self.retained_earnings_plug
    }
}

/// Simplified direct-method cash flow.
///
/// Unpaid sales still count as cash in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub period: ReportPeriod,
    pub branch: BranchFilter,
    pub cash_in: BigDecimal,
    pub cash_out: BigDecimal,
    pub net_cash_flow: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchPerformance {
    pub branch_id: String,
    pub revenue: BigDecimal,
    /// Cost of sales plus operating expense
    pub expenses: BigDecimal,
    pub net: BigDecimal,
}
