//! Read-side reporting over a point-in-time ledger snapshot.
//!
//! Balances are signed per account category. Inside a period revenue is read
//! credit-positive and everything else debit-positive; up to a cutoff,
//! liabilities, equity and revenue are read credit-positive instead.

mod statements;

pub use statements::*;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::{ChartOfAccounts, Journal};
use crate::types::*;

/// A reporting month or year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportPeriod {
    year: i32,
    month: Option<u32>,
    start: NaiveDate,
    end: NaiveDate,
    opening: NaiveDate,
}

impl ReportPeriod {
    /// Calendar month `month` (1-based) of `year`
    pub fn monthly(year: i32, month: u32) -> LedgerResult<Self> {
        let invalid = || LedgerError::validation("month", format!("{year}-{month} is not a calendar month"));
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let end = next.and_then(|d| d.pred_opt()).ok_or_else(invalid)?;
        Self::spanning(year, Some(month), start, end)
    }

    pub fn yearly(year: i32) -> LedgerResult<Self> {
        let invalid = || LedgerError::validation("year", format!("{year} is out of range"));
        let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
        Self::spanning(year, None, start, end)
    }

    fn spanning(year: i32, month: Option<u32>, start: NaiveDate, end: NaiveDate) -> LedgerResult<Self> {
        let opening = start
            .pred_opt()
            .ok_or_else(|| LedgerError::validation("year", format!("{year} is out of range")))?;
        Ok(Self {
            year,
            month,
            start,
            end,
            opening,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Balance-sheet date for the period: its last day
    pub fn cutoff(&self) -> NaiveDate {
        self.end
    }

    /// Last day before the period starts
    pub fn opening_cutoff(&self) -> NaiveDate {
        self.opening
    }
}

/// Which postings a balance covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceScope {
    /// Postings dated inside the period
    Period(ReportPeriod),
    /// Every posting dated on or before the cutoff
    Cumulative(NaiveDate),
}

/// Balance and statement queries over a chart and journal
#[derive(Debug, Clone, Copy)]
pub struct ReportEngine<'a> {
    chart: &'a ChartOfAccounts,
    journal: &'a Journal,
}

impl<'a> ReportEngine<'a> {
    pub fn new(chart: &'a ChartOfAccounts, journal: &'a Journal) -> Self {
        Self { chart, journal }
    }

    fn sum(
        &self,
        account_code: &str,
        sign: EntryType,
        branch: &BranchFilter,
        within: impl Fn(NaiveDate) -> bool,
    ) -> BigDecimal {
        self.journal
            .postings()
            .iter()
            .filter(|p| p.account_code == account_code && branch.matches(&p.branch_id) && within(p.date))
            .map(|p| p.signed_amount(sign))
            .sum()
    }

    fn scoped_balance(&self, account: &Account, scope: BalanceScope, branch: &BranchFilter) -> BigDecimal {
        match scope {
            BalanceScope::Period(period) => self.sum(
                &account.code,
                account.category.period_sign(),
                branch,
                |date| period.contains(date),
            ),
            BalanceScope::Cumulative(cutoff) => self.sum(
                &account.code,
                account.category.cumulative_sign(),
                branch,
                |date| date <= cutoff,
            ),
        }
    }

    /// Movement on one account inside a period
    pub fn period_balance(
        &self,
        account_code: &str,
        period: &ReportPeriod,
        branch: &BranchFilter,
    ) -> LedgerResult<BigDecimal> {
        let account = self.chart.require(account_code)?;
        Ok(self.scoped_balance(account, BalanceScope::Period(*period), branch))
    }

    /// Balance of one account as of `cutoff`, inclusive
    pub fn cumulative_balance(
        &self,
        account_code: &str,
        cutoff: NaiveDate,
        branch: &BranchFilter,
    ) -> LedgerResult<BigDecimal> {
        let account = self.chart.require(account_code)?;
        Ok(self.scoped_balance(account, BalanceScope::Cumulative(cutoff), branch))
    }

    pub fn category_total(
        &self,
        category: AccountCategory,
        scope: BalanceScope,
        branch: &BranchFilter,
    ) -> BigDecimal {
        self.chart
            .accounts_in(category)
            .map(|account| self.scoped_balance(account, scope, branch))
            .sum()
    }

    /// Per-account lines for either the balance sheet or the income statement
    fn account_lines(
        &self,
        balance_sheet: bool,
        scope: BalanceScope,
        branch: &BranchFilter,
    ) -> Vec<AccountBalance> {
        AccountCategory::ALL
            .iter()
            .filter(|category| category.is_balance_sheet() == balance_sheet)
            .flat_map(|category| self.chart.accounts_in(*category))
            .map(|account| AccountBalance {
                account: account.clone(),
                balance: self.scoped_balance(account, scope, branch),
            })
            .collect()
    }

    pub fn profit_and_loss(&self, period: &ReportPeriod, branch: &BranchFilter) -> ProfitAndLoss {
        let scope = BalanceScope::Period(*period);
        let revenue = self.category_total(AccountCategory::Revenue, scope, branch);
        let cost_of_sales = self.category_total(AccountCategory::CostOfSales, scope, branch);
        let operating_expense = self.category_total(AccountCategory::OperatingExpense, scope, branch);
        let gross_profit = &revenue - &cost_of_sales;
        let net_income = &gross_profit - &operating_expense;

        ProfitAndLoss {
            period: *period,
            branch: branch.clone(),
            accounts: self.account_lines(false, scope, branch),
            revenue,
            cost_of_sales,
            gross_profit,
            operating_expense,
            net_income,
        }
    }

    /// Balance sheet as of `as_of_date`.
    ///
    /// Nothing closes profit into equity, so the gap between assets and
    /// liabilities plus equity is reported as the retained earnings plug.
    pub fn balance_sheet(&self, as_of_date: NaiveDate, branch: &BranchFilter) -> BalanceSheet {
        let scope = BalanceScope::Cumulative(as_of_date);
        let current_assets = self.category_total(AccountCategory::AssetCurrent, scope, branch);
        let fixed_assets = self.category_total(AccountCategory::AssetFixed, scope, branch);
        let liabilities = self.category_total(AccountCategory::Liability, scope, branch);
        let equity = self.category_total(AccountCategory::Equity, scope, branch);

        let total_assets = &current_assets + &fixed_assets;
        let total_liabilities_equity = &liabilities + &equity;
        let retained_earnings_plug = &total_assets - &total_liabilities_equity;

        BalanceSheet {
            as_of_date,
            branch: branch.clone(),
            accounts: self.account_lines(true, scope, branch),
            current_assets,
            fixed_assets,
            total_assets,
            liabilities,
            equity,
            total_liabilities_equity,
            retained_earnings_plug,
        }
    }

    pub fn cash_flow(&self, period: &ReportPeriod, branch: &BranchFilter) -> CashFlowStatement {
        let scope = BalanceScope::Period(*period);
        let cash_in = self.category_total(AccountCategory::Revenue, scope, branch);
        let cash_out = self.category_total(AccountCategory::CostOfSales, scope, branch)
            + self.category_total(AccountCategory::OperatingExpense, scope, branch);
        let net_cash_flow = &cash_in - &cash_out;

        CashFlowStatement {
            period: *period,
            branch: branch.clone(),
            cash_in,
            cash_out,
            net_cash_flow,
        }
    }

    /// Revenue against cost of sales plus operating expense, per branch
    pub fn branch_performance(&self, period: &ReportPeriod, branches: &[String]) -> Vec<BranchPerformance> {
        let scope = BalanceScope::Period(*period);
        branches
            .iter()
            .map(|branch_id| {
                let filter = BranchFilter::branch(branch_id.as_str());
                let revenue = self.category_total(AccountCategory::Revenue, scope, &filter);
                let expenses = self.category_total(AccountCategory::CostOfSales, scope, &filter)
                    + self.category_total(AccountCategory::OperatingExpense, scope, &filter);
                BranchPerformance {
                    branch_id: branch_id.clone(),
                    net: &revenue - &expenses,
                    revenue,
                    expenses,
                }
            })
            .collect()
    }
}

/// Chart and journal captured together, so reports never see half a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    chart: ChartOfAccounts,
    journal: Journal,
}

impl LedgerSnapshot {
    pub fn new(chart: ChartOfAccounts, journal: Journal) -> Self {
        Self { chart, journal }
    }

    pub fn chart(&self) -> &ChartOfAccounts {
        &self.chart
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn reports(&self) -> ReportEngine<'_> {
        ReportEngine::new(&self.chart, &self.journal)
    }

    pub fn to_json(&self) -> LedgerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> LedgerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
