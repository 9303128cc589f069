//! Fixed assets and their monthly depreciation

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepreciationMethod {
    StraightLine,
    /// Double-declining balance
    Declining,
}

/// Equipment owned by a branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedAsset {
    pub id: String,
    pub branch_id: String,
    pub name: String,
    pub purchase_date: NaiveDate,
    pub purchase_cost: BigDecimal,
    pub useful_life_months: u32,
    pub accumulated_depreciation: BigDecimal,
    pub method: DepreciationMethod,
    /// Date of the last depreciation posting
    #[serde(default)]
    pub last_depreciated: Option<NaiveDate>,
}

impl FixedAsset {
    pub fn book_value(&self) -> BigDecimal {
        &self.purchase_cost - &self.accumulated_depreciation
    }

    pub fn is_fully_depreciated(&self) -> bool {
        self.book_value() <= BigDecimal::from(0)
    }

    pub fn validate(&self) -> LedgerResult<()> {
        let zero = BigDecimal::from(0);
        if self.id.trim().is_empty() {
            return Err(LedgerError::validation("id", "asset id cannot be empty"));
        }
        if self.purchase_cost <= zero {
            return Err(LedgerError::validation(
                "purchase_cost",
                format!("asset '{}' must have a positive cost", self.id),
            ));
        }
        if self.useful_life_months == 0 {
            return Err(LedgerError::validation(
                "useful_life_months",
                format!("asset '{}' needs a useful life", self.id),
            ));
        }
        if self.accumulated_depreciation < zero || self.accumulated_depreciation > self.purchase_cost {
            return Err(LedgerError::validation(
                "accumulated_depreciation",
                format!("asset '{}' has accumulated depreciation outside its cost", self.id),
            ));
        }
        Ok(())
    }

    /// Depreciation is booked at most once per calendar month, never before purchase
    /// and never for a month earlier than the last one booked
    pub fn ensure_depreciable_on(&self, date: NaiveDate) -> LedgerResult<()> {
        if date < self.purchase_date {
            return Err(LedgerError::validation(
                "date",
                format!("'{}' was bought on {}", self.id, self.purchase_date),
            ));
        }
        if let Some(last) = self.last_depreciated {
            if (date.year(), date.month()) <= (last.year(), last.month()) {
                return Err(LedgerError::validation(
                    "date",
                    format!("'{}' is already depreciated through {}", self.id, last.format("%Y-%m")),
                ));
            }
        }
        Ok(())
    }

    /// Depreciation charge for one month, capped at the remaining book value
    pub fn monthly_charge(&self, money_scale: i64) -> LedgerResult<BigDecimal> {
        if self.is_fully_depreciated() {
            return Err(LedgerError::validation(
                "asset_id",
                format!("asset '{}' is fully depreciated", self.id),
            ));
        }

        let life = BigDecimal::from(self.useful_life_months);
        let book_value = self.book_value();
        let charge = match self.method {
            DepreciationMethod::StraightLine => &self.purchase_cost / &life,
            DepreciationMethod::Declining => &book_value * BigDecimal::from(2) / &life,
        }
        .round(money_scale);

        Ok(if charge > book_value { book_value } else { charge })
    }
}
