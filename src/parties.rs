//! Customer receivables and supplier payables

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerType {
    Individual,
    Corporate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub customer_type: CustomerType,
    pub phone: String,
    /// Amount the customer still owes
    pub receivable_balance: BigDecimal,
}

impl Customer {
    pub fn new(id: impl Into<String>, name: impl Into<String>, customer_type: CustomerType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            customer_type,
            phone: String::new(),
            receivable_balance: BigDecimal::from(0),
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_receivable(mut self, balance: BigDecimal) -> Self {
        self.receivable_balance = balance;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact: String,
    /// Amount owed to the supplier
    pub payable_balance: BigDecimal,
}

impl Supplier {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            contact: String::new(),
            payable_balance: BigDecimal::from(0),
        }
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = contact.into();
        self
    }

    pub fn with_payable(mut self, balance: BigDecimal) -> Self {
        self.payable_balance = balance;
        self
    }
}

/// Receivable and payable balances per party
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PartyLedgers {
    customers: BTreeMap<String, Customer>,
    suppliers: BTreeMap<String, Supplier>,
}

impl PartyLedgers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_customer(&mut self, customer: Customer) -> LedgerResult<()> {
        if customer.id.trim().is_empty() {
            return Err(LedgerError::validation("id", "customer id cannot be empty"));
        }
        if customer.receivable_balance < BigDecimal::from(0) {
            return Err(LedgerError::validation(
                "receivable_balance",
                "opening receivable cannot be negative",
            ));
        }
        if self.customers.contains_key(&customer.id) {
            return Err(LedgerError::validation(
                "id",
                format!("customer '{}' already exists", customer.id),
            ));
        }
        self.customers.insert(customer.id.clone(), customer);
        Ok(())
    }

    pub fn insert_supplier(&mut self, supplier: Supplier) -> LedgerResult<()> {
        if supplier.id.trim().is_empty() {
            return Err(LedgerError::validation("id", "supplier id cannot be empty"));
        }
        if supplier.payable_balance < BigDecimal::from(0) {
            return Err(LedgerError::validation(
                "payable_balance",
                "opening payable cannot be negative",
            ));
        }
        if self.suppliers.contains_key(&supplier.id) {
            return Err(LedgerError::validation(
                "id",
                format!("supplier '{}' already exists", supplier.id),
            ));
        }
        self.suppliers.insert(supplier.id.clone(), supplier);
        Ok(())
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.get(id)
    }

    pub fn supplier(&self, id: &str) -> Option<&Supplier> {
        self.suppliers.get(id)
    }

    /// Move a customer's receivable by `delta`; it may not drop below zero
    pub fn adjust_receivable(&mut self, customer_id: &str, delta: &BigDecimal) -> LedgerResult<BigDecimal> {
        let customer = self
            .customers
            .get_mut(customer_id)
            .ok_or_else(|| LedgerError::unknown("customer_id", customer_id))?;
        let next = &customer.receivable_balance + delta;
        if next < BigDecimal::from(0) {
            return Err(LedgerError::validation(
                "amount",
                format!(
                    "customer '{}' owes {}, cannot settle more",
                    customer_id, customer.receivable_balance
                ),
            ));
        }
        customer.receivable_balance = next.clone();
        Ok(next)
    }

    /// Move a supplier's payable by `delta`; it may not drop below zero
    pub fn adjust_payable(&mut self, supplier_id: &str, delta: &BigDecimal) -> LedgerResult<BigDecimal> {
        let supplier = self
            .suppliers
            .get_mut(supplier_id)
            .ok_or_else(|| LedgerError::unknown("supplier_id", supplier_id))?;
        let next = &supplier.payable_balance + delta;
        if next < BigDecimal::from(0) {
            return Err(LedgerError::validation(
                "amount",
                format!(
                    "supplier '{}' is owed {}, cannot pay more",
                    supplier_id, supplier.payable_balance
                ),
            ));
        }
        supplier.payable_balance = next.clone();
        Ok(next)
    }

    pub fn upsert_customer(&mut self, customer: Customer) {
        self.customers.insert(customer.id.clone(), customer);
    }

    pub fn upsert_supplier(&mut self, supplier: Supplier) {
        self.suppliers.insert(supplier.id.clone(), supplier);
    }

    pub fn customers(&self) -> impl Iterator<Item = &Customer> {
        self.customers.values()
    }

    pub fn suppliers(&self) -> impl Iterator<Item = &Supplier> {
        self.suppliers.values()
    }

    pub fn total_receivable(&self) -> BigDecimal {
        self.customers.values().map(|c| &c.receivable_balance).sum()
    }

    pub fn total_payable(&self) -> BigDecimal {
        self.suppliers.values().map(|s| &s.payable_balance).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledgers() -> PartyLedgers {
        let mut parties = PartyLedgers::new();
        parties
            .insert_customer(
                Customer::new("c1", "Hotel Grand Menteng", CustomerType::Corporate)
                    .with_receivable(BigDecimal::from(1500000)),
            )
            .unwrap();
        parties
            .insert_supplier(Supplier::new("sup1", "CV Kimia Bersih"))
            .unwrap();
        parties
    }

    #[test]
    fn test_receivable_moves_both_ways() {
        let mut parties = ledgers();
        parties
            .adjust_receivable("c1", &BigDecimal::from(80000))
            .unwrap();
        let left = parties
            .adjust_receivable("c1", &BigDecimal::from(-580000))
            .unwrap();
        assert_eq!(left, BigDecimal::from(1000000));
        assert_eq!(parties.total_receivable(), BigDecimal::from(1000000));
    }

    #[test]
    fn test_balances_cannot_go_negative() {
        let mut parties = ledgers();
        assert!(parties
            .adjust_payable("sup1", &BigDecimal::from(-1))
            .is_err());
        assert_eq!(parties.total_payable(), BigDecimal::from(0));
        assert!(parties
            .adjust_receivable("nobody", &BigDecimal::from(1))
            .is_err());
    }
}
