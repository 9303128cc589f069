//! Shared fixtures: two branches with their own stock, a small catalog,
//! a few parties and one machine per branch.

#![allow(dead_code)]

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;

use laundry_accounting::{
    BookStorage, ChartOfAccounts, Customer, CustomerType, DepreciationMethod, EngineConfig,
    FixedAsset, InventoryMaterial, MemoryStorage, PaymentMode, SaleLine, SaleRequest,
    ServiceCategory, ServiceProduct, Supplier, TransactionPoster,
};

pub fn dec(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn seeded_storage() -> MemoryStorage {
    let storage = MemoryStorage::new();

    for material in [
        InventoryMaterial::new("m1", "b1", "Detergent", "Liter")
            .with_stock(dec("100"), dec("25000"))
            .with_min_stock(dec("10")),
        InventoryMaterial::new("m2", "b1", "Plastic", "Kg")
            .with_stock(dec("20"), dec("15000"))
            .with_min_stock(dec("5")),
        InventoryMaterial::new("m3", "b2", "Detergent", "Liter")
            .with_stock(dec("50"), dec("25000"))
            .with_min_stock(dec("10")),
        InventoryMaterial::new("m4", "b2", "Plastic", "Kg")
            .with_stock(dec("2"), dec("15000"))
            .with_min_stock(dec("5")),
    ] {
        storage.add_material(material).unwrap();
    }

    storage
        .add_service(
            ServiceProduct::new("s1", "Wash Dry Iron", dec("8000"), ServiceCategory::WeightBased)
                .with_component("m1", dec("0.05"))
                .with_component("m2", dec("0.02")),
        )
        .unwrap();
    storage
        .add_service(
            ServiceProduct::new("s2", "Bed Cover", dec("35000"), ServiceCategory::UnitBased)
                .with_component("m1", dec("0.2")),
        )
        .unwrap();

    storage
        .add_customer(Customer::new("c1", "Budi Santoso", CustomerType::Individual).with_phone("0812-1111"))
        .unwrap();
    storage
        .add_customer(Customer::new("c2", "Hotel Grand Menteng", CustomerType::Corporate))
        .unwrap();
    storage
        .add_customer(Customer::new("c3", "Siti Aminah", CustomerType::Individual))
        .unwrap();

    storage
        .add_supplier(Supplier::new("sup1", "CV Kimia Bersih").with_contact("021-555-0101"))
        .unwrap();
    storage
        .add_supplier(Supplier::new("sup2", "Toko Plastik Jaya"))
        .unwrap();

    storage
        .add_fixed_asset(FixedAsset {
            id: "a1".to_string(),
            branch_id: "b1".to_string(),
            name: "Washing Machine".to_string(),
            purchase_date: date(2023, 12, 1),
            purchase_cost: dec("12000000"),
            useful_life_months: 48,
            accumulated_depreciation: dec("0"),
            method: DepreciationMethod::StraightLine,
            last_depreciated: None,
        })
        .unwrap();
    storage
        .add_fixed_asset(FixedAsset {
            id: "a2".to_string(),
            branch_id: "b2".to_string(),
            name: "Dryer".to_string(),
            purchase_date: date(2024, 1, 10),
            purchase_cost: dec("9600000"),
            useful_life_months: 48,
            accumulated_depreciation: dec("0"),
            method: DepreciationMethod::Declining,
            last_depreciated: None,
        })
        .unwrap();

    storage
}

pub fn poster() -> TransactionPoster<MemoryStorage> {
    poster_with(EngineConfig::default())
}

pub fn poster_with(config: EngineConfig) -> TransactionPoster<MemoryStorage> {
    TransactionPoster::new(seeded_storage(), ChartOfAccounts::laundry_standard(), config).unwrap()
}

pub fn sale(customer_id: &str, branch_id: &str, mode: PaymentMode, lines: &[(&str, &str)]) -> SaleRequest {
    SaleRequest {
        customer_id: customer_id.to_string(),
        branch_id: branch_id.to_string(),
        date: date(2024, 1, 15),
        payment_mode: mode,
        lines: lines
            .iter()
            .map(|(service_id, qty)| SaleLine {
                service_id: service_id.to_string(),
                qty: dec(qty),
            })
            .collect(),
    }
}

pub async fn stock_of(poster: &TransactionPoster<MemoryStorage>, material_id: &str) -> BigDecimal {
    poster
        .storage()
        .inventory()
        .await
        .unwrap()
        .get(material_id)
        .unwrap()
        .stock
        .clone()
}

pub async fn avg_cost_of(poster: &TransactionPoster<MemoryStorage>, material_id: &str) -> BigDecimal {
    poster
        .storage()
        .inventory()
        .await
        .unwrap()
        .get(material_id)
        .unwrap()
        .avg_cost
        .clone()
}
