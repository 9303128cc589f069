//! One day of business across two laundry branches

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use laundry_accounting::{
    BranchFilter, Customer, CustomerType, EngineConfig, ExpenseRequest, InventoryMaterial,
    MemoryStorage, PaymentMode, PurchaseLine, PurchaseRequest, ReceivableSettlement,
    ReportPeriod, SaleLine, SaleRequest, ServiceCategory, ServiceProduct, Supplier,
    TransactionPoster,
};

fn dec(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    println!("🧺 Laundry Accounting - Branch Day\n");

    let storage = MemoryStorage::new();
    storage.add_material(
        InventoryMaterial::new("mat-det-1", "menteng", "Detergent", "Liter")
            .with_stock(dec("40"), dec("25000"))
            .with_min_stock(dec("10")),
    )?;
    storage.add_material(
        InventoryMaterial::new("mat-pla-1", "menteng", "Plastic", "Kg")
            .with_stock(dec("6"), dec("15000"))
            .with_min_stock(dec("5")),
    )?;
    storage.add_material(
        InventoryMaterial::new("mat-det-2", "kemang", "Detergent", "Liter")
            .with_stock(dec("25"), dec("25000"))
            .with_min_stock(dec("10")),
    )?;
    storage.add_service(
        ServiceProduct::new("svc-kiloan", "Wash Dry Iron", dec("8000"), ServiceCategory::WeightBased)
            .with_component("mat-det-1", dec("0.05"))
            .with_component("mat-pla-1", dec("0.02")),
    )?;
    storage.add_customer(Customer::new("cust-1", "Budi Santoso", CustomerType::Individual))?;
    storage.add_customer(Customer::new("cust-2", "Hotel Grand Menteng", CustomerType::Corporate))?;
    storage.add_supplier(Supplier::new("supp-1", "CV Kimia Bersih"))?;

    let config = EngineConfig::from_env()?;
    let poster = TransactionPoster::new(
        storage,
        laundry_accounting::ChartOfAccounts::laundry_standard(),
        config,
    )?;
    let day = NaiveDate::from_ymd_opt(2024, 3, 12).ok_or("bad date")?;

    println!("💰 Posting the day's documents...");
    let walk_in = poster
        .post_sale(SaleRequest {
            customer_id: "cust-1".to_string(),
            branch_id: "menteng".to_string(),
            date: day,
            payment_mode: PaymentMode::Paid,
            lines: vec![SaleLine {
                service_id: "svc-kiloan".to_string(),
                qty: dec("6.5"),
            }],
        })
        .await?;
    println!("  ✓ Walk-in sale {walk_in}");

    let hotel = poster
        .post_sale(SaleRequest {
            customer_id: "cust-2".to_string(),
            branch_id: "menteng".to_string(),
            date: day,
            payment_mode: PaymentMode::Unpaid,
            lines: vec![SaleLine {
                service_id: "svc-kiloan".to_string(),
                qty: dec("45"),
            }],
        })
        .await?;
    println!("  ✓ Hotel sale on credit {hotel}");

    // The recipe names Menteng's detergent; Kemang draws from its own
    // record, but Kemang stocks no plastic so the sale is refused.
    match poster
        .post_sale(SaleRequest {
            customer_id: "cust-1".to_string(),
            branch_id: "kemang".to_string(),
            date: day,
            payment_mode: PaymentMode::Paid,
            lines: vec![SaleLine {
                service_id: "svc-kiloan".to_string(),
                qty: dec("3"),
            }],
        })
        .await
    {
        Ok(id) => println!("  ✓ Kemang sale {id}"),
        Err(err) => println!("  ✗ Kemang sale refused: {err}"),
    }

    let restock = poster
        .post_purchase(PurchaseRequest {
            supplier_id: "supp-1".to_string(),
            branch_id: "menteng".to_string(),
            date: day,
            payment_mode: PaymentMode::Unpaid,
            lines: vec![PurchaseLine {
                material_id: "mat-pla-1".to_string(),
                qty: dec("10"),
                unit_cost: Some(dec("16000")),
            }],
        })
        .await?;
    println!("  ✓ Plastic restock {restock}");

    let rent = poster
        .post_expense(ExpenseRequest {
            branch_id: "menteng".to_string(),
            date: day,
            account_code: "6-300".to_string(),
            amount: dec("175000"),
            description: "Water bill".to_string(),
        })
        .await?;
    println!("  ✓ Utilities {rent}");

    let receipt = poster
        .settle_receivable(ReceivableSettlement {
            transaction_id: hotel.clone(),
            date: day,
            amount: dec("200000"),
        })
        .await?;
    println!("  ✓ Partial collection {receipt} against {hotel}\n");

    let period = ReportPeriod::monthly(2024, 3)?;
    let snapshot = poster.snapshot().await?;
    let reports = snapshot.reports();

    let pnl = reports.profit_and_loss(&period, &BranchFilter::All);
    println!("📈 Profit & Loss, March 2024");
    println!("  Revenue:           {}", pnl.revenue);
    println!("  Cost of services:  {}", pnl.cost_of_sales);
    println!("  Gross profit:      {}", pnl.gross_profit);
    println!("  Operating expense: {}", pnl.operating_expense);
    println!("  Net income:        {}\n", pnl.net_income);

    let sheet = reports.balance_sheet(period.cutoff(), &BranchFilter::All);
    println!("📊 Balance Sheet as of {}", sheet.as_of_date);
    println!("  Total assets:            {}", sheet.total_assets);
    println!("  Liabilities + equity:    {}", sheet.total_liabilities_equity);
    println!("  Retained earnings (plug): {}", sheet.retained_earnings_plug);
    println!("  Balanced: {}\n", sheet.is_balanced());

    println!("📦 Low stock");
    for material in poster.low_stock_set(&BranchFilter::All).await? {
        println!(
            "  ⚠ {} @ {}: {} {} (min {})",
            material.name, material.branch_id, material.stock, material.unit, material.min_stock
        );
    }
    println!(
        "  Inventory value: {}",
        poster.valuation_total(&BranchFilter::All).await?
    );

    Ok(())
}
