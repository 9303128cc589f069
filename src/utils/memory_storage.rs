//! In-memory storage implementation for testing and single-process use

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Datelike;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::assets::FixedAsset;
use crate::inventory::{Catalog, InventoryMaterial, InventoryStore, ServiceProduct};
use crate::ledger::Journal;
use crate::parties::{Customer, PartyLedgers, Supplier};
use crate::traits::*;
use crate::types::*;

#[derive(Debug, Default)]
struct Books {
    inventory: InventoryStore,
    catalog: Catalog,
    parties: PartyLedgers,
    assets: BTreeMap<String, FixedAsset>,
    transactions: Vec<Transaction>,
    journal: Journal,
    sequences: HashMap<(String, i32), u32>,
}

/// Copies of the records a batch touches, mutated before anything is written
#[derive(Debug, Default)]
struct Staged {
    inventory: InventoryStore,
    parties: PartyLedgers,
    assets: BTreeMap<String, FixedAsset>,
    documents: BTreeMap<String, Transaction>,
}

impl Staged {
    fn material(&mut self, books: &Books, material_id: &str) -> LedgerResult<()> {
        if self.inventory.get(material_id).is_none() {
            self.inventory.upsert(books.inventory.require(material_id)?.clone());
        }
        Ok(())
    }

    fn customer(&mut self, books: &Books, customer_id: &str) -> LedgerResult<()> {
        if self.parties.customer(customer_id).is_none() {
            let customer = books
                .parties
                .customer(customer_id)
                .ok_or_else(|| LedgerError::unknown("customer_id", customer_id))?;
            self.parties.upsert_customer(customer.clone());
        }
        Ok(())
    }

    fn supplier(&mut self, books: &Books, supplier_id: &str) -> LedgerResult<()> {
        if self.parties.supplier(supplier_id).is_none() {
            let supplier = books
                .parties
                .supplier(supplier_id)
                .ok_or_else(|| LedgerError::unknown("supplier_id", supplier_id))?;
            self.parties.upsert_supplier(supplier.clone());
        }
        Ok(())
    }

    fn document(&mut self, books: &Books, transaction_id: &str) -> LedgerResult<&mut Transaction> {
        if !self.documents.contains_key(transaction_id) {
            let document = books
                .transaction(transaction_id)
                .ok_or_else(|| LedgerError::TransactionNotFound(transaction_id.to_string()))?;
            self.documents
                .insert(transaction_id.to_string(), document.clone());
        }
        self.documents
            .get_mut(transaction_id)
            .ok_or_else(|| LedgerError::TransactionNotFound(transaction_id.to_string()))
    }

    fn asset(&mut self, books: &Books, asset_id: &str) -> LedgerResult<&mut FixedAsset> {
        if !self.assets.contains_key(asset_id) {
            let asset = books
                .assets
                .get(asset_id)
                .ok_or_else(|| LedgerError::unknown("asset_id", asset_id))?;
            self.assets.insert(asset_id.to_string(), asset.clone());
        }
        self.assets
            .get_mut(asset_id)
            .ok_or_else(|| LedgerError::unknown("asset_id", asset_id))
    }
}

impl Books {
    fn transaction(&self, transaction_id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == transaction_id)
    }

    /// Apply every effect to staged copies, failing on the first violation
    fn stage(&self, effects: &[BookEffect]) -> LedgerResult<Staged> {
        let zero = BigDecimal::from(0);
        let mut staged = Staged::default();

        for effect in effects {
            match effect {
                BookEffect::AdjustStock { material_id, delta } => {
                    staged.material(self, material_id)?;
                    let stock = staged.inventory.adjust_stock(material_id, delta)?;
                    if stock < zero {
                        let available = self.inventory.require(material_id)?.stock.clone();
                        return Err(LedgerError::InsufficientStock {
                            material_id: material_id.clone(),
                            requested: &available - &stock,
                            available,
                        });
                    }
                }
                BookEffect::SetAverageCost { material_id, cost } => {
                    staged.material(self, material_id)?;
                    staged.inventory.set_average_cost(material_id, cost)?;
                }
                BookEffect::AdjustReceivable { customer_id, delta } => {
                    staged.customer(self, customer_id)?;
                    staged.parties.adjust_receivable(customer_id, delta)?;
                }
                BookEffect::AdjustPayable { supplier_id, delta } => {
                    staged.supplier(self, supplier_id)?;
                    staged.parties.adjust_payable(supplier_id, delta)?;
                }
                BookEffect::SettleDocument {
                    transaction_id,
                    amount,
                } => {
                    let document = staged.document(self, transaction_id)?;
                    if document.kind != TransactionKind::Sales
                        || document.status != TransactionStatus::Draft
                    {
                        return Err(LedgerError::validation(
                            "transaction_id",
                            format!("'{transaction_id}' is not an outstanding sale"),
                        ));
                    }
                    if *amount <= zero || *amount > document.outstanding {
                        return Err(LedgerError::validation(
                            "amount",
                            format!(
                                "'{}' has {} outstanding, cannot collect {}",
                                transaction_id, document.outstanding, amount
                            ),
                        ));
                    }
                    document.outstanding -= amount;
                    if document.outstanding == zero {
                        document.status = TransactionStatus::Posted;
                    }
                }
                BookEffect::Depreciate {
                    asset_id,
                    amount,
                    date,
                } => {
                    let asset = staged.asset(self, asset_id)?;
                    asset.ensure_depreciable_on(*date)?;
                    asset.last_depreciated = Some(*date);
                    asset.accumulated_depreciation += amount;
                    if asset.accumulated_depreciation > asset.purchase_cost {
                        return Err(LedgerError::validation(
                            "asset_id",
                            format!("depreciation would exceed the cost of '{asset_id}'"),
                        ));
                    }
                }
            }
        }

        Ok(staged)
    }

    fn apply(&mut self, staged: Staged) {
        for material in staged.inventory.iter(&BranchFilter::All) {
            self.inventory.upsert(material.clone());
        }
        for customer in staged.parties.customers() {
            self.parties.upsert_customer(customer.clone());
        }
        for supplier in staged.parties.suppliers() {
            self.parties.upsert_supplier(supplier.clone());
        }
        self.assets.extend(staged.assets);
        for (id, document) in staged.documents {
            if let Some(existing) = self.transactions.iter_mut().find(|t| t.id == id) {
                *existing = document;
            }
        }
    }
}

/// In-memory storage with a single lock around all books.
///
/// Commits take the write side, reads take the read side, so a reader sees
/// either all of a document or none of it.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    books: Arc<RwLock<Books>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, Books>> {
        self.books
            .read()
            .map_err(|_| LedgerError::Storage("books lock poisoned".to_string()))
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, Books>> {
        self.books
            .write()
            .map_err(|_| LedgerError::Storage("books lock poisoned".to_string()))
    }

    pub fn add_customer(&self, customer: Customer) -> LedgerResult<()> {
        self.write()?.parties.insert_customer(customer)
    }

    pub fn add_supplier(&self, supplier: Supplier) -> LedgerResult<()> {
        self.write()?.parties.insert_supplier(supplier)
    }

    pub fn add_material(&self, material: InventoryMaterial) -> LedgerResult<()> {
        self.write()?.inventory.insert(material)
    }

    pub fn add_service(&self, service: ServiceProduct) -> LedgerResult<()> {
        self.write()?.catalog.insert(service)
    }

    pub fn add_fixed_asset(&self, asset: FixedAsset) -> LedgerResult<()> {
        asset.validate()?;
        let mut books = self.write()?;
        if books.assets.contains_key(&asset.id) {
            return Err(LedgerError::validation(
                "id",
                format!("asset '{}' already exists", asset.id),
            ));
        }
        books.assets.insert(asset.id.clone(), asset);
        Ok(())
    }
}

#[async_trait]
impl BookStorage for MemoryStorage {
    async fn get_customer(&self, customer_id: &str) -> LedgerResult<Option<Customer>> {
        Ok(self.read()?.parties.customer(customer_id).cloned())
    }

    async fn get_supplier(&self, supplier_id: &str) -> LedgerResult<Option<Supplier>> {
        Ok(self.read()?.parties.supplier(supplier_id).cloned())
    }

    async fn get_service(&self, service_id: &str) -> LedgerResult<Option<ServiceProduct>> {
        Ok(self.read()?.catalog.get(service_id).cloned())
    }

    async fn get_fixed_asset(&self, asset_id: &str) -> LedgerResult<Option<FixedAsset>> {
        Ok(self.read()?.assets.get(asset_id).cloned())
    }

    async fn inventory(&self) -> LedgerResult<InventoryStore> {
        Ok(self.read()?.inventory.clone())
    }

    async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<Option<Transaction>> {
        Ok(self.read()?.transaction(transaction_id).cloned())
    }

    async fn list_transactions(&self, branch: &BranchFilter) -> LedgerResult<Vec<Transaction>> {
        Ok(self
            .read()?
            .transactions
            .iter()
            .filter(|t| branch.matches(&t.branch_id))
            .cloned()
            .collect())
    }

    async fn journal(&self) -> LedgerResult<Journal> {
        Ok(self.read()?.journal.clone())
    }

    async fn commit(&self, batch: PostingBatch) -> LedgerResult<Transaction> {
        let mut books = self.write()?;
        let staged = books.stage(&batch.effects)?;

        let year = batch.date.year();
        let key = (batch.prefix.clone(), year);
        let sequence = books.sequences.get(&key).copied().unwrap_or(0) + 1;
        let id = format!("{}/{}/{:05}", batch.prefix, year, sequence);
        let header = batch.header(id.clone());

        // Appending validates the lines; nothing has been written before this point.
        books
            .journal
            .append(&id, batch.date, &batch.branch_id, batch.lines)?;

        books.sequences.insert(key, sequence);
        books.apply(staged);
        books.transactions.push(header.clone());
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::JournalBuilder;
    use chrono::NaiveDate;

    fn batch(prefix: &str, lines: Vec<crate::ledger::PostingLine>, effects: Vec<BookEffect>) -> PostingBatch {
        PostingBatch {
            prefix: prefix.to_string(),
            branch_id: "b1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            description: "test".to_string(),
            kind: TransactionKind::Adjustment,
            status: TransactionStatus::Posted,
            party_id: None,
            total_amount: BigDecimal::from(100),
            lines,
            effects,
        }
    }

    fn storage() -> MemoryStorage {
        let storage = MemoryStorage::new();
        storage
            .add_material(
                InventoryMaterial::new("m1", "b1", "Detergent", "Liter")
                    .with_stock(BigDecimal::from(5), BigDecimal::from(20)),
            )
            .unwrap();
        storage
    }

    #[tokio::test]
    async fn test_commit_assigns_sequential_numbers() {
        let storage = storage();
        let lines = JournalBuilder::new()
            .pair("1-300", "1-100", &BigDecimal::from(100), "Restock")
            .build()
            .unwrap();

        let first = storage
            .commit(batch("MUT", lines.clone(), vec![]))
            .await
            .unwrap();
        let second = storage.commit(batch("MUT", lines, vec![])).await.unwrap();

        assert_eq!(first.id, "MUT/2024/00001");
        assert_eq!(second.id, "MUT/2024/00002");
        assert_eq!(storage.journal().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_failed_effect_leaves_books_untouched() {
        let storage = storage();
        let lines = JournalBuilder::new()
            .pair("5-100", "1-300", &BigDecimal::from(120), "Usage")
            .build()
            .unwrap();
        let effects = vec![BookEffect::AdjustStock {
            material_id: "m1".to_string(),
            delta: BigDecimal::from(-6),
        }];

        let err = storage.commit(batch("MUT", lines, effects)).await.unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientStock {
                material_id: "m1".to_string(),
                requested: BigDecimal::from(6),
                available: BigDecimal::from(5),
            }
        );

        let inventory = storage.inventory().await.unwrap();
        assert_eq!(inventory.require("m1").unwrap().stock, BigDecimal::from(5));
        assert!(storage.journal().await.unwrap().is_empty());
        assert!(storage
            .list_transactions(&BranchFilter::All)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_imbalanced_lines_do_not_consume_a_number() {
        let storage = storage();
        let mut lines = JournalBuilder::new()
            .pair("1-300", "1-100", &BigDecimal::from(100), "Restock")
            .build()
            .unwrap();
        lines[0].debit = BigDecimal::from(101);

        let effects = vec![BookEffect::AdjustStock {
            material_id: "m1".to_string(),
            delta: BigDecimal::from(5),
        }];
        let err = storage
            .commit(batch("MUT", lines, effects))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::ImbalancedPosting { .. }));

        let inventory = storage.inventory().await.unwrap();
        assert_eq!(inventory.require("m1").unwrap().stock, BigDecimal::from(5));

        let ok = JournalBuilder::new()
            .pair("1-300", "1-100", &BigDecimal::from(100), "Restock")
            .build()
            .unwrap();
        let header = storage.commit(batch("MUT", ok, vec![])).await.unwrap();
        assert_eq!(header.id, "MUT/2024/00001");
    }
}
