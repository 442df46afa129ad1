//! Shared fixtures for backend integration tests

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use inventory_backend::store::{
    DynStore, InventoryStore, MemoryStore, StoreError, StoreResult, Subscription,
};
use shared::models::{
    ActivityLog, Category, CreateItemInput, InventoryItem, ItemFilter, ItemPatch,
    NewActivityLog, NewTransaction, Transaction, TransactionQuery,
};
use shared::types::Pagination;

// Helper to create Decimal from string
pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn item_input(code: &str, stock: i64, min: i64, price: &str) -> CreateItemInput {
    CreateItemInput {
        product_code: code.to_string(),
        name: format!("Item {}", code),
        description: String::new(),
        category: Some(Category::Tools),
        current_stock: stock,
        min_quantity: min,
        price: dec(price),
        cost_price: dec("60"),
        supplier: "Ace Supply".to_string(),
        location: "Aisle 1".to_string(),
    }
}

/// A memory store holding one item `{stock, min, price}`
pub async fn store_with_item(stock: i64, min: i64, price: &str) -> (MemoryStore, InventoryItem) {
    let store = MemoryStore::new();
    let item = store
        .insert_item(item_input("HMR-001", stock, min, price), Utc::now())
        .await
        .unwrap();
    (store, item)
}

pub fn dyn_store(store: &MemoryStore) -> DynStore {
    Arc::new(store.clone())
}

/// Store wrapper that injects failures around a `MemoryStore`
pub struct FaultyStore {
    pub inner: MemoryStore,
    /// Fail every ledger append
    pub fail_ledger: AtomicBool,
    /// Fail every activity append
    pub fail_activity: AtomicBool,
    /// Bump the item's stock by one right before the next conditional write,
    /// as a concurrent movement would
    pub race_next_write: AtomicBool,
}

impl FaultyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_ledger: AtomicBool::new(false),
            fail_activity: AtomicBool::new(false),
            race_next_write: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl InventoryStore for FaultyStore {
    async fn ping(&self) -> StoreResult<()> {
        self.inner.ping().await
    }

    async fn get_item(&self, id: Uuid) -> StoreResult<Option<InventoryItem>> {
        self.inner.get_item(id).await
    }

    async fn find_item_by_code(&self, product_code: &str) -> StoreResult<Option<InventoryItem>> {
        self.inner.find_item_by_code(product_code).await
    }

    async fn query_items(&self, filter: &ItemFilter) -> StoreResult<Vec<InventoryItem>> {
        self.inner.query_items(filter).await
    }

    async fn insert_item(
        &self,
        input: CreateItemInput,
        at: DateTime<Utc>,
    ) -> StoreResult<InventoryItem> {
        self.inner.insert_item(input, at).await
    }

    async fn update_item(&self, id: Uuid, patch: ItemPatch) -> StoreResult<InventoryItem> {
        if self.race_next_write.swap(false, Ordering::SeqCst) {
            if let Some(item) = self.inner.get_item(id).await? {
                let bump = ItemPatch {
                    current_stock: Some(item.current_stock + 1),
                    ..ItemPatch::default()
                };
                self.inner.update_item(id, bump).await?;
            }
        }
        self.inner.update_item(id, patch).await
    }

    async fn delete_item(&self, id: Uuid) -> StoreResult<InventoryItem> {
        self.inner.delete_item(id).await
    }

    async fn append_transaction(&self, record: NewTransaction) -> StoreResult<Transaction> {
        if self.fail_ledger.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        self.inner.append_transaction(record).await
    }

    async fn delete_transaction(&self, id: Uuid) -> StoreResult<Transaction> {
        self.inner.delete_transaction(id).await
    }

    async fn query_transactions(&self, query: &TransactionQuery) -> StoreResult<Vec<Transaction>> {
        self.inner.query_transactions(query).await
    }

    async fn append_activity_log(&self, record: NewActivityLog) -> StoreResult<ActivityLog> {
        if self.fail_activity.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        self.inner.append_activity_log(record).await
    }

    async fn query_activity_logs(
        &self,
        pagination: &Pagination,
    ) -> StoreResult<(Vec<ActivityLog>, u64)> {
        self.inner.query_activity_logs(pagination).await
    }

    async fn subscribe_items(&self) -> StoreResult<Subscription<Vec<InventoryItem>>> {
        self.inner.subscribe_items().await
    }

    async fn subscribe_transactions(&self) -> StoreResult<Subscription<Vec<Transaction>>> {
        self.inner.subscribe_transactions().await
    }
}
