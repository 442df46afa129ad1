//! In-process store used for development and tests

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use shared::models::{
    ActivityLog, CreateItemInput, InventoryItem, ItemFilter, ItemPatch, NewActivityLog,
    NewTransaction, Transaction, TransactionQuery,
};
use shared::types::Pagination;

use super::{
    InventoryStore, SnapshotFeeds, StoreError, StoreResult, Subscription,
    RECENT_TRANSACTIONS_FEED,
};

#[derive(Default)]
struct Collections {
    items: HashMap<Uuid, InventoryItem>,
    transactions: Vec<Transaction>,
    activity: Vec<ActivityLog>,
}

/// Store keeping every collection in memory behind one lock
#[derive(Clone)]
pub struct MemoryStore {
    data: Arc<RwLock<Collections>>,
    feeds: Arc<SnapshotFeeds>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(Collections::default())),
            feeds: Arc::new(SnapshotFeeds::new()),
        }
    }

    /// Seed a fully formed item, keeping its identifier
    pub async fn seed_item(&self, item: InventoryItem) {
        let mut data = self.data.write().await;
        data.items.insert(item.id, item);
        self.publish_items(&data);
    }

    /// Seed a ledger entry as-is, bypassing the movement rules
    pub async fn seed_transaction(&self, transaction: Transaction) {
        let mut data = self.data.write().await;
        data.transactions.push(transaction);
        self.publish_transactions(&data);
    }

    fn sorted_items(data: &Collections, filter: &ItemFilter) -> Vec<InventoryItem> {
        let mut items: Vec<InventoryItem> = data
            .items
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        items
    }

    fn sorted_transactions(data: &Collections, query: &TransactionQuery) -> Vec<Transaction> {
        let mut transactions: Vec<Transaction> = data
            .transactions
            .iter()
            .filter(|t| query.matches(t))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = query.limit {
            transactions.truncate(limit);
        }
        transactions
    }

    fn publish_items(&self, data: &Collections) {
        if self.feeds.has_item_subscribers() {
            self.feeds
                .publish_items(Self::sorted_items(data, &ItemFilter::default()));
        }
    }

    fn publish_transactions(&self, data: &Collections) {
        if self.feeds.has_transaction_subscribers() {
            let recent = TransactionQuery {
                limit: Some(RECENT_TRANSACTIONS_FEED),
                ..TransactionQuery::default()
            };
            self.feeds
                .publish_transactions(Self::sorted_transactions(data, &recent));
        }
    }

    fn code_taken(data: &Collections, product_code: &str, except: Option<Uuid>) -> bool {
        data.items
            .values()
            .any(|i| i.product_code == product_code && Some(i.id) != except)
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn get_item(&self, id: Uuid) -> StoreResult<Option<InventoryItem>> {
        Ok(self.data.read().await.items.get(&id).cloned())
    }

    async fn find_item_by_code(&self, product_code: &str) -> StoreResult<Option<InventoryItem>> {
        Ok(self
            .data
            .read()
            .await
            .items
            .values()
            .find(|i| i.product_code == product_code)
            .cloned())
    }

    async fn query_items(&self, filter: &ItemFilter) -> StoreResult<Vec<InventoryItem>> {
        Ok(Self::sorted_items(&*self.data.read().await, filter))
    }

    async fn insert_item(
        &self,
        input: CreateItemInput,
        at: DateTime<Utc>,
    ) -> StoreResult<InventoryItem> {
        let mut data = self.data.write().await;
        if Self::code_taken(&data, &input.product_code, None) {
            return Err(StoreError::Duplicate("product_code".to_string()));
        }

        let item = InventoryItem {
            id: Uuid::new_v4(),
            product_code: input.product_code,
            name: input.name,
            description: input.description,
            category: input.category,
            current_stock: input.current_stock,
            min_quantity: input.min_quantity,
            price: input.price,
            cost_price: input.cost_price,
            supplier: input.supplier,
            location: input.location,
            last_updated: at,
            created_at: at,
        };
        data.items.insert(item.id, item.clone());
        self.publish_items(&data);
        Ok(item)
    }

    async fn update_item(&self, id: Uuid, patch: ItemPatch) -> StoreResult<InventoryItem> {
        let mut data = self.data.write().await;
        if let Some(code) = &patch.product_code {
            if Self::code_taken(&data, code, Some(id)) {
                return Err(StoreError::Duplicate("product_code".to_string()));
            }
        }

        let item = data
            .items
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("Inventory item".to_string()))?;

        if let Some(expected) = patch.expected_stock {
            if item.current_stock != expected {
                return Err(StoreError::StockConflict {
                    item_id: id,
                    expected,
                    actual: item.current_stock,
                });
            }
        }

        patch.apply_to(item);
        let updated = item.clone();
        self.publish_items(&data);
        Ok(updated)
    }

    async fn delete_item(&self, id: Uuid) -> StoreResult<InventoryItem> {
        let mut data = self.data.write().await;
        if !data.items.contains_key(&id) {
            return Err(StoreError::NotFound("Inventory item".to_string()));
        }
        let references = data.transactions.iter().filter(|t| t.item_id == id).count();
        if references > 0 {
            return Err(StoreError::Referenced(format!(
                "Item is referenced by {} ledger entries",
                references
            )));
        }

        let removed = data
            .items
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound("Inventory item".to_string()))?;
        self.publish_items(&data);
        Ok(removed)
    }

    async fn append_transaction(&self, record: NewTransaction) -> StoreResult<Transaction> {
        let mut data = self.data.write().await;
        let transaction = record.into_transaction(Uuid::new_v4());
        data.transactions.push(transaction.clone());
        self.publish_transactions(&data);
        Ok(transaction)
    }

    async fn delete_transaction(&self, id: Uuid) -> StoreResult<Transaction> {
        let mut data = self.data.write().await;
        let position = data
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound("Transaction".to_string()))?;
        let removed = data.transactions.remove(position);
        self.publish_transactions(&data);
        Ok(removed)
    }

    async fn query_transactions(&self, query: &TransactionQuery) -> StoreResult<Vec<Transaction>> {
        Ok(Self::sorted_transactions(&*self.data.read().await, query))
    }

    async fn append_activity_log(&self, record: NewActivityLog) -> StoreResult<ActivityLog> {
        let log = record.into_log(Uuid::new_v4());
        self.data.write().await.activity.push(log.clone());
        Ok(log)
    }

    async fn query_activity_logs(
        &self,
        pagination: &Pagination,
    ) -> StoreResult<(Vec<ActivityLog>, u64)> {
        let data = self.data.read().await;
        let mut logs: Vec<ActivityLog> = data.activity.clone();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let total = logs.len() as u64;
        let page = logs
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect();
        Ok((page, total))
    }

    async fn subscribe_items(&self) -> StoreResult<Subscription<Vec<InventoryItem>>> {
        // Writers publish under the write lock, so no write can slip between
        // the seed snapshot and the subscription
        let data = self.data.read().await;
        let subscription = self.feeds.subscribe_items();
        self.publish_items(&data);
        Ok(subscription)
    }

    async fn subscribe_transactions(&self) -> StoreResult<Subscription<Vec<Transaction>>> {
        let data = self.data.read().await;
        let subscription = self.feeds.subscribe_transactions();
        self.publish_transactions(&data);
        Ok(subscription)
    }
}
