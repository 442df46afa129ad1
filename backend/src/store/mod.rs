//! Persistence boundary for inventory records, the movement ledger and the
//! activity trail.
//!
//! Services receive an `Arc<dyn InventoryStore>` at construction; nothing in
//! the crate reaches a database handle any other way.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, Stream, StreamExt};
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use shared::models::{
    ActivityLog, CreateItemInput, InventoryItem, ItemFilter, ItemPatch, NewActivityLog,
    NewTransaction, Transaction, TransactionQuery,
};
use shared::types::Pagination;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Number of ledger entries carried by the live transaction feed
pub const RECENT_TRANSACTIONS_FEED: usize = 10;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    /// A conditional stock write found a different stock level than expected
    #[error("stock of item {item_id} is {actual}, expected {expected}")]
    StockConflict {
        item_id: Uuid,
        expected: i64,
        actual: i64,
    },

    #[error("duplicate {0}")]
    Duplicate(String),

    /// The record is still referenced and cannot be removed
    #[error("{0}")]
    Referenced(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document-style persistence used by the inventory services
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Cheap connectivity probe
    async fn ping(&self) -> StoreResult<()>;

    async fn get_item(&self, id: Uuid) -> StoreResult<Option<InventoryItem>>;

    async fn find_item_by_code(&self, product_code: &str) -> StoreResult<Option<InventoryItem>>;

    /// Items matching `filter`, ordered by name
    async fn query_items(&self, filter: &ItemFilter) -> StoreResult<Vec<InventoryItem>>;

    /// Insert a new item; the store assigns its identifier
    async fn insert_item(&self, input: CreateItemInput, at: DateTime<Utc>)
        -> StoreResult<InventoryItem>;

    /// Apply a partial update. Honours `patch.expected_stock` as a
    /// compare-and-set on the current stock level.
    async fn update_item(&self, id: Uuid, patch: ItemPatch) -> StoreResult<InventoryItem>;

    /// Remove an item. Fails with `Referenced` while ledger entries point at it.
    async fn delete_item(&self, id: Uuid) -> StoreResult<InventoryItem>;

    async fn append_transaction(&self, record: NewTransaction) -> StoreResult<Transaction>;

    /// Remove one ledger entry and return it
    async fn delete_transaction(&self, id: Uuid) -> StoreResult<Transaction>;

    /// Ledger entries matching `query`, newest first
    async fn query_transactions(&self, query: &TransactionQuery) -> StoreResult<Vec<Transaction>>;

    async fn append_activity_log(&self, record: NewActivityLog) -> StoreResult<ActivityLog>;

    /// One page of activity, newest first, with the total entry count
    async fn query_activity_logs(
        &self,
        pagination: &Pagination,
    ) -> StoreResult<(Vec<ActivityLog>, u64)>;

    /// Live snapshots of the whole catalogue. The first snapshot reflects
    /// every write that completed before this returns.
    async fn subscribe_items(&self) -> StoreResult<Subscription<Vec<InventoryItem>>>;

    /// Live snapshots of the most recent ledger entries
    async fn subscribe_transactions(&self) -> StoreResult<Subscription<Vec<Transaction>>>;
}

pub type DynStore = Arc<dyn InventoryStore>;

/// A live feed of snapshots. Dropping it unsubscribes.
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> Subscription<T> {
    pub fn new(rx: watch::Receiver<T>) -> Self {
        Self { rx }
    }

    /// The latest snapshot
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Wait for the next snapshot. `None` once the store is gone.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Stream of snapshots, starting with the current one
    pub fn into_stream(mut self) -> impl Stream<Item = T> + Send {
        let first = self.rx.borrow_and_update().clone();
        stream::once(async move { first }).chain(stream::unfold(self, |mut sub| async move {
            let snapshot = sub.next().await?;
            Some((snapshot, sub))
        }))
    }
}

/// Publishes snapshots to subscribers
pub(crate) struct SnapshotFeeds {
    items: watch::Sender<Vec<InventoryItem>>,
    transactions: watch::Sender<Vec<Transaction>>,
}

impl SnapshotFeeds {
    pub(crate) fn new() -> Self {
        let (items, _) = watch::channel(Vec::new());
        let (transactions, _) = watch::channel(Vec::new());
        Self {
            items,
            transactions,
        }
    }

    pub(crate) fn has_item_subscribers(&self) -> bool {
        self.items.receiver_count() > 0
    }

    pub(crate) fn has_transaction_subscribers(&self) -> bool {
        self.transactions.receiver_count() > 0
    }

    pub(crate) fn publish_items(&self, items: Vec<InventoryItem>) {
        self.items.send_replace(items);
    }

    pub(crate) fn publish_transactions(&self, transactions: Vec<Transaction>) {
        self.transactions.send_replace(transactions);
    }

    pub(crate) fn subscribe_items(&self) -> Subscription<Vec<InventoryItem>> {
        Subscription::new(self.items.subscribe())
    }

    pub(crate) fn subscribe_transactions(&self) -> Subscription<Vec<Transaction>> {
        Subscription::new(self.transactions.subscribe())
    }
}
