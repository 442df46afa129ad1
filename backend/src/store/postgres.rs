//! PostgreSQL-backed store

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use shared::models::{
    ActivityAction, ActivityLog, CreateItemInput, InventoryItem, ItemFilter, ItemPatch,
    MovementDirection, NewActivityLog, NewTransaction, Transaction, TransactionQuery,
};
use shared::types::Pagination;

use super::{
    InventoryStore, SnapshotFeeds, StoreError, StoreResult, Subscription,
    RECENT_TRANSACTIONS_FEED,
};

const ITEM_COLUMNS: &str = "id, product_code, name, description, category, current_stock, \
     min_quantity, price, cost_price, supplier, location, last_updated, created_at";

const TRANSACTION_COLUMNS: &str = "id, direction, item_id, item_name, item_code, quantity, \
     unit_value, total, previous_stock, new_stock, reference_number, notes, supplier, \
     transaction_date, created_by";

#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    product_code: String,
    name: String,
    description: String,
    category: Option<String>,
    current_stock: i64,
    min_quantity: i64,
    price: Decimal,
    cost_price: Decimal,
    supplier: String,
    location: String,
    last_updated: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<ItemRow> for InventoryItem {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.id,
            product_code: row.product_code,
            name: row.name,
            description: row.description,
            // Unknown labels are read as uncategorized
            category: row.category.and_then(|c| c.parse().ok()),
            current_stock: row.current_stock,
            min_quantity: row.min_quantity,
            price: row.price,
            cost_price: row.cost_price,
            supplier: row.supplier,
            location: row.location,
            last_updated: row.last_updated,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: Uuid,
    direction: String,
    item_id: Uuid,
    item_name: String,
    item_code: String,
    quantity: i64,
    unit_value: Decimal,
    total: Decimal,
    previous_stock: i64,
    new_stock: i64,
    reference_number: String,
    notes: String,
    supplier: Option<String>,
    transaction_date: DateTime<Utc>,
    created_by: Option<Uuid>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let direction: MovementDirection = row
            .direction
            .parse()
            .map_err(|e: String| StoreError::Unavailable(e))?;
        Ok(Self {
            id: row.id,
            direction,
            item_id: row.item_id,
            item_name: row.item_name,
            item_code: row.item_code,
            quantity: row.quantity,
            unit_value: row.unit_value,
            total: row.total,
            previous_stock: row.previous_stock,
            new_stock: row.new_stock,
            reference_number: row.reference_number,
            notes: row.notes,
            supplier: row.supplier,
            date: row.transaction_date,
            created_by: row.created_by,
        })
    }
}

#[derive(Debug, FromRow)]
struct ActivityRow {
    id: Uuid,
    action: String,
    details: String,
    logged_at: DateTime<Utc>,
    user_id: Option<Uuid>,
    item_id: Option<Uuid>,
}

impl TryFrom<ActivityRow> for ActivityLog {
    type Error = StoreError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        let action: ActivityAction = row
            .action
            .parse()
            .map_err(|e: String| StoreError::Unavailable(e))?;
        Ok(Self {
            id: row.id,
            action,
            details: row.details,
            timestamp: row.logged_at,
            user_id: row.user_id,
            item_id: row.item_id,
        })
    }
}

fn map_sqlx(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => {
                return StoreError::Duplicate(
                    db_err
                        .constraint()
                        .map(|c| c.trim_start_matches("inventory_items_").trim_end_matches("_key"))
                        .unwrap_or("record")
                        .to_string(),
                )
            }
            Some("23503") => {
                return StoreError::Referenced(
                    "Item is referenced by ledger entries".to_string(),
                )
            }
            _ => {}
        }
    }
    if let sqlx::Error::RowNotFound = err {
        return StoreError::NotFound("Record".to_string());
    }
    StoreError::Unavailable(err.to_string())
}

/// Escape LIKE wildcards in a user search term
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Store backed by a Postgres connection pool
fn recent_feed_query() -> TransactionQuery {
    TransactionQuery {
        limit: Some(RECENT_TRANSACTIONS_FEED),
        ..TransactionQuery::default()
    }
}

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
    feeds: Arc<SnapshotFeeds>,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            feeds: Arc::new(SnapshotFeeds::new()),
        }
    }

    async fn refresh_items(&self) {
        if !self.feeds.has_item_subscribers() {
            return;
        }
        match self.query_items(&ItemFilter::default()).await {
            Ok(items) => self.feeds.publish_items(items),
            Err(e) => tracing::warn!("Failed to refresh item feed: {}", e),
        }
    }

    async fn refresh_transactions(&self) {
        if !self.feeds.has_transaction_subscribers() {
            return;
        }
        match self.query_transactions(&recent_feed_query()).await {
            Ok(transactions) => self.feeds.publish_transactions(transactions),
            Err(e) => tracing::warn!("Failed to refresh transaction feed: {}", e),
        }
    }

    async fn current_stock(&self, id: Uuid) -> StoreResult<Option<i64>> {
        sqlx::query_scalar::<_, i64>("SELECT current_stock FROM inventory_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(map_sqlx)
    }
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.db)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn get_item(&self, id: Uuid) -> StoreResult<Option<InventoryItem>> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {} FROM inventory_items WHERE id = $1",
            ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(InventoryItem::from))
    }

    async fn find_item_by_code(&self, product_code: &str) -> StoreResult<Option<InventoryItem>> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {} FROM inventory_items WHERE product_code = $1",
            ITEM_COLUMNS
        ))
        .bind(product_code)
        .fetch_optional(&self.db)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(InventoryItem::from))
    }

    async fn query_items(&self, filter: &ItemFilter) -> StoreResult<Vec<InventoryItem>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM inventory_items WHERE TRUE",
            ITEM_COLUMNS
        ));

        if let Some(category) = filter.category {
            qb.push(" AND category = ").push_bind(category.as_str());
        }
        if filter.low_stock {
            qb.push(" AND current_stock <= min_quantity");
        }
        if let Some(term) = filter.search.as_deref().map(str::trim) {
            if !term.is_empty() {
                let pattern = like_pattern(term);
                qb.push(" AND (name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR product_code ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR category ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
        }
        qb.push(" ORDER BY name, created_at");

        let rows = qb
            .build_query_as::<ItemRow>()
            .fetch_all(&self.db)
            .await
            .map_err(map_sqlx)?;

        Ok(rows.into_iter().map(InventoryItem::from).collect())
    }

    async fn insert_item(
        &self,
        input: CreateItemInput,
        at: DateTime<Utc>,
    ) -> StoreResult<InventoryItem> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            r#"
            INSERT INTO inventory_items (
                product_code, name, description, category, current_stock, min_quantity,
                price, cost_price, supplier, location, last_updated, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(&input.product_code)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category.map(|c| c.as_str()))
        .bind(input.current_stock)
        .bind(input.min_quantity)
        .bind(input.price)
        .bind(input.cost_price)
        .bind(&input.supplier)
        .bind(&input.location)
        .bind(at)
        .fetch_one(&self.db)
        .await
        .map_err(map_sqlx)?;

        self.refresh_items().await;
        Ok(row.into())
    }

    async fn update_item(&self, id: Uuid, patch: ItemPatch) -> StoreResult<InventoryItem> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE inventory_items SET id = id");

        if let Some(v) = &patch.product_code {
            qb.push(", product_code = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.name {
            qb.push(", name = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.description {
            qb.push(", description = ").push_bind(v.clone());
        }
        if let Some(v) = patch.category {
            qb.push(", category = ").push_bind(v.map(|c| c.as_str()));
        }
        if let Some(v) = patch.current_stock {
            qb.push(", current_stock = ").push_bind(v);
        }
        if let Some(v) = patch.min_quantity {
            qb.push(", min_quantity = ").push_bind(v);
        }
        if let Some(v) = patch.price {
            qb.push(", price = ").push_bind(v);
        }
        if let Some(v) = patch.cost_price {
            qb.push(", cost_price = ").push_bind(v);
        }
        if let Some(v) = &patch.supplier {
            qb.push(", supplier = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.location {
            qb.push(", location = ").push_bind(v.clone());
        }
        if let Some(v) = patch.last_updated {
            qb.push(", last_updated = ").push_bind(v);
        }

        qb.push(" WHERE id = ").push_bind(id);
        if let Some(expected) = patch.expected_stock {
            qb.push(" AND current_stock = ").push_bind(expected);
        }
        qb.push(format!(" RETURNING {}", ITEM_COLUMNS));

        let row = qb
            .build_query_as::<ItemRow>()
            .fetch_optional(&self.db)
            .await
            .map_err(map_sqlx)?;

        match row {
            Some(row) => {
                self.refresh_items().await;
                Ok(row.into())
            }
            None => match (patch.expected_stock, self.current_stock(id).await?) {
                (Some(expected), Some(actual)) => Err(StoreError::StockConflict {
                    item_id: id,
                    expected,
                    actual,
                }),
                _ => Err(StoreError::NotFound("Inventory item".to_string())),
            },
        }
    }

    async fn delete_item(&self, id: Uuid) -> StoreResult<InventoryItem> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "DELETE FROM inventory_items WHERE id = $1 RETURNING {}",
            ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(map_sqlx)?
        .ok_or_else(|| StoreError::NotFound("Inventory item".to_string()))?;

        self.refresh_items().await;
        Ok(row.into())
    }

    async fn append_transaction(&self, record: NewTransaction) -> StoreResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r#"
            INSERT INTO transactions (
                direction, item_id, item_name, item_code, quantity, unit_value, total,
                previous_stock, new_stock, reference_number, notes, supplier,
                transaction_date, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(record.direction.as_str())
        .bind(record.item_id)
        .bind(&record.item_name)
        .bind(&record.item_code)
        .bind(record.quantity)
        .bind(record.unit_value)
        .bind(record.total)
        .bind(record.previous_stock)
        .bind(record.new_stock)
        .bind(&record.reference_number)
        .bind(&record.notes)
        .bind(&record.supplier)
        .bind(record.date)
        .bind(record.created_by)
        .fetch_one(&self.db)
        .await
        .map_err(map_sqlx)?;

        self.refresh_transactions().await;
        row.try_into()
    }

    async fn delete_transaction(&self, id: Uuid) -> StoreResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "DELETE FROM transactions WHERE id = $1 RETURNING {}",
            TRANSACTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(map_sqlx)?
        .ok_or_else(|| StoreError::NotFound("Transaction".to_string()))?;

        self.refresh_transactions().await;
        row.try_into()
    }

    async fn query_transactions(&self, query: &TransactionQuery) -> StoreResult<Vec<Transaction>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM transactions WHERE TRUE",
            TRANSACTION_COLUMNS
        ));

        if let Some(direction) = query.direction {
            qb.push(" AND direction = ").push_bind(direction.as_str());
        }
        if let Some(from) = query.from {
            qb.push(" AND transaction_date >= ").push_bind(from);
        }
        if let Some(until) = query.until {
            qb.push(" AND transaction_date < ").push_bind(until);
        }
        if let Some(item_id) = query.item_id {
            qb.push(" AND item_id = ").push_bind(item_id);
        }
        qb.push(" ORDER BY transaction_date DESC, id");
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }

        let rows = qb
            .build_query_as::<TransactionRow>()
            .fetch_all(&self.db)
            .await
            .map_err(map_sqlx)?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn append_activity_log(&self, record: NewActivityLog) -> StoreResult<ActivityLog> {
        let row = sqlx::query_as::<_, ActivityRow>(
            r#"
            INSERT INTO activity_logs (action, details, logged_at, user_id, item_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, action, details, logged_at, user_id, item_id
            "#,
        )
        .bind(record.action.as_str())
        .bind(&record.details)
        .bind(record.timestamp)
        .bind(record.user_id)
        .bind(record.item_id)
        .fetch_one(&self.db)
        .await
        .map_err(map_sqlx)?;

        row.try_into()
    }

    async fn query_activity_logs(
        &self,
        pagination: &Pagination,
    ) -> StoreResult<(Vec<ActivityLog>, u64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_logs")
            .fetch_one(&self.db)
            .await
            .map_err(map_sqlx)?;

        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT id, action, details, logged_at, user_id, item_id
            FROM activity_logs
            ORDER BY logged_at DESC, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.db)
        .await
        .map_err(map_sqlx)?;

        let logs = rows
            .into_iter()
            .map(ActivityLog::try_from)
            .collect::<StoreResult<Vec<_>>>()?;
        Ok((logs, total.max(0) as u64))
    }

    async fn subscribe_items(&self) -> StoreResult<Subscription<Vec<InventoryItem>>> {
        let subscription = self.feeds.subscribe_items();
        let items = self.query_items(&ItemFilter::default()).await?;
        self.feeds.publish_items(items);
        Ok(subscription)
    }

    async fn subscribe_transactions(&self) -> StoreResult<Subscription<Vec<Transaction>>> {
        let subscription = self.feeds.subscribe_transactions();
        let transactions = self.query_transactions(&recent_feed_query()).await?;
        self.feeds.publish_transactions(transactions);
        Ok(subscription)
    }
}
