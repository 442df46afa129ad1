//! Stock movement engine: applies stock in/out to an item and records the
//! ledger entry and audit line that go with it.

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use shared::models::{
    ActivityAction, ItemPatch, MovementDirection, MovementRequest, NewActivityLog,
    NewTransaction, Transaction, TransactionQuery,
};
use shared::stock::{describe_movement, plan_movement, StockError};
use shared::validation::validate_amount;

use crate::error::{AppError, AppResult};
use crate::services::partial_write;
use crate::store::DynStore;

/// Default number of ledger entries shown on the stock management screen
pub const DEFAULT_RECENT_LIMIT: usize = 10;
pub const MAX_RECENT_LIMIT: usize = 500;

/// Query for the recent movements listing
#[derive(Debug, Default, Deserialize)]
pub struct MovementListQuery {
    #[serde(rename = "type")]
    pub direction: Option<MovementDirection>,
    pub limit: Option<usize>,
}

#[derive(Clone)]
pub struct MovementService {
    store: DynStore,
}

impl MovementService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Apply one stock movement.
    ///
    /// The item is written first, conditional on the stock level it was read
    /// at. Only then are the ledger entry and the activity line appended.
    pub async fn apply_movement(
        &self,
        request: MovementRequest,
        actor: Option<Uuid>,
    ) -> AppResult<Transaction> {
        let quantity = request
            .quantity
            .parse()
            .map_err(|e| AppError::validation("quantity", e.to_string()))?;

        if let Some(cost) = request.metadata.unit_cost {
            validate_amount(cost).map_err(|m| AppError::validation("unit_cost", m))?;
        }

        let item = self
            .store
            .get_item(request.item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        let reject = |e: StockError| match e {
            StockError::Insufficient {
                requested,
                available,
            } => AppError::InsufficientStock {
                item: item.name.clone(),
                requested,
                available,
            },
            StockError::NonPositiveQuantity | StockError::Overflow => {
                AppError::validation("quantity", e.to_string())
            }
        };
        let change =
            plan_movement(item.current_stock, request.direction, quantity).map_err(reject)?;

        let metadata = request.metadata;
        let (unit_value, supplier) = match change.direction {
            MovementDirection::In => (
                metadata.unit_cost.unwrap_or(item.cost_price),
                non_empty(metadata.supplier).or_else(|| non_empty(Some(item.supplier.clone()))),
            ),
            MovementDirection::Out => (item.price, None),
        };
        // Nothing is written unless the ledger total is representable
        let total = change.total(unit_value).map_err(reject)?;

        let now = Utc::now();
        self.store
            .update_item(
                item.id,
                ItemPatch::stock_change(change.previous_stock, change.new_stock, now),
            )
            .await
            .map_err(|e| {
                tracing::debug!(item_id = %item.id, error = %e, "Stock write rejected");
                AppError::from(e)
            })?;

        let transaction = self
            .store
            .append_transaction(NewTransaction {
                direction: change.direction,
                item_id: item.id,
                item_name: item.name.clone(),
                item_code: item.product_code.clone(),
                quantity: change.quantity,
                unit_value,
                total,
                previous_stock: change.previous_stock,
                new_stock: change.new_stock,
                reference_number: metadata.reference_number,
                notes: metadata.notes,
                supplier,
                date: now,
                created_by: actor,
            })
            .await
            .map_err(|e| partial_write("stock movement", "item stock", e))?;

        let action = match change.direction {
            MovementDirection::In => ActivityAction::StockIn,
            MovementDirection::Out => ActivityAction::StockOut,
        };
        self.store
            .append_activity_log(NewActivityLog {
                action,
                details: describe_movement(change.direction, change.quantity, &item.name),
                timestamp: now,
                user_id: actor,
                item_id: Some(item.id),
            })
            .await
            .map_err(|e| partial_write("stock movement", "item stock and ledger entry", e))?;

        tracing::info!(
            item_id = %item.id,
            direction = %change.direction,
            quantity = change.quantity,
            new_stock = change.new_stock,
            "Stock movement applied"
        );

        Ok(transaction)
    }

    /// Remove a ledger entry. The item's stock is left as it is.
    pub async fn delete_movement(
        &self,
        transaction_id: Uuid,
        actor: Option<Uuid>,
    ) -> AppResult<Transaction> {
        let removed = self.store.delete_transaction(transaction_id).await?;

        self.store
            .append_activity_log(NewActivityLog {
                action: ActivityAction::Update,
                details: format!(
                    "Deleted {} record of {} units of {}",
                    removed.direction, removed.quantity, removed.item_name
                ),
                timestamp: Utc::now(),
                user_id: actor,
                item_id: Some(removed.item_id),
            })
            .await
            .map_err(|e| partial_write("ledger deletion", "ledger removal", e))?;

        tracing::info!(
            transaction_id = %removed.id,
            item_id = %removed.item_id,
            "Ledger entry deleted; stock unchanged"
        );

        Ok(removed)
    }

    /// Newest ledger entries first
    pub async fn recent_movements(&self, query: MovementListQuery) -> AppResult<Vec<Transaction>> {
        let limit = query
            .limit
            .unwrap_or(DEFAULT_RECENT_LIMIT)
            .clamp(1, MAX_RECENT_LIMIT);

        let transactions = self
            .store
            .query_transactions(&TransactionQuery {
                direction: query.direction,
                limit: Some(limit),
                ..TransactionQuery::default()
            })
            .await?;

        Ok(transactions)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

