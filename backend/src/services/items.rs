//! Catalogue administration: item listing, search and direct edits

use chrono::Utc;
use uuid::Uuid;

use shared::low_stock::derive_low_stock;
use shared::models::{
    ActivityAction, CreateItemInput, InventoryItem, ItemFilter, ItemPatch, NewActivityLog,
    UpdateItemInput,
};
use shared::validation::{
    validate_amount, validate_item_name, validate_product_code, validate_stock_level,
};

use crate::error::{AppError, AppResult};
use crate::services::partial_write;
use crate::store::DynStore;

#[derive(Clone)]
pub struct ItemService {
    store: DynStore,
}

impl ItemService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    pub async fn list(&self, filter: &ItemFilter) -> AppResult<Vec<InventoryItem>> {
        Ok(self.store.query_items(filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<InventoryItem> {
        self.store
            .get_item(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))
    }

    /// Items at or below their minimum quantity, in catalogue order
    pub async fn low_stock(&self) -> AppResult<Vec<InventoryItem>> {
        let items = self.store.query_items(&ItemFilter::default()).await?;
        Ok(derive_low_stock(&items).into_iter().cloned().collect())
    }

    pub async fn create(
        &self,
        mut input: CreateItemInput,
        actor: Option<Uuid>,
    ) -> AppResult<InventoryItem> {
        input.product_code = input.product_code.trim().to_string();
        input.name = input.name.trim().to_string();

        validate_product_code(&input.product_code)
            .map_err(|m| AppError::validation("product_code", m))?;
        validate_item_name(&input.name).map_err(|m| AppError::validation("name", m))?;
        validate_stock_level(input.current_stock)
            .map_err(|m| AppError::validation("current_stock", m))?;
        validate_stock_level(input.min_quantity)
            .map_err(|m| AppError::validation("min_quantity", m))?;
        validate_amount(input.price).map_err(|m| AppError::validation("price", m))?;
        validate_amount(input.cost_price).map_err(|m| AppError::validation("cost_price", m))?;

        if self
            .store
            .find_item_by_code(&input.product_code)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateEntry("product_code".to_string()));
        }

        let item = self.store.insert_item(input, Utc::now()).await?;

        self.log(
            ActivityAction::Create,
            format!("Created item {} ({})", item.name, item.product_code),
            actor,
            item.id,
        )
        .await
        .map_err(|e| partial_write("item creation", "item", e))?;

        tracing::info!(item_id = %item.id, product_code = %item.product_code, "Item created");
        Ok(item)
    }

    /// Direct edit. A stock level set here bypasses the ledger.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateItemInput,
        actor: Option<Uuid>,
    ) -> AppResult<InventoryItem> {
        let mut patch = ItemPatch::from(input);

        if let Some(code) = patch.product_code.as_mut() {
            *code = code.trim().to_string();
            validate_product_code(code).map_err(|m| AppError::validation("product_code", m))?;
        }
        if let Some(name) = patch.name.as_mut() {
            *name = name.trim().to_string();
            validate_item_name(name).map_err(|m| AppError::validation("name", m))?;
        }
        if let Some(level) = patch.current_stock {
            validate_stock_level(level).map_err(|m| AppError::validation("current_stock", m))?;
        }
        if let Some(level) = patch.min_quantity {
            validate_stock_level(level).map_err(|m| AppError::validation("min_quantity", m))?;
        }
        if let Some(amount) = patch.price {
            validate_amount(amount).map_err(|m| AppError::validation("price", m))?;
        }
        if let Some(amount) = patch.cost_price {
            validate_amount(amount).map_err(|m| AppError::validation("cost_price", m))?;
        }

        if let Some(code) = &patch.product_code {
            if let Some(existing) = self.store.find_item_by_code(code).await? {
                if existing.id != id {
                    return Err(AppError::DuplicateEntry("product_code".to_string()));
                }
            }
        }

        patch.last_updated = Some(Utc::now());
        let item = self.store.update_item(id, patch).await?;

        self.log(
            ActivityAction::Update,
            format!("Updated item {}", item.name),
            actor,
            item.id,
        )
        .await
        .map_err(|e| partial_write("item update", "item", e))?;

        Ok(item)
    }

    /// Remove an item. Refused while ledger entries still reference it.
    pub async fn delete(&self, id: Uuid, actor: Option<Uuid>) -> AppResult<InventoryItem> {
        let item = self.store.delete_item(id).await?;

        self.log(
            ActivityAction::Delete,
            format!("Deleted item {} ({})", item.name, item.product_code),
            actor,
            item.id,
        )
        .await
        .map_err(|e| partial_write("item deletion", "item removal", e))?;

        tracing::info!(item_id = %item.id, "Item deleted");
        Ok(item)
    }

    async fn log(
        &self,
        action: ActivityAction,
        details: String,
        actor: Option<Uuid>,
        item_id: Uuid,
    ) -> Result<(), crate::store::StoreError> {
        self.store
            .append_activity_log(NewActivityLog {
                action,
                details,
                timestamp: Utc::now(),
                user_id: actor,
                item_id: Some(item_id),
            })
            .await?;
        Ok(())
    }
}
