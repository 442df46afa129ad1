//! Inventory item models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lenient;

/// Product categories offered by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Paint,
    Tools,
    Electrical,
    Plumbing,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Paint,
        Category::Tools,
        Category::Electrical,
        Category::Plumbing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Paint => "Paint",
            Category::Tools => "Tools",
            Category::Electrical => "Electrical",
            Category::Plumbing => "Plumbing",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("Unknown category: {}", trimmed))
    }
}

/// One stock-keeping unit.
///
/// Every field tolerates missing or malformed values when deserialized, so a
/// damaged record is still evaluated (at coerced values) instead of being
/// rejected. Low stock is derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default, deserialize_with = "lenient::text")]
    pub product_code: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::category")]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub current_stock: i64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub min_quantity: i64,
    /// Selling price per unit
    #[serde(default, deserialize_with = "lenient::amount")]
    pub price: Decimal,
    /// Purchase cost per unit
    #[serde(default, deserialize_with = "lenient::amount")]
    pub cost_price: Decimal,
    #[serde(default, deserialize_with = "lenient::text")]
    pub supplier: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub location: String,
    #[serde(default)]
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Value of the stock on hand at selling price, saturating at `Decimal::MAX`
    pub fn stock_value(&self) -> Decimal {
        Decimal::from(self.current_stock).saturating_mul(self.price)
    }

    /// Category label used for grouping
    pub fn category_label(&self) -> &'static str {
        self.category
            .map(|c| c.as_str())
            .unwrap_or(crate::reporting::UNCATEGORIZED)
    }
}

/// Input for adding an item to the catalogue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItemInput {
    pub product_code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Option<Category>,
    #[serde(default)]
    pub current_stock: i64,
    #[serde(default)]
    pub min_quantity: i64,
    pub price: Decimal,
    pub cost_price: Decimal,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub location: String,
}

/// Input for a direct edit of an item. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItemInput {
    pub product_code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` clears the category
    #[serde(
        default,
        with = "lenient::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Option<Category>>,
    pub current_stock: Option<i64>,
    pub min_quantity: Option<i64>,
    pub price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub supplier: Option<String>,
    pub location: Option<String>,
}

/// Partial write applied by the store to one item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub product_code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<Option<Category>>,
    pub current_stock: Option<i64>,
    pub min_quantity: Option<i64>,
    pub price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub supplier: Option<String>,
    pub location: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    /// Conditional write: the patch only applies while the stored stock
    /// still equals this value.
    pub expected_stock: Option<i64>,
}

impl ItemPatch {
    /// Stock update issued by a movement, guarded by the stock level it was computed from
    pub fn stock_change(previous_stock: i64, new_stock: i64, at: DateTime<Utc>) -> Self {
        Self {
            current_stock: Some(new_stock),
            last_updated: Some(at),
            expected_stock: Some(previous_stock),
            ..Self::default()
        }
    }

    /// Apply this patch onto an item in place
    pub fn apply_to(&self, item: &mut InventoryItem) {
        if let Some(v) = &self.product_code {
            item.product_code = v.clone();
        }
        if let Some(v) = &self.name {
            item.name = v.clone();
        }
        if let Some(v) = &self.description {
            item.description = v.clone();
        }
        if let Some(v) = self.category {
            item.category = v;
        }
        if let Some(v) = self.current_stock {
            item.current_stock = v;
        }
        if let Some(v) = self.min_quantity {
            item.min_quantity = v;
        }
        if let Some(v) = self.price {
            item.price = v;
        }
        if let Some(v) = self.cost_price {
            item.cost_price = v;
        }
        if let Some(v) = &self.supplier {
            item.supplier = v.clone();
        }
        if let Some(v) = &self.location {
            item.location = v.clone();
        }
        if let Some(v) = self.last_updated {
            item.last_updated = v;
        }
    }
}

impl From<UpdateItemInput> for ItemPatch {
    fn from(input: UpdateItemInput) -> Self {
        Self {
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
            last_updated: None,
            expected_stock: None,
        }
    }
}

/// Item search filter. An empty filter matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemFilter {
    /// Case-insensitive substring over name, product code and category
    pub search: Option<String>,
    pub category: Option<Category>,
    #[serde(default)]
    pub low_stock: bool,
}

impl ItemFilter {
    pub fn matches(&self, item: &InventoryItem) -> bool {
        if let Some(category) = self.category {
            if item.category != Some(category) {
                return false;
            }
        }
        if self.low_stock && !crate::low_stock::is_low_stock(item) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                item.name.to_lowercase().contains(&term)
                    || item.product_code.to_lowercase().contains(&term)
                    || item
                        .category
                        .map(|c| c.as_str().to_lowercase().contains(&term))
                        .unwrap_or(false)
            }
            _ => true,
        }
    }
}
