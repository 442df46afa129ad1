//! Stock movement ledger models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::QuantityInput;

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementDirection {
    In,
    Out,
}

impl MovementDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementDirection::In => "IN",
            MovementDirection::Out => "OUT",
        }
    }
}

impl std::fmt::Display for MovementDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MovementDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IN" => Ok(MovementDirection::In),
            "OUT" => Ok(MovementDirection::Out),
            other => Err(format!("Unknown movement direction: {}", other)),
        }
    }
}

/// A ledger entry recording one stock movement.
///
/// `item_name` and `item_code` are snapshots taken when the movement was
/// recorded; they are not refreshed if the item is renamed later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub direction: MovementDirection,
    pub item_id: Uuid,
    pub item_name: String,
    pub item_code: String,
    pub quantity: i64,
    /// Unit cost for IN, unit price for OUT
    pub unit_value: Decimal,
    pub total: Decimal,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub reference_number: String,
    pub notes: String,
    pub supplier: Option<String>,
    pub date: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

/// A ledger entry before the store assigns its identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub direction: MovementDirection,
    pub item_id: Uuid,
    pub item_name: String,
    pub item_code: String,
    pub quantity: i64,
    pub unit_value: Decimal,
    pub total: Decimal,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub reference_number: String,
    pub notes: String,
    pub supplier: Option<String>,
    pub date: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

impl NewTransaction {
    pub fn into_transaction(self, id: Uuid) -> Transaction {
        Transaction {
            id,
            direction: self.direction,
            item_id: self.item_id,
            item_name: self.item_name,
            item_code: self.item_code,
            quantity: self.quantity,
            unit_value: self.unit_value,
            total: self.total,
            previous_stock: self.previous_stock,
            new_stock: self.new_stock,
            reference_number: self.reference_number,
            notes: self.notes,
            supplier: self.supplier,
            date: self.date,
            created_by: self.created_by,
        }
    }
}

/// Request to move stock in or out of one item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementRequest {
    pub item_id: Uuid,
    #[serde(rename = "type")]
    pub direction: MovementDirection,
    /// Raw quantity as submitted; validated by the movement engine
    pub quantity: QuantityInput,
    #[serde(flatten)]
    pub metadata: MovementMetadata,
}

/// Free-form details attached to a movement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovementMetadata {
    #[serde(default)]
    pub reference_number: String,
    #[serde(default)]
    pub notes: String,
    /// Supplier the goods came from (stock in only)
    pub supplier: Option<String>,
    /// Purchase cost per unit (stock in only). Defaults to the item's cost price.
    pub unit_cost: Option<Decimal>,
}

/// Ledger query; all parts are optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionQuery {
    #[serde(rename = "type")]
    pub direction: Option<MovementDirection>,
    /// Inclusive lower bound on `date`
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `date`
    pub until: Option<DateTime<Utc>>,
    pub item_id: Option<Uuid>,
    pub limit: Option<usize>,
}

impl TransactionQuery {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.direction.map_or(true, |d| transaction.direction == d)
            && self.from.map_or(true, |from| transaction.date >= from)
            && self.until.map_or(true, |until| transaction.date < until)
            && self.item_id.map_or(true, |id| transaction.item_id == id)
    }
}
