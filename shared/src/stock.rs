//! Stock movement arithmetic

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::MovementDirection;

/// The stock levels on either side of one accepted movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChange {
    pub direction: MovementDirection,
    pub quantity: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
}

impl StockChange {
    /// `quantity × unit_value`, or `Overflow` when the product is not representable
    pub fn total(&self, unit_value: Decimal) -> Result<Decimal, StockError> {
        Decimal::from(self.quantity)
            .checked_mul(unit_value)
            .ok_or(StockError::Overflow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("Quantity must be greater than zero")]
    NonPositiveQuantity,
    #[error("Insufficient stock: requested {requested}, available {available}")]
    Insufficient { requested: i64, available: i64 },
    #[error("Stock level or movement value would overflow")]
    Overflow,
}

/// Compute the result of moving `quantity` units in `direction` from `current_stock`.
///
/// Stock out may drain an item to exactly zero but never below it.
pub fn plan_movement(
    current_stock: i64,
    direction: MovementDirection,
    quantity: i64,
) -> Result<StockChange, StockError> {
    if quantity <= 0 {
        return Err(StockError::NonPositiveQuantity);
    }

    let new_stock = match direction {
        MovementDirection::In => current_stock
            .checked_add(quantity)
            .ok_or(StockError::Overflow)?,
        MovementDirection::Out => {
            if quantity > current_stock {
                return Err(StockError::Insufficient {
                    requested: quantity,
                    available: current_stock,
                });
            }
            current_stock - quantity
        }
    };

    Ok(StockChange {
        direction,
        quantity,
        previous_stock: current_stock,
        new_stock,
    })
}

/// Human-readable activity line for a movement
pub fn describe_movement(direction: MovementDirection, quantity: i64, item_name: &str) -> String {
    match direction {
        MovementDirection::In => format!("Added {} units of {}", quantity, item_name),
        MovementDirection::Out => format!("Removed {} units of {}", quantity, item_name),
    }
}
