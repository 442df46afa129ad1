//! Activity log models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of audited actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    StockIn,
    StockOut,
    Create,
    Update,
    Delete,
    Login,
    Logout,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::StockIn => "STOCK_IN",
            ActivityAction::StockOut => "STOCK_OUT",
            ActivityAction::Create => "CREATE",
            ActivityAction::Update => "UPDATE",
            ActivityAction::Delete => "DELETE",
            ActivityAction::Login => "LOGIN",
            ActivityAction::Logout => "LOGOUT",
        }
    }
}

impl std::str::FromStr for ActivityAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STOCK_IN" => Ok(ActivityAction::StockIn),
            "STOCK_OUT" => Ok(ActivityAction::StockOut),
            "CREATE" => Ok(ActivityAction::Create),
            "UPDATE" => Ok(ActivityAction::Update),
            "DELETE" => Ok(ActivityAction::Delete),
            "LOGIN" => Ok(ActivityAction::Login),
            "LOGOUT" => Ok(ActivityAction::Logout),
            other => Err(format!("Unknown activity action: {}", other)),
        }
    }
}

/// An audit trail entry. Written by business logic, only ever read for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: Uuid,
    pub action: ActivityAction,
    pub details: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivityLog {
    pub action: ActivityAction,
    pub details: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
}

impl NewActivityLog {
    pub fn into_log(self, id: Uuid) -> ActivityLog {
        ActivityLog {
            id,
            action: self.action,
            details: self.details,
            timestamp: self.timestamp,
            user_id: self.user_id,
            item_id: self.item_id,
        }
    }
}
