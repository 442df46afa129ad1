//! Activity trail listing

use shared::models::ActivityLog;
use shared::types::{PaginatedResponse, Pagination};

use crate::error::AppResult;
use crate::store::DynStore;

#[derive(Clone)]
pub struct ActivityService {
    store: DynStore,
}

impl ActivityService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// One page of activity, newest first
    pub async fn list(&self, pagination: &Pagination) -> AppResult<PaginatedResponse<ActivityLog>> {
        let pagination = pagination.normalized();
        let (data, total) = self.store.query_activity_logs(&pagination).await?;
        Ok(PaginatedResponse {
            data,
            pagination: pagination.meta(total),
        })
    }
}
