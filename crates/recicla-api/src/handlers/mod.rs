//! API handlers

pub mod auth;
pub mod health;
pub mod institutional;
pub mod recycling;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `{"detail": "..."}` body returned by logout and deletes
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DetailResponse {
    pub detail: String,
}

impl DetailResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
