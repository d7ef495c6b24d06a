use std::sync::Arc;

use serde::Serialize;

use crate::services::{composer::PlanComposer, place_service::Geocoder};

pub mod health;
pub mod hotel;
pub mod modify;
pub mod plan;
pub mod progress;

/// Shared handler state. The geocoder is optional; without it plans are
/// served without place enrichment.
#[derive(Clone)]
pub struct AppState {
    pub composer: Arc<dyn PlanComposer>,
    pub geocoder: Option<Arc<dyn Geocoder>>,
}

/// Error body shape shared by all endpoints: `{"detail": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
