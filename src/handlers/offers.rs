use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Offer;
use crate::services::offers;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct OffersQuery {
    pub customer_id: Option<String>,
}

// GET /api/services/:id/offers
pub async fn list_offers(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<String>,
    Query(query): Query<OffersQuery>,
) -> Result<Json<Vec<Offer>>, AppError> {
    let now = chrono::Utc::now().naive_utc();
    let db = state.conn()?;

    if queries::get_service(&db, &service_id)?.is_none() {
        return Err(AppError::NotFound(format!("service {service_id}")));
    }

    let is_new = offers::is_new_user(
        &db,
        query.customer_id.as_deref(),
        &now,
        state.config.new_user_window_days,
    );

    Ok(Json(offers::get_applicable_offers(&db, &service_id, is_new, &now)))
}
