use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::db::queries;
use crate::errors::AppError;
use crate::services::earnings::{self, EarningsSummary, TechnicianEarnings};
use crate::state::AppState;

use super::check_auth;

// GET /api/technicians/:id/earnings
pub async fn technician_earnings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<TechnicianEarnings>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let db = state.conn()?;
    if queries::get_technician(&db, &id)?.is_none() {
        return Err(AppError::NotFound(format!("technician {id}")));
    }

    Ok(Json(earnings::technician_earnings(&db, &id)?))
}

// GET /api/partners/:id/earnings
pub async fn partner_earnings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<EarningsSummary>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let db = state.conn()?;
    if queries::get_partner(&db, &id)?.is_none() {
        return Err(AppError::NotFound(format!("partner {id}")));
    }

    Ok(Json(earnings::partner_earnings(&db, &id)?))
}
