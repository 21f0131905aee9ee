use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{DocumentKind, TechnicianDocument};
use crate::services::documents;
use crate::state::AppState;

use super::check_auth;

#[derive(Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

// POST /api/technicians/:id/documents/:kind
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((technician_id, kind)): Path<(String, String)>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<(StatusCode, Json<TechnicianDocument>), AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let kind = DocumentKind::parse(&kind)
        .ok_or_else(|| AppError::Validation(format!("unknown document kind: {kind}")))?;

    let document = documents::upload_technician_document(
        &state,
        &technician_id,
        kind,
        query.filename.as_deref(),
        &body,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(document)))
}
