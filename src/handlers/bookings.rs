use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{
    Booking, BookingStatus, Commission, Payment, PaymentMethod, DATE_FORMAT, TIME_FORMAT,
};
use crate::services::booking::{self, Completion, NewBooking};
use crate::services::offers;
use crate::services::pricing::MAX_AMOUNT;
use crate::state::AppState;

use super::check_auth;

// POST /api/bookings
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub user_id: Option<String>,
    pub service_id: String,
    pub date: String,
    pub time: String,
    pub address: String,
    pub area: String,
    pub pincode: String,
    /// Defaults to the service's listed rate.
    pub amount: Option<f64>,
    pub offer_id: Option<String>,
    pub idempotency_key: Option<String>,
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn validate(body: &CreateBookingRequest, amount: f64) -> Result<NewBooking, AppError> {
    let date = NaiveDate::parse_from_str(body.date.trim(), DATE_FORMAT)
        .map_err(|_| AppError::Validation(format!("invalid date: {}", body.date)))?;
    let time = NaiveTime::parse_from_str(body.time.trim(), TIME_FORMAT)
        .map_err(|_| AppError::Validation(format!("invalid time: {}", body.time)))?;

    if !amount.is_finite() || amount < 0.0 {
        return Err(AppError::Validation(format!("invalid amount: {amount}")));
    }
    if amount > MAX_AMOUNT {
        return Err(AppError::Validation(format!(
            "amount exceeds maximum allowed ({MAX_AMOUNT}), got {amount}"
        )));
    }

    Ok(NewBooking {
        user_id: body
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        service_id: required("service_id", &body.service_id)?,
        date,
        time,
        address: required("address", &body.address)?,
        area: required("area", &body.area)?,
        pincode: required("pincode", &body.pincode)?,
        amount,
        idempotency_key: idempotency_key(body),
    })
}

fn idempotency_key(body: &CreateBookingRequest) -> Option<String> {
    body.idempotency_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(mut body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    if body.idempotency_key.is_none() {
        body.idempotency_key = headers
            .get("idempotency-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
    }

    let now = chrono::Utc::now().naive_utc();
    let mut db = state.conn()?;

    // A replay returns the stored booking as-is, even if its offer has since
    // lapsed or the customer has aged out of the new-user window.
    if let Some(key) = idempotency_key(&body) {
        if let Some(existing) = queries::get_booking_by_idempotency_key(&db, &key)? {
            tracing::info!(booking_id = %existing.id, "duplicate booking submission, returning original");
            return Ok((StatusCode::OK, Json(existing)));
        }
    }

    let amount = match body.amount {
        Some(amount) => amount,
        None => {
            queries::get_service(&db, body.service_id.trim())?
                .ok_or_else(|| AppError::NotFound(format!("service {}", body.service_id)))?
                .rate
        }
    };
    let request = validate(&body, amount)?;

    let offer = match body.offer_id.as_deref() {
        Some(offer_id) => {
            let is_new = offers::is_new_user(
                &db,
                request.user_id.as_deref(),
                &now,
                state.config.new_user_window_days,
            );
            let offer = offers::find_applicable_offer(&db, offer_id, &request.service_id, is_new, &now)
                .ok_or_else(|| {
                    AppError::Validation(format!("offer {offer_id} is not available for this booking"))
                })?;
            Some(offer)
        }
        None => None,
    };

    let booking = booking::create_booking(&mut db, &request, offer.as_ref(), now)?;
    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/bookings/:id
#[derive(Serialize)]
pub struct BookingDetailResponse {
    booking: Booking,
    payments: Vec<Payment>,
    commissions: Vec<Commission>,
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BookingDetailResponse>, AppError> {
    let db = state.conn()?;

    let booking = queries::get_booking_by_id(&db, &id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;
    let payments = queries::get_payments_for_booking(&db, &id)?;
    let commissions = queries::get_commissions_for_booking(&db, &id)?;

    Ok(Json(BookingDetailResponse {
        booking,
        payments,
        commissions,
    }))
}

// POST /api/bookings/:id/status
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let next = BookingStatus::parse(body.status.trim())
        .ok_or_else(|| AppError::Validation(format!("unknown status: {}", body.status)))?;

    let db = state.conn()?;
    let booking = booking::update_status(&db, &id, next, chrono::Utc::now().naive_utc())?;
    Ok(Json(booking))
}

// POST /api/bookings/:id/complete
#[derive(Deserialize)]
pub struct CompleteRequest {
    pub payment_method: Option<String>,
}

pub async fn complete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<CompleteRequest>,
) -> Result<Json<Completion>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let method = match body.payment_method.as_deref() {
        Some(m) => PaymentMethod::parse(m.trim())
            .ok_or_else(|| AppError::Validation(format!("unknown payment method: {m}")))?,
        None => PaymentMethod::default(),
    };

    let mut db = state.conn()?;
    let completion = booking::complete_booking(&mut db, &id, method, chrono::Utc::now().naive_utc())?;
    Ok(Json(completion))
}

// POST /api/commissions/:id/settle
pub async fn settle_commission(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Commission>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let db = state.conn()?;
    let commission = booking::settle_commission(&db, &id)?;
    Ok(Json(commission))
}
