use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{
    Booking, BookingStatus, Commission, CommissionStatus, Offer, Payment, PaymentMethod,
    PaymentStatus,
};
use crate::services::matching;
use crate::services::pricing::{self, Discount};

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("service not found: {0}")]
    ServiceNotFound(String),

    #[error("booking not found: {0}")]
    BookingNotFound(String),

    #[error("commission not found: {0}")]
    CommissionNotFound(String),

    #[error("cannot move booking from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("booking {0} has no technician assigned")]
    Unassigned(String),

    #[error("commission {0} is already paid")]
    AlreadySettled(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for BookingError {
    fn from(err: rusqlite::Error) -> Self {
        BookingError::Store(err.into())
    }
}

/// A validated booking request.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: Option<String>,
    pub service_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub address: String,
    pub area: String,
    pub pincode: String,
    pub amount: f64,
    pub idempotency_key: Option<String>,
}

/// Creates a `Pending` booking with its pending cash payment.
///
/// The service lookup, technician match and all writes share one transaction:
/// either the booking and its payment both exist afterwards, or neither does.
/// Resubmitting with an idempotency key that was already used returns the
/// original booking without writing anything.
pub fn create_booking(
    conn: &mut Connection,
    request: &NewBooking,
    offer: Option<&Offer>,
    now: NaiveDateTime,
) -> Result<Booking, BookingError> {
    let tx = conn.transaction()?;

    if let Some(key) = request.idempotency_key.as_deref() {
        if let Some(existing) = queries::get_booking_by_idempotency_key(&tx, key)? {
            tracing::info!(booking_id = %existing.id, "duplicate booking submission, returning original");
            return Ok(existing);
        }
    }

    let service = queries::get_service(&tx, &request.service_id)?
        .ok_or_else(|| BookingError::ServiceNotFound(request.service_id.clone()))?;

    let technician =
        matching::find_available_technician(&tx, &request.area, &request.pincode, &service.category_id)?;

    let discount = match offer {
        Some(offer) => pricing::calculate_discount(request.amount, offer),
        None => Discount::none(request.amount),
    };

    let booking = Booking {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: request.user_id.clone(),
        technician_id: technician.map(|t| t.id),
        service_id: service.id,
        date: request.date,
        time: request.time,
        address: request.address.clone(),
        area: request.area.clone(),
        pincode: request.pincode.clone(),
        status: BookingStatus::Pending,
        amount: request.amount,
        discount_applied: offer.is_some(),
        discount_value: discount.discount_value,
        final_amount: Some(discount.final_amount),
        commission: Some(pricing::commission_for(discount.final_amount)),
        payment_method: Some(PaymentMethod::Cash),
        idempotency_key: request.idempotency_key.clone(),
        created_at: now,
        updated_at: now,
    };
    queries::insert_booking(&tx, &booking)?;

    queries::insert_payment(
        &tx,
        &Payment {
            id: uuid::Uuid::new_v4().to_string(),
            booking_id: booking.id.clone(),
            amount: discount.final_amount,
            payment_method: PaymentMethod::Cash,
            status: PaymentStatus::Pending,
            created_at: now,
        },
    )?;

    tx.commit()?;

    tracing::info!(
        booking_id = %booking.id,
        technician_id = ?booking.technician_id,
        final_amount = discount.final_amount,
        "booking created"
    );

    Ok(booking)
}

/// Moves a booking to `next`. Completion goes through [`complete_booking`].
pub fn update_status(
    conn: &Connection,
    booking_id: &str,
    next: BookingStatus,
    now: NaiveDateTime,
) -> Result<Booking, BookingError> {
    let mut booking = queries::get_booking_by_id(conn, booking_id)?
        .ok_or_else(|| BookingError::BookingNotFound(booking_id.to_string()))?;

    if next == BookingStatus::Completed || !booking.status.can_transition_to(next) {
        return Err(BookingError::InvalidTransition {
            from: booking.status,
            to: next,
        });
    }

    queries::update_booking_status(conn, booking_id, next, &now)?;
    tracing::info!(booking_id, from = %booking.status, to = %next, "booking status changed");

    booking.status = next;
    booking.updated_at = now;
    Ok(booking)
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Completion {
    pub booking: Booking,
    pub payment: Payment,
    pub commission: Commission,
}

/// Marks a job done: records the settled payment and the single commission
/// row the technician owes, all in one transaction.
pub fn complete_booking(
    conn: &mut Connection,
    booking_id: &str,
    method: PaymentMethod,
    now: NaiveDateTime,
) -> Result<Completion, BookingError> {
    let tx = conn.transaction()?;

    let mut booking = queries::get_booking_by_id(&tx, booking_id)?
        .ok_or_else(|| BookingError::BookingNotFound(booking_id.to_string()))?;

    if !booking.status.can_transition_to(BookingStatus::Completed) {
        return Err(BookingError::InvalidTransition {
            from: booking.status,
            to: BookingStatus::Completed,
        });
    }

    let technician_id = booking
        .technician_id
        .clone()
        .ok_or_else(|| BookingError::Unassigned(booking_id.to_string()))?;

    queries::mark_booking_completed(&tx, booking_id, method, &now)?;

    let billable = booking.billable_amount();

    let payment = Payment {
        id: uuid::Uuid::new_v4().to_string(),
        booking_id: booking_id.to_string(),
        amount: billable,
        payment_method: method,
        status: PaymentStatus::Success,
        created_at: now,
    };
    queries::insert_payment(&tx, &payment)?;

    let commission = Commission {
        id: uuid::Uuid::new_v4().to_string(),
        booking_id: booking_id.to_string(),
        technician_id,
        amount: pricing::commission_for(billable),
        status: CommissionStatus::Pending,
        payment_method: Some(method),
        created_at: now,
    };
    queries::insert_commission(&tx, &commission)?;

    tx.commit()?;

    tracing::info!(
        booking_id,
        technician_id = %commission.technician_id,
        commission = commission.amount,
        "booking completed"
    );

    booking.status = BookingStatus::Completed;
    booking.payment_method = Some(method);
    booking.updated_at = now;

    Ok(Completion {
        booking,
        payment,
        commission,
    })
}

/// Records that the technician has paid the platform its commission.
pub fn settle_commission(conn: &Connection, commission_id: &str) -> Result<Commission, BookingError> {
    let mut commission = queries::get_commission_by_id(conn, commission_id)?
        .ok_or_else(|| BookingError::CommissionNotFound(commission_id.to_string()))?;

    if commission.status == CommissionStatus::Paid {
        return Err(BookingError::AlreadySettled(commission_id.to_string()));
    }

    queries::update_commission_status(conn, commission_id, CommissionStatus::Paid)?;
    tracing::info!(commission_id, amount = commission.amount, "commission settled");

    commission.status = CommissionStatus::Paid;
    Ok(commission)
}
