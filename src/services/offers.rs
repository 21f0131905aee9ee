use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::queries;
use crate::models::Offer;

/// Offers a customer can pick for `service_id` at `now`.
///
/// A store failure is logged and reported as "no offers"; callers cannot
/// tell the two apart.
pub fn get_applicable_offers(
    conn: &Connection,
    service_id: &str,
    is_new_user: bool,
    now: &NaiveDateTime,
) -> Vec<Offer> {
    match queries::get_active_offers(conn, service_id, now) {
        Ok(offers) => offers
            .into_iter()
            .filter(|offer| offer.is_eligible(is_new_user))
            .collect(),
        Err(e) => {
            tracing::error!(error = %e, service_id, "failed to fetch offers");
            vec![]
        }
    }
}

/// Looks up `offer_id` among the offers applicable right now.
pub fn find_applicable_offer(
    conn: &Connection,
    offer_id: &str,
    service_id: &str,
    is_new_user: bool,
    now: &NaiveDateTime,
) -> Option<Offer> {
    get_applicable_offers(conn, service_id, is_new_user, now)
        .into_iter()
        .find(|offer| offer.id == offer_id)
}

/// Whether the customer counts as new for offer eligibility. Guests never do.
pub fn is_new_user(
    conn: &Connection,
    customer_id: Option<&str>,
    now: &NaiveDateTime,
    window_days: i64,
) -> bool {
    let Some(customer_id) = customer_id else {
        return false;
    };

    match queries::get_customer(conn, customer_id) {
        Ok(Some(customer)) => customer.is_new(*now, window_days),
        Ok(None) => false,
        Err(e) => {
            tracing::warn!(error = %e, customer_id, "failed to load customer, treating as returning");
            false
        }
    }
}
