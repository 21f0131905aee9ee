use anyhow::{anyhow, Context};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{
    Booking, BookingStatus, Commission, CommissionStatus, Customer, DiscountType, DocumentKind,
    Offer, OfferEligibility, OfferStatus, Partner, Payment, PaymentMethod, PaymentStatus, Service,
    Technician, TechnicianDocument, VerificationStatus, DATETIME_FORMAT, DATE_FORMAT, TIME_FORMAT,
};

fn fmt_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

fn parse_datetime(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .with_context(|| format!("invalid timestamp in database: {s}"))
}

fn parse_payment_method(s: Option<String>) -> anyhow::Result<Option<PaymentMethod>> {
    s.map(|m| PaymentMethod::parse(&m).ok_or_else(|| anyhow!("unknown payment method: {m}")))
        .transpose()
}

// ── Services ──

pub fn insert_service(conn: &Connection, service: &Service) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO services (id, name, description, rate, duration_minutes, category_id, partner_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            service.id,
            service.name,
            service.description,
            service.rate,
            service.duration_minutes,
            service.category_id,
            service.partner_id,
        ],
    )?;
    Ok(())
}

pub fn get_service(conn: &Connection, id: &str) -> anyhow::Result<Option<Service>> {
    let service = conn
        .query_row(
            "SELECT id, name, description, rate, duration_minutes, category_id, partner_id
             FROM services WHERE id = ?1",
            params![id],
            |row| {
                Ok(Service {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    rate: row.get(3)?,
                    duration_minutes: row.get(4)?,
                    category_id: row.get(5)?,
                    partner_id: row.get(6)?,
                })
            },
        )
        .optional()?;
    Ok(service)
}

// ── Partners ──

pub fn insert_partner(conn: &Connection, partner: &Partner) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO partners (id, name, shop_name) VALUES (?1, ?2, ?3)",
        params![partner.id, partner.name, partner.shop_name],
    )?;
    Ok(())
}

pub fn get_partner(conn: &Connection, id: &str) -> anyhow::Result<Option<Partner>> {
    let partner = conn
        .query_row(
            "SELECT id, name, shop_name FROM partners WHERE id = ?1",
            params![id],
            |row| {
                Ok(Partner {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    shop_name: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(partner)
}

// ── Customers ──

pub fn insert_customer(conn: &Connection, customer: &Customer) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO customers (id, name, created_at) VALUES (?1, ?2, ?3)",
        params![customer.id, customer.name, fmt_datetime(&customer.created_at)],
    )?;
    Ok(())
}

pub fn get_customer(conn: &Connection, id: &str) -> anyhow::Result<Option<Customer>> {
    let row = conn
        .query_row(
            "SELECT id, name, created_at FROM customers WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    row.map(|(id, name, created_at)| {
        Ok(Customer {
            id,
            name,
            created_at: parse_datetime(&created_at)?,
        })
    })
    .transpose()
}

// ── Offers ──

pub fn insert_offer(conn: &Connection, offer: &Offer) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO offers (id, name, description, discount_type, discount_value, valid_for, service_id, start_date, end_date, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            offer.id,
            offer.name,
            offer.description,
            offer.discount_type.as_str(),
            offer.discount_value,
            offer.valid_for.as_str(),
            offer.service_id,
            fmt_datetime(&offer.start_date),
            fmt_datetime(&offer.end_date),
            offer.status.as_str(),
        ],
    )?;
    Ok(())
}

/// Active offers whose window contains `now` (inclusive on both ends) and
/// that either target `service_id` or every service.
pub fn get_active_offers(
    conn: &Connection,
    service_id: &str,
    now: &NaiveDateTime,
) -> anyhow::Result<Vec<Offer>> {
    let now = fmt_datetime(now);
    let mut stmt = conn.prepare(
        "SELECT id, name, description, discount_type, discount_value, valid_for, service_id, start_date, end_date, status
         FROM offers
         WHERE status = 'Active' AND start_date <= ?1 AND end_date >= ?1
           AND (service_id = ?2 OR service_id IS NULL)",
    )?;

    let rows = stmt.query_map(params![now, service_id], |row| Ok(parse_offer_row(row)))?;

    let mut offers = vec![];
    for row in rows {
        offers.push(row??);
    }
    Ok(offers)
}

fn parse_offer_row(row: &rusqlite::Row) -> anyhow::Result<Offer> {
    let discount_type: String = row.get(3)?;
    let valid_for: String = row.get(5)?;
    let start_date: String = row.get(7)?;
    let end_date: String = row.get(8)?;
    let status: String = row.get(9)?;

    Ok(Offer {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        discount_type: DiscountType::parse(&discount_type),
        discount_value: row.get(4)?,
        valid_for: OfferEligibility::parse(&valid_for)
            .ok_or_else(|| anyhow!("unknown offer eligibility: {valid_for}"))?,
        service_id: row.get(6)?,
        start_date: parse_datetime(&start_date)?,
        end_date: parse_datetime(&end_date)?,
        status: OfferStatus::parse(&status),
    })
}

// ── Technicians ──

const TECHNICIAN_COLUMNS: &str =
    "id, name, area, pincode, category_id, availability, rating, verification_status, created_at";

pub fn insert_technician(conn: &Connection, technician: &Technician) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO technicians (id, name, area, pincode, category_id, availability, rating, verification_status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            technician.id,
            technician.name,
            technician.area,
            technician.pincode,
            technician.category_id,
            technician.availability,
            technician.rating,
            technician.verification_status.as_str(),
            fmt_datetime(&technician.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_technician(conn: &Connection, id: &str) -> anyhow::Result<Option<Technician>> {
    let sql = format!("SELECT {TECHNICIAN_COLUMNS} FROM technicians WHERE id = ?1");
    let technician = conn
        .query_row(&sql, params![id], |row| Ok(parse_technician_row(row)))
        .optional()?;
    technician.transpose()
}

/// First available technician in `category_id` whose area contains `area`
/// (case-insensitive) or whose pincode equals `pincode`. An empty `area` or
/// `pincode` matches nothing.
///
/// Ties go to the highest rating (unrated last), then the longest-registered
/// technician, then the smallest id, so the same inputs always pick the same
/// technician.
pub fn find_matching_technician(
    conn: &Connection,
    area: &str,
    pincode: &str,
    category_id: &str,
) -> anyhow::Result<Option<Technician>> {
    let sql = format!(
        "SELECT {TECHNICIAN_COLUMNS} FROM technicians
         WHERE availability = 1 AND category_id = ?1
           AND ((?2 <> '' AND instr(lower(area), lower(?2)) > 0) OR (?3 <> '' AND pincode = ?3))
         ORDER BY rating DESC NULLS LAST, created_at ASC, id ASC
         LIMIT 1"
    );
    let technician = conn
        .query_row(&sql, params![category_id, area, pincode], |row| {
            Ok(parse_technician_row(row))
        })
        .optional()?;
    technician.transpose()
}

fn parse_technician_row(row: &rusqlite::Row) -> anyhow::Result<Technician> {
    let verification_status: String = row.get(7)?;
    let created_at: String = row.get(8)?;

    Ok(Technician {
        id: row.get(0)?,
        name: row.get(1)?,
        area: row.get(2)?,
        pincode: row.get(3)?,
        category_id: row.get(4)?,
        availability: row.get(5)?,
        rating: row.get(6)?,
        verification_status: VerificationStatus::parse(&verification_status),
        created_at: parse_datetime(&created_at)?,
    })
}

pub fn insert_technician_document(
    conn: &Connection,
    document: &TechnicianDocument,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO technician_documents (id, technician_id, kind, url, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            document.id,
            document.technician_id,
            document.kind.as_str(),
            document.url,
            fmt_datetime(&document.uploaded_at),
        ],
    )?;
    Ok(())
}

pub fn get_technician_documents(
    conn: &Connection,
    technician_id: &str,
) -> anyhow::Result<Vec<TechnicianDocument>> {
    let mut stmt = conn.prepare(
        "SELECT id, technician_id, kind, url, uploaded_at
         FROM technician_documents WHERE technician_id = ?1 ORDER BY uploaded_at ASC",
    )?;

    let rows = stmt.query_map(params![technician_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut documents = vec![];
    for row in rows {
        let (id, technician_id, kind, url, uploaded_at) = row?;
        documents.push(TechnicianDocument {
            id,
            technician_id,
            kind: DocumentKind::parse(&kind)
                .ok_or_else(|| anyhow!("unknown document kind: {kind}"))?,
            url,
            uploaded_at: parse_datetime(&uploaded_at)?,
        });
    }
    Ok(documents)
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "id, user_id, technician_id, service_id, date, time, address, area, pincode, status, \
     amount, discount_applied, discount_value, final_amount, commission, payment_method, idempotency_key, \
     created_at, updated_at";

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, user_id, technician_id, service_id, date, time, address, area, pincode, status,
                               amount, discount_applied, discount_value, final_amount, commission, payment_method,
                               idempotency_key, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
        params![
            booking.id,
            booking.user_id,
            booking.technician_id,
            booking.service_id,
            booking.date.format(DATE_FORMAT).to_string(),
            booking.time.format(TIME_FORMAT).to_string(),
            booking.address,
            booking.area,
            booking.pincode,
            booking.status.as_str(),
            booking.amount,
            booking.discount_applied,
            booking.discount_value,
            booking.final_amount,
            booking.commission,
            booking.payment_method.map(|m| m.as_str()),
            booking.idempotency_key,
            fmt_datetime(&booking.created_at),
            fmt_datetime(&booking.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");
    let booking = conn
        .query_row(&sql, params![id], |row| Ok(parse_booking_row(row)))
        .optional()?;
    booking.transpose()
}

pub fn get_booking_by_idempotency_key(
    conn: &Connection,
    key: &str,
) -> anyhow::Result<Option<Booking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE idempotency_key = ?1");
    let booking = conn
        .query_row(&sql, params![key], |row| Ok(parse_booking_row(row)))
        .optional()?;
    booking.transpose()
}

pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: BookingStatus,
    now: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), fmt_datetime(now), id],
    )?;
    Ok(count > 0)
}

pub fn mark_booking_completed(
    conn: &Connection,
    id: &str,
    method: PaymentMethod,
    now: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, payment_method = ?2, updated_at = ?3 WHERE id = ?4",
        params![
            BookingStatus::Completed.as_str(),
            method.as_str(),
            fmt_datetime(now),
            id
        ],
    )?;
    Ok(count > 0)
}

pub fn get_completed_bookings_for_technician(
    conn: &Connection,
    technician_id: &str,
) -> anyhow::Result<Vec<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE technician_id = ?1 AND status = 'Completed' ORDER BY date ASC"
    );
    query_bookings(conn, &sql, params![technician_id])
}

pub fn get_completed_bookings_for_partner(
    conn: &Connection,
    partner_id: &str,
) -> anyhow::Result<Vec<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE status = 'Completed'
           AND service_id IN (SELECT id FROM services WHERE partner_id = ?1)
         ORDER BY date ASC"
    );
    query_bookings(conn, &sql, params![partner_id])
}

fn query_bookings(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let date_str: String = row.get(4)?;
    let time_str: String = row.get(5)?;
    let status_str: String = row.get(9)?;
    let payment_method: Option<String> = row.get(15)?;
    let created_at_str: String = row.get(17)?;
    let updated_at_str: String = row.get(18)?;

    Ok(Booking {
        id: row.get(0)?,
        user_id: row.get(1)?,
        technician_id: row.get(2)?,
        service_id: row.get(3)?,
        date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
            .with_context(|| format!("invalid booking date: {date_str}"))?,
        time: NaiveTime::parse_from_str(&time_str, TIME_FORMAT)
            .with_context(|| format!("invalid booking time: {time_str}"))?,
        address: row.get(6)?,
        area: row.get(7)?,
        pincode: row.get(8)?,
        status: BookingStatus::parse(&status_str)
            .ok_or_else(|| anyhow!("unknown booking status: {status_str}"))?,
        amount: row.get(10)?,
        discount_applied: row.get(11)?,
        discount_value: row.get(12)?,
        final_amount: row.get(13)?,
        commission: row.get(14)?,
        payment_method: parse_payment_method(payment_method)?,
        idempotency_key: row.get(16)?,
        created_at: parse_datetime(&created_at_str)?,
        updated_at: parse_datetime(&updated_at_str)?,
    })
}

// ── Payments ──

pub fn insert_payment(conn: &Connection, payment: &Payment) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO payments (id, booking_id, amount, payment_method, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            payment.id,
            payment.booking_id,
            payment.amount,
            payment.payment_method.as_str(),
            payment.status.as_str(),
            fmt_datetime(&payment.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_payments_for_booking(
    conn: &Connection,
    booking_id: &str,
) -> anyhow::Result<Vec<Payment>> {
    let mut stmt = conn.prepare(
        "SELECT id, booking_id, amount, payment_method, status, created_at
         FROM payments WHERE booking_id = ?1 ORDER BY created_at ASC, rowid ASC",
    )?;

    let rows = stmt.query_map(params![booking_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, f64>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut payments = vec![];
    for row in rows {
        let (id, booking_id, amount, method, status, created_at) = row?;
        payments.push(Payment {
            id,
            booking_id,
            amount,
            payment_method: PaymentMethod::parse(&method)
                .ok_or_else(|| anyhow!("unknown payment method: {method}"))?,
            status: PaymentStatus::parse(&status)
                .ok_or_else(|| anyhow!("unknown payment status: {status}"))?,
            created_at: parse_datetime(&created_at)?,
        });
    }
    Ok(payments)
}

// ── Commissions ──

const COMMISSION_COLUMNS: &str =
    "id, booking_id, technician_id, amount, status, payment_method, created_at";

pub fn insert_commission(conn: &Connection, commission: &Commission) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO commissions (id, booking_id, technician_id, amount, status, payment_method, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            commission.id,
            commission.booking_id,
            commission.technician_id,
            commission.amount,
            commission.status.as_str(),
            commission.payment_method.map(|m| m.as_str()),
            fmt_datetime(&commission.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_commission_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Commission>> {
    let sql = format!("SELECT {COMMISSION_COLUMNS} FROM commissions WHERE id = ?1");
    let commission = conn
        .query_row(&sql, params![id], |row| Ok(parse_commission_row(row)))
        .optional()?;
    commission.transpose()
}

pub fn get_commissions_for_technician(
    conn: &Connection,
    technician_id: &str,
) -> anyhow::Result<Vec<Commission>> {
    let sql = format!(
        "SELECT {COMMISSION_COLUMNS} FROM commissions WHERE technician_id = ?1 ORDER BY created_at ASC"
    );
    query_commissions(conn, &sql, params![technician_id])
}

pub fn get_commissions_for_booking(
    conn: &Connection,
    booking_id: &str,
) -> anyhow::Result<Vec<Commission>> {
    let sql = format!(
        "SELECT {COMMISSION_COLUMNS} FROM commissions WHERE booking_id = ?1 ORDER BY created_at ASC"
    );
    query_commissions(conn, &sql, params![booking_id])
}

pub fn update_commission_status(
    conn: &Connection,
    id: &str,
    status: CommissionStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE commissions SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(count > 0)
}

fn query_commissions(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> anyhow::Result<Vec<Commission>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| Ok(parse_commission_row(row)))?;

    let mut commissions = vec![];
    for row in rows {
        commissions.push(row??);
    }
    Ok(commissions)
}

fn parse_commission_row(row: &rusqlite::Row) -> anyhow::Result<Commission> {
    let status: String = row.get(4)?;
    let payment_method: Option<String> = row.get(5)?;
    let created_at: String = row.get(6)?;

    Ok(Commission {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        technician_id: row.get(2)?,
        amount: row.get(3)?,
        status: CommissionStatus::parse(&status)
            .ok_or_else(|| anyhow!("unknown commission status: {status}"))?,
        payment_method: parse_payment_method(payment_method)?,
        created_at: parse_datetime(&created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).unwrap()
    }

    fn technician(id: &str, area: &str, pincode: &str, rating: Option<f64>) -> Technician {
        Technician {
            id: id.to_string(),
            name: format!("Tech {id}"),
            area: area.to_string(),
            pincode: pincode.to_string(),
            category_id: "plumbing".to_string(),
            availability: true,
            rating,
            verification_status: VerificationStatus::Verified,
            created_at: dt("2024-01-01 09:00:00"),
        }
    }

    #[test]
    fn test_service_round_trip() {
        let conn = db::init_db(":memory:").unwrap();
        let service = Service {
            id: "svc-1".to_string(),
            name: "Tap repair".to_string(),
            description: "Fix leaking taps".to_string(),
            rate: 349.0,
            duration_minutes: 45,
            category_id: "plumbing".to_string(),
            partner_id: None,
        };
        insert_service(&conn, &service).unwrap();

        let loaded = get_service(&conn, "svc-1").unwrap().unwrap();
        assert_eq!(loaded.category_id, "plumbing");
        assert_eq!(loaded.rate, 349.0);
        assert!(get_service(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn test_matching_prefers_highest_rating() {
        let conn = db::init_db(":memory:").unwrap();
        insert_technician(&conn, &technician("t-low", "Koramangala", "560034", Some(3.9))).unwrap();
        insert_technician(&conn, &technician("t-none", "Koramangala", "560034", None)).unwrap();
        insert_technician(&conn, &technician("t-high", "Koramangala 5th Block", "560095", Some(4.8)))
            .unwrap();

        let found = find_matching_technician(&conn, "koramangala", "000000", "plumbing")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "t-high");
    }

    #[test]
    fn test_matching_treats_area_as_literal_text() {
        let conn = db::init_db(":memory:").unwrap();
        insert_technician(&conn, &technician("t-1", "HSR Layout", "560102", None)).unwrap();

        let found = find_matching_technician(&conn, "%", "000000", "plumbing").unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_matching_ignores_empty_locality() {
        let conn = db::init_db(":memory:").unwrap();
        insert_technician(&conn, &technician("t-1", "HSR Layout", "", None)).unwrap();

        assert!(find_matching_technician(&conn, "", "", "plumbing").unwrap().is_none());
        assert!(find_matching_technician(&conn, "", "560102", "plumbing").unwrap().is_none());
        assert_eq!(
            find_matching_technician(&conn, "hsr", "", "plumbing").unwrap().unwrap().id,
            "t-1"
        );
    }
}
