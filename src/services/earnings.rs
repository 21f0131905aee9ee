use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;
use crate::models::{Booking, Commission, CommissionStatus};
use crate::services::pricing::{to_decimal, to_f64, COMMISSION_RATE};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyEarnings {
    /// `YYYY-MM`
    pub month: String,
    pub earnings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsSummary {
    pub completed_jobs: usize,
    pub total_revenue: f64,
    pub platform_share: f64,
    pub net_earnings: f64,
    pub monthly: Vec<MonthlyEarnings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommissionLedger {
    pub total: f64,
    pub pending: f64,
    pub paid: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TechnicianEarnings {
    #[serde(flatten)]
    pub summary: EarningsSummary,
    pub commissions: CommissionLedger,
}

/// Totals a set of completed bookings and buckets them by calendar month,
/// oldest month first.
pub fn summarize(bookings: &[Booking]) -> EarningsSummary {
    let mut total = Decimal::ZERO;
    let mut by_month: BTreeMap<String, Decimal> = BTreeMap::new();

    for booking in bookings {
        let amount = to_decimal(booking.billable_amount());
        total += amount;
        *by_month
            .entry(booking.date.format("%Y-%m").to_string())
            .or_insert(Decimal::ZERO) += amount;
    }

    let platform_share = to_decimal(to_f64(total * COMMISSION_RATE));

    EarningsSummary {
        completed_jobs: bookings.len(),
        total_revenue: to_f64(total),
        platform_share: to_f64(platform_share),
        net_earnings: to_f64(total - platform_share),
        monthly: by_month
            .into_iter()
            .map(|(month, earnings)| MonthlyEarnings {
                month,
                earnings: to_f64(earnings),
            })
            .collect(),
    }
}

pub fn summarize_commissions(commissions: &[Commission]) -> CommissionLedger {
    let mut pending = Decimal::ZERO;
    let mut paid = Decimal::ZERO;

    for commission in commissions {
        let amount = to_decimal(commission.amount);
        match commission.status {
            CommissionStatus::Pending => pending += amount,
            CommissionStatus::Paid => paid += amount,
        }
    }

    CommissionLedger {
        total: to_f64(pending + paid),
        pending: to_f64(pending),
        paid: to_f64(paid),
    }
}

/// Earnings view for a technician. Net earnings are what remains after the
/// commissions actually recorded against them, not the nominal 80%.
pub fn technician_earnings(
    conn: &Connection,
    technician_id: &str,
) -> anyhow::Result<TechnicianEarnings> {
    let bookings = queries::get_completed_bookings_for_technician(conn, technician_id)?;
    let commissions = queries::get_commissions_for_technician(conn, technician_id)?;

    let mut summary = summarize(&bookings);
    let ledger = summarize_commissions(&commissions);
    summary.net_earnings = to_f64(to_decimal(summary.total_revenue) - to_decimal(ledger.total));

    Ok(TechnicianEarnings {
        summary,
        commissions: ledger,
    })
}

/// Earnings view for a partner across every service they list.
pub fn partner_earnings(conn: &Connection, partner_id: &str) -> anyhow::Result<EarningsSummary> {
    let bookings = queries::get_completed_bookings_for_partner(conn, partner_id)?;
    Ok(summarize(&bookings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, PaymentMethod};
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    fn completed(date: &str, amount: f64, final_amount: Option<f64>) -> Booking {
        let created = NaiveDateTime::parse_from_str("2024-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        Booking {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            technician_id: Some("tech-1".to_string()),
            service_id: "svc".to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            address: "addr".to_string(),
            area: "area".to_string(),
            pincode: "000000".to_string(),
            status: BookingStatus::Completed,
            amount,
            discount_applied: false,
            discount_value: 0.0,
            final_amount,
            commission: None,
            payment_method: Some(PaymentMethod::Cash),
            idempotency_key: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_monthly_grouping() {
        let bookings = vec![
            completed("2024-01-05", 100.0, Some(100.0)),
            completed("2024-01-20", 50.0, Some(50.0)),
            completed("2024-02-01", 200.0, Some(200.0)),
        ];

        let summary = summarize(&bookings);
        assert_eq!(
            summary.monthly,
            vec![
                MonthlyEarnings {
                    month: "2024-01".to_string(),
                    earnings: 150.0
                },
                MonthlyEarnings {
                    month: "2024-02".to_string(),
                    earnings: 200.0
                },
            ]
        );
        assert_eq!(summary.total_revenue, 350.0);
        assert_eq!(summary.platform_share, 70.0);
        assert_eq!(summary.net_earnings, 280.0);
        assert_eq!(summary.completed_jobs, 3);
    }

    #[test]
    fn test_months_sorted_regardless_of_input_order() {
        let bookings = vec![
            completed("2024-03-02", 10.0, None),
            completed("2023-12-31", 20.0, None),
            completed("2024-01-15", 30.0, None),
        ];

        let months: Vec<String> = summarize(&bookings).monthly.into_iter().map(|m| m.month).collect();
        assert_eq!(months, vec!["2023-12", "2024-01", "2024-03"]);
    }

    #[test]
    fn test_falls_back_to_amount_without_final_amount() {
        let bookings = vec![
            completed("2024-04-01", 300.0, None),
            completed("2024-04-02", 300.0, Some(250.0)),
        ];

        let summary = summarize(&bookings);
        assert_eq!(summary.total_revenue, 550.0);
    }

    #[test]
    fn test_empty_input() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_revenue, 0.0);
        assert_eq!(summary.platform_share, 0.0);
        assert!(summary.monthly.is_empty());
    }

    #[test]
    fn test_commission_ledger() {
        let created = NaiveDateTime::parse_from_str("2024-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let commission = |amount: f64, status: CommissionStatus| Commission {
            id: uuid::Uuid::new_v4().to_string(),
            booking_id: "b".to_string(),
            technician_id: "tech-1".to_string(),
            amount,
            status,
            payment_method: None,
            created_at: created,
        };

        let ledger = summarize_commissions(&[
            commission(90.0, CommissionStatus::Pending),
            commission(40.5, CommissionStatus::Paid),
            commission(10.0, CommissionStatus::Pending),
        ]);
        assert_eq!(
            ledger,
            CommissionLedger {
                total: 140.5,
                pending: 100.0,
                paid: 40.5
            }
        );
    }
}
