use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub user_id: Option<String>,
    pub technician_id: Option<String>,
    pub service_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub address: String,
    pub area: String,
    pub pincode: String,
    pub status: BookingStatus,
    pub amount: f64,
    pub discount_applied: bool,
    pub discount_value: f64,
    pub final_amount: Option<f64>,
    pub commission: Option<f64>,
    pub payment_method: Option<PaymentMethod>,
    pub idempotency_key: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    /// Amount the customer actually pays. Rows written before discounts were
    /// tracked have no final amount and bill the original price.
    pub fn billable_amount(&self) -> f64 {
        self.final_amount.unwrap_or(self.amount)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Accepted,
    Confirmed,
    InProgress,
    Completed,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Accepted => "Accepted",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::InProgress => "InProgress",
            BookingStatus::Completed => "Completed",
            BookingStatus::Rejected => "Rejected",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(BookingStatus::Pending),
            "Accepted" => Some(BookingStatus::Accepted),
            "Confirmed" => Some(BookingStatus::Confirmed),
            "InProgress" | "In Progress" => Some(BookingStatus::InProgress),
            "Completed" => Some(BookingStatus::Completed),
            "Rejected" => Some(BookingStatus::Rejected),
            "Cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Rejected | BookingStatus::Cancelled
        )
    }

    /// Allowed moves:
    /// `Pending -> Accepted | Confirmed | Rejected | Cancelled`,
    /// `Accepted | Confirmed -> InProgress | Completed | Rejected | Cancelled`,
    /// `InProgress -> Completed`. Terminal states never move.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::{Accepted, Cancelled, Completed, Confirmed, InProgress, Pending, Rejected};

        if self.is_terminal() {
            return false;
        }

        matches!(
            (self, next),
            (Pending, Accepted | Confirmed | Rejected | Cancelled)
                | (Accepted | Confirmed, InProgress | Completed | Rejected | Cancelled)
                | (InProgress, Completed)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PaymentMethod {
    #[default]
    Cash,
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Online => "Online",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Cash" => Some(PaymentMethod::Cash),
            "Online" => Some(PaymentMethod::Online),
            _ => None,
        }
    }
}
