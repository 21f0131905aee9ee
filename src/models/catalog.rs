use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rate: f64,
    pub duration_minutes: i32,
    pub category_id: String,
    pub partner_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub id: String,
    pub name: String,
    pub shop_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub created_at: NaiveDateTime,
}

impl Customer {
    /// Accounts registered within the last `window_days` days count as new.
    pub fn is_new(&self, now: NaiveDateTime, window_days: i64) -> bool {
        let age = now - self.created_at;
        age >= chrono::Duration::zero() && age <= chrono::Duration::days(window_days)
    }
}
