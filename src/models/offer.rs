use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub valid_for: OfferEligibility,
    /// `None` means the offer applies to every service.
    pub service_id: Option<String>,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub status: OfferStatus,
}

impl Offer {
    pub fn is_eligible(&self, is_new_user: bool) -> bool {
        match self.valid_for {
            OfferEligibility::AllUsers => true,
            OfferEligibility::NewUsers => is_new_user,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DiscountType {
    Percentage,
    FlatAmount,
    /// Anything else found in storage. Applies no discount.
    Unknown,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "Percentage",
            DiscountType::FlatAmount => "Flat Amount",
            DiscountType::Unknown => "Unknown",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Percentage" => DiscountType::Percentage,
            "Flat Amount" | "FlatAmount" => DiscountType::FlatAmount,
            _ => DiscountType::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OfferEligibility {
    NewUsers,
    AllUsers,
}

impl OfferEligibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferEligibility::NewUsers => "New Users",
            OfferEligibility::AllUsers => "All Users",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "New Users" | "NewUsers" => Some(OfferEligibility::NewUsers),
            "All Users" | "AllUsers" => Some(OfferEligibility::AllUsers),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OfferStatus {
    Active,
    Inactive,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Active => "Active",
            OfferStatus::Inactive => "Inactive",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Active" => OfferStatus::Active,
            _ => OfferStatus::Inactive,
        }
    }
}
