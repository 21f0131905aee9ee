use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technician {
    pub id: String,
    pub name: String,
    pub area: String,
    pub pincode: String,
    pub category_id: String,
    pub availability: bool,
    pub rating: Option<f64>,
    pub verification_status: VerificationStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "Pending",
            VerificationStatus::Verified => "Verified",
            VerificationStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Verified" => VerificationStatus::Verified,
            "Rejected" => VerificationStatus::Rejected,
            _ => VerificationStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicianDocument {
    pub id: String,
    pub technician_id: String,
    pub kind: DocumentKind,
    pub url: String,
    pub uploaded_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DocumentKind {
    IdentityProof,
    Certificate,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::IdentityProof => "identity-proof",
            DocumentKind::Certificate => "certificate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "identity-proof" => Some(DocumentKind::IdentityProof),
            "certificate" => Some(DocumentKind::Certificate),
            _ => None,
        }
    }
}
