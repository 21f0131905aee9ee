pub mod booking;
pub mod catalog;
pub mod ledger;
pub mod offer;
pub mod technician;

pub use booking::{Booking, BookingStatus, PaymentMethod};
pub use catalog::{Customer, Partner, Service};
pub use ledger::{Commission, CommissionStatus, Payment, PaymentStatus};
pub use offer::{DiscountType, Offer, OfferEligibility, OfferStatus};
pub use technician::{DocumentKind, Technician, TechnicianDocument, VerificationStatus};

/// Storage format for timestamps.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Storage format for booking dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Storage format for booking times.
pub const TIME_FORMAT: &str = "%H:%M";
