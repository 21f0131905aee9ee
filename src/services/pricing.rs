//! Discount and commission arithmetic.
//!
//! Amounts are stored and serialized as `f64`; every calculation here runs in
//! `Decimal` and is rounded to two places (half away from zero) on the way out.

use rust_decimal::prelude::*;
use serde::Serialize;

use crate::models::{DiscountType, Offer};

const DECIMAL_PLACES: u32 = 2;

/// Largest booking amount accepted (₹1,000,000).
pub const MAX_AMOUNT: f64 = 1_000_000.0;

/// The platform's share of every booking's final amount (20%).
pub const COMMISSION_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Discount {
    pub discount_value: f64,
    pub final_amount: f64,
}

impl Discount {
    pub fn none(original_amount: f64) -> Self {
        Self {
            discount_value: 0.0,
            final_amount: to_f64(to_decimal(original_amount)),
        }
    }
}

#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Applies `offer` to `original_amount`.
///
/// The discount is clamped to `[0, original_amount]`, so the final amount is
/// never negative and never exceeds the original.
pub fn calculate_discount(original_amount: f64, offer: &Offer) -> Discount {
    discount_for(original_amount, offer.discount_type, offer.discount_value)
}

pub fn discount_for(original_amount: f64, discount_type: DiscountType, value: f64) -> Discount {
    let original = to_decimal(original_amount).max(Decimal::ZERO);
    let value = to_decimal(value);

    // Dividing first keeps the product in range for any amount; what can still
    // overflow is a percentage far above 100, which clamps to the full amount.
    let raw = match discount_type {
        DiscountType::Percentage => (original / Decimal::ONE_HUNDRED)
            .checked_mul(value)
            .unwrap_or(original),
        DiscountType::FlatAmount => value,
        DiscountType::Unknown => Decimal::ZERO,
    };

    let discount = raw.max(Decimal::ZERO).min(original);

    Discount {
        discount_value: to_f64(discount),
        final_amount: to_f64(original - discount),
    }
}

/// Commission owed on a booking billed at `final_amount`.
pub fn commission_for(final_amount: f64) -> f64 {
    to_f64(to_decimal(final_amount) * COMMISSION_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_discount() {
        let d = discount_for(500.0, DiscountType::Percentage, 10.0);
        assert_eq!(d.discount_value, 50.0);
        assert_eq!(d.final_amount, 450.0);
    }

    #[test]
    fn test_percentage_discount_across_range() {
        for p in [0.0, 1.0, 12.5, 33.0, 50.0, 99.0, 100.0] {
            let d = discount_for(240.0, DiscountType::Percentage, p);
            assert_eq!(d.discount_value, to_f64(to_decimal(240.0 * p / 100.0)));
            assert_eq!(d.final_amount, to_f64(to_decimal(240.0) - to_decimal(d.discount_value)));
        }
    }

    #[test]
    fn test_percentage_over_hundred_clamps_to_amount() {
        let d = discount_for(300.0, DiscountType::Percentage, 150.0);
        assert_eq!(d.discount_value, 300.0);
        assert_eq!(d.final_amount, 0.0);
    }

    #[test]
    fn test_flat_discount() {
        let d = discount_for(799.0, DiscountType::FlatAmount, 100.0);
        assert_eq!(d.discount_value, 100.0);
        assert_eq!(d.final_amount, 699.0);
    }

    #[test]
    fn test_flat_discount_larger_than_amount_clamps() {
        let d = discount_for(80.0, DiscountType::FlatAmount, 200.0);
        assert_eq!(d.discount_value, 80.0);
        assert_eq!(d.final_amount, 0.0);
    }

    #[test]
    fn test_negative_discount_is_ignored() {
        let d = discount_for(80.0, DiscountType::FlatAmount, -20.0);
        assert_eq!(d.discount_value, 0.0);
        assert_eq!(d.final_amount, 80.0);
    }

    #[test]
    fn test_unknown_discount_type_applies_nothing() {
        let d = discount_for(120.0, DiscountType::Unknown, 50.0);
        assert_eq!(d, Discount::none(120.0));
    }

    #[test]
    fn test_huge_percentage_does_not_overflow() {
        let d = discount_for(MAX_AMOUNT, DiscountType::Percentage, 1e27);
        assert_eq!(d.discount_value, MAX_AMOUNT);
        assert_eq!(d.final_amount, 0.0);
    }

    #[test]
    fn test_large_amount_with_percentage_does_not_overflow() {
        let d = discount_for(1e28, DiscountType::Percentage, 10.0);
        assert!(d.discount_value > 0.0);
        assert!(d.final_amount > d.discount_value);
    }

    #[test]
    fn test_max_amount_discount_is_exact() {
        let d = discount_for(MAX_AMOUNT, DiscountType::Percentage, 10.0);
        assert_eq!(d.discount_value, 100_000.0);
        assert_eq!(d.final_amount, 900_000.0);
    }

    #[test]
    fn test_commission_is_twenty_percent_rounded() {
        assert_eq!(commission_for(450.0), 90.0);
        assert_eq!(commission_for(0.0), 0.0);
        assert_eq!(commission_for(333.33), 66.67);
        assert_eq!(commission_for(1234.5), 246.9);
    }
}
