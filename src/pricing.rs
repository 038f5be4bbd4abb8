//! Pricing
//!
//! Pure derivations over cart lines: subtotal, promo discount and the final
//! total including shipping.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    items::CartItem,
    promotions::{PromoCode, PromoDiscount},
};

/// Flat shipping fee charged on every non-empty cart, in minor units.
pub const DEFAULT_SHIPPING_FEE: i64 = 5_99;

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A line total or the subtotal does not fit in minor units.
    #[error("cart amount overflowed")]
    Overflow,

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Sum of `price × quantity` over all lines. Zero for no lines.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the sum does not fit in minor units.
pub fn subtotal(
    items: &[CartItem],
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    let minor = items
        .iter()
        .try_fold(0_i64, |acc, item| {
            item.line_total().and_then(|line| acc.checked_add(line))
        })
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, currency))
}

/// Discount granted by `promo` on `subtotal`.
///
/// A fixed discount is returned verbatim, even when it exceeds the subtotal;
/// flooring happens in [`total`].
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if a percentage discount cannot
/// be represented in minor units.
pub fn discount(
    promo: Option<&PromoCode>,
    subtotal: &Money<'static, Currency>,
) -> Result<Money<'static, Currency>, PricingError> {
    let currency = subtotal.currency();

    let minor = match promo.map(|promo| promo.discount) {
        None => 0,
        Some(PromoDiscount::Percentage(points)) => {
            percent_of_minor(points, subtotal.to_minor_units())?
        }
        Some(PromoDiscount::Fixed(amount)) => amount,
    };

    Ok(Money::from_minor(minor, currency))
}

/// Amount payable: `max(0, subtotal - discount + shipping)`.
///
/// An empty cart always totals zero, whatever promo is active and without
/// shipping.
///
/// # Errors
///
/// Returns a [`PricingError`] if the subtotal or discount cannot be computed.
pub fn total(
    items: &[CartItem],
    promo: Option<&PromoCode>,
    shipping: Money<'static, Currency>,
) -> Result<Money<'static, Currency>, PricingError> {
    let currency = shipping.currency();

    if items.is_empty() {
        return Ok(Money::from_minor(0, currency));
    }

    let subtotal = subtotal(items, currency)?;
    let discount = discount(promo, &subtotal)?;
    let total = subtotal.sub(discount)?.add(shipping)?;

    if total.is_negative() {
        return Ok(Money::from_minor(0, currency));
    }

    Ok(total)
}

/// `points` percent of `minor`, rounded to the nearest minor unit.
fn percent_of_minor(points: Decimal, minor: i64) -> Result<i64, PricingError> {
    let applied = Decimal::from(minor)
        .checked_mul(points)
        .and_then(|value| value.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(PricingError::PercentConversion)?;

    applied
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::PercentConversion)
}
