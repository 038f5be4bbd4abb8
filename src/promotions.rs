//! Promotions
//!
//! Promo codes are discount rules identified by a code string. A cart carries
//! at most one active code at a time, looked up from a [`PromoRegistry`].

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod registry;

pub use registry::{PromoRegistry, PromoRegistryError};

/// How a promo code reduces the cart subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PromoDiscount {
    /// Percent points off the subtotal (`20` is 20%).
    Percentage(Decimal),

    /// Fixed amount off, in minor units. Not capped to the subtotal.
    Fixed(i64),
}

/// A promo code definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoCode {
    /// Code as entered by the customer, stored uppercase
    pub code: String,

    /// Discount rule
    pub discount: PromoDiscount,

    /// Minimum subtotal, in minor units, required when the code is applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<i64>,

    /// Instant after which the code can no longer be applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
}

impl PromoCode {
    /// A percentage-off code.
    pub fn percentage(code: impl Into<String>, points: impl Into<Decimal>) -> Self {
        Self::with_discount(code, PromoDiscount::Percentage(points.into()))
    }

    /// A fixed-amount-off code, `amount` in minor units.
    pub fn fixed(code: impl Into<String>, amount: i64) -> Self {
        Self::with_discount(code, PromoDiscount::Fixed(amount))
    }

    fn with_discount(code: impl Into<String>, discount: PromoDiscount) -> Self {
        Self {
            code: code.into().to_uppercase(),
            discount,
            min_amount: None,
            expires_at: None,
        }
    }

    /// Require a minimum subtotal (minor units) at application time.
    #[must_use]
    pub fn with_min_amount(mut self, min_amount: i64) -> Self {
        self.min_amount = Some(min_amount);
        self
    }

    /// Stop the code being applied after `expires_at`.
    #[must_use]
    pub fn with_expiry(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether a cart with the given subtotal (minor units) may apply this code.
    pub fn accepts_subtotal(&self, subtotal: i64) -> bool {
        self.min_amount.is_none_or(|min| subtotal >= min)
    }

    /// Whether the code has expired at `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expiry| now > expiry)
    }
}
