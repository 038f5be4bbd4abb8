//! Cart errors.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{pricing::PricingError, storage::StorageError};

/// Errors returned by cart operations.
///
/// Promo rejections leave the cart untouched. Storage failures are reported
/// after the in-memory change has already been applied.
#[derive(Debug, Error)]
pub enum CartError {
    /// The code is not in the promo registry.
    #[error("unknown promo code: {0}")]
    UnknownPromoCode(String),

    /// The cart subtotal is below the code's minimum spend.
    #[error("promo code {code} requires a subtotal of at least {minimum}")]
    PromoMinimumNotMet {
        /// Code that was rejected
        code: String,

        /// Minimum subtotal required by the code
        minimum: Money<'static, Currency>,

        /// Subtotal at the time of the attempt
        subtotal: Money<'static, Currency>,
    },

    /// The code's expiry has passed.
    #[error("promo code {0} has expired")]
    PromoCodeExpired(String),

    /// Pricing the cart failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Cart state could not be serialized.
    #[error("failed to encode cart state")]
    Encode(#[from] serde_json::Error),

    /// Cart state could not be written to or removed from storage.
    #[error("failed to persist cart state")]
    Storage(#[source] StorageError),
}

impl CartError {
    /// Whether this error is a promo code being turned down, as opposed to a
    /// fault.
    pub fn is_promo_rejection(&self) -> bool {
        matches!(
            self,
            Self::UnknownPromoCode(_) | Self::PromoMinimumNotMet { .. } | Self::PromoCodeExpired(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::EUR;

    use super::*;

    #[test]
    fn promo_rejections_are_classified() {
        let below = CartError::PromoMinimumNotMet {
            code: "SAVE20".to_string(),
            minimum: Money::from_minor(50_00, EUR),
            subtotal: Money::from_minor(35_00, EUR),
        };

        assert!(below.is_promo_rejection());
        assert!(CartError::UnknownPromoCode("NOPE".to_string()).is_promo_rejection());
        assert!(CartError::PromoCodeExpired("OLD".to_string()).is_promo_rejection());
        assert!(!CartError::Pricing(PricingError::Overflow).is_promo_rejection());
    }

    #[test]
    fn minimum_not_met_message_shows_amount() {
        let error = CartError::PromoMinimumNotMet {
            code: "SAVE20".to_string(),
            minimum: Money::from_minor(50_00, EUR),
            subtotal: Money::from_minor(35_00, EUR),
        };

        let message = error.to_string();

        assert!(message.contains("SAVE20"));
        assert!(message.contains("50"));
    }
}
