//! Promo code registry

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::promotions::{PromoCode, PromoDiscount};

/// Errors loading a promo code registry.
#[derive(Debug, Error)]
pub enum PromoRegistryError {
    /// IO error reading the fixture file
    #[error("Failed to read promotions file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// The same code was declared twice
    #[error("Duplicate promo code: {0}")]
    DuplicateCode(String),

    /// Discount value out of range
    #[error("Invalid discount for promo code {0}")]
    InvalidDiscount(String),
}

/// Wrapper for promo codes in YAML
#[derive(Debug, Deserialize)]
struct PromotionsFixture {
    promo_codes: Vec<PromoCode>,
}

/// Fixed set of promo codes, keyed by uppercase code.
#[derive(Debug, Clone)]
pub struct PromoRegistry {
    codes: FxHashMap<String, PromoCode>,
}

impl PromoRegistry {
    /// A registry with no codes.
    pub fn empty() -> Self {
        Self {
            codes: FxHashMap::default(),
        }
    }

    /// Parse a registry from a YAML document with a top-level `promo_codes` list.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed, a code is declared twice,
    /// or a discount is negative (or above 100 percent).
    pub fn from_yaml_str(yaml: &str) -> Result<Self, PromoRegistryError> {
        let fixture: PromotionsFixture = serde_norway::from_str(yaml)?;
        let mut registry = Self::empty();

        for promo in fixture.promo_codes {
            validate_discount(&promo)?;

            let code = promo.code.to_uppercase();

            if registry.codes.contains_key(&code) {
                return Err(PromoRegistryError::DuplicateCode(code));
            }

            registry.insert(promo);
        }

        Ok(registry)
    }

    /// Load a registry from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, see [`Self::from_yaml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PromoRegistryError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Add a code, replacing any existing code with the same name.
    pub fn insert(&mut self, mut promo: PromoCode) -> Option<PromoCode> {
        promo.code = promo.code.to_uppercase();

        self.codes.insert(promo.code.clone(), promo)
    }

    /// Case-insensitive lookup.
    pub fn lookup(&self, code: &str) -> Option<&PromoCode> {
        self.codes.get(&code.trim().to_uppercase())
    }

    /// Number of codes.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the registry holds no codes.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Iterate over codes in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &PromoCode> {
        self.codes.values()
    }
}

impl Default for PromoRegistry {
    /// The built-in codes: `SAVE20` (20% off above 50.00) and `FIRST10` (10.00 off).
    fn default() -> Self {
        let mut registry = Self::empty();

        registry.insert(PromoCode::percentage("SAVE20", 20).with_min_amount(50_00));
        registry.insert(PromoCode::fixed("FIRST10", 10_00));

        registry
    }
}

fn validate_discount(promo: &PromoCode) -> Result<(), PromoRegistryError> {
    let valid = match promo.discount {
        PromoDiscount::Percentage(points) => {
            points >= Decimal::ZERO && points <= Decimal::ONE_HUNDRED
        }
        PromoDiscount::Fixed(amount) => amount >= 0,
    };

    if valid && promo.min_amount.is_none_or(|min| min >= 0) {
        Ok(())
    } else {
        Err(PromoRegistryError::InvalidDiscount(promo.code.clone()))
    }
}
