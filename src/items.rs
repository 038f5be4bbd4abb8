//! Items

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::products::{Product, ProductId};

/// Cart line item identifier.
///
/// Composite of the product id, the selected variant and the creation time in
/// milliseconds, e.g. `1_M_red_1760000000000`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItemId(String);

impl CartItemId {
    /// Wrap an existing id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the id for a line created at `created_ms`.
    pub fn synthesize(
        product: &ProductId,
        size: Option<&str>,
        color: Option<&str>,
        created_ms: i64,
    ) -> Self {
        Self(format!(
            "{product}_{}_{}_{created_ms}",
            size.unwrap_or_default(),
            color.unwrap_or_default()
        ))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CartItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CartItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A product in the cart with its chosen variant and quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Line id, unique within the cart
    pub id: CartItemId,

    /// Snapshot of the product at the time it was added
    pub product: Product,

    /// Number of units, never zero
    pub quantity: u32,

    /// Selected size, if the product is sized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,

    /// Selected color, if the product comes in colors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
}

impl CartItem {
    /// Whether this line holds the given product in the given variant.
    ///
    /// An unset size only matches an unset size, likewise for color.
    pub fn is_variant_of(
        &self,
        product: &ProductId,
        size: Option<&str>,
        color: Option<&str>,
    ) -> bool {
        self.product.id == *product
            && self.selected_size.as_deref() == size
            && self.selected_color.as_deref() == color
    }

    /// Price of the line in minor units, or `None` on overflow.
    pub fn line_total(&self) -> Option<i64> {
        self.product.price.checked_mul(i64::from(self.quantity))
    }
}

/// Data for adding a product to the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    /// Product to add
    pub product: Product,

    /// Units to add
    pub quantity: u32,

    /// Selected size
    pub size: Option<String>,

    /// Selected color
    pub color: Option<String>,
}

impl NewCartItem {
    /// A single unit of `product` with no variant selected.
    pub fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
            size: None,
            color: None,
        }
    }

    /// Set the number of units to add.
    #[must_use]
    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Select a size.
    #[must_use]
    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Select a color.
    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::products::Category;

    use super::*;

    fn item(size: Option<&str>, color: Option<&str>) -> CartItem {
        CartItem {
            id: CartItemId::new("1__"),
            product: Product::new("1", "T-Shirt", 19_99, Category::Clothing),
            quantity: 3,
            selected_size: size.map(str::to_string),
            selected_color: color.map(str::to_string),
        }
    }

    #[test]
    fn synthesized_id_includes_variant_and_time() {
        let id = CartItemId::synthesize(&ProductId::new("42"), Some("M"), Some("red"), 1_000);

        assert_eq!(id.as_str(), "42_M_red_1000");
    }

    #[test]
    fn synthesized_id_leaves_unset_variant_empty() {
        let id = CartItemId::synthesize(&ProductId::new("42"), None, None, 1_000);

        assert_eq!(id.as_str(), "42___1000");
    }

    #[test]
    fn variant_match_requires_all_parts() {
        let line = item(Some("M"), Some("red"));
        let product = ProductId::new("1");

        assert!(line.is_variant_of(&product, Some("M"), Some("red")));
        assert!(!line.is_variant_of(&product, Some("L"), Some("red")));
        assert!(!line.is_variant_of(&product, Some("M"), None));
        assert!(!line.is_variant_of(&ProductId::new("2"), Some("M"), Some("red")));
    }

    #[test]
    fn unset_variant_matches_only_unset() {
        let line = item(None, None);
        let product = ProductId::new("1");

        assert!(line.is_variant_of(&product, None, None));
        assert!(!line.is_variant_of(&product, Some(""), None));
    }

    #[test]
    fn line_total_multiplies_price_by_quantity() {
        assert_eq!(item(None, None).line_total(), Some(59_97));
    }

    #[test]
    fn line_total_overflow_is_none() {
        let mut line = item(None, None);
        line.product.price = i64::MAX;

        assert_eq!(line.line_total(), None);
    }

    #[test]
    fn new_cart_item_defaults_to_one_unit() {
        let new = NewCartItem::new(Product::new("1", "T-Shirt", 19_99, Category::Clothing))
            .size("M")
            .color("red");

        assert_eq!(new.quantity, 1);
        assert_eq!(new.size.as_deref(), Some("M"));
        assert_eq!(new.color.as_deref(), Some("red"));
    }
}
