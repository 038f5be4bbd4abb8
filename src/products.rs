//! Products

use std::{fmt, str::FromStr};

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Product identifier, as assigned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Catalog category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Phones, audio, gadgets
    Electronics,

    /// Apparel
    Clothing,

    /// Footwear
    Shoes,

    /// Bags, watches, jewellery
    Accessories,

    /// Furniture and homeware
    Home,

    /// Sporting goods
    Sports,

    /// Cosmetics and care
    Beauty,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 7] = [
        Category::Electronics,
        Category::Clothing,
        Category::Shoes,
        Category::Accessories,
        Category::Home,
        Category::Sports,
        Category::Beauty,
    ];

    /// Lowercase name, as used in fixtures.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Electronics => "electronics",
            Category::Clothing => "clothing",
            Category::Shoes => "shoes",
            Category::Accessories => "accessories",
            Category::Home => "home",
            Category::Sports => "sports",
            Category::Beauty => "beauty",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Product
///
/// Read-only reference data. The cart snapshots the whole product into each
/// line item, so prices are frozen at the moment the item was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Long-form description
    #[serde(default)]
    pub description: String,

    /// Unit price in minor units of the cart currency
    pub price: i64,

    /// Image URLs
    #[serde(default)]
    pub images: Vec<String>,

    /// Catalog category
    pub category: Category,

    /// Average review rating (0-5)
    #[serde(default)]
    pub rating: f32,

    /// Number of reviews behind `rating`
    #[serde(default)]
    pub reviews_count: u32,

    /// Whether the product can currently be bought
    #[serde(default = "in_stock_default")]
    pub in_stock: bool,

    /// Brand name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Sizes the product is offered in
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<String>,

    /// Colors the product is offered in
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,

    /// Free-form tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

const fn in_stock_default() -> bool {
    true
}

impl Product {
    /// Create an in-stock product with the given id, name, minor-unit price and category.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: i64,
        category: Category,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            images: Vec::new(),
            category,
            rating: 0.0,
            reviews_count: 0,
            in_stock: true,
            brand: None,
            sizes: Vec::new(),
            colors: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Unit price as money in the given currency.
    pub fn price_in(&self, currency: &'static Currency) -> Money<'static, Currency> {
        Money::from_minor(self.price, currency)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::EUR;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn price_in_uses_minor_units() {
        let product = Product::new("1", "Nike Air Max", 129_99, Category::Shoes);

        assert_eq!(product.price_in(EUR), Money::from_minor(129_99, EUR));
    }

    #[test]
    fn deserializes_with_defaults() -> TestResult {
        let product: Product = serde_json::from_str(
            r#"{"id":"7","name":"Desk Lamp","price":2499,"category":"home"}"#,
        )?;

        assert_eq!(product.id, ProductId::new("7"));
        assert_eq!(product.category, Category::Home);
        assert!(product.in_stock);
        assert!(product.sizes.is_empty());
        assert!(product.brand.is_none());

        Ok(())
    }

    #[test]
    fn category_displays_lowercase() {
        assert_eq!(Category::Electronics.to_string(), "electronics");
        assert_eq!(Category::Beauty.to_string(), "beauty");
    }

    #[test]
    fn category_parses_case_insensitively() -> TestResult {
        assert_eq!("Shoes".parse::<Category>()?, Category::Shoes);
        assert_eq!(" home ".parse::<Category>()?, Category::Home);
        assert_eq!(
            "toys".parse::<Category>(),
            Err(UnknownCategory("toys".to_string()))
        );

        Ok(())
    }
}
