//! Catalog
//!
//! Read-only product reference data loaded from YAML fixtures. Prices are
//! written as `"AMOUNT CURRENCY"` strings and every product in a catalog must
//! share the same currency.

use std::{fs, path::Path};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::iso::{Currency, EUR, GBP, USD};
use serde::Deserialize;
use thiserror::Error;

use crate::products::{Category, Product, ProductId};

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the fixture file
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Rating is not a finite number between 0 and 5
    #[error("Invalid rating for product {product}: {rating}")]
    InvalidRating {
        /// Product carrying the rating
        product: String,

        /// Rating as written in the fixture
        rating: f32,
    },

    /// Two products share an id
    #[error("Duplicate product id: {0}")]
    DuplicateProduct(String),

    /// The fixture declares no products, so the currency is unknown
    #[error("Catalog has no products; currency unknown")]
    NoProducts,
}

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
struct CatalogFixture {
    products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
struct ProductFixture {
    id: ProductId,
    name: String,
    #[serde(default)]
    description: String,
    price: String,
    #[serde(default)]
    images: Vec<String>,
    category: Category,
    #[serde(default)]
    rating: f32,
    #[serde(default)]
    reviews_count: u32,
    #[serde(default = "in_stock_default")]
    in_stock: bool,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    sizes: Vec<String>,
    #[serde(default)]
    colors: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Highest review rating a product can carry.
pub const MAX_RATING: f32 = 5.0;

const fn in_stock_default() -> bool {
    true
}

impl ProductFixture {
    fn into_product(self) -> Result<(Product, &'static Currency), CatalogError> {
        let (price, currency) = parse_price(&self.price)?;

        if !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(CatalogError::InvalidRating {
                product: self.id.to_string(),
                rating: self.rating,
            });
        }

        let product = Product {
            id: self.id,
            name: self.name,
            description: self.description,
            price,
            images: self.images,
            category: self.category,
            rating: self.rating,
            reviews_count: self.reviews_count,
            in_stock: self.in_stock,
            brand: self.brand,
            sizes: self.sizes,
            colors: self.colors,
            tags: self.tags,
        };

        Ok((product, currency))
    }
}

/// A read-only list of products in a single currency.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    index: FxHashMap<ProductId, usize>,
    currency: &'static Currency,
}

impl Catalog {
    /// Parse a catalog from a YAML document with a top-level `products` list.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed, a price is malformed,
    /// currencies differ, an id repeats, or there are no products.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(yaml)?;

        let mut products = Vec::with_capacity(fixture.products.len());
        let mut index = FxHashMap::default();
        let mut catalog_currency: Option<&'static Currency> = None;

        for product_fixture in fixture.products {
            let (product, currency) = product_fixture.into_product()?;

            match catalog_currency {
                Some(existing) if existing != currency => {
                    return Err(CatalogError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
                Some(_) => {}
                None => catalog_currency = Some(currency),
            }

            if index.insert(product.id.clone(), products.len()).is_some() {
                return Err(CatalogError::DuplicateProduct(product.id.to_string()));
            }

            products.push(product);
        }

        let currency = catalog_currency.ok_or(CatalogError::NoProducts)?;

        Ok(Self {
            products,
            index,
            currency,
        })
    }

    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, see [`Self::from_yaml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Look up a product by id.
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.index.get(id).and_then(|&idx| self.products.get(idx))
    }

    /// Products in fixture order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Products in the given category, in fixture order.
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Product> {
        self.products
            .iter()
            .filter(move |product| product.category == category)
    }

    /// Products whose name contains `query`, ignoring case, in fixture order.
    /// A blank query matches every product.
    pub fn search(&self, query: &str) -> impl Iterator<Item = &Product> {
        let query = query.trim().to_lowercase();

        self.products
            .iter()
            .filter(move |product| product.name.to_lowercase().contains(&query))
    }

    /// Products matching both an optional name query and an optional category.
    pub fn browse(&self, query: Option<&str>, category: Option<Category>) -> Vec<&Product> {
        self.search(query.unwrap_or_default())
            .filter(|product| category.is_none_or(|category| product.category == category))
            .collect()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty. Always false for a loaded catalog.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Currency shared by every product.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// Parse price string (e.g., "129.99 EUR") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a decimal number, or if the currency code is not
/// recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), CatalogError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(currency_code), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(CatalogError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| CatalogError::InvalidPrice(s.to_string()))?;

    let currency = parse_currency(currency_code)?;

    let minor_units = amount
        .checked_mul(Decimal::from(10_i64.pow(currency.exponent)))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| CatalogError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Resolve a supported ISO currency code.
///
/// # Errors
///
/// Returns [`CatalogError::UnknownCurrency`] for anything but GBP, USD and EUR.
pub fn parse_currency(code: &str) -> Result<&'static Currency, CatalogError> {
    match code.to_uppercase().as_str() {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        _ => Err(CatalogError::UnknownCurrency(code.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use testresult::TestResult;

    use crate::{cart::Cart, items::NewCartItem, promotions::PromoRegistry, storage::MemoryStorage};

    use super::*;

    const SHOP: &str = r#"
products:
  - id: "1"
    name: Nike Air Max
    price: "129.99 EUR"
    category: shoes
    rating: 4.5
    reviews_count: 120
    sizes: ["40", "41", "42"]
  - id: "2"
    name: Wireless Headphones
    price: "89.00 EUR"
    category: electronics
    in_stock: false
"#;

    #[test]
    fn parse_price_converts_to_minor_units() -> TestResult {
        assert_eq!(parse_price("129.99 EUR")?, (129_99, EUR));
        assert_eq!(parse_price("5 GBP")?, (5_00, GBP));

        Ok(())
    }

    #[test]
    fn parse_price_rejects_bad_input() {
        assert!(matches!(parse_price("129.99"), Err(CatalogError::InvalidPrice(_))));
        assert!(matches!(parse_price("abc EUR"), Err(CatalogError::InvalidPrice(_))));
        assert!(matches!(parse_price("1 EUR extra"), Err(CatalogError::InvalidPrice(_))));
        assert!(matches!(parse_price("1.00 JPY"), Err(CatalogError::UnknownCurrency(_))));
    }

    #[test]
    fn from_yaml_str_builds_catalog() -> TestResult {
        let catalog = Catalog::from_yaml_str(SHOP)?;

        let sneakers = catalog.get(&ProductId::new("1")).ok_or("product 1 missing")?;
        let headphones = catalog.get(&ProductId::new("2")).ok_or("product 2 missing")?;

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.currency(), EUR);
        assert_eq!(sneakers.price, 129_99);
        assert_eq!(sneakers.sizes, ["40", "41", "42"]);
        assert!(sneakers.in_stock);
        assert!(!headphones.in_stock);

        Ok(())
    }

    #[test]
    fn by_category_filters_products() -> TestResult {
        let catalog = Catalog::from_yaml_str(SHOP)?;

        let shoes: Vec<_> = catalog
            .by_category(Category::Shoes)
            .map(|product| product.name.as_str())
            .collect();

        assert_eq!(shoes, ["Nike Air Max"]);

        Ok(())
    }

    #[test]
    fn search_matches_name_ignoring_case() -> TestResult {
        let catalog = Catalog::from_yaml_str(SHOP)?;

        let names = |query: &str| {
            catalog
                .search(query)
                .map(|product| product.name.as_str())
                .collect::<Vec<_>>()
        };

        assert_eq!(names("air"), ["Nike Air Max"]);
        assert_eq!(names("HEADPHONES"), ["Wireless Headphones"]);
        assert_eq!(names("  "), ["Nike Air Max", "Wireless Headphones"]);
        assert!(names("lamp").is_empty());

        Ok(())
    }

    #[test]
    fn browse_combines_query_and_category() -> TestResult {
        let catalog = Catalog::from_yaml_str(SHOP)?;

        let names = |query: Option<&str>, category: Option<Category>| {
            catalog
                .browse(query, category)
                .into_iter()
                .map(|product| product.name.as_str())
                .collect::<Vec<_>>()
        };

        assert_eq!(names(None, None).len(), 2);
        assert_eq!(names(None, Some(Category::Electronics)), ["Wireless Headphones"]);
        assert_eq!(names(Some("i"), Some(Category::Shoes)), ["Nike Air Max"]);
        assert!(names(Some("nike"), Some(Category::Electronics)).is_empty());

        Ok(())
    }

    #[test]
    fn mixed_currencies_are_rejected() {
        let result = Catalog::from_yaml_str(
            r#"
products:
  - { id: "1", name: A, price: "1.00 EUR", category: home }
  - { id: "2", name: B, price: "1.00 GBP", category: home }
"#,
        );

        assert!(matches!(result, Err(CatalogError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = Catalog::from_yaml_str(
            r#"
products:
  - { id: "1", name: A, price: "1.00 EUR", category: home }
  - { id: "1", name: B, price: "2.00 EUR", category: home }
"#,
        );

        assert!(matches!(result, Err(CatalogError::DuplicateProduct(id)) if id == "1"));
    }

    #[test]
    fn ratings_outside_range_are_rejected() {
        for rating in [".nan", ".inf", "-0.5", "5.5"] {
            let result = Catalog::from_yaml_str(&format!(
                r#"
products:
  - {{ id: "1", name: A, price: "1.00 EUR", category: home, rating: {rating} }}
"#
            ));

            assert!(
                matches!(result, Err(CatalogError::InvalidRating { ref product, .. }) if product == "1"),
                "rating {rating} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn catalog_products_survive_cart_reload() -> TestResult {
        let catalog = Catalog::from_yaml_str(SHOP)?;
        let sneakers = catalog.get(&ProductId::new("1")).ok_or("product 1 missing")?;

        let storage = Arc::new(MemoryStorage::new());
        let mut cart = Cart::new(Arc::clone(&storage), PromoRegistry::default(), EUR);

        cart.add_item(NewCartItem::new(sneakers.clone()).size("42"))
            .await?;

        let mut reloaded = Cart::new(storage, PromoRegistry::default(), EUR);
        reloaded.load_cart().await;

        assert_eq!(reloaded.items(), cart.items());

        Ok(())
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let result = Catalog::from_yaml_str("products: []");

        assert!(matches!(result, Err(CatalogError::NoProducts)));
    }

    #[test]
    fn load_reads_bundled_fixture() -> TestResult {
        let catalog = Catalog::load(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/fixtures/products/shop.yml"
        ))?;

        assert!(!catalog.is_empty());
        assert_eq!(catalog.currency(), EUR);

        Ok(())
    }
}
