//! Cart store.

use jiff::Timestamp;
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    cart::errors::CartError,
    items::{CartItem, CartItemId, NewCartItem},
    pricing::{self, DEFAULT_SHIPPING_FEE, PricingError},
    products::ProductId,
    promotions::{PromoCode, PromoRegistry},
    storage::Storage,
};

/// Storage key holding the JSON array of line items.
pub const CART_ITEMS_KEY: &str = "@cart_items";

/// Storage key holding the active promo code as a JSON object.
pub const PROMO_CODE_KEY: &str = "@promo_code";

/// Shopping cart state with write-through persistence.
///
/// Every mutation updates the in-memory state first and then writes the
/// affected key. A failed write is logged and returned to the caller, but the
/// in-memory change stays in place.
#[derive(Debug)]
pub struct Cart<S> {
    items: Vec<CartItem>,
    promo_code: Option<PromoCode>,
    storage: S,
    promotions: PromoRegistry,
    currency: &'static Currency,
    shipping_fee: Money<'static, Currency>,
}

impl<S: Storage> Cart<S> {
    /// Create an empty cart. Call [`Cart::load_cart`] to rehydrate persisted state.
    pub fn new(storage: S, promotions: PromoRegistry, currency: &'static Currency) -> Self {
        Self {
            items: Vec::new(),
            promo_code: None,
            storage,
            promotions,
            currency,
            shipping_fee: Money::from_minor(DEFAULT_SHIPPING_FEE, currency),
        }
    }

    /// Override the flat shipping fee, in minor units of the cart currency.
    #[must_use]
    pub fn with_shipping_fee(mut self, shipping_fee: i64) -> Self {
        self.shipping_fee = Money::from_minor(shipping_fee, self.currency);
        self
    }

    /// Add a product to the cart.
    ///
    /// Merges into the line holding the same product, size and color if there
    /// is one, keeping that line's id. Otherwise appends a new line. Adding
    /// zero units does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the items could not be persisted.
    pub async fn add_item(&mut self, item: NewCartItem) -> Result<(), CartError> {
        let NewCartItem {
            product,
            quantity,
            size,
            color,
        } = item;

        if quantity == 0 {
            debug!(product = %product.id, "ignoring add of zero units");
            return Ok(());
        }

        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.is_variant_of(&product.id, size.as_deref(), color.as_deref()))
        {
            line.quantity = line.quantity.saturating_add(quantity);

            debug!(item = %line.id, quantity = line.quantity, "merged into existing line");
        } else {
            let id = self.next_item_id(&product.id, size.as_deref(), color.as_deref());

            debug!(item = %id, quantity, "added line");

            self.items.push(CartItem {
                id,
                product,
                quantity,
                selected_size: size,
                selected_color: color,
            });
        }

        self.persist_items().await
    }

    /// Remove a line. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the items could not be persisted.
    pub async fn remove_item(&mut self, id: &CartItemId) -> Result<(), CartError> {
        let before = self.items.len();

        self.items.retain(|line| line.id != *id);

        if self.items.len() == before {
            debug!(item = %id, "remove of unknown line ignored");
        } else {
            debug!(item = %id, "removed line");
        }

        self.persist_items().await
    }

    /// Set a line's quantity. Zero or negative removes the line; unknown ids
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the items could not be persisted.
    pub async fn update_quantity(
        &mut self,
        id: &CartItemId,
        quantity: i64,
    ) -> Result<(), CartError> {
        if quantity <= 0 {
            return self.remove_item(id).await;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        if let Some(line) = self.items.iter_mut().find(|line| line.id == *id) {
            line.quantity = quantity;

            debug!(item = %id, quantity, "updated quantity");
        } else {
            debug!(item = %id, "update of unknown line ignored");
        }

        self.persist_items().await
    }

    /// Empty the cart and drop the promo code, deleting both storage keys.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if either key could not be removed. Both
    /// removals are always attempted.
    pub async fn clear_cart(&mut self) -> Result<(), CartError> {
        self.items.clear();
        self.promo_code = None;

        debug!("cleared cart");

        let items = self.delete(CART_ITEMS_KEY).await;
        let promo = self.delete(PROMO_CODE_KEY).await;

        items.and(promo)
    }

    /// Look up `code` (case-insensitively) and make it the active promo code,
    /// replacing any previous one.
    ///
    /// The minimum spend is checked against the subtotal at this moment only;
    /// later edits that drop the subtotal below it keep the code applied.
    ///
    /// # Errors
    ///
    /// - [`CartError::UnknownPromoCode`]: the registry has no such code.
    /// - [`CartError::PromoCodeExpired`]: the code's expiry has passed.
    /// - [`CartError::PromoMinimumNotMet`]: the subtotal is below the minimum.
    /// - [`CartError::Storage`]: the code was applied but could not be persisted.
    ///
    /// The active promo code is unchanged on every error except `Storage`.
    pub async fn apply_promo_code(&mut self, code: &str) -> Result<(), CartError> {
        let Some(promo) = self.promotions.lookup(code).cloned() else {
            debug!(code, "rejected unknown promo code");
            return Err(CartError::UnknownPromoCode(code.trim().to_uppercase()));
        };

        if promo.is_expired_at(Timestamp::now()) {
            debug!(code = %promo.code, "rejected expired promo code");
            return Err(CartError::PromoCodeExpired(promo.code));
        }

        let subtotal = self.subtotal()?;

        if !promo.accepts_subtotal(subtotal.to_minor_units()) {
            debug!(code = %promo.code, %subtotal, "rejected promo code below minimum");

            return Err(CartError::PromoMinimumNotMet {
                minimum: Money::from_minor(promo.min_amount.unwrap_or_default(), self.currency),
                code: promo.code,
                subtotal,
            });
        }

        debug!(code = %promo.code, "applied promo code");

        let encoded = serde_json::to_string(&promo)?;

        self.promo_code = Some(promo);

        self.write(PROMO_CODE_KEY, encoded).await
    }

    /// Drop the active promo code, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the stored code could not be removed.
    pub async fn remove_promo_code(&mut self) -> Result<(), CartError> {
        if let Some(promo) = self.promo_code.take() {
            debug!(code = %promo.code, "removed promo code");
        }

        self.delete(PROMO_CODE_KEY).await
    }

    /// Replace the in-memory state with whatever is persisted.
    ///
    /// Absent keys leave the current state as it is. Read and decode failures
    /// are logged and otherwise ignored, per key.
    pub async fn load_cart(&mut self) {
        if let Some(items) = self.read::<Vec<CartItem>>(CART_ITEMS_KEY).await {
            self.items = sanitize_items(items);
        }

        if let Some(promo) = self.read::<PromoCode>(PROMO_CODE_KEY).await {
            self.promo_code = Some(promo);
        }

        debug!(
            items = self.items.len(),
            promo_code = self.promo_code.as_ref().map(|promo| promo.code.as_str()),
            "loaded cart"
        );
    }

    /// Sum of `price × quantity` over all lines.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the subtotal does not fit in minor units.
    pub fn subtotal(&self) -> Result<Money<'static, Currency>, PricingError> {
        pricing::subtotal(&self.items, self.currency)
    }

    /// Discount granted by the active promo code, zero without one.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the subtotal or percentage cannot be computed.
    pub fn discount(&self) -> Result<Money<'static, Currency>, PricingError> {
        pricing::discount(self.promo_code.as_ref(), &self.subtotal()?)
    }

    /// Amount payable including shipping, never negative. Zero for an empty cart.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the cart cannot be priced.
    pub fn total(&self) -> Result<Money<'static, Currency>, PricingError> {
        pricing::total(&self.items, self.promo_code.as_ref(), self.shipping_fee)
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up a line by id.
    pub fn item(&self, id: &CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|line| line.id == *id)
    }

    /// Active promo code.
    pub fn promo_code(&self) -> Option<&PromoCode> {
        self.promo_code.as_ref()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Cart currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Flat shipping fee added to non-empty carts.
    pub fn shipping_fee(&self) -> Money<'static, Currency> {
        self.shipping_fee
    }

    /// Registry promo codes are looked up in.
    pub fn promotions(&self) -> &PromoRegistry {
        &self.promotions
    }

    /// Backing storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn next_item_id(
        &self,
        product: &ProductId,
        size: Option<&str>,
        color: Option<&str>,
    ) -> CartItemId {
        let mut created_ms = Timestamp::now().as_millisecond();

        loop {
            let id = CartItemId::synthesize(product, size, color, created_ms);

            if self.item(&id).is_none() {
                return id;
            }

            created_ms += 1;
        }
    }

    async fn persist_items(&self) -> Result<(), CartError> {
        let encoded = serde_json::to_string(&self.items)?;

        self.write(CART_ITEMS_KEY, encoded).await
    }

    async fn write(&self, key: &'static str, value: String) -> Result<(), CartError> {
        self.storage.set(key, value).await.map_err(|error| {
            warn!(key, %error, "failed to persist cart state");
            CartError::Storage(error)
        })
    }

    async fn delete(&self, key: &'static str) -> Result<(), CartError> {
        self.storage.remove(key).await.map_err(|error| {
            warn!(key, %error, "failed to remove cart state");
            CartError::Storage(error)
        })
    }

    async fn read<T: DeserializeOwned>(&self, key: &'static str) -> Option<T> {
        let raw = match self.storage.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                warn!(key, %error, "failed to read cart state");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(key, %error, "discarding unreadable cart state");
                None
            }
        }
    }
}

/// Drop persisted lines that would break the cart invariants: zero quantities
/// and repeated ids (the first occurrence wins).
fn sanitize_items(items: Vec<CartItem>) -> Vec<CartItem> {
    let mut seen = FxHashSet::default();

    items
        .into_iter()
        .filter(|line| {
            let keep = line.quantity > 0 && seen.insert(line.id.clone());

            if !keep {
                warn!(item = %line.id, "dropping invalid persisted line");
            }

            keep
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::EUR;
    use testresult::TestResult;

    use crate::{
        products::{Category, Product},
        storage::{MockStorage, StorageError},
    };

    use super::*;

    fn sneakers() -> Product {
        Product::new("1", "Nike Air Max", 129_99, Category::Shoes)
    }

    fn line(id: &str, quantity: u32) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            product: sneakers(),
            quantity,
            selected_size: None,
            selected_color: None,
        }
    }

    fn unavailable() -> StorageError {
        StorageError::Unavailable("disk full".to_string())
    }

    #[tokio::test]
    async fn failed_write_keeps_in_memory_change() {
        let mut storage = MockStorage::new();

        storage.expect_set().once().returning(|_, _| Err(unavailable()));

        let mut cart = Cart::new(storage, PromoRegistry::default(), EUR);

        let result = cart.add_item(NewCartItem::new(sneakers())).await;

        assert!(
            matches!(result, Err(CartError::Storage(_))),
            "expected Storage error, got {result:?}"
        );
        assert_eq!(cart.len(), 1);
    }

    #[tokio::test]
    async fn zero_quantity_add_does_not_touch_storage() -> TestResult {
        let mut storage = MockStorage::new();

        storage.expect_set().never();

        let mut cart = Cart::new(storage, PromoRegistry::default(), EUR);

        cart.add_item(NewCartItem::new(sneakers()).quantity(0)).await?;

        assert!(cart.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn clear_cart_removes_both_keys_even_if_first_fails() {
        let mut storage = MockStorage::new();

        storage.expect_remove().times(2).returning(|_| Err(unavailable()));

        let mut cart = Cart::new(storage, PromoRegistry::default(), EUR);

        let result = cart.clear_cart().await;

        assert!(matches!(result, Err(CartError::Storage(_))));
        assert!(cart.is_empty());
        assert!(cart.promo_code().is_none());
    }

    #[tokio::test]
    async fn rejected_promo_is_not_persisted() {
        let mut storage = MockStorage::new();

        storage.expect_set().never();

        let mut cart = Cart::new(storage, PromoRegistry::default(), EUR);

        let result = cart.apply_promo_code("SAVE20").await;

        assert!(
            matches!(result, Err(CartError::PromoMinimumNotMet { .. })),
            "expected PromoMinimumNotMet, got {result:?}"
        );
        assert!(cart.promo_code().is_none());
    }

    #[tokio::test]
    async fn failed_promo_write_keeps_promo_applied() {
        let mut storage = MockStorage::new();

        storage.expect_set().once().returning(|_, _| Err(unavailable()));

        let mut cart = Cart::new(storage, PromoRegistry::default(), EUR);

        let result = cart.apply_promo_code("first10").await;

        assert!(matches!(result, Err(CartError::Storage(_))));
        assert_eq!(cart.promo_code().map(|promo| promo.code.as_str()), Some("FIRST10"));
    }

    #[tokio::test]
    async fn load_cart_swallows_read_errors() {
        let mut storage = MockStorage::new();

        storage.expect_get().times(2).returning(|_| Err(unavailable()));

        let mut cart = Cart::new(storage, PromoRegistry::default(), EUR);

        cart.load_cart().await;

        assert!(cart.is_empty());
        assert!(cart.promo_code().is_none());
    }

    #[tokio::test]
    async fn load_cart_ignores_corrupt_items_but_loads_promo() -> TestResult {
        let promo = serde_json::to_string(&PromoCode::fixed("FIRST10", 10_00))?;

        let mut storage = MockStorage::new();

        storage.expect_get().times(2).returning(move |key| {
            if key == CART_ITEMS_KEY {
                Ok(Some("not json".to_string()))
            } else {
                Ok(Some(promo.clone()))
            }
        });

        let mut cart = Cart::new(storage, PromoRegistry::default(), EUR);

        cart.load_cart().await;

        assert!(cart.is_empty());
        assert_eq!(cart.promo_code().map(|promo| promo.code.as_str()), Some("FIRST10"));

        Ok(())
    }

    #[test]
    fn sanitize_drops_zero_quantities_and_duplicate_ids() {
        let items = vec![line("a", 1), line("b", 0), line("a", 4), line("c", 2)];

        let ids: Vec<_> = sanitize_items(items)
            .into_iter()
            .map(|line| (line.id.to_string(), line.quantity))
            .collect();

        assert_eq!(ids, [("a".to_string(), 1), ("c".to_string(), 2)]);
    }

    #[test]
    fn next_item_id_skips_ids_in_use() {
        let mut cart = Cart::new(MockStorage::new(), PromoRegistry::default(), EUR);
        let product = ProductId::new("1");

        let first = cart.next_item_id(&product, None, None);
        cart.items.push(CartItem {
            id: first.clone(),
            ..line("placeholder", 1)
        });

        let second = cart.next_item_id(&product, None, None);

        assert_ne!(first, second);
    }

    #[test]
    fn shipping_fee_can_be_overridden() {
        let cart =
            Cart::new(MockStorage::new(), PromoRegistry::default(), EUR).with_shipping_fee(0);

        assert_eq!(cart.shipping_fee(), Money::from_minor(0, EUR));
    }
}
