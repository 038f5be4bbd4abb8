//! Trolley prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CART_ITEMS_KEY, Cart, CartError, PROMO_CODE_KEY},
    catalog::{Catalog, CatalogError},
    items::{CartItem, CartItemId, NewCartItem},
    pricing::{DEFAULT_SHIPPING_FEE, PricingError},
    products::{Category, Product, ProductId, UnknownCategory},
    promotions::{PromoCode, PromoDiscount, PromoRegistry, PromoRegistryError},
    storage::{FileStorage, MemoryStorage, Storage, StorageError},
    summary::CartSummary,
};
