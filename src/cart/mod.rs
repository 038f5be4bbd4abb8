//! Cart
//!
//! The cart store owns the line items and the active promo code, derives
//! totals from them and writes its full state through to [`Storage`] on every
//! mutation.
//!
//! [`Storage`]: crate::storage::Storage

pub mod errors;
mod store;

pub use errors::CartError;
pub use store::{CART_ITEMS_KEY, Cart, PROMO_CODE_KEY};
