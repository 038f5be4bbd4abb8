//! Trolley
//!
//! Trolley is a shopping cart state machine with pricing rules and pluggable
//! persistence: line items merged by product variant, percentage and fixed
//! promo codes, and write-through storage of the cart between sessions.

pub mod cart;
pub mod catalog;
pub mod items;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod promotions;
pub mod storage;
pub mod summary;
