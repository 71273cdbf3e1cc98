//! Bakehouse
//!
//! Bakehouse is the order-taking core of a small bakery storefront: a product
//! catalog, a shopping cart, delivery pricing and a checkout state machine.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod delivery;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod receipt;
