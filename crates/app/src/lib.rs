//! Bakehouse storefront application: configuration, logging, order submission
//! and the local order backup.

pub mod backup;
pub mod config;
pub mod observability;
pub mod storefront;
pub mod submission;
