//! Bakehouse prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CartChange, CartChangeKind, CartLineItem, CartStore, SubscriberKey},
    catalog::{Catalog, CatalogError, CatalogProvider, Category, Product, ProductId},
    checkout::{
        CONTACT_PHONE, CheckoutEffect, CheckoutError, CheckoutFlow, CheckoutStage, Confirmation,
    },
    delivery::{DeliveryOption, ParseDeliveryOptionError},
    orders::{
        CustomerInfo, DeferralReason, Order, OrderCustomer, ReferenceNumber,
        ReferenceNumberError, SubmissionOutcome,
    },
    pricing::{OrderTotals, delivery_fee, format_price, remaining_for_free_delivery},
    receipt::{ReceiptError, render_order_summary, write_order_summary},
};
