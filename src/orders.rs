//! Orders
//!
//! An [`Order`] is assembled once, at the moment checkout is confirmed, and is
//! never changed afterwards.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rand::Rng;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    cart::CartLineItem,
    delivery::DeliveryOption,
    pricing::{OrderTotals, format_price},
};

/// Prefix shared by every reference number.
pub const REFERENCE_PREFIX: &str = "AWA";

const REFERENCE_LETTERS: usize = 3;
const REFERENCE_DIGITS: usize = 4;

/// String did not have the `AWA-XXX-0000` shape.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid reference number: {0}")]
pub struct ReferenceNumberError(String);

/// Short identifier the customer quotes when paying, e.g. `AWA-XYZ-1234`.
///
/// Generated randomly and never checked against previous orders, so collisions
/// are possible. Orders are reconciled by hand, which tolerates that.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceNumber(String);

impl ReferenceNumber {
    /// Generate a reference from the thread-local RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Generate a reference from `rng`.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let letters: String = (0..REFERENCE_LETTERS)
            .map(|_| char::from(b'A' + rng.gen_range(0..26_u8)))
            .collect();
        let digits: String = (0..REFERENCE_DIGITS)
            .map(|_| char::from(b'0' + rng.gen_range(0..10_u8)))
            .collect();

        Self(format!("{REFERENCE_PREFIX}-{letters}-{digits}"))
    }

    /// Borrow as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ReferenceNumber {
    type Err = ReferenceNumberError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ReferenceNumberError(value.to_string());

        let rest = value
            .strip_prefix(REFERENCE_PREFIX)
            .and_then(|rest| rest.strip_prefix('-'))
            .ok_or_else(invalid)?;
        let (letters, digits) = rest.split_once('-').ok_or_else(invalid)?;

        let letters_ok = letters.len() == REFERENCE_LETTERS
            && letters.chars().all(|c| c.is_ascii_uppercase());
        let digits_ok =
            digits.len() == REFERENCE_DIGITS && digits.chars().all(|c| c.is_ascii_digit());

        if letters_ok && digits_ok {
            Ok(Self(value.to_string()))
        } else {
            Err(invalid())
        }
    }
}

/// Contact details as typed into the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerInfo {
    /// Customer name
    pub name: String,

    /// Contact phone number
    pub phone: String,

    /// Delivery address; only read for delivery orders
    pub address: String,

    /// Free-text notes for the bakery
    pub notes: String,
}

/// Customer details recorded on an order, trimmed and with unused fields dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCustomer {
    /// Customer name
    pub name: String,

    /// Contact phone number
    pub phone: String,

    /// Present only for delivery orders
    pub address: Option<String>,

    /// Present only when the customer wrote something
    pub notes: Option<String>,
}

impl OrderCustomer {
    /// Normalise form input for `option`.
    pub fn from_form(info: &CustomerInfo, option: DeliveryOption) -> Self {
        let non_empty = |value: &str| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        Self {
            name: info.name.trim().to_string(),
            phone: info.phone.trim().to_string(),
            address: option
                .requires_address()
                .then(|| non_empty(&info.address))
                .flatten(),
            notes: non_empty(&info.notes),
        }
    }
}

/// A submitted order.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    reference_number: ReferenceNumber,
    items: Vec<CartLineItem>,
    totals: OrderTotals,
    delivery_option: DeliveryOption,
    customer: OrderCustomer,
    submitted_at: Timestamp,
}

impl Order {
    /// Assemble an order; totals are derived from `items` and `delivery_option`.
    pub fn new(
        reference_number: ReferenceNumber,
        items: Vec<CartLineItem>,
        currency: &'static Currency,
        delivery_option: DeliveryOption,
        customer: OrderCustomer,
        submitted_at: Timestamp,
    ) -> Self {
        let subtotal_minor = items
            .iter()
            .map(|item| item.line_total().to_minor_units())
            .fold(0_i64, i64::saturating_add);
        let totals = OrderTotals::compute(Money::from_minor(subtotal_minor, currency), delivery_option);

        Self {
            reference_number,
            items,
            totals,
            delivery_option,
            customer,
            submitted_at,
        }
    }

    /// Reference number shown to the customer
    pub fn reference_number(&self) -> &ReferenceNumber {
        &self.reference_number
    }

    /// Line items as they were when the order was placed
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Subtotal, delivery fee and total
    pub fn totals(&self) -> &OrderTotals {
        &self.totals
    }

    /// Chosen delivery option
    pub fn delivery_option(&self) -> DeliveryOption {
        self.delivery_option
    }

    /// Customer details
    pub fn customer(&self) -> &OrderCustomer {
        &self.customer
    }

    /// When checkout was confirmed
    pub fn submitted_at(&self) -> Timestamp {
        self.submitted_at
    }

    /// Number of units across all lines
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// One-line item list, e.g. `Sourdough Loaf x2 (£4.50 each), Flat White x1 (£3.50 each)`.
    pub fn itemized_text(&self) -> String {
        self.items
            .iter()
            .map(|item| {
                format!(
                    "{} x{} ({} each)",
                    item.name,
                    item.quantity,
                    format_price(&item.price)
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Why an order was kept locally instead of reaching the order endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferralReason {
    /// No endpoint URL was configured
    EndpointNotConfigured,

    /// The endpoint could not be reached or did not accept the order
    DeliveryFailed(String),
}

impl fmt::Display for DeferralReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndpointNotConfigured => f.write_str("no order endpoint configured"),
            Self::DeliveryFailed(reason) => write!(f, "order endpoint failed: {reason}"),
        }
    }
}

/// Result of handing an order to the submission service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The endpoint confirmed it received the order
    Delivered,

    /// The order was logged and backed up locally for manual processing
    Deferred(DeferralReason),
}

impl SubmissionOutcome {
    /// Whether the customer should see a confirmation. Deferred orders count,
    /// because the reference number is enough to reconcile them later.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Delivered | Self::Deferred(_))
    }

    /// Whether the endpoint itself accepted the order.
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}
