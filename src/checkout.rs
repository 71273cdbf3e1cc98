//! Checkout
//!
//! The checkout surface as an explicit state machine:
//!
//! ```text
//! Collecting --confirm--> Submitting --finish_submission--> Confirmed
//!     |  ^                                                      |
//!   close reopen                                              close
//!     v  |                                                      |
//!    Closed                               Collecting <----------+
//! ```
//!
//! Transitions never perform I/O. They return a [`CheckoutEffect`] that the
//! caller carries out: submitting the order, then clearing the cart.

use jiff::Timestamp;
use rand::Rng;
use thiserror::Error;

use crate::{
    cart::CartStore,
    delivery::{DELIVERY_DAY, DeliveryOption, PICKUP_DAY, PICKUP_LOCATION},
    orders::{CustomerInfo, Order, OrderCustomer, ReferenceNumber, SubmissionOutcome},
    pricing::OrderTotals,
};

/// Phone number customers can call about payment.
pub const CONTACT_PHONE: &str = "07761 901518";

/// Checkout errors. Validation variants carry the message shown to the customer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Name or phone left blank
    #[error("Please fill in your name and phone number.")]
    MissingNameOrPhone,

    /// Delivery chosen without an address
    #[error("Please provide your delivery address.")]
    MissingAddress,

    /// Nothing to order
    #[error("Your basket is empty.")]
    EmptyCart,

    /// The requested action is not allowed in the current stage
    #[error("cannot {action} while checkout is {stage}")]
    InvalidTransition {
        /// Attempted action
        action: &'static str,

        /// Stage the flow was in
        stage: CheckoutStage,
    },
}

impl CheckoutError {
    /// Whether the customer can fix this by editing the form.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingNameOrPhone | Self::MissingAddress | Self::EmptyCart
        )
    }
}

/// Where the checkout flow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStage {
    /// Customer is choosing delivery and filling in details
    Collecting,

    /// The order has been handed to the submission service
    Submitting,

    /// The customer has their reference number
    Confirmed,

    /// Checkout was dismissed before confirming
    Closed,
}

impl std::fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Collecting => "collecting",
            Self::Submitting => "submitting",
            Self::Confirmed => "confirmed",
            Self::Closed => "closed",
        })
    }
}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutEffect {
    /// Hand this order to the submission service, then call
    /// [`CheckoutFlow::finish_submission`]
    SubmitOrder(Order),

    /// Empty the cart
    ClearCart,
}

/// Details shown on the confirmation screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    /// Reference to quote when paying
    pub reference_number: ReferenceNumber,

    /// Chosen delivery option
    pub delivery_option: DeliveryOption,

    /// Totals charged
    pub totals: OrderTotals,

    /// Delivery address, for delivery orders
    pub address: Option<String>,

    /// How the order was recorded; not shown to the customer
    pub outcome: SubmissionOutcome,
}

impl Confirmation {
    /// Payment instructions, one line per entry.
    pub fn payment_instructions(&self) -> [String; 5] {
        [
            format!(
                "Please use reference {} when making payment through:",
                self.reference_number
            ),
            "• Bank Transfer".to_string(),
            "• PayPal".to_string(),
            "• Cash on collection/delivery".to_string(),
            format!("• Call us at {CONTACT_PHONE} for other payment options"),
        ]
    }

    /// Collection or delivery information for the chosen option.
    pub fn handover_information(&self) -> String {
        match self.delivery_option {
            DeliveryOption::Pickup => format!(
                "Your order will be ready for collection on {PICKUP_DAY} at our bakery: {PICKUP_LOCATION}"
            ),
            DeliveryOption::Delivery => format!(
                "Your order will be delivered on {DELIVERY_DAY} to the address you provided."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PendingOrder {
    reference_number: ReferenceNumber,
    delivery_option: DeliveryOption,
    totals: OrderTotals,
    address: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum CheckoutState {
    Collecting,
    Submitting(Box<PendingOrder>),
    Confirmed(Box<Confirmation>),
    Closed,
}

/// Checkout state machine for a single storefront session.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutFlow {
    state: CheckoutState,
    delivery_option: DeliveryOption,
    customer: CustomerInfo,
}

impl Default for CheckoutFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutFlow {
    /// Start collecting details, with pickup selected.
    pub fn new() -> Self {
        Self {
            state: CheckoutState::Collecting,
            delivery_option: DeliveryOption::default(),
            customer: CustomerInfo::default(),
        }
    }

    /// Current stage
    pub fn stage(&self) -> CheckoutStage {
        match self.state {
            CheckoutState::Collecting => CheckoutStage::Collecting,
            CheckoutState::Submitting(_) => CheckoutStage::Submitting,
            CheckoutState::Confirmed(_) => CheckoutStage::Confirmed,
            CheckoutState::Closed => CheckoutStage::Closed,
        }
    }

    /// Selected delivery option
    pub fn delivery_option(&self) -> DeliveryOption {
        self.delivery_option
    }

    /// Form contents
    pub fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    /// Confirmation details, once confirmed.
    pub fn confirmation(&self) -> Option<&Confirmation> {
        match &self.state {
            CheckoutState::Confirmed(confirmation) => Some(confirmation),
            _ => None,
        }
    }

    /// Live totals for `cart` under the selected option.
    pub fn quote(&self, cart: &CartStore) -> OrderTotals {
        OrderTotals::compute(cart.total_price(), self.delivery_option)
    }

    /// Choose pickup or delivery.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] outside `Collecting`.
    pub fn select_delivery(&mut self, option: DeliveryOption) -> Result<(), CheckoutError> {
        self.require_collecting("change delivery option")?;
        self.delivery_option = option;

        Ok(())
    }

    /// Replace the form contents.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] outside `Collecting`.
    pub fn update_customer(&mut self, customer: CustomerInfo) -> Result<(), CheckoutError> {
        self.require_collecting("edit customer details")?;
        self.customer = customer;

        Ok(())
    }

    /// Validate the form and, if it passes, move to `Submitting`.
    ///
    /// # Errors
    ///
    /// Returns a validation [`CheckoutError`] and stays in `Collecting` when
    /// details are missing or the cart is empty, or
    /// [`CheckoutError::InvalidTransition`] outside `Collecting`.
    pub fn confirm(
        &mut self,
        cart: &CartStore,
        submitted_at: Timestamp,
    ) -> Result<CheckoutEffect, CheckoutError> {
        self.confirm_with(cart, &mut rand::thread_rng(), submitted_at)
    }

    /// [`CheckoutFlow::confirm`] drawing the reference number from `rng`.
    ///
    /// # Errors
    ///
    /// See [`CheckoutFlow::confirm`].
    pub fn confirm_with<R: Rng + ?Sized>(
        &mut self,
        cart: &CartStore,
        rng: &mut R,
        submitted_at: Timestamp,
    ) -> Result<CheckoutEffect, CheckoutError> {
        self.require_collecting("confirm")?;
        self.validate(cart)?;

        let customer = OrderCustomer::from_form(&self.customer, self.delivery_option);
        let order = Order::new(
            ReferenceNumber::generate_with(rng),
            cart.items().to_vec(),
            cart.currency(),
            self.delivery_option,
            customer,
            submitted_at,
        );

        self.state = CheckoutState::Submitting(Box::new(PendingOrder {
            reference_number: order.reference_number().clone(),
            delivery_option: order.delivery_option(),
            totals: *order.totals(),
            address: order.customer().address.clone(),
        }));

        Ok(CheckoutEffect::SubmitOrder(order))
    }

    /// Record the submission result and move to `Confirmed`.
    ///
    /// Any outcome confirms; the returned [`CheckoutEffect::ClearCart`] is
    /// produced once per order.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] outside `Submitting`.
    pub fn finish_submission(
        &mut self,
        outcome: SubmissionOutcome,
    ) -> Result<CheckoutEffect, CheckoutError> {
        let CheckoutState::Submitting(pending) = &self.state else {
            return Err(self.invalid("finish submission"));
        };

        let PendingOrder {
            reference_number,
            delivery_option,
            totals,
            address,
        } = pending.as_ref().clone();

        self.state = CheckoutState::Confirmed(Box::new(Confirmation {
            reference_number,
            delivery_option,
            totals,
            address,
            outcome,
        }));

        Ok(CheckoutEffect::ClearCart)
    }

    /// Dismiss the checkout surface.
    ///
    /// Closing while collecting keeps the form and cart for later. Closing a
    /// confirmation starts a fresh session with an empty form.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] while submitting.
    pub fn close(&mut self) -> Result<(), CheckoutError> {
        match self.state {
            CheckoutState::Collecting | CheckoutState::Closed => {
                self.state = CheckoutState::Closed;
            }
            CheckoutState::Confirmed(_) => *self = Self::new(),
            CheckoutState::Submitting(_) => return Err(self.invalid("close checkout")),
        }

        Ok(())
    }

    /// Reopen a dismissed checkout.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] while submitting or confirmed.
    pub fn reopen(&mut self) -> Result<(), CheckoutError> {
        match self.state {
            CheckoutState::Closed | CheckoutState::Collecting => {
                self.state = CheckoutState::Collecting;
                Ok(())
            }
            CheckoutState::Submitting(_) | CheckoutState::Confirmed(_) => {
                Err(self.invalid("reopen checkout"))
            }
        }
    }

    fn validate(&self, cart: &CartStore) -> Result<(), CheckoutError> {
        if self.customer.name.trim().is_empty() || self.customer.phone.trim().is_empty() {
            return Err(CheckoutError::MissingNameOrPhone);
        }

        if self.delivery_option.requires_address() && self.customer.address.trim().is_empty() {
            return Err(CheckoutError::MissingAddress);
        }

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Ok(())
    }

    fn require_collecting(&self, action: &'static str) -> Result<(), CheckoutError> {
        if matches!(self.state, CheckoutState::Collecting) {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> CheckoutError {
        CheckoutError::InvalidTransition {
            action,
            stage: self.stage(),
        }
    }
}
