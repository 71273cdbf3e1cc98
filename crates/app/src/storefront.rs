//! Storefront session: catalog, cart and checkout wired to order submission.

use bakehouse::{
    cart::CartStore,
    catalog::{Catalog, CatalogError, CatalogProvider, ProductId},
    checkout::{CheckoutEffect, CheckoutError, CheckoutFlow, Confirmation},
    orders::Order,
};
use jiff::Timestamp;
use thiserror::Error;
use tracing::info;

use crate::{
    config::AppConfig,
    submission::{DispatchError, OrderSubmissionService},
};

/// Errors raised while building a storefront.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// The catalog could not be loaded.
    #[error("failed to load catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// The order endpoint client could not be built.
    #[error("failed to set up order endpoint: {0}")]
    Endpoint(#[from] DispatchError),
}

/// Errors raised by storefront operations.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// The product id is not in the catalog.
    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),

    /// Checkout rejected the action.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Checkout finished without producing a confirmation.
    #[error("checkout did not produce a confirmation")]
    MissingConfirmation,
}

/// An order that went through checkout, with what the customer was shown.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    /// The submitted order
    pub order: Order,

    /// Confirmation details
    pub confirmation: Confirmation,
}

/// A single customer session.
#[derive(Debug)]
pub struct Storefront {
    catalog: Catalog,
    cart: CartStore,
    checkout: CheckoutFlow,
    orders: OrderSubmissionService,
}

impl Storefront {
    /// Session over `catalog` submitting through `orders`.
    pub fn new(catalog: Catalog, orders: OrderSubmissionService) -> Self {
        Self {
            catalog,
            cart: CartStore::new(),
            checkout: CheckoutFlow::new(),
            orders,
        }
    }

    /// Build a session from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or endpoint client cannot be set up.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let catalog = match &config.catalog_path {
            Some(path) => Catalog::from_path(path)?,
            None => Catalog::bakery()?,
        };

        let orders = OrderSubmissionService::from_config(&config.submission, &config.backup)?;

        Ok(Self::new(catalog, orders))
    }

    /// Product catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current cart
    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Mutable cart
    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    /// Checkout state
    pub fn checkout(&self) -> &CheckoutFlow {
        &self.checkout
    }

    /// Mutable checkout state
    pub fn checkout_mut(&mut self) -> &mut CheckoutFlow {
        &mut self.checkout
    }

    /// Submission service
    pub fn orders(&self) -> &OrderSubmissionService {
        &self.orders
    }

    /// Add `quantity` of catalog product `id` to the cart, on top of any
    /// quantity already there.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::UnknownProduct`] if `id` is not in the catalog.
    pub fn add_product(&mut self, id: &ProductId, quantity: u32) -> Result<(), StorefrontError> {
        let product = self
            .catalog
            .product(id)
            .ok_or_else(|| StorefrontError::UnknownProduct(id.clone()))?;

        self.cart.add_quantity(product, quantity);

        Ok(())
    }

    /// Confirm checkout and carry out the resulting effects until the order is
    /// confirmed.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Checkout`] if validation fails; the cart is
    /// left untouched in that case.
    pub async fn place_order(&mut self) -> Result<PlacedOrder, StorefrontError> {
        let mut effect = self.checkout.confirm(&self.cart, Timestamp::now())?;
        let mut placed = None;

        loop {
            effect = match effect {
                CheckoutEffect::SubmitOrder(order) => {
                    let outcome = self.orders.submit(&order).await;

                    info!(
                        reference_number = %order.reference_number(),
                        delivered = outcome.is_delivered(),
                        "order confirmed"
                    );

                    placed = Some(order);
                    self.checkout.finish_submission(outcome)?
                }
                CheckoutEffect::ClearCart => {
                    self.cart.clear_cart();
                    break;
                }
            };
        }

        let confirmation = self
            .checkout
            .confirmation()
            .cloned()
            .ok_or(StorefrontError::MissingConfirmation)?;
        let order = placed.ok_or(StorefrontError::MissingConfirmation)?;

        Ok(PlacedOrder {
            order,
            confirmation,
        })
    }
}
