//! Cart
//!
//! The session's shopping cart. There is exactly one line per product, lines
//! keep insertion order, and a line never holds a quantity below one.

use std::fmt;

use rusty_money::{
    Money,
    iso::{Currency, GBP},
};
use slotmap::{SlotMap, new_key_type};

use crate::catalog::{Product, ProductId};

new_key_type! {
    /// Handle returned by [`CartStore::subscribe`]
    pub struct SubscriberKey;
}

/// A product and quantity held in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineItem {
    /// Product this line refers to
    pub product_id: ProductId,

    /// Product name at the time it was added
    pub name: String,

    /// Unit price captured when the product was first added
    pub price: Money<'static, Currency>,

    /// Always at least one
    pub quantity: u32,

    /// Product image URL
    pub image: String,
}

impl CartLineItem {
    fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity: 1,
            image: product.image.clone(),
        }
    }

    /// Unit price multiplied by quantity.
    pub fn line_total(&self) -> Money<'static, Currency> {
        Money::from_minor(
            self.price
                .to_minor_units()
                .saturating_mul(i64::from(self.quantity)),
            self.price.currency(),
        )
    }
}

/// What a cart mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChangeKind {
    /// A new line was added, or an existing line incremented
    Added,

    /// A line was removed
    Removed,

    /// A line's quantity was set
    QuantityChanged,

    /// Every line was removed
    Cleared,
}

/// Notification delivered to cart subscribers after each effective mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartChange {
    /// What happened
    pub kind: CartChangeKind,

    /// Product affected, `None` when the whole cart was cleared
    pub product_id: Option<ProductId>,

    /// Cart revision after the change
    pub revision: u64,
}

type Listener = Box<dyn Fn(&CartChange) + Send + Sync>;

/// Cart state, owned by one storefront session.
pub struct CartStore {
    items: Vec<CartLineItem>,
    currency: &'static Currency,
    revision: u64,
    subscribers: SlotMap<SubscriberKey, Listener>,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items)
            .field("currency", &self.currency.iso_alpha_code)
            .field("revision", &self.revision)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    /// Create an empty GBP cart.
    pub fn new() -> Self {
        Self::with_currency(GBP)
    }

    /// Create an empty cart in `currency`.
    pub fn with_currency(currency: &'static Currency) -> Self {
        Self {
            items: Vec::new(),
            currency,
            revision: 0,
            subscribers: SlotMap::with_key(),
        }
    }

    /// Add one unit of `product`, snapshotting its price on first add.
    pub fn add_to_cart(&mut self, product: &Product) {
        if let Some(item) = self.line_mut(&product.id) {
            item.quantity = item.quantity.saturating_add(1);
        } else {
            self.items.push(CartLineItem::from_product(product));
        }

        self.notify(CartChangeKind::Added, Some(product.id.clone()));
    }

    /// Add `quantity` units of `product` as one change. Adding zero does nothing.
    pub fn add_quantity(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }

        if let Some(item) = self.line_mut(&product.id) {
            item.quantity = item.quantity.saturating_add(quantity);
        } else {
            self.items.push(CartLineItem {
                quantity,
                ..CartLineItem::from_product(product)
            });
        }

        self.notify(CartChangeKind::Added, Some(product.id.clone()));
    }

    /// Remove the line for `id`. Does nothing if there is none.
    pub fn remove_from_cart(&mut self, id: &ProductId) {
        let before = self.items.len();

        self.items.retain(|item| &item.product_id != id);

        if self.items.len() != before {
            self.notify(CartChangeKind::Removed, Some(id.clone()));
        }
    }

    /// Set the quantity for `id`. A quantity of zero or less removes the line.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_from_cart(id);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        let Some(item) = self.line_mut(id) else {
            return;
        };

        if item.quantity == quantity {
            return;
        }

        item.quantity = quantity;

        self.notify(CartChangeKind::QuantityChanged, Some(id.clone()));
    }

    /// Remove every line.
    pub fn clear_cart(&mut self) {
        if self.items.is_empty() {
            return;
        }

        self.items.clear();

        self.notify(CartChangeKind::Cleared, None);
    }

    /// Sum of price × quantity over all lines.
    pub fn total_price(&self) -> Money<'static, Currency> {
        let minor = self
            .items
            .iter()
            .map(|item| item.line_total().to_minor_units())
            .fold(0_i64, i64::saturating_add);

        Money::from_minor(minor, self.currency)
    }

    /// Sum of quantities over all lines.
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Quantity held for `id`, or zero.
    pub fn item_quantity(&self, id: &ProductId) -> u32 {
        self.line(id).map_or(0, |item| item.quantity)
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Line for `id`, if present.
    pub fn line(&self, id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.product_id == id)
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Incremented on every effective mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a listener called after every effective mutation.
    pub fn subscribe(
        &mut self,
        listener: impl Fn(&CartChange) + Send + Sync + 'static,
    ) -> SubscriberKey {
        self.subscribers.insert(Box::new(listener))
    }

    /// Drop a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, key: SubscriberKey) -> bool {
        self.subscribers.remove(key).is_some()
    }

    fn line_mut(&mut self, id: &ProductId) -> Option<&mut CartLineItem> {
        self.items.iter_mut().find(|item| &item.product_id == id)
    }

    fn notify(&mut self, kind: CartChangeKind, product_id: Option<ProductId>) {
        self.revision += 1;

        let change = CartChange {
            kind,
            product_id,
            revision: self.revision,
        };

        for listener in self.subscribers.values() {
            listener(&change);
        }
    }
}
