//! Catalog
//!
//! The read-only product list the storefront sells from. The cart only ever
//! reads a product's identity and price from here.

use std::{fmt, fs, path::Path};

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

pub mod fixtures;

const BAKERY_FIXTURE_YAML: &str = include_str!("../fixtures/catalog/bakery.yml");

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading a catalog file
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Prices must be in the storefront currency
    #[error("Unsupported currency code: {0}")]
    UnsupportedCurrency(String),

    /// A product was priced below zero
    #[error("Product {0} has a negative price")]
    NegativePrice(ProductId),

    /// Two products share an id
    #[error("Duplicate product id: {0}")]
    DuplicateProduct(ProductId),

    /// A product points at a category that is not defined
    #[error("Product {product} references unknown category {category}")]
    UnknownCategory {
        /// Offending product
        product: ProductId,

        /// Category id it referenced
        category: String,
    },

    /// The catalog has nothing to sell
    #[error("Catalog contains no products")]
    Empty,
}

/// Product identifier.
///
/// Fixtures may use either strings or integers; both normalise to text, so
/// `7` and `"7"` name the same product and a catalog holding both is rejected
/// as a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for ProductId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// Product category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Category id, referenced by products
    pub id: String,

    /// Display name
    pub name: String,

    /// Short blurb
    pub description: String,
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Product description
    pub description: String,

    /// Product price
    pub price: Money<'static, Currency>,

    /// Image URL
    pub image: String,

    /// Category id
    pub category: String,
}

/// Read-only source of products and categories.
pub trait CatalogProvider {
    /// All products, in display order.
    fn list_products(&self) -> &[Product];

    /// All categories, in display order.
    fn list_categories(&self) -> &[Category];

    /// Look up a single product.
    fn product(&self, id: &ProductId) -> Option<&Product> {
        self.list_products().iter().find(|product| &product.id == id)
    }
}

/// Catalog loaded once at start-up.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
    products: Vec<Product>,
    index: FxHashMap<ProductId, usize>,
}

impl Catalog {
    /// Build a catalog from already-parsed parts.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the list is empty, ids repeat, a price is
    /// negative or a product references an unknown category.
    pub fn new(categories: Vec<Category>, products: Vec<Product>) -> Result<Self, CatalogError> {
        if products.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut index = FxHashMap::default();

        for (position, product) in products.iter().enumerate() {
            if product.price.to_minor_units() < 0 {
                return Err(CatalogError::NegativePrice(product.id.clone()));
            }

            if !categories
                .iter()
                .any(|category| category.id == product.category)
            {
                return Err(CatalogError::UnknownCategory {
                    product: product.id.clone(),
                    category: product.category.clone(),
                });
            }

            if index.insert(product.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateProduct(product.id.clone()));
            }
        }

        Ok(Self {
            categories,
            products,
            index,
        })
    }

    /// Parse a catalog from fixture YAML.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the YAML or any price is invalid, or the
    /// resulting catalog fails validation.
    pub fn load(yaml: &str) -> Result<Self, CatalogError> {
        let fixture: fixtures::CatalogFixture = serde_norway::from_str(yaml)?;

        fixture.try_into()
    }

    /// Read and parse a catalog fixture file.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::load(&contents)
    }

    /// The bakery's own menu, embedded at compile time.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the embedded fixture is invalid.
    pub fn bakery() -> Result<Self, CatalogError> {
        Self::load(BAKERY_FIXTURE_YAML)
    }

    /// Products belonging to `category`, in catalog order.
    pub fn products_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Product> {
        self.products
            .iter()
            .filter(move |product| product.category == category)
    }

    /// Number of products
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products. Always false for a validated catalog.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl CatalogProvider for Catalog {
    fn list_products(&self) -> &[Product] {
        &self.products
    }

    fn list_categories(&self) -> &[Category] {
        &self.categories
    }

    fn product(&self, id: &ProductId) -> Option<&Product> {
        self.index
            .get(id)
            .and_then(|position| self.products.get(*position))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use super::*;

    fn category(id: &str) -> Category {
        Category {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
        }
    }

    fn product(id: &str, minor: i64, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_string(),
            description: String::new(),
            price: Money::from_minor(minor, GBP),
            image: String::new(),
            category: category.to_string(),
        }
    }

    #[test]
    fn bakery_fixture_loads_full_menu() -> TestResult {
        let catalog = Catalog::bakery()?;

        assert_eq!(catalog.len(), 20);
        assert_eq!(catalog.list_categories().len(), 5);
        assert_eq!(catalog.products_in("breads").count(), 4);

        let sourdough = catalog
            .product(&ProductId::new("sourdough"))
            .ok_or("sourdough missing")?;

        assert_eq!(sourdough.name, "Sourdough Loaf");
        assert_eq!(sourdough.price, Money::from_minor(450, GBP));

        Ok(())
    }

    #[test]
    fn products_keep_fixture_order() -> TestResult {
        let catalog = Catalog::bakery()?;

        let first = catalog.list_products().first().ok_or("empty catalog")?;

        assert_eq!(first.id, ProductId::new("sourdough"));

        Ok(())
    }

    #[test]
    fn new_rejects_empty_catalog() {
        let result = Catalog::new(vec![category("breads")], Vec::new());

        assert!(matches!(result, Err(CatalogError::Empty)));
    }

    #[test]
    fn new_rejects_duplicate_ids() {
        let result = Catalog::new(
            vec![category("breads")],
            vec![
                product("rye", 425, "breads"),
                product("rye", 450, "breads"),
            ],
        );

        assert!(matches!(result, Err(CatalogError::DuplicateProduct(id)) if id.as_str() == "rye"));
    }

    #[test]
    fn new_rejects_unknown_category() {
        let result = Catalog::new(vec![category("breads")], vec![product("tea", 250, "drinks")]);

        assert!(matches!(
            result,
            Err(CatalogError::UnknownCategory { category, .. }) if category == "drinks"
        ));
    }

    #[test]
    fn new_rejects_negative_price() {
        let result = Catalog::new(vec![category("breads")], vec![product("rye", -1, "breads")]);

        assert!(matches!(result, Err(CatalogError::NegativePrice(_))));
    }

    #[test]
    fn default_lookup_scans_products() {
        struct Shelf(Vec<Product>);

        impl CatalogProvider for Shelf {
            fn list_products(&self) -> &[Product] {
                &self.0
            }

            fn list_categories(&self) -> &[Category] {
                &[]
            }
        }

        let shelf = Shelf(vec![product("baguette", 250, "breads")]);

        assert!(shelf.product(&ProductId::new("baguette")).is_some());
        assert!(shelf.product(&ProductId::new("rye")).is_none());
    }
}
