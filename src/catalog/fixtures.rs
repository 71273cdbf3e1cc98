//! Catalog Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, GBP},
};
use serde::Deserialize;

use crate::catalog::{Catalog, CatalogError, Category, Product, ProductId};

/// Wrapper for a catalog in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Categories in display order
    #[serde(default)]
    pub categories: Vec<CategoryFixture>,

    /// Products in display order
    pub products: Vec<ProductFixture>,
}

/// Category Fixture
#[derive(Debug, Deserialize)]
pub struct CategoryFixture {
    /// Category id
    pub id: String,

    /// Category name
    pub name: String,

    /// Category description
    #[serde(default)]
    pub description: String,
}

/// Product id as written in YAML, either `7` or `sourdough`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProductIdFixture {
    /// Numeric id
    Number(u64),

    /// Text id
    Text(String),
}

impl From<ProductIdFixture> for ProductId {
    fn from(fixture: ProductIdFixture) -> Self {
        match fixture {
            ProductIdFixture::Number(id) => ProductId::from(id),
            ProductIdFixture::Text(id) => ProductId::from(id),
        }
    }
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product id
    pub id: ProductIdFixture,

    /// Product name
    pub name: String,

    /// Product description
    #[serde(default)]
    pub description: String,

    /// Product price (e.g., "4.50 GBP")
    pub price: String,

    /// Image URL
    #[serde(default)]
    pub image: String,

    /// Category id
    pub category: String,
}

impl From<CategoryFixture> for Category {
    fn from(fixture: CategoryFixture) -> Self {
        Category {
            id: fixture.id,
            name: fixture.name,
            description: fixture.description,
        }
    }
}

impl TryFrom<ProductFixture> for Product {
    type Error = CatalogError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        Ok(Product {
            id: fixture.id.into(),
            name: fixture.name,
            description: fixture.description,
            price: Money::from_minor(minor_units, currency),
            image: fixture.image,
            category: fixture.category,
        })
    }
}

impl TryFrom<CatalogFixture> for Catalog {
    type Error = CatalogError;

    fn try_from(fixture: CatalogFixture) -> Result<Self, Self::Error> {
        let categories = fixture.categories.into_iter().map(Category::from).collect();

        let products = fixture
            .products
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Catalog::new(categories, products)
    }
}

/// Parse price string (e.g., "4.50 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a decimal number, or if the currency is anything other
/// than GBP.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), CatalogError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(CatalogError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| CatalogError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| CatalogError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "GBP" => GBP,
        other => return Err(CatalogError::UnsupportedCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}
