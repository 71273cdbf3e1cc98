use bakehouse::{catalog::CatalogProvider, pricing::format_price};
use bakehouse_app::{config::AppConfig, storefront::Storefront};
use clap::Args;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

#[derive(Debug, Args)]
pub(crate) struct CatalogArgs {
    /// Only list products in this category
    #[arg(long)]
    category: Option<String>,
}

pub(crate) fn run(config: &AppConfig, args: &CatalogArgs) -> Result<(), String> {
    let storefront = Storefront::from_config(config).map_err(|error| error.to_string())?;
    let catalog = storefront.catalog();

    if let Some(category) = &args.category
        && !catalog
            .list_categories()
            .iter()
            .any(|known| &known.id == category)
    {
        return Err(format!("unknown category: {category}"));
    }

    let mut builder = Builder::default();

    builder.push_record([
        "Id".to_string(),
        "Name".to_string(),
        "Category".to_string(),
        "Price".to_string(),
    ]);

    for product in catalog.list_products().iter().filter(|product| {
        args.category
            .as_ref()
            .is_none_or(|category| &product.category == category)
    }) {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.category.clone(),
            format_price(&product.price),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(3..4), Alignment::right());

    println!("{table}");

    Ok(())
}
