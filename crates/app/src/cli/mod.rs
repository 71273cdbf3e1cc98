use bakehouse_app::{config::AppConfig, observability::init_logging};
use clap::{Parser, Subcommand};

mod backups;
mod catalog;
mod checkout;

#[derive(Debug, Parser)]
#[command(name = "bakehouse", about = "Bakehouse storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the products on the menu
    Catalog(catalog::CatalogArgs),

    /// Place an order
    Checkout(checkout::CheckoutArgs),

    /// Inspect orders kept for manual processing
    Backups(backups::BackupsCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        init_logging(&self.config.logging).map_err(|error| error.to_string())?;

        match self.command {
            Commands::Catalog(args) => catalog::run(&self.config, &args),
            Commands::Checkout(args) => checkout::run(&self.config, args).await,
            Commands::Backups(command) => backups::run(&self.config, command),
        }
    }
}
