//! Storefront configuration module

use std::path::PathBuf;

use clap::Args;

use crate::config::{backup::BackupConfig, logging::LoggingConfig, submission::SubmissionConfig};

pub mod backup;
pub mod logging;
pub mod submission;

/// Bakehouse storefront configuration, read from CLI arguments and environment.
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Catalog fixture file; the bundled bakery menu is used when omitted
    #[arg(long, env = "CATALOG_PATH", global = true)]
    pub catalog_path: Option<PathBuf>,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Order endpoint settings.
    #[command(flatten)]
    pub submission: SubmissionConfig,

    /// Local order backup settings.
    #[command(flatten)]
    pub backup: BackupConfig,
}
