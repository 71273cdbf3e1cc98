//! Backup Config

use std::path::PathBuf;

use clap::Args;

/// Local order backup settings.
#[derive(Debug, Clone, Args)]
pub struct BackupConfig {
    /// Directory holding the order backup file
    #[arg(long, env = "BACKUP_DIR", default_value = ".bakehouse", global = true)]
    pub backup_dir: PathBuf,

    /// Maximum number of backed-up orders kept; 0 keeps every order
    #[arg(long, env = "BACKUP_MAX_ENTRIES", default_value_t = 500_usize, global = true)]
    pub backup_max_entries: usize,
}
