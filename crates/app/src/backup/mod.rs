//! Local order backup.

mod storage;
mod store;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, MockKeyValueStorage, StorageError};
pub use store::{BACKUP_KEY, BackupError, BackupRecord, OrderBackupStore};
