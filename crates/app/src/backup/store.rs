//! Order backup store.

use std::{fmt, io, sync::Arc};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    backup::storage::{KeyValueStorage, StorageError},
    submission::OrderSubmission,
};

/// Storage key holding the list of backed-up orders.
pub const BACKUP_KEY: &str = "awadough_orders";

/// Errors raised by the backup store.
#[derive(Debug, Error)]
pub enum BackupError {
    /// The storage backend failed.
    #[error("backup storage error: {0}")]
    Storage(#[from] StorageError),

    /// Stored data could not be encoded or decoded.
    #[error("backup encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Writing an export failed.
    #[error("backup export error: {0}")]
    Io(#[from] io::Error),
}

/// An order kept for manual processing, with the time it was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRecord {
    /// The order as it would have been sent
    #[serde(flatten)]
    pub submission: OrderSubmission,

    /// When the record was written
    pub timestamp: Timestamp,
}

/// Append-only list of orders that did not reach the endpoint, oldest first.
#[derive(Clone)]
pub struct OrderBackupStore {
    storage: Arc<dyn KeyValueStorage>,
    max_entries: usize,
}

impl fmt::Debug for OrderBackupStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderBackupStore")
            .field("max_entries", &self.max_entries)
            .finish_non_exhaustive()
    }
}

impl OrderBackupStore {
    /// Store over `storage` keeping at most `max_entries` records; 0 keeps all.
    pub fn new(storage: Arc<dyn KeyValueStorage>, max_entries: usize) -> Self {
        Self {
            storage,
            max_entries,
        }
    }

    /// Record cap, 0 when unbounded.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Append `submission`, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing list cannot be read or the new one
    /// cannot be written.
    pub fn append(&self, submission: &OrderSubmission) -> Result<(), BackupError> {
        self.append_at(submission, Timestamp::now())
    }

    /// Append `submission` stamped with `timestamp`.
    ///
    /// # Errors
    ///
    /// See [`OrderBackupStore::append`].
    pub fn append_at(
        &self,
        submission: &OrderSubmission,
        timestamp: Timestamp,
    ) -> Result<(), BackupError> {
        let mut records = self.list()?;

        records.push(BackupRecord {
            submission: submission.clone(),
            timestamp,
        });

        if self.max_entries > 0 && records.len() > self.max_entries {
            let dropped = records.len() - self.max_entries;

            records.drain(..dropped);

            warn!(
                dropped,
                max_entries = self.max_entries,
                "order backup is full, dropped oldest records"
            );
        }

        self.storage
            .set(BACKUP_KEY, &serde_json::to_string(&records)?)?;

        Ok(())
    }

    /// All records, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails or holds malformed data.
    pub fn list(&self) -> Result<Vec<BackupRecord>, BackupError> {
        match self.storage.get(BACKUP_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Delete every record.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub fn clear(&self) -> Result<(), BackupError> {
        self.storage.remove(BACKUP_KEY)?;

        Ok(())
    }

    /// Write all records to `out` as pretty JSON, returning how many were written.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the records or writing fails.
    pub fn export(&self, out: &mut impl io::Write) -> Result<usize, BackupError> {
        let records = self.list()?;

        serde_json::to_writer_pretty(&mut *out, &records)?;
        writeln!(out)?;

        Ok(records.len())
    }
}
