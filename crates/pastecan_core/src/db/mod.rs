//! Database layer for pastecan.

/// Paste storage helpers.
pub mod paste;
/// redb table definitions.
pub mod tables;

use crate::error::AppError;
use std::sync::Arc;
use tables::REDB_FILE_NAME;

#[cfg(test)]
mod tests;

/// Database handle with access to the underlying redb instance.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub pastes: paste::PasteDb,
}

impl Database {
    /// Open the database under `path` and initialize tables.
    ///
    /// # Returns
    /// A fully initialized [`Database`].
    ///
    /// # Errors
    /// Returns an error if redb cannot open the file or tables.
    pub fn new(path: &str) -> Result<Self, AppError> {
        let dir = std::path::Path::new(path);
        std::fs::create_dir_all(dir)
            .map_err(|err| AppError::StorageMessage(format!("Failed to create {}: {}", path, err)))?;

        let db = Arc::new(redb::Database::create(dir.join(REDB_FILE_NAME))?);
        Self::from_shared(db)
    }

    /// Build a database handle from an existing shared redb instance.
    ///
    /// Used when multiple components in the same process need independent
    /// accessors without reopening the database path.
    ///
    /// # Errors
    /// Returns an error if table initialization fails.
    pub fn from_shared(db: Arc<redb::Database>) -> Result<Self, AppError> {
        Ok(Self {
            pastes: paste::PasteDb::new(db.clone())?,
            db,
        })
    }

    /// Clone this handle for another subsystem in the same process.
    ///
    /// # Errors
    /// Returns an error if table initialization fails.
    pub fn share(&self) -> Result<Self, AppError> {
        Self::from_shared(self.db.clone())
    }
}
