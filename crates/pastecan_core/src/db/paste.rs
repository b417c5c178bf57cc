//! Paste storage operations backed by redb.

use crate::{db::tables::*, error::AppError, models::paste::Paste};
use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for paste-related redb tables.
pub struct PasteDb {
    db: Arc<redb::Database>,
}

/// Expiry index key component for a paste.
///
/// Pre-epoch timestamps are clamped so index ordering stays total without
/// negative-to-unsigned underflow.
pub(crate) fn expiry_key(expires_at: DateTime<Utc>) -> u64 {
    expires_at.timestamp_millis().max(0) as u64
}

pub(crate) fn deserialize_paste(bytes: &[u8]) -> Result<Paste, bincode::Error> {
    bincode::deserialize(bytes)
}

impl PasteDb {
    /// Initialize paste tables if they do not exist yet.
    ///
    /// # Returns
    /// A new [`PasteDb`] accessor bound to `db`.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(PASTES)?;
        write_txn.open_table(PASTE_SLUGS)?;
        write_txn.open_table(PASTES_BY_EXPIRY)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a new paste row with a slug-uniqueness constraint.
    ///
    /// All three tables are written in one transaction, so slug uniqueness is
    /// enforced by the store itself rather than by a check-then-insert race in
    /// caller code. An expired occupant of the requested slug is evicted
    /// inline; a live occupant is a conflict.
    ///
    /// # Arguments
    /// - `paste`: Paste row to persist.
    /// - `now`: Instant used to evaluate the occupant's expiry.
    ///
    /// # Returns
    /// `Ok(())` when the insert commits.
    ///
    /// # Errors
    /// [`AppError::SlugTaken`] when the slug is held by a live paste;
    /// [`AppError::StorageMessage`] when the id already exists (store fault,
    /// never retried); storage/serialization errors otherwise.
    pub fn insert(&self, paste: &Paste, now: DateTime<Utc>) -> Result<(), AppError> {
        let encoded = bincode::serialize(paste)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut pastes = write_txn.open_table(PASTES)?;
            let mut slugs = write_txn.open_table(PASTE_SLUGS)?;
            let mut expiries = write_txn.open_table(PASTES_BY_EXPIRY)?;

            if pastes.get(paste.id.as_str())?.is_some() {
                return Err(AppError::StorageMessage(format!(
                    "Paste id '{}' already exists",
                    paste.id
                )));
            }

            let occupant_id = match slugs.get(paste.slug.as_str())? {
                Some(guard) => Some(guard.value().to_string()),
                None => None,
            };
            if let Some(occupant_id) = occupant_id {
                let occupant = match pastes.get(occupant_id.as_str())? {
                    Some(guard) => Some(deserialize_paste(guard.value())?),
                    None => None,
                };
                match occupant {
                    Some(row) if !row.is_expired(now) => {
                        return Err(AppError::SlugTaken(paste.slug.clone()));
                    }
                    Some(row) => {
                        let _ = pastes.remove(row.id.as_str())?;
                        let _ = expiries.remove((expiry_key(row.expires_at), row.id.as_str()))?;
                        let _ = slugs.remove(paste.slug.as_str())?;
                    }
                    None => {
                        // Dangling index row; reclaim it.
                        let _ = slugs.remove(paste.slug.as_str())?;
                    }
                }
            }

            pastes.insert(paste.id.as_str(), encoded.as_slice())?;
            slugs.insert(paste.slug.as_str(), paste.id.as_str())?;
            expiries.insert((expiry_key(paste.expires_at), paste.id.as_str()), ())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Fetch a paste by capability id.
    ///
    /// # Returns
    /// `Ok(Some(paste))` when found, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, id: &str) -> Result<Option<Paste>, AppError> {
        let read_txn = self.db.begin_read()?;
        let pastes = read_txn.open_table(PASTES)?;
        match pastes.get(id)? {
            Some(value) => Ok(Some(deserialize_paste(value.value())?)),
            None => Ok(None),
        }
    }

    /// Fetch a paste by slug.
    ///
    /// # Returns
    /// `Ok(Some(paste))` when found, `Ok(None)` when missing or when the slug
    /// row dangles.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get_by_slug(&self, slug: &str) -> Result<Option<Paste>, AppError> {
        let read_txn = self.db.begin_read()?;
        let slugs = read_txn.open_table(PASTE_SLUGS)?;
        let id = match slugs.get(slug)? {
            Some(guard) => guard.value().to_string(),
            None => return Ok(None),
        };
        let pastes = read_txn.open_table(PASTES)?;
        match pastes.get(id.as_str())? {
            Some(value) => Ok(Some(deserialize_paste(value.value())?)),
            None => Ok(None),
        }
    }

    /// Replace a paste's content and content type.
    ///
    /// Slug and expiry are untouched, so the slug and expiry indexes stay
    /// valid without rewrites.
    ///
    /// # Returns
    /// `Ok(Some(paste))` with the updated row, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn update_content(
        &self,
        id: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<Option<Paste>, AppError> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut pastes = write_txn.open_table(PASTES)?;

            let Some(guard) = pastes.get(id)? else {
                return Ok(None);
            };
            let mut paste = deserialize_paste(guard.value())?;
            drop(guard);

            paste.content = content.to_vec();
            paste.content_type = content_type.to_string();

            let encoded = bincode::serialize(&paste)?;
            pastes.insert(id, encoded.as_slice())?;
            Some(paste)
        };

        write_txn.commit()?;
        Ok(updated)
    }

    /// Delete a paste by capability id and return the deleted row.
    ///
    /// # Returns
    /// `Ok(Some(paste))` when deleted, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn delete(&self, id: &str) -> Result<Option<Paste>, AppError> {
        let write_txn = self.db.begin_write()?;
        let deleted = {
            let mut pastes = write_txn.open_table(PASTES)?;
            let mut slugs = write_txn.open_table(PASTE_SLUGS)?;
            let mut expiries = write_txn.open_table(PASTES_BY_EXPIRY)?;

            let Some(guard) = pastes.get(id)? else {
                return Ok(None);
            };
            let paste = deserialize_paste(guard.value())?;
            drop(guard);

            let _ = pastes.remove(id)?;
            let _ = expiries.remove((expiry_key(paste.expires_at), id))?;
            // Only drop the slug row while it still points at this paste.
            let points_here = slugs
                .get(paste.slug.as_str())?
                .map(|guard| guard.value() == id)
                .unwrap_or(false);
            if points_here {
                let _ = slugs.remove(paste.slug.as_str())?;
            }
            Some(paste)
        };

        write_txn.commit()?;
        Ok(deleted)
    }

    /// Bulk-delete every paste whose expiry instant is at or before `now`.
    ///
    /// This is the batch half of the dual deletion design; the lazy half runs
    /// inline on reads. Both evaluate [`Paste::is_expired`]'s predicate.
    ///
    /// # Returns
    /// Number of rows removed.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let cutoff = expiry_key(now);

        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut pastes = write_txn.open_table(PASTES)?;
            let mut slugs = write_txn.open_table(PASTE_SLUGS)?;
            let mut expiries = write_txn.open_table(PASTES_BY_EXPIRY)?;

            let mut doomed: Vec<(u64, String)> = Vec::new();
            for item in expiries.iter()? {
                let (key, _) = item?;
                let (millis, id) = key.value();
                if millis > cutoff {
                    break;
                }
                doomed.push((millis, id.to_string()));
            }

            for (millis, id) in &doomed {
                let slug = match pastes.get(id.as_str())? {
                    Some(guard) => Some(deserialize_paste(guard.value())?.slug),
                    None => None,
                };
                let _ = pastes.remove(id.as_str())?;
                if let Some(slug) = slug {
                    let points_here = slugs
                        .get(slug.as_str())?
                        .map(|guard| guard.value() == id.as_str())
                        .unwrap_or(false);
                    if points_here {
                        let _ = slugs.remove(slug.as_str())?;
                    }
                }
                let _ = expiries.remove((*millis, id.as_str()))?;
            }

            doomed.len()
        };

        write_txn.commit()?;
        Ok(removed)
    }
}
