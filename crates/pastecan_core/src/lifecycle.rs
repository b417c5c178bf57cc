//! Paste lifecycle orchestration.
//!
//! Every paste moves through `absent -> active -> (expired-on-read | deleted)
//! -> absent`; there are no other states. Expiry is a predicate over
//! `expires_at` evaluated lazily on access and in batch by the sweep, never a
//! stored flag.

use crate::config::{AuthMode, Config};
use crate::constants::{CONTENT_TYPE_URL, MAX_SLUG_ATTEMPTS, MAX_TTL_SECS};
use crate::db::Database;
use crate::error::AppError;
use crate::ident;
use crate::models::paste::{ContentUpdate, CreatedPaste, NewPaste, Paste};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Orchestrates create/read/update/delete/sweep against the durable store.
pub struct PasteService {
    db: Arc<Database>,
    config: Arc<Config>,
}

impl PasteService {
    /// Construct a service over an open database.
    pub fn new(db: Arc<Database>, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    /// Direct store access, used by maintenance paths and tests.
    pub fn db(&self) -> &Database {
        &self.db
    }

    fn expiry_from_ttl(&self, ttl: Option<u64>) -> DateTime<Utc> {
        let secs = ttl.unwrap_or(self.config.default_ttl_secs).min(MAX_TTL_SECS);
        Utc::now() + Duration::seconds(secs as i64)
    }

    fn validate_content(&self, content: &[u8]) -> Result<(), AppError> {
        if content.is_empty() {
            return Err(AppError::BadRequest("Content is empty.".to_string()));
        }
        if content.len() > self.config.max_content_size {
            return Err(AppError::TooLarge(self.config.max_content_size));
        }
        Ok(())
    }

    /// Create a paste.
    ///
    /// A client label is used verbatim after syntax validation and gets
    /// exactly one insertion attempt; its collision is the caller's conflict.
    /// Random slugs are regenerated (together with the id) on collision up to
    /// [`MAX_SLUG_ATTEMPTS`] times; exhaustion is a fatal allocation failure,
    /// not a client error.
    ///
    /// # Returns
    /// Public coordinates of the stored paste.
    ///
    /// # Errors
    /// [`AppError::BadRequest`]/[`AppError::TooLarge`] on validation,
    /// [`AppError::SlugTaken`] for a taken label,
    /// [`AppError::SlugExhausted`] when retries run out.
    pub fn create(&self, req: NewPaste) -> Result<CreatedPaste, AppError> {
        self.validate_content(&req.content)?;
        let expires_at = self.expiry_from_ttl(req.ttl);

        if let Some(label) = req.label {
            ident::validate_label(&label)?;
            let mut paste = Paste::new(label, req.content, req.content_type, expires_at);
            paste.secret = req.secret;
            self.db.pastes.insert(&paste, Utc::now())?;
            return Ok(CreatedPaste::from(&paste));
        }

        let mut paste = Paste::new(
            ident::generate_slug(),
            req.content,
            req.content_type,
            expires_at,
        );
        paste.secret = req.secret;
        self.insert_with_retry(paste)
    }

    /// Create a URL-redirect paste.
    ///
    /// The body must parse as an absolute URL; its origin is stored with the
    /// `url` content type and served as a redirect target. Size/empty checks
    /// do not apply here, URL validation subsumes them.
    ///
    /// # Errors
    /// [`AppError::BadRequest`] when the body is not an absolute URL.
    pub fn create_url(&self, raw: &str, ttl: Option<u64>) -> Result<CreatedPaste, AppError> {
        let parsed = url::Url::parse(raw.trim()).map_err(|_| {
            AppError::BadRequest("Invalid content format: must be a url".to_string())
        })?;
        let origin = parsed.origin();
        if !origin.is_tuple() {
            // Opaque origins (data:, mailto:) cannot act as redirect targets.
            return Err(AppError::BadRequest(
                "Invalid content format: must be a url".to_string(),
            ));
        }

        let expires_at = self.expiry_from_ttl(ttl);
        let paste = Paste::new(
            ident::generate_slug(),
            origin.ascii_serialization().into_bytes(),
            CONTENT_TYPE_URL.to_string(),
            expires_at,
        );
        self.insert_with_retry(paste)
    }

    fn insert_with_retry(&self, mut paste: Paste) -> Result<CreatedPaste, AppError> {
        for _ in 0..MAX_SLUG_ATTEMPTS {
            match self.db.pastes.insert(&paste, Utc::now()) {
                Ok(()) => return Ok(CreatedPaste::from(&paste)),
                Err(AppError::SlugTaken(_)) => {
                    // Regenerate both halves of the identity and try again.
                    paste.slug = ident::generate_slug();
                    paste.id = ident::generate_id();
                }
                Err(err) => return Err(err),
            }
        }
        Err(AppError::SlugExhausted(MAX_SLUG_ATTEMPTS))
    }

    /// Read a paste by slug.
    ///
    /// An expired row is deleted as a side effect and reported as not-found;
    /// callers cannot distinguish "expired" from "never existed".
    ///
    /// # Errors
    /// [`AppError::NotFound`] when absent or expired; storage errors otherwise.
    pub fn read(&self, slug: &str) -> Result<Paste, AppError> {
        let Some(paste) = self.db.pastes.get_by_slug(slug)? else {
            return Err(AppError::NotFound);
        };
        if paste.is_expired(Utc::now()) {
            self.db.pastes.delete(&paste.id)?;
            tracing::debug!("Lazy-deleted expired paste '{}' on read", paste.id);
            return Err(AppError::NotFound);
        }
        Ok(paste)
    }

    /// Replace a paste's content and content type.
    ///
    /// `token` is the capability id, or the slug in shared-secret mode. Slug
    /// and expiry are untouched. Every authorization failure is a uniform
    /// not-found.
    ///
    /// # Errors
    /// [`AppError::NotFound`] for an unknown/expired token or secret
    /// mismatch; validation and storage errors otherwise.
    pub fn update(&self, token: &str, update: ContentUpdate) -> Result<Paste, AppError> {
        self.validate_content(&update.content)?;
        let current = self.resolve_for_mutation(token, update.secret.as_deref())?;
        self.db
            .pastes
            .update_content(&current.id, &update.content, &update.content_type)?
            .ok_or(AppError::NotFound)
    }

    /// Delete a paste.
    ///
    /// Addressing matches [`PasteService::update`]. Irreversible; a repeat
    /// delete is not-found.
    ///
    /// # Errors
    /// [`AppError::NotFound`] for an unknown/expired token or secret mismatch.
    pub fn delete(&self, token: &str, secret: Option<&str>) -> Result<(), AppError> {
        let current = self.resolve_for_mutation(token, secret)?;
        self.db
            .pastes
            .delete(&current.id)?
            .map(|_| ())
            .ok_or(AppError::NotFound)
    }

    /// Bulk-delete expired pastes.
    ///
    /// Invoked from a periodic timer so storage is reclaimed even for pastes
    /// nobody re-reads.
    ///
    /// # Returns
    /// Number of rows removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        self.db.pastes.sweep_expired(now)
    }

    /// Resolve the row a mutation addresses, enforcing the configured
    /// authorization scheme. Expired rows are lazily deleted here too, so a
    /// mutation can never resurrect a paste the read path already considers
    /// gone.
    fn resolve_for_mutation(
        &self,
        token: &str,
        secret: Option<&str>,
    ) -> Result<Paste, AppError> {
        let row = match self.config.auth_mode {
            AuthMode::CapabilityId => self.db.pastes.get(token)?,
            AuthMode::SharedSecret => self.db.pastes.get_by_slug(token)?,
        }
        .ok_or(AppError::NotFound)?;

        if row.is_expired(Utc::now()) {
            self.db.pastes.delete(&row.id)?;
            tracing::debug!("Lazy-deleted expired paste '{}' on mutation", row.id);
            return Err(AppError::NotFound);
        }

        if self.config.auth_mode == AuthMode::SharedSecret {
            let supplied = secret.ok_or(AppError::NotFound)?;
            let stored = row.secret.as_deref().ok_or(AppError::NotFound)?;
            if supplied != stored {
                return Err(AppError::NotFound);
            }
        }

        Ok(row)
    }
}

#[cfg(test)]
mod tests;
