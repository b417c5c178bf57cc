//! Paste data models.

use crate::constants::CONTENT_TYPE_URL;
use crate::ident;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Paste row stored in the database.
///
/// `id` is the immutable capability token; `slug` is the human-facing path
/// segment. The two are independent so that knowing where a paste lives never
/// grants the right to change it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paste {
    pub id: String,
    pub slug: String,
    pub content: Vec<u8>,
    pub content_type: String,
    pub expires_at: DateTime<Utc>,
    /// Shared secret guarding update/delete in secret-auth deployments.
    #[serde(default)]
    pub secret: Option<String>,
}

impl Paste {
    /// Create a new paste row with a freshly generated capability id.
    ///
    /// # Arguments
    /// - `slug`: Resolved slug (generated or client label).
    /// - `content`: Paste bytes.
    /// - `content_type`: MIME type or the `url` sentinel.
    /// - `expires_at`: Absolute expiry instant.
    ///
    /// # Returns
    /// A new [`Paste`] instance without a secret.
    pub fn new(
        slug: String,
        content: Vec<u8>,
        content_type: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ident::generate_id(),
            slug,
            content,
            content_type,
            expires_at,
            secret: None,
        }
    }

    /// Expiry predicate shared by the lazy read path and the batch sweep.
    ///
    /// Expiry is never a stored state; both deletion paths evaluate this same
    /// predicate so clock handling cannot drift between them.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether this paste redirects instead of serving bytes.
    pub fn is_redirect(&self) -> bool {
        self.content_type == CONTENT_TYPE_URL
    }

    /// Whether this paste holds text content.
    pub fn is_text(&self) -> bool {
        self.content_type.starts_with("text/")
    }

    /// Content as UTF-8 text when it decodes cleanly.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}

/// Payload for creating a paste.
#[derive(Debug, Clone)]
pub struct NewPaste {
    pub content: Vec<u8>,
    pub content_type: String,
    /// Lifetime in seconds; the configured default applies when `None`.
    pub ttl: Option<u64>,
    /// Client-chosen label used verbatim as the slug; random when `None`.
    pub label: Option<String>,
    /// Shared secret to store with the row (secret-auth deployments only).
    pub secret: Option<String>,
}

/// Payload for replacing a paste's content.
#[derive(Debug, Clone)]
pub struct ContentUpdate {
    pub content: Vec<u8>,
    pub content_type: String,
    /// Secret presented by the caller (secret-auth deployments only).
    pub secret: Option<String>,
}

/// Public coordinates of a freshly created paste.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedPaste {
    pub id: String,
    pub slug: String,
    pub sunset: DateTime<Utc>,
}

impl From<&Paste> for CreatedPaste {
    fn from(value: &Paste) -> Self {
        Self {
            id: value.id.clone(),
            slug: value.slug.clone(),
            sunset: value.expires_at,
        }
    }
}
