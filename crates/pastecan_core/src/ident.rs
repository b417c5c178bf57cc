//! Slug and capability-id allocation.

use crate::constants::{ID_LENGTH, MIN_LABEL_LENGTH, SLUG_LENGTH};
use crate::error::AppError;
use rand::Rng;

/// Alphabet used for generated slugs and ids (lowercase base36).
pub const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random token of `len` characters from [`TOKEN_ALPHABET`].
///
/// `thread_rng` is a CSPRNG; generated ids double as capability tokens and
/// must stay unguessable.
pub fn random_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Generate a human-facing slug candidate.
pub fn generate_slug() -> String {
    random_token(SLUG_LENGTH)
}

/// Generate a capability id.
///
/// Ids are never retried on collision; the 36^13 space makes a collision a
/// store-level fault rather than an expected event.
pub fn generate_id() -> String {
    random_token(ID_LENGTH)
}

/// Validate a client-chosen label.
///
/// Labels stand in for generated slugs and must start with `@` or `~` so they
/// can never collide with the random base36 space.
///
/// # Errors
/// Returns [`AppError::BadRequest`] when the label syntax is invalid.
pub fn validate_label(label: &str) -> Result<(), AppError> {
    if !label.starts_with('@') && !label.starts_with('~') {
        return Err(AppError::BadRequest(
            "Invalid label: must start with @ or ~".to_string(),
        ));
    }
    if label.chars().count() < MIN_LABEL_LENGTH {
        return Err(AppError::BadRequest(
            "Invalid label: must be at least 2 characters (including @ or ~)".to_string(),
        ));
    }
    Ok(())
}
