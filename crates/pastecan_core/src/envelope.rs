//! Client-side passphrase encryption envelope.
//!
//! Pastes can be sealed with the age passphrase (scrypt) format before they
//! leave the client. The server only ever sees the opaque ciphertext; the
//! passphrase is never transmitted or stored.

use age::secrecy::SecretString;
use std::io::{Read, Write};
use thiserror::Error;

/// Errors produced by sealing or opening an envelope.
#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("encryption failed: {0}")]
    Encrypt(String),

    /// Wrong passphrase and corrupt ciphertext are deliberately
    /// indistinguishable.
    #[error("decryption failed")]
    Decrypt,
}

/// Seal plaintext bytes with a passphrase.
///
/// # Returns
/// The opaque age-format ciphertext.
///
/// # Errors
/// Returns [`EnvelopeError::Encrypt`] when the underlying cipher fails.
pub fn seal(plain: &[u8], passphrase: &str) -> Result<Vec<u8>, EnvelopeError> {
    let encryptor =
        age::Encryptor::with_user_passphrase(SecretString::new(passphrase.to_owned()));

    let mut sealed = Vec::new();
    let mut writer = encryptor
        .wrap_output(&mut sealed)
        .map_err(|err| EnvelopeError::Encrypt(err.to_string()))?;
    writer
        .write_all(plain)
        .map_err(|err| EnvelopeError::Encrypt(err.to_string()))?;
    writer
        .finish()
        .map_err(|err| EnvelopeError::Encrypt(err.to_string()))?;

    Ok(sealed)
}

/// Open a sealed envelope with a passphrase.
///
/// # Returns
/// The original plaintext bytes.
///
/// # Errors
/// Returns [`EnvelopeError::Decrypt`] on a wrong passphrase or a corrupt
/// envelope; plaintext is never partially returned.
pub fn open(sealed: &[u8], passphrase: &str) -> Result<Vec<u8>, EnvelopeError> {
    let decryptor = match age::Decryptor::new(sealed).map_err(|_| EnvelopeError::Decrypt)? {
        age::Decryptor::Passphrase(decryptor) => decryptor,
        _ => return Err(EnvelopeError::Decrypt),
    };

    let mut plain = Vec::new();
    let mut reader = decryptor
        .decrypt(&SecretString::new(passphrase.to_owned()), None)
        .map_err(|_| EnvelopeError::Decrypt)?;
    reader
        .read_to_end(&mut plain)
        .map_err(|_| EnvelopeError::Decrypt)?;

    Ok(plain)
}
