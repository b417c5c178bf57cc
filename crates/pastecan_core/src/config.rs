//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_MAX_CONTENT_SIZE, DEFAULT_PORT, DEFAULT_SWEEP_INTERVAL_SECS, DEFAULT_TTL_SECS,
};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// How update/delete requests are authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AuthMode {
    /// Possession of the unguessable paste id is the only credential.
    CapabilityId,
    /// Pastes are addressed by slug and guarded by a stored shared secret.
    SharedSecret,
}

impl AuthMode {
    /// Parse an `AUTH_MODE` environment value.
    ///
    /// # Returns
    /// `Some(mode)` when the value is recognized, otherwise `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "id" | "capability" => Some(Self::CapabilityId),
            "secret" | "shared-secret" => Some(Self::SharedSecret),
            _ => None,
        }
    }
}

/// Runtime configuration for pastecan.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub max_content_size: usize,
    pub default_ttl_secs: u64,
    pub sweep_interval_secs: u64,
    pub auth_mode: AuthMode,
    /// Explicit public base URL used in response bodies; derived from the
    /// request `Host` header when unset.
    pub public_url: Option<String>,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    // Prefer explicit HOME if set (Unix, some Windows shells)
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows USERPROFILE (standard)
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    // Fallback to current directory if available
    std::env::current_dir().ok()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self {
            db_path: env::var("DB_PATH").map(expand_tilde).unwrap_or_else(|_| {
                let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
                let cache_dir = home.join(".cache").join("pastecan");
                cache_dir.join("db").to_string_lossy().to_string()
            }),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            max_content_size: env::var("MAX_PASTE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_CONTENT_SIZE),
            default_ttl_secs: env::var("DEFAULT_TTL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TTL_SECS),
            sweep_interval_secs: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS),
            auth_mode: env::var("AUTH_MODE")
                .ok()
                .and_then(|value| AuthMode::parse(&value))
                .unwrap_or(AuthMode::CapabilityId),
            public_url: env::var("PUBLIC_URL")
                .ok()
                .map(|value| value.trim_end_matches('/').to_string())
                .filter(|value| !value.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AuthMode;

    #[test]
    fn auth_mode_parses_known_values() {
        assert_eq!(AuthMode::parse("id"), Some(AuthMode::CapabilityId));
        assert_eq!(AuthMode::parse(" Capability "), Some(AuthMode::CapabilityId));
        assert_eq!(AuthMode::parse("secret"), Some(AuthMode::SharedSecret));
        assert_eq!(AuthMode::parse("shared-secret"), Some(AuthMode::SharedSecret));
        assert_eq!(AuthMode::parse("token"), None);
    }
}
