//! Shared constants used across pastecan crates.

/// Default API port for pastecan.
pub const DEFAULT_PORT: u16 = 8820;

/// Default maximum content size accepted for a single paste (2 MiB).
pub const DEFAULT_MAX_CONTENT_SIZE: usize = 2 * 1024 * 1024;

/// Default paste lifetime in seconds (7 days).
pub const DEFAULT_TTL_SECS: u64 = 604_800;

/// Upper bound on caller-supplied TTLs; keeps expiry arithmetic in range.
pub const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Default period between expiry sweeps in seconds.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Length of a generated slug.
pub const SLUG_LENGTH: usize = 6;

/// Length of a generated capability id.
pub const ID_LENGTH: usize = 13;

/// Bound on random-slug insertion attempts before giving up.
pub const MAX_SLUG_ATTEMPTS: usize = 5;

/// Minimum label length, counting the `@`/`~` prefix.
pub const MIN_LABEL_LENGTH: usize = 2;

/// Content-type sentinel marking a paste as a redirect target.
pub const CONTENT_TYPE_URL: &str = "url";

/// Content type assigned to plain form fields and upgraded text files.
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// Generic binary content type used when sniffing finds nothing better.
pub const CONTENT_TYPE_BINARY: &str = "application/octet-stream";

/// Default base URL for CLI clients.
pub const DEFAULT_CLI_SERVER_URL: &str = "http://localhost:8820";
