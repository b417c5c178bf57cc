//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";

/// Canonical paste rows keyed by capability id (`Paste`, bincode-encoded).
pub const PASTES: TableDefinition<&str, &[u8]> = TableDefinition::new("pastes");

/// Slug uniqueness index mapping slug to capability id.
pub const PASTE_SLUGS: TableDefinition<&str, &str> = TableDefinition::new("paste_slugs");

/// Expiry index ordered by expiry-millis then id; drives the batch sweep.
pub const PASTES_BY_EXPIRY: TableDefinition<(u64, &str), ()> =
    TableDefinition::new("pastes_by_expiry");
