//! Storage-level tests for paste tables.

use crate::db::Database;
use crate::error::AppError;
use crate::models::paste::Paste;
use chrono::{Duration, Utc};
use tempfile::TempDir;

fn test_db() -> (Database, TempDir) {
    let temp = TempDir::new().unwrap();
    let db = Database::new(temp.path().join("db").to_str().unwrap()).unwrap();
    (db, temp)
}

fn paste_with_slug(slug: &str, ttl_secs: i64) -> Paste {
    Paste::new(
        slug.to_string(),
        b"body".to_vec(),
        "text/plain".to_string(),
        Utc::now() + Duration::seconds(ttl_secs),
    )
}

#[test]
fn insert_then_lookup_by_id_and_slug() {
    let (db, _temp) = test_db();
    let paste = paste_with_slug("abc123", 3600);
    db.pastes.insert(&paste, Utc::now()).unwrap();

    let by_id = db.pastes.get(&paste.id).unwrap().unwrap();
    assert_eq!(by_id.slug, "abc123");
    assert_eq!(by_id.content, b"body");

    let by_slug = db.pastes.get_by_slug("abc123").unwrap().unwrap();
    assert_eq!(by_slug.id, paste.id);
}

#[test]
fn live_slug_occupant_is_a_conflict() {
    let (db, _temp) = test_db();
    let first = paste_with_slug("@notes", 3600);
    db.pastes.insert(&first, Utc::now()).unwrap();

    let second = paste_with_slug("@notes", 3600);
    let err = db.pastes.insert(&second, Utc::now()).unwrap_err();
    assert!(matches!(err, AppError::SlugTaken(ref slug) if slug == "@notes"));

    // The original occupant is untouched.
    let kept = db.pastes.get_by_slug("@notes").unwrap().unwrap();
    assert_eq!(kept.id, first.id);
}

#[test]
fn expired_slug_occupant_is_evicted_inline() {
    let (db, _temp) = test_db();
    let stale = paste_with_slug("reuse1", -10);
    db.pastes.insert(&stale, Utc::now() - Duration::seconds(60)).unwrap();

    let fresh = paste_with_slug("reuse1", 3600);
    db.pastes.insert(&fresh, Utc::now()).unwrap();

    let current = db.pastes.get_by_slug("reuse1").unwrap().unwrap();
    assert_eq!(current.id, fresh.id);
    assert!(db.pastes.get(&stale.id).unwrap().is_none());
}

#[test]
fn duplicate_id_is_a_storage_fault_not_an_overwrite() {
    let (db, _temp) = test_db();
    let first = paste_with_slug("one111", 3600);
    db.pastes.insert(&first, Utc::now()).unwrap();

    let mut clone = paste_with_slug("two222", 3600);
    clone.id = first.id.clone();
    let err = db.pastes.insert(&clone, Utc::now()).unwrap_err();
    assert!(matches!(err, AppError::StorageMessage(_)));

    let kept = db.pastes.get(&first.id).unwrap().unwrap();
    assert_eq!(kept.slug, "one111");
}

#[test]
fn update_content_preserves_slug_and_expiry() {
    let (db, _temp) = test_db();
    let paste = paste_with_slug("upd111", 3600);
    db.pastes.insert(&paste, Utc::now()).unwrap();

    let updated = db
        .pastes
        .update_content(&paste.id, b"new body", "text/markdown")
        .unwrap()
        .unwrap();
    assert_eq!(updated.content, b"new body");
    assert_eq!(updated.content_type, "text/markdown");
    assert_eq!(updated.slug, paste.slug);
    assert_eq!(updated.expires_at, paste.expires_at);

    // Slug index still resolves after the rewrite.
    assert!(db.pastes.get_by_slug("upd111").unwrap().is_some());
}

#[test]
fn update_missing_id_returns_none() {
    let (db, _temp) = test_db();
    let updated = db
        .pastes
        .update_content("nosuchid12345", b"x", "text/plain")
        .unwrap();
    assert!(updated.is_none());
}

#[test]
fn delete_frees_slug_and_is_not_repeatable() {
    let (db, _temp) = test_db();
    let paste = paste_with_slug("del111", 3600);
    db.pastes.insert(&paste, Utc::now()).unwrap();

    let deleted = db.pastes.delete(&paste.id).unwrap().unwrap();
    assert_eq!(deleted.id, paste.id);
    assert!(db.pastes.get(&paste.id).unwrap().is_none());
    assert!(db.pastes.get_by_slug("del111").unwrap().is_none());
    assert!(db.pastes.delete(&paste.id).unwrap().is_none());

    // The slug is reusable immediately after deletion.
    let next = paste_with_slug("del111", 3600);
    db.pastes.insert(&next, Utc::now()).unwrap();
}

#[test]
fn sweep_removes_only_expired_rows() {
    let (db, _temp) = test_db();
    let expired_a = paste_with_slug("gonea1", -30);
    let expired_b = paste_with_slug("goneb1", -5);
    let live = paste_with_slug("alive1", 3600);
    let insert_time = Utc::now() - Duration::seconds(60);
    db.pastes.insert(&expired_a, insert_time).unwrap();
    db.pastes.insert(&expired_b, insert_time).unwrap();
    db.pastes.insert(&live, insert_time).unwrap();

    let removed = db.pastes.sweep_expired(Utc::now()).unwrap();
    assert_eq!(removed, 2);

    assert!(db.pastes.get(&expired_a.id).unwrap().is_none());
    assert!(db.pastes.get(&expired_b.id).unwrap().is_none());
    assert!(db.pastes.get_by_slug("gonea1").unwrap().is_none());
    assert!(db.pastes.get(&live.id).unwrap().is_some());

    // A second sweep finds nothing.
    assert_eq!(db.pastes.sweep_expired(Utc::now()).unwrap(), 0);
}

#[test]
fn concurrent_inserts_never_share_a_slug() {
    let (db, _temp) = test_db();
    let db = std::sync::Arc::new(db);

    let mut handles = Vec::new();
    for n in 0..8 {
        let db = db.clone();
        handles.push(std::thread::spawn(move || {
            let paste = paste_with_slug("race01", 3600);
            (n, db.pastes.insert(&paste, Utc::now()))
        }));
    }

    let mut winners = 0;
    for handle in handles {
        let (_, result) = handle.join().unwrap();
        match result {
            Ok(()) => winners += 1,
            Err(AppError::SlugTaken(_)) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }
    }
    assert_eq!(winners, 1);
}
