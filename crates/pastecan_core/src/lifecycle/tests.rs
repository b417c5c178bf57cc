//! Lifecycle tests covering the create/read/update/delete/sweep contract.

use super::PasteService;
use crate::config::{AuthMode, Config};
use crate::constants::{CONTENT_TYPE_TEXT, CONTENT_TYPE_URL, ID_LENGTH, SLUG_LENGTH};
use crate::db::Database;
use crate::error::AppError;
use crate::models::paste::{ContentUpdate, NewPaste};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tempfile::TempDir;

fn test_config(db_path: &str, auth_mode: AuthMode) -> Config {
    Config {
        db_path: db_path.to_string(),
        port: 0,
        max_content_size: 1024,
        default_ttl_secs: 604_800,
        sweep_interval_secs: 300,
        auth_mode,
        public_url: None,
    }
}

fn test_service(auth_mode: AuthMode) -> (PasteService, TempDir) {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("db").to_str().unwrap().to_string();
    let db = Database::new(&db_path).unwrap();
    let service = PasteService::new(Arc::new(db), Arc::new(test_config(&db_path, auth_mode)));
    (service, temp)
}

fn text_paste(content: &str) -> NewPaste {
    NewPaste {
        content: content.as_bytes().to_vec(),
        content_type: CONTENT_TYPE_TEXT.to_string(),
        ttl: None,
        label: None,
        secret: None,
    }
}

#[test]
fn create_assigns_generated_identifiers_and_default_ttl() {
    let (service, _temp) = test_service(AuthMode::CapabilityId);
    let before = Utc::now();
    let created = service.create(text_paste("Hello, World!")).unwrap();

    assert_eq!(created.slug.len(), SLUG_LENGTH);
    assert_eq!(created.id.len(), ID_LENGTH);

    let expected = before + Duration::seconds(604_800);
    let drift = (created.sunset - expected).num_seconds().abs();
    assert!(drift <= 2, "sunset drifted by {}s", drift);
}

#[test]
fn create_honors_explicit_ttl() {
    let (service, _temp) = test_service(AuthMode::CapabilityId);
    let before = Utc::now();
    let created = service
        .create(NewPaste {
            ttl: Some(3600),
            ..text_paste("Hello, World!")
        })
        .unwrap();

    let expected = before + Duration::seconds(3600);
    let drift = (created.sunset - expected).num_seconds().abs();
    assert!(drift <= 2, "sunset drifted by {}s", drift);
}

#[test]
fn create_then_read_round_trips_bytes_and_type() {
    let (service, _temp) = test_service(AuthMode::CapabilityId);
    let created = service.create(text_paste("Hello, World!")).unwrap();

    let paste = service.read(&created.slug).unwrap();
    assert_eq!(paste.content, b"Hello, World!");
    assert_eq!(paste.content_type, CONTENT_TYPE_TEXT);
}

#[test]
fn empty_content_is_rejected() {
    let (service, _temp) = test_service(AuthMode::CapabilityId);
    let err = service.create(text_paste("")).unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[test]
fn size_boundary_is_inclusive() {
    let (service, _temp) = test_service(AuthMode::CapabilityId);

    // max_content_size is 1024 in the test config.
    let at_limit = "x".repeat(1024);
    service.create(text_paste(&at_limit)).unwrap();

    let over_limit = "x".repeat(1025);
    let err = service.create(text_paste(&over_limit)).unwrap_err();
    assert!(matches!(err, AppError::TooLarge(1024)));
}

#[test]
fn oversize_create_persists_nothing() {
    let (service, _temp) = test_service(AuthMode::CapabilityId);
    let over_limit = "x".repeat(2000);
    let _ = service.create(text_paste(&over_limit)).unwrap_err();
    // A far-future sweep would remove any row the failed create had left.
    assert_eq!(service.sweep(Utc::now() + Duration::days(365)).unwrap(), 0);
}

#[test]
fn label_is_used_verbatim_and_conflicts_terminally() {
    let (service, _temp) = test_service(AuthMode::CapabilityId);
    let created = service
        .create(NewPaste {
            label: Some("@notes".to_string()),
            ..text_paste("first")
        })
        .unwrap();
    assert_eq!(created.slug, "@notes");

    let err = service
        .create(NewPaste {
            label: Some("@notes".to_string()),
            ..text_paste("second")
        })
        .unwrap_err();
    assert!(matches!(err, AppError::SlugTaken(ref slug) if slug == "@notes"));

    // The conflict must not mutate the existing paste.
    let kept = service.read("@notes").unwrap();
    assert_eq!(kept.content, b"first");
}

#[test]
fn invalid_labels_are_rejected() {
    let (service, _temp) = test_service(AuthMode::CapabilityId);
    for label in ["notes", "@", "~"] {
        let err = service
            .create(NewPaste {
                label: Some(label.to_string()),
                ..text_paste("body")
            })
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)), "label: {}", label);
    }
}

#[test]
fn expired_read_deletes_and_reports_not_found() {
    let (service, _temp) = test_service(AuthMode::CapabilityId);
    let created = service
        .create(NewPaste {
            ttl: Some(0),
            ..text_paste("ephemeral")
        })
        .unwrap();

    let err = service.read(&created.slug).unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Lazy deletion side effect: the row is gone from the store itself.
    assert!(service.db().pastes.get(&created.id).unwrap().is_none());
    assert!(service.db().pastes.get_by_slug(&created.slug).unwrap().is_none());
}

#[test]
fn update_replaces_content_but_not_slug_or_expiry() {
    let (service, _temp) = test_service(AuthMode::CapabilityId);
    let created = service.create(text_paste("before")).unwrap();

    let updated = service
        .update(
            &created.id,
            ContentUpdate {
                content: b"after".to_vec(),
                content_type: "text/markdown".to_string(),
                secret: None,
            },
        )
        .unwrap();
    assert_eq!(updated.content, b"after");
    assert_eq!(updated.content_type, "text/markdown");
    assert_eq!(updated.slug, created.slug);
    assert_eq!(updated.expires_at, created.sunset);

    let read_back = service.read(&created.slug).unwrap();
    assert_eq!(read_back.content, b"after");
}

#[test]
fn update_with_unknown_id_mutates_nothing() {
    let (service, _temp) = test_service(AuthMode::CapabilityId);
    let created = service.create(text_paste("stable")).unwrap();

    let err = service
        .update(
            "aaaaaaaaaaaaa",
            ContentUpdate {
                content: b"intruder".to_vec(),
                content_type: CONTENT_TYPE_TEXT.to_string(),
                secret: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    assert_eq!(service.read(&created.slug).unwrap().content, b"stable");
}

#[test]
fn slug_is_not_a_mutation_credential_in_capability_mode() {
    let (service, _temp) = test_service(AuthMode::CapabilityId);
    let created = service.create(text_paste("guarded")).unwrap();

    let err = service.delete(&created.slug, None).unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    assert!(service.read(&created.slug).is_ok());
}

#[test]
fn delete_is_terminal_for_reads_and_repeat_deletes() {
    let (service, _temp) = test_service(AuthMode::CapabilityId);
    let created = service.create(text_paste("doomed")).unwrap();

    service.delete(&created.id, None).unwrap();
    assert!(matches!(service.read(&created.slug), Err(AppError::NotFound)));
    assert!(matches!(
        service.delete(&created.id, None),
        Err(AppError::NotFound)
    ));
}

#[test]
fn url_paste_stores_origin_with_redirect_type() {
    let (service, _temp) = test_service(AuthMode::CapabilityId);
    let created = service
        .create_url("https://example.com/some/deep/path?q=1", None)
        .unwrap();

    let paste = service.read(&created.slug).unwrap();
    assert!(paste.is_redirect());
    assert_eq!(paste.content_type, CONTENT_TYPE_URL);
    assert_eq!(paste.content, b"https://example.com");
}

#[test]
fn url_paste_rejects_non_urls_and_opaque_origins() {
    let (service, _temp) = test_service(AuthMode::CapabilityId);
    for raw in ["not a url", "/relative/path", "mailto:user@example.com"] {
        let err = service.create_url(raw, None).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)), "raw: {}", raw);
    }
}

#[test]
fn sweep_reclaims_expired_rows_in_bulk() {
    let (service, _temp) = test_service(AuthMode::CapabilityId);
    let doomed = service
        .create(NewPaste {
            ttl: Some(0),
            ..text_paste("old")
        })
        .unwrap();
    let kept = service.create(text_paste("new")).unwrap();

    let removed = service.sweep(Utc::now()).unwrap();
    assert_eq!(removed, 1);
    assert!(service.db().pastes.get(&doomed.id).unwrap().is_none());
    assert!(service.db().pastes.get(&kept.id).unwrap().is_some());
}

#[test]
fn shared_secret_mode_addresses_by_slug_and_checks_secret() {
    let (service, _temp) = test_service(AuthMode::SharedSecret);
    let created = service
        .create(NewPaste {
            secret: Some("s3cret".to_string()),
            ..text_paste("guarded")
        })
        .unwrap();

    let updated = service
        .update(
            &created.slug,
            ContentUpdate {
                content: b"rotated".to_vec(),
                content_type: CONTENT_TYPE_TEXT.to_string(),
                secret: Some("s3cret".to_string()),
            },
        )
        .unwrap();
    assert_eq!(updated.content, b"rotated");

    for bad in [Some("wrong"), None] {
        let err = service
            .update(
                &created.slug,
                ContentUpdate {
                    content: b"intruder".to_vec(),
                    content_type: CONTENT_TYPE_TEXT.to_string(),
                    secret: bad.map(str::to_string),
                },
            )
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    service.delete(&created.slug, Some("s3cret")).unwrap();
    assert!(matches!(service.read(&created.slug), Err(AppError::NotFound)));
}

#[test]
fn secretless_paste_cannot_be_mutated_in_shared_secret_mode() {
    let (service, _temp) = test_service(AuthMode::SharedSecret);
    let created = service.create(text_paste("frozen")).unwrap();

    let err = service.delete(&created.slug, Some("guess")).unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    assert!(service.read(&created.slug).is_ok());
}
