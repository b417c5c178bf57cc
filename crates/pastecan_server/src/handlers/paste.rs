//! Paste HTTP handlers.
//!
//! The surface speaks plain text: create answers with `url:`/`id:`/`sunset:`
//! lines, mutations answer with one-line confirmations, and errors are short
//! text bodies. Reads answer with the stored bytes, a redirect, or the
//! highlight page.

use super::{form::read_form, public_addr};
use crate::{error::HttpError, render, AppState};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use chrono::SecondsFormat;
use hyper::HeaderMap;
use pastecan_core::classify::{classify, RawBody};
use pastecan_core::models::paste::{ContentUpdate, CreatedPaste, NewPaste};
use pastecan_core::AppError;
use serde::Deserialize;

/// Query parameters accepted by create.
#[derive(Debug, Deserialize)]
pub struct CreateQuery {
    /// `u=1` asks for a short, URL-only response.
    pub u: Option<String>,
}

/// Query parameters carrying the shared secret for mutations.
#[derive(Debug, Deserialize)]
pub struct MutateQuery {
    pub s: Option<String>,
}

fn created_body(addr: &str, created: &CreatedPaste) -> String {
    format!(
        "url: {}/{}\nid: {}\nsunset: {}\n",
        addr,
        created.slug,
        created.id,
        created.sunset.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Plain-text usage page served at the root.
pub async fn usage(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let addr = public_addr(&state.config, &headers);
    format!(
        "pastecan - a minimal pastebin\n\
         \n\
         create:      curl -F c='some text' {addr}\n\
         from a file: curl -F c=@notes.txt {addr}\n\
         labeled:     curl -F c=@notes.txt {addr}/@mylabel\n\
         shorten url: curl -F c='https://example.com' {addr}/u\n\
         with ttl:    curl -F c='gone soon' -F sunset=3600 {addr}\n\
         read:        curl {addr}/<slug>\n\
         highlighted: {addr}/<slug>/<language>\n\
         update:      curl -X PUT -F c='new text' {addr}/<id>\n\
         delete:      curl -X DELETE {addr}/<id>\n",
        addr = addr
    )
    .into_response()
}

/// Create a paste with a generated slug (`POST /`).
pub async fn create_paste(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CreateQuery>,
    multipart: Multipart,
) -> Result<Response, HttpError> {
    create_common(state, headers, query, None, multipart).await
}

/// Create a paste under a client-chosen label (`POST /:label`).
pub async fn create_paste_labeled(
    State(state): State<AppState>,
    Path(label): Path<String>,
    headers: HeaderMap,
    Query(query): Query<CreateQuery>,
    multipart: Multipart,
) -> Result<Response, HttpError> {
    create_common(state, headers, query, Some(label), multipart).await
}

async fn create_common(
    state: AppState,
    headers: HeaderMap,
    query: CreateQuery,
    label: Option<String>,
    mut multipart: Multipart,
) -> Result<Response, HttpError> {
    let form = read_form(&mut multipart, state.config.max_content_size).await?;
    let classified = classify(form.body);
    let addr = public_addr(&state.config, &headers);

    match state.service.create(NewPaste {
        content: classified.content,
        content_type: classified.content_type,
        ttl: form.ttl,
        label,
        secret: form.secret,
    }) {
        Ok(created) => {
            if query.u.as_deref() == Some("1") {
                return Ok(format!("url: {}/{}", addr, created.slug).into_response());
            }
            Ok(created_body(&addr, &created).into_response())
        }
        // A taken label answers 200 with an explanation; deliberately not a
        // 409, the text protocol stays curl-friendly.
        Err(AppError::SlugTaken(slug)) => {
            Ok(format!("'{}' already exists at {}/{}\n", slug, addr, slug).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// Create a URL-redirect paste (`POST /u`).
pub async fn create_url_paste(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, HttpError> {
    let form = read_form(&mut multipart, state.config.max_content_size).await?;
    let RawBody::Field(raw) = form.body else {
        return Err(
            AppError::BadRequest("Invalid content format: must be a string".to_string()).into(),
        );
    };

    let addr = public_addr(&state.config, &headers);
    let created = state.service.create_url(&raw, form.ttl)?;
    Ok(created_body(&addr, &created).into_response())
}

/// Read a paste (`GET /:slug`).
pub async fn read_paste(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, HttpError> {
    read_common(&state, &key, None)
}

/// Read a paste rendered with highlight markup (`GET /:slug/:lang`).
pub async fn read_paste_highlighted(
    State(state): State<AppState>,
    Path((key, lang)): Path<(String, String)>,
) -> Result<Response, HttpError> {
    read_common(&state, &key, Some(lang))
}

fn read_common(state: &AppState, key: &str, lang: Option<String>) -> Result<Response, HttpError> {
    let paste = state.service.read(key)?;

    if paste.is_redirect() {
        let target = String::from_utf8_lossy(&paste.content).into_owned();
        return Ok((StatusCode::FOUND, [(header::LOCATION, target)]).into_response());
    }

    if let Some(lang) = lang {
        if paste.is_text() {
            if let Some(text) = paste.text() {
                return Ok(Html(render::highlight_page(text, &lang)).into_response());
            }
        }
    }

    Ok((
        [(header::CONTENT_TYPE, paste.content_type.clone())],
        paste.content,
    )
        .into_response())
}

/// Replace a paste's content (`PUT /:token`).
pub async fn update_paste(
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
    Query(query): Query<MutateQuery>,
    mut multipart: Multipart,
) -> Result<Response, HttpError> {
    let form = read_form(&mut multipart, state.config.max_content_size).await?;
    let classified = classify(form.body);
    let secret = form.secret.or(query.s);

    state.service.update(
        &token,
        ContentUpdate {
            content: classified.content,
            content_type: classified.content_type,
            secret,
        },
    )?;

    let addr = public_addr(&state.config, &headers);
    Ok(format!("{}/{} updated\n", addr, token).into_response())
}

/// Delete a paste (`DELETE /:token`).
pub async fn delete_paste(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(query): Query<MutateQuery>,
) -> Result<Response, HttpError> {
    state.service.delete(&token, query.s.as_deref())?;
    Ok("deleted\n".into_response())
}
