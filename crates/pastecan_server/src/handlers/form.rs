//! Multipart form extraction for create/update requests.

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use pastecan_core::classify::RawBody;
use pastecan_core::AppError;

/// Parsed multipart submission.
pub struct SubmittedForm {
    /// The `c` field, as a file attachment or a plain text field.
    pub body: RawBody,
    /// Requested lifetime in seconds (`sunset` or `ttl` field).
    pub ttl: Option<u64>,
    /// Shared secret (`s` or `secret` field), secret-auth deployments only.
    pub secret: Option<String>,
}

fn map_multipart_error(err: MultipartError, max_content_size: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::TooLarge(max_content_size)
    } else {
        AppError::BadRequest("Invalid request format.".to_string())
    }
}

/// Read the `c`/`sunset`/`s` fields out of a multipart body.
///
/// Emptiness and the exact size boundary are enforced here on the decoded
/// field; the transport body limit only caps multipart framing overhead. The
/// lifecycle layer re-applies the same checks at its own boundary.
///
/// # Errors
/// [`AppError::BadRequest`] when the `c` field is missing, malformed, or
/// empty; [`AppError::TooLarge`] when the decoded content exceeds
/// `max_content_size`.
pub async fn read_form(
    multipart: &mut Multipart,
    max_content_size: usize,
) -> Result<SubmittedForm, AppError> {
    let mut body = None;
    let mut ttl = None;
    let mut secret = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| map_multipart_error(err, max_content_size))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("c") => {
                if field.file_name().is_some() {
                    let declared_type = field.content_type().map(str::to_owned);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|err| map_multipart_error(err, max_content_size))?;
                    body = Some(RawBody::File {
                        bytes: bytes.to_vec(),
                        declared_type,
                    });
                } else {
                    let text = field
                        .text()
                        .await
                        .map_err(|err| map_multipart_error(err, max_content_size))?;
                    body = Some(RawBody::Field(text));
                }
            }
            Some("sunset") | Some("ttl") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|err| map_multipart_error(err, max_content_size))?;
                ttl = raw.trim().parse::<u64>().ok();
            }
            Some("s") | Some("secret") => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| map_multipart_error(err, max_content_size))?;
                if !value.is_empty() {
                    secret = Some(value);
                }
            }
            // Unknown fields are drained and ignored.
            _ => {
                let _ = field.bytes().await;
            }
        }
    }

    let body = body.ok_or_else(|| AppError::BadRequest("Invalid content format.".to_string()))?;
    if body.is_empty() {
        return Err(AppError::BadRequest("Content is empty.".to_string()));
    }
    if body.len() > max_content_size {
        return Err(AppError::TooLarge(max_content_size));
    }

    Ok(SubmittedForm { body, ttl, secret })
}
