//! Content classification for inbound payloads.
//!
//! File uploads keep their declared type when one is present, fall back to
//! magic-number sniffing, and finally to the generic binary type. A generic
//! binary result that decodes as strict UTF-8 is re-labeled as text so that
//! ambiguous small files (a `.txt` with no declared type) render inline
//! instead of downloading as an opaque blob. The highlight path depends on
//! this upgrade; do not make it conditional.

use crate::constants::{CONTENT_TYPE_BINARY, CONTENT_TYPE_TEXT};

/// Inbound payload shape, as extracted from the request body.
#[derive(Debug, Clone)]
pub enum RawBody {
    /// A named file attachment, with the multipart-declared content type.
    File {
        bytes: Vec<u8>,
        declared_type: Option<String>,
    },
    /// A plain form field.
    Field(String),
}

impl RawBody {
    /// Byte length of the payload.
    pub fn len(&self) -> usize {
        match self {
            Self::File { bytes, .. } => bytes.len(),
            Self::Field(text) => text.len(),
        }
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classified payload ready for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub content: Vec<u8>,
    pub content_type: String,
}

/// Determine content bytes and type for an inbound payload.
///
/// # Returns
/// The stored byte form plus the content type to persist with it.
pub fn classify(body: RawBody) -> Classified {
    match body {
        RawBody::Field(text) => Classified {
            content: text.into_bytes(),
            content_type: CONTENT_TYPE_TEXT.to_string(),
        },
        RawBody::File {
            bytes,
            declared_type,
        } => {
            let content_type = declared_type
                .filter(|declared| acceptable_declared_type(declared))
                .unwrap_or_else(|| sniff_content_type(&bytes));

            if content_type == CONTENT_TYPE_BINARY && std::str::from_utf8(&bytes).is_ok() {
                return Classified {
                    content: bytes,
                    content_type: CONTENT_TYPE_TEXT.to_string(),
                };
            }

            Classified {
                content: bytes,
                content_type,
            }
        }
    }
}

/// Magic-number detection with a generic binary fallback.
fn sniff_content_type(bytes: &[u8]) -> String {
    infer::get(bytes)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| CONTENT_TYPE_BINARY.to_string())
}

/// Declared types are client-controlled and end up in a response header;
/// anything that is not a short, printable `type/subtype` string is ignored
/// in favor of sniffing.
fn acceptable_declared_type(declared: &str) -> bool {
    !declared.is_empty()
        && declared.len() <= 128
        && declared.contains('/')
        && declared
            .bytes()
            .all(|b| b.is_ascii_graphic() || b == b' ')
}
