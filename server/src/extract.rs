//! Extractors whose rejections are `ApiError`s, so a bad path segment or an
//! unreadable body still answers with an `{"error": ...}` JSON body.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use tracing::debug;

use crate::error::ApiError;

/// The `{id}` segment of an item route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoId(pub i64);

impl<S> FromRequestParts<S> for TodoId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                debug!(%rejection, "undecodable todo id");
                ApiError::invalid_id()
            })?;
        parse_id(&raw).map(TodoId)
    }
}

/// Request body as raw bytes. JSON decoding is left to the handler.
#[derive(Debug, Clone)]
pub struct RawBody(pub Bytes);

impl<S> FromRequest<S> for RawBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Bytes::from_request(req, state)
            .await
            .map(RawBody)
            .map_err(ApiError::from)
    }
}

/// Integer-prefix parsing: leading whitespace and a sign are skipped, a
/// `0x` prefix switches to hex, and trailing junk after the digits is
/// ignored (`12abc` is 12, `1.5` is 1). Only a segment with no leading
/// digits is an invalid id. A prefix too large for `i64` can never match a
/// stored id, so it is reported as not found.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    let rest = raw.trim_start();
    let (negative, rest) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };
    let (radix, rest) = match rest.get(..2) {
        Some("0x" | "0X") => (16, &rest[2..]),
        _ => (10, rest),
    };
    let end = rest
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        debug!(raw, "rejected todo id");
        return Err(ApiError::invalid_id());
    }
    let magnitude = i64::from_str_radix(digits, radix).map_err(|_| ApiError::todo_not_found())?;
    Ok(if negative { -magnitude } else { magnitude })
}
