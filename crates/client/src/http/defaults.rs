//! Interceptors installed by [`HttpClientBuilder::with_default_interceptors`].
//!
//! [`HttpClientBuilder::with_default_interceptors`]: super::HttpClientBuilder::with_default_interceptors

use std::collections::BTreeMap;
use std::future::{Ready, ready};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::{ClientError, HttpError};
use super::request::{RawResponse, RequestConfig};
use crate::storage::{Storage, StorageExt, keys};

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Tag every request with a UUID v4 request ID unless one is already set.
pub fn attach_request_id() -> impl Fn(RequestConfig) -> Ready<Result<RequestConfig, HttpError>> + Send + Sync + 'static
{
    |mut config: RequestConfig| {
        if config.header(REQUEST_ID_HEADER).is_none() {
            config.set_header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());
        }
        ready(Ok(config))
    }
}

/// Add `Content-Type: application/json` (except for multipart uploads) and
/// any extra headers, never overriding headers the caller already set.
pub fn attach_default_headers(
    extra: BTreeMap<String, String>,
) -> impl Fn(RequestConfig) -> Ready<Result<RequestConfig, HttpError>> + Send + Sync + 'static {
    move |mut config: RequestConfig| {
        if !config.is_multipart() && config.header("content-type").is_none() {
            config.set_header("content-type", CONTENT_TYPE_JSON);
        }
        for (name, value) in &extra {
            if config.header(name).is_none() {
                config.set_header(name, value.clone());
            }
        }
        ready(Ok(config))
    }
}

/// Attach `Authorization: Bearer <token>` from device storage.
///
/// Best-effort: a missing token or a storage failure leaves the request
/// unauthenticated rather than failing it.
pub fn attach_bearer_token(
    storage: Arc<dyn Storage>,
) -> impl Fn(RequestConfig) -> Ready<Result<RequestConfig, HttpError>> + Send + Sync + 'static {
    move |mut config: RequestConfig| {
        if config.header("authorization").is_none() {
            match storage.get::<String>(keys::TOKEN) {
                Ok(Some(token)) if !token.is_empty() => {
                    config.set_header("authorization", format!("Bearer {token}"));
                }
                Ok(_) => debug!("No token stored, sending unauthenticated request"),
                Err(e) => warn!(error = %e, "Token lookup failed, sending unauthenticated request"),
            }
        }
        ready(Ok(config))
    }
}

/// Turn any status outside `[200, 300)` into `HttpError::Status`.
pub fn reject_non_success() -> impl Fn(RawResponse) -> Ready<Result<RawResponse, HttpError>> + Send + Sync + 'static {
    |response: RawResponse| {
        if response.is_success() {
            ready(Ok(response))
        } else {
            ready(Err(HttpError::Status {
                status: response.status,
                body: response.body,
            }))
        }
    }
}

/// Replace the error message with one fit for a toast.
pub fn friendly_message() -> impl Fn(ClientError) -> Ready<ClientError> + Send + Sync + 'static {
    |mut err: ClientError| {
        err.message = user_message(&err.cause);
        ready(err)
    }
}

/// User-facing message for a pipeline failure.
///
/// A server error body of the shape `{"message": "..."}` (or `"msg"`) wins
/// over the generic status text.
#[must_use]
pub fn user_message(cause: &HttpError) -> String {
    match cause {
        HttpError::Timeout => "Request timed out, please try again".to_string(),
        HttpError::Network(_) => "Network unavailable, please check your connection".to_string(),
        HttpError::Status { status, body } => {
            server_message(body).unwrap_or_else(|| status_message(*status).to_string())
        }
        HttpError::Decode(_) => "Unexpected response from server".to_string(),
        HttpError::Rejected(reason) => reason.clone(),
        HttpError::InvalidUrl(_) | HttpError::InvalidRequest(_) | HttpError::Io(_) => {
            "Request failed".to_string()
        }
    }
}

const fn status_message(status: u16) -> &'static str {
    match status {
        400 => "Invalid request",
        401 => "Please log in again",
        403 => "Access denied",
        404 => "Resource not found",
        429 => "Too many requests, please slow down",
        500..=599 => "Server busy, please try again later",
        _ => "Request failed",
    }
}

fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "msg"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .filter(|msg| !msg.trim().is_empty())
        .map(String::from)
}
