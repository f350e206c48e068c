//! Request and response value types.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::HttpError;

/// HTTP verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file upload with extra form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartForm {
    /// Form field the file is sent under.
    pub field_name: String,
    pub file_path: PathBuf,
    pub fields: BTreeMap<String, String>,
}

impl MultipartForm {
    #[must_use]
    pub fn new(field_name: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            field_name: field_name.into(),
            file_path: file_path.into(),
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartForm),
}

/// Everything needed to perform one HTTP call.
///
/// Header names are stored lowercase.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub method: Method,
    /// Absolute URL without the query string.
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Falls back to the transport default when unset.
    pub timeout: Option<Duration>,
    /// Show the host loading indicator for the duration of the call.
    pub show_loading: bool,
    /// Show the final error message as a toast.
    pub show_error: bool,
    pub loading_text: Option<String>,
}

impl RequestConfig {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
            timeout: None,
            show_loading: false,
            show_error: true,
            loading_text: None,
        }
    }

    /// Look up a header, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Set a header, replacing any previous value.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Append query parameters from any serializable key-value map.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::InvalidRequest` if `params` cannot be serialized
    /// or is not an object.
    pub fn with_query<P: Serialize + ?Sized>(mut self, params: &P) -> Result<Self, HttpError> {
        let value = to_request_value(params)?;
        self.query.extend(query_pairs(&value)?);
        Ok(self)
    }

    /// Set a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::InvalidRequest` if `body` cannot be serialized.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, HttpError> {
        self.body = RequestBody::Json(to_request_value(body)?);
        Ok(self)
    }

    #[must_use]
    pub fn with_multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_loading(mut self, text: Option<&str>) -> Self {
        self.show_loading = true;
        self.loading_text = text.map(String::from);
        self
    }

    #[must_use]
    pub const fn with_error_toast(mut self, show: bool) -> Self {
        self.show_error = show;
        self
    }

    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self.body, RequestBody::Multipart(_))
    }
}

fn to_request_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, HttpError> {
    serde_json::to_value(value).map_err(|e| HttpError::InvalidRequest(e.to_string()))
}

/// Flatten a JSON object into query pairs, skipping `null` values.
///
/// Strings are sent as-is, numbers and booleans in their JSON rendering,
/// arrays and nested objects as compact JSON. A top-level `null` yields no
/// pairs.
///
/// # Errors
///
/// Returns `HttpError::InvalidRequest` for any other non-object value.
pub fn query_pairs(params: &Value) -> Result<Vec<(String, String)>, HttpError> {
    match params {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => Ok(map
            .iter()
            .filter_map(|(key, value)| {
                let rendered = match value {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Some((key.clone(), rendered))
            })
            .collect()),
        other => Err(HttpError::InvalidRequest(format!(
            "query parameters must be an object, got {other}"
        ))),
    }
}

/// A response as received from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Header names lowercase.
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON. An empty body decodes as `null`.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::Decode` if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        if self.body.trim().is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}
