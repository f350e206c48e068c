//! The wire: where a fully intercepted request actually leaves the process.

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::multipart::{Form, Part};
use tracing::{debug, instrument};
use url::Url;

use super::error::HttpError;
use super::request::{Method, MultipartForm, RawResponse, RequestBody, RequestConfig};

/// Sends a request and returns the raw response.
///
/// Implementations report transport failures as `Err`; a non-2xx status is
/// still an `Ok` response and is judged by the response interceptors.
pub trait Transport: Send + Sync {
    fn send(&self, config: RequestConfig) -> BoxFuture<'_, Result<RawResponse, HttpError>>;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport whose requests time out after `default_timeout`
    /// unless the request carries its own timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(default_timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("storelet/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            default_timeout,
        })
    }

    #[instrument(skip(self, config), fields(method = %config.method, url = %config.url))]
    async fn execute(&self, config: RequestConfig) -> Result<RawResponse, HttpError> {
        let mut url = Url::parse(&config.url)?;
        if !config.query.is_empty() {
            url.query_pairs_mut().extend_pairs(config.query.iter());
        }

        let method = match config.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut request = self
            .client
            .request(method, url)
            .timeout(config.timeout.unwrap_or(self.default_timeout));

        let multipart = config.is_multipart();
        for (name, value) in &config.headers {
            // reqwest sets the multipart content type with its boundary.
            if multipart && name == "content-type" {
                continue;
            }
            request = request.header(name.as_str(), value.as_str());
        }

        request = match config.body {
            RequestBody::Empty => request,
            // Keeps a content type set by the interceptors, adds JSON otherwise.
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(build_form(form).await?),
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        debug!(status, bytes = body.len(), "Received response");
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, config: RequestConfig) -> BoxFuture<'_, Result<RawResponse, HttpError>> {
        Box::pin(self.execute(config))
    }
}

async fn build_form(form: MultipartForm) -> Result<Form, HttpError> {
    let bytes = tokio::fs::read(&form.file_path).await?;
    let file_name = form
        .file_path
        .file_name()
        .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());

    let mut multipart = Form::new().part(form.field_name, Part::bytes(bytes).file_name(file_name));
    for (name, value) in form.fields {
        multipart = multipart.text(name, value);
    }
    Ok(multipart)
}
