//! The HTTP client: pipeline driver and convenience verbs.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use super::defaults;
use super::error::{ClientError, HttpError};
use super::interceptor::Interceptors;
use super::request::{Method, MultipartForm, RawResponse, RequestConfig};
use super::transport::Transport;
use crate::feedback::{Feedback, LoadingGuard, TracingFeedback};
use crate::storage::Storage;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const UPLOAD_LOADING_TEXT: &str = "Uploading...";

/// Client for the storefront backend.
///
/// Cheap to clone; all clones share the transport and interceptor chains.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

struct HttpClientInner {
    base_url: Url,
    timeout: Duration,
    transport: Arc<dyn Transport>,
    interceptors: Interceptors,
    feedback: Arc<dyn Feedback>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .field("interceptors", &self.inner.interceptors)
            .finish_non_exhaustive()
    }
}

/// Builder for [`HttpClient`]. Interceptors are fixed once built.
pub struct HttpClientBuilder {
    base_url: Url,
    timeout: Duration,
    transport: Arc<dyn Transport>,
    interceptors: Interceptors,
    feedback: Arc<dyn Feedback>,
}

impl HttpClientBuilder {
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn feedback(mut self, feedback: Arc<dyn Feedback>) -> Self {
        self.feedback = feedback;
        self
    }

    #[must_use]
    pub fn on_request<F, Fut>(mut self, interceptor: F) -> Self
    where
        F: Fn(RequestConfig) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RequestConfig, HttpError>> + Send + 'static,
    {
        self.interceptors.on_request(interceptor);
        self
    }

    #[must_use]
    pub fn on_response<F, Fut>(mut self, interceptor: F) -> Self
    where
        F: Fn(RawResponse) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RawResponse, HttpError>> + Send + 'static,
    {
        self.interceptors.on_response(interceptor);
        self
    }

    #[must_use]
    pub fn on_error<F, Fut>(mut self, interceptor: F) -> Self
    where
        F: Fn(ClientError) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientError> + Send + 'static,
    {
        self.interceptors.on_error(interceptor);
        self
    }

    /// Register the standard chains: request ID, default headers, bearer
    /// token from `storage`, non-2xx rejection and friendly error messages.
    ///
    /// Interceptors registered afterwards run after these.
    #[must_use]
    pub fn with_default_interceptors(
        self,
        storage: Arc<dyn Storage>,
        extra_headers: BTreeMap<String, String>,
    ) -> Self {
        self.on_request(defaults::attach_request_id())
            .on_request(defaults::attach_default_headers(extra_headers))
            .on_request(defaults::attach_bearer_token(storage))
            .on_response(defaults::reject_non_success())
            .on_error(defaults::friendly_message())
    }

    #[must_use]
    pub fn build(self) -> HttpClient {
        HttpClient {
            inner: Arc::new(HttpClientInner {
                base_url: self.base_url,
                timeout: self.timeout,
                transport: self.transport,
                interceptors: self.interceptors,
                feedback: self.feedback,
            }),
        }
    }
}

impl HttpClient {
    /// Start building a client for `base_url` over `transport`, with no
    /// interceptors.
    #[must_use]
    pub fn builder(base_url: Url, transport: Arc<dyn Transport>) -> HttpClientBuilder {
        HttpClientBuilder {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            transport,
            interceptors: Interceptors::new(),
            feedback: Arc::new(TracingFeedback),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve `path` against the base URL. Absolute URLs pass through.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::InvalidUrl` if the result is not a valid URL.
    pub fn resolve(&self, path: &str) -> Result<Url, HttpError> {
        if let Ok(url) = Url::parse(path) {
            return Ok(url);
        }
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{}", path.trim_start_matches('/')))?)
    }

    /// A fresh config for `method` on `path`, with the client's timeout.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::InvalidUrl` if `path` cannot be resolved.
    pub fn config(&self, method: Method, path: &str) -> Result<RequestConfig, HttpError> {
        Ok(RequestConfig::new(method, self.resolve(path)?).with_timeout(self.inner.timeout))
    }

    /// Run `config` through the full pipeline and return the raw response.
    ///
    /// # Errors
    ///
    /// Returns the error-interceptor output for any failure.
    pub async fn request(&self, config: RequestConfig) -> Result<RawResponse, ClientError> {
        self.execute(config, Ok).await
    }

    /// Run `config` through the pipeline and decode the body as `T`.
    ///
    /// # Errors
    ///
    /// Returns the error-interceptor output for any failure, including a body
    /// that does not decode.
    pub async fn send_json<T: DeserializeOwned>(&self, config: RequestConfig) -> Result<T, ClientError> {
        self.execute(config, |response| response.json()).await
    }

    /// `GET path?params`. `null` parameters are left out of the query string.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::send_json`].
    pub async fn get<T, P>(&self, path: &str, params: &P) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let config = self
            .config(Method::Get, path)
            .and_then(|config| config.with_query(params));
        self.send_built(config).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::send_json`].
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let config = self
            .config(Method::Post, path)
            .and_then(|config| config.with_json(body));
        self.send_built(config).await
    }

    /// `PUT path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::send_json`].
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let config = self
            .config(Method::Put, path)
            .and_then(|config| config.with_json(body));
        self.send_built(config).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::send_json`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let config = self.config(Method::Delete, path);
        self.send_built(config).await
    }

    /// Multipart upload to `path`, with the loading indicator shown.
    ///
    /// The response body is decoded as JSON when possible and returned as a
    /// JSON string otherwise.
    ///
    /// # Errors
    ///
    /// Returns the error-interceptor output for any pipeline failure.
    pub async fn upload(&self, path: &str, form: MultipartForm) -> Result<Value, ClientError> {
        let config = match self.config(Method::Post, path) {
            Ok(config) => config
                .with_multipart(form)
                .with_loading(Some(UPLOAD_LOADING_TEXT)),
            Err(cause) => return Err(self.fail(cause, true).await),
        };
        self.execute(config, |response| {
            Ok(serde_json::from_str(&response.body).unwrap_or_else(|e| {
                debug!(error = %e, "Upload response is not JSON, returning raw body");
                Value::String(response.body)
            }))
        })
        .await
    }

    async fn send_built<T: DeserializeOwned>(
        &self,
        config: Result<RequestConfig, HttpError>,
    ) -> Result<T, ClientError> {
        match config {
            Ok(config) => self.send_json(config).await,
            Err(cause) => Err(self.fail(cause, true).await),
        }
    }

    #[instrument(skip_all, fields(method = %config.method, url = %config.url))]
    async fn execute<T, D>(&self, config: RequestConfig, decode: D) -> Result<T, ClientError>
    where
        D: FnOnce(RawResponse) -> Result<T, HttpError>,
    {
        let show_error = config.show_error;
        let loading = config.show_loading.then(|| {
            LoadingGuard::show(self.inner.feedback.clone(), config.loading_text.as_deref())
        });

        let result = self.dispatch(config).await.and_then(decode);
        drop(loading);

        match result {
            Ok(value) => Ok(value),
            Err(cause) => Err(self.fail(cause, show_error).await),
        }
    }

    async fn dispatch(&self, config: RequestConfig) -> Result<RawResponse, HttpError> {
        let config = self.inner.interceptors.run_request(config).await?;
        let response = self.inner.transport.send(config).await?;
        debug!(status = response.status, "Transport returned");
        self.inner.interceptors.run_response(response).await
    }

    async fn fail(&self, cause: HttpError, show_error: bool) -> ClientError {
        warn!(error = %cause, "Request failed");
        let err = self
            .inner
            .interceptors
            .run_error(ClientError::from(cause))
            .await;
        if show_error {
            self.inner.feedback.show_toast(&err.message);
        }
        err
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::future::ready;
    use std::sync::Mutex;

    use futures::future::BoxFuture;
    use serde_json::json;

    use super::*;
    use crate::storage::MemoryStorage;

    /// Records every config it receives and replies from a script.
    #[derive(Default)]
    struct ScriptedTransport {
        seen: Mutex<Vec<RequestConfig>>,
        replies: Mutex<Vec<Result<RawResponse, HttpError>>>,
    }

    impl ScriptedTransport {
        fn replying(reply: Result<RawResponse, HttpError>) -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
                replies: Mutex::new(vec![reply]),
            })
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&self, config: RequestConfig) -> BoxFuture<'_, Result<RawResponse, HttpError>> {
            self.seen.lock().unwrap().push(config);
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(RawResponse::new(200, "null")));
            Box::pin(ready(reply))
        }
    }

    #[derive(Default)]
    struct Events(Mutex<Vec<String>>);

    impl Feedback for Events {
        fn show_loading(&self, text: &str) {
            self.0.lock().unwrap().push(format!("show:{text}"));
        }

        fn hide_loading(&self) {
            self.0.lock().unwrap().push("hide".to_string());
        }

        fn show_toast(&self, message: &str) {
            self.0.lock().unwrap().push(format!("toast:{message}"));
        }
    }

    fn base() -> Url {
        Url::parse("https://api.example.com/v1/").unwrap()
    }

    #[test]
    fn test_resolve() {
        let client = HttpClient::builder(base(), Arc::new(ScriptedTransport::default())).build();
        assert_eq!(
            client.resolve("/products").unwrap().as_str(),
            "https://api.example.com/v1/products"
        );
        assert_eq!(
            client.resolve("cart/items").unwrap().as_str(),
            "https://api.example.com/v1/cart/items"
        );
        assert_eq!(
            client.resolve("https://cdn.example.com/x").unwrap().as_str(),
            "https://cdn.example.com/x"
        );
    }

    #[tokio::test]
    async fn test_get_builds_query_and_decodes() {
        let transport = ScriptedTransport::replying(Ok(RawResponse::new(200, r#"[1,2,3]"#)));
        let client = HttpClient::builder(base(), transport.clone()).build();

        let ids: Vec<u32> = client
            .get("/products", &json!({ "keyword": "tea", "categoryId": null, "page": 1 }))
            .await
            .unwrap();

        assert_eq!(ids, vec![1, 2, 3]);
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::Get);
        assert_eq!(seen[0].url, "https://api.example.com/v1/products");
        assert_eq!(
            seen[0].query,
            vec![
                ("keyword".to_string(), "tea".to_string()),
                ("page".to_string(), "1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_defaults_attach_headers_and_token() {
        let storage = Arc::new(MemoryStorage::new());
        crate::storage::StorageExt::set(storage.as_ref(), crate::storage::keys::TOKEN, "tok").unwrap();
        let transport = ScriptedTransport::replying(Ok(RawResponse::new(201, r#"{"id":7}"#)));
        let client = HttpClient::builder(base(), transport.clone())
            .with_default_interceptors(storage, BTreeMap::new())
            .build();

        let created: Value = client.post("/orders", &json!({ "items": [] })).await.unwrap();

        assert_eq!(created, json!({ "id": 7 }));
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].header("authorization"), Some("Bearer tok"));
        assert_eq!(seen[0].header("content-type"), Some("application/json"));
        assert!(seen[0].header("x-request-id").is_some());
    }

    #[tokio::test]
    async fn test_failure_hides_loading_then_toasts() {
        let events = Arc::new(Events::default());
        let transport = ScriptedTransport::replying(Ok(RawResponse::new(500, "oops")));
        let client = HttpClient::builder(base(), transport)
            .feedback(events.clone())
            .with_default_interceptors(Arc::new(MemoryStorage::new()), BTreeMap::new())
            .build();

        let config = client
            .config(Method::Get, "/home")
            .unwrap()
            .with_loading(None);
        let err = client.request(config).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(err.message, "Server busy, please try again later");
        assert_eq!(
            *events.0.lock().unwrap(),
            vec![
                "show:Loading...".to_string(),
                "hide".to_string(),
                "toast:Server busy, please try again later".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_show_error_false_suppresses_toast() {
        let events = Arc::new(Events::default());
        let transport = ScriptedTransport::replying(Err(HttpError::Timeout));
        let client = HttpClient::builder(base(), transport)
            .feedback(events.clone())
            .build();

        let config = client
            .config(Method::Get, "/home")
            .unwrap()
            .with_error_toast(false);
        let err = client.request(config).await.unwrap_err();

        assert!(matches!(err.cause, HttpError::Timeout));
        assert!(events.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_decode_failure_goes_through_error_chain() {
        let transport = ScriptedTransport::replying(Ok(RawResponse::new(200, "not json")));
        let client = HttpClient::builder(base(), transport)
            .on_error(|mut err: ClientError| {
                err.message = "decorated".to_string();
                ready(err)
            })
            .build();

        let err = client.get::<Value, _>("/x", &json!({})).await.unwrap_err();
        assert_eq!(err.message, "decorated");
        assert!(matches!(err.cause, HttpError::Decode(_)));
    }

    #[tokio::test]
    async fn test_upload_falls_back_to_raw_body() {
        let transport = ScriptedTransport::replying(Ok(RawResponse::new(200, "uploaded ok")));
        let events = Arc::new(Events::default());
        let client = HttpClient::builder(base(), transport.clone())
            .feedback(events.clone())
            .build();

        let value = client
            .upload("/upload", MultipartForm::new("file", "/tmp/avatar.png").with_field("kind", "avatar"))
            .await
            .unwrap();

        assert_eq!(value, Value::String("uploaded ok".to_string()));
        assert!(transport.seen.lock().unwrap()[0].is_multipart());
        assert_eq!(
            *events.0.lock().unwrap(),
            vec!["show:Uploading...".to_string(), "hide".to_string()]
        );
    }

    #[tokio::test]
    async fn test_upload_decodes_json() {
        let transport =
            ScriptedTransport::replying(Ok(RawResponse::new(200, r#"{"url":"https://cdn.example.com/a.png"}"#)));
        let client = HttpClient::builder(base(), transport).build();

        let value = client
            .upload("/upload", MultipartForm::new("file", "/tmp/a.png"))
            .await
            .unwrap();
        assert_eq!(value["url"], "https://cdn.example.com/a.png");
    }
}
