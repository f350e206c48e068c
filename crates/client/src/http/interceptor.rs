//! Ordered interceptor chains.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use super::error::{ClientError, HttpError};
use super::request::{RawResponse, RequestConfig};

/// Transforms or rejects an outgoing request.
pub type RequestInterceptor =
    Arc<dyn Fn(RequestConfig) -> BoxFuture<'static, Result<RequestConfig, HttpError>> + Send + Sync>;

/// Transforms or rejects a received response.
pub type ResponseInterceptor =
    Arc<dyn Fn(RawResponse) -> BoxFuture<'static, Result<RawResponse, HttpError>> + Send + Sync>;

/// Transforms a failure before it is returned to the caller.
pub type ErrorInterceptor = Arc<dyn Fn(ClientError) -> BoxFuture<'static, ClientError> + Send + Sync>;

/// The three interceptor lists, each run in registration order.
#[derive(Clone, Default)]
pub struct Interceptors {
    request: Vec<RequestInterceptor>,
    response: Vec<ResponseInterceptor>,
    error: Vec<ErrorInterceptor>,
}

impl Interceptors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request interceptor after the existing ones.
    pub fn on_request<F, Fut>(&mut self, interceptor: F) -> &mut Self
    where
        F: Fn(RequestConfig) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RequestConfig, HttpError>> + Send + 'static,
    {
        self.request
            .push(Arc::new(move |config| Box::pin(interceptor(config))));
        self
    }

    /// Register a response interceptor after the existing ones.
    pub fn on_response<F, Fut>(&mut self, interceptor: F) -> &mut Self
    where
        F: Fn(RawResponse) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RawResponse, HttpError>> + Send + 'static,
    {
        self.response
            .push(Arc::new(move |response| Box::pin(interceptor(response))));
        self
    }

    /// Register an error interceptor after the existing ones.
    pub fn on_error<F, Fut>(&mut self, interceptor: F) -> &mut Self
    where
        F: Fn(ClientError) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientError> + Send + 'static,
    {
        self.error
            .push(Arc::new(move |err| Box::pin(interceptor(err))));
        self
    }

    /// Thread `config` through every request interceptor, stopping at the
    /// first rejection.
    ///
    /// # Errors
    ///
    /// Returns the first interceptor error.
    pub async fn run_request(&self, mut config: RequestConfig) -> Result<RequestConfig, HttpError> {
        for (index, interceptor) in self.request.iter().enumerate() {
            debug!(index, "Running request interceptor");
            config = interceptor(config).await?;
        }
        Ok(config)
    }

    /// Thread `response` through every response interceptor, stopping at the
    /// first rejection.
    ///
    /// # Errors
    ///
    /// Returns the first interceptor error.
    pub async fn run_response(&self, mut response: RawResponse) -> Result<RawResponse, HttpError> {
        for (index, interceptor) in self.response.iter().enumerate() {
            debug!(index, "Running response interceptor");
            response = interceptor(response).await?;
        }
        Ok(response)
    }

    /// Thread `err` through every error interceptor.
    pub async fn run_error(&self, mut err: ClientError) -> ClientError {
        for (index, interceptor) in self.error.iter().enumerate() {
            debug!(index, "Running error interceptor");
            err = interceptor(err).await;
        }
        err
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.request.is_empty() && self.response.is_empty() && self.error.is_empty()
    }
}

impl fmt::Debug for Interceptors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptors")
            .field("request", &self.request.len())
            .field("response", &self.response.len())
            .field("error", &self.error.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::future::ready;

    use super::*;
    use crate::http::Method;

    #[tokio::test]
    async fn test_request_interceptors_compose_left_to_right() {
        let mut chain = Interceptors::new();
        chain
            .on_request(|mut config: RequestConfig| {
                config.url.push_str("/a");
                ready(Ok(config))
            })
            .on_request(|mut config: RequestConfig| {
                config.url.push_str("/b");
                ready(Ok(config))
            });

        let config = RequestConfig::new(Method::Get, "https://api.example.com");
        let out = chain.run_request(config).await.unwrap();
        assert_eq!(out.url, "https://api.example.com/a/b");
    }

    #[tokio::test]
    async fn test_rejection_short_circuits() {
        let mut chain = Interceptors::new();
        chain
            .on_request(|_config: RequestConfig| ready(Err(HttpError::Rejected("blocked".to_string()))))
            .on_request(|_config: RequestConfig| ready(Err(HttpError::Rejected("second".to_string()))));

        let err = chain
            .run_request(RequestConfig::new(Method::Get, "https://api.example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Rejected(msg) if msg == "blocked"));
    }

    #[tokio::test]
    async fn test_error_interceptors_see_previous_output() {
        let mut chain = Interceptors::new();
        chain
            .on_error(|mut err: ClientError| async move {
                err.message = "first".to_string();
                err
            })
            .on_error(|mut err: ClientError| async move {
                err.message = format!("{} then second", err.message);
                err
            });

        let err = chain
            .run_error(ClientError::from(HttpError::Timeout))
            .await;
        assert_eq!(err.message, "first then second");
        assert!(matches!(err.cause, HttpError::Timeout));
    }

    #[test]
    fn test_debug_shows_counts() {
        let mut chain = Interceptors::new();
        assert!(chain.is_empty());
        chain.on_response(|response: RawResponse| ready(Ok(response)));
        assert_eq!(
            format!("{chain:?}"),
            "Interceptors { request: 0, response: 1, error: 0 }"
        );
    }
}
