//! Outbound HTTP with ordered interceptor chains.
//!
//! # Architecture
//!
//! Every call goes through one pipeline:
//!
//! 1. request interceptors, in registration order, each free to rewrite or
//!    reject the [`RequestConfig`]
//! 2. the [`Transport`] (reqwest in production, in-memory in tests)
//! 3. response interceptors, in registration order
//! 4. on any failure, the error is normalised into a [`ClientError`] and
//!    passed through the error interceptors before being returned
//!
//! Interceptors run strictly one after another. There is no retry and no
//! cancellation in the pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use storelet_client::http::{HttpClient, ReqwestTransport};
//!
//! let client = HttpClient::builder(base_url, Arc::new(ReqwestTransport::new(timeout)?))
//!     .with_default_interceptors(storage.clone(), BTreeMap::new())
//!     .build();
//!
//! let products: Vec<Product> = client.get("/products", &json!({ "keyword": "tea" })).await?;
//! ```

mod client;
pub mod defaults;
mod error;
mod interceptor;
mod request;
mod transport;

pub use client::{HttpClient, HttpClientBuilder};
pub use error::{ClientError, HttpError};
pub use interceptor::{ErrorInterceptor, Interceptors, RequestInterceptor, ResponseInterceptor};
pub use request::{Method, MultipartForm, RawResponse, RequestBody, RequestConfig, query_pairs};
pub use transport::{ReqwestTransport, Transport};
