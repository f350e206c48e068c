//! Integration tests for Storelet.
//!
//! Tests drive [`AppContext`] and the HTTP pipeline end to end over an
//! in-memory transport, so they need no network.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storelet-integration-tests
//! ```

use std::collections::VecDeque;
use std::future::ready;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::BoxFuture;
use storelet_client::config::Environment;
use storelet_client::http::{HttpError, RawResponse, RequestConfig, Transport};
use storelet_client::{AppContext, ClientConfig, Feedback, MemoryStorage, Storage};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Transport that records every request and answers from a queue.
///
/// Once the queue is empty it answers `200` with an empty JSON array.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<RequestConfig>>,
    replies: Mutex<VecDeque<Result<RawResponse, HttpError>>>,
}

impl RecordingTransport {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a `status` reply with `body`.
    pub fn reply(&self, status: u16, body: impl Into<String>) {
        lock(&self.replies).push_back(Ok(RawResponse::new(status, body)));
    }

    /// Queue a transport failure.
    pub fn fail(&self, err: HttpError) {
        lock(&self.replies).push_back(Err(err));
    }

    /// Requests seen so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RequestConfig> {
        lock(&self.requests).clone()
    }

    #[must_use]
    pub fn last_request(&self) -> Option<RequestConfig> {
        lock(&self.requests).last().cloned()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, config: RequestConfig) -> BoxFuture<'_, Result<RawResponse, HttpError>> {
        lock(&self.requests).push(config);
        let reply = lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| Ok(RawResponse::new(200, "[]")));
        Box::pin(ready(reply))
    }
}

/// Feedback sink recording UI events as strings: `show:<text>`, `hide`,
/// `toast:<message>`.
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    events: Mutex<Vec<String>>,
}

impl RecordingFeedback {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[must_use]
    pub fn events(&self) -> Vec<String> {
        lock(&self.events).clone()
    }
}

impl Feedback for RecordingFeedback {
    fn show_loading(&self, text: &str) {
        lock(&self.events).push(format!("show:{text}"));
    }

    fn hide_loading(&self) {
        lock(&self.events).push("hide".to_string());
    }

    fn show_toast(&self, message: &str) {
        lock(&self.events).push(format!("toast:{message}"));
    }
}

/// A context over the given pieces, pointed at `https://api.test/v1`.
///
/// # Panics
///
/// Panics if the development config or the test URL does not parse.
#[must_use]
pub fn test_context(
    transport: Arc<RecordingTransport>,
    storage: Arc<dyn Storage>,
    feedback: Arc<RecordingFeedback>,
) -> AppContext {
    let mut config = ClientConfig::for_environment(Environment::Development).expect("development config");
    config.api_base_url = "https://api.test/v1".parse().expect("valid test URL");
    AppContext::new(config, transport, storage, feedback)
}

/// A fresh context with memory storage, returning its transport and feedback.
#[must_use]
pub fn fresh_context() -> (AppContext, Arc<RecordingTransport>, Arc<RecordingFeedback>) {
    let transport = RecordingTransport::new();
    let feedback = RecordingFeedback::new();
    let ctx = test_context(transport.clone(), Arc::new(MemoryStorage::new()), feedback.clone());
    (ctx, transport, feedback)
}
