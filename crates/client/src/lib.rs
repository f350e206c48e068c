//! Storelet client library.
//!
//! Side-effecting half of the storefront client: configuration, the HTTP
//! pipeline, device storage, host UI hooks and the stores that hold page
//! state. Hosts build one [`AppContext`] and drive it from their pages.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod context;
pub mod error;
pub mod feedback;
pub mod http;
pub mod mock;
pub mod retry;
pub mod storage;
pub mod stores;
pub mod telemetry;

pub use config::{ClientConfig, ConfigError, Environment, LogFormat};
pub use context::AppContext;
pub use error::{Error, Result};
pub use feedback::{Feedback, TracingFeedback};
pub use http::{ClientError, HttpClient, HttpError};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageExt};
