//! Application context: the HTTP client and every store, wired together.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::feedback::{Feedback, TracingFeedback};
use crate::http::{HttpClient, ReqwestTransport, Transport};
use crate::storage::{FileStorage, MemoryStorage, Storage, StorageError};
use crate::stores::{CartStore, CategoryStore, ProductFilter, ProductStore, SearchHistory, UserStore};

/// Number of products generated by [`AppContext::load_mock`].
const MOCK_PRODUCT_COUNT: usize = 40;

/// Everything a host page needs. Owned by the host and passed by reference.
pub struct AppContext {
    pub config: ClientConfig,
    pub http: HttpClient,
    pub storage: Arc<dyn Storage>,
    pub cart: CartStore,
    pub products: ProductStore,
    pub categories: CategoryStore,
    pub user: UserStore,
    pub search: SearchHistory,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("http", &self.http)
            .field("user", &self.user)
            .field("search", &self.search)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Wire the stores over the given platform pieces and restore the saved
    /// session and search history.
    #[must_use]
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn Storage>,
        feedback: Arc<dyn Feedback>,
    ) -> Self {
        let http = HttpClient::builder(config.api_base_url.clone(), transport)
            .timeout(config.timeout)
            .feedback(feedback)
            .with_default_interceptors(storage.clone(), config.default_headers())
            .build();

        let mut user = UserStore::new(storage.clone());
        let logged_in = user.restore();
        let mut search = SearchHistory::new(storage.clone());
        let history = search.load().len();
        info!(
            environment = ?config.environment,
            base_url = %config.api_base_url,
            logged_in,
            history,
            "Client context ready"
        );

        Self {
            config,
            http,
            storage,
            cart: CartStore::new(),
            products: ProductStore::new(),
            categories: CategoryStore::new(),
            user,
            search,
        }
    }

    /// Production wiring: reqwest transport, file storage when a path is
    /// configured, and log-only feedback.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be built or the storage file
    /// cannot be opened.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(config.timeout)?);
        let storage: Arc<dyn Storage> = match &config.storage_path {
            Some(path) => Arc::new(FileStorage::open(path)?),
            None => Arc::new(MemoryStorage::new()),
        };
        Ok(Self::new(config, transport, storage, Arc::new(TracingFeedback)))
    }

    /// Search for `keyword`: remember it and filter the listing by it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be saved. The filter is
    /// applied regardless.
    pub fn search(&mut self, keyword: &str) -> Result<(), StorageError> {
        self.products.set_filter(ProductFilter {
            keyword: Some(keyword.trim().to_string()),
            ..ProductFilter::default()
        });
        self.search.record(keyword)
    }

    /// End the session and empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session keys cannot be removed.
    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.cart.clear();
        self.user.logout()
    }

    /// Fill every store from the mock generators.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the mock session cannot be saved.
    pub fn load_mock(&mut self, seed: u64) -> Result<(), StorageError> {
        self.categories.load_mock();
        self.products.load_mock(MOCK_PRODUCT_COUNT, seed);
        self.cart.load_mock(seed);
        self.user.load_mock(seed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::future::ready;

    use futures::future::BoxFuture;

    use super::*;
    use crate::config::Environment;
    use crate::http::{HttpError, RawResponse, RequestConfig};
    use crate::storage::{StorageExt, keys};

    struct Offline;

    impl Transport for Offline {
        fn send(&self, _config: RequestConfig) -> BoxFuture<'_, std::result::Result<RawResponse, HttpError>> {
            Box::pin(ready(Err(HttpError::Network("offline".to_string()))))
        }
    }

    fn context(storage: Arc<dyn Storage>) -> AppContext {
        let config = ClientConfig::for_environment(Environment::Development).unwrap();
        AppContext::new(config, Arc::new(Offline), storage, Arc::new(TracingFeedback))
    }

    #[test]
    fn test_new_restores_session_and_history() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::SEARCH_HISTORY, &["tea"]).unwrap();
        {
            let mut ctx = context(storage.clone());
            ctx.user.login(crate::mock::mock_user(), "t").unwrap();
        }

        let ctx = context(storage);
        assert!(ctx.user.is_logged_in());
        assert_eq!(ctx.search.keywords(), ["tea"]);
    }

    #[test]
    fn test_load_mock_then_logout() {
        let mut ctx = context(Arc::new(MemoryStorage::new()));
        ctx.load_mock(5).unwrap();
        assert!(!ctx.products.products().is_empty());
        assert!(!ctx.categories.all().is_empty());
        assert!(!ctx.cart.is_empty());
        assert!(ctx.user.is_logged_in());

        ctx.logout().unwrap();
        assert!(ctx.cart.is_empty());
        assert!(!ctx.user.is_logged_in());
        assert!(ctx.storage.get_raw(keys::TOKEN).unwrap().is_none());
    }

    #[test]
    fn test_search_sets_filter_and_history() {
        let mut ctx = context(Arc::new(MemoryStorage::new()));
        ctx.search(" tea ").unwrap();
        assert_eq!(ctx.products.filter().keyword.as_deref(), Some("tea"));
        assert_eq!(ctx.search.keywords(), ["tea"]);
    }
}
