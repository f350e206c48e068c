//! Signed-in user: session persistence, profile, addresses and order counters.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use storelet_core::{Address, AddressBook, AddressError, AddressId, OrderStats, UserInfo};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::http::{ClientError, HttpClient};
use crate::mock;
use crate::storage::{Storage, StorageError, StorageExt, keys};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Not logged in")]
    NotLoggedIn,

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Partial profile edit. Unset fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

pub struct UserStore {
    storage: Arc<dyn Storage>,
    user: Option<UserInfo>,
    addresses: AddressBook,
    order_stats: OrderStats,
}

impl fmt::Debug for UserStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserStore")
            .field("user", &self.user.as_ref().map(|u| u.id))
            .field("addresses", &self.addresses.len())
            .field("order_stats", &self.order_stats)
            .finish_non_exhaustive()
    }
}

impl UserStore {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            user: None,
            addresses: AddressBook::new(),
            order_stats: OrderStats::default(),
        }
    }

    /// Restore the session from storage.
    ///
    /// A missing or unreadable entry leaves the store logged out.
    pub fn restore(&mut self) -> bool {
        let logged_in: bool = self.storage.get_or_default(keys::IS_LOGGED_IN);
        self.user = if logged_in {
            self.storage.get_or_default::<Option<UserInfo>>(keys::USER_INFO)
        } else {
            None
        };
        self.is_logged_in()
    }

    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub const fn user(&self) -> Option<&UserInfo> {
        self.user.as_ref()
    }

    /// Start a session and persist it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be written. The in-memory
    /// state is updated regardless.
    #[instrument(skip_all, fields(user_id = %user.id))]
    pub fn login(&mut self, user: UserInfo, token: &str) -> Result<(), StorageError> {
        self.user = Some(user);
        self.storage.set(keys::TOKEN, token)?;
        self.persist_user()?;
        self.storage.set(keys::IS_LOGGED_IN, &true)?;
        info!("User logged in");
        Ok(())
    }

    /// End the session: forget all user state in memory and in storage.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a stored key cannot be removed. In-memory
    /// state is cleared regardless.
    #[instrument(skip_all)]
    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.user = None;
        self.addresses.clear();
        self.order_stats = OrderStats::default();

        let mut first_error = None;
        for key in [keys::TOKEN, keys::USER_INFO, keys::IS_LOGGED_IN] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Failed to clear session key");
                first_error.get_or_insert(e);
            }
        }
        info!("User logged out");
        first_error.map_or(Ok(()), Err)
    }

    /// Apply a profile edit locally and persist it.
    ///
    /// # Errors
    ///
    /// - `UserError::NotLoggedIn` without a session
    /// - `UserError::Storage` if the profile cannot be written
    pub fn update_profile(&mut self, update: ProfileUpdate) -> Result<&UserInfo, UserError> {
        let user = self.user.as_mut().ok_or(UserError::NotLoggedIn)?;
        if let Some(nickname) = update.nickname {
            user.nickname = nickname;
        }
        if let Some(avatar) = update.avatar {
            user.avatar = Some(avatar);
        }
        if let Some(phone) = update.phone {
            user.phone = Some(phone);
        }
        self.persist_user()?;
        self.user.as_ref().ok_or(UserError::NotLoggedIn)
    }

    /// Replace the profile with `GET /user/profile`.
    ///
    /// # Errors
    ///
    /// - `UserError::NotLoggedIn` without a session
    /// - `UserError::Client` if the request fails
    /// - `UserError::Storage` if the profile cannot be written
    #[instrument(skip_all)]
    pub async fn refresh_profile(&mut self, http: &HttpClient) -> Result<(), UserError> {
        if !self.is_logged_in() {
            return Err(UserError::NotLoggedIn);
        }
        let user: UserInfo = http.get("/user/profile", &()).await?;
        self.user = Some(user);
        self.persist_user()?;
        Ok(())
    }

    /// Replace the counters with `GET /user/order-stats`.
    ///
    /// # Errors
    ///
    /// - `UserError::NotLoggedIn` without a session
    /// - `UserError::Client` if the request fails
    pub async fn refresh_order_stats(&mut self, http: &HttpClient) -> Result<OrderStats, UserError> {
        if !self.is_logged_in() {
            return Err(UserError::NotLoggedIn);
        }
        self.order_stats = http.get("/user/order-stats", &()).await?;
        Ok(self.order_stats)
    }

    #[must_use]
    pub const fn addresses(&self) -> &AddressBook {
        &self.addresses
    }

    /// Add or edit an address.
    pub fn add_address(&mut self, address: Address) {
        self.addresses.upsert(address);
    }

    /// # Errors
    ///
    /// Returns `AddressError::NotFound` for an unknown address.
    pub fn set_default_address(&mut self, id: AddressId) -> Result<(), AddressError> {
        self.addresses.set_default(id)
    }

    /// # Errors
    ///
    /// Returns `AddressError::NotFound` for an unknown address.
    pub fn remove_address(&mut self, id: AddressId) -> Result<Address, AddressError> {
        self.addresses.remove(id)
    }

    #[must_use]
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses.default_address()
    }

    #[must_use]
    pub const fn order_stats(&self) -> OrderStats {
        self.order_stats
    }

    /// Log in as the mock user with mock addresses and counters.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be written.
    pub fn load_mock(&mut self, seed: u64) -> Result<(), StorageError> {
        self.login(mock::mock_user(), &format!("mock-token-{seed}"))?;
        self.addresses = AddressBook::new();
        for address in mock::mock_addresses() {
            self.addresses.upsert(address);
        }
        self.order_stats = mock::mock_order_stats(seed);
        Ok(())
    }

    fn persist_user(&self) -> Result<(), StorageError> {
        self.storage.set(keys::USER_INFO, &self.user)
    }
}
