//! Unified error type for host-facing operations.
//!
//! Store actions return their own narrow errors; hosts that drive several
//! stores through [`crate::AppContext`] get them as one [`Error`], with
//! [`Error::user_message`] giving the text to show.

use storelet_core::{AddressError, CartError, PriceError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::http::{ClientError, HttpError};
use crate::storage::StorageError;
use crate::stores::UserError;

/// Client-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client setup failed.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// A request failed after the error interceptors ran.
    #[error("Request failed: {0}")]
    Client(#[from] ClientError),

    /// Device storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Price error: {0}")]
    Price(#[from] PriceError),

    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    #[error("User error: {0}")]
    User(#[from] UserError),
}

impl Error {
    /// Text suitable for a toast.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(err) | Self::User(UserError::Client(err)) => err.message.clone(),
            Self::Cart(CartError::InsufficientStock { available, .. }) => {
                format!("Only {available} left in stock")
            }
            Self::Cart(CartError::InvalidQuantity(_)) => "Please choose a valid quantity".to_string(),
            Self::Cart(CartError::ItemNotFound(_)) => "This item is no longer in your cart".to_string(),
            Self::User(UserError::NotLoggedIn) => "Please log in first".to_string(),
            Self::Address(_) | Self::User(UserError::Address(_)) => "Address not found".to_string(),
            Self::Config(_) | Self::Http(_) | Self::Storage(_) | Self::Price(_) | Self::User(UserError::Storage(_)) => {
                "Something went wrong, please try again".to_string()
            }
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
