//! User profile, shipping addresses and order counters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::{AddressId, UserId};

/// Membership tier shown on the profile page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberLevel {
    #[default]
    Regular,
    Silver,
    Gold,
    Platinum,
}

/// Signed-in user profile, persisted under the `userInfo` storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: UserId,
    pub nickname: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub member_level: MemberLevel,
    #[serde(default)]
    pub points: u32,
}

/// Order counters for the profile page badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub pending_payment: u32,
    pub pending_shipment: u32,
    pub pending_receipt: u32,
    pub pending_review: u32,
    pub after_sale: u32,
}

impl OrderStats {
    /// Orders that still need some action from the user or the shop.
    #[must_use]
    pub const fn open_total(&self) -> u32 {
        self.pending_payment
            .saturating_add(self.pending_shipment)
            .saturating_add(self.pending_receipt)
            .saturating_add(self.pending_review)
    }
}

/// A shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    /// Recipient name.
    pub name: String,
    pub phone: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub detail: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// Single-line rendering used on order confirmation.
    #[must_use]
    pub fn full_address(&self) -> String {
        format!("{} {} {} {}", self.province, self.city, self.district, self.detail)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Address not found: {0}")]
    NotFound(AddressId),
}

/// The user's addresses. At most one address is the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressBook {
    addresses: Vec<Address>,
}

impl AddressBook {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            addresses: Vec::new(),
        }
    }

    /// Add or replace an address (matched by id).
    ///
    /// The first address always becomes the default. Adding an address
    /// flagged as default clears the flag everywhere else.
    pub fn upsert(&mut self, mut address: Address) {
        if self.addresses.iter().all(|a| a.id == address.id) {
            address.is_default = true;
        }
        if address.is_default {
            for existing in &mut self.addresses {
                existing.is_default = false;
            }
        }

        match self.addresses.iter_mut().find(|a| a.id == address.id) {
            Some(slot) => *slot = address,
            None => self.addresses.push(address),
        }
    }

    /// Make `id` the only default address.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFound` if no address has that id.
    pub fn set_default(&mut self, id: AddressId) -> Result<(), AddressError> {
        if !self.addresses.iter().any(|a| a.id == id) {
            return Err(AddressError::NotFound(id));
        }
        for address in &mut self.addresses {
            address.is_default = address.id == id;
        }
        Ok(())
    }

    /// Remove an address. If it was the default, the first remaining
    /// address is promoted.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFound` if no address has that id.
    pub fn remove(&mut self, id: AddressId) -> Result<Address, AddressError> {
        let index = self
            .addresses
            .iter()
            .position(|a| a.id == id)
            .ok_or(AddressError::NotFound(id))?;
        let removed = self.addresses.remove(index);
        if removed.is_default
            && let Some(first) = self.addresses.first_mut()
        {
            first.is_default = true;
        }
        Ok(removed)
    }

    #[must_use]
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses.iter().find(|a| a.is_default)
    }

    #[must_use]
    pub fn get(&self, id: AddressId) -> Option<&Address> {
        self.addresses.iter().find(|a| a.id == id)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Address] {
        &self.addresses
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn clear(&mut self) {
        self.addresses.clear();
    }
}
