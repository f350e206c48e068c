//! Cart line items and the stock rules that govern them.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::{ProductId, SkuId};
use super::price::Price;
use super::product::Product;

/// Errors raised by cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The resulting quantity would exceed the available stock.
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },

    /// Quantity must be at least one when adding.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// No line matches the given identity.
    #[error("Cart item not found: {0}")]
    ItemNotFound(CartKey),
}

/// Identity of a cart line: the product plus the optional variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartKey {
    pub product_id: ProductId,
    pub sku_id: Option<SkuId>,
}

impl CartKey {
    #[must_use]
    pub const fn new(product_id: ProductId, sku_id: Option<SkuId>) -> Self {
        Self { product_id, sku_id }
    }
}

impl fmt::Display for CartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sku_id {
            Some(sku) => write!(f, "{}/{}", self.product_id, sku),
            None => write!(f, "{}", self.product_id),
        }
    }
}

/// A single cart entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub sku_id: Option<SkuId>,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Human readable variant description, e.g. "Blue / XL".
    #[serde(default)]
    pub spec_text: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub original_price: Option<Price>,
    pub stock: u32,
    pub quantity: u32,
    pub selected: bool,
}

impl CartItem {
    /// Build a line for `product`, selected, with zero quantity.
    ///
    /// The quantity is set when the line is added to a cart.
    #[must_use]
    pub fn from_product(product: &Product, sku_id: Option<SkuId>, spec_text: Option<String>) -> Self {
        Self {
            product_id: product.id,
            sku_id,
            name: product.name.clone(),
            image: product.cover().map(String::from),
            spec_text,
            price: product.price,
            original_price: product.original_price,
            stock: product.stock,
            quantity: 0,
            selected: true,
        }
    }

    #[must_use]
    pub const fn key(&self) -> CartKey {
        CartKey::new(self.product_id, self.sku_id)
    }

    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.times(self.quantity)
    }

    /// `(original − price) × quantity`, zero when there is no original price.
    #[must_use]
    pub fn line_savings(&self) -> Decimal {
        self.original_price.map_or(Decimal::ZERO, |original| {
            (original.amount() - self.price.amount()) * Decimal::from(self.quantity)
        })
    }

    /// Check that `quantity` fits within this line's stock.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InsufficientStock` if it does not.
    pub const fn check_stock(&self, quantity: u32) -> Result<(), CartError> {
        if quantity > self.stock {
            return Err(CartError::InsufficientStock {
                requested: quantity,
                available: self.stock,
            });
        }
        Ok(())
    }
}
