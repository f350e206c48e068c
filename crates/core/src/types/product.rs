//! Catalog product record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::price::Price;

/// A product as shown in listings and detail pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Current selling price.
    pub price: Price,
    /// List price before discount, when the product is on sale.
    #[serde(default)]
    pub original_price: Option<Price>,
    pub stock: u32,
    /// Average review score on a 0-5 scale.
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub sales: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category_id: CategoryId,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_recommended: bool,
    #[serde(default)]
    pub is_hot: bool,
    #[serde(default)]
    pub is_new: bool,
}

impl Product {
    /// First image, used as the listing thumbnail.
    #[must_use]
    pub fn cover(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether any stock is left.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Amount saved per unit against the original price, if discounted.
    #[must_use]
    pub fn unit_savings(&self) -> Option<Decimal> {
        self.original_price
            .map(|original| original.amount() - self.price.amount())
            .filter(|saving| saving.is_sign_positive() && !saving.is_zero())
    }

    /// Rank used by the default listing order: recommended, hot, new, rest.
    #[must_use]
    pub const fn promotion_rank(&self) -> u8 {
        if self.is_recommended {
            0
        } else if self.is_hot {
            1
        } else if self.is_new {
            2
        } else {
            3
        }
    }
}
