//! Core types for Storelet.
//!
//! This module provides type-safe wrappers and records for the storefront
//! domain.

pub mod cart;
pub mod category;
pub mod id;
pub mod price;
pub mod product;
pub mod user;

pub use cart::{CartError, CartItem, CartKey};
pub use category::{Category, CategoryNode};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::Product;
pub use user::{Address, AddressBook, AddressError, MemberLevel, OrderStats, UserInfo};
