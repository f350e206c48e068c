//! Storelet Core - Shared types library.
//!
//! This crate provides the types used across all Storelet components:
//! - `client` - HTTP pipeline, device storage and the reactive stores
//! - `integration-tests` - End-to-end tests over an in-memory transport
//!
//! # Architecture
//!
//! The core crate contains only types, their invariants and display helpers -
//! no I/O, no storage access, no HTTP clients. This keeps it lightweight and
//! allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, products, cart lines, categories and user records
//! - [`format`] - Price, count, time and text display helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod format;
pub mod types;

pub use types::*;
