//! Stores holding client state.
//!
//! Each store is a plain owned value mutated through `&mut self`. Derived
//! views (cart summary, visible products, category tree) are recomputed on
//! every read, so they never go stale.

pub mod cart;
pub mod category;
pub mod product;
pub mod search;
pub mod user;

pub use cart::{CartStore, CartSummary};
pub use category::CategoryStore;
pub use product::{ParseSortKeyError, ProductFilter, ProductStore, SortKey, filter_products, sort_products};
pub use search::{MAX_HISTORY, SearchHistory};
pub use user::{ProfileUpdate, UserError, UserStore};
