//! Product listing: filtering, sorting and paging over the loaded catalog.

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storelet_core::{CategoryId, Product, ProductId};
use thiserror::Error;
use tracing::{info, instrument};

use crate::http::{ClientError, HttpClient};
use crate::mock;

/// Listing filter. All predicates must hold; unset ones are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    /// Case-insensitive substring of the name or description.
    pub keyword: Option<String>,
    pub category_id: Option<CategoryId>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
    /// Matches products carrying any of these tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ProductFilter {
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(keyword) = self.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            let keyword = keyword.to_lowercase();
            if !product.name.to_lowercase().contains(&keyword)
                && !product.description.to_lowercase().contains(&keyword)
            {
                return false;
            }
        }
        if self.category_id.is_some_and(|id| id != product.category_id) {
            return false;
        }
        let price = product.price.amount();
        if self.min_price.is_some_and(|min| price < min) || self.max_price.is_some_and(|max| price > max) {
            return false;
        }
        self.tags.is_empty() || product.tags.iter().any(|t| self.tags.contains(t))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Recommended first, then hot, then new, then the rest.
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    SalesDesc,
    RatingDesc,
}

impl SortKey {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::SalesDesc => "sales_desc",
            Self::RatingDesc => "rating_desc",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown sort key: {0}")]
pub struct ParseSortKeyError(String);

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "sales_desc" => Ok(Self::SalesDesc),
            "rating_desc" => Ok(Self::RatingDesc),
            other => Err(ParseSortKeyError(other.to_string())),
        }
    }
}

/// Products matching `filter`, in input order.
#[must_use]
pub fn filter_products<'a>(products: &'a [Product], filter: &ProductFilter) -> Vec<&'a Product> {
    products.iter().filter(|p| filter.matches(p)).collect()
}

/// Sort in place. Every order is stable.
pub fn sort_products(products: &mut [&Product], sort: SortKey) {
    match sort {
        SortKey::Default => products.sort_by_key(|p| p.promotion_rank()),
        SortKey::PriceAsc => products.sort_by_key(|p| p.price),
        SortKey::PriceDesc => {
            // Reversing the ascending order keeps this the exact mirror of PriceAsc.
            products.sort_by_key(|p| p.price);
            products.reverse();
        }
        SortKey::SalesDesc => products.sort_by_key(|p| Reverse(p.sales)),
        SortKey::RatingDesc => products.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
    }
}

/// Query sent with `GET /products`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductQuery<'a> {
    keyword: Option<&'a str>,
    category_id: Option<CategoryId>,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
    /// Comma separated.
    tags: Option<String>,
    sort: SortKey,
}

impl<'a> ProductQuery<'a> {
    fn new(filter: &'a ProductFilter, sort: SortKey) -> Self {
        Self {
            keyword: filter.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()),
            category_id: filter.category_id,
            min_price: filter.min_price,
            max_price: filter.max_price,
            tags: (!filter.tags.is_empty()).then(|| filter.tags.join(",")),
            sort,
        }
    }
}

/// Loaded products plus the active filter and sort.
#[derive(Debug, Clone, Default)]
pub struct ProductStore {
    products: Vec<Product>,
    filter: ProductFilter,
    sort: SortKey,
}

impl ProductStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_products(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub const fn filter(&self) -> &ProductFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: ProductFilter) {
        self.filter = filter;
    }

    pub fn reset_filter(&mut self) {
        self.filter = ProductFilter::default();
    }

    #[must_use]
    pub const fn sort(&self) -> SortKey {
        self.sort
    }

    pub const fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
    }

    /// Filtered and sorted view of the loaded products.
    #[must_use]
    pub fn visible(&self) -> Vec<&Product> {
        let mut visible = filter_products(&self.products, &self.filter);
        sort_products(&mut visible, self.sort);
        visible
    }

    /// One page of [`ProductStore::visible`]. Pages are 1-based; page 0 or a
    /// zero size yields nothing.
    #[must_use]
    pub fn page(&self, page: usize, size: usize) -> Vec<&Product> {
        if page == 0 || size == 0 {
            return Vec::new();
        }
        self.visible()
            .into_iter()
            .skip((page - 1).saturating_mul(size))
            .take(size)
            .collect()
    }

    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Up to `limit` recommended products, best sellers first.
    #[must_use]
    pub fn recommended(&self, limit: usize) -> Vec<&Product> {
        let mut recommended: Vec<&Product> = self.products.iter().filter(|p| p.is_recommended).collect();
        sort_products(&mut recommended, SortKey::SalesDesc);
        recommended.truncate(limit);
        recommended
    }

    pub fn load_mock(&mut self, count: usize, seed: u64) {
        self.products = mock::mock_products(count, seed);
    }

    /// Replace the products with `GET /products` for the current filter and sort.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error; the loaded products are kept on failure.
    #[instrument(skip_all, fields(sort = %self.sort))]
    pub async fn refresh(&mut self, http: &HttpClient) -> Result<(), ClientError> {
        let query = ProductQuery::new(&self.filter, self.sort);
        let products: Vec<Product> = http.get("/products", &query).await?;
        info!(count = products.len(), "Products refreshed");
        self.products = products;
        Ok(())
    }
}
