//! Category store backing the category page.

use storelet_core::types::category::{build_tree, sort_by_order};
use storelet_core::{Category, CategoryId, CategoryNode};
use tracing::{info, instrument};

use crate::http::{ClientError, HttpClient};
use crate::mock;

#[derive(Debug, Clone, Default)]
pub struct CategoryStore {
    categories: Vec<Category>,
}

impl CategoryStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
    }

    #[must_use]
    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    /// Top-level categories by `sort_order`.
    #[must_use]
    pub fn roots(&self) -> Vec<Category> {
        self.level(None)
    }

    /// Direct children of `parent` by `sort_order`.
    #[must_use]
    pub fn children(&self, parent: CategoryId) -> Vec<Category> {
        self.level(Some(parent))
    }

    #[must_use]
    pub fn tree(&self) -> Vec<CategoryNode> {
        build_tree(&self.categories)
    }

    #[must_use]
    pub fn find(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn load_mock(&mut self) {
        self.categories = mock::mock_categories();
    }

    /// Replace the categories with `GET /categories`.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error; the loaded categories are kept on failure.
    #[instrument(skip_all)]
    pub async fn refresh(&mut self, http: &HttpClient) -> Result<(), ClientError> {
        let categories: Vec<Category> = http.get("/categories", &()).await?;
        info!(count = categories.len(), "Categories refreshed");
        self.categories = categories;
        Ok(())
    }

    fn level(&self, parent: Option<CategoryId>) -> Vec<Category> {
        let mut level: Vec<Category> = self
            .categories
            .iter()
            .filter(|c| c.parent_id == parent)
            .cloned()
            .collect();
        sort_by_order(&mut level);
        level
    }
}
