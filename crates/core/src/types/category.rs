//! Hierarchical product categories.

use serde::{Deserialize, Serialize};

use super::id::CategoryId;

/// A catalog category. Top-level categories have no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    /// Explicit display order, ascending.
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub icon: Option<String>,
}

/// A category with its sorted children, as rendered in the category page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

impl Category {
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Sort categories by `sort_order`, keeping input order for ties.
pub fn sort_by_order(categories: &mut [Category]) {
    categories.sort_by_key(|c| c.sort_order);
}

/// Build the category forest, sorted at every level.
///
/// Categories whose parent is missing from `categories` are dropped.
#[must_use]
pub fn build_tree(categories: &[Category]) -> Vec<CategoryNode> {
    build_level(categories, None, 0)
}

// Depth is bounded by the number of categories so a parent cycle cannot recurse forever.
fn build_level(categories: &[Category], parent: Option<CategoryId>, depth: usize) -> Vec<CategoryNode> {
    if depth > categories.len() {
        return Vec::new();
    }

    let mut level: Vec<Category> = categories
        .iter()
        .filter(|c| c.parent_id == parent)
        .cloned()
        .collect();
    sort_by_order(&mut level);

    level
        .into_iter()
        .map(|category| {
            let children = build_level(categories, Some(category.id), depth + 1);
            CategoryNode { category, children }
        })
        .collect()
}
