//! Cart store: line items plus the derived summary.

use rust_decimal::Decimal;
use serde::Serialize;
use storelet_core::{CartError, CartItem, CartKey, Product, SkuId};
use tracing::{debug, instrument};

use crate::mock;

/// Aggregates shown in the cart footer. Recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Sum of quantities over all lines.
    pub total_count: u32,
    /// Sum of quantities over selected lines.
    pub selected_count: u32,
    pub total_price: Decimal,
    pub selected_price: Decimal,
    /// Savings against original prices, selected lines only.
    pub savings: Decimal,
    pub all_selected: bool,
}

/// In-memory cart.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    items: Vec<CartItem>,
}

impl CartStore {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn find(&self, key: &CartKey) -> Option<&CartItem> {
        self.items.iter().find(|i| i.key() == *key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` units of `item`.
    ///
    /// An existing line with the same product and variant grows; otherwise a
    /// new, selected line is appended. The cart is unchanged on error.
    ///
    /// # Errors
    ///
    /// - `CartError::InvalidQuantity` if `quantity` is zero
    /// - `CartError::InsufficientStock` if the line would exceed its stock
    #[instrument(skip(self, item), fields(key = %item.key()))]
    pub fn add_item(&mut self, item: CartItem, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let key = item.key();
        if let Some(existing) = self.items.iter_mut().find(|i| i.key() == key) {
            let new_quantity = existing.quantity.saturating_add(quantity);
            existing.check_stock(new_quantity)?;
            existing.quantity = new_quantity;
            debug!(quantity = new_quantity, "Increased cart line");
            return Ok(());
        }

        item.check_stock(quantity)?;
        self.items.push(CartItem {
            quantity,
            selected: true,
            ..item
        });
        debug!(quantity, "Added cart line");
        Ok(())
    }

    /// Add `quantity` units of `product` (optionally a specific variant).
    ///
    /// # Errors
    ///
    /// See [`CartStore::add_item`].
    pub fn add_product(
        &mut self,
        product: &Product,
        sku_id: Option<SkuId>,
        spec_text: Option<String>,
        quantity: u32,
    ) -> Result<(), CartError> {
        self.add_item(CartItem::from_product(product, sku_id, spec_text), quantity)
    }

    /// Set a line's quantity. Zero or less removes the line.
    ///
    /// # Errors
    ///
    /// - `CartError::ItemNotFound` if no line has `key`
    /// - `CartError::InsufficientStock` if `quantity` exceeds the line's stock
    pub fn update_quantity(&mut self, key: &CartKey, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            return self.remove_item(key).map(|_| ());
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| i.key() == *key)
            .ok_or(CartError::ItemNotFound(*key))?;
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        item.check_stock(quantity)?;
        item.quantity = quantity;
        Ok(())
    }

    /// Remove a line and return it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if no line has `key`.
    pub fn remove_item(&mut self, key: &CartKey) -> Result<CartItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|i| i.key() == *key)
            .ok_or(CartError::ItemNotFound(*key))?;
        Ok(self.items.remove(index))
    }

    /// Flip one line's selection and return the new state.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if no line has `key`.
    pub fn toggle_selection(&mut self, key: &CartKey) -> Result<bool, CartError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.key() == *key)
            .ok_or(CartError::ItemNotFound(*key))?;
        item.selected = !item.selected;
        Ok(item.selected)
    }

    /// Select every line, or deselect every line if all are already selected.
    pub fn toggle_select_all(&mut self) {
        let select = !self.is_all_selected();
        for item in &mut self.items {
            item.selected = select;
        }
    }

    /// `true` when every line is selected. An empty cart is never all selected.
    #[must_use]
    pub fn is_all_selected(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|i| i.selected)
    }

    pub fn selected_items(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter().filter(|i| i.selected)
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        let mut summary = CartSummary {
            all_selected: self.is_all_selected(),
            ..CartSummary::default()
        };
        for item in &self.items {
            summary.total_count = summary.total_count.saturating_add(item.quantity);
            summary.total_price += item.line_total();
            if item.selected {
                summary.selected_count = summary.selected_count.saturating_add(item.quantity);
                summary.selected_price += item.line_total();
                summary.savings += item.line_savings();
            }
        }
        summary
    }

    /// Remove and return the selected lines, e.g. once an order is placed.
    pub fn checkout_selected(&mut self) -> Vec<CartItem> {
        let (selected, kept) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|i| i.selected);
        self.items = kept;
        selected
    }

    /// Drop the selected lines.
    pub fn remove_selected(&mut self) -> usize {
        self.checkout_selected().len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replace the contents with mock lines.
    pub fn load_mock(&mut self, seed: u64) {
        self.items = mock::mock_cart_items(seed);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use storelet_core::{Price, ProductId};

    use super::*;

    fn line(id: u64, price_minor: u32, stock: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            sku_id: None,
            name: format!("item {id}"),
            image: None,
            spec_text: None,
            price: Price::from_minor(price_minor),
            original_price: None,
            stock,
            quantity: 0,
            selected: false,
        }
    }

    fn key(id: u64) -> CartKey {
        CartKey::new(ProductId::new(id), None)
    }

    #[test]
    fn test_summary_example() {
        let mut cart = CartStore::new();
        cart.add_item(line(1, 1_000, 5), 2).unwrap();
        cart.add_item(line(2, 2_000, 1), 1).unwrap();

        assert_eq!(
            cart.summary(),
            CartSummary {
                total_count: 3,
                selected_count: 3,
                total_price: Decimal::new(40, 0),
                selected_price: Decimal::new(40, 0),
                savings: Decimal::ZERO,
                all_selected: true,
            }
        );
    }

    #[test]
    fn test_add_same_identity_accumulates_until_stock() {
        let mut cart = CartStore::new();
        cart.add_item(line(1, 100, 5), 2).unwrap();
        cart.add_item(line(1, 100, 5), 3).unwrap();
        assert_eq!(cart.find(&key(1)).unwrap().quantity, 5);

        let err = cart.add_item(line(1, 100, 5), 1).unwrap_err();
        assert_eq!(
            err,
            CartError::InsufficientStock {
                requested: 6,
                available: 5
            }
        );
        assert_eq!(cart.find(&key(1)).unwrap().quantity, 5);
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_variants_are_separate_lines() {
        let mut cart = CartStore::new();
        let mut red = line(1, 100, 5);
        red.sku_id = Some(SkuId::new(11));
        let mut blue = line(1, 100, 5);
        blue.sku_id = Some(SkuId::new(12));

        cart.add_item(red, 1).unwrap();
        cart.add_item(blue, 1).unwrap();
        assert_eq!(cart.items().len(), 2);
    }

    #[test]
    fn test_add_rejects_zero_and_oversized_new_line() {
        let mut cart = CartStore::new();
        assert_eq!(
            cart.add_item(line(1, 100, 5), 0),
            Err(CartError::InvalidQuantity(0))
        );
        assert!(matches!(
            cart.add_item(line(1, 100, 2), 3),
            Err(CartError::InsufficientStock { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_new_line_defaults_to_selected() {
        let mut cart = CartStore::new();
        cart.add_item(line(1, 100, 5), 1).unwrap();
        assert!(cart.find(&key(1)).unwrap().selected);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = CartStore::new();
        cart.add_item(line(1, 1_000, 5), 2).unwrap();
        cart.update_quantity(&key(1), 0).unwrap();
        assert!(cart.find(&key(1)).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_bounds() {
        let mut cart = CartStore::new();
        cart.add_item(line(1, 1_000, 5), 2).unwrap();

        cart.update_quantity(&key(1), 5).unwrap();
        assert_eq!(cart.find(&key(1)).unwrap().quantity, 5);

        assert!(matches!(
            cart.update_quantity(&key(1), 6),
            Err(CartError::InsufficientStock { requested: 6, available: 5 })
        ));
        assert!(matches!(
            cart.update_quantity(&key(1), i64::MAX),
            Err(CartError::InsufficientStock { .. })
        ));
        assert_eq!(
            cart.update_quantity(&key(9), 1),
            Err(CartError::ItemNotFound(key(9)))
        );
        assert_eq!(
            cart.update_quantity(&key(9), -1),
            Err(CartError::ItemNotFound(key(9)))
        );
    }

    #[test]
    fn test_selection_and_select_all() {
        let mut cart = CartStore::new();
        assert!(!cart.is_all_selected());
        cart.toggle_select_all();
        assert!(!cart.is_all_selected());

        cart.add_item(line(1, 1_000, 5), 1).unwrap();
        cart.add_item(line(2, 500, 5), 2).unwrap();
        assert!(cart.is_all_selected());

        assert!(!cart.toggle_selection(&key(1)).unwrap());
        assert!(!cart.is_all_selected());
        let summary = cart.summary();
        assert_eq!(summary.selected_count, 2);
        assert_eq!(summary.selected_price, Decimal::new(10, 0));
        assert_eq!(summary.total_price, Decimal::new(20, 0));

        cart.toggle_select_all();
        assert!(cart.is_all_selected());
        cart.toggle_select_all();
        assert_eq!(cart.selected_items().count(), 0);
        assert_eq!(cart.summary().selected_price, Decimal::ZERO);
    }

    #[test]
    fn test_savings_only_count_selected_discounted_lines() {
        let mut cart = CartStore::new();
        let mut discounted = line(1, 800, 10);
        discounted.original_price = Some(Price::from_minor(1_000));
        cart.add_item(discounted, 3).unwrap();
        let mut other = line(2, 500, 10);
        other.original_price = Some(Price::from_minor(900));
        cart.add_item(other, 1).unwrap();
        cart.add_item(line(3, 100, 10), 1).unwrap();

        cart.toggle_selection(&key(2)).unwrap();
        assert_eq!(cart.summary().savings, Decimal::new(6, 0));
    }

    #[test]
    fn test_checkout_selected() {
        let mut cart = CartStore::new();
        cart.add_item(line(1, 100, 5), 1).unwrap();
        cart.add_item(line(2, 100, 5), 1).unwrap();
        cart.toggle_selection(&key(2)).unwrap();

        let ordered = cart.checkout_selected();
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].product_id, ProductId::new(1));
        assert_eq!(cart.items().len(), 1);
        assert!(cart.find(&key(2)).is_some());
    }

    #[test]
    fn test_load_mock_and_clear() {
        let mut cart = CartStore::new();
        cart.load_mock(3);
        assert!(!cart.is_empty());
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.summary(), CartSummary::default());
    }
}
