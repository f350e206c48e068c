//! Mock data standing in for the backend.
//!
//! Generators taking a seed are deterministic for that seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use storelet_core::{
    Address, AddressId, CartItem, Category, CategoryId, MemberLevel, OrderStats, Price, Product,
    ProductId, SkuId, UserId, UserInfo,
};

const PRODUCT_NAMES: &[&str] = &[
    "Linen Shirt",
    "Wireless Earbuds",
    "Ceramic Mug",
    "Green Tea Gift Box",
    "Running Shoes",
    "Face Serum",
    "Bamboo Cutting Board",
    "Smart Watch",
    "Wool Scarf",
    "Hand Cream",
];

const TAGS: &[&str] = &["free-shipping", "limited", "gift", "organic", "imported", "bestseller"];

/// Category IDs of the leaf categories produced by [`mock_categories`].
const LEAF_CATEGORIES: &[u64] = &[101, 102, 201, 202, 301, 302, 401, 501];

/// A fixed two-level category tree.
#[must_use]
pub fn mock_categories() -> Vec<Category> {
    let roots = [
        (1, "Clothing", 1),
        (2, "Electronics", 2),
        (3, "Home", 3),
        (4, "Food", 4),
        (5, "Beauty", 5),
    ];
    let children = [
        (101, 1, "Tops", 1),
        (102, 1, "Shoes", 2),
        (201, 2, "Audio", 1),
        (202, 2, "Wearables", 2),
        (301, 3, "Kitchen", 1),
        (302, 3, "Textiles", 2),
        (401, 4, "Tea", 1),
        (501, 5, "Skincare", 1),
    ];

    roots
        .into_iter()
        .map(|(id, name, sort_order)| Category {
            id: CategoryId::new(id),
            name: name.to_string(),
            parent_id: None,
            sort_order,
            icon: Some(format!("/static/category/{id}.png")),
        })
        .chain(children.into_iter().map(|(id, parent, name, sort_order)| Category {
            id: CategoryId::new(id),
            name: name.to_string(),
            parent_id: Some(CategoryId::new(parent)),
            sort_order,
            icon: None,
        }))
        .collect()
}

fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.random_range(0..items.len()))
}

/// `count` random products with IDs `1..=count`.
#[must_use]
pub fn mock_products(count: usize, seed: u64) -> Vec<Product> {
    let mut rng = StdRng::seed_from_u64(seed);
    (1..=count as u64)
        .map(|id| {
            let base = pick(&mut rng, PRODUCT_NAMES).copied().unwrap_or("Product");
            let price_minor: u32 = rng.random_range(990..=99_900);
            let original_price = rng
                .random_bool(0.6)
                .then(|| Price::from_minor(price_minor * rng.random_range(110..=150) / 100));
            let tags = TAGS
                .iter()
                .filter(|_| rng.random_bool(0.3))
                .map(|t| (*t).to_string())
                .collect();
            let category = pick(&mut rng, LEAF_CATEGORIES).copied().unwrap_or(101);

            Product {
                id: ProductId::new(id),
                name: format!("{base} #{id}"),
                description: format!("Mock description for {base}"),
                price: Price::from_minor(price_minor),
                original_price,
                stock: rng.random_range(0..=200),
                rating: f32::from(rng.random_range(30u8..=50)) / 10.0,
                sales: rng.random_range(0..=50_000),
                tags,
                category_id: CategoryId::new(category),
                images: vec![format!("https://picsum.photos/seed/{id}/400/400")],
                is_recommended: rng.random_bool(0.15),
                is_hot: rng.random_bool(0.2),
                is_new: rng.random_bool(0.25),
            }
        })
        .collect()
}

/// A few cart lines built from in-stock mock products.
#[must_use]
pub fn mock_cart_items(seed: u64) -> Vec<CartItem> {
    let mut rng = StdRng::seed_from_u64(seed);
    mock_products(12, seed)
        .iter()
        .filter(|p| p.stock > 0)
        .take(4)
        .map(|product| {
            let sku = rng.random_bool(0.5).then(|| SkuId::new(product.id.as_u64() * 10 + 1));
            let spec = sku.map(|_| "Default / M".to_string());
            let mut item = CartItem::from_product(product, sku, spec);
            item.quantity = rng.random_range(1..=product.stock.min(3));
            item
        })
        .collect()
}

#[must_use]
pub fn mock_user() -> UserInfo {
    UserInfo {
        id: UserId::new(10_001),
        nickname: "Storelet Shopper".to_string(),
        avatar: Some("https://picsum.photos/seed/avatar/200/200".to_string()),
        phone: Some("13812345678".to_string()),
        member_level: MemberLevel::Gold,
        points: 2_680,
    }
}

#[must_use]
pub fn mock_addresses() -> Vec<Address> {
    vec![
        Address {
            id: AddressId::new(1),
            name: "Zhang Wei".to_string(),
            phone: "13812345678".to_string(),
            province: "Zhejiang".to_string(),
            city: "Hangzhou".to_string(),
            district: "Xihu".to_string(),
            detail: "18 Wensan Road, Unit 402".to_string(),
            is_default: true,
        },
        Address {
            id: AddressId::new(2),
            name: "Zhang Wei".to_string(),
            phone: "13812345678".to_string(),
            province: "Shanghai".to_string(),
            city: "Shanghai".to_string(),
            district: "Pudong".to_string(),
            detail: "88 Century Avenue, Floor 12".to_string(),
            is_default: false,
        },
    ]
}

#[must_use]
pub fn mock_order_stats(seed: u64) -> OrderStats {
    let mut rng = StdRng::seed_from_u64(seed);
    OrderStats {
        pending_payment: rng.random_range(0..=3),
        pending_shipment: rng.random_range(0..=3),
        pending_receipt: rng.random_range(0..=3),
        pending_review: rng.random_range(0..=5),
        after_sale: rng.random_range(0..=1),
    }
}
