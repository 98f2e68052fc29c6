//! Product, variant and per-size stock types.
//!
//! Apparel stock lives three levels deep: a product owns color variants,
//! a variant owns size rows, and the size row holds the actual counter.

use crate::ids::{CategoryId, ProductId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Category this product belongs to.
    pub category_id: CategoryId,
    /// Product name.
    pub name: String,
    /// Full description.
    pub description: Option<String>,
    /// Base list price.
    pub price: Money,
    /// Color variants carrying the per-size stock tree.
    pub variants: Vec<Variant>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Product {
    /// Create a new product with no variants.
    pub fn new(name: impl Into<String>, category_id: CategoryId, price: Money) -> Self {
        let now = current_timestamp();
        Self {
            id: ProductId::generate(),
            category_id,
            name: name.into(),
            description: None,
            price,
            variants: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a variant.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Add a variant to an existing product.
    pub fn add_variant(&mut self, variant: Variant) {
        self.variants.push(variant);
        self.updated_at = current_timestamp();
    }

    /// Look up a variant by exact color name.
    pub fn variant(&self, color: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.color == color)
    }

    /// Mutable variant lookup by exact color name.
    pub fn variant_mut(&mut self, color: &str) -> Option<&mut Variant> {
        self.variants.iter_mut().find(|v| v.color == color)
    }

    /// Total units on hand across all variants and sizes.
    pub fn total_stock(&self) -> i64 {
        self.variants.iter().map(Variant::total_stock).sum()
    }

    /// Check if any size of any variant has stock.
    pub fn is_in_stock(&self) -> bool {
        self.total_stock() > 0
    }
}

/// A color variant of a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    /// Color name, unique within the product (e.g., "Đen", "Trắng").
    pub color: String,
    /// Image URLs for this colorway.
    pub images: Vec<String>,
    /// Stock rows per size label.
    pub sizes: Vec<SizeStock>,
}

impl Variant {
    /// Create a variant with no sizes.
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            images: Vec::new(),
            sizes: Vec::new(),
        }
    }

    /// Attach a size row.
    pub fn with_size(mut self, label: impl Into<String>, stock: i64) -> Self {
        self.sizes.push(SizeStock::new(label, stock));
        self
    }

    /// Attach an image URL.
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.images.push(url.into());
        self
    }

    /// Look up a size row by exact label.
    pub fn size(&self, label: &str) -> Option<&SizeStock> {
        self.sizes.iter().find(|s| s.label == label)
    }

    /// Mutable size lookup by exact label.
    pub fn size_mut(&mut self, label: &str) -> Option<&mut SizeStock> {
        self.sizes.iter_mut().find(|s| s.label == label)
    }

    /// Total units on hand across all sizes.
    pub fn total_stock(&self) -> i64 {
        self.sizes.iter().map(|s| s.stock).sum()
    }
}

/// Stock counter for one size of one variant.
///
/// The counter never goes negative. One-size items (hats, totes) use an
/// ordinary label such as "Free".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SizeStock {
    /// Size label (e.g., "S", "M", "XL", "Free").
    pub label: String,
    /// Units on hand.
    pub stock: i64,
}

impl SizeStock {
    /// Create a size row. Negative initial stock is clamped to zero.
    pub fn new(label: impl Into<String>, stock: i64) -> Self {
        Self {
            label: label.into(),
            stock: stock.max(0),
        }
    }

    /// Remove up to `quantity` units, clamping at zero.
    ///
    /// Returns the remaining count.
    pub fn deduct(&mut self, quantity: i64) -> i64 {
        self.stock = (self.stock - quantity).max(0);
        self.stock
    }

    /// Check if this size has stock.
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
