//! Per-user cart record stored as JSON in the session store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cms::Product;

/// Mapping from product document id to quantity
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: BTreeMap<String, u32>,
}

impl Cart {
    /// Add `quantity` units of a product, accumulating with any existing entry
    pub fn add(&mut self, product_id: &str, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let entry = self.items.entry(product_id.to_string()).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    /// Remove a product entirely; removing an absent product is a no-op
    pub fn remove(&mut self, product_id: &str) {
        self.items.remove(product_id);
    }

    /// Quantity stored for a product, zero when absent
    pub fn quantity(&self, product_id: &str) -> u32 {
        self.items.get(product_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate over (product document id, quantity) pairs in stable order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items.iter().map(|(id, qty)| (id.as_str(), *qty))
    }
}

/// A cart entry joined with its catalog product for rendering
#[derive(Clone, Debug, PartialEq)]
pub struct CartLine {
    pub document_id: String,
    pub title: String,
    pub quantity: u32,
    pub price: Option<f64>,
}

impl CartLine {
    pub fn subtotal(&self) -> Option<f64> {
        self.price.map(|price| price * f64::from(self.quantity))
    }
}

/// Join cart entries with the current catalog. Products the CMS no longer
/// serves keep their line but render without a price.
pub fn cart_lines(cart: &Cart, products: &[Product]) -> Vec<CartLine> {
    cart.iter()
        .map(|(document_id, quantity)| {
            let product = products.iter().find(|p| p.document_id == document_id);
            CartLine {
                document_id: document_id.to_string(),
                title: product
                    .map(|p| p.title.clone())
                    .unwrap_or_else(|| "Unavailable item".to_string()),
                quantity,
                price: product.map(|p| p.price),
            }
        })
        .collect()
}
