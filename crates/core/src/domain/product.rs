use serde::{Deserialize, Serialize};

/// One cart line as handed over by the host page. Read-only to the widget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLine {
    pub title: String,
    pub sku: String,
    pub quantity: u32,
    /// Unit price in minor currency units (centavos).
    pub unit_price_minor: i64,
}

/// Free-text note attached to one SKU. A whole-order note uses whatever
/// sentinel SKU the caller picked; the widget does not interpret it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub sku: String,
    pub text: String,
}

pub fn total_items(products: &[ProductLine]) -> u32 {
    products.iter().map(|product| product.quantity).sum()
}

pub fn total_price_minor(products: &[ProductLine]) -> i64 {
    products
        .iter()
        .map(|product| i64::from(product.quantity) * product.unit_price_minor)
        .sum()
}
