//! Catalog queries over normalised products.

mod tags;

pub use tags::*;

use crate::models::Product;

/// Storefront catalog filter. Every criterion is optional.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub term: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Festival tag, as typed (`Halloween` or `#halloween`)
    pub holiday: Option<String>,
}

/// Filter products by holiday tag, category, price range and term, in that
/// order. Product order is preserved.
pub fn search_products(products: &[Product], filter: &ProductFilter) -> Vec<Product> {
    let holiday = normalize_holiday_param(filter.holiday.as_deref());
    let category = filter
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_lowercase);
    let price_range = match (filter.min_price, filter.max_price) {
        (None, None) => None,
        (min, max) => Some((min.unwrap_or(0.0), max.unwrap_or(f64::INFINITY))),
    };
    let term = filter
        .term
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    products
        .iter()
        .filter(|p| match &holiday {
            Some(tag) => p.tags.iter().any(|t| t.to_lowercase() == *tag),
            None => true,
        })
        .filter(|p| match &category {
            Some(c) => p.category.as_deref().is_some_and(|pc| pc.to_lowercase() == *c),
            None => true,
        })
        .filter(|p| match price_range {
            Some((min, max)) => p.base_price >= min && p.base_price <= max,
            None => true,
        })
        .filter(|p| match &term {
            Some(t) => matches_term(p, t),
            None => true,
        })
        .cloned()
        .collect()
}

fn matches_term(product: &Product, term: &str) -> bool {
    product.name.to_lowercase().contains(term)
        || product.sku.to_lowercase().contains(term)
        || product.description.to_lowercase().contains(term)
        || product.tags.iter().any(|t| t.to_lowercase().contains(term))
}
