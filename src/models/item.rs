//! Unified catalog item used by the quote item selector.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Product,
    Kit,
}

/// A product or kit as offered to the quote form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    /// Value a quote line carries as `productId` (`kit:<id>` for kits)
    pub key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub base_price: f64,
    pub images: Vec<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl CatalogItem {
    pub fn selection_key(kind: ItemKind, id: &str) -> String {
        match kind {
            ItemKind::Product => id.to_string(),
            ItemKind::Kit => format!("kit:{}", id),
        }
    }
}
