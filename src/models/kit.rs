//! Kit model: a bundle of products sold at a kit price.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{fields, Product};
use crate::db::Document;
use crate::pricing;

/// Keys rendered by [`Kit`] itself; everything else passes through.
const RENDERED_KEYS: [&str; 15] = [
    "id",
    "name",
    "description",
    "image",
    "productIds",
    "kitPrice",
    "originalPrice",
    "discount",
    "featured",
    "createdAt",
    "updatedAt",
    "version",
    "products",
    "savings",
    "effectivePrice",
];

/// Keys a client may never write into a kit document.
pub const KIT_DERIVED_KEYS: [&str; 7] = [
    "id",
    "createdAt",
    "updatedAt",
    "version",
    "products",
    "savings",
    "effectivePrice",
];

/// A kit with its products resolved and its prices derived.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kit {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub product_ids: Vec<String>,
    pub kit_price: f64,
    pub original_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    pub featured: bool,
    pub created_at: String,
    pub updated_at: String,
    pub version: i64,
    /// Products of `product_ids` that exist, in kit order
    pub products: Vec<Product>,
    pub savings: f64,
    /// Price resolved by the kit price heuristics
    pub effective_price: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Kit {
    /// Normalise a stored kit document against the current product catalog.
    pub fn from_document(doc: &Document, catalog: &[Product]) -> Self {
        let data = &doc.data;

        let product_ids = fields::string_list(data.get("productIds")).unwrap_or_default();
        let products: Vec<Product> = product_ids
            .iter()
            .filter_map(|pid| catalog.iter().find(|p| &p.id == pid).cloned())
            .collect();

        let kit_price = fields::number(data, "kitPrice")
            .or_else(|| fields::number(data, "price"))
            .unwrap_or(0.0);
        let original_price = fields::number(data, "originalPrice").unwrap_or(0.0);
        let products_total: f64 = products.iter().map(|p| p.base_price).sum();

        Kit {
            id: doc.id.clone(),
            name: fields::text(data, "name")
                .or_else(|| fields::text(data, "title"))
                .unwrap_or_default(),
            description: fields::scalar_text(data, "description").unwrap_or_default(),
            image: fields::text(data, "image"),
            product_ids,
            kit_price,
            original_price,
            discount: fields::number(data, "discount"),
            featured: fields::flag(data, "featured").unwrap_or(false),
            created_at: doc.created_at.clone(),
            updated_at: doc.updated_at.clone(),
            version: doc.version,
            savings: pricing::calculate_kit_savings(products_total, original_price, kit_price),
            effective_price: pricing::compute_kit_base_price(
                &Value::Object(data.clone()),
                catalog,
            ),
            products,
            extra: fields::passthrough(data, &RENDERED_KEYS),
        }
    }
}

/// Request body for creating a kit from the admin console.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKitRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub product_ids: Vec<String>,
    #[serde(default)]
    pub kit_price: Option<f64>,
    #[serde(default)]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub featured: Option<bool>,
    /// Free-form keys stored verbatim (`items`, `category`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(id: &str, data: Value) -> Document {
        Document {
            id: id.to_string(),
            data: data.as_object().cloned().unwrap(),
            created_at: "2025-01-01T00:00:00.000000Z".to_string(),
            updated_at: "2025-01-01T00:00:00.000000Z".to_string(),
            version: 1,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            Product::from_document(&document(
                "camiseta",
                json!({ "name": "Camiseta", "basePrice": 35000 }),
            )),
            Product::from_document(&document(
                "pocillo",
                json!({ "name": "Pocillo", "basePrice": 28000 }),
            )),
        ]
    }

    #[test]
    fn test_kit_resolves_products_in_order_and_skips_missing() {
        let kit = Kit::from_document(
            &document(
                "k1",
                json!({
                    "name": "Kit Romántico",
                    "productIds": ["pocillo", "borrado", "camiseta"],
                    "kitPrice": 58000,
                    "originalPrice": 63000,
                    "discount": 8,
                    "featured": true
                }),
            ),
            &catalog(),
        );

        let ids: Vec<&str> = kit.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["pocillo", "camiseta"]);
        assert_eq!(kit.product_ids.len(), 3);
        assert_eq!(kit.savings, 5000.0);
        assert_eq!(kit.effective_price, 58000.0);
        assert_eq!(kit.discount, Some(8.0));
        assert!(kit.featured);
    }

    #[test]
    fn test_kit_without_original_price_saves_against_products() {
        let kit = Kit::from_document(
            &document(
                "k2",
                json!({ "title": "Kit Pareja", "productIds": ["camiseta", "pocillo"], "price": 60000 }),
            ),
            &catalog(),
        );
        assert_eq!(kit.name, "Kit Pareja");
        assert_eq!(kit.kit_price, 60000.0);
        assert_eq!(kit.savings, 3000.0);
        assert!(!kit.featured);
        assert!(kit.extra.contains_key("title"));
    }

    #[test]
    fn test_kit_effective_price_from_items() {
        let kit = Kit::from_document(
            &document(
                "k3",
                json!({
                    "name": "Kit Armado",
                    "items": [{ "productId": "camiseta", "quantity": 2 }]
                }),
            ),
            &catalog(),
        );
        assert_eq!(kit.kit_price, 0.0);
        assert_eq!(kit.effective_price, 70000.0);
        assert_eq!(kit.savings, 0.0);
        assert!(kit.extra.contains_key("items"));
    }
}
