//! Product model: the normalised view of a product document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::fields;
use crate::catalog::normalize_tags;
use crate::db::Document;

/// Keys rendered by [`Product`] itself; everything else passes through.
const RENDERED_KEYS: [&str; 17] = [
    "id",
    "name",
    "category",
    "basePrice",
    "description",
    "images",
    "tags",
    "sku",
    "stock",
    "customizable",
    "featured",
    "sizes",
    "colors",
    "materials",
    "createdAt",
    "updatedAt",
    "version",
];

/// A customizable product in the catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub base_price: f64,
    pub description: String,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub sku: String,
    pub stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customizable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materials: Option<Vec<String>>,
    pub created_at: String,
    pub updated_at: String,
    pub version: i64,
    /// Stored keys the view does not interpret (`price`, `options`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Normalise a stored product document.
    pub fn from_document(doc: &Document) -> Self {
        let data = &doc.data;

        let images = fields::string_list(data.get("images"))
            .or_else(|| fields::text(data, "image").map(|image| vec![image]))
            .unwrap_or_default();

        let base_price = fields::number(data, "basePrice")
            .or_else(|| fields::number(data, "price"))
            .unwrap_or(0.0);

        Product {
            id: doc.id.clone(),
            name: fields::text(data, "name")
                .or_else(|| fields::text(data, "title"))
                .unwrap_or_default(),
            category: fields::scalar_text(data, "category"),
            base_price,
            description: fields::scalar_text(data, "description").unwrap_or_default(),
            images,
            tags: normalize_tags(data.get("tags")),
            sku: fields::scalar_text(data, "sku").unwrap_or_default(),
            stock: fields::number(data, "stock").map(|n| n as i64).unwrap_or(0),
            customizable: fields::flag(data, "customizable"),
            featured: fields::flag(data, "featured"),
            sizes: option_list(data, "sizes"),
            colors: option_list(data, "colors"),
            materials: option_list(data, "materials"),
            created_at: doc.created_at.clone(),
            updated_at: doc.updated_at.clone(),
            version: doc.version,
            extra: fields::passthrough(data, &RENDERED_KEYS),
        }
    }
}

/// A variant list stored either at the top level or under `options`.
fn option_list(data: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    fields::string_list(data.get(key)).or_else(|| {
        data.get("options")
            .and_then(Value::as_object)
            .and_then(|options| fields::string_list(options.get(key)))
    })
}

/// Request body for creating a product from the admin console.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub base_price: Option<f64>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    /// Array or comma-separated string
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub customizable: Option<bool>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub sizes: Option<Vec<String>>,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub materials: Option<Vec<String>>,
    /// Free-form keys stored verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
