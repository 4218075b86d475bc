//! Full snapshot of the store for the admin console.

use serde::{Deserialize, Serialize};

use super::{ContactMessage, Kit, Product, Quote};

/// Every collection, normalised, at one revision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Datastore {
    pub schema_version: i32,
    pub generated_at: String,
    pub revision_id: i64,
    pub products: Vec<Product>,
    pub kits: Vec<Kit>,
    pub quotes: Vec<Quote>,
    pub messages: Vec<ContactMessage>,
}

/// Revision information for change detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}
