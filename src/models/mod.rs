//! Data models of the storefront.
//!
//! Products and kits are read from loosely-typed documents and normalised on
//! the way out; quotes and contact messages are written by this service and
//! carry a typed record.

mod contact;
mod datastore;
pub(crate) mod fields;
mod item;
mod kit;
mod product;
mod quote;
mod special_date;

pub use contact::*;
pub use datastore::*;
pub use item::*;
pub use kit::*;
pub use product::*;
pub use quote::*;
pub use special_date::*;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Request body for a shallow merge into a product or kit document.
///
/// A key set to `null` removes it from the stored record.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentRequest {
    /// Expected version for optimistic concurrency control
    #[serde(default)]
    pub expected_version: Option<i64>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}
