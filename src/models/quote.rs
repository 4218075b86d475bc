//! Quote request model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::fields;
use crate::db::Document;
use crate::pricing;

/// Lifecycle of a quote request as handled in the admin console.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Pending,
    Processing,
    Quoted,
    Approved,
    Rejected,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Processing => "processing",
            QuoteStatus::Quoted => "quoted",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(QuoteStatus::Pending),
            "processing" => Some(QuoteStatus::Processing),
            "quoted" => Some(QuoteStatus::Quoted),
            "approved" => Some(QuoteStatus::Approved),
            "rejected" => Some(QuoteStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Normal,
    Urgent,
    Express,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::Urgent => "urgent",
            Urgency::Express => "express",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Some(Urgency::Normal),
            "urgent" => Some(Urgency::Urgent),
            "express" => Some(Urgency::Express),
            _ => None,
        }
    }
}

/// One priced line of a quote.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    /// Product id, or `kit:<id>` for a kit line
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub quantity: u32,
    pub base_price: f64,
    pub total_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_material: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
}

impl QuoteItem {
    /// Read a stored line. Older records use `name`, `qty`, `price` and
    /// `total`; numeric strings are coerced and quantities floored to at
    /// least one.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let quantity = fields::lenient_number(map, "quantity")
            .or_else(|| fields::lenient_number(map, "qty"))
            .filter(|q| *q >= 1.0)
            .map(|q| q.min(f64::from(u32::MAX)).floor() as u32)
            .unwrap_or(1);
        let base_price = fields::lenient_number(map, "basePrice")
            .or_else(|| fields::lenient_number(map, "price"))
            .unwrap_or(0.0);
        let total_price = fields::lenient_number(map, "totalPrice")
            .or_else(|| fields::lenient_number(map, "total"))
            .unwrap_or_else(|| pricing::line_total(base_price, quantity));

        QuoteItem {
            product_id: fields::loose_text(map, "productId")
                .or_else(|| fields::loose_text(map, "id"))
                .unwrap_or_default(),
            product_name: fields::loose_text(map, "productName")
                .or_else(|| fields::loose_text(map, "name")),
            category: fields::loose_text(map, "category"),
            quantity,
            base_price,
            total_price,
            selected_size: fields::loose_text(map, "selectedSize"),
            selected_color: fields::loose_text(map, "selectedColor"),
            selected_material: fields::loose_text(map, "selectedMaterial"),
            custom_message: fields::loose_text(map, "customMessage"),
        }
    }
}

/// Stored body of a quote document.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    pub items: Vec<QuoteItem>,
    pub total_estimate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub urgency: Urgency,
    pub status: QuoteStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl QuoteRecord {
    /// Read a stored quote body; anything missing or mistyped gets its
    /// default. A missing estimate is recomputed from the lines.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let items: Vec<QuoteItem> = map
            .get("items")
            .and_then(Value::as_array)
            .map(|lines| {
                lines
                    .iter()
                    .filter_map(Value::as_object)
                    .map(QuoteItem::from_map)
                    .collect()
            })
            .unwrap_or_default();
        let total_estimate = fields::lenient_number(map, "totalEstimate")
            .unwrap_or_else(|| pricing::quote_total(&items));

        QuoteRecord {
            customer_name: fields::loose_text(map, "customerName")
                .or_else(|| fields::loose_text(map, "name"))
                .unwrap_or_default(),
            customer_email: fields::loose_text(map, "customerEmail")
                .or_else(|| fields::loose_text(map, "email")),
            customer_phone: fields::loose_text(map, "customerPhone")
                .or_else(|| fields::loose_text(map, "phone")),
            company: fields::loose_text(map, "company"),
            event_date: fields::loose_text(map, "eventDate"),
            event_type: fields::loose_text(map, "eventType"),
            items,
            total_estimate,
            special_requests: fields::loose_text(map, "specialRequests"),
            message: fields::loose_text(map, "message"),
            urgency: fields::text(map, "urgency")
                .and_then(|u| Urgency::parse(&u))
                .unwrap_or_default(),
            status: fields::text(map, "status")
                .and_then(|s| QuoteStatus::parse(&s))
                .unwrap_or_default(),
            response: fields::loose_text(map, "response"),
        }
    }
}

/// A quote request as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,
    #[serde(flatten)]
    pub record: QuoteRecord,
    pub created_at: String,
    pub updated_at: String,
    pub version: i64,
}

impl Quote {
    pub fn from_document(doc: &Document) -> Self {
        Quote {
            id: doc.id.clone(),
            record: QuoteRecord::from_map(&doc.data),
            created_at: doc.created_at.clone(),
            updated_at: doc.updated_at.clone(),
            version: doc.version,
        }
    }
}

/// A line as submitted by the quote form. Prices are recomputed server-side.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItemRequest {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub base_price: Option<f64>,
    #[serde(default)]
    pub selected_size: Option<String>,
    #[serde(default)]
    pub selected_color: Option<String>,
    #[serde(default)]
    pub selected_material: Option<String>,
    #[serde(default)]
    pub custom_message: Option<String>,
}

/// Request body of the public quote form.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub items: Vec<QuoteItemRequest>,
    #[serde(default)]
    pub special_requests: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub urgency: Option<Urgency>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuoteStatusRequest {
    pub status: QuoteStatus,
    /// Expected version for optimistic concurrency control
    #[serde(default)]
    pub expected_version: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponseRequest {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub status: Option<QuoteStatus>,
    #[serde(default)]
    pub expected_version: Option<i64>,
}
