//! Quote API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{error, required_text, success, ApiResult};
use crate::db::Collection;
use crate::errors::AppError;
use crate::models::{
    fields, CreateQuoteRequest, Kit, Product, Quote, QuoteItem, QuoteItemRequest, QuoteRecord,
    QuoteResponseRequest, QuoteStatus, UpdateQuoteStatusRequest,
};
use crate::pricing;
use crate::whatsapp::{self, ChatHandoff};
use crate::AppState;

/// Category given to kit lines without one.
const KIT_CATEGORY: &str = "Kit";

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    #[serde(default)]
    pub status: Option<QuoteStatus>,
}

/// A stored quote and the chat hand-off announcing it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedQuote {
    pub quote: Quote,
    pub whatsapp: ChatHandoff,
}

/// Whole units, at least one.
fn clamp_quantity(raw: Option<f64>) -> u32 {
    match raw {
        Some(q) if q.is_finite() && q >= 1.0 => q.min(f64::from(u32::MAX)).floor() as u32,
        _ => 1,
    }
}

/// Price one submitted line against the current catalog.
async fn price_line(
    state: &AppState,
    products: &[Product],
    request: QuoteItemRequest,
    product_id: String,
) -> Result<QuoteItem, AppError> {
    let quantity = clamp_quantity(request.quantity);
    let mut name = required_text(request.product_name.as_deref());
    let mut category = required_text(request.category.as_deref());
    let mut base_price = request
        .base_price
        .filter(|p| p.is_finite())
        .unwrap_or(0.0);

    if let Some(kit_id) = product_id.strip_prefix("kit:") {
        if let Some(doc) = state.repo.get_document(Collection::Kits, kit_id).await? {
            let kit = Kit::from_document(&doc, products);
            if !kit.name.is_empty() {
                name = Some(kit.name);
            }
            category = fields::text(&doc.data, "category").or(Some(KIT_CATEGORY.to_string()));
            base_price = pricing::resolve_kit_unit_price(&doc.body(), products);
        }
    } else if let Some(product) = products.iter().find(|p| p.id == product_id) {
        if !product.name.is_empty() {
            name = Some(product.name.clone());
        }
        category = product.category.clone().or(category);
        base_price = product.base_price;
    }

    Ok(QuoteItem {
        product_id,
        product_name: name,
        category,
        quantity,
        base_price,
        total_price: pricing::line_total(base_price, quantity),
        selected_size: required_text(request.selected_size.as_deref()),
        selected_color: required_text(request.selected_color.as_deref()),
        selected_material: required_text(request.selected_material.as_deref()),
        custom_message: required_text(request.custom_message.as_deref()),
    })
}

/// Validate a submitted quote and price it server-side.
async fn build_quote(state: &AppState, request: CreateQuoteRequest) -> Result<QuoteRecord, AppError> {
    let customer_name = required_text(request.customer_name.as_deref())
        .ok_or_else(|| AppError::Validation("Customer name is required".to_string()))?;
    let customer_email = required_text(request.customer_email.as_deref())
        .ok_or_else(|| AppError::Validation("Customer email is required".to_string()))?;
    let customer_phone = required_text(request.customer_phone.as_deref())
        .ok_or_else(|| AppError::Validation("Customer phone is required".to_string()))?;
    if request.items.is_empty() {
        return Err(AppError::Validation(
            "A quote needs at least one item".to_string(),
        ));
    }

    let mut lines = Vec::with_capacity(request.items.len());
    for (idx, item) in request.items.iter().enumerate() {
        let id = required_text(item.product_id.as_deref()).ok_or_else(|| {
            AppError::Validation(format!("Item {} has no productId", idx + 1))
        })?;
        lines.push(id);
    }

    let products = state.repo.list_products().await?;
    let mut items = Vec::with_capacity(lines.len());
    for (item, product_id) in request.items.into_iter().zip(lines) {
        items.push(price_line(state, &products, item, product_id).await?);
    }

    Ok(QuoteRecord {
        customer_name,
        customer_email: Some(customer_email),
        customer_phone: Some(customer_phone),
        company: required_text(request.company.as_deref()),
        event_date: required_text(request.event_date.as_deref()),
        event_type: required_text(request.event_type.as_deref()),
        total_estimate: pricing::quote_total(&items),
        items,
        special_requests: required_text(request.special_requests.as_deref()),
        message: required_text(request.message.as_deref()),
        urgency: request.urgency.unwrap_or_default(),
        status: QuoteStatus::Pending,
        response: None,
    })
}

fn record_body(record: &QuoteRecord) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::Internal("Quote did not serialize to an object".to_string())),
    }
}

/// POST /api/quotes - Submit a quote request.
pub async fn create_quote(
    State(state): State<AppState>,
    Json(request): Json<CreateQuoteRequest>,
) -> ApiResult<CreatedQuote> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let record = match build_quote(&state, request).await {
        Ok(record) => record,
        Err(e) => return error(e, revision_id),
    };
    let body = match record_body(&record) {
        Ok(body) => body,
        Err(e) => return error(e, revision_id),
    };

    match state.repo.insert_document(Collection::Quotes, None, body).await {
        Ok(doc) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            let handoff = ChatHandoff::to_number(
                whatsapp::quote_message(&record),
                state.config.admin_whatsapp.as_deref(),
            );
            tracing::info!(
                id = %doc.id,
                items = record.items.len(),
                total = record.total_estimate,
                "quote submitted"
            );
            let quote = Quote {
                id: doc.id,
                record,
                created_at: doc.created_at,
                updated_at: doc.updated_at,
                version: doc.version,
            };
            success(
                CreatedQuote {
                    quote,
                    whatsapp: handoff,
                },
                new_revision,
            )
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/admin/quotes - List quotes, newest first.
pub async fn list_quotes(
    State(state): State<AppState>,
    Query(params): Query<QuoteQuery>,
) -> ApiResult<Vec<Quote>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_quotes(params.status).await {
        Ok(quotes) => success(quotes, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/admin/quotes/{id} - Get a single quote.
pub async fn get_quote(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Quote> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_quote(&id).await {
        Ok(Some(quote)) => success(quote, revision_id),
        Ok(None) => error(AppError::not_found("Quote", &id), revision_id),
        Err(e) => error(e, revision_id),
    }
}

async fn merge_quote(
    state: &AppState,
    id: &str,
    changes: Map<String, Value>,
    expected_version: Option<i64>,
) -> Result<Quote, AppError> {
    let doc = state
        .repo
        .merge_document(Collection::Quotes, id, &changes, expected_version)
        .await?;
    Ok(Quote::from_document(&doc))
}

/// PUT /api/admin/quotes/{id}/status - Move a quote through its lifecycle.
pub async fn update_quote_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateQuoteStatusRequest>,
) -> ApiResult<Quote> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let mut changes = Map::new();
    changes.insert("status".into(), json!(request.status.as_str()));

    match merge_quote(&state, &id, changes, request.expected_version).await {
        Ok(quote) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            tracing::info!(id = %id, status = request.status.as_str(), "quote status changed");
            success(quote, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/admin/quotes/{id}/response - Record the admin's answer.
pub async fn add_quote_response(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<QuoteResponseRequest>,
) -> ApiResult<Quote> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let Some(response) = required_text(Some(request.response.as_str())) else {
        return error(
            AppError::Validation("Response is required".to_string()),
            revision_id,
        );
    };

    let mut changes = Map::new();
    changes.insert("response".into(), json!(response));
    if let Some(status) = request.status {
        changes.insert("status".into(), json!(status.as_str()));
    }

    match merge_quote(&state, &id, changes, request.expected_version).await {
        Ok(quote) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(quote, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/admin/quotes/{id} - Delete a quote.
pub async fn delete_quote(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_document(Collection::Quotes, &id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(None), 1);
        assert_eq!(clamp_quantity(Some(0.0)), 1);
        assert_eq!(clamp_quantity(Some(-3.0)), 1);
        assert_eq!(clamp_quantity(Some(f64::NAN)), 1);
        assert_eq!(clamp_quantity(Some(2.0)), 2);
        assert_eq!(clamp_quantity(Some(2.9)), 2);
    }
}
