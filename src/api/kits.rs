//! Kit API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{
    error, reindex_catalog, required_text, strip_keys, success, validate_name_change, ApiResult,
};
use crate::db::Collection;
use crate::errors::AppError;
use crate::models::{
    fields, CatalogItem, CreateKitRequest, ItemKind, Kit, UpdateDocumentRequest, KIT_DERIVED_KEYS,
};
use crate::pricing::kit_discount_percent;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct KitQuery {
    /// Only featured kits when `true`
    #[serde(default)]
    pub featured: Option<bool>,
}

/// GET /api/kits - List kits with their products resolved.
pub async fn list_kits(
    State(state): State<AppState>,
    Query(params): Query<KitQuery>,
) -> ApiResult<Vec<Kit>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_kits().await {
        Ok(kits) => {
            let kits = match params.featured {
                Some(true) => kits.into_iter().filter(|k| k.featured).collect(),
                _ => kits,
            };
            success(kits, revision_id)
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/kits/{id} - Get a single kit.
pub async fn get_kit(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Kit> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_kit(&id).await {
        Ok(Some(kit)) => success(kit, revision_id),
        Ok(None) => error(AppError::not_found("Kit", &id), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// Product ids with blanks removed.
fn clean_ids(ids: &[String]) -> Vec<String> {
    ids.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Set the discount for the given prices, or `null` so the merge clears it.
fn set_discount(changes: &mut Map<String, Value>, original_price: f64, kit_price: f64) {
    let discount = kit_discount_percent(original_price, kit_price)
        .map(|percent| json!(percent))
        .unwrap_or(Value::Null);
    changes.insert("discount".into(), discount);
}

/// POST /api/admin/kits - Create a kit.
pub async fn create_kit(
    State(state): State<AppState>,
    Json(request): Json<CreateKitRequest>,
) -> ApiResult<Kit> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let Some(name) = required_text(Some(request.name.as_str())) else {
        return error(
            AppError::Validation("Name is required".to_string()),
            revision_id,
        );
    };
    let product_ids = clean_ids(&request.product_ids);
    if product_ids.is_empty() {
        return error(
            AppError::Validation("A kit needs at least one product".to_string()),
            revision_id,
        );
    }

    let kit_price = request.kit_price.unwrap_or(0.0);
    let original_price = request.original_price.unwrap_or(0.0);

    let mut body = Map::new();
    body.insert("name".into(), json!(name));
    body.insert(
        "description".into(),
        json!(request.description.as_deref().map(str::trim).unwrap_or("")),
    );
    if let Some(image) = required_text(request.image.as_deref()) {
        body.insert("image".into(), json!(image));
    }
    body.insert("productIds".into(), json!(product_ids));
    body.insert("kitPrice".into(), json!(kit_price));
    body.insert("originalPrice".into(), json!(original_price));
    if let Some(percent) = kit_discount_percent(original_price, kit_price) {
        body.insert("discount".into(), json!(percent));
    }
    body.insert("featured".into(), json!(request.featured.unwrap_or(false)));

    let mut extra = request.extra;
    strip_keys(&mut extra, &KIT_DERIVED_KEYS);
    for (key, value) in extra {
        if !value.is_null() {
            body.entry(key).or_insert(value);
        }
    }

    match state.repo.insert_document(Collection::Kits, None, body).await {
        Ok(doc) => {
            reindex_catalog(&state).await;
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            let products = state.repo.list_products().await.unwrap_or_default();
            tracing::info!(id = %doc.id, "kit created");
            success(Kit::from_document(&doc, &products), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/admin/kits/{id} - Merge changes into a kit.
///
/// The stored discount follows the prices whenever either one changes.
pub async fn update_kit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateDocumentRequest>,
) -> ApiResult<Kit> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let mut changes = request.fields;
    strip_keys(&mut changes, &KIT_DERIVED_KEYS);
    if let Err(e) = validate_name_change(&changes) {
        return error(e, revision_id);
    }

    if let Some(ids) = changes.get("productIds") {
        let ids = fields::string_list(Some(ids)).unwrap_or_default();
        if ids.is_empty() {
            return error(
                AppError::Validation("A kit needs at least one product".to_string()),
                revision_id,
            );
        }
        changes.insert("productIds".into(), json!(ids));
    }

    if changes.contains_key("kitPrice") || changes.contains_key("originalPrice") {
        let existing = match state.repo.get_document(Collection::Kits, &id).await {
            Ok(Some(doc)) => doc,
            Ok(None) => return error(AppError::not_found("Kit", &id), revision_id),
            Err(e) => return error(e, revision_id),
        };
        let price_of = |key: &str| {
            changes
                .get(key)
                .and_then(Value::as_f64)
                .or_else(|| {
                    if changes.contains_key(key) {
                        None
                    } else {
                        fields::number(&existing.data, key)
                    }
                })
                .unwrap_or(0.0)
        };
        let kit_price = price_of("kitPrice");
        let original_price = price_of("originalPrice");
        set_discount(&mut changes, original_price, kit_price);
    }

    match state
        .repo
        .merge_document(Collection::Kits, &id, &changes, request.expected_version)
        .await
    {
        Ok(doc) => {
            reindex_catalog(&state).await;
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            let products = state.repo.list_products().await.unwrap_or_default();
            success(Kit::from_document(&doc, &products), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/admin/kits/{id} - Delete a kit.
pub async fn delete_kit(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_document(Collection::Kits, &id).await {
        Ok(()) => {
            let key = CatalogItem::selection_key(ItemKind::Kit, &id);
            if let Err(e) = state.search.remove(&key).await {
                tracing::warn!("Failed to remove kit from index: {}", e);
            }
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            tracing::info!(id = %id, "kit deleted");
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
