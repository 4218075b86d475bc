//! Product API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{
    error, reindex_catalog, required_text, strip_keys, success, validate_name_change, ApiResult,
};
use crate::catalog::{festival_tags, search_products, ProductFilter};
use crate::db::{Collection, RESERVED_KEYS};
use crate::errors::AppError;
use crate::models::{CreateProductRequest, Product, UpdateDocumentRequest};
use crate::whatsapp::{self, ChatHandoff};
use crate::AppState;

/// Storefront catalog query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    /// Festival tag such as `halloween` or `#halloween`
    #[serde(default)]
    pub holiday: Option<String>,
}

/// GET /api/products - List the catalog, filtered.
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductQuery>,
) -> ApiResult<Vec<Product>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let filter = ProductFilter {
        term: params.q,
        category: params.category,
        min_price: params.min_price,
        max_price: params.max_price,
        holiday: params.holiday,
    };

    match state.repo.list_products().await {
        Ok(products) => success(search_products(&products, &filter), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/products/{id} - Get a single product.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Product> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_product(&id).await {
        Ok(Some(product)) => success(product, revision_id),
        Ok(None) => error(AppError::not_found("Product", &id), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/products/{id}/inquiry - Chat hand-off asking about a product.
pub async fn product_inquiry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ChatHandoff> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_product(&id).await {
        Ok(Some(product)) => success(
            whatsapp::product_inquiry(&product, state.config.admin_whatsapp.as_deref()),
            revision_id,
        ),
        Ok(None) => error(AppError::not_found("Product", &id), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// Stored body of a new product.
fn product_body(request: CreateProductRequest, name: String) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("name".into(), json!(name));
    body.insert(
        "description".into(),
        json!(request.description.unwrap_or_default()),
    );
    body.insert("basePrice".into(), json!(request.base_price.unwrap_or(0.0)));
    body.insert("images".into(), json!(request.images.unwrap_or_default()));
    body.insert(
        "tags".into(),
        json!(request.tags.as_ref().map(festival_tags).unwrap_or_default()),
    );
    body.insert("sku".into(), json!(request.sku.unwrap_or_default()));
    body.insert("stock".into(), json!(request.stock.unwrap_or(0)));

    let optional = [
        ("category", request.category.map(Value::from)),
        ("customizable", request.customizable.map(Value::from)),
        ("featured", request.featured.map(Value::from)),
        ("sizes", request.sizes.map(Value::from)),
        ("colors", request.colors.map(Value::from)),
        ("materials", request.materials.map(Value::from)),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            body.insert(key.into(), value);
        }
    }

    let mut extra = request.extra;
    strip_keys(&mut extra, &RESERVED_KEYS);
    for (key, value) in extra {
        if !value.is_null() {
            body.entry(key).or_insert(value);
        }
    }
    body
}

/// POST /api/admin/products - Create a product.
pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> ApiResult<Product> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let Some(name) = required_text(Some(request.name.as_str())) else {
        return error(
            AppError::Validation("Name is required".to_string()),
            revision_id,
        );
    };

    let body = product_body(request, name);
    match state
        .repo
        .insert_document(Collection::Products, None, body)
        .await
    {
        Ok(doc) => {
            reindex_catalog(&state).await;
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            tracing::info!(id = %doc.id, "product created");
            success(Product::from_document(&doc), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/admin/products/{id} - Merge changes into a product.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateDocumentRequest>,
) -> ApiResult<Product> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let mut fields = request.fields;
    strip_keys(&mut fields, &RESERVED_KEYS);
    if let Err(e) = validate_name_change(&fields) {
        return error(e, revision_id);
    }
    if let Some(tags) = fields.get_mut("tags") {
        if !tags.is_null() {
            *tags = json!(festival_tags(tags));
        }
    }

    match state
        .repo
        .merge_document(Collection::Products, &id, &fields, request.expected_version)
        .await
    {
        Ok(doc) => {
            reindex_catalog(&state).await;
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(Product::from_document(&doc), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/admin/products/{id} - Delete a product.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_document(Collection::Products, &id).await {
        Ok(()) => {
            // kits listing this product are reindexed too
            reindex_catalog(&state).await;
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            tracing::info!(id = %id, "product deleted");
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
