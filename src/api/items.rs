//! Unified item selector for the quote form.

use axum::extract::{Query, State};
use serde::Deserialize;

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CatalogItem, ItemKind, Kit, Product};
use crate::pricing;
use crate::AppState;

/// Items shown before the user types anything.
const BROWSE_LIMIT: usize = 30;
const DEFAULT_SEARCH_LIMIT: usize = 40;
const MAX_SEARCH_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ItemQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

fn product_item(product: &Product) -> CatalogItem {
    CatalogItem {
        id: product.id.clone(),
        key: CatalogItem::selection_key(ItemKind::Product, &product.id),
        name: product.name.clone(),
        kind: ItemKind::Product,
        base_price: product.base_price,
        images: product.images.clone(),
        description: product.description.clone(),
        score: None,
    }
}

fn kit_item(kit: &Kit, raw: &serde_json::Value, products: &[Product]) -> CatalogItem {
    CatalogItem {
        id: kit.id.clone(),
        key: CatalogItem::selection_key(ItemKind::Kit, &kit.id),
        name: kit.name.clone(),
        kind: ItemKind::Kit,
        base_price: pricing::resolve_kit_unit_price(raw, products),
        images: kit.image.iter().cloned().collect(),
        description: kit.description.clone(),
        score: None,
    }
}

/// Every product then every kit, as selector items.
async fn all_items(state: &AppState) -> Result<Vec<CatalogItem>, AppError> {
    let products = state.repo.list_products().await?;
    let kit_docs = state
        .repo
        .list_documents(crate::db::Collection::Kits, crate::db::SortOrder::OldestFirst)
        .await?;

    let mut items: Vec<CatalogItem> = products.iter().map(product_item).collect();
    for doc in &kit_docs {
        let kit = Kit::from_document(doc, &products);
        items.push(kit_item(&kit, &doc.body(), &products));
    }
    Ok(items)
}

/// GET /api/catalog/items - Products and kits for the quote form.
pub async fn list_catalog_items(
    State(state): State<AppState>,
    Query(params): Query<ItemQuery>,
) -> ApiResult<Vec<CatalogItem>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let items = match all_items(&state).await {
        Ok(items) => items,
        Err(e) => return error(e, revision_id),
    };

    let query = params.q.as_deref().map(str::trim).unwrap_or("");
    if query.is_empty() {
        return success(items.into_iter().take(BROWSE_LIMIT).collect(), revision_id);
    }

    let limit = params
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .min(MAX_SEARCH_LIMIT);

    let hits = match state.search.search(query, limit) {
        Ok(hits) => hits,
        Err(e) => return error(e, revision_id),
    };

    let ranked = hits
        .into_iter()
        .filter_map(|hit| {
            let mut item = items.iter().find(|i| i.key == hit.key)?.clone();
            item.score = Some(hit.score);
            Some(item)
        })
        .collect();

    success(ranked, revision_id)
}

/// Rebuild the catalog index from the store. Failures are logged, never
/// returned: the write that triggered the rebuild already succeeded.
pub async fn reindex_catalog(state: &AppState) {
    let products = match state.repo.list_products().await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!("Failed to load products for reindex: {}", e);
            return;
        }
    };
    let kits = match state.repo.list_kits_with(&products).await {
        Ok(kits) => kits,
        Err(e) => {
            tracing::warn!("Failed to load kits for reindex: {}", e);
            return;
        }
    };
    if let Err(e) = state.search.rebuild(&products, &kits).await {
        tracing::warn!("Failed to rebuild catalog index: {}", e);
    }
}
