//! Giftshop Backend
//!
//! REST backend for a customizable-gifts storefront: public catalog and kits,
//! quote requests handed off to WhatsApp, and an admin console over a SQLite
//! document store with a Tantivy catalog index.

mod api;
mod auth;
mod calendar;
mod catalog;
mod config;
mod contact;
mod db;
mod errors;
mod models;
mod pricing;
mod search;
mod whatsapp;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use search::CatalogIndex;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub search: Arc<CatalogIndex>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Giftshop Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Index path: {:?}", config.index_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.admin_key.is_none() {
        tracing::warn!("No admin key configured (GIFTS_ADMIN_KEY). Admin API is open!");
    }
    match config.admin_whatsapp.as_deref() {
        None => tracing::warn!(
            "No admin WhatsApp number configured (GIFTS_ADMIN_WHATSAPP). Hand-offs carry no link"
        ),
        Some(raw) if whatsapp::usable_number(raw).is_none() => {
            tracing::warn!("Admin WhatsApp number {:?} has too few digits", raw)
        }
        Some(_) => {}
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    if config.seed_demo && db::seed_demo_catalog(&repo).await? {
        tracing::info!("Seeded demo catalog");
    }

    // Initialize catalog index
    let search = Arc::new(CatalogIndex::open(&config.index_path)?);

    tracing::info!("Building catalog index...");
    let products = repo.list_products().await?;
    let kits = repo.list_kits_with(&products).await?;
    search.rebuild(&products, &kits).await?;
    tracing::info!(
        "Catalog index built with {} products and {} kits",
        products.len(),
        kits.len()
    );

    let state = AppState {
        repo,
        search,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin_key = state.config.admin_key.clone();

    // Admin console, behind the pre-shared key
    let admin_routes = Router::new()
        .route("/datastore", get(api::get_datastore))
        .route("/datastore/revision", get(api::get_revision))
        .route("/products", post(api::create_product))
        .route(
            "/products/{id}",
            put(api::update_product).delete(api::delete_product),
        )
        .route("/kits", post(api::create_kit))
        .route("/kits/{id}", put(api::update_kit).delete(api::delete_kit))
        .route("/quotes", get(api::list_quotes))
        .route("/quotes/{id}", get(api::get_quote).delete(api::delete_quote))
        .route("/quotes/{id}/status", put(api::update_quote_status))
        .route("/quotes/{id}/response", put(api::add_quote_response))
        .route("/messages", get(api::list_messages))
        .route(
            "/messages/{id}",
            get(api::get_message).delete(api::delete_message),
        )
        .route("/messages/{id}/status", put(api::update_message_status))
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_key_layer(admin_key.clone(), req, next)
        }));

    // Storefront
    let public_routes = Router::new()
        .route("/products", get(api::list_products))
        .route("/products/{id}", get(api::get_product))
        .route("/products/{id}/inquiry", get(api::product_inquiry))
        .route("/kits", get(api::list_kits))
        .route("/kits/{id}", get(api::get_kit))
        .route("/catalog/items", get(api::list_catalog_items))
        .route("/quotes", post(api::create_quote))
        .route("/contact", get(api::get_contact_details))
        .route("/contact-messages", post(api::create_contact_message))
        .route("/special-dates", get(api::list_special_dates))
        .route("/special-dates/upcoming", get(api::list_upcoming_dates))
        .route("/special-dates/categories", get(api::list_date_categories))
        .route("/festivals", get(api::list_festivals))
        .nest("/admin", admin_routes);

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", public_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
