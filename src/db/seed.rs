//! Demo catalog for a fresh store.

use serde_json::{json, Map, Value};

use super::{Collection, Repository};
use crate::errors::AppError;

fn demo_products() -> Vec<(&'static str, Value)> {
    vec![
        (
            "camiseta-personalizada-premium",
            json!({
                "name": "Camiseta Personalizada Premium",
                "category": "camisetas",
                "basePrice": 35000,
                "description": "Camiseta de alta calidad 100% algodón con personalización completa",
                "images": ["/premium-custom-t-shirt.png"],
                "options": {
                    "sizes": ["XS", "S", "M", "L", "XL", "XXL"],
                    "colors": ["Blanco", "Negro", "Gris", "Azul", "Rojo", "Rosa"],
                    "materials": ["Algodón 100%", "Poliéster", "Mezcla"]
                },
                "customization": { "allowText": true, "allowImage": true, "maxTextLength": 50 },
                "tags": ["camiseta", "personalizada"]
            }),
        ),
        (
            "pocillo-magico-cambio-color",
            json!({
                "name": "Pocillo Mágico Cambio de Color",
                "category": "pocillos",
                "basePrice": 28000,
                "description": "Pocillo que cambia de color con líquidos calientes",
                "images": ["/magic-color-changing-mug.png"],
                "options": {
                    "sizes": ["11oz", "15oz"],
                    "colors": ["Negro a Blanco", "Azul a Blanco", "Rojo a Blanco"]
                },
                "customization": { "allowText": true, "allowImage": true, "maxTextLength": 30 },
                "tags": ["pocillo", "taza", "magico"]
            }),
        ),
    ]
}

fn demo_kit() -> Value {
    json!({
        "name": "Kit Romántico",
        "description": "Camiseta premium + pocillo mágico, ideal para demostrar cariño.",
        "image": "/kit-romantico.png",
        "productIds": ["camiseta-personalizada-premium", "pocillo-magico-cambio-color"],
        "kitPrice": 58000,
        "originalPrice": 63000,
        "discount": 8,
        "featured": true
    })
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Insert the demo products and kit when the store has no products yet.
///
/// Returns whether anything was written.
pub async fn seed_demo_catalog(repo: &Repository) -> Result<bool, AppError> {
    if repo.count_documents(Collection::Products).await? > 0 {
        tracing::debug!("Catalog not empty, skipping demo seed");
        return Ok(false);
    }

    for (id, product) in demo_products() {
        repo.insert_document(Collection::Products, Some(id), object(product))
            .await?;
    }

    if repo
        .get_document(Collection::Kits, "kit-romantico-inicial")
        .await?
        .is_none()
    {
        repo.insert_document(
            Collection::Kits,
            Some("kit-romantico-inicial"),
            object(demo_kit()),
        )
        .await?;
    }

    tracing::info!("Seeded demo catalog");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_seed_runs_once() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("store.sqlite")).await.unwrap();
        let repo = Repository::new(pool);

        assert!(seed_demo_catalog(&repo).await.unwrap());
        assert!(!seed_demo_catalog(&repo).await.unwrap());

        let products = repo.list_products().await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].sizes.as_ref().map(Vec::len), Some(2));

        let kit = repo.get_kit("kit-romantico-inicial").await.unwrap().unwrap();
        assert_eq!(kit.products.len(), 2);
        assert_eq!(kit.savings, 5000.0);
        assert_eq!(kit.effective_price, 58000.0);
    }
}
