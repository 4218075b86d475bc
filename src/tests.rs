//! Integration tests for the storefront backend.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::search::CatalogIndex;
use crate::{create_router, AppState};

const ADMIN_KEY: &str = "test-admin-key";
const ADMIN_WHATSAPP: &str = "+57 300 555 1234";

/// Test fixture for integration tests.
struct TestFixture {
    /// Sends the admin key on every request
    client: Client,
    /// Sends no credentials
    anon: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_options(Some(ADMIN_KEY.to_string()), Some(ADMIN_WHATSAPP.to_string())).await
    }

    async fn with_options(admin_key: Option<String>, admin_whatsapp: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        let index_path = temp_dir.path().join("index");

        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        let search = Arc::new(CatalogIndex::open(&index_path).expect("Failed to init index"));

        let config = Config {
            admin_key: admin_key.clone(),
            db_path,
            index_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            admin_whatsapp,
            seed_demo: false,
        };

        let state = AppState {
            repo,
            search,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = admin_key {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            anon: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn put(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn delete(&self, path: &str) -> (u16, Value) {
        let resp = self.client.delete(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    /// Create a product through the admin API and return its id.
    async fn create_product(&self, body: Value) -> String {
        let (status, body) = self.post("/api/admin/products", body).await;
        assert_eq!(status, 200, "create product failed: {}", body);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Create a kit through the admin API and return its id.
    async fn create_kit(&self, body: Value) -> String {
        let (status, body) = self.post("/api/admin/kits", body).await;
        assert_eq!(status, 200, "create kit failed: {}", body);
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_admin_requires_key() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .anon
        .get(fixture.url("/api/admin/datastore"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let resp = fixture
        .anon
        .get(fixture.url("/api/admin/quotes"))
        .header("x-api-key", "wrong-key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = fixture
        .anon
        .get(fixture.url("/api/admin/quotes"))
        .header("Authorization", format!("Bearer {}", ADMIN_KEY))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_storefront_is_public() {
    let fixture = TestFixture::new().await;

    for path in ["/api/products", "/api/kits", "/api/contact", "/api/festivals"] {
        let resp = fixture.anon.get(fixture.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), 200, "{} should be public", path);
    }
}

#[tokio::test]
async fn test_admin_open_without_configured_key() {
    let fixture = TestFixture::with_options(None, None).await;

    let resp = fixture
        .anon
        .get(fixture.url("/api/admin/datastore/revision"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_product_crud() {
    let fixture = TestFixture::new().await;

    let (status, created) = fixture
        .post(
            "/api/admin/products",
            json!({
                "name": "  Taza Halloween  ",
                "category": "pocillos",
                "basePrice": 25000,
                "tags": ["Halloween", "Día de Brujas"],
                "options": { "sizes": ["11oz"] }
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(created["success"], true);
    let product = &created["data"];
    let id = product["id"].as_str().unwrap().to_string();
    assert_eq!(product["name"], "Taza Halloween");
    assert_eq!(product["basePrice"], 25000.0);
    assert_eq!(product["tags"], json!(["#halloween", "#día-de-brujas"]));
    assert_eq!(product["options"]["sizes"], json!(["11oz"]));
    assert_eq!(product["version"], 1);

    let (status, fetched) = fixture.get(&format!("/api/products/{}", id)).await;
    assert_eq!(status, 200);
    assert_eq!(fetched["data"]["name"], "Taza Halloween");

    let (status, updated) = fixture
        .put(
            &format!("/api/admin/products/{}", id),
            json!({ "basePrice": 27000, "category": null, "expectedVersion": 1 }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(updated["data"]["basePrice"], 27000.0);
    assert_eq!(updated["data"]["version"], 2);
    assert!(updated["data"].get("category").is_none());
    assert!(updated["revisionId"].as_i64().unwrap() > created["revisionId"].as_i64().unwrap());

    let (status, deleted) = fixture.delete(&format!("/api/admin/products/{}", id)).await;
    assert_eq!(status, 200);
    assert_eq!(deleted["success"], true);

    let (status, missing) = fixture.get(&format!("/api/products/{}", id)).await;
    assert_eq!(status, 404);
    assert_eq!(missing["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_product_update_version_conflict() {
    let fixture = TestFixture::new().await;
    let id = fixture
        .create_product(json!({ "name": "Cojín", "basePrice": 30000 }))
        .await;

    let (status, _) = fixture
        .put(
            &format!("/api/admin/products/{}", id),
            json!({ "name": "Cojín Estampado", "expectedVersion": 1 }),
        )
        .await;
    assert_eq!(status, 200);

    let (status, stale) = fixture
        .put(
            &format!("/api/admin/products/{}", id),
            json!({ "name": "Cojín Viejo", "expectedVersion": 1 }),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(stale["error"]["code"], "VERSION_MISMATCH");
    assert_eq!(stale["error"]["details"]["currentVersion"], 2);
}

#[tokio::test]
async fn test_product_validation() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post("/api/admin/products", json!({ "name": "   ", "basePrice": 1000 }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let id = fixture.create_product(json!({ "name": "Llavero" })).await;
    let (status, body) = fixture
        .put(&format!("/api/admin/products/{}", id), json!({ "name": "" }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = fixture
        .put("/api/admin/products/does-not-exist", json!({ "stock": 3 }))
        .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_product_filters() {
    let fixture = TestFixture::new().await;
    fixture
        .create_product(json!({
            "name": "Camiseta Estampada",
            "category": "camisetas",
            "basePrice": 35000,
            "tags": ["halloween"]
        }))
        .await;
    fixture
        .create_product(json!({
            "name": "Pocillo Mágico",
            "category": "pocillos",
            "basePrice": 28000,
            "description": "Cambia de color"
        }))
        .await;

    let names = |body: &Value| -> Vec<String> {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect()
    };

    let (_, all) = fixture.get("/api/products").await;
    assert_eq!(names(&all), vec!["Camiseta Estampada", "Pocillo Mágico"]);

    let (_, by_term) = fixture.get("/api/products?q=color").await;
    assert_eq!(names(&by_term), vec!["Pocillo Mágico"]);

    let (_, by_category) = fixture.get("/api/products?category=Camisetas").await;
    assert_eq!(names(&by_category), vec!["Camiseta Estampada"]);

    let (_, by_price) = fixture.get("/api/products?minPrice=30000").await;
    assert_eq!(names(&by_price), vec!["Camiseta Estampada"]);

    let (_, by_holiday) = fixture.get("/api/products?holiday=%23Halloween").await;
    assert_eq!(names(&by_holiday), vec!["Camiseta Estampada"]);
}

#[tokio::test]
async fn test_product_inquiry_handoff() {
    let fixture = TestFixture::new().await;
    let id = fixture
        .create_product(json!({ "name": "Gorra Bordada", "basePrice": 35000 }))
        .await;

    let (status, body) = fixture
        .get(&format!("/api/products/{}/inquiry", id))
        .await;
    assert_eq!(status, 200);
    let handoff = &body["data"];
    assert_eq!(
        handoff["message"],
        format!(
            "Hola, quiero cotizar este producto: Gorra Bordada (id: {}). Precio base: $ 35.000.",
            id
        )
    );
    assert!(handoff["link"]
        .as_str()
        .unwrap()
        .starts_with("https://wa.me/573005551234?text="));
    assert!(handoff["nativeLink"]
        .as_str()
        .unwrap()
        .starts_with("whatsapp://send?phone=573005551234"));

    let no_number = TestFixture::with_options(Some(ADMIN_KEY.to_string()), None).await;
    let id = no_number
        .create_product(json!({ "name": "Gorra", "basePrice": 1000 }))
        .await;
    let (_, body) = no_number
        .get(&format!("/api/products/{}/inquiry", id))
        .await;
    assert!(body["data"]["link"]
        .as_str()
        .unwrap()
        .starts_with("https://web.whatsapp.com/send?text="));
    assert!(body["data"].get("nativeLink").is_none());
}

#[tokio::test]
async fn test_kit_create_and_derived_prices() {
    let fixture = TestFixture::new().await;
    let shirt = fixture
        .create_product(json!({ "name": "Camiseta", "basePrice": 35000 }))
        .await;
    let mug = fixture
        .create_product(json!({ "name": "Pocillo", "basePrice": 28000 }))
        .await;

    let (status, created) = fixture
        .post(
            "/api/admin/kits",
            json!({
                "name": "Kit Amor",
                "productIds": [shirt, mug, "missing-product"],
                "kitPrice": 50000,
                "originalPrice": 60000,
                "featured": true
            }),
        )
        .await;
    assert_eq!(status, 200);
    let kit = &created["data"];
    let kit_id = kit["id"].as_str().unwrap().to_string();
    assert_eq!(kit["discount"], 17.0);
    assert_eq!(kit["savings"], 10000.0);
    assert_eq!(kit["effectivePrice"], 50000.0);
    assert_eq!(kit["products"].as_array().unwrap().len(), 2);
    assert_eq!(kit["products"][0]["name"], "Camiseta");

    fixture
        .create_kit(json!({ "name": "Kit Simple", "productIds": [mug] }))
        .await;

    let (_, featured) = fixture.get("/api/kits?featured=true").await;
    let featured = featured["data"].as_array().unwrap();
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0]["id"], kit_id.as_str());

    let (status, fetched) = fixture.get(&format!("/api/kits/{}", kit_id)).await;
    assert_eq!(status, 200);
    assert_eq!(fetched["data"]["name"], "Kit Amor");
}

#[tokio::test]
async fn test_kit_update_recomputes_discount() {
    let fixture = TestFixture::new().await;
    let mug = fixture
        .create_product(json!({ "name": "Pocillo", "basePrice": 28000 }))
        .await;
    let kit_id = fixture
        .create_kit(json!({
            "name": "Kit Café",
            "productIds": [mug],
            "kitPrice": 45000,
            "originalPrice": 50000
        }))
        .await;

    let (status, updated) = fixture
        .put(
            &format!("/api/admin/kits/{}", kit_id),
            json!({ "kitPrice": 40000, "savings": 999999 }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(updated["data"]["discount"], 20.0);
    assert_eq!(updated["data"]["savings"], 10000.0);

    let (status, body) = fixture
        .put(
            &format!("/api/admin/kits/{}", kit_id),
            json!({ "productIds": [] }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_kit_validation() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/admin/kits",
            json!({ "name": "Kit Vacío", "productIds": ["  "] }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = fixture.get("/api/kits/nope").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_catalog_items() {
    let fixture = TestFixture::new().await;
    let mug = fixture
        .create_product(json!({
            "name": "Pocillo Mágico",
            "basePrice": 28000,
            "sku": "POC-001"
        }))
        .await;
    fixture
        .create_product(json!({ "name": "Camiseta Premium", "basePrice": 35000 }))
        .await;
    let kit_id = fixture
        .create_kit(json!({
            "name": "Kit Desayuno",
            "productIds": [mug],
            "kitPrice": 40000
        }))
        .await;

    let (status, browse) = fixture.get("/api/catalog/items").await;
    assert_eq!(status, 200);
    let items = browse["data"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["type"], "product");
    assert_eq!(items[2]["type"], "kit");
    assert_eq!(items[2]["key"], format!("kit:{}", kit_id));
    assert_eq!(items[2]["basePrice"], 40000.0);
    assert!(items[0].get("score").is_none());

    // The kit matches through its product's name
    let (_, found) = fixture.get("/api/catalog/items?q=pocillo").await;
    let found = found["data"].as_array().unwrap();
    let keys: Vec<&str> = found.iter().map(|i| i["key"].as_str().unwrap()).collect();
    assert_eq!(found.len(), 2);
    assert!(keys.contains(&mug.as_str()));
    assert!(keys.contains(&format!("kit:{}", kit_id).as_str()));
    assert_eq!(found[0]["id"], mug.as_str());
    assert!(found[0]["score"].as_f64().unwrap() > 0.0);

    // Partial words match while the customer is still typing
    let (_, typing) = fixture.get("/api/catalog/items?q=pocil").await;
    assert_eq!(typing["data"].as_array().unwrap().len(), 2);
    let (_, typing) = fixture.get("/api/catalog/items?q=POC-0").await;
    assert_eq!(typing["data"][0]["id"], mug.as_str());
    let (_, typing) = fixture.get("/api/catalog/items?q=desay").await;
    assert_eq!(typing["data"][0]["key"], format!("kit:{}", kit_id));

    let (status, _) = fixture.get("/api/catalog/items?q=%22unbalanced").await;
    assert_eq!(status, 200);

    fixture.delete(&format!("/api/admin/kits/{}", kit_id)).await;
    let (_, after) = fixture.get("/api/catalog/items?q=desayuno").await;
    assert!(after["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_quote_priced_server_side() {
    let fixture = TestFixture::new().await;
    let shirt = fixture
        .create_product(json!({
            "name": "Camiseta",
            "category": "camisetas",
            "basePrice": 35000
        }))
        .await;
    let kit_id = fixture
        .create_kit(json!({
            "name": "Kit Regalo",
            "productIds": [shirt],
            "kitPrice": 58000
        }))
        .await;

    let (status, created) = fixture
        .post(
            "/api/quotes",
            json!({
                "customerName": "Ana Pérez",
                "customerEmail": "ana@example.com",
                "customerPhone": "3001112233",
                "urgency": "urgent",
                "specialRequests": "Empaque de regalo",
                "items": [
                    { "productId": shirt, "quantity": 2, "basePrice": 1, "selectedSize": "M" },
                    { "productId": format!("kit:{}", kit_id), "quantity": 0 },
                    { "productId": "custom-item", "productName": "Llavero", "quantity": 3, "basePrice": 5000 }
                ]
            }),
        )
        .await;
    assert_eq!(status, 200, "{}", created);

    let quote = &created["data"]["quote"];
    assert_eq!(quote["status"], "pending");
    assert_eq!(quote["urgency"], "urgent");
    assert_eq!(quote["version"], 1);

    let items = quote["items"].as_array().unwrap();
    assert_eq!(items[0]["basePrice"], 35000.0);
    assert_eq!(items[0]["totalPrice"], 70000.0);
    assert_eq!(items[0]["category"], "camisetas");
    assert_eq!(items[0]["selectedSize"], "M");
    assert_eq!(items[1]["productName"], "Kit Regalo");
    assert_eq!(items[1]["category"], "Kit");
    assert_eq!(items[1]["quantity"], 1);
    assert_eq!(items[1]["basePrice"], 58000.0);
    assert_eq!(items[2]["totalPrice"], 15000.0);
    assert_eq!(quote["totalEstimate"], 143000.0);

    let handoff = &created["data"]["whatsapp"];
    let message = handoff["message"].as_str().unwrap();
    assert!(message.starts_with("Hola, solicito una cotización:"));
    assert!(message.contains("1. Camiseta x2 - $ 35.000 each"));
    assert!(message.contains("Total estimado: $ 143.000"));
    assert!(message.contains("Urgencia: urgent"));
    assert!(handoff["link"]
        .as_str()
        .unwrap()
        .starts_with("https://wa.me/573005551234?text="));
}

#[tokio::test]
async fn test_quote_validation() {
    let fixture = TestFixture::new().await;

    let base = json!({
        "customerName": "Luis",
        "customerEmail": "luis@example.com",
        "customerPhone": "3000000000",
        "items": [{ "productId": "x", "quantity": 1, "basePrice": 1000 }]
    });

    let mut no_name = base.clone();
    no_name["customerName"] = json!("  ");
    let (status, body) = fixture.post("/api/quotes", no_name).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let mut no_items = base.clone();
    no_items["items"] = json!([]);
    let (status, _) = fixture.post("/api/quotes", no_items).await;
    assert_eq!(status, 400);

    let mut blank_id = base.clone();
    blank_id["items"] = json!([{ "productId": "", "quantity": 1 }]);
    let (status, _) = fixture.post("/api/quotes", blank_id).await;
    assert_eq!(status, 400);

    let (status, _) = fixture.post("/api/quotes", base).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_quote_admin_lifecycle() {
    let fixture = TestFixture::new().await;

    let (_, created) = fixture
        .post(
            "/api/quotes",
            json!({
                "customerName": "Marta",
                "customerEmail": "marta@example.com",
                "customerPhone": "3004445566",
                "items": [{ "productId": "p-1", "productName": "Agenda", "basePrice": 20000 }]
            }),
        )
        .await;
    let id = created["data"]["quote"]["id"].as_str().unwrap().to_string();

    let (status, list) = fixture.get("/api/admin/quotes?status=pending").await;
    assert_eq!(status, 200);
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    let (status, updated) = fixture
        .put(
            &format!("/api/admin/quotes/{}/status", id),
            json!({ "status": "processing", "expectedVersion": 1 }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(updated["data"]["status"], "processing");
    assert_eq!(updated["data"]["version"], 2);

    let (status, stale) = fixture
        .put(
            &format!("/api/admin/quotes/{}/status", id),
            json!({ "status": "approved", "expectedVersion": 1 }),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(stale["error"]["details"]["currentVersion"], 2);

    let (status, _) = fixture
        .put(
            &format!("/api/admin/quotes/{}/response", id),
            json!({ "response": "   " }),
        )
        .await;
    assert_eq!(status, 400);

    let (status, answered) = fixture
        .put(
            &format!("/api/admin/quotes/{}/response", id),
            json!({ "response": "Total 40.000, entrega en 3 días", "status": "quoted" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(answered["data"]["response"], "Total 40.000, entrega en 3 días");
    assert_eq!(answered["data"]["status"], "quoted");

    let (_, pending) = fixture.get("/api/admin/quotes?status=pending").await;
    assert!(pending["data"].as_array().unwrap().is_empty());

    let (status, fetched) = fixture.get(&format!("/api/admin/quotes/{}", id)).await;
    assert_eq!(status, 200);
    assert_eq!(fetched["data"]["customerName"], "Marta");

    let (status, _) = fixture.delete(&format!("/api/admin/quotes/{}", id)).await;
    assert_eq!(status, 200);
    let (status, _) = fixture.get(&format!("/api/admin/quotes/{}", id)).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_contact_details() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get("/api/contact").await;
    assert_eq!(status, 200);
    assert!(body["data"]["info"]["whatsapp"].is_string());
    assert!(body["data"]["info"]["hours"]["weekdays"].is_string());
    assert_eq!(body["data"]["socialLinks"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_contact_messages() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/contact-messages",
            json!({ "name": "Carlos", "email": "c@example.com", "message": "Hola" }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, created) = fixture
        .post(
            "/api/contact-messages",
            json!({
                "name": "Carlos",
                "email": "c@example.com",
                "subject": "Pedido corporativo",
                "message": "Necesito 50 agendas"
            }),
        )
        .await;
    assert_eq!(status, 200);
    let message = &created["data"]["message"];
    let id = message["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("msg-"));
    assert_eq!(message["status"], "new");
    assert!(created["data"]["whatsapp"]["message"]
        .as_str()
        .unwrap()
        .contains(&format!("ID: {}", id)));
    assert!(created["data"]["whatsapp"]["link"]
        .as_str()
        .unwrap()
        .starts_with("https://wa.me/573005551234"));

    let (status, updated) = fixture
        .put(
            &format!("/api/admin/messages/{}/status", id),
            json!({ "status": "read" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(updated["data"]["status"], "read");

    let (_, unread) = fixture.get("/api/admin/messages?status=new").await;
    assert!(unread["data"].as_array().unwrap().is_empty());
    let (_, read) = fixture.get("/api/admin/messages?status=read").await;
    assert_eq!(read["data"].as_array().unwrap().len(), 1);

    let (status, fetched) = fixture.get(&format!("/api/admin/messages/{}", id)).await;
    assert_eq!(status, 200);
    assert_eq!(fetched["data"]["subject"], "Pedido corporativo");

    let (status, _) = fixture.delete(&format!("/api/admin/messages/{}", id)).await;
    assert_eq!(status, 200);
    let (status, _) = fixture.delete(&format!("/api/admin/messages/{}", id)).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_contact_message_falls_back_to_store_number() {
    let fixture = TestFixture::with_options(Some(ADMIN_KEY.to_string()), None).await;

    let (status, created) = fixture
        .post(
            "/api/contact-messages",
            json!({
                "name": "Eva",
                "email": "eva@example.com",
                "subject": "Horario",
                "message": "¿Abren el domingo?"
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert!(created["data"]["whatsapp"]["link"]
        .as_str()
        .unwrap()
        .starts_with("https://wa.me/573001234567"));
}

#[tokio::test]
async fn test_special_dates() {
    let fixture = TestFixture::new().await;

    let (status, all) = fixture.get("/api/special-dates").await;
    assert_eq!(status, 200);
    assert_eq!(all["data"].as_array().unwrap().len(), 10);

    let (_, amor) = fixture.get("/api/special-dates?category=amor").await;
    let amor = amor["data"].as_array().unwrap();
    assert_eq!(amor.len(), 1);
    assert_eq!(amor[0]["id"], "san-valentin");
    assert!(amor[0]["giftSuggestions"].is_array());

    let (_, june) = fixture.get("/api/special-dates?month=6").await;
    assert_eq!(june["data"].as_array().unwrap().len(), 2);

    let (status, body) = fixture.get("/api/special-dates?category=otra").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = fixture.get("/api/special-dates?month=13").await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_upcoming_dates() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .get("/api/special-dates/upcoming?from=2026-10-31&limit=3")
        .await;
    assert_eq!(status, 200);
    let dates = body["data"].as_array().unwrap();
    let ids: Vec<&str> = dates.iter().map(|d| d["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["halloween", "navidad", "ano-nuevo"]);
    assert_eq!(dates[0]["daysUntil"], 0);
    assert_eq!(dates[0]["label"], "¡Hoy!");
    assert_eq!(dates[2]["nextOccurrence"], "2027-01-01");

    let (_, defaults) = fixture.get("/api/special-dates/upcoming").await;
    assert_eq!(defaults["data"].as_array().unwrap().len(), 5);

    let (status, _) = fixture
        .get("/api/special-dates/upcoming?from=31-10-2026")
        .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_categories_and_festivals() {
    let fixture = TestFixture::new().await;

    let (status, categories) = fixture.get("/api/special-dates/categories").await;
    assert_eq!(status, 200);
    assert_eq!(categories["data"].as_array().unwrap().len(), 5);

    let (status, festivals) = fixture.get("/api/festivals").await;
    assert_eq!(status, 200);
    let festivals = festivals["data"].as_array().unwrap();
    let halloween = festivals.iter().find(|f| f["id"] == "halloween").unwrap();
    assert_eq!(halloween["tag"], "#halloween");
}

#[tokio::test]
async fn test_datastore_snapshot() {
    let fixture = TestFixture::new().await;

    let (status, empty) = fixture.get("/api/admin/datastore").await;
    assert_eq!(status, 200);
    assert!(empty["data"]["schemaVersion"].is_number());
    assert!(empty["data"]["products"].as_array().unwrap().is_empty());
    let start = empty["data"]["revisionId"].as_i64().unwrap();

    let id = fixture
        .create_product(json!({ "name": "Agenda", "basePrice": 22000 }))
        .await;
    fixture
        .create_kit(json!({ "name": "Kit Oficina", "productIds": [id] }))
        .await;
    fixture
        .post(
            "/api/contact-messages",
            json!({ "name": "A", "email": "a@b.co", "subject": "S", "message": "M" }),
        )
        .await;

    let (_, snapshot) = fixture.get("/api/admin/datastore").await;
    let data = &snapshot["data"];
    assert_eq!(data["products"].as_array().unwrap().len(), 1);
    assert_eq!(data["kits"].as_array().unwrap().len(), 1);
    assert!(data["quotes"].as_array().unwrap().is_empty());
    assert_eq!(data["messages"].as_array().unwrap().len(), 1);
    assert_eq!(data["revisionId"].as_i64().unwrap(), start + 3);
    assert_eq!(snapshot["revisionId"], data["revisionId"]);

    let (status, revision) = fixture.get("/api/admin/datastore/revision").await;
    assert_eq!(status, 200);
    assert_eq!(revision["data"]["revisionId"].as_i64().unwrap(), start + 3);
    assert!(revision["data"]["generatedAt"].is_string());
}
