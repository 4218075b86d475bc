//! Database repository for document operations.
//!
//! Every write bumps the store revision; updates are conditional on the
//! version that was read so concurrent edits surface as conflicts.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    ContactMessage, Datastore, Kit, MessageStatus, Product, Quote, QuoteStatus, RevisionInfo,
};

/// Keys owned by the store; never written into a document body.
pub const RESERVED_KEYS: [&str; 4] = ["id", "createdAt", "updatedAt", "version"];

/// A named group of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Products,
    Kits,
    Quotes,
    Messages,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Kits => "kits",
            Collection::Quotes => "quotes",
            Collection::Messages => "messages",
        }
    }

    /// Human name of one document, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Collection::Products => "Product",
            Collection::Kits => "Kit",
            Collection::Quotes => "Quote",
            Collection::Messages => "Message",
        }
    }
}

/// A stored record with its server-managed metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
    pub created_at: String,
    pub updated_at: String,
    pub version: i64,
}

impl Document {
    /// The record body as a JSON value.
    pub fn body(&self) -> Value {
        Value::Object(self.data.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    OldestFirst,
    NewestFirst,
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Increment the revision ID and return the new value.
    pub async fn increment_revision(&self) -> Result<i64, AppError> {
        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(timestamp())
            .execute(&self.pool)
            .await?;
        self.get_revision_id().await
    }

    /// Get the full datastore, every collection normalised.
    pub async fn get_datastore(&self) -> Result<Datastore, AppError> {
        let meta =
            sqlx::query("SELECT schema_version, revision_id, generated_at FROM meta WHERE id = 1")
                .fetch_one(&self.pool)
                .await?;

        let products = self.list_products().await?;
        let kits = self.list_kits_with(&products).await?;
        let quotes = self.list_quotes(None).await?;
        let messages = self.list_messages(None).await?;

        Ok(Datastore {
            schema_version: meta.get("schema_version"),
            revision_id: meta.get("revision_id"),
            generated_at: meta.get("generated_at"),
            products,
            kits,
            quotes,
            messages,
        })
    }

    // ==================== DOCUMENT OPERATIONS ====================

    /// List the documents of a collection in insertion order.
    pub async fn list_documents(
        &self,
        collection: Collection,
        order: SortOrder,
    ) -> Result<Vec<Document>, AppError> {
        let sql = match order {
            SortOrder::OldestFirst => {
                "SELECT id, data, created_at, updated_at, version FROM documents WHERE collection = ? ORDER BY created_at, rowid"
            }
            SortOrder::NewestFirst => {
                "SELECT id, data, created_at, updated_at, version FROM documents WHERE collection = ? ORDER BY created_at DESC, rowid DESC"
            }
        };
        let rows = sqlx::query(sql)
            .bind(collection.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(document_from_row).collect()
    }

    pub async fn get_document(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, AppError> {
        let row = sqlx::query(
            "SELECT id, data, created_at, updated_at, version FROM documents WHERE collection = ? AND id = ?",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(document_from_row).transpose()
    }

    pub async fn count_documents(&self, collection: Collection) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM documents WHERE collection = ?")
            .bind(collection.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    /// Insert a document. A fresh UUID is used when `id` is `None`.
    pub async fn insert_document(
        &self,
        collection: Collection,
        id: Option<&str>,
        mut data: Map<String, Value>,
    ) -> Result<Document, AppError> {
        let id = match id {
            Some(id) => id.to_string(),
            None => uuid::Uuid::new_v4().to_string(),
        };
        strip_reserved(&mut data);
        let now = timestamp();
        let body = serde_json::to_string(&data)?;

        let result = sqlx::query(
            "INSERT OR IGNORE INTO documents (collection, id, data, created_at, updated_at, version) VALUES (?, ?, ?, ?, ?, 1)",
        )
        .bind(collection.as_str())
        .bind(&id)
        .bind(&body)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Validation(format!(
                "{} {} already exists",
                collection.kind(),
                id
            )));
        }

        self.increment_revision().await?;

        Ok(Document {
            id,
            data,
            created_at: now.clone(),
            updated_at: now,
            version: 1,
        })
    }

    /// Shallow-merge `changes` into a document with optimistic concurrency
    /// control. A `null` value removes the key.
    pub async fn merge_document(
        &self,
        collection: Collection,
        id: &str,
        changes: &Map<String, Value>,
        expected_version: Option<i64>,
    ) -> Result<Document, AppError> {
        let existing = self
            .get_document(collection, id)
            .await?
            .ok_or_else(|| AppError::not_found(collection.kind(), id))?;

        if let Some(expected) = expected_version {
            if existing.version != expected {
                return Err(AppError::Conflict {
                    message: format!(
                        "Version mismatch: expected {}, current {}",
                        expected, existing.version
                    ),
                    current_version: existing.version,
                });
            }
        }

        let mut data = existing.data.clone();
        for (key, value) in changes {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            if value.is_null() {
                data.shift_remove(key);
            } else {
                data.insert(key.clone(), value.clone());
            }
        }

        let now = timestamp();
        let new_version = existing.version + 1;
        let body = serde_json::to_string(&data)?;

        // Conditional UPDATE so a concurrent writer cannot be overwritten
        let result = sqlx::query(
            "UPDATE documents SET data = ?, updated_at = ?, version = ? WHERE collection = ? AND id = ? AND version = ?",
        )
        .bind(&body)
        .bind(&now)
        .bind(new_version)
        .bind(collection.as_str())
        .bind(id)
        .bind(existing.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get_document(collection, id).await?;
            return Err(AppError::Conflict {
                message: "Concurrent modification detected".to_string(),
                current_version: current.map(|d| d.version).unwrap_or(0),
            });
        }

        self.increment_revision().await?;

        Ok(Document {
            id: id.to_string(),
            data,
            created_at: existing.created_at,
            updated_at: now,
            version: new_version,
        })
    }

    pub async fn delete_document(&self, collection: Collection, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(collection.kind(), id));
        }

        self.increment_revision().await?;
        Ok(())
    }

    // ==================== PRODUCT OPERATIONS ====================

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        let docs = self
            .list_documents(Collection::Products, SortOrder::OldestFirst)
            .await?;
        Ok(docs.iter().map(Product::from_document).collect())
    }

    pub async fn get_product(&self, id: &str) -> Result<Option<Product>, AppError> {
        let doc = self.get_document(Collection::Products, id).await?;
        Ok(doc.as_ref().map(Product::from_document))
    }

    // ==================== KIT OPERATIONS ====================

    pub async fn list_kits(&self) -> Result<Vec<Kit>, AppError> {
        let products = self.list_products().await?;
        self.list_kits_with(&products).await
    }

    /// List kits resolved against an already loaded product catalog.
    pub async fn list_kits_with(&self, products: &[Product]) -> Result<Vec<Kit>, AppError> {
        let docs = self
            .list_documents(Collection::Kits, SortOrder::OldestFirst)
            .await?;
        Ok(docs
            .iter()
            .map(|doc| Kit::from_document(doc, products))
            .collect())
    }

    pub async fn get_kit(&self, id: &str) -> Result<Option<Kit>, AppError> {
        let Some(doc) = self.get_document(Collection::Kits, id).await? else {
            return Ok(None);
        };
        let products = self.list_products().await?;
        Ok(Some(Kit::from_document(&doc, &products)))
    }

    // ==================== QUOTE OPERATIONS ====================

    /// List quotes newest first, optionally filtered by status.
    pub async fn list_quotes(&self, status: Option<QuoteStatus>) -> Result<Vec<Quote>, AppError> {
        let docs = self
            .list_documents(Collection::Quotes, SortOrder::NewestFirst)
            .await?;

        Ok(docs
            .iter()
            .map(Quote::from_document)
            .filter(|quote| status.map_or(true, |s| quote.record.status == s))
            .collect())
    }

    pub async fn get_quote(&self, id: &str) -> Result<Option<Quote>, AppError> {
        let doc = self.get_document(Collection::Quotes, id).await?;
        Ok(doc.as_ref().map(Quote::from_document))
    }

    // ==================== MESSAGE OPERATIONS ====================

    /// List contact messages newest first, optionally filtered by status.
    pub async fn list_messages(
        &self,
        status: Option<MessageStatus>,
    ) -> Result<Vec<ContactMessage>, AppError> {
        let docs = self
            .list_documents(Collection::Messages, SortOrder::NewestFirst)
            .await?;

        Ok(docs
            .iter()
            .map(ContactMessage::from_document)
            .filter(|message| status.map_or(true, |s| message.record.status == s))
            .collect())
    }

    pub async fn get_message(&self, id: &str) -> Result<Option<ContactMessage>, AppError> {
        let doc = self.get_document(Collection::Messages, id).await?;
        Ok(doc.as_ref().map(ContactMessage::from_document))
    }
}

/// Server timestamp: RFC 3339, microseconds, UTC.
fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn strip_reserved(data: &mut Map<String, Value>) {
    for key in RESERVED_KEYS {
        data.shift_remove(key);
    }
}

fn document_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Document, AppError> {
    let raw: String = row.get("data");
    let data = match serde_json::from_str::<Value>(&raw)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Ok(Document {
        id: row.get("id"),
        data,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    })
}
