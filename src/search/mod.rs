//! Tantivy-based catalog index.
//!
//! Products and kits share one index so the quote form's item selector can
//! rank both with a single query. Every word typed must occur somewhere in
//! the item's text, as a whole word or as part of one; whole-word matches
//! on name, sku, tags and description decide the ranking.

use std::path::Path;
use std::sync::Arc;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, Query, QueryParser, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, Value, STORED, STRING, TEXT,
};
use tantivy::tokenizer::{
    AsciiFoldingFilter, LowerCaser, NgramTokenizer, RawTokenizer, TextAnalyzer, TokenStream,
};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::{CatalogItem, ItemKind, Kit, Product};

const BOOST_NAME: f32 = 10.0;
const BOOST_SKU: f32 = 8.0;
const BOOST_TAGS: f32 = 6.0;
const BOOST_DESCRIPTION: f32 = 4.0;
/// Partial matches only break ties between whole-word matches.
const BOOST_PARTIAL: f32 = 0.1;

const GRAMS_TOKENIZER: &str = "catalog_grams";
/// Longest fragment indexed; longer typed words are matched on their start.
const MAX_GRAM: usize = 20;

/// A ranked catalog entry.
#[derive(Debug, Clone)]
pub struct CatalogHit {
    /// Selection key, `kit:<id>` for kits
    pub key: String,
    pub score: f32,
}

struct CatalogFields {
    item_key: Field,
    name: Field,
    sku: Field,
    tags: Field,
    description: Field,
    /// Every fragment of the item's text, lowercased and accent-folded
    grams: Field,
}

/// Search index over products and kits.
pub struct CatalogIndex {
    index: Index,
    reader: IndexReader,
    writer: Arc<RwLock<IndexWriter>>,
    fields: CatalogFields,
}

fn grams_analyzer() -> Result<TextAnalyzer, AppError> {
    Ok(TextAnalyzer::builder(NgramTokenizer::new(1, MAX_GRAM, false)?)
        .filter(LowerCaser)
        .filter(AsciiFoldingFilter)
        .build())
}

/// Typed words folded the way fragments are indexed.
fn query_fragments(query_str: &str) -> Vec<String> {
    let mut folder = TextAnalyzer::builder(RawTokenizer::default())
        .filter(LowerCaser)
        .filter(AsciiFoldingFilter)
        .build();

    query_str
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric() && c != '#'))
        .filter(|word| !word.is_empty())
        .filter_map(|word| {
            let mut stream = folder.token_stream(word);
            if !stream.advance() {
                return None;
            }
            let folded: String = stream.token().text.chars().take(MAX_GRAM).collect();
            Some(folded)
        })
        .collect()
}

impl CatalogIndex {
    /// Create or open a catalog index at the specified path.
    ///
    /// An index written with another layout is discarded; callers rebuild
    /// it from the store anyway.
    pub fn open(index_path: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(index_path)
            .map_err(|e| AppError::Search(format!("Failed to create index directory: {}", e)))?;

        let grams_options = TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(GRAMS_TOKENIZER)
                .set_index_option(IndexRecordOption::WithFreqs),
        );

        let mut schema_builder = Schema::builder();
        let item_key = schema_builder.add_text_field("item_key", STRING | STORED);
        let name = schema_builder.add_text_field("name", TEXT | STORED);
        let sku = schema_builder.add_text_field("sku", TEXT);
        let tags = schema_builder.add_text_field("tags", TEXT);
        let description = schema_builder.add_text_field("description", TEXT);
        let grams = schema_builder.add_text_field("grams", grams_options);
        let schema = schema_builder.build();

        let fields = CatalogFields {
            item_key,
            name,
            sku,
            tags,
            description,
            grams,
        };

        let index = match Index::open_in_dir(index_path) {
            Ok(existing) if existing.schema() == schema => existing,
            _ => {
                std::fs::remove_dir_all(index_path)
                    .and_then(|_| std::fs::create_dir_all(index_path))
                    .map_err(|e| {
                        AppError::Search(format!("Failed to reset index directory: {}", e))
                    })?;
                Index::create_in_dir(index_path, schema)
                    .map_err(|e| AppError::Search(format!("Failed to create index: {}", e)))?
            }
        };
        index.tokenizers().register(GRAMS_TOKENIZER, grams_analyzer()?);

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e| AppError::Search(format!("Failed to create reader: {}", e)))?;

        // The catalog is small; one indexing thread is plenty
        let writer = index
            .writer_with_num_threads(1, 20_000_000)
            .map_err(|e| AppError::Search(format!("Failed to create writer: {}", e)))?;

        Ok(Self {
            index,
            reader,
            writer: Arc::new(RwLock::new(writer)),
            fields,
        })
    }

    /// Rebuild the entire index from the current catalog.
    pub async fn rebuild(&self, products: &[Product], kits: &[Kit]) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        writer.delete_all_documents()?;

        for product in products {
            writer.add_document(self.product_document(product))?;
        }
        for kit in kits {
            writer.add_document(self.kit_document(kit))?;
        }

        writer.commit()?;
        self.reader.reload()?;

        tracing::info!(
            "Catalog index rebuilt with {} products and {} kits",
            products.len(),
            kits.len()
        );
        Ok(())
    }

    /// Remove one item by its selection key.
    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;
        writer.delete_term(Term::from_field_text(self.fields.item_key, key));
        writer.commit()?;
        self.reader.reload()?;
        Ok(())
    }

    /// Rank catalog items against what the user has typed so far.
    ///
    /// Syntax errors in the query are tolerated: whatever parses is used.
    pub fn search(&self, query_str: &str, limit: usize) -> Result<Vec<CatalogHit>, AppError> {
        let fragments = query_fragments(query_str);
        if fragments.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();

        let partial: Vec<(Occur, Box<dyn Query>)> = fragments
            .iter()
            .map(|fragment| {
                let term = Term::from_field_text(self.fields.grams, fragment);
                let query: Box<dyn Query> =
                    Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));
                (Occur::Must, query)
            })
            .collect();

        let field_queries = [
            (self.fields.name, BOOST_NAME),
            (self.fields.sku, BOOST_SKU),
            (self.fields.tags, BOOST_TAGS),
            (self.fields.description, BOOST_DESCRIPTION),
        ];

        let mut ranking: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for (field, boost) in field_queries {
            let parser = QueryParser::for_index(&self.index, vec![field]);
            let (field_query, _errors) = parser.parse_query_lenient(query_str);
            ranking.push((Occur::Should, Box::new(BoostQuery::new(field_query, boost))));
        }

        let query = BooleanQuery::new(vec![
            (
                Occur::Must,
                Box::new(BoostQuery::new(
                    Box::new(BooleanQuery::new(partial)),
                    BOOST_PARTIAL,
                )) as Box<dyn Query>,
            ),
            (
                Occur::Should,
                Box::new(BooleanQuery::new(ranking)) as Box<dyn Query>,
            ),
        ]);

        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(limit))
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        let hits = top_docs
            .into_iter()
            .filter_map(|(score, address)| {
                let doc: TantivyDocument = searcher.doc(address).ok()?;
                let key = doc.get_first(self.fields.item_key)?.as_str()?.to_string();
                Some(CatalogHit { key, score })
            })
            .collect();

        Ok(hits)
    }

    fn product_document(&self, product: &Product) -> TantivyDocument {
        let tags = product.tags.join(" ");
        let grams = [
            product.name.as_str(),
            product.sku.as_str(),
            tags.as_str(),
            product.description.as_str(),
        ]
        .join(" ");
        doc!(
            self.fields.item_key => CatalogItem::selection_key(ItemKind::Product, &product.id),
            self.fields.name => product.name.clone(),
            self.fields.sku => product.sku.clone(),
            self.fields.tags => tags,
            self.fields.description => product.description.clone(),
            self.fields.grams => grams
        )
    }

    fn kit_document(&self, kit: &Kit) -> TantivyDocument {
        // Kits are found through the names of their products too
        let product_names: Vec<&str> = kit.products.iter().map(|p| p.name.as_str()).collect();
        let product_names = product_names.join(" ");
        let grams = [
            kit.name.as_str(),
            product_names.as_str(),
            kit.description.as_str(),
        ]
        .join(" ");
        doc!(
            self.fields.item_key => CatalogItem::selection_key(ItemKind::Kit, &kit.id),
            self.fields.name => kit.name.clone(),
            self.fields.sku => String::new(),
            self.fields.tags => product_names,
            self.fields.description => kit.description.clone(),
            self.fields.grams => grams
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Document;
    use serde_json::{json, Value as Json};
    use tempfile::TempDir;

    fn document(id: &str, data: Json) -> Document {
        Document {
            id: id.to_string(),
            data: data.as_object().cloned().unwrap(),
            created_at: "2025-01-01T00:00:00.000000Z".to_string(),
            updated_at: "2025-01-01T00:00:00.000000Z".to_string(),
            version: 1,
        }
    }

    fn catalog() -> (Vec<Product>, Vec<Kit>) {
        let products = vec![
            Product::from_document(&document(
                "camiseta",
                json!({
                    "name": "Camiseta Premium",
                    "sku": "CAM-001",
                    "description": "Algodón 100%",
                    "tags": ["#navidad"]
                }),
            )),
            Product::from_document(&document(
                "pocillo",
                json!({ "name": "Pocillo Mágico", "description": "Cambia de color" }),
            )),
        ];
        let kits = vec![Kit::from_document(
            &document(
                "romantico",
                json!({ "name": "Kit Romántico", "productIds": ["pocillo"] }),
            ),
            &products,
        )];
        (products, kits)
    }

    #[tokio::test]
    async fn test_products_and_kits_share_the_index() {
        let temp_dir = TempDir::new().unwrap();
        let index = CatalogIndex::open(temp_dir.path()).unwrap();
        let (products, kits) = catalog();
        index.rebuild(&products, &kits).await.unwrap();

        let hits = index.search("camiseta", 10).unwrap();
        assert_eq!(hits[0].key, "camiseta");

        let hits = index.search("romántico", 10).unwrap();
        assert_eq!(hits[0].key, "kit:romantico");

        // kit found through its product's name, ranked below the product itself
        let hits = index.search("pocillo", 10).unwrap();
        let keys: Vec<&str> = hits.iter().map(|h| h.key.as_str()).collect();
        assert_eq!(keys, vec!["pocillo", "kit:romantico"]);
    }

    #[tokio::test]
    async fn test_sku_and_tag_matches() {
        let temp_dir = TempDir::new().unwrap();
        let index = CatalogIndex::open(temp_dir.path()).unwrap();
        let (products, kits) = catalog();
        index.rebuild(&products, &kits).await.unwrap();

        assert_eq!(index.search("CAM-001", 10).unwrap()[0].key, "camiseta");
        assert_eq!(index.search("navidad", 10).unwrap()[0].key, "camiseta");
    }

    #[tokio::test]
    async fn test_partial_words_match_as_you_type() {
        let temp_dir = TempDir::new().unwrap();
        let index = CatalogIndex::open(temp_dir.path()).unwrap();
        let (products, kits) = catalog();
        index.rebuild(&products, &kits).await.unwrap();

        let keys = |q: &str| -> Vec<String> {
            let mut keys: Vec<String> = index
                .search(q, 10)
                .unwrap()
                .into_iter()
                .map(|h| h.key)
                .collect();
            keys.sort();
            keys
        };

        assert_eq!(keys("cami"), vec!["camiseta"]);
        assert_eq!(keys("CAM-0"), vec!["camiseta"]);
        assert_eq!(keys("navid"), vec!["camiseta"]);
        assert_eq!(keys("seta"), vec!["camiseta"]);
        assert_eq!(keys("pocil"), vec!["kit:romantico", "pocillo"]);
        // accents are optional
        assert_eq!(keys("magi"), vec!["kit:romantico", "pocillo"]);
        assert_eq!(keys("MÁGICO"), vec!["kit:romantico", "pocillo"]);
        // every typed word must match
        assert_eq!(keys("cami pocil"), Vec::<String>::new());
        assert_eq!(keys("xyz"), Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_reopen_keeps_index_usable() {
        let temp_dir = TempDir::new().unwrap();
        let (products, kits) = catalog();
        {
            let index = CatalogIndex::open(temp_dir.path()).unwrap();
            index.rebuild(&products, &kits).await.unwrap();
        }
        let index = CatalogIndex::open(temp_dir.path()).unwrap();
        assert_eq!(index.search("cami", 10).unwrap()[0].key, "camiseta");
    }

    #[tokio::test]
    async fn test_malformed_and_empty_queries() {
        let temp_dir = TempDir::new().unwrap();
        let index = CatalogIndex::open(temp_dir.path()).unwrap();
        let (products, kits) = catalog();
        index.rebuild(&products, &kits).await.unwrap();

        assert!(index.search("", 10).unwrap().is_empty());
        assert!(index.search("   ", 10).unwrap().is_empty());
        // unbalanced syntax does not error
        assert!(index.search("camiseta AND (", 10).is_ok());
    }

    #[tokio::test]
    async fn test_remove_item() {
        let temp_dir = TempDir::new().unwrap();
        let index = CatalogIndex::open(temp_dir.path()).unwrap();
        let (products, kits) = catalog();
        index.rebuild(&products, &kits).await.unwrap();

        index.remove("kit:romantico").await.unwrap();
        assert!(index.search("romántico", 10).unwrap().is_empty());
    }
}
