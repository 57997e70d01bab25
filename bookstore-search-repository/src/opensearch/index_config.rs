//! OpenSearch index configuration and mappings.
//!
//! This module defines the index settings, the `html_strip` analyzer and the
//! mappings for the book search index.

use serde_json::{json, Value};

/// Configuration for the search index.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// The alias name for the search index (used for all document operations).
    pub alias: String,
    /// The version number for the index (e.g., 0 for "book_v0").
    pub version: u32,
}

impl IndexConfig {
    /// Create a new index configuration.
    ///
    /// # Arguments
    ///
    /// * `alias` - The index alias name
    /// * `version` - The version number
    pub fn new(alias: impl Into<String>, version: u32) -> Self {
        Self {
            alias: alias.into(),
            version,
        }
    }

    /// The concrete index the alias points at, e.g. `book_v0`.
    pub fn versioned_index_name(&self) -> String {
        format!("{}_v{}", self.alias, self.version)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(INDEX_NAME, 0)
    }
}

/// The base name of the search index (without version).
pub const INDEX_NAME: &str = "book";

/// Name of the custom analyzer applied to every text field.
pub const HTML_STRIP_ANALYZER: &str = "html_strip";

/// Get the versioned index name for the default alias.
///
/// # Arguments
///
/// * `version` - The version number (defaults to 0 if None)
///
/// # Returns
///
/// The versioned index name (e.g., "book_v0")
pub fn get_versioned_index_name(version: Option<u32>) -> String {
    IndexConfig::new(INDEX_NAME, version.unwrap_or(0)).versioned_index_name()
}

/// Analyzed text with an exact-match `raw` keyword sub-field.
fn text_field() -> Value {
    json!({
        "type": "text",
        "analyzer": HTML_STRIP_ANALYZER,
        "fields": {
            "raw": {
                "type": "keyword"
            }
        }
    })
}

/// Get the index settings and mappings for the book search index.
///
/// The configuration includes:
/// - **html_strip analyzer**: strips markup, then standard tokenization with
///   lowercase, stop word and snowball stemming filters
/// - **Text fields**: analyzed with `html_strip`, each with a `raw` keyword sub-field
/// - **tags.suggest**: completion sub-field for tag autocomplete
///
/// # Sharding Configuration
///
/// - 1 primary shard
/// - 1 replica for redundancy
///
/// # Arguments
///
/// * `version` - Optional version number (currently unused, reserved for future version-specific settings)
pub fn get_index_settings(_version: Option<u32>) -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1,
            "analysis": {
                "analyzer": {
                    HTML_STRIP_ANALYZER: {
                        "type": "custom",
                        "tokenizer": "standard",
                        "char_filter": ["html_strip"],
                        "filter": ["lowercase", "stop", "snowball"]
                    }
                }
            }
        },
        "mappings": {
            "properties": {
                "id": { "type": "integer" },
                "title": text_field(),
                "description": text_field(),
                "summary": text_field(),
                "publisher": text_field(),
                "publication_date": { "type": "date" },
                "state": text_field(),
                "isbn": text_field(),
                "price": { "type": "float" },
                "pages": { "type": "integer" },
                "stock_count": { "type": "integer" },
                "tags": {
                    "type": "text",
                    "analyzer": HTML_STRIP_ANALYZER,
                    "fields": {
                        "raw": { "type": "keyword" },
                        "suggest": { "type": "completion" }
                    }
                }
            }
        }
    })
}
