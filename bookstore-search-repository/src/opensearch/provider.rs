//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use bookstore_shared::BookDocument;
use opensearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{
        IndicesCreateParts, IndicesDeleteParts, IndicesExistsAliasParts, IndicesExistsParts,
        IndicesPutAliasParts,
    },
    DeleteParts, IndexParts, OpenSearch,
};
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_config::{get_index_settings, IndexConfig};
use crate::types::{BatchOperationResult, BatchOperationSummary};

/// OpenSearch provider implementation.
///
/// Provides full-text search capabilities using OpenSearch as the backend.
/// All document operations go through the configured alias.
///
/// # Example
///
/// ```ignore
/// use bookstore_search_repository::opensearch::{IndexConfig, OpenSearchProvider};
/// let config = IndexConfig::new("book", 0);
/// let provider = OpenSearchProvider::new("http://localhost:9200", config).await?;
///
/// provider.ensure_index_exists().await?;
/// provider.index_document(&BookDocument::from_record(&record)).await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_config` - The index configuration containing alias and version
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub async fn new(url: &str, index_config: IndexConfig) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            alias = %index_config.alias,
            version = index_config.version,
            "Created OpenSearch provider"
        );

        Ok(Self {
            client,
            index_config,
        })
    }

    pub fn index_config(&self) -> &IndexConfig {
        &self.index_config
    }

    /// Returns whether `index` exists. Any status other than 200/404 is an error.
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(SearchIndexError::index_setup(
                index,
                format!("unexpected status {} checking index", status),
            )),
        }
    }

    async fn alias_exists(&self, alias: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists_alias(IndicesExistsAliasParts::Name(&[alias]))
            .send()
            .await
            .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(SearchIndexError::index_setup(
                alias,
                format!("unexpected status {} checking alias", status),
            )),
        }
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    /// Create `{alias}_v{version}` with the book settings and point the alias at it.
    ///
    /// Existing indices and aliases are left untouched, so this is safe to call
    /// on every startup.
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        let index_name = self.index_config.versioned_index_name();
        let alias = &self.index_config.alias;

        if !self.index_exists(&index_name).await? {
            let response = self
                .client
                .indices()
                .create(IndicesCreateParts::Index(&index_name))
                .body(get_index_settings(Some(self.index_config.version)))
                .send()
                .await
                .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

            let status = response.status_code();
            if !status.is_success() {
                let error_body = response.text().await.unwrap_or_default();
                error!(status = %status, body = %error_body, "Index creation failed");
                return Err(SearchIndexError::index_setup(
                    &index_name,
                    format!("create returned {}: {}", status, error_body),
                ));
            }
            info!(index = %index_name, "Created search index");
        }

        if !self.alias_exists(alias).await? {
            let response = self
                .client
                .indices()
                .put_alias(IndicesPutAliasParts::IndexName(&[index_name.as_str()], alias))
                .send()
                .await
                .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

            let status = response.status_code();
            if !status.is_success() {
                let error_body = response.text().await.unwrap_or_default();
                error!(status = %status, body = %error_body, "Alias creation failed");
                return Err(SearchIndexError::index_setup(
                    &index_name,
                    format!("pointing alias {} returned {}: {}", alias, status, error_body),
                ));
            }
            info!(alias = %alias, index = %index_name, "Created search alias");
        }

        Ok(())
    }

    /// Drop `{alias}_v{version}`; the alias goes with it. A missing index
    /// counts as dropped.
    async fn delete_index(&self) -> Result<(), SearchIndexError> {
        let index_name = self.index_config.versioned_index_name();

        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index_name.as_str()]))
            .send()
            .await
            .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            debug!(index = %index_name, "Index already absent");
            return Ok(());
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index deletion failed");
            return Err(SearchIndexError::index_setup(
                &index_name,
                format!("delete returned {}: {}", status, error_body),
            ));
        }

        info!(index = %index_name, "Dropped search index");
        Ok(())
    }

    /// Write a book document under its UUID, replacing any previous version.
    async fn index_document(&self, document: &BookDocument) -> Result<(), SearchIndexError> {
        let doc_id = document.document_id();
        let body = serde_json::to_value(document)
            .map_err(|e| SearchIndexError::write(&doc_id, e.to_string()))?;

        let response = self
            .client
            .index(IndexParts::IndexId(&self.index_config.alias, &doc_id))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::write(&doc_id, e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index request failed");
            return Err(SearchIndexError::write(
                &doc_id,
                format!("status {}: {}", status, error_body),
            ));
        }

        debug!(doc_id = %doc_id, isbn = %document.isbn, "Document indexed");
        Ok(())
    }

    /// Delete a book document. A missing document counts as deleted.
    async fn delete_document(&self, book_uuid: Uuid) -> Result<(), SearchIndexError> {
        let doc_id = book_uuid.to_string();

        let response = self
            .client
            .delete(DeleteParts::IndexId(&self.index_config.alias, &doc_id))
            .send()
            .await
            .map_err(|e| SearchIndexError::delete(&doc_id, e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - document may not exist
        if status.as_u16() == 404 {
            debug!(doc_id = %doc_id, "Document already absent");
            return Ok(());
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Delete request failed");
            return Err(SearchIndexError::delete(
                &doc_id,
                format!("status {}: {}", status, error_body),
            ));
        }

        debug!(doc_id = %doc_id, "Document deleted");
        Ok(())
    }

    /// Index documents one at a time, collecting per-document results.
    async fn bulk_index_documents(
        &self,
        documents: &[BookDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let mut results = Vec::with_capacity(documents.len());

        for document in documents {
            let result = match SearchIndexProvider::index_document(self, document).await {
                Ok(()) => BatchOperationResult::succeeded(document.document_id()),
                Err(e) => BatchOperationResult::failed(document.document_id(), e),
            };
            results.push(result);
        }

        let summary = BatchOperationSummary::from_results(results);
        if summary.failed > 0 {
            warn!(
                total = summary.total,
                failed = summary.failed,
                "Bulk index finished with failures"
            );
        }
        Ok(summary)
    }

    /// Delete documents one at a time, collecting per-document results.
    async fn bulk_delete_documents(
        &self,
        book_uuids: &[Uuid],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let mut results = Vec::with_capacity(book_uuids.len());

        for uuid in book_uuids {
            let result = match SearchIndexProvider::delete_document(self, *uuid).await {
                Ok(()) => BatchOperationResult::succeeded(uuid.to_string()),
                Err(e) => BatchOperationResult::failed(uuid.to_string(), e),
            };
            results.push(result);
        }

        Ok(BatchOperationSummary::from_results(results))
    }
}
