//! Read-only query accessors built on the cache.
//!
//! [`SyncEngine`] bundles the transport and cache; each accessor is a small
//! per-consumer handle that owns its placeholder state. Every accessor
//! observes three states: pending (optionally with a placeholder from the
//! previous parameters), resolved with data, or resolved with an error.
//!
//! Placeholder reuse keeps the previous page's data observable while the
//! next page resolves, so paginating consumers do not flash empty. The
//! search accessor deliberately does *not* reuse a placeholder across
//! query-text changes — a new query must show its own loading state.
//!
//! Accessors with unmet preconditions (no document id, empty query) are
//! disabled: they return `Ok(None)` without touching the transport.

use std::sync::Arc;

use crate::cache::QueryCache;
use crate::error::SyncError;
use crate::keys;
use crate::models::{ChunkPage, Document, DocumentDetail, Page, SearchPage};
use crate::transport::Transport;

/// Default page size for document lists and chunk pages.
pub const LIST_PAGE_SIZE: i64 = 10;
/// Default page size for search results; denser than lists by design.
pub const SEARCH_PAGE_SIZE: i64 = 20;

/// Shared handle to the transport and the session's query cache.
///
/// Cheap to clone; every accessor and mutation site receives one instead
/// of reaching for ambient globals.
#[derive(Clone)]
pub struct SyncEngine {
    transport: Arc<dyn Transport>,
    cache: Arc<QueryCache>,
}

impl SyncEngine {
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<QueryCache>) -> Self {
        Self { transport, cache }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

/// Paginated document list accessor (`documents.list.{page,size}`).
pub struct DocumentListQuery {
    engine: SyncEngine,
    placeholder: Option<Arc<Page<Document>>>,
}

impl DocumentListQuery {
    pub fn new(engine: SyncEngine) -> Self {
        Self {
            engine,
            placeholder: None,
        }
    }

    /// Most recently resolved page, kept observable while the next page is
    /// pending. Discarded as soon as a fetch resolves or errors.
    pub fn placeholder(&self) -> Option<Arc<Page<Document>>> {
        self.placeholder.clone()
    }

    pub async fn fetch(&mut self, page: i64, size: i64) -> Result<Arc<Page<Document>>, SyncError> {
        let key = keys::document_list(page, size);
        let transport = Arc::clone(&self.engine.transport);
        let result = self
            .engine
            .cache
            .read(key, move || async move {
                transport.list_documents(page, size).await
            })
            .await;
        match &result {
            Ok(value) => self.placeholder = Some(Arc::clone(value)),
            Err(_) => self.placeholder = None,
        }
        result
    }
}

/// Single-document accessor (`documents.detail.{id}`).
///
/// Disabled while no id is selected: `fetch(None)` resolves to `Ok(None)`
/// without issuing a request.
pub struct DocumentDetailQuery {
    engine: SyncEngine,
}

impl DocumentDetailQuery {
    pub fn new(engine: SyncEngine) -> Self {
        Self { engine }
    }

    pub async fn fetch(&self, id: Option<i64>) -> Result<Option<Arc<DocumentDetail>>, SyncError> {
        let Some(id) = id else {
            return Ok(None);
        };
        let transport = Arc::clone(&self.engine.transport);
        let value = self
            .engine
            .cache
            .read(keys::document_detail(id), move || async move {
                transport.get_document(id).await
            })
            .await?;
        Ok(Some(value))
    }
}

/// Chunk-page accessor (`documents.detail.{id}.chunks.{page,size}`).
///
/// Disabled while no document is selected; reuses the previous chunk page
/// as placeholder across page changes.
pub struct ChunkListQuery {
    engine: SyncEngine,
    placeholder: Option<Arc<ChunkPage>>,
}

impl ChunkListQuery {
    pub fn new(engine: SyncEngine) -> Self {
        Self {
            engine,
            placeholder: None,
        }
    }

    pub fn placeholder(&self) -> Option<Arc<ChunkPage>> {
        self.placeholder.clone()
    }

    pub async fn fetch(
        &mut self,
        pdf_id: Option<i64>,
        page: i64,
        size: i64,
    ) -> Result<Option<Arc<ChunkPage>>, SyncError> {
        let Some(pdf_id) = pdf_id else {
            return Ok(None);
        };
        let key = keys::chunk_list(pdf_id, page, size);
        let transport = Arc::clone(&self.engine.transport);
        let result = self
            .engine
            .cache
            .read(key, move || async move {
                transport.list_chunks(pdf_id, page, size).await
            })
            .await;
        match result {
            Ok(value) => {
                self.placeholder = Some(Arc::clone(&value));
                Ok(Some(value))
            }
            Err(err) => {
                self.placeholder = None;
                Err(err)
            }
        }
    }
}

/// Full-text search accessor (`search.{query,pdf_id}.{page,size}`).
///
/// Disabled for an empty query. The placeholder survives page changes for
/// the same query text but is dropped the moment the text changes, so a
/// fresh query never shows the previous query's results.
pub struct SearchQuery {
    engine: SyncEngine,
    placeholder: Option<Arc<SearchPage>>,
    last_query: Option<String>,
}

impl SearchQuery {
    pub fn new(engine: SyncEngine) -> Self {
        Self {
            engine,
            placeholder: None,
            last_query: None,
        }
    }

    pub fn placeholder(&self) -> Option<Arc<SearchPage>> {
        self.placeholder.clone()
    }

    pub async fn fetch(
        &mut self,
        query: &str,
        pdf_id: Option<i64>,
        page: i64,
        size: i64,
    ) -> Result<Option<Arc<SearchPage>>, SyncError> {
        if query.is_empty() {
            return Ok(None);
        }
        if self.last_query.as_deref() != Some(query) {
            self.placeholder = None;
            self.last_query = Some(query.to_string());
        }
        let key = keys::search(query, pdf_id, page, size);
        let transport = Arc::clone(&self.engine.transport);
        let owned_query = query.to_string();
        let result = self
            .engine
            .cache
            .read(key, move || async move {
                transport.search(&owned_query, pdf_id, page, size).await
            })
            .await;
        match result {
            Ok(value) => {
                self.placeholder = Some(Arc::clone(&value));
                Ok(Some(value))
            }
            Err(err) => {
                self.placeholder = None;
                Err(err)
            }
        }
    }
}
