//! Wire types shared between the transport client and the query layer.
//!
//! Field names follow the REST API exactly so the structs double as serde
//! targets for response bodies. Derived counters (`word_count`,
//! `character_count`, `file_size_mb`) are computed server-side at ingest
//! time and are never recomputed here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing state of an uploaded document.
///
/// Chunk content is guaranteed queryable only in the `Completed` state;
/// `Failed` may carry a non-empty `processing_error` on the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// An uploaded PDF document as reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub filename: String,
    pub content_type: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Size in megabytes, precomputed server-side.
    pub file_size_mb: f64,
    pub total_pages: i64,
    pub processing_status: ProcessingStatus,
    #[serde(default)]
    pub processing_error: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Whether extracted chunk content can be queried for this document.
    pub fn is_processed(&self) -> bool {
        self.processing_status == ProcessingStatus::Completed
    }
}

/// A chunk of extracted text belonging to one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: i64,
    /// Owning document id.
    pub pdf_id: i64,
    /// 1-based position within the document.
    pub chunk_number: i64,
    /// 1-based source page.
    pub page_number: i64,
    pub content: String,
    pub content_type: String,
    pub word_count: i64,
    pub character_count: i64,
    /// Structured extras such as page dimensions; shape is server-defined.
    #[serde(default)]
    pub chunk_metadata: Option<serde_json::Value>,
    pub preview: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Paginated envelope returned by every collection endpoint.
///
/// `page` is 1-based as requested by the caller; the layer never clamps it.
/// Invariants: `pages == ceil(total / size)` and `pages == 0` iff
/// `total == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
    pub pages: i64,
}

impl<T> Page<T> {
    /// Total page count for a collection: `ceil(total / size)`, zero for an
    /// empty collection.
    pub fn page_count(total: i64, size: i64) -> i64 {
        if total > 0 {
            (total + size - 1) / size
        } else {
            0
        }
    }

    /// Whether a further page exists after the current one.
    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }
}

/// Full document response from `GET /api/pdfs/{id}`: the document plus its
/// chunks inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub document: Document,
    pub chunks: Vec<Chunk>,
}

/// Chunk listing for one document, from `GET /api/pdfs/{id}/chunks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkPage {
    #[serde(flatten)]
    pub page: Page<Chunk>,
    pub pdf_id: i64,
}

/// Search results from `GET /api/pdfs/search/content`, echoing the query
/// that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(flatten)]
    pub page: Page<Chunk>,
    pub query: String,
    #[serde(default)]
    pub pdf_id: Option<i64>,
}

/// Bearer credential issued by `POST /token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Acknowledgement body from `DELETE /api/pdfs/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    pub message: String,
}
