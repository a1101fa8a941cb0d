//! Outbound HTTP transport.
//!
//! [`Transport`] defines one operation per remote capability; [`HttpClient`]
//! implements it against the REST API with reqwest. The trait is the seam
//! the query layer depends on, which keeps the cache and accessors testable
//! without a network.
//!
//! The transport owns no cache state. Pagination is translated here from
//! 1-based pages to the wire's `skip`/`limit` offsets
//! (`skip = (page - 1) * size`), and a bearer header is attached whenever
//! the injected [`TokenStore`] holds a credential.
//!
//! # Error contract
//!
//! Non-2xx responses are parsed as JSON and the `detail` string field
//! becomes the error message; an unparsable or absent body falls back to
//! `"HTTP error {status}"`. Requests that never produce a response fail
//! with [`SyncError::Network`]. The client never retries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;

use crate::auth::TokenStore;
use crate::error::SyncError;
use crate::models::{
    ChunkPage, DeleteAck, Document, DocumentDetail, Page, SearchPage, TokenResponse,
};

/// One method per remote capability.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `GET /api/pdfs/?skip&limit`
    async fn list_documents(&self, page: i64, size: i64) -> Result<Page<Document>, SyncError>;

    /// `GET /api/pdfs/{id}`
    async fn get_document(&self, id: i64) -> Result<DocumentDetail, SyncError>;

    /// `GET /api/pdfs/{id}/chunks?skip&limit`
    async fn list_chunks(
        &self,
        pdf_id: i64,
        page: i64,
        size: i64,
    ) -> Result<ChunkPage, SyncError>;

    /// `GET /api/pdfs/search/content?q&skip&limit[&pdf_id]`
    async fn search(
        &self,
        query: &str,
        pdf_id: Option<i64>,
        page: i64,
        size: i64,
    ) -> Result<SearchPage, SyncError>;

    /// `POST /api/pdfs/upload` (multipart: file, title?)
    async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        title: Option<&str>,
    ) -> Result<Document, SyncError>;

    /// `DELETE /api/pdfs/{id}`
    async fn delete(&self, id: i64) -> Result<DeleteAck, SyncError>;

    /// `POST /token` (form body). The only call that never carries a bearer
    /// header.
    async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, SyncError>;
}

/// HTTP implementation of [`Transport`].
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl HttpClient {
    /// Build a client for the given API base URL.
    ///
    /// Timeout semantics live entirely here; the cache and accessors rely
    /// on the transport's timeout rather than defining their own.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer credential when one is stored.
    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.tokens.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, SyncError> {
        debug!("GET {} {:?}", path, params);
        let req = self.authorize(self.http.get(self.url(path)).query(params));
        let resp = req.send().await?;
        Self::decode(resp).await
    }

    /// Turn a response into `T` or the structured error contract.
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, SyncError> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| {
                    body.get("detail")
                        .and_then(|d| d.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()));
            return Err(SyncError::Remote {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.json::<T>().await?)
    }

    fn offset(page: i64, size: i64) -> i64 {
        (page - 1) * size
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn list_documents(&self, page: i64, size: i64) -> Result<Page<Document>, SyncError> {
        let skip = Self::offset(page, size);
        self.get_json(
            "/api/pdfs/",
            &[("skip", skip.to_string()), ("limit", size.to_string())],
        )
        .await
    }

    async fn get_document(&self, id: i64) -> Result<DocumentDetail, SyncError> {
        self.get_json(&format!("/api/pdfs/{}", id), &[]).await
    }

    async fn list_chunks(
        &self,
        pdf_id: i64,
        page: i64,
        size: i64,
    ) -> Result<ChunkPage, SyncError> {
        let skip = Self::offset(page, size);
        self.get_json(
            &format!("/api/pdfs/{}/chunks", pdf_id),
            &[("skip", skip.to_string()), ("limit", size.to_string())],
        )
        .await
    }

    async fn search(
        &self,
        query: &str,
        pdf_id: Option<i64>,
        page: i64,
        size: i64,
    ) -> Result<SearchPage, SyncError> {
        let skip = Self::offset(page, size);
        let mut params = vec![
            ("q", query.to_string()),
            ("skip", skip.to_string()),
            ("limit", size.to_string()),
        ];
        if let Some(id) = pdf_id {
            params.push(("pdf_id", id.to_string()));
        }
        self.get_json("/api/pdfs/search/content", &params).await
    }

    async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        title: Option<&str>,
    ) -> Result<Document, SyncError> {
        debug!("POST /api/pdfs/upload ({} bytes)", bytes.len());
        let file_part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")?;
        let mut form = reqwest::multipart::Form::new().part("file", file_part);
        if let Some(title) = title {
            form = form.text("title", title.to_string());
        }
        let req = self.authorize(self.http.post(self.url("/api/pdfs/upload")).multipart(form));
        let resp = req.send().await?;
        Self::decode(resp).await
    }

    async fn delete(&self, id: i64) -> Result<DeleteAck, SyncError> {
        debug!("DELETE /api/pdfs/{}", id);
        let req = self.authorize(self.http.delete(self.url(&format!("/api/pdfs/{}", id))));
        let resp = req.send().await?;
        Self::decode(resp).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, SyncError> {
        debug!("POST /token");
        let resp = self
            .http
            .post(self.url("/token"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;
        Self::decode(resp).await
    }
}

// ============ Test doubles ============

#[cfg(test)]
pub(crate) mod stub {
    //! In-process [`Transport`] double used by the cache, accessor, and
    //! mutation tests. Counts calls per operation and can be switched into
    //! a failing mode that returns a canned remote error.

    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::Chunk;

    pub(crate) fn sample_document(id: i64) -> Document {
        Document {
            id,
            title: format!("Document {}", id),
            filename: format!("doc-{}.pdf", id),
            content_type: "application/pdf".to_string(),
            file_size: 1048576,
            file_size_mb: 1.0,
            total_pages: 12,
            processing_status: crate::models::ProcessingStatus::Completed,
            processing_error: None,
            author: None,
            subject: None,
            keywords: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        }
    }

    pub(crate) fn sample_chunk(id: i64, pdf_id: i64, content: &str) -> Chunk {
        Chunk {
            id,
            pdf_id,
            chunk_number: 1,
            page_number: 1,
            content: content.to_string(),
            content_type: "text".to_string(),
            word_count: content.split_whitespace().count() as i64,
            character_count: content.chars().count() as i64,
            chunk_metadata: None,
            preview: content.chars().take(40).collect(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[derive(Default)]
    pub(crate) struct StubTransport {
        pub list_calls: AtomicUsize,
        pub detail_calls: AtomicUsize,
        pub chunk_calls: AtomicUsize,
        pub search_calls: AtomicUsize,
        pub upload_calls: AtomicUsize,
        pub delete_calls: AtomicUsize,
        /// When set, every operation fails with a remote error.
        pub fail: AtomicBool,
        /// Total number of documents the fake server "holds".
        pub total: AtomicUsize,
    }

    impl StubTransport {
        pub(crate) fn new() -> Self {
            Self {
                total: AtomicUsize::new(25),
                ..Self::default()
            }
        }

        pub(crate) fn set_failing(&self, failing: bool) {
            self.fail.store(failing, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), SyncError> {
            if self.fail.load(Ordering::SeqCst) {
                Err(SyncError::Remote {
                    status: 500,
                    message: "Internal server error".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn list_documents(
            &self,
            page: i64,
            size: i64,
        ) -> Result<Page<Document>, SyncError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            let total = self.total.load(Ordering::SeqCst) as i64;
            Ok(Page {
                items: vec![sample_document(page)],
                total,
                page,
                size,
                pages: Page::<Document>::page_count(total, size),
            })
        }

        async fn get_document(&self, id: i64) -> Result<DocumentDetail, SyncError> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(DocumentDetail {
                document: sample_document(id),
                chunks: vec![sample_chunk(1, id, "This is a test sentence.")],
            })
        }

        async fn list_chunks(
            &self,
            pdf_id: i64,
            page: i64,
            size: i64,
        ) -> Result<ChunkPage, SyncError> {
            self.chunk_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(ChunkPage {
                page: Page {
                    items: vec![sample_chunk(page, pdf_id, "chunk body")],
                    total: 3,
                    page,
                    size,
                    pages: Page::<Chunk>::page_count(3, size),
                },
                pdf_id,
            })
        }

        async fn search(
            &self,
            query: &str,
            pdf_id: Option<i64>,
            page: i64,
            size: i64,
        ) -> Result<SearchPage, SyncError> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(SearchPage {
                page: Page {
                    items: vec![sample_chunk(1, 1, "This is a test sentence.")],
                    total: 1,
                    page,
                    size,
                    pages: 1,
                },
                query: query.to_string(),
                pdf_id,
            })
        }

        async fn upload(
            &self,
            file_name: &str,
            _bytes: Vec<u8>,
            title: Option<&str>,
        ) -> Result<Document, SyncError> {
            self.upload_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            let mut doc = sample_document(99);
            doc.filename = file_name.to_string();
            if let Some(title) = title {
                doc.title = title.to_string();
            }
            self.total.fetch_add(1, Ordering::SeqCst);
            Ok(doc)
        }

        async fn delete(&self, _id: i64) -> Result<DeleteAck, SyncError> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(DeleteAck {
                message: "PDF deleted successfully".to_string(),
            })
        }

        async fn login(
            &self,
            _username: &str,
            _password: &str,
        ) -> Result<TokenResponse, SyncError> {
            self.check()?;
            Ok(TokenResponse {
                access_token: "stub-token".to_string(),
                token_type: "bearer".to_string(),
            })
        }
    }
}
