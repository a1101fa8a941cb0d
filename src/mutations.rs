//! Upload and delete mutations with cache-consistency steps.
//!
//! Each mutation is an explicit state machine
//! (`idle → pending → succeeded | failed`) instead of an implicit pending
//! flag, and returns its outcome as a `Result` the caller branches on —
//! there are no out-of-band success/error callbacks.
//!
//! Cache consistency is all-or-nothing: the invalidate/remove step runs
//! only after the server confirms the mutation. A failed mutation leaves
//! the cache exactly as it was, since the remote state did not change.

use std::sync::Arc;

use log::debug;

use crate::error::SyncError;
use crate::keys;
use crate::models::{DeleteAck, Document};
use crate::queries::SyncEngine;
use crate::transport::Transport;

/// Lifecycle of a mutation, exposed to the presentation layer (for
/// disabling submit buttons and the like).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Severity of a user-facing [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// User-facing message describing a mutation outcome. Surfacing it is the
/// caller's responsibility; this layer only formats it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn for_upload(outcome: &Result<Document, SyncError>) -> Notice {
        match outcome {
            Ok(_) => Notice {
                kind: NoticeKind::Success,
                message: "PDF uploaded and processed successfully!".to_string(),
            },
            Err(err) => Notice {
                kind: NoticeKind::Error,
                message: format!("Upload failed: {}", err),
            },
        }
    }

    pub fn for_delete(outcome: &Result<DeleteAck, SyncError>) -> Notice {
        match outcome {
            Ok(_) => Notice {
                kind: NoticeKind::Success,
                message: "PDF deleted successfully!".to_string(),
            },
            Err(err) => Notice {
                kind: NoticeKind::Error,
                message: format!("Delete failed: {}", err),
            },
        }
    }
}

/// Uploads a document, then invalidates the list pages so the new entry
/// appears on the next list read. No optimistic insert: the document is
/// not shown anywhere until the server confirms it.
pub struct UploadMutation {
    engine: SyncEngine,
    state: MutationState,
}

impl UploadMutation {
    pub fn new(engine: SyncEngine) -> Self {
        Self {
            engine,
            state: MutationState::Idle,
        }
    }

    pub fn state(&self) -> MutationState {
        self.state
    }

    pub async fn run(
        &mut self,
        file_name: &str,
        bytes: Vec<u8>,
        title: Option<&str>,
    ) -> Result<Document, SyncError> {
        self.state = MutationState::Pending;
        let transport = Arc::clone(self.engine.transport());
        match transport.upload(file_name, bytes, title).await {
            Ok(document) => {
                debug!("upload confirmed, invalidating list pages");
                self.engine.cache().invalidate(&keys::document_lists());
                self.state = MutationState::Succeeded;
                Ok(document)
            }
            Err(err) => {
                self.state = MutationState::Failed;
                Err(err)
            }
        }
    }
}

/// Deletes a document, then evicts its detail entry and chunk subtree
/// outright (the entity no longer exists, so stale data would be wrong)
/// and invalidates the list pages.
pub struct DeleteMutation {
    engine: SyncEngine,
    state: MutationState,
}

impl DeleteMutation {
    pub fn new(engine: SyncEngine) -> Self {
        Self {
            engine,
            state: MutationState::Idle,
        }
    }

    pub fn state(&self) -> MutationState {
        self.state
    }

    pub async fn run(&mut self, id: i64) -> Result<DeleteAck, SyncError> {
        self.state = MutationState::Pending;
        let transport = Arc::clone(self.engine.transport());
        match transport.delete(id).await {
            Ok(ack) => {
                debug!("delete {} confirmed, evicting detail subtree", id);
                // document_detail(id) is the prefix of the chunk subtree,
                // so one removal covers both.
                self.engine.cache().remove(&keys::document_detail(id));
                self.engine.cache().invalidate(&keys::document_lists());
                self.state = MutationState::Succeeded;
                Ok(ack)
            }
            Err(err) => {
                self.state = MutationState::Failed;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::cache::QueryCache;
    use crate::queries::{ChunkListQuery, DocumentDetailQuery, DocumentListQuery};
    use crate::transport::stub::StubTransport;

    fn engine() -> (Arc<StubTransport>, SyncEngine) {
        let stub = Arc::new(StubTransport::new());
        let cache = Arc::new(QueryCache::new());
        let engine = SyncEngine::new(stub.clone(), cache);
        (stub, engine)
    }

    #[tokio::test]
    async fn test_upload_invalidates_list_pages() {
        let (stub, engine) = engine();
        let mut list = DocumentListQuery::new(engine.clone());

        list.fetch(1, 10).await.unwrap();
        assert_eq!(stub.list_calls.load(Ordering::SeqCst), 1);

        let mut upload = UploadMutation::new(engine);
        let doc = upload
            .run("report.pdf", b"%PDF-1.7".to_vec(), Some("Report"))
            .await
            .unwrap();
        assert_eq!(doc.title, "Report");
        assert_eq!(upload.state(), MutationState::Succeeded);

        // List page is stale: the next read refetches.
        list.fetch(1, 10).await.unwrap();
        assert_eq!(stub.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_upload_leaves_cache_untouched() {
        let (stub, engine) = engine();
        let mut list = DocumentListQuery::new(engine.clone());

        let before = list.fetch(1, 10).await.unwrap();
        stub.set_failing(true);

        let mut upload = UploadMutation::new(engine.clone());
        let err = upload.run("x.pdf", vec![], None).await.unwrap_err();
        assert!(err.is_remote());
        assert_eq!(upload.state(), MutationState::Failed);

        // Entry still fresh and identical; no refetch happens.
        stub.set_failing(false);
        let after = list.fetch(1, 10).await.unwrap();
        assert_eq!(stub.list_calls.load(Ordering::SeqCst), 1);
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_delete_evicts_detail_and_chunks_and_stales_lists() {
        let (stub, engine) = engine();
        let detail = DocumentDetailQuery::new(engine.clone());
        let mut chunks = ChunkListQuery::new(engine.clone());
        let mut list = DocumentListQuery::new(engine.clone());

        detail.fetch(Some(7)).await.unwrap();
        chunks.fetch(Some(7), 1, 10).await.unwrap();
        list.fetch(1, 10).await.unwrap();

        let mut delete = DeleteMutation::new(engine.clone());
        delete.run(7).await.unwrap();
        assert_eq!(delete.state(), MutationState::Succeeded);

        let cache = engine.cache();
        assert!(!cache.contains(&keys::document_detail(7)));
        assert!(!cache.contains(&keys::chunk_list(7, 1, 10)));
        assert_eq!(cache.is_fresh(&keys::document_list(1, 10)), Some(false));

        // Subsequent reads issue fresh network calls.
        detail.fetch(Some(7)).await.unwrap();
        assert_eq!(stub.detail_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_delete_performs_no_cache_change() {
        let (stub, engine) = engine();
        let detail = DocumentDetailQuery::new(engine.clone());
        let mut list = DocumentListQuery::new(engine.clone());

        detail.fetch(Some(7)).await.unwrap();
        list.fetch(1, 10).await.unwrap();
        stub.set_failing(true);

        let mut delete = DeleteMutation::new(engine.clone());
        assert!(delete.run(7).await.is_err());
        assert_eq!(delete.state(), MutationState::Failed);

        // The item must remain visible: detail entry intact and fresh.
        let cache = engine.cache();
        assert!(cache.contains(&keys::document_detail(7)));
        assert_eq!(cache.is_fresh(&keys::document_detail(7)), Some(true));
        assert_eq!(cache.is_fresh(&keys::document_list(1, 10)), Some(true));
    }

    #[tokio::test]
    async fn test_mutation_state_machine() {
        let (_stub, engine) = engine();
        let upload = UploadMutation::new(engine.clone());
        assert_eq!(upload.state(), MutationState::Idle);

        let mut delete = DeleteMutation::new(engine);
        assert_eq!(delete.state(), MutationState::Idle);
        delete.run(1).await.unwrap();
        assert_eq!(delete.state(), MutationState::Succeeded);
    }

    #[test]
    fn test_notice_messages() {
        let ok: Result<DeleteAck, SyncError> = Ok(DeleteAck {
            message: "gone".to_string(),
        });
        assert_eq!(
            Notice::for_delete(&ok).message,
            "PDF deleted successfully!"
        );

        let err: Result<Document, SyncError> = Err(SyncError::Remote {
            status: 413,
            message: "File too large".to_string(),
        });
        let notice = Notice::for_upload(&err);
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "Upload failed: File too large");
    }
}
