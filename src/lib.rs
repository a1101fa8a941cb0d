//! # pdfsync
//!
//! Client-side data synchronization layer for a PDF document library.
//!
//! pdfsync keeps an in-memory query cache consistent with a remote REST
//! API: it fetches paginated document and chunk collections, runs
//! full-text search queries, performs upload/delete mutations with the
//! cache-consistency steps they require, and highlights matched substrings
//! in search results. Rendering and session management stay outside; this
//! crate only attaches a stored bearer credential to outgoing calls.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   read(key)   ┌─────────────┐   HTTP   ┌──────────┐
//! │ Accessors   │──────────────▶│ Query Cache │─────────▶│ Transport │
//! │ list/detail │               │ single-     │          │ (reqwest) │
//! │ chunks/find │◀──────────────│ flight      │◀─────────│           │
//! └────────────┘   Arc<T>      └──────▲──────┘          └────▲─────┘
//! ┌────────────┐  invalidate / remove │                       │
//! │ Mutations   │──────────────────────┘        direct call    │
//! │ upload/del  │──────────────────────────────────────────────┘
//! └────────────┘
//! ```
//!
//! Accessors request data by key from the cache; on a miss or stale entry
//! the cache calls the transport once (single-flight per key) and stores
//! the result. Mutations call the transport directly, then invalidate or
//! remove the affected keys. The highlighter post-processes search output
//! and never touches cache state.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Wire types and paginated envelopes |
//! | [`error`] | [`error::SyncError`] taxonomy |
//! | [`auth`] | Bearer-token persistence |
//! | [`transport`] | HTTP client behind the [`transport::Transport`] trait |
//! | [`keys`] | Structured, prefix-hierarchical cache keys |
//! | [`cache`] | Key-addressed single-flight query cache |
//! | [`queries`] | List/detail/chunk/search accessors |
//! | [`mutations`] | Upload and delete with cache consistency |
//! | [`highlight`] | Search-result substring highlighting |
//! | [`config`] | TOML configuration |

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod highlight;
pub mod keys;
pub mod models;
pub mod mutations;
pub mod queries;
pub mod transport;
