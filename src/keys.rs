//! Structured cache keys for the query layer.
//!
//! A [`QueryKey`] is an ordered sequence of segments identifying exactly
//! which request produced a cached value. Keys form a prefix hierarchy:
//!
//! ```text
//! ["documents"]
//! ["documents", "list", {page, size}]
//! ["documents", "detail", id]
//! ["documents", "detail", id, "chunks", {page, size}]
//! ["search", {query, pdf_id}, {page, size}]
//! ```
//!
//! Two requests share a cache entry iff their keys are deeply equal, and
//! invalidating a prefix reaches every key nested under it. The
//! constructors below are the only way key shapes are built, so keys are
//! order-insensitive by construction.

use std::fmt;

/// One segment of a [`QueryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Fixed namespace label (`"documents"`, `"list"`, ...).
    Tag(&'static str),
    /// Entity identifier.
    Id(i64),
    /// Pagination window.
    Window { page: i64, size: i64 },
    /// Search parameters. The optional document filter is part of the key:
    /// a scoped search and a global search are distinct entries.
    Query {
        text: String,
        pdf_id: Option<i64>,
    },
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Tag(tag) => write!(f, "{}", tag),
            Segment::Id(id) => write!(f, "{}", id),
            Segment::Window { page, size } => write!(f, "p{}s{}", page, size),
            Segment::Query { text, pdf_id } => match pdf_id {
                Some(id) => write!(f, "q({})#{}", text, id),
                None => write!(f, "q({})", text),
            },
        }
    }
}

/// Composite cache key. Deep equality decides entry identity; prefix
/// matching drives invalidation and removal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<Segment>);

impl QueryKey {
    /// True when `self` is nested at or under `prefix`.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Root of all document data.
pub fn documents() -> QueryKey {
    QueryKey(vec![Segment::Tag("documents")])
}

/// All list pages, regardless of pagination window.
pub fn document_lists() -> QueryKey {
    QueryKey(vec![Segment::Tag("documents"), Segment::Tag("list")])
}

/// One list page.
pub fn document_list(page: i64, size: i64) -> QueryKey {
    QueryKey(vec![
        Segment::Tag("documents"),
        Segment::Tag("list"),
        Segment::Window { page, size },
    ])
}

/// One document's detail entry. Also the prefix under which that
/// document's chunk pages live, so removing it evicts the whole subtree.
pub fn document_detail(id: i64) -> QueryKey {
    QueryKey(vec![
        Segment::Tag("documents"),
        Segment::Tag("detail"),
        Segment::Id(id),
    ])
}

/// All chunk pages for one document.
pub fn document_chunks(id: i64) -> QueryKey {
    QueryKey(vec![
        Segment::Tag("documents"),
        Segment::Tag("detail"),
        Segment::Id(id),
        Segment::Tag("chunks"),
    ])
}

/// One chunk page for one document.
pub fn chunk_list(id: i64, page: i64, size: i64) -> QueryKey {
    QueryKey(vec![
        Segment::Tag("documents"),
        Segment::Tag("detail"),
        Segment::Id(id),
        Segment::Tag("chunks"),
        Segment::Window { page, size },
    ])
}

/// One search result page.
pub fn search(query: &str, pdf_id: Option<i64>, page: i64, size: i64) -> QueryKey {
    QueryKey(vec![
        Segment::Tag("search"),
        Segment::Query {
            text: query.to_string(),
            pdf_id,
        },
        Segment::Window { page, size },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_params_equal_keys() {
        assert_eq!(document_list(1, 10), document_list(1, 10));
        assert_eq!(
            search("rust", Some(3), 2, 20),
            search("rust", Some(3), 2, 20)
        );
    }

    #[test]
    fn test_different_params_different_keys() {
        assert_ne!(document_list(1, 10), document_list(2, 10));
        assert_ne!(document_list(1, 10), document_list(1, 20));
        assert_ne!(search("rust", None, 1, 20), search("rust", Some(3), 1, 20));
        assert_ne!(search("rust", None, 1, 20), search("Rust", None, 1, 20));
    }

    #[test]
    fn test_prefix_hierarchy() {
        assert!(document_list(4, 10).starts_with(&document_lists()));
        assert!(document_lists().starts_with(&documents()));
        assert!(document_detail(7).starts_with(&documents()));
        assert!(document_chunks(7).starts_with(&document_detail(7)));
        assert!(chunk_list(7, 2, 10).starts_with(&document_chunks(7)));
        assert!(chunk_list(7, 2, 10).starts_with(&document_detail(7)));
    }

    #[test]
    fn test_prefix_does_not_cross_namespaces() {
        assert!(!document_detail(7).starts_with(&document_lists()));
        assert!(!chunk_list(8, 1, 10).starts_with(&document_detail(7)));
        assert!(!search("x", None, 1, 20).starts_with(&documents()));
    }

    #[test]
    fn test_key_is_its_own_prefix() {
        let key = chunk_list(7, 1, 10);
        assert!(key.starts_with(&key));
    }

    #[test]
    fn test_display_stable() {
        assert_eq!(document_list(2, 10).to_string(), "documents.list.p2s10");
        assert_eq!(
            search("test", Some(7), 1, 20).to_string(),
            "search.q(test)#7.p1s20"
        );
    }
}
