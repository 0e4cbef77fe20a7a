//! Search over stored document text, with personal and global scopes.

pub mod fragment;

pub use fragment::{relevance_fragment, summary};

use rusqlite::Connection;
use thiserror::Error;

use crate::db::repository::{count_search_matches, search_documents, OrderBy, SearchHit};
use crate::db::DatabaseError;
use crate::models::{Document, User};

/// Whether a query covers only the requester's documents or all owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    #[default]
    Personal,
    Global,
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("A search term is required")]
    MissingQuery,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// One result ready for presentation.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub document: Document,
    pub owner_username: String,
    /// Context window around the first occurrence of the term.
    pub fragment: String,
}

/// One page of results plus the total match count.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    pub total: u64,
}

/// Run a paginated substring search for `requester`.
///
/// Whitespace-only terms are rejected before any query executes. Matching is
/// case-insensitive; only active (not soft-deleted) documents are searched.
pub fn search(
    conn: &Connection,
    requester: &User,
    term: &str,
    scope: SearchScope,
    order: &OrderBy,
    limit: u32,
    offset: u32,
) -> Result<SearchPage, SearchError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(SearchError::MissingQuery);
    }

    let owner = match scope {
        SearchScope::Personal => Some(&requester.id),
        SearchScope::Global => None,
    };

    tracing::info!(
        user = %requester.username,
        term,
        scope = ?scope,
        "Running document search"
    );

    let total = count_search_matches(conn, owner, term)?;
    let hits = search_documents(conn, owner, term, order, limit, offset)?;

    let results = hits
        .into_iter()
        .map(|SearchHit { document, owner_username }| {
            let fragment = relevance_fragment(&document.extracted_text, term);
            SearchResult {
                document,
                owner_username,
                fragment,
            }
        })
        .collect();

    Ok(SearchPage { results, total })
}
