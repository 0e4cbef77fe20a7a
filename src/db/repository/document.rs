use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::ToSql;
use rusqlite::{params, params_from_iter, Connection};
use uuid::Uuid;

use super::{escape_like, OrderBy};
use crate::db::DatabaseError;
use crate::models::{Document, ExtractionMethod};

const DOCUMENT_COLUMNS: &str = "id, owner_id, filename, size_bytes, extracted_text, method, \
     processing_seconds, created_at, updated_at, deleted, deleted_at";

/// Optional filters for owner-scoped listings.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub method: Option<ExtractionMethod>,
    /// Case-insensitive substring match on the original filename.
    pub filename_contains: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

/// One search match joined with its owner's username.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub document: Document,
    pub owner_username: String,
}

pub fn insert_document(conn: &Connection, doc: &Document) -> Result<(), DatabaseError> {
    conn.execute(
        &format!("INSERT INTO documents ({DOCUMENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"),
        params![
            doc.id.to_string(),
            doc.owner_id.to_string(),
            doc.filename,
            doc.size_bytes,
            doc.extracted_text,
            doc.method.as_str(),
            doc.processing_seconds,
            doc.created_at,
            doc.updated_at,
            doc.deleted,
            doc.deleted_at,
        ],
    )?;
    Ok(())
}

/// Fetch a document regardless of owner or deletion state (administrative).
pub fn get_document(conn: &Connection, id: &Uuid) -> Result<Option<Document>, DatabaseError> {
    query_one(
        conn,
        &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1"),
        &[&id.to_string()],
    )
}

/// Fetch an active (not soft-deleted) document across all owners.
pub fn get_active_document(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Document>, DatabaseError> {
    query_one(
        conn,
        &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1 AND deleted = 0"),
        &[&id.to_string()],
    )
}

/// Fetch an active document belonging to `owner_id`.
///
/// Documents of other owners are indistinguishable from missing ones here,
/// so callers surface both as not-found.
pub fn get_active_document_for_owner(
    conn: &Connection,
    id: &Uuid,
    owner_id: &Uuid,
) -> Result<Option<Document>, DatabaseError> {
    query_one(
        conn,
        &format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents \
             WHERE id = ?1 AND owner_id = ?2 AND deleted = 0"
        ),
        &[&id.to_string(), &owner_id.to_string()],
    )
}

/// List active documents of one owner, filtered, ordered and paginated.
pub fn list_documents(
    conn: &Connection,
    owner_id: &Uuid,
    filter: &DocumentFilter,
    order: &OrderBy,
    limit: u32,
    offset: u32,
) -> Result<Vec<Document>, DatabaseError> {
    let (clauses, mut sql_params) = filter_predicates(filter);
    let mut sql = format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE owner_id = ? AND deleted = 0"
    );
    for clause in &clauses {
        sql.push_str(" AND ");
        sql.push_str(clause);
    }
    sql.push_str(&format!(" ORDER BY {} LIMIT ? OFFSET ?", order.sql("")));

    let mut all_params: Vec<Box<dyn ToSql>> = vec![Box::new(owner_id.to_string())];
    all_params.append(&mut sql_params);
    all_params.push(Box::new(limit));
    all_params.push(Box::new(offset));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(all_params.iter()), row_to_document_row)?;

    let mut docs = Vec::new();
    for row in rows {
        docs.push(document_from_row(row?)?);
    }
    Ok(docs)
}

/// Count the active documents a `list_documents` call would page over.
pub fn count_documents(
    conn: &Connection,
    owner_id: &Uuid,
    filter: &DocumentFilter,
) -> Result<u64, DatabaseError> {
    let (clauses, mut sql_params) = filter_predicates(filter);
    let mut sql = "SELECT COUNT(*) FROM documents WHERE owner_id = ? AND deleted = 0".to_string();
    for clause in &clauses {
        sql.push_str(" AND ");
        sql.push_str(clause);
    }

    let mut all_params: Vec<Box<dyn ToSql>> = vec![Box::new(owner_id.to_string())];
    all_params.append(&mut sql_params);

    let count: i64 = conn.query_row(&sql, params_from_iter(all_params.iter()), |row| row.get(0))?;
    Ok(count as u64)
}

/// Case-insensitive substring search over extracted text.
///
/// `owner` restricts the search to one account (personal scope); `None`
/// searches all active documents (global scope).
pub fn search_documents(
    conn: &Connection,
    owner: Option<&Uuid>,
    term: &str,
    order: &OrderBy,
    limit: u32,
    offset: u32,
) -> Result<Vec<SearchHit>, DatabaseError> {
    let pattern = format!("%{}%", escape_like(term));
    let mut sql = format!(
        "SELECT d.id, d.owner_id, d.filename, d.size_bytes, d.extracted_text, d.method, \
         d.processing_seconds, d.created_at, d.updated_at, d.deleted, d.deleted_at, u.username \
         FROM documents d JOIN users u ON u.id = d.owner_id \
         WHERE d.deleted = 0 AND d.extracted_text LIKE ? ESCAPE '\\'"
    );
    let mut sql_params: Vec<Box<dyn ToSql>> = vec![Box::new(pattern)];
    if let Some(owner_id) = owner {
        sql.push_str(" AND d.owner_id = ?");
        sql_params.push(Box::new(owner_id.to_string()));
    }
    sql.push_str(&format!(" ORDER BY {} LIMIT ? OFFSET ?", order.sql("d")));
    sql_params.push(Box::new(limit));
    sql_params.push(Box::new(offset));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(sql_params.iter()), |row| {
        Ok((row_to_document_row(row)?, row.get::<_, String>(11)?))
    })?;

    let mut hits = Vec::new();
    for row in rows {
        let (doc_row, owner_username) = row?;
        hits.push(SearchHit {
            document: document_from_row(doc_row)?,
            owner_username,
        });
    }
    Ok(hits)
}

/// Count the matches a `search_documents` call would page over.
pub fn count_search_matches(
    conn: &Connection,
    owner: Option<&Uuid>,
    term: &str,
) -> Result<u64, DatabaseError> {
    let pattern = format!("%{}%", escape_like(term));
    let mut sql = "SELECT COUNT(*) FROM documents \
                   WHERE deleted = 0 AND extracted_text LIKE ? ESCAPE '\\'"
        .to_string();
    let mut sql_params: Vec<Box<dyn ToSql>> = vec![Box::new(pattern)];
    if let Some(owner_id) = owner {
        sql.push_str(" AND owner_id = ?");
        sql_params.push(Box::new(owner_id.to_string()));
    }

    let count: i64 = conn.query_row(&sql, params_from_iter(sql_params.iter()), |row| row.get(0))?;
    Ok(count as u64)
}

/// Soft-delete: mark the document deleted and stamp the deletion time.
///
/// Idempotent in effect: a second call refreshes the timestamp but the
/// record stays deleted. Returns false when no such document exists.
pub fn soft_delete_document(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let now = Utc::now();
    let rows = conn.execute(
        "UPDATE documents SET deleted = 1, deleted_at = ?2, updated_at = ?2 WHERE id = ?1",
        params![id.to_string(), now],
    )?;
    Ok(rows > 0)
}

/// Administrative: bring a soft-deleted document back into the active set.
pub fn restore_document(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let now = Utc::now();
    let rows = conn.execute(
        "UPDATE documents SET deleted = 0, deleted_at = NULL, updated_at = ?2 WHERE id = ?1",
        params![id.to_string(), now],
    )?;
    Ok(rows > 0)
}

/// Administrative: physically remove the row. Ordinary delete paths must use
/// [`soft_delete_document`] instead.
pub fn hard_delete_document(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let rows = conn.execute(
        "DELETE FROM documents WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(rows > 0)
}

fn filter_predicates(filter: &DocumentFilter) -> (Vec<&'static str>, Vec<Box<dyn ToSql>>) {
    let mut clauses: Vec<&'static str> = Vec::new();
    let mut sql_params: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(method) = &filter.method {
        clauses.push("method = ?");
        sql_params.push(Box::new(method.as_str()));
    }
    if let Some(fragment) = &filter.filename_contains {
        clauses.push("filename LIKE ? ESCAPE '\\'");
        sql_params.push(Box::new(format!("%{}%", escape_like(fragment))));
    }
    if let Some(from) = &filter.created_from {
        clauses.push("created_at >= ?");
        sql_params.push(Box::new(*from));
    }
    if let Some(to) = &filter.created_to {
        clauses.push("created_at <= ?");
        sql_params.push(Box::new(*to));
    }

    (clauses, sql_params)
}

fn query_one(
    conn: &Connection,
    sql: &str,
    sql_params: &[&dyn ToSql],
) -> Result<Option<Document>, DatabaseError> {
    let result = conn.query_row(sql, sql_params, row_to_document_row);
    match result {
        Ok(row) => Ok(Some(document_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// Internal row type for Document mapping
struct DocumentRow {
    id: String,
    owner_id: String,
    filename: String,
    size_bytes: i64,
    extracted_text: String,
    method: String,
    processing_seconds: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
}

fn row_to_document_row(row: &rusqlite::Row<'_>) -> Result<DocumentRow, rusqlite::Error> {
    Ok(DocumentRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        filename: row.get(2)?,
        size_bytes: row.get(3)?,
        extracted_text: row.get(4)?,
        method: row.get(5)?,
        processing_seconds: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        deleted: row.get(9)?,
        deleted_at: row.get(10)?,
    })
}

fn document_from_row(row: DocumentRow) -> Result<Document, DatabaseError> {
    Ok(Document {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        owner_id: Uuid::parse_str(&row.owner_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        filename: row.filename,
        size_bytes: row.size_bytes.max(0) as u64,
        extracted_text: row.extracted_text,
        // Unknown stored labels parse conservatively as native extraction.
        method: ExtractionMethod::from_str(&row.method).unwrap_or(ExtractionMethod::Native),
        processing_seconds: row.processing_seconds,
        created_at: row.created_at,
        updated_at: row.updated_at,
        deleted: row.deleted,
        deleted_at: row.deleted_at,
    })
}
