use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::ExtractionMethod;

/// Window used for the "recent documents" counter.
const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize)]
pub struct MethodCount {
    pub method: ExtractionMethod,
    pub count: u64,
}

/// Aggregates over one owner's active documents.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerStatistics {
    pub total_documents: u64,
    pub total_size_bytes: u64,
    /// Mean processing time in seconds, rounded to 2 decimals.
    /// `None` when no document carries a duration.
    pub avg_processing_seconds: Option<f64>,
    pub by_method: Vec<MethodCount>,
    /// Documents created within the trailing 7 days, boundary inclusive.
    pub recent_documents: u64,
}

pub fn owner_statistics(
    conn: &Connection,
    owner_id: &Uuid,
) -> Result<OwnerStatistics, DatabaseError> {
    owner_statistics_at(conn, owner_id, Utc::now())
}

/// Same as [`owner_statistics`] with an explicit reference instant.
pub fn owner_statistics_at(
    conn: &Connection,
    owner_id: &Uuid,
    now: DateTime<Utc>,
) -> Result<OwnerStatistics, DatabaseError> {
    let owner = owner_id.to_string();

    let (total_documents, total_size_bytes, avg_processing_seconds) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(size_bytes), 0), AVG(processing_seconds)
         FROM documents WHERE owner_id = ?1 AND deleted = 0",
        params![owner],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, Option<f64>>(2)?,
            ))
        },
    )?;

    let mut stmt = conn.prepare(
        "SELECT method, COUNT(*) FROM documents
         WHERE owner_id = ?1 AND deleted = 0
         GROUP BY method ORDER BY method",
    )?;
    let rows = stmt.query_map(params![owner], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut by_method = Vec::new();
    for row in rows {
        let (label, count) = row?;
        by_method.push(MethodCount {
            method: ExtractionMethod::from_str(&label).unwrap_or(ExtractionMethod::Native),
            count: count as u64,
        });
    }

    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
    let recent_documents: i64 = conn.query_row(
        "SELECT COUNT(*) FROM documents
         WHERE owner_id = ?1 AND deleted = 0 AND created_at >= ?2",
        params![owner, cutoff],
        |row| row.get(0),
    )?;

    Ok(OwnerStatistics {
        total_documents: total_documents as u64,
        total_size_bytes: total_size_bytes as u64,
        avg_processing_seconds: avg_processing_seconds.map(|avg| (avg * 100.0).round() / 100.0),
        by_method,
        recent_documents: recent_documents as u64,
    })
}
