use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::User;

/// Create an account with the given username and bearer-token hash.
pub fn create_user(
    conn: &Connection,
    username: &str,
    token_hash: &str,
) -> Result<User, DatabaseError> {
    let user = User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        token_hash: token_hash.to_string(),
        created_at: Utc::now(),
    };
    conn.execute(
        "INSERT INTO users (id, username, token_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            user.id.to_string(),
            user.username,
            user.token_hash,
            user.created_at
        ],
    )?;
    Ok(user)
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    query_user(
        conn,
        "SELECT id, username, token_hash, created_at FROM users WHERE id = ?1",
        &id.to_string(),
    )
}

/// Look an account up by the SHA-256 hash of its bearer token.
pub fn find_user_by_token_hash(
    conn: &Connection,
    token_hash: &str,
) -> Result<Option<User>, DatabaseError> {
    query_user(
        conn,
        "SELECT id, username, token_hash, created_at FROM users WHERE token_hash = ?1",
        token_hash,
    )
}

fn query_user(conn: &Connection, sql: &str, param: &str) -> Result<Option<User>, DatabaseError> {
    let result = conn.query_row(sql, params![param], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, chrono::DateTime<Utc>>(3)?,
        ))
    });

    match result {
        Ok((id, username, token_hash, created_at)) => Ok(Some(User {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            username,
            token_hash,
            created_at,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
