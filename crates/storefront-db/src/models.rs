//! Database row types — these map directly to SQLite rows.
//! Distinct from storefront-types API models to keep the DB layer independent.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) const COLUMNS: &'static str = "id, username, email, password_hash, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            created_at: timestamp(row, 4)?,
        })
    }
}

pub struct CommentRow {
    pub id: i64,
    pub product_id: String,
    pub user_id: i64,
    pub comment_text: String,
    pub rating: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl CommentRow {
    pub(crate) const COLUMNS: &'static str =
        "id, product_id, user_id, comment_text, rating, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            product_id: row.get(1)?,
            user_id: row.get(2)?,
            comment_text: row.get(3)?,
            rating: row.get(4)?,
            created_at: timestamp(row, 5)?,
        })
    }
}

/// A comment joined with its author's username.
pub struct CommentWithAuthorRow {
    pub id: i64,
    pub comment_text: String,
    pub rating: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub username: String,
}

/// Stored timestamps are RFC 3339; rows written by hand through the sqlite
/// shell use `datetime('now')`'s "YYYY-MM-DD HH:MM:SS", read as UTC.
pub(crate) fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
