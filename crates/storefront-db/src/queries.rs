use rusqlite::{OptionalExtension, TransactionBehavior, params};
use tracing::warn;

use crate::models::{CommentRow, CommentWithAuthorRow, UserRow};
use crate::{Result, Session};

impl Session {
    // -- Users --

    /// Insert a user in its own transaction. A uniqueness violation comes back
    /// as [`crate::StoreError::UniqueViolation`] after the transaction is rolled back.
    pub fn insert_user(&mut self, username: &str, email: &str, password_hash: &str) -> Result<UserRow> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let inserted = tx.query_row(
            &format!(
                "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3) RETURNING {}",
                UserRow::COLUMNS
            ),
            params![username, email, password_hash],
            UserRow::from_row,
        );

        match inserted {
            Ok(row) => {
                tx.commit()?;
                Ok(row)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback() {
                    warn!("Rollback after failed user insert failed: {}", rollback);
                }
                Err(e.into())
            }
        }
    }

    /// Exact match on the (username, password digest) pair.
    pub fn find_user_by_credentials(&self, username: &str, password_hash: &str) -> Result<Option<UserRow>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM users WHERE username = ?1 AND password_hash = ?2",
                    UserRow::COLUMNS
                ),
                params![username, password_hash],
                UserRow::from_row,
            )
            .optional()?;

        Ok(row)
    }

    pub fn user_exists(&self, id: i64) -> Result<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM users WHERE id = ?1", [id], |_| Ok(()))
            .optional()?;

        Ok(found.is_some())
    }

    pub fn username_by_id(&self, id: i64) -> Result<Option<String>> {
        let username = self
            .conn
            .query_row("SELECT username FROM users WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;

        Ok(username)
    }

    // -- Comments --

    pub fn insert_comment(
        &mut self,
        product_id: &str,
        user_id: i64,
        comment_text: &str,
        rating: Option<i64>,
    ) -> Result<CommentRow> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let inserted = tx.query_row(
            &format!(
                "INSERT INTO comments (product_id, user_id, comment_text, rating)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING {}",
                CommentRow::COLUMNS
            ),
            params![product_id, user_id, comment_text, rating],
            CommentRow::from_row,
        );

        match inserted {
            Ok(row) => {
                tx.commit()?;
                Ok(row)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback() {
                    warn!("Rollback after failed comment insert failed: {}", rollback);
                }
                Err(e.into())
            }
        }
    }

    /// All comments for a product, newest first. `id` breaks ties between
    /// comments created within the same millisecond.
    pub fn comments_for_product(&self, product_id: &str) -> Result<Vec<CommentWithAuthorRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.comment_text, c.rating, c.created_at, u.username
             FROM comments c
             JOIN users u ON c.user_id = u.id
             WHERE c.product_id = ?1
             ORDER BY c.created_at DESC, c.id DESC",
        )?;

        let rows = stmt
            .query_map([product_id], |row| {
                Ok(CommentWithAuthorRow {
                    id: row.get(0)?,
                    comment_text: row.get(1)?,
                    rating: row.get(2)?,
                    created_at: crate::models::timestamp(row, 3)?,
                    username: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
