use rusqlite::Connection;
use tracing::info;

use crate::Result;

/// Store-assigned timestamp: RFC 3339 UTC with millisecond precision.
const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

pub fn run(conn: &mut Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Store: running migration v1 (users, comments)");
        let tx = conn.transaction()?;
        tx.execute_batch(&format!(
            "
            CREATE TABLE users (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                username        TEXT NOT NULL UNIQUE,
                email           TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                created_at      TEXT NOT NULL DEFAULT ({NOW})
            );

            CREATE TABLE comments (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                product_id      TEXT NOT NULL,
                user_id         INTEGER NOT NULL REFERENCES users(id),
                comment_text    TEXT NOT NULL,
                rating          INTEGER CHECK (rating IS NULL OR rating BETWEEN 1 AND 5),
                created_at      TEXT NOT NULL DEFAULT ({NOW})
            );

            CREATE INDEX idx_comments_product
                ON comments(product_id, created_at);

            INSERT INTO schema_version (version) VALUES (1);
            "
        ))?;
        tx.commit()?;
    }

    info!("Store migrations complete");
    Ok(())
}
