// Copyright 2025 Studyhall Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Connection pool construction and schema bootstrap.
//!
//! The pool is built once at startup and handed to the repositories; nothing
//! in this crate reaches for a global database handle.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use studyhall_core::Result;

/// Schema statements, applied in order. `IF NOT EXISTS` keeps startup
/// idempotent across restarts of the same database file.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS students (
        id TEXT PRIMARY KEY,
        external_id TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL,
        name TEXT NOT NULL,
        interests TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS notes (
        id TEXT PRIMARY KEY,
        student_id TEXT NOT NULL REFERENCES students(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS mastered_flashcards (
        id TEXT PRIMARY KEY,
        student_id TEXT NOT NULL REFERENCES students(id) ON DELETE CASCADE,
        question TEXT NOT NULL,
        answer TEXT NOT NULL,
        subject TEXT NOT NULL DEFAULT 'General',
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS saved_tool_results (
        id TEXT PRIMARY KEY,
        student_id TEXT NOT NULL REFERENCES students(id) ON DELETE CASCADE,
        tool_name TEXT NOT NULL,
        tool_id TEXT NOT NULL,
        category TEXT NOT NULL DEFAULT 'General',
        input TEXT NOT NULL,
        output TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_notes_student ON notes(student_id)",
    "CREATE INDEX IF NOT EXISTS idx_flashcards_student ON mastered_flashcards(student_id)",
    "CREATE INDEX IF NOT EXISTS idx_tool_results_student ON saved_tool_results(student_id)",
];

/// Open the pool, creating the database file if missing, and apply the
/// schema.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_bootstrap_is_idempotent() {
        let pool = connect("sqlite::memory:", 1).await.unwrap();
        // Re-applying on a live database must not fail
        init_schema(&pool).await.unwrap();

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(count >= 4);
    }

    #[tokio::test]
    async fn file_database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}/studyhall.db", dir.path().display());

        {
            let pool = connect(&url, 1).await.unwrap();
            sqlx::query(
                "INSERT INTO students (id, external_id, email, name, interests, created_at, updated_at)
                 VALUES ('s1', 'u1', 'u1@example.com', 'Student', '[]',
                         '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
            )
            .execute(&pool)
            .await
            .unwrap();
            pool.close().await;
        }

        let pool = connect(&url, 1).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
