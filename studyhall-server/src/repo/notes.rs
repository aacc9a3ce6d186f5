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

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use studyhall_core::{CreateNoteRequest, Error, Note, NoteRepository, Result, UpdateNoteRequest};

/// SQLite implementation of [`NoteRepository`].
pub struct SqliteNoteRepository {
    pool: SqlitePool,
}

impl SqliteNoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_note(row: &SqliteRow) -> Result<Note> {
    Ok(Note {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl NoteRepository for SqliteNoteRepository {
    async fn list(&self, owner: &str) -> Result<Vec<Note>> {
        let rows = sqlx::query(
            "SELECT n.id, n.student_id, n.title, n.content, n.created_at, n.updated_at
             FROM notes n
             JOIN students s ON s.id = n.student_id
             WHERE s.external_id = ?1
             ORDER BY n.updated_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_note).collect()
    }

    async fn recent(&self, owner: &str, limit: i64) -> Result<Vec<Note>> {
        let rows = sqlx::query(
            "SELECT n.id, n.student_id, n.title, n.content, n.created_at, n.updated_at
             FROM notes n
             JOIN students s ON s.id = n.student_id
             WHERE s.external_id = ?1
             ORDER BY n.updated_at DESC
             LIMIT ?2",
        )
        .bind(owner)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_note).collect()
    }

    async fn create(&self, student_id: &str, req: &CreateNoteRequest) -> Result<Note> {
        let now = Utc::now();
        let row = sqlx::query(
            "INSERT INTO notes (id, student_id, title, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             RETURNING id, student_id, title, content, created_at, updated_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(student_id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        row_to_note(&row)
    }

    async fn update(&self, owner: &str, req: &UpdateNoteRequest) -> Result<()> {
        let result = sqlx::query(
            "UPDATE notes SET
                 title = COALESCE(?1, title),
                 content = COALESCE(?2, content),
                 updated_at = ?3
             WHERE id = ?4
               AND student_id IN (SELECT id FROM students WHERE external_id = ?5)",
        )
        .bind(req.title.as_deref())
        .bind(req.content.as_deref())
        .bind(Utc::now())
        .bind(&req.id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Note"));
        }
        Ok(())
    }

    async fn delete(&self, owner: &str, id: &str) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM notes
             WHERE id = ?1
               AND student_id IN (SELECT id FROM students WHERE external_id = ?2)",
        )
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Note"));
        }
        Ok(())
    }
}
