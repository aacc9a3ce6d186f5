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

use studyhall_core::{CreateCardRequest, Error, MasteredFlashcard, MasteryRepository, Result};

/// SQLite implementation of [`MasteryRepository`].
pub struct SqliteMasteryRepository {
    pool: SqlitePool,
}

impl SqliteMasteryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_card(row: &SqliteRow) -> Result<MasteredFlashcard> {
    Ok(MasteredFlashcard {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        question: row.try_get("question")?,
        answer: row.try_get("answer")?,
        subject: row.try_get("subject")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl MasteryRepository for SqliteMasteryRepository {
    async fn list(&self, owner: &str) -> Result<Vec<MasteredFlashcard>> {
        let rows = sqlx::query(
            "SELECT c.id, c.student_id, c.question, c.answer, c.subject, c.created_at
             FROM mastered_flashcards c
             JOIN students s ON s.id = c.student_id
             WHERE s.external_id = ?1
             ORDER BY c.created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_card).collect()
    }

    async fn create(&self, student_id: &str, req: &CreateCardRequest) -> Result<MasteredFlashcard> {
        let subject = req
            .subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("General");

        let row = sqlx::query(
            "INSERT INTO mastered_flashcards (id, student_id, question, answer, subject, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, student_id, question, answer, subject, created_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(student_id)
        .bind(&req.question)
        .bind(&req.answer)
        .bind(subject)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row_to_card(&row)
    }

    async fn delete(&self, owner: &str, id: &str) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM mastered_flashcards
             WHERE id = ?1
               AND student_id IN (SELECT id FROM students WHERE external_id = ?2)",
        )
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Card"));
        }
        Ok(())
    }

    async fn clear(&self, owner: &str) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM mastered_flashcards
             WHERE student_id IN (SELECT id FROM students WHERE external_id = ?1)",
        )
        .bind(owner)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
