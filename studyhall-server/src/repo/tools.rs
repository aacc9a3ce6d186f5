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

use studyhall_core::{
    Error, RenameToolRequest, Result, SaveToolRequest, SavedToolResult, ToolResultRepository,
};

/// SQLite implementation of [`ToolResultRepository`].
pub struct SqliteToolResultRepository {
    pool: SqlitePool,
}

impl SqliteToolResultRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_tool_result(row: &SqliteRow) -> Result<SavedToolResult> {
    Ok(SavedToolResult {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        tool_name: row.try_get("tool_name")?,
        tool_id: row.try_get("tool_id")?,
        category: row.try_get("category")?,
        input: row.try_get("input")?,
        output: row.try_get("output")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl ToolResultRepository for SqliteToolResultRepository {
    async fn list(&self, owner: &str) -> Result<Vec<SavedToolResult>> {
        let rows = sqlx::query(
            "SELECT t.id, t.student_id, t.tool_name, t.tool_id, t.category,
                    t.input, t.output, t.created_at
             FROM saved_tool_results t
             JOIN students s ON s.id = t.student_id
             WHERE s.external_id = ?1
             ORDER BY t.created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_tool_result).collect()
    }

    async fn create(&self, student_id: &str, req: &SaveToolRequest) -> Result<SavedToolResult> {
        let category = req
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("General");

        let row = sqlx::query(
            "INSERT INTO saved_tool_results
                 (id, student_id, tool_name, tool_id, category, input, output, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, student_id, tool_name, tool_id, category, input, output, created_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(student_id)
        .bind(&req.tool_name)
        .bind(&req.tool_id)
        .bind(category)
        .bind(&req.input)
        .bind(&req.output)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row_to_tool_result(&row)
    }

    async fn rename(&self, owner: &str, req: &RenameToolRequest) -> Result<SavedToolResult> {
        let result = sqlx::query(
            "UPDATE saved_tool_results SET
                 tool_name = COALESCE(?1, tool_name),
                 category = COALESCE(?2, category)
             WHERE id = ?3
               AND student_id IN (SELECT id FROM students WHERE external_id = ?4)",
        )
        .bind(req.new_name.as_deref())
        .bind(req.category.as_deref())
        .bind(&req.id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Saved tool"));
        }

        let row = sqlx::query(
            "SELECT t.id, t.student_id, t.tool_name, t.tool_id, t.category,
                    t.input, t.output, t.created_at
             FROM saved_tool_results t
             JOIN students s ON s.id = t.student_id
             WHERE t.id = ?1 AND s.external_id = ?2",
        )
        .bind(&req.id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::NotFound("Saved tool"))?;

        row_to_tool_result(&row)
    }

    async fn delete(&self, owner: &str, id: &str) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM saved_tool_results
             WHERE id = ?1
               AND student_id IN (SELECT id FROM students WHERE external_id = ?2)",
        )
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Saved tool"));
        }
        Ok(())
    }
}
