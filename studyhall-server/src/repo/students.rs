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

use studyhall_core::{Result, Student, StudentIdentity, StudentRepository};

/// SQLite implementation of [`StudentRepository`].
pub struct SqliteStudentRepository {
    pool: SqlitePool,
}

impl SqliteStudentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_student(row: &SqliteRow) -> Result<Student> {
    let interests: String = row.try_get("interests")?;
    Ok(Student {
        id: row.try_get("id")?,
        external_id: row.try_get("external_id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        interests: serde_json::from_str(&interests).unwrap_or_default(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl StudentRepository for SqliteStudentRepository {
    async fn upsert(&self, identity: &StudentIdentity) -> Result<Student> {
        let now = Utc::now();
        // Keyed on external_id: a second sync for the same identity updates
        // the email in place and never creates a second row.
        let row = sqlx::query(
            "INSERT INTO students (id, external_id, email, name, interests, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(external_id) DO UPDATE SET
                 email = excluded.email,
                 updated_at = excluded.updated_at
             RETURNING id, external_id, email, name, interests, created_at, updated_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&identity.external_id)
        .bind(&identity.email)
        .bind(&identity.name)
        .bind("[]")
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        row_to_student(&row)
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Student>> {
        let row = sqlx::query(
            "SELECT id, external_id, email, name, interests, created_at, updated_at
             FROM students WHERE external_id = ?1",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_student).transpose()
    }
}
