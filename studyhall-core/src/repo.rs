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

//! Repository traits.
//!
//! Owner scoping is the contract, not a convention: every method that reads
//! or mutates a child row takes the caller's external identity key (`owner`)
//! and must apply it in the same predicate as the row identifier. A row that
//! exists but belongs to someone else is reported as `Error::NotFound`.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    CreateCardRequest, CreateNoteRequest, MasteredFlashcard, Note, RenameToolRequest,
    SaveToolRequest, SavedToolResult, Student, StudentIdentity, UpdateNoteRequest,
};

#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Create-or-update keyed on the external identity; the email always
    /// reflects the latest value passed. Never produces a duplicate row.
    async fn upsert(&self, identity: &StudentIdentity) -> Result<Student>;

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Student>>;
}

#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// All notes owned by `owner`, newest-updated first.
    async fn list(&self, owner: &str) -> Result<Vec<Note>>;

    /// The `limit` most recently updated notes owned by `owner`.
    async fn recent(&self, owner: &str, limit: i64) -> Result<Vec<Note>>;

    /// `student_id` is the resolved internal id, never client input.
    async fn create(&self, student_id: &str, req: &CreateNoteRequest) -> Result<Note>;

    async fn update(&self, owner: &str, req: &UpdateNoteRequest) -> Result<()>;

    async fn delete(&self, owner: &str, id: &str) -> Result<()>;
}

#[async_trait]
pub trait MasteryRepository: Send + Sync {
    /// The caller's whole mastery bank, newest first.
    async fn list(&self, owner: &str) -> Result<Vec<MasteredFlashcard>>;

    async fn create(&self, student_id: &str, req: &CreateCardRequest) -> Result<MasteredFlashcard>;

    async fn delete(&self, owner: &str, id: &str) -> Result<()>;

    /// Remove every card owned by `owner`; returns the exact number removed.
    async fn clear(&self, owner: &str) -> Result<u64>;
}

#[async_trait]
pub trait ToolResultRepository: Send + Sync {
    async fn list(&self, owner: &str) -> Result<Vec<SavedToolResult>>;

    async fn create(&self, student_id: &str, req: &SaveToolRequest) -> Result<SavedToolResult>;

    /// Partial rename/recategorize; returns the updated record.
    async fn rename(&self, owner: &str, req: &RenameToolRequest) -> Result<SavedToolResult>;

    async fn delete(&self, owner: &str, id: &str) -> Result<()>;
}
