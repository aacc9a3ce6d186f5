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

//! Domain types, repository seams, and the chat session reducer shared by
//! the Studyhall service crates.

pub mod error;
pub mod models;
pub mod repo;
pub mod session;

pub use error::{Error, Result};
pub use models::{
    ChatMessage, CreateCardRequest, CreateNoteRequest, MasteredFlashcard, Note, RecallCard,
    RenameToolRequest, SaveToolRequest, SavedToolResult, Student, StudentIdentity,
    UpdateNoteRequest,
};
pub use repo::{MasteryRepository, NoteRepository, StudentRepository, ToolResultRepository};
pub use session::{ChatSession, StreamPhase};
