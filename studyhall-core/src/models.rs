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

//! Core domain entities and request payloads.
//!
//! Wire names are camelCase to stay compatible with the existing browser
//! client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated end user, keyed by the identity provider's stable ID.
///
/// Rows are upserted on first authenticated access and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub interests: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity fields resolved by the auth layer, used for the student upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentIdentity {
    pub external_id: String,
    pub email: String,
    pub name: String,
}

/// A freeform text document owned by one student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub student_id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A question/answer pair the student chose to keep permanently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteredFlashcard {
    pub id: String,
    pub student_id: String,
    pub question: String,
    pub answer: String,
    pub subject: String,
    pub created_at: DateTime<Utc>,
}

/// A saved AI tool invocation (input text plus generated output).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedToolResult {
    pub id: String,
    pub student_id: String,
    pub tool_name: String,
    pub tool_id: String,
    pub category: String,
    pub input: String,
    pub output: String,
    pub created_at: DateTime<Utc>,
}

/// One entry of a chat transcript sent to or received from the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
}

/// Partial note update; `None` fields keep their stored value.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    pub id: String,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Wire format matches the recall UI: `{"q": ..., "a": ..., "subject": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCardRequest {
    #[serde(rename = "q")]
    pub question: String,
    #[serde(rename = "a")]
    pub answer: String,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveToolRequest {
    pub tool_name: String,
    pub tool_id: String,
    pub input: String,
    pub output: String,
    pub category: Option<String>,
}

/// Partial rename/recategorize of a saved tool result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameToolRequest {
    pub id: String,
    pub new_name: Option<String>,
    pub category: Option<String>,
}

/// A generated flashcard as emitted by the model: `[{"q": ..., "a": ...}]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecallCard {
    pub q: String,
    pub a: String,
}
