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

pub mod chat;
pub mod health;
pub mod mastery;
pub mod notes;
pub mod students;
pub mod tools;

pub use chat::{chat_completion, generate_title, story_completion, sync_recall};
pub use health::{health_check, health_check_detailed};
pub use mastery::{clear_mastery, create_card, delete_card, list_mastery};
pub use notes::{create_note, delete_note, list_notes, update_note};
pub use students::get_me;
pub use tools::{delete_tool, list_saved_tools, rename_tool, save_tool};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use studyhall_core::{
    Error, MasteryRepository, NoteRepository, StudentRepository, ToolResultRepository,
};

use crate::llm::CompletionRelay;

/// API error type. Every variant renders as JSON so browser-side callers
/// never parse an HTML error page.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    /// Detail is logged server-side only; the response carries a fixed
    /// message.
    #[error("Internal server error")]
    Internal(String),

    /// Upstream model failure with a fixed machine-readable code.
    #[error("{code}")]
    Upstream {
        code: &'static str,
        message: &'static str,
        detail: String,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg })),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "error": "Unauthorized" }),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, serde_json::json!({ "error": msg })),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "Internal server error" }),
                )
            }
            ApiError::Upstream {
                code,
                message,
                detail,
            } => {
                tracing::error!(error = %detail, code, "completion relay failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": code, "message": message }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Unauthorized => ApiError::Unauthorized,
            // One class for "does not exist" and "not yours": existence must
            // not leak across owners.
            Error::NotFound(what) => {
                ApiError::NotFound(format!("{} not found or unauthorized", what))
            }
            Error::Validation(msg) => ApiError::BadRequest(msg),
            Error::Database(e) => ApiError::Internal(e.to_string()),
            Error::Completion(msg) => ApiError::Internal(msg),
        }
    }
}

/// Shared application state, constructed once at startup and injected into
/// every handler.
#[derive(Clone)]
pub struct AppState {
    pub students: Arc<dyn StudentRepository>,
    pub notes: Arc<dyn NoteRepository>,
    pub mastery: Arc<dyn MasteryRepository>,
    pub tools: Arc<dyn ToolResultRepository>,
    /// None when no provider credentials are configured; AI endpoints then
    /// answer 500 with a fixed message.
    pub relay: Option<Arc<CompletionRelay>>,
    /// Kept for health checks only; handlers go through the repositories.
    pub pool: SqlitePool,
}

impl AppState {
    pub(crate) fn relay(&self) -> Result<&Arc<CompletionRelay>, ApiError> {
        self.relay
            .as_ref()
            .ok_or_else(|| ApiError::Internal("completion relay is not configured".to_string()))
    }
}

/// `?id=` query parameter shared by the delete endpoints.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// Body returned by mutations that do not echo a record.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<u64>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            deleted: None,
        }
    }

    pub fn deleted(count: u64) -> Self {
        Self {
            success: true,
            deleted: Some(count),
        }
    }
}
