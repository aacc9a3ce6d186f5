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

//! AI relay endpoints: streaming chat/story, title generation, and recall
//! card generation from recent notes.

use crate::api::{ApiError, AppState};
use crate::auth::AuthContext;
use crate::llm::prompts;
use axum::{
    body::Body,
    extract::{Extension, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use studyhall_core::{ChatMessage, RecallCard};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

/// How many of the caller's most recent notes feed recall generation.
const RECALL_NOTE_COUNT: i64 = 3;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Full conversation history; takes precedence over `prompt`.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Single-turn prompt, used when `messages` is empty.
    pub prompt: Option<String>,
    /// Optional system-instruction override.
    pub system_role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRequest {
    pub prompt: String,
    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct TitleResponse {
    pub title: String,
}

/// The response body is the model's raw text, flushed chunk by chunk. No
/// event framing; the stream closing is the only end signal.
fn text_stream_response(rx: mpsc::Receiver<String>) -> Response {
    let stream = ReceiverStream::new(rx).map(|chunk| Ok::<_, Infallible>(Bytes::from(chunk)));
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    )
        .into_response()
}

/// POST /api/v1/chat - streamed completion over a transcript or a single
/// prompt.
pub async fn chat_completion(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let relay = state.relay()?;

    let messages = if !req.messages.is_empty() {
        req.messages
    } else if let Some(prompt) = req.prompt {
        vec![ChatMessage::user(prompt)]
    } else {
        return Err(ApiError::BadRequest(
            "messages or prompt is required".to_string(),
        ));
    };

    let system = req.system_role.as_deref().unwrap_or(prompts::CHAT);

    let rx = relay
        .stream(system, messages)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(text_stream_response(rx))
}

/// POST /api/v1/story - streamed tutor/storyteller completion. Interests
/// personalize the system instruction when present.
pub async fn story_completion(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Json(req): Json<StoryRequest>,
) -> Result<Response, ApiError> {
    let relay = state.relay()?;

    if req.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("prompt is required".to_string()));
    }

    let system = if req.interests.is_empty() {
        prompts::STORY.to_string()
    } else {
        format!(
            "{} The student's interests include: {}.",
            prompts::STORY,
            req.interests.join(", ")
        )
    };

    let rx = relay
        .stream(&system, vec![ChatMessage::user(req.prompt)])
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(text_stream_response(rx))
}

/// POST /api/v1/generate-title - `{content}` in, `{title}` out.
pub async fn generate_title(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Json(req): Json<TitleRequest>,
) -> Result<Json<TitleResponse>, ApiError> {
    let relay = state.relay()?;

    if req.content.trim().is_empty() {
        return Err(ApiError::BadRequest("content is required".to_string()));
    }

    let title = relay
        .generate_title(&req.content)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(TitleResponse { title }))
}

/// POST /api/v1/sync-recall - generate 5 Q/A pairs from the caller's most
/// recent notes.
pub async fn sync_recall(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<RecallCard>>, ApiError> {
    let relay = state.relay()?;

    let notes = state
        .notes
        .recent(&auth.external_id, RECALL_NOTE_COUNT)
        .await?;

    if notes.is_empty() {
        return Err(ApiError::NotFound(
            "Notebook is empty! Save some notes first.".to_string(),
        ));
    }

    let context = notes
        .iter()
        .map(|n| format!("Topic: {}\nContent: {}", n.title, n.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    // Parse failure and upstream failure are deliberately one error code.
    let cards = relay
        .generate_recall_cards(&context)
        .await
        .map_err(|e| ApiError::Upstream {
            code: "AI_SYNC_FAILED",
            message: "Neural engine failed to generate cards. Try syncing again.",
            detail: e.to_string(),
        })?;

    Ok(Json(cards))
}
