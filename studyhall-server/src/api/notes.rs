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

use crate::api::{ApiError, AppState, IdQuery, SuccessResponse};
use crate::auth::AuthContext;
use axum::{
    extract::{Extension, Query, State},
    Json,
};
use studyhall_core::{CreateNoteRequest, Note, UpdateNoteRequest};

/// GET /api/v1/notes - all of the caller's notes, newest-updated first.
///
/// The student row is upserted first so a first-time user gets an empty
/// list, never a not-found.
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<Note>>, ApiError> {
    state.students.upsert(&auth.identity()).await?;
    let notes = state.notes.list(&auth.external_id).await?;
    Ok(Json(notes))
}

/// POST /api/v1/notes
pub async fn create_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateNoteRequest>,
) -> Result<Json<Note>, ApiError> {
    if req.title.trim().is_empty() || req.content.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "title and content are required".to_string(),
        ));
    }

    // Owner reference comes from the resolved student row, never from the
    // request body.
    let student = state.students.upsert(&auth.identity()).await?;
    let note = state.notes.create(&student.id, &req).await?;
    Ok(Json(note))
}

/// PATCH /api/v1/notes - partial update of `{id, title?, content?}`.
pub async fn update_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if req.title.is_none() && req.content.is_none() {
        return Err(ApiError::BadRequest(
            "title or content is required".to_string(),
        ));
    }

    state.notes.update(&auth.external_id, &req).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /api/v1/notes?id=
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<IdQuery>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Note ID missing".to_string()))?;

    state.notes.delete(&auth.external_id, &id).await?;
    Ok(Json(SuccessResponse::ok()))
}
