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

//! Mastery bank: permanently saved flashcards.

use crate::api::{ApiError, AppState, IdQuery, SuccessResponse};
use crate::auth::AuthContext;
use axum::{
    extract::{Extension, Query, State},
    Json,
};
use studyhall_core::{CreateCardRequest, MasteredFlashcard};

/// GET /api/v1/mastery/all - the caller's whole bank, newest first.
pub async fn list_mastery(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<MasteredFlashcard>>, ApiError> {
    state.students.upsert(&auth.identity()).await?;
    let cards = state.mastery.list(&auth.external_id).await?;
    Ok(Json(cards))
}

/// DELETE /api/v1/mastery/all - clear the caller's bank; reports how many
/// rows were actually removed.
pub async fn clear_mastery(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let deleted = state.mastery.clear(&auth.external_id).await?;
    Ok(Json(SuccessResponse::deleted(deleted)))
}

/// POST /api/v1/mastery - save one card (`{q, a, subject?}`).
pub async fn create_card(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateCardRequest>,
) -> Result<Json<MasteredFlashcard>, ApiError> {
    if req.question.trim().is_empty() || req.answer.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "question and answer are required".to_string(),
        ));
    }

    let student = state.students.upsert(&auth.identity()).await?;
    let card = state.mastery.create(&student.id, &req).await?;
    Ok(Json(card))
}

/// DELETE /api/v1/mastery?id=
pub async fn delete_card(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<IdQuery>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Card ID is required".to_string()))?;

    state.mastery.delete(&auth.external_id, &id).await?;
    Ok(Json(SuccessResponse::ok()))
}
