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

//! Saved AI tool results.

use crate::api::{ApiError, AppState, IdQuery, SuccessResponse};
use crate::auth::AuthContext;
use axum::{
    extract::{Extension, Query, State},
    Json,
};
use studyhall_core::{RenameToolRequest, SaveToolRequest, SavedToolResult};

/// GET /api/v1/saved-tools - the caller's saved results, newest first.
pub async fn list_saved_tools(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<SavedToolResult>>, ApiError> {
    state.students.upsert(&auth.identity()).await?;
    let saved = state.tools.list(&auth.external_id).await?;
    Ok(Json(saved))
}

/// POST /api/v1/save-tool
pub async fn save_tool(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<SaveToolRequest>,
) -> Result<Json<SavedToolResult>, ApiError> {
    if req.tool_name.trim().is_empty() || req.tool_id.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "toolName and toolId are required".to_string(),
        ));
    }

    let student = state.students.upsert(&auth.identity()).await?;
    let saved = state.tools.create(&student.id, &req).await?;
    Ok(Json(saved))
}

/// PATCH /api/v1/rename-tool - `{id, newName?, category?}`, returns the
/// updated record.
pub async fn rename_tool(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<RenameToolRequest>,
) -> Result<Json<SavedToolResult>, ApiError> {
    if req.new_name.is_none() && req.category.is_none() {
        return Err(ApiError::BadRequest(
            "newName or category is required".to_string(),
        ));
    }

    let updated = state.tools.rename(&auth.external_id, &req).await?;
    Ok(Json(updated))
}

/// DELETE /api/v1/save-tool?id=
pub async fn delete_tool(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<IdQuery>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Missing ID".to_string()))?;

    state.tools.delete(&auth.external_id, &id).await?;
    Ok(Json(SuccessResponse::ok()))
}
