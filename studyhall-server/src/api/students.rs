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

use crate::api::{ApiError, AppState};
use crate::auth::AuthContext;
use axum::{
    extract::{Extension, State},
    Json,
};
use studyhall_core::Student;

/// GET /api/v1/me - the caller's profile, created lazily on first access.
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Student>, ApiError> {
    let student = state.students.upsert(&auth.identity()).await?;
    Ok(Json(student))
}
