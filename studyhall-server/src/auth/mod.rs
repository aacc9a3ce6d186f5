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

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use studyhall_core::StudentIdentity;

/// Authentication context attached to each authenticated request.
///
/// `external_id` is the identity provider's stable user key; it is the owner
/// key every repository operation is scoped by.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub external_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl AuthContext {
    /// Identity fields for the student upsert. Missing names fall back to
    /// "Student", matching what the client displays for a fresh account.
    pub fn identity(&self) -> StudentIdentity {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Student")
            .to_string();
        StudentIdentity {
            external_id: self.external_id.clone(),
            email: self.email.clone().unwrap_or_default(),
            name,
        }
    }
}

/// Authentication error
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authentication credentials")]
    MissingCredentials,

    #[error("Invalid authentication credentials")]
    InvalidCredentials,

    #[error("JWT token validation failed: {0}")]
    JwtValidation(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Always JSON, even on auth failure, so the browser never tries to
        // parse an HTML error page.
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// External identity key (identity provider user ID)
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Expiration time
    pub exp: usize,
}

/// Authenticator trait for pluggable auth strategies
pub trait Authenticator: Send + Sync {
    /// Authenticate request by examining headers (synchronous)
    fn authenticate(&self, headers: &axum::http::HeaderMap) -> Result<AuthContext, AuthError>;
}

/// Bearer token (JWT) authenticator
pub struct BearerTokenAuth {
    jwt_secret: Vec<u8>,
}

impl BearerTokenAuth {
    pub fn new(jwt_secret: String) -> Self {
        Self {
            jwt_secret: jwt_secret.into_bytes(),
        }
    }
}

impl Authenticator for BearerTokenAuth {
    fn authenticate(&self, headers: &axum::http::HeaderMap) -> Result<AuthContext, AuthError> {
        let auth_header = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingCredentials)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MissingCredentials)?;

        let token_data = jsonwebtoken::decode::<Claims>(
            token,
            &jsonwebtoken::DecodingKey::from_secret(&self.jwt_secret),
            &jsonwebtoken::Validation::default(),
        )
        .map_err(|e| AuthError::JwtValidation(e.to_string()))?;

        Ok(AuthContext {
            external_id: token_data.claims.sub,
            email: token_data.claims.email,
            name: token_data.claims.name,
        })
    }
}

/// No-op authenticator for development: every request resolves to one fixed
/// local identity.
pub struct NoAuth {
    external_id: String,
}

impl NoAuth {
    pub fn new(external_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
        }
    }
}

impl Authenticator for NoAuth {
    fn authenticate(&self, _headers: &axum::http::HeaderMap) -> Result<AuthContext, AuthError> {
        Ok(AuthContext {
            external_id: self.external_id.clone(),
            email: Some("dev@localhost".to_string()),
            name: Some("Dev Student".to_string()),
        })
    }
}

/// Authentication middleware
pub async fn auth_middleware(
    auth: axum::Extension<Arc<dyn Authenticator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let ctx = auth.authenticate(req.headers())?;
    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    fn make_token(secret: &str, sub: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            email: Some("ada@example.com".to_string()),
            name: Some("Ada Lovelace".to_string()),
            exp: 4102444800, // 2100-01-01
        };
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_bearer_token_auth() {
        let auth = BearerTokenAuth::new("top-secret".to_string());
        let token = make_token("top-secret", "user_42");

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );

        let ctx = auth.authenticate(&headers).unwrap();
        assert_eq!(ctx.external_id, "user_42");
        assert_eq!(ctx.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let auth = BearerTokenAuth::new("top-secret".to_string());
        let token = make_token("other-secret", "user_42");

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );

        assert!(matches!(
            auth.authenticate(&headers),
            Err(AuthError::JwtValidation(_))
        ));
    }

    #[test]
    fn test_missing_header_rejected() {
        let auth = BearerTokenAuth::new("top-secret".to_string());
        let headers = HeaderMap::new();
        assert!(matches!(
            auth.authenticate(&headers),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_no_auth() {
        let auth = NoAuth::new("dev-student");
        let ctx = auth.authenticate(&HeaderMap::new()).unwrap();
        assert_eq!(ctx.external_id, "dev-student");
    }

    #[test]
    fn test_identity_name_fallback() {
        let ctx = AuthContext {
            external_id: "u1".to_string(),
            email: None,
            name: Some("   ".to_string()),
        };
        let identity = ctx.identity();
        assert_eq!(identity.name, "Student");
        assert_eq!(identity.email, "");
    }
}
