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

//! End-to-end tests through the router: auth, owner scoping, the JSON error
//! contract, and stream/complete equivalence against a scripted model.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use studyhall_core::ChatMessage;
use studyhall_server::api::AppState;
use studyhall_server::auth::{BearerTokenAuth, Claims};
use studyhall_server::config::ServerConfig;
use studyhall_server::db;
use studyhall_server::llm::{Completion, CompletionRelay, LlmProvider};
use studyhall_server::repo::{
    SqliteMasteryRepository, SqliteNoteRepository, SqliteStudentRepository,
    SqliteToolResultRepository,
};
use tokio::sync::mpsc;
use tower::ServiceExt;

const SECRET: &str = "test-secret";

/// Scripted model: `complete` returns the concatenation of the chunks the
/// stream emits, so the two delivery modes are textually equivalent by
/// construction - which is exactly what the handlers must preserve.
struct StubProvider {
    chunks: Vec<String>,
}

#[async_trait::async_trait]
impl LlmProvider for StubProvider {
    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        model: &str,
    ) -> anyhow::Result<Completion> {
        Ok(Completion {
            content: self.chunks.concat(),
            provider: "stub".to_string(),
            model: model.to_string(),
            duration_ms: 0,
        })
    }

    async fn stream(
        &self,
        _messages: Vec<ChatMessage>,
        _model: &str,
    ) -> anyhow::Result<mpsc::Receiver<String>> {
        let (tx, rx) = mpsc::channel(16);
        let chunks = self.chunks.clone();
        tokio::spawn(async move {
            for chunk in chunks {
                if tx.send(chunk).await.is_err() {
                    break;
                }
            }
        });
        Ok(rx)
    }

    fn name(&self) -> &str {
        "Stub"
    }
}

async fn test_app(chunks: Vec<&str>) -> Router {
    let pool = db::connect("sqlite::memory:", 1).await.unwrap();
    let relay = CompletionRelay::with_provider(
        "stub",
        Arc::new(StubProvider {
            chunks: chunks.into_iter().map(String::from).collect(),
        }),
        "test-model",
    );

    let state = AppState {
        students: Arc::new(SqliteStudentRepository::new(pool.clone())),
        notes: Arc::new(SqliteNoteRepository::new(pool.clone())),
        mastery: Arc::new(SqliteMasteryRepository::new(pool.clone())),
        tools: Arc::new(SqliteToolResultRepository::new(pool.clone())),
        relay: Some(Arc::new(relay)),
        pool,
    };

    studyhall_server::app(
        state,
        Arc::new(BearerTokenAuth::new(SECRET.to_string())),
        &ServerConfig::default(),
    )
}

fn token(sub: &str, email: &str) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        email: Some(email.to_string()),
        name: Some("Test Student".to_string()),
        exp: 4102444800, // 2100-01-01
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn note_created_by_a_is_invisible_to_b() {
    let app = test_app(vec![]).await;
    let token_a = token("user_a", "a@example.com");
    let token_b = token("user_b", "b@example.com");

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/notes",
        Some(&token_a),
        Some(serde_json::json!({"title": "Biology", "content": "Mitosis has 4 phases"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/v1/notes", Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", "/api/v1/notes", Some(&token_b), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn cross_owner_mastery_delete_is_not_found_and_harmless() {
    let app = test_app(vec![]).await;
    let token_a = token("user_a", "a@example.com");
    let token_b = token("user_b", "b@example.com");

    let (status, card) = send(
        &app,
        "POST",
        "/api/v1/mastery",
        Some(&token_a),
        Some(serde_json::json!({"q": "What is mitosis?", "a": "Cell division"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let card_id = card["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/v1/mastery?id={}", card_id),
        Some(&token_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));

    // The actual owner still has the card.
    let (_, bank) = send(&app, "GET", "/api/v1/mastery/all", Some(&token_a), None).await;
    assert_eq!(bank.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn bulk_clear_reports_exact_owner_count() {
    let app = test_app(vec![]).await;
    let token_a = token("user_a", "a@example.com");
    let token_b = token("user_b", "b@example.com");

    for i in 0..3 {
        send(
            &app,
            "POST",
            "/api/v1/mastery",
            Some(&token_a),
            Some(serde_json::json!({"q": format!("q{}", i), "a": "a"})),
        )
        .await;
    }
    send(
        &app,
        "POST",
        "/api/v1/mastery",
        Some(&token_b),
        Some(serde_json::json!({"q": "other", "a": "a"})),
    )
    .await;

    let (status, body) = send(&app, "DELETE", "/api/v1/mastery/all", Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"].as_u64(), Some(3));

    let (_, bank) = send(&app, "GET", "/api/v1/mastery/all", Some(&token_b), None).await;
    assert_eq!(bank.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_credentials_yield_json_401() {
    let app = test_app(vec![]).await;

    let (status, body) = send(&app, "GET", "/api/v1/notes", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn validation_runs_before_storage() {
    let app = test_app(vec![]).await;
    let token_a = token("user_a", "a@example.com");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/notes",
        Some(&token_a),
        Some(serde_json::json!({"title": "  ", "content": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, "DELETE", "/api/v1/notes", Some(&token_a), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn streamed_chat_equals_buffered_completion() {
    let chunks = vec!["Mito", "sis has ", "4 phases."];
    let expected: String = chunks.concat();
    let app = test_app(chunks).await;
    let token_a = token("user_a", "a@example.com");

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/chat")
        .header(header::AUTHORIZATION, format!("Bearer {}", token_a))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({"prompt": "explain mitosis"}).to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(String::from_utf8(bytes.to_vec()).unwrap(), expected);
}

#[tokio::test]
async fn chat_without_prompt_or_messages_is_rejected() {
    let app = test_app(vec!["unused"]).await;
    let token_a = token("user_a", "a@example.com");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/chat",
        Some(&token_a),
        Some(serde_json::json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn sync_recall_parses_fenced_output() {
    let app = test_app(vec![
        "```json\n[{\"q\":\"What is mitosis?\",\"a\":\"Cell division\"}]\n```",
    ])
    .await;
    let token_a = token("user_a", "a@example.com");

    // No notes yet: the endpoint answers 404, as JSON.
    let (status, body) = send(&app, "POST", "/api/v1/sync-recall", Some(&token_a), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    send(
        &app,
        "POST",
        "/api/v1/notes",
        Some(&token_a),
        Some(serde_json::json!({"title": "Biology", "content": "Mitosis has 4 phases"})),
    )
    .await;

    let (status, cards) = send(&app, "POST", "/api/v1/sync-recall", Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cards[0]["q"].as_str(), Some("What is mitosis?"));
    assert_eq!(cards[0]["a"].as_str(), Some("Cell division"));
}

#[tokio::test]
async fn sync_recall_failure_uses_fixed_error_code() {
    // Unparseable model output: same code as an upstream failure.
    let app = test_app(vec!["I'm sorry, I can't produce JSON today."]).await;
    let token_a = token("user_a", "a@example.com");

    send(
        &app,
        "POST",
        "/api/v1/notes",
        Some(&token_a),
        Some(serde_json::json!({"title": "Biology", "content": "Mitosis"})),
    )
    .await;

    let (status, body) = send(&app, "POST", "/api/v1/sync-recall", Some(&token_a), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"].as_str(), Some("AI_SYNC_FAILED"));
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn generate_title_trims_model_output() {
    let app = test_app(vec!["  Cell Division Basics \n"]).await;
    let token_a = token("user_a", "a@example.com");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/generate-title",
        Some(&token_a),
        Some(serde_json::json!({"content": "Mitosis has 4 phases ..."})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"].as_str(), Some("Cell Division Basics"));
}

#[tokio::test]
async fn rename_tool_round_trip() {
    let app = test_app(vec![]).await;
    let token_a = token("user_a", "a@example.com");
    let token_b = token("user_b", "b@example.com");

    let (status, saved) = send(
        &app,
        "POST",
        "/api/v1/save-tool",
        Some(&token_a),
        Some(serde_json::json!({
            "toolName": "Formula Sheet",
            "toolId": "formula-sheet",
            "input": "quadratics",
            "output": "x = ..."
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = saved["id"].as_str().unwrap().to_string();
    assert_eq!(saved["category"].as_str(), Some("General"));

    // Someone else cannot rename it.
    let (status, _) = send(
        &app,
        "PATCH",
        "/api/v1/rename-tool",
        Some(&token_b),
        Some(serde_json::json!({"id": id, "newName": "Stolen"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = send(
        &app,
        "PATCH",
        "/api/v1/rename-tool",
        Some(&token_a),
        Some(serde_json::json!({"id": id, "newName": "Quadratics Cheat Sheet"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["toolName"].as_str(), Some("Quadratics Cheat Sheet"));
    assert_eq!(updated["category"].as_str(), Some("General"));

    let (_, listed) = send(&app, "GET", "/api/v1/saved-tools", Some(&token_a), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn me_upserts_and_returns_profile() {
    let app = test_app(vec![]).await;
    let token_a = token("user_a", "ada@example.com");

    let (status, me) = send(&app, "GET", "/api/v1/me", Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["externalId"].as_str(), Some("user_a"));
    assert_eq!(me["email"].as_str(), Some("ada@example.com"));

    // Second call resolves to the same row.
    let (_, again) = send(&app, "GET", "/api/v1/me", Some(&token_a), None).await;
    assert_eq!(me["id"], again["id"]);
}

#[tokio::test]
async fn health_is_open_and_detailed_health_is_gated() {
    let app = test_app(vec![]).await;

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"].as_str(), Some("ok"));

    let (status, _) = send(&app, "GET", "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token_a = token("user_a", "a@example.com");
    let (status, body) = send(&app, "GET", "/api/v1/health", Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"].as_str(), Some("healthy"));
    assert_eq!(body["database"]["reachable"].as_bool(), Some(true));
}
