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

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod llm;
pub mod repo;

use anyhow::Result;
use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Extension, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::AppState;
use auth::{auth_middleware, Authenticator, BearerTokenAuth, NoAuth};
use config::ServerConfig;
use llm::CompletionRelay;
use repo::{
    SqliteMasteryRepository, SqliteNoteRepository, SqliteStudentRepository,
    SqliteToolResultRepository,
};

/// Assemble the application router. Split out of [`run_server`] so tests can
/// drive the full stack without binding a socket.
pub fn app(
    state: AppState,
    authenticator: Arc<dyn Authenticator>,
    config: &ServerConfig,
) -> Router {
    // Streaming endpoints carry the one app-level execution bound.
    let streaming_routes = Router::new()
        .route("/api/v1/chat", post(api::chat_completion))
        .route("/api/v1/story", post(api::story_completion))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.stream_timeout_secs,
        )));

    let authed_routes = Router::new()
        .route("/api/v1/me", get(api::get_me))
        .route("/api/v1/generate-title", post(api::generate_title))
        .route("/api/v1/sync-recall", post(api::sync_recall))
        .route(
            "/api/v1/notes",
            get(api::list_notes)
                .post(api::create_note)
                .patch(api::update_note)
                .delete(api::delete_note),
        )
        .route(
            "/api/v1/mastery",
            post(api::create_card).delete(api::delete_card),
        )
        .route(
            "/api/v1/mastery/all",
            get(api::list_mastery).delete(api::clear_mastery),
        )
        .route(
            "/api/v1/save-tool",
            post(api::save_tool).delete(api::delete_tool),
        )
        .route("/api/v1/saved-tools", get(api::list_saved_tools))
        .route("/api/v1/rename-tool", patch(api::rename_tool))
        .route("/api/v1/health", get(api::health_check_detailed))
        .merge(streaming_routes)
        .layer(axum_middleware::from_fn(auth_middleware))
        .layer(Extension(authenticator));

    Router::new()
        .route("/health", get(api::health_check))
        .merge(authed_routes)
        .with_state(state)
        .layer(if config.server.enable_cors {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            CorsLayer::new()
        })
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studyhall_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Studyhall server");
    config.validate()?;

    // One pool for the whole process, built here and injected everywhere.
    tracing::info!("Opening database: {}", config.database.url);
    let pool = db::connect(&config.database.url, config.database.max_connections).await?;

    let relay = match CompletionRelay::from_config(&config.llm) {
        Ok(relay) => {
            tracing::info!("Completion relay initialized");
            Some(Arc::new(relay))
        }
        Err(e) => {
            tracing::warn!(
                "Completion relay disabled: {}. AI endpoints will report an error.",
                e
            );
            None
        }
    };

    let state = AppState {
        students: Arc::new(SqliteStudentRepository::new(pool.clone())),
        notes: Arc::new(SqliteNoteRepository::new(pool.clone())),
        mastery: Arc::new(SqliteMasteryRepository::new(pool.clone())),
        tools: Arc::new(SqliteToolResultRepository::new(pool.clone())),
        relay,
        pool,
    };

    let authenticator: Arc<dyn Authenticator> = if config.auth.enabled {
        let secret = config
            .auth
            .jwt_secret
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Authentication enabled but no JWT secret configured"))?;
        tracing::info!("JWT authentication enabled");
        Arc::new(BearerTokenAuth::new(secret))
    } else {
        let allow_noauth = std::env::var("STUDYHALL_ALLOW_NOAUTH")
            .map(|v| {
                let v = v.to_lowercase();
                v == "true" || v == "1"
            })
            .unwrap_or(false);

        let is_localhost = config.server.listen_addr.starts_with("127.0.0.1")
            || config.server.listen_addr.contains("localhost");

        if !allow_noauth && !is_localhost {
            anyhow::bail!(
                "Authentication is disabled on non-localhost address '{}'. \
                 Bind to localhost, set STUDYHALL_ALLOW_NOAUTH=true, or enable authentication.",
                config.server.listen_addr
            );
        }

        tracing::warn!(
            "Authentication disabled; every request resolves to the local development identity. \
             Do not deploy this configuration."
        );
        Arc::new(NoAuth::new("dev-student"))
    };

    let addr = config.socket_addr()?;
    let app = app(state, authenticator, &config);

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
    }
}
