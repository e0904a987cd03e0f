//!
//! prodtrack HTTP server
//! ---------------------
//! Axum-based HTTP API for the productivity tracker.
//!
//! Responsibilities:
//! - Bearer-token session auth (registration, login, logout, org switch).
//! - Tenant-scoped CRUD for employees, weekly scores, and team members.
//! - Report exports (xlsx, pdf) and SMTP relay of the HTML report.
//!
//! Every protected route passes through the authorization gate in
//! `identity::gate`; mutating routes additionally require the admin role.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::AppError;
use crate::identity::SessionRegistry;
use crate::store::SharedStore;

pub mod auth;
pub mod employees;
pub mod scores;
pub mod team;
pub mod export;

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(session_ttl: Duration) -> Self {
        Self {
            store: SharedStore::new(),
            sessions: Arc::new(SessionRegistry::with_ttl(session_ttl)),
        }
    }
}

/// HTTP mapping for the unified error model: status from `http_status()`,
/// body carrying the error code and message.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(serde_json::json!({
            "status": "error",
            "code": self.code_str(),
            "message": self.message(),
        }));
        (status, body).into_response()
    }
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({"status": "Backend running successfully"}))
}

/// Mount all routes over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/account", delete(auth::delete_account))
        .route("/organizations/switch", post(auth::switch_organization))
        .route("/employees", get(employees::list).post(employees::create))
        .route(
            "/employees/{id}",
            get(employees::get_one).put(employees::update).delete(employees::remove),
        )
        .route("/scores", get(scores::list).post(scores::create))
        .route("/scores/{id}", delete(scores::remove))
        .route("/team/members", get(team::list).post(team::create))
        .route("/team/members/{user_id}", delete(team::remove))
        .route("/team/invite", post(team::invite))
        .route("/export/excel/{week}", get(export::excel))
        .route("/export/pdf/{week}", get(export::pdf))
        .route("/email/report", post(export::email_report))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server on the given port with the given session TTL.
pub async fn run_with_port(http_port: u16, session_ttl_days: i64) -> anyhow::Result<()> {
    let ttl = Duration::from_secs(session_ttl_days.max(0) as u64 * 24 * 60 * 60);
    let state = AppState::new(ttl);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(target: "prodtrack", "HTTP API listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
