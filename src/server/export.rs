//! Report export endpoints: streamed xlsx/pdf documents and SMTP relay of
//! the HTML report. Open to any role; tenant- and week-filtered.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::error::{AppError, AppResult};
use crate::identity::{authenticate, Session};
use crate::reports::{self, ScoreRow};

use super::AppState;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn default_smtp_server() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

#[derive(Debug, Deserialize)]
pub struct EmailReportPayload {
    pub week: String,
    pub recipient_email: String,
    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
}

/// Collect the caller's rows for a week, joined with employee names.
/// Empty weeks are a 404, matching the original surface.
fn rows_for_week(state: &AppState, session: &Session, week: &str) -> AppResult<Vec<ScoreRow>> {
    let scores = state.store.scores_for_week(&session.organization_id, week);
    if scores.is_empty() {
        return Err(AppError::not_found(
            "no_scores".to_string(),
            format!("No scores found for week {week}"),
        ));
    }
    let rows = scores
        .into_iter()
        .map(|score| {
            let employee_name = state
                .store
                .employee(&session.organization_id, score.employee_id)
                .map(|e| e.name)
                .unwrap_or_else(|_| "Unknown".to_string());
            ScoreRow {
                employee_id: score.employee_id,
                employee_name,
                task_completion: score.task_completion,
                speed: score.speed,
                professionalism: score.professionalism,
                activity: score.activity,
                productivity_score: score.productivity_score,
            }
        })
        .collect();
    Ok(rows)
}

fn attachment_response(bytes: Vec<u8>, content_type: &str, filename: &str) -> AppResult<Response> {
    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, format!("attachment; filename={filename}"))
        .body(Body::from(bytes))
        .map_err(|e| AppError::internal("response_error".to_string(), e.to_string()))
}

pub async fn excel(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(week): Path<String>,
) -> AppResult<Response> {
    let session = authenticate(&state.sessions, &headers)?;
    let rows = rows_for_week(&state, &session, &week)?;
    let bytes = reports::excel::render(&week, &rows)?;
    attachment_response(bytes, XLSX_CONTENT_TYPE, &format!("weekly_report_{week}.xlsx"))
}

pub async fn pdf(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(week): Path<String>,
) -> AppResult<Response> {
    let session = authenticate(&state.sessions, &headers)?;
    let rows = rows_for_week(&state, &session, &week)?;
    let bytes = reports::pdf::render(&week, &rows)?;
    attachment_response(bytes, "application/pdf", &format!("weekly_report_{week}.pdf"))
}

/// Render the HTML report and relay it over the caller-supplied SMTP
/// transport. Transport failures surface as a 500 with the transport error
/// message.
pub async fn email_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<EmailReportPayload>,
) -> AppResult<Json<serde_json::Value>> {
    let session = authenticate(&state.sessions, &headers)?;
    let rows = rows_for_week(&state, &session, &payload.week)?;
    let html = reports::email::render_html(&payload.week, &rows);

    let settings = reports::email::MailSettings {
        smtp_server: payload.smtp_server,
        smtp_port: payload.smtp_port,
        sender_email: payload.sender_email,
        sender_password: payload.sender_password,
    };
    let week = payload.week.clone();
    let recipient = payload.recipient_email.clone();

    // the SMTP transport is blocking; keep it off the async workers
    let sent = tokio::task::spawn_blocking(move || {
        reports::email::send_report(&settings, &recipient, &week, html)
    })
    .await
    .map_err(|e| AppError::internal("email_error".to_string(), e.to_string()))?;

    if let Err(e) = sent {
        error!(target: "export", "email relay failed: {e}");
        return Err(AppError::internal("email_error".to_string(), format!("Error sending email: {e}")));
    }

    info!(target: "export", "report emailed week={} org={}", payload.week, session.organization_id);
    Ok(Json(json!({
        "message": format!("Report emailed successfully to {}", payload.recipient_email)
    })))
}
