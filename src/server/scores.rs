//! Weekly score endpoints: admin-only create/delete, any role may read.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppResult;
use crate::identity::{authenticate, require_admin};
use crate::scoring::calculate_productivity;
use crate::store::WeeklyScore;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateScorePayload {
    pub employee_id: i64,
    pub week: String,
    pub task_completion: f64,
    pub speed: f64,
    pub professionalism: f64,
    pub activity: f64,
}

/// Record a weekly score. The employee must exist inside the caller's
/// organization; duplicates for the same (employee, week) accumulate.
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateScorePayload>,
) -> AppResult<Json<WeeklyScore>> {
    let session = authenticate(&state.sessions, &headers)?;
    require_admin(&session)?;
    // 404 when the employee is absent or belongs to another tenant
    state.store.employee(&session.organization_id, payload.employee_id)?;

    let productivity = calculate_productivity(
        payload.task_completion,
        payload.speed,
        payload.professionalism,
        payload.activity,
    );
    let score = state.store.add_score(
        &session.organization_id,
        payload.employee_id,
        &payload.week,
        payload.task_completion,
        payload.speed,
        payload.professionalism,
        payload.activity,
        productivity,
    );
    Ok(Json(score))
}

pub async fn list(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Vec<WeeklyScore>>> {
    let session = authenticate(&state.sessions, &headers)?;
    Ok(Json(state.store.scores(&session.organization_id)))
}

pub async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let session = authenticate(&state.sessions, &headers)?;
    require_admin(&session)?;
    state.store.delete_score(&session.organization_id, id)?;
    Ok(Json(json!({"message": "Score deleted successfully"})))
}
