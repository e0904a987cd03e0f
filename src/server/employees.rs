//! Tenant-scoped employee CRUD. Reads are open to any role; mutation is
//! admin-only.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppResult;
use crate::identity::{authenticate, require_admin};
use crate::store::{Employee, EmployeeUpdate};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateEmployeePayload {
    pub name: String,
    pub department: String,
    pub role: String,
}

pub async fn list(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Vec<Employee>>> {
    let session = authenticate(&state.sessions, &headers)?;
    Ok(Json(state.store.employees(&session.organization_id)))
}

pub async fn get_one(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<Json<Employee>> {
    let session = authenticate(&state.sessions, &headers)?;
    Ok(Json(state.store.employee(&session.organization_id, id)?))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateEmployeePayload>,
) -> AppResult<Json<Employee>> {
    let session = authenticate(&state.sessions, &headers)?;
    require_admin(&session)?;
    let employee = state.store.create_employee(
        &session.organization_id,
        &payload.name,
        &payload.department,
        &payload.role,
    );
    Ok(Json(employee))
}

pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(payload): Json<EmployeeUpdate>,
) -> AppResult<Json<Employee>> {
    let session = authenticate(&state.sessions, &headers)?;
    require_admin(&session)?;
    Ok(Json(state.store.update_employee(&session.organization_id, id, payload)?))
}

/// Deletes the employee and cascades their weekly score rows.
pub async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let session = authenticate(&state.sessions, &headers)?;
    require_admin(&session)?;
    state.store.delete_employee(&session.organization_id, id)?;
    Ok(Json(json!({"message": "Employee deleted successfully"})))
}
