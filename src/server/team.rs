//! Membership management: list/add/remove team members and invite existing
//! accounts into the caller's organization. All admin-only.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::identity::{authenticate, hash_password, require_admin, Role};

use super::AppState;

fn default_role() -> String {
    "viewer".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateMemberPayload {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct InvitePayload {
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
}

pub async fn list(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Vec<serde_json::Value>>> {
    let session = authenticate(&state.sessions, &headers)?;
    require_admin(&session)?;
    let members = state
        .store
        .users_in_organization(&session.organization_id)
        .into_iter()
        .map(|(user, role)| {
            json!({
                "id": user.id,
                "username": user.username,
                "email": user.email,
                "role": role,
                "created_at": user.created_at,
            })
        })
        .collect();
    Ok(Json(members))
}

/// Create a fresh account inside the caller's organization. The role string
/// is validated before anything is inserted.
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateMemberPayload>,
) -> AppResult<Json<serde_json::Value>> {
    let session = authenticate(&state.sessions, &headers)?;
    require_admin(&session)?;
    let role: Role = payload.role.parse()?;

    let password_hash = hash_password(&payload.password)?;
    let member = state.store.create_user(
        &payload.username,
        &payload.email,
        &password_hash,
        &session.organization_id,
    )?;
    state.store.add_membership(member.id, &session.organization_id, role)?;
    info!(target: "team", "member created user={} org={} role={}", member.username, session.organization_id, role);

    Ok(Json(json!({
        "id": member.id,
        "username": member.username,
        "email": member.email,
        "role": role,
    })))
}

/// Remove a member of the caller's organization. Self-deletion goes through
/// account deletion instead.
pub async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let session = authenticate(&state.sessions, &headers)?;
    require_admin(&session)?;
    if user_id == session.user_id {
        return Err(AppError::user("self_delete", "cannot delete your own account"));
    }
    if state.store.membership(user_id, &session.organization_id).is_none() {
        return Err(AppError::not_found("user_not_found", "team member not found"));
    }
    state.store.delete_user(user_id)?;
    let dropped = state.sessions.invalidate_user(user_id);
    info!(target: "team", "member removed user={} org={} sessions_dropped={}", user_id, session.organization_id, dropped);
    Ok(Json(json!({"message": "Team member removed successfully"})))
}

/// Invite an existing account (looked up by email) into the caller's
/// organization. Duplicate membership is a conflict.
pub async fn invite(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<InvitePayload>,
) -> AppResult<Json<serde_json::Value>> {
    let session = authenticate(&state.sessions, &headers)?;
    require_admin(&session)?;
    let role: Role = payload.role.parse()?;

    let Some(user) = state.store.user_by_email(&payload.email) else {
        return Err(AppError::not_found("user_not_found", "no account with that email"));
    };
    let membership = state.store.add_membership(user.id, &session.organization_id, role)?;
    Ok(Json(json!({
        "message": "Member invited successfully",
        "user_id": user.id,
        "organization_id": membership.organization_id,
        "role": membership.role,
    })))
}
