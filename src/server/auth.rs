//! Authentication and account endpoints: register, login, logout, identity,
//! organization switch, account deletion.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::identity::{authenticate, hash_password, verify_password, Role};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutPayload {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct SwitchPayload {
    pub organization_id: String,
}

/// Create the user, their owned organization, and an admin membership, then
/// issue a session scoped to the new organization.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<Json<serde_json::Value>> {
    let organization_id = Uuid::new_v4().to_string();
    let password_hash = hash_password(&payload.password)?;

    // conflict check happens inside create_user; nothing is inserted on 409
    let user = state.store.create_user(&payload.username, &payload.email, &password_hash, &organization_id)?;
    state
        .store
        .create_organization(&organization_id, &format!("{}'s Organization", user.username), user.id);
    state.store.add_membership(user.id, &organization_id, Role::Admin)?;

    let session = state.sessions.issue(user.id, &organization_id, Role::Admin);
    info!(target: "auth", "registered user={} org={}", user.username, organization_id);

    Ok(Json(json!({
        "message": "User registered successfully",
        "token": session.token,
        "user": {
            "id": user.id,
            "username": user.username,
            "email": user.email,
            "role": Role::Admin,
            "organization_id": organization_id,
        }
    })))
}

/// Validate the password digest, resolve the caller's role from their
/// membership in the primary organization, and issue a session.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<Json<serde_json::Value>> {
    let Some(user) = state.store.user_by_username(&payload.username) else {
        return Err(AppError::auth("invalid_credentials", "invalid credentials"));
    };
    if !verify_password(&user.password_hash, &payload.password) {
        return Err(AppError::auth("invalid_credentials", "invalid credentials"));
    }

    // membership in the primary org wins; otherwise the first membership;
    // otherwise viewer scoped to the primary org id
    let (organization_id, role) = match state.store.membership(user.id, &user.primary_organization_id) {
        Some(m) => (m.organization_id, m.role),
        None => state
            .store
            .memberships_for_user(user.id)
            .into_iter()
            .next()
            .map(|m| (m.organization_id, m.role))
            .unwrap_or_else(|| (user.primary_organization_id.clone(), Role::Viewer)),
    };

    let session = state.sessions.issue(user.id, &organization_id, role);
    info!(target: "auth", "login user={} org={}", user.username, organization_id);

    Ok(Json(json!({
        "message": "Login successful",
        "token": session.token,
        "user": {
            "id": user.id,
            "username": user.username,
            "email": user.email,
            "role": role,
            "organization_id": organization_id,
        }
    })))
}

/// Invalidate the supplied token. Always succeeds, including for tokens that
/// are already gone.
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<LogoutPayload>,
) -> Json<serde_json::Value> {
    state.sessions.invalidate(&payload.token);
    Json(json!({"message": "Logged out successfully"}))
}

/// Current identity plus the caller's organizations.
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<serde_json::Value>> {
    let session = authenticate(&state.sessions, &headers)?;
    let Some(user) = state.store.user(session.user_id) else {
        return Err(AppError::not_found("user_not_found", "user not found"));
    };

    let organizations: Vec<serde_json::Value> = state
        .store
        .memberships_for_user(user.id)
        .into_iter()
        .map(|m| {
            let org = state.store.organization(&m.organization_id);
            json!({
                "id": m.organization_id,
                "name": org.as_ref().map(|o| o.name.clone()),
                "role": m.role,
                "owner": org.map(|o| o.owner_id == user.id).unwrap_or(false),
            })
        })
        .collect();

    Ok(Json(json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "role": session.role,
        "organization_id": session.organization_id,
        "organizations": organizations,
    })))
}

/// Grouped cascade delete of the caller's account, owned organizations and
/// their rows, then invalidation of every live session of the caller.
pub async fn delete_account(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<serde_json::Value>> {
    let session = authenticate(&state.sessions, &headers)?;
    state.store.delete_account(session.user_id)?;
    let dropped = state.sessions.invalidate_user(session.user_id);
    info!(target: "auth", "account deleted user={} sessions_dropped={}", session.user_id, dropped);
    Ok(Json(json!({"message": "Account deleted successfully"})))
}

/// Re-scope the caller's live sessions to another organization. Fails closed:
/// without a membership in the target organization the session is unchanged.
pub async fn switch_organization(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SwitchPayload>,
) -> AppResult<Json<serde_json::Value>> {
    let session = authenticate(&state.sessions, &headers)?;
    let Some(membership) = state.store.membership(session.user_id, &payload.organization_id) else {
        return Err(AppError::forbidden("forbidden", "no membership in target organization"));
    };
    state
        .sessions
        .switch_active_organization(session.user_id, &membership.organization_id, membership.role);
    Ok(Json(json!({
        "message": "Organization switched",
        "organization_id": membership.organization_id,
        "role": membership.role,
    })))
}
