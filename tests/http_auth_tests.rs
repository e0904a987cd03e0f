//! Auth surface integration tests: registration, login, logout, expiry,
//! organization switching, and role enforcement, exercised through the
//! real router.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use prodtrack::server::{router, AppState};

fn app() -> Router {
    router(AppState::new(Duration::from_secs(7 * 24 * 60 * 60)))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let bytes = resp.into_body().collect().await.expect("body").to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn post_json_auth(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get_auth(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn register(app: &Router, username: &str) -> (String, Value) {
    let (status, body) = send(
        app,
        post_json(
            "/auth/register",
            json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "correct horse",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    let token = body["token"].as_str().expect("token").to_string();
    (token, body)
}

#[tokio::test]
async fn register_then_me_round_trips_identity() {
    let app = app();
    let (token, body) = register(&app, "alice").await;
    assert_eq!(body["user"]["role"], "admin");

    let (status, me) = send(&app, get_auth("/auth/me", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
    assert_eq!(me["role"], "admin");
    assert_eq!(me["organization_id"], body["user"]["organization_id"]);
    assert_eq!(me["organizations"].as_array().unwrap().len(), 1);
    assert_eq!(me["organizations"][0]["owner"], true);
}

#[tokio::test]
async fn duplicate_registration_conflicts_and_original_still_logs_in() {
    let app = app();
    register(&app, "alice").await;

    let (status, body) = send(
        &app,
        post_json(
            "/auth/register",
            json!({"username": "alice", "email": "alice2@example.com", "password": "x"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (status, _) = send(
        &app,
        post_json("/auth/login", json!({"username": "alice", "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = app();
    register(&app, "alice").await;

    let (status, _) = send(
        &app,
        post_json("/auth/login", json!({"username": "alice", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        post_json("/auth/login", json!({"username": "nobody", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_invalidates_the_token() {
    let app = app();
    let (token, _) = register(&app, "alice").await;

    let (status, _) = send(&app, post_json("/auth/logout", json!({"token": token}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get_auth("/auth/me", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "session_expired");

    // logging out again is still a 200
    let (status, _) = send(&app, post_json("/auth/logout", json!({"token": "gone"}))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_authorization_header_is_401() {
    let app = app();
    let req = Request::builder().method("GET").uri("/auth/me").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthenticated");
}

#[tokio::test]
async fn expired_sessions_are_rejected_and_stay_rejected() {
    // zero TTL: every issued session is already lapsed
    let app = router(AppState::new(Duration::ZERO));
    let (token, _) = register(&app, "alice").await;

    for _ in 0..2 {
        let (status, body) = send(&app, get_auth("/auth/me", &token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "session_expired");
    }
}

#[tokio::test]
async fn viewer_role_cannot_mutate() {
    let app = app();
    let (admin_token, _) = register(&app, "alice").await;

    let (status, _) = send(
        &app,
        post_json_auth(
            "/team/members",
            &admin_token,
            json!({"username": "bob", "email": "bob@example.com", "password": "pw"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, login) = send(
        &app,
        post_json("/auth/login", json!({"username": "bob", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["user"]["role"], "viewer");
    let bob_token = login["token"].as_str().unwrap();

    // reads are open to any role
    let (status, _) = send(&app, get_auth("/employees", bob_token)).await;
    assert_eq!(status, StatusCode::OK);

    // mutation is not
    let (status, body) = send(
        &app,
        post_json_auth(
            "/employees",
            bob_token,
            json!({"name": "Aarav Sharma", "department": "Engineering", "role": "Backend Developer"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
}

#[tokio::test]
async fn team_member_creation_validates_the_role_string() {
    let app = app();
    let (token, _) = register(&app, "alice").await;

    let (status, body) = send(
        &app,
        post_json_auth(
            "/team/members",
            &token,
            json!({"username": "eve", "email": "eve@example.com", "password": "pw", "role": "owner"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_role");

    // nothing was inserted for the rejected payload
    let (status, _) = send(
        &app,
        post_json("/auth/login", json!({"username": "eve", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn switch_organization_fails_closed_without_membership() {
    let app = app();
    let (alice_token, alice) = register(&app, "alice").await;
    let (bob_token, bob) = register(&app, "bob").await;
    let alice_org = alice["user"]["organization_id"].as_str().unwrap();
    let bob_org = bob["user"]["organization_id"].as_str().unwrap();

    // bob has no membership in alice's org
    let (status, _) = send(
        &app,
        post_json_auth("/organizations/switch", &bob_token, json!({"organization_id": alice_org})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // scope unchanged after the failed switch
    let (_, me) = send(&app, get_auth("/auth/me", &bob_token)).await;
    assert_eq!(me["organization_id"], bob_org);

    // invite bob, then the switch goes through with the invited role
    let (status, _) = send(
        &app,
        post_json_auth("/team/invite", &alice_token, json!({"email": "bob@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        post_json_auth("/organizations/switch", &bob_token, json!({"organization_id": alice_org})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "viewer");

    let (_, me) = send(&app, get_auth("/auth/me", &bob_token)).await;
    assert_eq!(me["organization_id"], alice_org);
    assert_eq!(me["role"], "viewer");
}

#[tokio::test]
async fn duplicate_invite_conflicts() {
    let app = app();
    let (alice_token, _) = register(&app, "alice").await;
    register(&app, "bob").await;

    let invite = json!({"email": "bob@example.com", "role": "admin"});
    let (status, _) = send(&app, post_json_auth("/team/invite", &alice_token, invite.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, post_json_auth("/team/invite", &alice_token, invite)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "duplicate_membership");
}

#[tokio::test]
async fn account_deletion_tears_down_sessions_and_rows() {
    let app = app();
    let (token, _) = register(&app, "alice").await;

    let req = Request::builder()
        .method("DELETE")
        .uri("/auth/account")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    // the session is gone and so are the credentials
    let (status, _) = send(&app, get_auth("/auth/me", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(
        &app,
        post_json("/auth/login", json!({"username": "alice", "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
