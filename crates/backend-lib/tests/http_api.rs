//! End-to-end tests driving the router the way a browser client would:
//! JSON bodies in, JSON bodies out, session carried in a cookie.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use backend_lib::{
    auth::{AuthService, Session},
    config::Settings,
    router::create_router,
    storage::FlatFileStore,
    AppState,
};
use recipeshare_common::{ErrorBody, LoginRequest, RecipeCreateRequest, SignupRequest};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app(dir: &Path) -> Router {
    let settings = Settings {
        data_dir: dir.to_path_buf(),
        ..Settings::default()
    };
    let storage = FlatFileStore::new(dir).unwrap();
    create_router(Arc::new(AppState::new(storage, settings)))
}

/// Issue one request and return (status, session cookie if set, JSON body)
async fn send(
    app: &Router,
    method: &str,
    path: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, set_cookie, json)
}

/// Decode a failure body through the shared error envelope
fn error_message(body: &Value) -> String {
    let envelope: ErrorBody = serde_json::from_value(body.clone()).unwrap();
    envelope.error
}

async fn signup(app: &Router, username: &str, password: &str) -> String {
    let request = SignupRequest {
        username: username.to_string(),
        password: password.to_string(),
        image_url: None,
        bio: None,
    };
    let (status, cookie, _) = send(
        app,
        "POST",
        "/signup",
        None,
        Some(serde_json::to_value(request).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    cookie.expect("signup should open a session")
}

const GOOD_INSTRUCTIONS: &str =
    "Dice the onions, sweat them in butter, then simmer everything for an hour.";

#[tokio::test]
async fn signup_validates_before_persisting() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    // missing password -> 400
    let (status, _, body) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({"username": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "Missing required fields");

    // username too short -> 422, and nothing was persisted
    let (status, cookie, body) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({"username": "al", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(cookie.is_none());
    assert_eq!(
        error_message(&body),
        "Username must be at least 3 characters long."
    );

    let (status, _, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"username": "al", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_returns_user_without_password_material() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let (status, cookie, body) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({
            "username": "alice",
            "password": "secret",
            "image_url": "https://example.com/a.png",
            "bio": "I cook."
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["image_url"], "https://example.com/a.png");
    assert_eq!(body["bio"], "I cook.");
    let object = body.as_object().unwrap();
    assert!(!object.keys().any(|k| k.contains("password")));

    // the session opened by signup is immediately usable
    let cookie = cookie.unwrap();
    let (status, _, session_body) =
        send(&app, "GET", "/check_session", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session_body["id"], body["id"]);
}

#[tokio::test]
async fn duplicate_username_conflicts_and_first_account_survives() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let cookie = signup(&app, "alice", "secret").await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({"username": "alice", "password": "other"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_message(&body), "Username already exists");

    // the first signup is intact and still logged in
    let (status, _, body) = send(&app, "GET", "/check_session", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());
    signup(&app, "alice", "secret").await;

    // missing fields -> 400
    let (status, _, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"username": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing username or password");

    // wrong password and unknown username are indistinguishable
    let (status, _, wrong_password) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"username": "alice", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, unknown_user) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"username": "mallory", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password["error"], unknown_user["error"]);
}

#[tokio::test]
async fn session_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());
    signup(&app, "alice", "secret").await;

    let request = LoginRequest {
        username: "alice".to_string(),
        password: "secret".to_string(),
    };
    let (status, cookie, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(serde_json::to_value(request).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let cookie = cookie.unwrap();
    let user_id = body["id"].clone();

    let (status, _, body) = send(&app, "GET", "/check_session", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user_id);

    let (status, cleared, body) = send(&app, "DELETE", "/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(cleared.as_deref(), Some("session="));
    assert_eq!(body, Value::Null);

    // the session is gone now
    let (status, _, _) = send(&app, "GET", "/check_session", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // and logging out again is an error, not a no-op
    let (status, _, _) = send(&app, "DELETE", "/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn anonymous_requests_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    for (method, path) in [
        ("GET", "/check_session"),
        ("DELETE", "/logout"),
        ("GET", "/recipes"),
    ] {
        let (status, _, body) = send(&app, method, path, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {path}");
        assert_eq!(body["error"], "Unauthorized");
    }

    // a made-up token is just as anonymous as no token
    let (status, _, _) = send(
        &app,
        "GET",
        "/recipes",
        Some("session=forged-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(
        &app,
        "POST",
        "/recipes",
        None,
        Some(json!({
            "title": "Stew",
            "instructions": GOOD_INSTRUCTIONS,
            "minutes_to_complete": 60
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn recipe_creation_enforces_field_rules() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());
    let cookie = signup(&app, "alice", "secret").await;

    // missing field -> 400
    let (status, _, _) = send(
        &app,
        "POST",
        "/recipes",
        Some(&cookie),
        Some(json!({"title": "Stew", "instructions": GOOD_INSTRUCTIONS})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 49-character instructions -> 422
    let (status, _, body) = send(
        &app,
        "POST",
        "/recipes",
        Some(&cookie),
        Some(json!({
            "title": "Stew",
            "instructions": "x".repeat(49),
            "minutes_to_complete": 30
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["error"],
        "Instructions must be at least 50 characters long."
    );

    // zero minutes -> 422
    let (status, _, _) = send(
        &app,
        "POST",
        "/recipes",
        Some(&cookie),
        Some(json!({
            "title": "Stew",
            "instructions": "x".repeat(50),
            "minutes_to_complete": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // fractional minutes are not a positive integer
    let (status, _, _) = send(
        &app,
        "POST",
        "/recipes",
        Some(&cookie),
        Some(json!({
            "title": "Stew",
            "instructions": "x".repeat(50),
            "minutes_to_complete": 30.5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // none of the rejected recipes were persisted
    let (status, _, body) = send(&app, "GET", "/recipes", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);

    // 50-character instructions and positive minutes -> 201
    let request = RecipeCreateRequest {
        title: "Stew".to_string(),
        instructions: "x".repeat(50),
        minutes_to_complete: 30,
    };
    let (status, _, body) = send(
        &app,
        "POST",
        "/recipes",
        Some(&cookie),
        Some(serde_json::to_value(request).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Stew");
    assert_eq!(body["minutes_to_complete"], 30);
    // the embedded owner has public fields only, and no recipe list
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"].get("recipes").is_none());
    assert!(!body["user"]
        .as_object()
        .unwrap()
        .keys()
        .any(|k| k.contains("password")));
}

/// Auth stub that recognizes one fixed token and binds it to a user id no
/// storage row backs, something the real service can only produce when a
/// user disappears underneath a live session.
struct GhostSessionAuth {
    token: &'static str,
    user_id: i64,
}

#[async_trait]
impl AuthService for GhostSessionAuth {
    async fn begin_session(&self, _user_id: i64) -> String {
        self.token.to_string()
    }

    async fn get_session(&self, token: &str) -> Option<Session> {
        let now = SystemTime::now();
        (token == self.token).then(|| Session {
            user_id: self.user_id,
            created_at: now,
            expires_at: now + Duration::from_secs(60),
        })
    }

    async fn end_session(&self, token: &str) -> bool {
        token == self.token
    }
}

#[tokio::test]
async fn session_outliving_its_user() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        data_dir: dir.path().to_path_buf(),
        ..Settings::default()
    };
    let storage = FlatFileStore::new(dir.path()).unwrap();
    let state = AppState {
        auth: Arc::new(GhostSessionAuth {
            token: "ghost",
            user_id: 9999,
        }),
        settings: Arc::new(settings),
        storage,
    };
    let app = create_router(Arc::new(state));

    // check_session names the dangling user explicitly
    let (status, _, body) =
        send(&app, "GET", "/check_session", Some("session=ghost"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), "User not found");

    // every other authenticated operation treats the session as anonymous
    let (status, _, body) = send(&app, "GET", "/recipes", Some("session=ghost"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&body), "Unauthorized");

    let (status, _, _) = send(
        &app,
        "POST",
        "/recipes",
        Some("session=ghost"),
        Some(json!({
            "title": "Stew",
            "instructions": GOOD_INSTRUCTIONS,
            "minutes_to_complete": 60
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn recipe_listing_is_scoped_to_the_session_owner() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let alice = signup(&app, "alice", "secret").await;
    let bob = signup(&app, "bob", "hunter2").await;

    for (cookie, title) in [(&alice, "Stew"), (&bob, "Soup"), (&alice, "Bread")] {
        let request = RecipeCreateRequest {
            title: title.to_string(),
            instructions: GOOD_INSTRUCTIONS.to_string(),
            minutes_to_complete: 45,
        };
        let (status, _, _) = send(
            &app,
            "POST",
            "/recipes",
            Some(cookie),
            Some(serde_json::to_value(request).unwrap()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _, body) = send(&app, "GET", "/recipes", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Stew", "Bread"]);

    let (status, _, body) = send(&app, "GET", "/recipes", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    let recipes = body.as_array().unwrap();
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0]["title"], "Soup");
    assert_eq!(recipes[0]["user"]["username"], "bob");
}
