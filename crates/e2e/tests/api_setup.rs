//! Setup-phase tests against an in-process fake of the blog backend

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use blogapp_e2e::api::{admin, second_user, ApiClient, NewUser};
use blogapp_e2e::runner::prepare_backend;
use blogapp_e2e::suite::{login_form_is_shown, only_the_creator_sees_the_remove_button};
use blogapp_e2e::E2eError;

#[derive(Default)]
struct Backend {
    calls: Vec<String>,
    users: HashMap<String, NewUser>,
}

type Shared = Arc<Mutex<Backend>>;

async fn reset(State(backend): State<Shared>) -> StatusCode {
    let mut backend = backend.lock().unwrap();
    backend.calls.push("reset".to_string());
    backend.users.clear();
    StatusCode::NO_CONTENT
}

async fn create_user(
    State(backend): State<Shared>,
    Json(user): Json<NewUser>,
) -> (StatusCode, String) {
    let mut backend = backend.lock().unwrap();
    backend.calls.push(format!("user:{}", user.username));
    if backend.users.contains_key(&user.username) {
        return (
            StatusCode::BAD_REQUEST,
            r#"{"error":"expected `username` to be unique"}"#.to_string(),
        );
    }
    backend.users.insert(user.username.clone(), user);
    (StatusCode::CREATED, String::new())
}

async fn start(with_reset: bool) -> (ApiClient, Shared) {
    let backend: Shared = Arc::new(Mutex::new(Backend::default()));
    let mut router = Router::new().route("/api/users", post(create_user));
    if with_reset {
        router = router.route("/api/testing/reset", post(reset));
    }
    let app = router.with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = ApiClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    (client, backend)
}

#[tokio::test]
async fn test_reset_then_seed_admin() {
    let (api, backend) = start(true).await;

    prepare_backend(&api, &login_form_is_shown()).await.unwrap();

    let backend = backend.lock().unwrap();
    assert_eq!(backend.calls, vec!["reset", "user:admin"]);
    assert_eq!(backend.users["admin"], admin());
}

#[tokio::test]
async fn test_reset_isolates_scenarios() {
    let (api, backend) = start(true).await;
    let scenario = only_the_creator_sees_the_remove_button();

    // Same scenario twice: without the reset the second seeding would collide.
    prepare_backend(&api, &scenario).await.unwrap();
    prepare_backend(&api, &scenario).await.unwrap();

    let backend = backend.lock().unwrap();
    assert_eq!(backend.users.len(), 2);
    assert_eq!(backend.users["tester"], second_user());
    assert_eq!(
        backend.calls,
        vec!["reset", "user:admin", "user:tester", "reset", "user:admin", "user:tester"]
    );
}

#[tokio::test]
async fn test_duplicate_username_is_a_setup_error() {
    let (api, _backend) = start(true).await;

    api.create_user(&admin()).await.unwrap();
    let err = api.create_user(&admin()).await.unwrap_err();

    match err {
        E2eError::Setup { endpoint, status, body } => {
            assert_eq!(endpoint, "/api/users");
            assert_eq!(status, 400);
            assert!(body.contains("unique"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_missing_reset_endpoint_aborts_before_seeding() {
    let (api, backend) = start(false).await;

    let err = prepare_backend(&api, &login_form_is_shown()).await.unwrap_err();
    assert!(matches!(err, E2eError::Setup { status: 404, .. }));
    assert!(backend.lock().unwrap().calls.is_empty());
}
