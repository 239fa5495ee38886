use std::sync::{Arc, OnceLock};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    Router,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::api;
use crate::core::{config::Settings, security, state::AppState};
use crate::db::types::UserRole;
use crate::services::identity::Identity;

const TEST_SECRET_KEY: &str = "test-secret";

pub(crate) struct TestContext {
    pub(crate) state: AppState,
    pub(crate) app: Router,
    _guard: OwnedMutexGuard<()>,
}

/// Serialises tests that touch process environment variables.
pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env() {
    std::env::set_var("QUIZ_ENV", "test");
    std::env::set_var("QUIZ_STRICT_CONFIG", "0");
    std::env::set_var("SECRET_KEY", TEST_SECRET_KEY);
    std::env::set_var("QUIZ_STORE_BACKEND", "memory");
    std::env::set_var("PROMETHEUS_ENABLED", "0");
    std::env::remove_var("QUIZ_MAX_PARTICIPANTS");
    std::env::remove_var("QUIZ_PORT");
    std::env::remove_var("API_V1_STR");
    std::env::remove_var("DATABASE_URL");
}

pub(crate) async fn setup_test_context() -> TestContext {
    let guard = env_lock().await;
    set_test_env();

    let settings = Settings::load().expect("settings");
    let state = crate::build_state(settings).await.expect("state");
    let app = api::router::router(state.clone());

    TestContext { state, app, _guard: guard }
}

pub(crate) fn teacher(user_id: &str) -> Identity {
    Identity::new(user_id, format!("Teacher {user_id}"), UserRole::Teacher)
}

pub(crate) fn student(user_id: &str) -> Identity {
    Identity::new(user_id, format!("Student {user_id}"), UserRole::Student)
}

pub(crate) fn admin(user_id: &str) -> Identity {
    Identity::new(user_id, format!("Admin {user_id}"), UserRole::Admin)
}

pub(crate) fn bearer_token(identity: &Identity, settings: &Settings) -> String {
    security::create_access_token(identity, settings, None).expect("token")
}

pub(crate) fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    if let Some(body) = body {
        let bytes = serde_json::to_vec(&body).expect("serialize body");
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .expect("request body")
    } else {
        builder.body(Body::empty()).expect("request body")
    }
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}
