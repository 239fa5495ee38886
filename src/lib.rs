pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::Context;
use time::Duration;

use crate::core::config::{Settings, StoreBackend};
use crate::core::{security, state::AppState, telemetry};
use crate::db::types::UserRole;
use crate::services::identity::Identity;
use crate::services::live_quiz::{LiveQuizService, MemoryLiveQuizStore, PgLiveQuizStore};
use crate::services::practice::{MemoryPracticeQuizStore, PgPracticeQuizStore, PracticeService};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let state = build_state(settings).await?;
    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        store = state.settings().quiz().store_backend.as_str(),
        "ClassQuiz API listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await?;

    Ok(())
}

/// Wires the quiz services to the configured storage backend.
pub(crate) async fn build_state(settings: Settings) -> anyhow::Result<AppState> {
    let quiz_settings = settings.quiz().clone();

    match quiz_settings.store_backend {
        StoreBackend::Postgres => {
            let pool = db::connect(settings.database())
                .await
                .context("Failed to connect to database")?;
            db::migrate(&pool).await.context("Failed to run migrations")?;

            let quizzes = LiveQuizService::new(
                Arc::new(PgLiveQuizStore::new(pool.clone())),
                quiz_settings.clone(),
            );
            let practice = PracticeService::new(
                Arc::new(PgPracticeQuizStore::new(pool.clone())),
                quiz_settings,
            );
            Ok(AppState::new(settings, Some(pool), quizzes, practice))
        }
        StoreBackend::Memory => {
            tracing::warn!("Quiz state is kept in memory and will not survive a restart");
            let quizzes =
                LiveQuizService::new(Arc::new(MemoryLiveQuizStore::new()), quiz_settings.clone());
            let practice =
                PracticeService::new(Arc::new(MemoryPracticeQuizStore::new()), quiz_settings);
            Ok(AppState::new(settings, None, quizzes, practice))
        }
    }
}

/// Mints a bearer token signed with the configured secret, for local testing
/// against a running server.
pub fn issue_dev_token(
    user_id: &str,
    display_name: &str,
    role: &str,
    expires_in_minutes: Option<i64>,
) -> anyhow::Result<String> {
    dotenvy::dotenv().ok();
    let settings = Settings::load()?;

    let role = match role.trim().to_ascii_lowercase().as_str() {
        "student" => UserRole::Student,
        "teacher" => UserRole::Teacher,
        "admin" => UserRole::Admin,
        other => anyhow::bail!("unknown role '{other}' (expected student, teacher or admin)"),
    };

    let identity = Identity::new(user_id, display_name, role);
    let expires_in = expires_in_minutes.map(Duration::minutes);
    Ok(security::create_access_token(&identity, &settings, expires_in)?)
}
