use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentStudent, CurrentUser};
use crate::core::state::AppState;
use crate::schemas::practice::{
    PracticeQuizCreate, PracticeQuizResponse, PracticeQuizSummaryResponse,
    PracticeResultResponse, PracticeSubmitRequest, PracticeSubmitResponse,
};
use crate::schemas::quiz::into_questions;
use crate::services::practice::PracticeDraft;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_practice_quizzes).post(create_practice_quiz))
        .route("/results/me", get(my_results))
        .route("/:quiz_id", get(get_practice_quiz))
        .route("/:quiz_id/submit", post(submit_practice_quiz))
}

async fn create_practice_quiz(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<PracticeQuizCreate>,
) -> Result<(StatusCode, Json<PracticeQuizResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let draft = PracticeDraft {
        title: payload.title,
        category: payload.category,
        difficulty: payload.difficulty,
        questions: into_questions(payload.questions).map_err(ApiError::BadRequest)?,
    };
    let quiz = state.practice().create(&admin, draft).await?;

    Ok((StatusCode::CREATED, Json(PracticeQuizResponse::with_answers(&quiz))))
}

async fn list_practice_quizzes(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<PracticeQuizSummaryResponse>>, ApiError> {
    let quizzes = state.practice().list().await?;
    Ok(Json(quizzes.iter().map(PracticeQuizSummaryResponse::from_db).collect()))
}

async fn get_practice_quiz(
    Path(quiz_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<PracticeQuizResponse>, ApiError> {
    let quiz = state.practice().get(&quiz_id).await?;
    Ok(Json(PracticeQuizResponse::public(&quiz)))
}

async fn submit_practice_quiz(
    Path(quiz_id): Path<String>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<PracticeSubmitRequest>,
) -> Result<(StatusCode, Json<PracticeSubmitResponse>), ApiError> {
    let submission = state.practice().submit(&quiz_id, &student, &payload.answers).await?;
    Ok((StatusCode::CREATED, Json(submission.into())))
}

async fn my_results(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<PracticeResultResponse>>, ApiError> {
    let results = state.practice().list_results(&student).await?;
    Ok(Json(results.into_iter().map(PracticeResultResponse::from_db).collect()))
}
