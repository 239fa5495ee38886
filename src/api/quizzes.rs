use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentStudent, CurrentTeacher, CurrentUser};
use crate::core::state::AppState;
use crate::schemas::quiz::{
    into_questions, JoinQuizRequest, JoinQuizResponse, LeaderboardResponse, QuizCreate,
    QuizHostResponse, QuizSummaryResponse, RoomResponse, SessionResponse, StatsResponse,
    SubmitAnswerRequest, SubmitAnswerResponse,
};
use crate::services::identity::Identity;
use crate::services::live_quiz::{HostView, QuizDraft, Transition};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_quizzes).post(create_quiz))
        .route("/join", post(join_quiz))
        .route("/:quiz_id", get(host_view))
        .route("/:quiz_id/room", get(room_view))
        .route("/:quiz_id/start", post(start_quiz))
        .route("/:quiz_id/pause", post(pause_quiz))
        .route("/:quiz_id/resume", post(resume_quiz))
        .route("/:quiz_id/stop", post(stop_quiz))
        .route("/:quiz_id/advance", post(advance_quiz))
        .route("/:quiz_id/answers", post(submit_answer))
        .route("/:quiz_id/stats", get(quiz_stats))
        .route("/:quiz_id/leaderboard", get(quiz_leaderboard))
}

async fn create_quiz(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<QuizCreate>,
) -> Result<(StatusCode, Json<QuizHostResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let draft = QuizDraft {
        title: payload.title,
        questions: into_questions(payload.questions).map_err(ApiError::BadRequest)?,
        max_participants: payload.max_participants,
        question_time_seconds: payload.question_time_seconds,
    };
    let quiz = state.quizzes().create(&teacher, draft).await?;
    let view = HostView { quiz, participants: Vec::new() };

    Ok((StatusCode::CREATED, Json(QuizHostResponse::from_view(&view))))
}

async fn list_quizzes(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<QuizSummaryResponse>>, ApiError> {
    let quizzes = state.quizzes().list_hosted(&teacher).await?;
    Ok(Json(quizzes.iter().map(QuizSummaryResponse::from_db).collect()))
}

async fn join_quiz(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<JoinQuizRequest>,
) -> Result<Json<JoinQuizResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let outcome = state.quizzes().join(&payload.code, &student).await?;
    Ok(Json(JoinQuizResponse::from_outcome(outcome)))
}

async fn host_view(
    Path(quiz_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<QuizHostResponse>, ApiError> {
    let view = state.quizzes().host_view(&quiz_id, &user).await?;
    Ok(Json(QuizHostResponse::from_view(&view)))
}

async fn room_view(
    Path(quiz_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<RoomResponse>, ApiError> {
    let view = state.quizzes().participant_view(&quiz_id, &user).await?;
    Ok(Json(RoomResponse::from_view(&view)))
}

async fn apply_transition(
    state: &AppState,
    quiz_id: &str,
    user: &Identity,
    transition: Transition,
) -> Result<Json<SessionResponse>, ApiError> {
    let quiz = state.quizzes().transition(quiz_id, user, transition).await?;
    Ok(Json(SessionResponse::from_db(&quiz)))
}

async fn start_quiz(
    Path(quiz_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    apply_transition(&state, &quiz_id, &user, Transition::Start).await
}

async fn pause_quiz(
    Path(quiz_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    apply_transition(&state, &quiz_id, &user, Transition::Pause).await
}

async fn resume_quiz(
    Path(quiz_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    apply_transition(&state, &quiz_id, &user, Transition::Resume).await
}

async fn stop_quiz(
    Path(quiz_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    apply_transition(&state, &quiz_id, &user, Transition::Stop).await
}

async fn advance_quiz(
    Path(quiz_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    apply_transition(&state, &quiz_id, &user, Transition::Advance).await
}

async fn submit_answer(
    Path(quiz_id): Path<String>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, ApiError> {
    let outcome = state
        .quizzes()
        .submit(&quiz_id, &student, payload.question_index, payload.chosen_option)
        .await?;
    Ok(Json(outcome.into()))
}

async fn quiz_stats(
    Path(quiz_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.quizzes().stats(&quiz_id, &user).await?;
    Ok(Json(stats.into()))
}

async fn quiz_leaderboard(
    Path(quiz_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let board = state.quizzes().leaderboard(&quiz_id, &user).await?;
    Ok(Json(board.into()))
}
