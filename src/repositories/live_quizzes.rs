use sqlx::types::Json;
use sqlx::PgPool;

use crate::db::models::{LiveQuiz, Question};
use crate::db::types::LiveQuizStatus;

pub(crate) const COLUMNS: &str = "id, code, title, host_id, questions, max_participants, \
     question_time_seconds, status, current_question, created_at, updated_at";

pub(crate) struct CreateLiveQuiz<'a> {
    pub(crate) id: &'a str,
    pub(crate) code: &'a str,
    pub(crate) title: &'a str,
    pub(crate) host_id: &'a str,
    pub(crate) questions: &'a [Question],
    pub(crate) max_participants: i32,
    pub(crate) question_time_seconds: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
}

/// Returns `None` when the id or code is already taken.
pub(crate) async fn create(
    pool: &PgPool,
    params: CreateLiveQuiz<'_>,
) -> Result<Option<LiveQuiz>, sqlx::Error> {
    sqlx::query_as::<_, LiveQuiz>(&format!(
        "INSERT INTO live_quizzes (
            id, code, title, host_id, questions, max_participants, question_time_seconds,
            status, current_question, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,0,$9,$9)
         ON CONFLICT DO NOTHING
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.code)
    .bind(params.title)
    .bind(params.host_id)
    .bind(Json(params.questions))
    .bind(params.max_participants)
    .bind(params.question_time_seconds)
    .bind(LiveQuizStatus::Waiting)
    .bind(params.created_at)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    quiz_id: &str,
) -> Result<Option<LiveQuiz>, sqlx::Error> {
    sqlx::query_as::<_, LiveQuiz>(&format!("SELECT {COLUMNS} FROM live_quizzes WHERE id = $1"))
        .bind(quiz_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_by_code(
    executor: impl sqlx::PgExecutor<'_>,
    code: &str,
) -> Result<Option<LiveQuiz>, sqlx::Error> {
    sqlx::query_as::<_, LiveQuiz>(&format!("SELECT {COLUMNS} FROM live_quizzes WHERE code = $1"))
        .bind(code)
        .fetch_optional(executor)
        .await
}

/// Row lock that serialises admissions for one quiz.
pub(crate) async fn lock_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    quiz_id: &str,
) -> Result<Option<LiveQuiz>, sqlx::Error> {
    sqlx::query_as::<_, LiveQuiz>(&format!(
        "SELECT {COLUMNS} FROM live_quizzes WHERE id = $1 FOR UPDATE"
    ))
    .bind(quiz_id)
    .fetch_optional(executor)
    .await
}

/// Blocks session transitions until the holding transaction ends.
pub(crate) async fn lock_for_share(
    executor: impl sqlx::PgExecutor<'_>,
    quiz_id: &str,
) -> Result<Option<LiveQuiz>, sqlx::Error> {
    sqlx::query_as::<_, LiveQuiz>(&format!(
        "SELECT {COLUMNS} FROM live_quizzes WHERE id = $1 FOR SHARE"
    ))
    .bind(quiz_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_by_host(
    pool: &PgPool,
    host_id: &str,
) -> Result<Vec<LiveQuiz>, sqlx::Error> {
    sqlx::query_as::<_, LiveQuiz>(&format!(
        "SELECT {COLUMNS} FROM live_quizzes WHERE host_id = $1 ORDER BY created_at DESC, id DESC"
    ))
    .bind(host_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct SessionUpdate {
    pub(crate) expected_status: LiveQuizStatus,
    pub(crate) expected_question: i32,
    pub(crate) status: LiveQuizStatus,
    pub(crate) current_question: i32,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn compare_and_set_session(
    pool: &PgPool,
    quiz_id: &str,
    params: SessionUpdate,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE live_quizzes
         SET status = $1, current_question = $2, updated_at = $3
         WHERE id = $4 AND status = $5 AND current_question = $6",
    )
    .bind(params.status)
    .bind(params.current_question)
    .bind(params.updated_at)
    .bind(quiz_id)
    .bind(params.expected_status)
    .bind(params.expected_question)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}
