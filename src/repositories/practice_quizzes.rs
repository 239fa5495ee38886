use sqlx::types::Json;
use sqlx::PgPool;

use crate::db::models::{PracticeQuiz, PracticeResult, Question};
use crate::db::types::DifficultyLevel;

const QUIZ_COLUMNS: &str = "id, title, category, difficulty, questions, created_by, created_at";
const RESULT_COLUMNS: &str =
    "id, quiz_id, student_id, score, total, percentage, answers, completed_at";

pub(crate) struct CreatePracticeQuiz<'a> {
    pub(crate) id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) category: &'a str,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) questions: &'a [Question],
    pub(crate) created_by: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) struct CreatePracticeResult<'a> {
    pub(crate) id: &'a str,
    pub(crate) quiz_id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) score: i32,
    pub(crate) total: i32,
    pub(crate) percentage: f64,
    pub(crate) answers: &'a [Option<u8>],
    pub(crate) completed_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreatePracticeQuiz<'_>,
) -> Result<PracticeQuiz, sqlx::Error> {
    sqlx::query_as::<_, PracticeQuiz>(&format!(
        "INSERT INTO practice_quizzes (
            id, title, category, difficulty, questions, created_by, created_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {QUIZ_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.title)
    .bind(params.category)
    .bind(params.difficulty)
    .bind(Json(params.questions))
    .bind(params.created_by)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    quiz_id: &str,
) -> Result<Option<PracticeQuiz>, sqlx::Error> {
    sqlx::query_as::<_, PracticeQuiz>(&format!(
        "SELECT {QUIZ_COLUMNS} FROM practice_quizzes WHERE id = $1"
    ))
    .bind(quiz_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<PracticeQuiz>, sqlx::Error> {
    sqlx::query_as::<_, PracticeQuiz>(&format!(
        "SELECT {QUIZ_COLUMNS} FROM practice_quizzes ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn create_result(
    pool: &PgPool,
    params: CreatePracticeResult<'_>,
) -> Result<PracticeResult, sqlx::Error> {
    sqlx::query_as::<_, PracticeResult>(&format!(
        "INSERT INTO practice_results (
            id, quiz_id, student_id, score, total, percentage, answers, completed_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
         RETURNING {RESULT_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.quiz_id)
    .bind(params.student_id)
    .bind(params.score)
    .bind(params.total)
    .bind(params.percentage)
    .bind(Json(params.answers))
    .bind(params.completed_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_results_by_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<PracticeResult>, sqlx::Error> {
    sqlx::query_as::<_, PracticeResult>(&format!(
        "SELECT {RESULT_COLUMNS} FROM practice_results
         WHERE student_id = $1 ORDER BY completed_at DESC, id DESC"
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await
}
