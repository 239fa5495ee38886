use crate::db::models::LiveQuizAnswer;

const COLUMNS: &str = "quiz_id, user_id, question_index, chosen_option, points, answered_at";

pub(crate) struct CreateAnswer<'a> {
    pub(crate) quiz_id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) question_index: i32,
    pub(crate) chosen_option: i16,
    pub(crate) points: i32,
    pub(crate) answered_at: time::PrimitiveDateTime,
}

/// Returns `false` if the participant already answered this question.
pub(crate) async fn create_if_absent(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAnswer<'_>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO live_quiz_answers (
            quiz_id, user_id, question_index, chosen_option, points, answered_at
         ) VALUES ($1,$2,$3,$4,$5,$6)
         ON CONFLICT DO NOTHING",
    )
    .bind(params.quiz_id)
    .bind(params.user_id)
    .bind(params.question_index)
    .bind(params.chosen_option)
    .bind(params.points)
    .bind(params.answered_at)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub(crate) async fn list_by_quiz(
    executor: impl sqlx::PgExecutor<'_>,
    quiz_id: &str,
) -> Result<Vec<LiveQuizAnswer>, sqlx::Error> {
    sqlx::query_as::<_, LiveQuizAnswer>(&format!(
        "SELECT {COLUMNS} FROM live_quiz_answers WHERE quiz_id = $1
         ORDER BY answered_at, question_index"
    ))
    .bind(quiz_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_by_participant(
    executor: impl sqlx::PgExecutor<'_>,
    quiz_id: &str,
    user_id: &str,
) -> Result<Vec<LiveQuizAnswer>, sqlx::Error> {
    sqlx::query_as::<_, LiveQuizAnswer>(&format!(
        "SELECT {COLUMNS} FROM live_quiz_answers WHERE quiz_id = $1 AND user_id = $2
         ORDER BY answered_at, question_index"
    ))
    .bind(quiz_id)
    .bind(user_id)
    .fetch_all(executor)
    .await
}
