use crate::db::models::LiveQuizParticipant;

const COLUMNS: &str = "quiz_id, user_id, display_name, score, join_order, joined_at";

pub(crate) struct CreateParticipant<'a> {
    pub(crate) quiz_id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) display_name: &'a str,
    pub(crate) join_order: i32,
    pub(crate) joined_at: time::PrimitiveDateTime,
}

pub(crate) async fn find(
    executor: impl sqlx::PgExecutor<'_>,
    quiz_id: &str,
    user_id: &str,
) -> Result<Option<LiveQuizParticipant>, sqlx::Error> {
    sqlx::query_as::<_, LiveQuizParticipant>(&format!(
        "SELECT {COLUMNS} FROM live_quiz_participants WHERE quiz_id = $1 AND user_id = $2"
    ))
    .bind(quiz_id)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn count_by_quiz(
    executor: impl sqlx::PgExecutor<'_>,
    quiz_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM live_quiz_participants WHERE quiz_id = $1")
        .bind(quiz_id)
        .fetch_one(executor)
        .await
}

pub(crate) async fn list_by_quiz(
    executor: impl sqlx::PgExecutor<'_>,
    quiz_id: &str,
) -> Result<Vec<LiveQuizParticipant>, sqlx::Error> {
    sqlx::query_as::<_, LiveQuizParticipant>(&format!(
        "SELECT {COLUMNS} FROM live_quiz_participants WHERE quiz_id = $1 ORDER BY join_order"
    ))
    .bind(quiz_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateParticipant<'_>,
) -> Result<Option<LiveQuizParticipant>, sqlx::Error> {
    sqlx::query_as::<_, LiveQuizParticipant>(&format!(
        "INSERT INTO live_quiz_participants (
            quiz_id, user_id, display_name, score, join_order, joined_at
         ) VALUES ($1,$2,$3,0,$4,$5)
         ON CONFLICT DO NOTHING
         RETURNING {COLUMNS}",
    ))
    .bind(params.quiz_id)
    .bind(params.user_id)
    .bind(params.display_name)
    .bind(params.join_order)
    .bind(params.joined_at)
    .fetch_optional(executor)
    .await
}

/// Returns the new running score.
pub(crate) async fn add_points(
    executor: impl sqlx::PgExecutor<'_>,
    quiz_id: &str,
    user_id: &str,
    points: i32,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        "UPDATE live_quiz_participants SET score = score + $1
         WHERE quiz_id = $2 AND user_id = $3
         RETURNING score",
    )
    .bind(points)
    .bind(quiz_id)
    .bind(user_id)
    .fetch_one(executor)
    .await
}
