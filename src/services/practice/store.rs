use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::db::models::{PracticeQuiz, PracticeResult};
use crate::repositories::practice_quizzes;

#[async_trait]
pub(crate) trait PracticeQuizStore: Send + Sync {
    async fn insert_quiz(&self, quiz: PracticeQuiz) -> Result<PracticeQuiz, sqlx::Error>;

    async fn find_quiz(&self, quiz_id: &str) -> Result<Option<PracticeQuiz>, sqlx::Error>;

    /// Newest first.
    async fn list_quizzes(&self) -> Result<Vec<PracticeQuiz>, sqlx::Error>;

    async fn insert_result(&self, result: PracticeResult) -> Result<PracticeResult, sqlx::Error>;

    /// Newest first.
    async fn list_results(&self, student_id: &str) -> Result<Vec<PracticeResult>, sqlx::Error>;
}

#[derive(Clone)]
pub(crate) struct PgPracticeQuizStore {
    pool: PgPool,
}

impl PgPracticeQuizStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PracticeQuizStore for PgPracticeQuizStore {
    async fn insert_quiz(&self, quiz: PracticeQuiz) -> Result<PracticeQuiz, sqlx::Error> {
        practice_quizzes::create(
            &self.pool,
            practice_quizzes::CreatePracticeQuiz {
                id: &quiz.id,
                title: &quiz.title,
                category: &quiz.category,
                difficulty: quiz.difficulty,
                questions: &quiz.questions.0,
                created_by: &quiz.created_by,
                created_at: quiz.created_at,
            },
        )
        .await
    }

    async fn find_quiz(&self, quiz_id: &str) -> Result<Option<PracticeQuiz>, sqlx::Error> {
        practice_quizzes::find_by_id(&self.pool, quiz_id).await
    }

    async fn list_quizzes(&self) -> Result<Vec<PracticeQuiz>, sqlx::Error> {
        practice_quizzes::list(&self.pool).await
    }

    async fn insert_result(&self, result: PracticeResult) -> Result<PracticeResult, sqlx::Error> {
        practice_quizzes::create_result(
            &self.pool,
            practice_quizzes::CreatePracticeResult {
                id: &result.id,
                quiz_id: &result.quiz_id,
                student_id: &result.student_id,
                score: result.score,
                total: result.total,
                percentage: result.percentage,
                answers: &result.answers.0,
                completed_at: result.completed_at,
            },
        )
        .await
    }

    async fn list_results(&self, student_id: &str) -> Result<Vec<PracticeResult>, sqlx::Error> {
        practice_quizzes::list_results_by_student(&self.pool, student_id).await
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    quizzes: Vec<PracticeQuiz>,
    results: Vec<PracticeResult>,
}

#[derive(Debug, Default)]
pub(crate) struct MemoryPracticeQuizStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryPracticeQuizStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PracticeQuizStore for MemoryPracticeQuizStore {
    async fn insert_quiz(&self, quiz: PracticeQuiz) -> Result<PracticeQuiz, sqlx::Error> {
        self.inner.lock().await.quizzes.push(quiz.clone());
        Ok(quiz)
    }

    async fn find_quiz(&self, quiz_id: &str) -> Result<Option<PracticeQuiz>, sqlx::Error> {
        let inner = self.inner.lock().await;
        Ok(inner.quizzes.iter().find(|quiz| quiz.id == quiz_id).cloned())
    }

    async fn list_quizzes(&self) -> Result<Vec<PracticeQuiz>, sqlx::Error> {
        let inner = self.inner.lock().await;
        Ok(inner.quizzes.iter().rev().cloned().collect())
    }

    async fn insert_result(&self, result: PracticeResult) -> Result<PracticeResult, sqlx::Error> {
        self.inner.lock().await.results.push(result.clone());
        Ok(result)
    }

    async fn list_results(&self, student_id: &str) -> Result<Vec<PracticeResult>, sqlx::Error> {
        let inner = self.inner.lock().await;
        Ok(inner
            .results
            .iter()
            .rev()
            .filter(|result| result.student_id == student_id)
            .cloned()
            .collect())
    }
}

