mod grading;
mod store;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use sqlx::types::Json;
use uuid::Uuid;

use crate::core::config::QuizSettings;
use crate::core::metrics;
use crate::core::time::primitive_now_utc;
use crate::db::models::{PracticeQuiz, PracticeResult, Question, OPTION_COUNT};
use crate::db::types::DifficultyLevel;
use crate::services::identity::Identity;
use crate::services::live_quiz::QuizError;

pub(crate) use grading::GradedAnswer;
pub(crate) use store::{MemoryPracticeQuizStore, PgPracticeQuizStore, PracticeQuizStore};

#[derive(Debug, Clone)]
pub(crate) struct PracticeDraft {
    pub(crate) title: String,
    pub(crate) category: String,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) questions: Vec<Question>,
}

#[derive(Debug, Clone)]
pub(crate) struct PracticeSubmission {
    pub(crate) result: PracticeResult,
    pub(crate) breakdown: Vec<GradedAnswer>,
}

/// Self-paced quizzes: authored once, attempted any number of times, graded
/// on submission.
#[derive(Clone)]
pub(crate) struct PracticeService {
    store: Arc<dyn PracticeQuizStore>,
    settings: QuizSettings,
}

impl PracticeService {
    pub(crate) fn new(store: Arc<dyn PracticeQuizStore>, settings: QuizSettings) -> Self {
        Self { store, settings }
    }

    pub(crate) async fn create(
        &self,
        author: &Identity,
        draft: PracticeDraft,
    ) -> Result<PracticeQuiz, QuizError> {
        self.validate_draft(&draft)?;

        let quiz = self
            .store
            .insert_quiz(PracticeQuiz {
                id: Uuid::new_v4().to_string(),
                title: draft.title.trim().to_string(),
                category: draft.category.trim().to_string(),
                difficulty: draft.difficulty,
                questions: Json(draft.questions),
                created_by: author.user_id.clone(),
                created_at: primitive_now_utc(),
            })
            .await?;

        tracing::info!(
            quiz_id = %quiz.id,
            category = %quiz.category,
            questions = quiz.questions.0.len(),
            created_by = %quiz.created_by,
            "Practice quiz created"
        );
        Ok(quiz)
    }

    pub(crate) async fn list(&self) -> Result<Vec<PracticeQuiz>, QuizError> {
        Ok(self.store.list_quizzes().await?)
    }

    pub(crate) async fn get(&self, quiz_id: &str) -> Result<PracticeQuiz, QuizError> {
        self.store.find_quiz(quiz_id).await?.ok_or(QuizError::NotFound("practice quiz"))
    }

    pub(crate) async fn submit(
        &self,
        quiz_id: &str,
        student: &Identity,
        answers: &[Option<i32>],
    ) -> Result<PracticeSubmission, QuizError> {
        let quiz = self.get(quiz_id).await?;
        let graded = grading::grade(&quiz.questions.0, answers)?;

        let result = self
            .store
            .insert_result(PracticeResult {
                id: Uuid::new_v4().to_string(),
                quiz_id: quiz.id.clone(),
                student_id: student.user_id.clone(),
                score: graded.score,
                total: graded.total,
                percentage: graded.percentage,
                answers: Json(graded.answers),
                completed_at: primitive_now_utc(),
            })
            .await?;

        metrics::record_practice_submission(result.percentage);
        tracing::info!(
            quiz_id = %quiz.id,
            student_id = %student.user_id,
            score = result.score,
            total = result.total,
            "Practice quiz graded"
        );
        Ok(PracticeSubmission { result, breakdown: graded.breakdown })
    }

    pub(crate) async fn list_results(
        &self,
        student: &Identity,
    ) -> Result<Vec<PracticeResult>, QuizError> {
        Ok(self.store.list_results(&student.user_id).await?)
    }

    fn validate_draft(&self, draft: &PracticeDraft) -> Result<(), QuizError> {
        if draft.title.trim().is_empty() {
            return Err(QuizError::Invalid("title must not be empty".to_string()));
        }
        if draft.category.trim().is_empty() {
            return Err(QuizError::Invalid("category must not be empty".to_string()));
        }
        if draft.questions.is_empty() {
            return Err(QuizError::Invalid("a quiz needs at least one question".to_string()));
        }
        let max_questions = usize::try_from(self.settings.max_questions).unwrap_or(usize::MAX);
        if draft.questions.len() > max_questions {
            return Err(QuizError::Invalid(format!(
                "a quiz can have at most {max_questions} questions"
            )));
        }
        if let Some(index) = draft
            .questions
            .iter()
            .position(|question| usize::from(question.correct_index) >= OPTION_COUNT)
        {
            return Err(QuizError::InvalidIndex(format!(
                "question {index} has a correct index outside 0-{}",
                OPTION_COUNT - 1
            )));
        }
        Ok(())
    }
}
