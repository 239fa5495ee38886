use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{PracticeQuiz, PracticeResult};
use crate::db::types::DifficultyLevel;
use crate::schemas::quiz::{QuestionCreate, QuestionResponse};
use crate::services::practice::{GradedAnswer, PracticeSubmission};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct PracticeQuizCreate {
    #[validate(length(min = 1, max = 200, message = "title must contain 1..200 characters"))]
    pub(crate) title: String,
    #[validate(length(min = 1, max = 100, message = "category must contain 1..100 characters"))]
    pub(crate) category: String,
    #[serde(default = "default_difficulty")]
    pub(crate) difficulty: DifficultyLevel,
    #[validate(length(min = 1, message = "a quiz needs at least one question"), nested)]
    pub(crate) questions: Vec<QuestionCreate>,
}

fn default_difficulty() -> DifficultyLevel {
    DifficultyLevel::Medium
}

#[derive(Debug, Deserialize)]
pub(crate) struct PracticeSubmitRequest {
    /// Aligned with the questions; `null` marks an unanswered question.
    #[serde(default)]
    pub(crate) answers: Vec<Option<i32>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PracticeQuizSummaryResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) category: String,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) question_count: usize,
    pub(crate) created_at: String,
}

impl PracticeQuizSummaryResponse {
    pub(crate) fn from_db(quiz: &PracticeQuiz) -> Self {
        Self {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            category: quiz.category.clone(),
            difficulty: quiz.difficulty,
            question_count: quiz.questions.0.len(),
            created_at: format_primitive(quiz.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PracticeQuizResponse {
    #[serde(flatten)]
    pub(crate) summary: PracticeQuizSummaryResponse,
    pub(crate) questions: Vec<QuestionResponse>,
}

impl PracticeQuizResponse {
    /// Questions without their correct answers, for taking the quiz.
    pub(crate) fn public(quiz: &PracticeQuiz) -> Self {
        Self {
            summary: PracticeQuizSummaryResponse::from_db(quiz),
            questions: quiz
                .questions
                .0
                .iter()
                .enumerate()
                .map(|(index, question)| QuestionResponse::public(index, question))
                .collect(),
        }
    }

    pub(crate) fn with_answers(quiz: &PracticeQuiz) -> Self {
        Self {
            summary: PracticeQuizSummaryResponse::from_db(quiz),
            questions: quiz
                .questions
                .0
                .iter()
                .enumerate()
                .map(|(index, question)| QuestionResponse::with_answer(index, question))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PracticeResultResponse {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) score: i32,
    pub(crate) total: i32,
    pub(crate) percentage: f64,
    pub(crate) answers: Vec<Option<u8>>,
    pub(crate) completed_at: String,
}

impl PracticeResultResponse {
    pub(crate) fn from_db(result: PracticeResult) -> Self {
        Self {
            id: result.id,
            quiz_id: result.quiz_id,
            score: result.score,
            total: result.total,
            percentage: result.percentage,
            answers: result.answers.0,
            completed_at: format_primitive(result.completed_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GradedAnswerResponse {
    pub(crate) question_index: usize,
    pub(crate) chosen: Option<u8>,
    pub(crate) correct_answer: u8,
    pub(crate) is_correct: bool,
}

impl From<GradedAnswer> for GradedAnswerResponse {
    fn from(answer: GradedAnswer) -> Self {
        Self {
            question_index: answer.question_index,
            chosen: answer.chosen,
            correct_answer: answer.correct_index,
            is_correct: answer.is_correct,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PracticeSubmitResponse {
    #[serde(flatten)]
    pub(crate) result: PracticeResultResponse,
    pub(crate) breakdown: Vec<GradedAnswerResponse>,
}

impl From<PracticeSubmission> for PracticeSubmitResponse {
    fn from(submission: PracticeSubmission) -> Self {
        Self {
            result: PracticeResultResponse::from_db(submission.result),
            breakdown: submission.breakdown.into_iter().map(GradedAnswerResponse::from).collect(),
        }
    }
}
