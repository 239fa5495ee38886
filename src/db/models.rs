use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{DifficultyLevel, LiveQuizStatus};

/// Number of options every question carries.
pub(crate) const OPTION_COUNT: usize = 4;

/// A multiple-choice question shared by live and practice quizzes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Question {
    pub(crate) text: String,
    pub(crate) options: [String; OPTION_COUNT],
    /// Zero-based index into `options`; always below [`OPTION_COUNT`].
    pub(crate) correct_index: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct LiveQuiz {
    pub(crate) id: String,
    pub(crate) code: String,
    pub(crate) title: String,
    pub(crate) host_id: String,
    pub(crate) questions: Json<Vec<Question>>,
    pub(crate) max_participants: i32,
    pub(crate) question_time_seconds: i32,
    pub(crate) status: LiveQuizStatus,
    pub(crate) current_question: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

impl LiveQuiz {
    pub(crate) fn question_count(&self) -> usize {
        self.questions.0.len()
    }

    pub(crate) fn question(&self, index: i32) -> Option<&Question> {
        usize::try_from(index).ok().and_then(|index| self.questions.0.get(index))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct LiveQuizParticipant {
    pub(crate) quiz_id: String,
    pub(crate) user_id: String,
    pub(crate) display_name: String,
    pub(crate) score: i32,
    pub(crate) join_order: i32,
    pub(crate) joined_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct LiveQuizAnswer {
    pub(crate) quiz_id: String,
    pub(crate) user_id: String,
    pub(crate) question_index: i32,
    pub(crate) chosen_option: i16,
    pub(crate) points: i32,
    pub(crate) answered_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct PracticeQuiz {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) category: String,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) questions: Json<Vec<Question>>,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct PracticeResult {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) student_id: String,
    pub(crate) score: i32,
    pub(crate) total: i32,
    pub(crate) percentage: f64,
    pub(crate) answers: Json<Vec<Option<u8>>>,
    pub(crate) completed_at: PrimitiveDateTime,
}
