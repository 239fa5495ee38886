use async_trait::async_trait;
use time::PrimitiveDateTime;

use crate::db::models::{LiveQuiz, LiveQuizAnswer, LiveQuizParticipant, Question};

use super::session::SessionState;

/// A participant together with its answer history, oldest answer first.
#[derive(Debug, Clone)]
pub(crate) struct ParticipantRecord {
    pub(crate) participant: LiveQuizParticipant,
    pub(crate) answers: Vec<LiveQuizAnswer>,
}

impl ParticipantRecord {
    /// First record for the question; later duplicates are ignored.
    pub(crate) fn answer_for(&self, question_index: i32) -> Option<&LiveQuizAnswer> {
        self.answers.iter().find(|answer| answer.question_index == question_index)
    }

    pub(crate) fn answered_count(&self) -> usize {
        let mut seen: Vec<i32> = self.answers.iter().map(|answer| answer.question_index).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NewLiveQuiz {
    pub(crate) id: String,
    pub(crate) code: String,
    pub(crate) title: String,
    pub(crate) host_id: String,
    pub(crate) questions: Vec<Question>,
    pub(crate) max_participants: i32,
    pub(crate) question_time_seconds: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone)]
pub(crate) struct NewParticipant {
    pub(crate) user_id: String,
    pub(crate) display_name: String,
    pub(crate) joined_at: PrimitiveDateTime,
}

#[derive(Debug, Clone)]
pub(crate) struct NewAnswer {
    pub(crate) user_id: String,
    pub(crate) question_index: i32,
    pub(crate) chosen_option: i16,
    pub(crate) points: i32,
    pub(crate) answered_at: PrimitiveDateTime,
}

#[derive(Debug)]
pub(crate) enum AdmitOutcome {
    Admitted(LiveQuizParticipant),
    AlreadyJoined(LiveQuizParticipant),
    Full { capacity: i32 },
    Stopped,
    QuizMissing,
}

#[derive(Debug)]
pub(crate) enum RecordOutcome {
    Recorded { score: i32 },
    Duplicate,
    ParticipantMissing,
    QuizMissing,
    /// The session changed between validation and the write.
    SessionMoved(SessionState),
}

/// Storage for live quizzes. Every method is atomic on its own: admission
/// checks capacity and appends in one step, and answer recording inserts the
/// record and bumps the score in one step, both against the session state
/// observed at that moment.
#[async_trait]
pub(crate) trait LiveQuizStore: Send + Sync {
    /// Returns `None` when the code is already taken.
    async fn insert_quiz(&self, quiz: NewLiveQuiz) -> Result<Option<LiveQuiz>, sqlx::Error>;

    async fn find_quiz(&self, quiz_id: &str) -> Result<Option<LiveQuiz>, sqlx::Error>;

    async fn find_quiz_by_code(&self, code: &str) -> Result<Option<LiveQuiz>, sqlx::Error>;

    /// Newest first.
    async fn list_quizzes_by_host(&self, host_id: &str) -> Result<Vec<LiveQuiz>, sqlx::Error>;

    /// Writes `next` only if the quiz is still in `expected`.
    async fn compare_and_set_session(
        &self,
        quiz_id: &str,
        expected: SessionState,
        next: SessionState,
        updated_at: PrimitiveDateTime,
    ) -> Result<bool, sqlx::Error>;

    async fn admit_participant(
        &self,
        quiz_id: &str,
        participant: NewParticipant,
    ) -> Result<AdmitOutcome, sqlx::Error>;

    async fn find_participant(
        &self,
        quiz_id: &str,
        user_id: &str,
    ) -> Result<Option<ParticipantRecord>, sqlx::Error>;

    /// Ordered by join order.
    async fn list_participants(&self, quiz_id: &str)
        -> Result<Vec<ParticipantRecord>, sqlx::Error>;

    async fn record_answer(
        &self,
        quiz_id: &str,
        expected: SessionState,
        answer: NewAnswer,
    ) -> Result<RecordOutcome, sqlx::Error>;
}
