use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::types::Json;
use time::PrimitiveDateTime;
use tokio::sync::Mutex;

use crate::db::models::{LiveQuiz, LiveQuizAnswer, LiveQuizParticipant};
use crate::db::types::LiveQuizStatus;

use super::session::SessionState;
use super::store::{
    AdmitOutcome, LiveQuizStore, NewAnswer, NewLiveQuiz, NewParticipant, ParticipantRecord,
    RecordOutcome,
};

#[derive(Debug)]
struct QuizEntry {
    quiz: LiveQuiz,
    participants: Vec<ParticipantRecord>,
}

#[derive(Debug, Default)]
struct Inner {
    quizzes: HashMap<String, QuizEntry>,
    codes: HashMap<String, String>,
}

/// Single-node store. Each operation holds the lock for its whole duration.
#[derive(Debug, Default)]
pub(crate) struct MemoryLiveQuizStore {
    inner: Mutex<Inner>,
}

impl MemoryLiveQuizStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LiveQuizStore for MemoryLiveQuizStore {
    async fn insert_quiz(&self, quiz: NewLiveQuiz) -> Result<Option<LiveQuiz>, sqlx::Error> {
        let mut inner = self.inner.lock().await;
        if inner.codes.contains_key(&quiz.code) || inner.quizzes.contains_key(&quiz.id) {
            return Ok(None);
        }

        let stored = LiveQuiz {
            id: quiz.id,
            code: quiz.code,
            title: quiz.title,
            host_id: quiz.host_id,
            questions: Json(quiz.questions),
            max_participants: quiz.max_participants,
            question_time_seconds: quiz.question_time_seconds,
            status: LiveQuizStatus::Waiting,
            current_question: 0,
            created_at: quiz.created_at,
            updated_at: quiz.created_at,
        };
        inner.codes.insert(stored.code.clone(), stored.id.clone());
        inner
            .quizzes
            .insert(stored.id.clone(), QuizEntry { quiz: stored.clone(), participants: Vec::new() });
        Ok(Some(stored))
    }

    async fn find_quiz(&self, quiz_id: &str) -> Result<Option<LiveQuiz>, sqlx::Error> {
        let inner = self.inner.lock().await;
        Ok(inner.quizzes.get(quiz_id).map(|entry| entry.quiz.clone()))
    }

    async fn find_quiz_by_code(&self, code: &str) -> Result<Option<LiveQuiz>, sqlx::Error> {
        let inner = self.inner.lock().await;
        Ok(inner
            .codes
            .get(code)
            .and_then(|quiz_id| inner.quizzes.get(quiz_id))
            .map(|entry| entry.quiz.clone()))
    }

    async fn list_quizzes_by_host(&self, host_id: &str) -> Result<Vec<LiveQuiz>, sqlx::Error> {
        let inner = self.inner.lock().await;
        let mut quizzes: Vec<LiveQuiz> = inner
            .quizzes
            .values()
            .filter(|entry| entry.quiz.host_id == host_id)
            .map(|entry| entry.quiz.clone())
            .collect();
        quizzes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(quizzes)
    }

    async fn compare_and_set_session(
        &self,
        quiz_id: &str,
        expected: SessionState,
        next: SessionState,
        updated_at: PrimitiveDateTime,
    ) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock().await;
        let Some(entry) = inner.quizzes.get_mut(quiz_id) else {
            return Ok(false);
        };
        if SessionState::of(&entry.quiz) != expected {
            return Ok(false);
        }
        entry.quiz.status = next.status;
        entry.quiz.current_question = next.current_question;
        entry.quiz.updated_at = updated_at;
        Ok(true)
    }

    async fn admit_participant(
        &self,
        quiz_id: &str,
        participant: NewParticipant,
    ) -> Result<AdmitOutcome, sqlx::Error> {
        let mut inner = self.inner.lock().await;
        let Some(entry) = inner.quizzes.get_mut(quiz_id) else {
            return Ok(AdmitOutcome::QuizMissing);
        };

        if let Some(existing) =
            entry.participants.iter().find(|record| record.participant.user_id == participant.user_id)
        {
            return Ok(AdmitOutcome::AlreadyJoined(existing.participant.clone()));
        }
        if entry.quiz.status == LiveQuizStatus::Stopped {
            return Ok(AdmitOutcome::Stopped);
        }
        let joined = i32::try_from(entry.participants.len()).unwrap_or(i32::MAX);
        if joined >= entry.quiz.max_participants {
            return Ok(AdmitOutcome::Full { capacity: entry.quiz.max_participants });
        }

        let admitted = LiveQuizParticipant {
            quiz_id: quiz_id.to_string(),
            user_id: participant.user_id,
            display_name: participant.display_name,
            score: 0,
            join_order: joined + 1,
            joined_at: participant.joined_at,
        };
        entry
            .participants
            .push(ParticipantRecord { participant: admitted.clone(), answers: Vec::new() });
        Ok(AdmitOutcome::Admitted(admitted))
    }

    async fn find_participant(
        &self,
        quiz_id: &str,
        user_id: &str,
    ) -> Result<Option<ParticipantRecord>, sqlx::Error> {
        let inner = self.inner.lock().await;
        Ok(inner.quizzes.get(quiz_id).and_then(|entry| {
            entry.participants.iter().find(|record| record.participant.user_id == user_id).cloned()
        }))
    }

    async fn list_participants(
        &self,
        quiz_id: &str,
    ) -> Result<Vec<ParticipantRecord>, sqlx::Error> {
        let inner = self.inner.lock().await;
        Ok(inner.quizzes.get(quiz_id).map(|entry| entry.participants.clone()).unwrap_or_default())
    }

    async fn record_answer(
        &self,
        quiz_id: &str,
        expected: SessionState,
        answer: NewAnswer,
    ) -> Result<RecordOutcome, sqlx::Error> {
        let mut inner = self.inner.lock().await;
        let Some(entry) = inner.quizzes.get_mut(quiz_id) else {
            return Ok(RecordOutcome::QuizMissing);
        };

        let current = SessionState::of(&entry.quiz);
        if current != expected {
            return Ok(RecordOutcome::SessionMoved(current));
        }

        let Some(record) = entry
            .participants
            .iter_mut()
            .find(|record| record.participant.user_id == answer.user_id)
        else {
            return Ok(RecordOutcome::ParticipantMissing);
        };
        if record.answer_for(answer.question_index).is_some() {
            return Ok(RecordOutcome::Duplicate);
        }

        record.answers.push(LiveQuizAnswer {
            quiz_id: quiz_id.to_string(),
            user_id: answer.user_id,
            question_index: answer.question_index,
            chosen_option: answer.chosen_option,
            points: answer.points,
            answered_at: answer.answered_at,
        });
        record.participant.score += answer.points;
        Ok(RecordOutcome::Recorded { score: record.participant.score })
    }
}
