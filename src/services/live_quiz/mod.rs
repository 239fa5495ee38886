mod codes;
mod error;
mod memory;
mod postgres;
mod session;
mod stats;
mod store;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use uuid::Uuid;

use crate::core::config::QuizSettings;
use crate::core::metrics;
use crate::core::time::primitive_now_utc;
use crate::db::models::{LiveQuiz, LiveQuizParticipant, Question, OPTION_COUNT};
use crate::db::types::LiveQuizStatus;
use crate::services::identity::Identity;

pub(crate) use error::QuizError;
pub(crate) use memory::MemoryLiveQuizStore;
pub(crate) use postgres::PgLiveQuizStore;
pub(crate) use session::{SessionState, Transition};
pub(crate) use stats::{LeaderboardEntry, LiveStats};
pub(crate) use store::{LiveQuizStore, ParticipantRecord};

use store::{AdmitOutcome, NewAnswer, NewLiveQuiz, NewParticipant, RecordOutcome};

/// Flat scoring: a correct answer is worth this much, anything else nothing.
pub(crate) const POINTS_PER_CORRECT: i32 = 100;

#[derive(Debug, Clone)]
pub(crate) struct QuizDraft {
    pub(crate) title: String,
    pub(crate) questions: Vec<Question>,
    pub(crate) max_participants: i32,
    pub(crate) question_time_seconds: i32,
}

#[derive(Debug, Clone)]
pub(crate) struct JoinOutcome {
    pub(crate) quiz: LiveQuiz,
    pub(crate) participant: LiveQuizParticipant,
    pub(crate) newly_joined: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SubmitOutcome {
    pub(crate) correct: bool,
    pub(crate) points: i32,
    pub(crate) score: i32,
}

#[derive(Debug, Clone)]
pub(crate) struct HostView {
    pub(crate) quiz: LiveQuiz,
    pub(crate) participants: Vec<ParticipantRecord>,
}

#[derive(Debug, Clone)]
pub(crate) struct RoomView {
    pub(crate) quiz: LiveQuiz,
    pub(crate) participant: ParticipantRecord,
}

#[derive(Debug, Clone)]
pub(crate) struct Leaderboard {
    pub(crate) quiz: LiveQuiz,
    pub(crate) entries: Vec<LeaderboardEntry>,
}

#[derive(Clone)]
pub(crate) struct LiveQuizService {
    store: Arc<dyn LiveQuizStore>,
    settings: QuizSettings,
}

impl LiveQuizService {
    pub(crate) fn new(store: Arc<dyn LiveQuizStore>, settings: QuizSettings) -> Self {
        Self { store, settings }
    }

    pub(crate) async fn create(
        &self,
        host: &Identity,
        draft: QuizDraft,
    ) -> Result<LiveQuiz, QuizError> {
        self.validate_draft(&draft)?;

        let now = primitive_now_utc();
        for attempt in 1..=self.settings.code_attempts {
            let candidate = NewLiveQuiz {
                id: Uuid::new_v4().to_string(),
                code: codes::generate_quiz_code(),
                title: draft.title.trim().to_string(),
                host_id: host.user_id.clone(),
                questions: draft.questions.clone(),
                max_participants: draft.max_participants,
                question_time_seconds: draft.question_time_seconds,
                created_at: now,
            };

            if let Some(quiz) = self.store.insert_quiz(candidate).await? {
                tracing::info!(
                    quiz_id = %quiz.id,
                    code = %quiz.code,
                    host_id = %quiz.host_id,
                    questions = quiz.question_count(),
                    max_participants = quiz.max_participants,
                    "Live quiz created"
                );
                return Ok(quiz);
            }
            tracing::warn!(attempt, "Quiz code collision, retrying");
        }

        Err(QuizError::Conflict)
    }

    pub(crate) async fn list_hosted(&self, host: &Identity) -> Result<Vec<LiveQuiz>, QuizError> {
        Ok(self.store.list_quizzes_by_host(&host.user_id).await?)
    }

    pub(crate) async fn join(&self, code: &str, who: &Identity) -> Result<JoinOutcome, QuizError> {
        let code = codes::normalize_quiz_code(code);
        let quiz = self.store.find_quiz_by_code(&code).await?.ok_or(QuizError::NotFound("quiz"))?;

        let outcome = self
            .store
            .admit_participant(
                &quiz.id,
                NewParticipant {
                    user_id: who.user_id.clone(),
                    display_name: who.display_name.clone(),
                    joined_at: primitive_now_utc(),
                },
            )
            .await?;

        let result = match outcome {
            AdmitOutcome::Admitted(participant) => {
                tracing::info!(
                    quiz_id = %quiz.id,
                    user_id = %participant.user_id,
                    join_order = participant.join_order,
                    "Participant joined live quiz"
                );
                Ok(JoinOutcome { quiz, participant, newly_joined: true })
            }
            AdmitOutcome::AlreadyJoined(participant) => {
                Ok(JoinOutcome { quiz, participant, newly_joined: false })
            }
            AdmitOutcome::Full { capacity } => Err(QuizError::Full { capacity }),
            AdmitOutcome::Stopped => Err(QuizError::AlreadyStopped),
            AdmitOutcome::QuizMissing => Err(QuizError::NotFound("quiz")),
        };

        metrics::record_join(match &result {
            Ok(outcome) if outcome.newly_joined => "admitted",
            Ok(_) => "rejoined",
            Err(QuizError::Full { .. }) => "full",
            Err(_) => "rejected",
        });
        result
    }

    pub(crate) async fn start(&self, quiz_id: &str, who: &Identity) -> Result<LiveQuiz, QuizError> {
        self.transition(quiz_id, who, Transition::Start).await
    }

    pub(crate) async fn pause(&self, quiz_id: &str, who: &Identity) -> Result<LiveQuiz, QuizError> {
        self.transition(quiz_id, who, Transition::Pause).await
    }

    pub(crate) async fn resume(&self, quiz_id: &str, who: &Identity) -> Result<LiveQuiz, QuizError> {
        self.transition(quiz_id, who, Transition::Resume).await
    }

    pub(crate) async fn stop(&self, quiz_id: &str, who: &Identity) -> Result<LiveQuiz, QuizError> {
        self.transition(quiz_id, who, Transition::Stop).await
    }

    pub(crate) async fn advance(
        &self,
        quiz_id: &str,
        who: &Identity,
    ) -> Result<LiveQuiz, QuizError> {
        self.transition(quiz_id, who, Transition::Advance).await
    }

    /// Applies a host transition with optimistic compare-and-set, re-reading
    /// the quiz when another writer got there first.
    pub(crate) async fn transition(
        &self,
        quiz_id: &str,
        who: &Identity,
        transition: Transition,
    ) -> Result<LiveQuiz, QuizError> {
        for _ in 0..self.settings.transition_retries {
            let mut quiz = self.hosted_quiz(quiz_id, who, transition.as_str()).await?;
            let current = SessionState::of(&quiz);
            let next = current.apply(transition, quiz.question_count())?;

            let updated_at = primitive_now_utc();
            if self.store.compare_and_set_session(quiz_id, current, next, updated_at).await? {
                quiz.status = next.status;
                quiz.current_question = next.current_question;
                quiz.updated_at = updated_at;

                metrics::record_transition(transition.as_str());
                tracing::info!(
                    quiz_id = %quiz.id,
                    action = transition.as_str(),
                    status = %next.status,
                    current_question = next.current_question,
                    "Live quiz session updated"
                );
                return Ok(quiz);
            }
            tracing::debug!(quiz_id, action = transition.as_str(), "Session moved, retrying");
        }

        Err(QuizError::Conflict)
    }

    pub(crate) async fn submit(
        &self,
        quiz_id: &str,
        who: &Identity,
        question_index: i32,
        chosen_option: i32,
    ) -> Result<SubmitOutcome, QuizError> {
        for _ in 0..self.settings.transition_retries {
            let quiz = self.store.find_quiz(quiz_id).await?.ok_or(QuizError::NotFound("quiz"))?;
            if quiz.status == LiveQuizStatus::Stopped {
                return Err(QuizError::AlreadyStopped);
            }

            let participant = self
                .store
                .find_participant(quiz_id, &who.user_id)
                .await?
                .ok_or(QuizError::NotFound("participant"))?;

            let question = quiz.question(question_index).ok_or_else(|| {
                QuizError::InvalidIndex(format!(
                    "question index {question_index} is out of range (quiz has {} questions)",
                    quiz.question_count()
                ))
            })?;
            let chosen = u8::try_from(chosen_option)
                .ok()
                .filter(|option| usize::from(*option) < OPTION_COUNT)
                .ok_or_else(|| {
                    QuizError::InvalidIndex(format!(
                        "option {chosen_option} is out of range (0-{})",
                        OPTION_COUNT - 1
                    ))
                })?;

            let session = SessionState::of(&quiz);
            if !session.accepts_answers() {
                return Err(QuizError::InvalidState { status: quiz.status, action: "answer" });
            }
            if question_index != session.current_question {
                return Err(QuizError::QuestionClosed {
                    requested: question_index,
                    current: session.current_question,
                });
            }
            if participant.answer_for(question_index).is_some() {
                return Err(QuizError::AlreadyAnswered(question_index));
            }

            let correct = chosen == question.correct_index;
            let points = if correct { POINTS_PER_CORRECT } else { 0 };

            let outcome = self
                .store
                .record_answer(
                    quiz_id,
                    session,
                    NewAnswer {
                        user_id: who.user_id.clone(),
                        question_index,
                        chosen_option: i16::from(chosen),
                        points,
                        answered_at: primitive_now_utc(),
                    },
                )
                .await?;

            match outcome {
                RecordOutcome::Recorded { score } => {
                    metrics::record_answer(correct);
                    tracing::debug!(
                        quiz_id,
                        user_id = %who.user_id,
                        question_index,
                        correct,
                        score,
                        "Answer recorded"
                    );
                    return Ok(SubmitOutcome { correct, points, score });
                }
                RecordOutcome::Duplicate => return Err(QuizError::AlreadyAnswered(question_index)),
                RecordOutcome::ParticipantMissing => {
                    return Err(QuizError::NotFound("participant"))
                }
                RecordOutcome::QuizMissing => return Err(QuizError::NotFound("quiz")),
                // Re-validate against the new session state.
                RecordOutcome::SessionMoved(_) => continue,
            }
        }

        Err(QuizError::Conflict)
    }

    pub(crate) async fn stats(&self, quiz_id: &str, who: &Identity) -> Result<LiveStats, QuizError> {
        let quiz = self.hosted_quiz(quiz_id, who, "view statistics of").await?;
        let participants = self.store.list_participants(quiz_id).await?;
        Ok(stats::live_stats(quiz.current_question, &participants))
    }

    pub(crate) async fn host_view(&self, quiz_id: &str, who: &Identity) -> Result<HostView, QuizError> {
        let quiz = self.hosted_quiz(quiz_id, who, "manage").await?;
        let participants = self.store.list_participants(quiz_id).await?;
        Ok(HostView { quiz, participants })
    }

    pub(crate) async fn participant_view(
        &self,
        quiz_id: &str,
        who: &Identity,
    ) -> Result<RoomView, QuizError> {
        let quiz = self.store.find_quiz(quiz_id).await?.ok_or(QuizError::NotFound("quiz"))?;
        let participant = self
            .store
            .find_participant(quiz_id, &who.user_id)
            .await?
            .ok_or(QuizError::NotFound("participant"))?;
        Ok(RoomView { quiz, participant })
    }

    pub(crate) async fn leaderboard(
        &self,
        quiz_id: &str,
        who: &Identity,
    ) -> Result<Leaderboard, QuizError> {
        let quiz = self.store.find_quiz(quiz_id).await?.ok_or(QuizError::NotFound("quiz"))?;
        let participants = self.store.list_participants(quiz_id).await?;

        let is_host = quiz.host_id == who.user_id;
        let is_participant =
            participants.iter().any(|record| record.participant.user_id == who.user_id);
        if !is_host && !is_participant {
            return Err(QuizError::NotAuthorized("view the leaderboard of"));
        }

        let entries = stats::leaderboard(&participants);
        Ok(Leaderboard { quiz, entries })
    }

    async fn hosted_quiz(
        &self,
        quiz_id: &str,
        who: &Identity,
        action: &'static str,
    ) -> Result<LiveQuiz, QuizError> {
        let quiz = self.store.find_quiz(quiz_id).await?.ok_or(QuizError::NotFound("quiz"))?;
        if quiz.host_id != who.user_id {
            return Err(QuizError::NotAuthorized(action));
        }
        Ok(quiz)
    }

    fn validate_draft(&self, draft: &QuizDraft) -> Result<(), QuizError> {
        if draft.title.trim().is_empty() {
            return Err(QuizError::Invalid("title must not be empty".to_string()));
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
        let ceiling = i64::from(self.settings.max_participants);
        if draft.max_participants < 1 || i64::from(draft.max_participants) > ceiling {
            return Err(QuizError::Invalid(format!(
                "max_participants must be between 1 and {ceiling}"
            )));
        }
        if draft.question_time_seconds < 1 {
            return Err(QuizError::Invalid("question_time_seconds must be positive".to_string()));
        }
        for (index, question) in draft.questions.iter().enumerate() {
            if question.text.trim().is_empty() {
                return Err(QuizError::Invalid(format!("question {index} has no text")));
            }
            if usize::from(question.correct_index) >= OPTION_COUNT {
                return Err(QuizError::InvalidIndex(format!(
                    "question {index} has correct index {} outside 0-{}",
                    question.correct_index,
                    OPTION_COUNT - 1
                )));
            }
        }
        Ok(())
    }
}
