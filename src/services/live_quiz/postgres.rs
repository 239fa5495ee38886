use async_trait::async_trait;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::LiveQuiz;
use crate::db::types::LiveQuizStatus;
use crate::repositories::{live_quiz_answers, live_quiz_participants, live_quizzes};

use super::session::SessionState;
use super::store::{
    AdmitOutcome, LiveQuizStore, NewAnswer, NewLiveQuiz, NewParticipant, ParticipantRecord,
    RecordOutcome,
};

#[derive(Clone)]
pub(crate) struct PgLiveQuizStore {
    pool: PgPool,
}

impl PgLiveQuizStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LiveQuizStore for PgLiveQuizStore {
    async fn insert_quiz(&self, quiz: NewLiveQuiz) -> Result<Option<LiveQuiz>, sqlx::Error> {
        live_quizzes::create(
            &self.pool,
            live_quizzes::CreateLiveQuiz {
                id: &quiz.id,
                code: &quiz.code,
                title: &quiz.title,
                host_id: &quiz.host_id,
                questions: &quiz.questions,
                max_participants: quiz.max_participants,
                question_time_seconds: quiz.question_time_seconds,
                created_at: quiz.created_at,
            },
        )
        .await
    }

    async fn find_quiz(&self, quiz_id: &str) -> Result<Option<LiveQuiz>, sqlx::Error> {
        live_quizzes::find_by_id(&self.pool, quiz_id).await
    }

    async fn find_quiz_by_code(&self, code: &str) -> Result<Option<LiveQuiz>, sqlx::Error> {
        live_quizzes::find_by_code(&self.pool, code).await
    }

    async fn list_quizzes_by_host(&self, host_id: &str) -> Result<Vec<LiveQuiz>, sqlx::Error> {
        live_quizzes::list_by_host(&self.pool, host_id).await
    }

    async fn compare_and_set_session(
        &self,
        quiz_id: &str,
        expected: SessionState,
        next: SessionState,
        updated_at: PrimitiveDateTime,
    ) -> Result<bool, sqlx::Error> {
        live_quizzes::compare_and_set_session(
            &self.pool,
            quiz_id,
            live_quizzes::SessionUpdate {
                expected_status: expected.status,
                expected_question: expected.current_question,
                status: next.status,
                current_question: next.current_question,
                updated_at,
            },
        )
        .await
    }

    async fn admit_participant(
        &self,
        quiz_id: &str,
        participant: NewParticipant,
    ) -> Result<AdmitOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let Some(quiz) = live_quizzes::lock_for_update(&mut *tx, quiz_id).await? else {
            return Ok(AdmitOutcome::QuizMissing);
        };

        if let Some(existing) =
            live_quiz_participants::find(&mut *tx, quiz_id, &participant.user_id).await?
        {
            return Ok(AdmitOutcome::AlreadyJoined(existing));
        }
        if quiz.status == LiveQuizStatus::Stopped {
            return Ok(AdmitOutcome::Stopped);
        }

        let joined = live_quiz_participants::count_by_quiz(&mut *tx, quiz_id).await?;
        if joined >= i64::from(quiz.max_participants) {
            return Ok(AdmitOutcome::Full { capacity: quiz.max_participants });
        }

        let admitted = live_quiz_participants::create(
            &mut *tx,
            live_quiz_participants::CreateParticipant {
                quiz_id,
                user_id: &participant.user_id,
                display_name: &participant.display_name,
                join_order: i32::try_from(joined + 1).unwrap_or(i32::MAX),
                joined_at: participant.joined_at,
            },
        )
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

        tx.commit().await?;
        Ok(AdmitOutcome::Admitted(admitted))
    }

    async fn find_participant(
        &self,
        quiz_id: &str,
        user_id: &str,
    ) -> Result<Option<ParticipantRecord>, sqlx::Error> {
        let Some(participant) = live_quiz_participants::find(&self.pool, quiz_id, user_id).await?
        else {
            return Ok(None);
        };
        let answers = live_quiz_answers::list_by_participant(&self.pool, quiz_id, user_id).await?;
        Ok(Some(ParticipantRecord { participant, answers }))
    }

    async fn list_participants(
        &self,
        quiz_id: &str,
    ) -> Result<Vec<ParticipantRecord>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let participants = live_quiz_participants::list_by_quiz(&mut *tx, quiz_id).await?;
        let answers = live_quiz_answers::list_by_quiz(&mut *tx, quiz_id).await?;
        tx.commit().await?;

        let mut records: Vec<ParticipantRecord> = participants
            .into_iter()
            .map(|participant| ParticipantRecord { participant, answers: Vec::new() })
            .collect();
        for answer in answers {
            if let Some(record) =
                records.iter_mut().find(|record| record.participant.user_id == answer.user_id)
            {
                record.answers.push(answer);
            }
        }
        Ok(records)
    }

    async fn record_answer(
        &self,
        quiz_id: &str,
        expected: SessionState,
        answer: NewAnswer,
    ) -> Result<RecordOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let Some(quiz) = live_quizzes::lock_for_share(&mut *tx, quiz_id).await? else {
            return Ok(RecordOutcome::QuizMissing);
        };
        let current = SessionState::of(&quiz);
        if current != expected {
            return Ok(RecordOutcome::SessionMoved(current));
        }

        if live_quiz_participants::find(&mut *tx, quiz_id, &answer.user_id).await?.is_none() {
            return Ok(RecordOutcome::ParticipantMissing);
        }

        let inserted = live_quiz_answers::create_if_absent(
            &mut *tx,
            live_quiz_answers::CreateAnswer {
                quiz_id,
                user_id: &answer.user_id,
                question_index: answer.question_index,
                chosen_option: answer.chosen_option,
                points: answer.points,
                answered_at: answer.answered_at,
            },
        )
        .await?;
        if !inserted {
            return Ok(RecordOutcome::Duplicate);
        }

        let score =
            live_quiz_participants::add_points(&mut *tx, quiz_id, &answer.user_id, answer.points)
                .await?;
        tx.commit().await?;
        Ok(RecordOutcome::Recorded { score })
    }
}
