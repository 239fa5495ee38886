use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{LiveQuiz, Question, OPTION_COUNT};
use crate::db::types::LiveQuizStatus;
use crate::services::live_quiz::{
    HostView, JoinOutcome, Leaderboard, LiveStats, ParticipantRecord, RoomView, SubmitOutcome,
};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    #[serde(alias = "question")]
    #[validate(length(min = 1, max = 1000, message = "text must contain 1..1000 characters"))]
    pub(crate) text: String,
    #[validate(length(equal = 4, message = "a question must have exactly 4 options"))]
    pub(crate) options: Vec<String>,
    #[serde(alias = "correctAnswer", alias = "correct_index")]
    #[validate(range(min = 0, max = 3, message = "correct_answer must be in range 0..3"))]
    pub(crate) correct_answer: i32,
}

impl TryFrom<QuestionCreate> for Question {
    type Error = String;

    fn try_from(value: QuestionCreate) -> Result<Self, Self::Error> {
        let options: [String; OPTION_COUNT] = value
            .options
            .try_into()
            .map_err(|_| format!("a question must have exactly {OPTION_COUNT} options"))?;
        let correct_index = u8::try_from(value.correct_answer)
            .ok()
            .filter(|index| usize::from(*index) < OPTION_COUNT)
            .ok_or_else(|| "correct_answer must be in range 0..3".to_string())?;
        Ok(Question { text: value.text.trim().to_string(), options, correct_index })
    }
}

pub(crate) fn into_questions(questions: Vec<QuestionCreate>) -> Result<Vec<Question>, String> {
    questions.into_iter().map(Question::try_from).collect()
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuizCreate {
    #[validate(length(min = 1, max = 200, message = "title must contain 1..200 characters"))]
    pub(crate) title: String,
    #[serde(alias = "maxParticipants")]
    #[validate(range(min = 1, message = "max_participants must be positive"))]
    pub(crate) max_participants: i32,
    #[serde(default = "default_question_time", alias = "questionTime", alias = "question_time")]
    #[validate(range(min = 5, max = 600, message = "question_time_seconds must be in range 5..600"))]
    pub(crate) question_time_seconds: i32,
    #[validate(length(min = 1, message = "a quiz needs at least one question"), nested)]
    pub(crate) questions: Vec<QuestionCreate>,
}

fn default_question_time() -> i32 {
    30
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct JoinQuizRequest {
    #[serde(alias = "quiz_code")]
    #[validate(length(min = 1, max = 32, message = "code must not be empty"))]
    pub(crate) code: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitAnswerRequest {
    #[serde(alias = "questionIndex", alias = "question_number")]
    pub(crate) question_index: i32,
    #[serde(alias = "chosenOption", alias = "answer")]
    pub(crate) chosen_option: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) index: usize,
    pub(crate) text: String,
    pub(crate) options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) correct_answer: Option<u8>,
}

impl QuestionResponse {
    pub(crate) fn with_answer(index: usize, question: &Question) -> Self {
        Self {
            index,
            text: question.text.clone(),
            options: question.options.to_vec(),
            correct_answer: Some(question.correct_index),
        }
    }

    pub(crate) fn public(index: usize, question: &Question) -> Self {
        Self { correct_answer: None, ..Self::with_answer(index, question) }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ParticipantResponse {
    pub(crate) user_id: String,
    pub(crate) display_name: String,
    pub(crate) score: i32,
    pub(crate) answered: usize,
    pub(crate) join_order: i32,
    pub(crate) joined_at: String,
}

impl ParticipantResponse {
    fn from_record(record: &ParticipantRecord) -> Self {
        Self {
            user_id: record.participant.user_id.clone(),
            display_name: record.participant.display_name.clone(),
            score: record.participant.score,
            answered: record.answered_count(),
            join_order: record.participant.join_order,
            joined_at: format_primitive(record.participant.joined_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizSummaryResponse {
    pub(crate) id: String,
    pub(crate) code: String,
    pub(crate) title: String,
    pub(crate) status: LiveQuizStatus,
    pub(crate) current_question: i32,
    pub(crate) question_count: usize,
    pub(crate) max_participants: i32,
    pub(crate) question_time_seconds: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl QuizSummaryResponse {
    pub(crate) fn from_db(quiz: &LiveQuiz) -> Self {
        Self {
            id: quiz.id.clone(),
            code: quiz.code.clone(),
            title: quiz.title.clone(),
            status: quiz.status,
            current_question: quiz.current_question,
            question_count: quiz.question_count(),
            max_participants: quiz.max_participants,
            question_time_seconds: quiz.question_time_seconds,
            created_at: format_primitive(quiz.created_at),
            updated_at: format_primitive(quiz.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizHostResponse {
    #[serde(flatten)]
    pub(crate) summary: QuizSummaryResponse,
    pub(crate) host_id: String,
    pub(crate) questions: Vec<QuestionResponse>,
    pub(crate) participants: Vec<ParticipantResponse>,
}

impl QuizHostResponse {
    pub(crate) fn from_view(view: &HostView) -> Self {
        Self {
            summary: QuizSummaryResponse::from_db(&view.quiz),
            host_id: view.quiz.host_id.clone(),
            questions: view
                .quiz
                .questions
                .0
                .iter()
                .enumerate()
                .map(|(index, question)| QuestionResponse::with_answer(index, question))
                .collect(),
            participants: view.participants.iter().map(ParticipantResponse::from_record).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JoinQuizResponse {
    pub(crate) quiz_id: String,
    pub(crate) title: String,
    pub(crate) status: LiveQuizStatus,
    pub(crate) display_name: String,
    pub(crate) join_order: i32,
    pub(crate) newly_joined: bool,
}

impl JoinQuizResponse {
    pub(crate) fn from_outcome(outcome: JoinOutcome) -> Self {
        Self {
            quiz_id: outcome.quiz.id,
            title: outcome.quiz.title,
            status: outcome.quiz.status,
            display_name: outcome.participant.display_name,
            join_order: outcome.participant.join_order,
            newly_joined: outcome.newly_joined,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionResponse {
    pub(crate) quiz_id: String,
    pub(crate) status: LiveQuizStatus,
    pub(crate) current_question: i32,
    pub(crate) question_count: usize,
    pub(crate) updated_at: String,
}

impl SessionResponse {
    pub(crate) fn from_db(quiz: &LiveQuiz) -> Self {
        Self {
            quiz_id: quiz.id.clone(),
            status: quiz.status,
            current_question: quiz.current_question,
            question_count: quiz.question_count(),
            updated_at: format_primitive(quiz.updated_at),
        }
    }
}

/// What a participant sees in the room. The correct answer is never exposed.
#[derive(Debug, Serialize)]
pub(crate) struct RoomResponse {
    pub(crate) quiz_id: String,
    pub(crate) title: String,
    pub(crate) status: LiveQuizStatus,
    pub(crate) current_question: i32,
    pub(crate) question_count: usize,
    pub(crate) question_time_seconds: i32,
    pub(crate) question: Option<QuestionResponse>,
    pub(crate) score: i32,
    pub(crate) answered_current: bool,
}

impl RoomResponse {
    pub(crate) fn from_view(view: &RoomView) -> Self {
        let quiz = &view.quiz;
        let live = matches!(quiz.status, LiveQuizStatus::Active | LiveQuizStatus::Paused);
        let question = if live {
            quiz.question(quiz.current_question).and_then(|question| {
                usize::try_from(quiz.current_question)
                    .ok()
                    .map(|index| QuestionResponse::public(index, question))
            })
        } else {
            None
        };

        Self {
            quiz_id: quiz.id.clone(),
            title: quiz.title.clone(),
            status: quiz.status,
            current_question: quiz.current_question,
            question_count: quiz.question_count(),
            question_time_seconds: quiz.question_time_seconds,
            question,
            score: view.participant.participant.score,
            answered_current: view.participant.answer_for(quiz.current_question).is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitAnswerResponse {
    pub(crate) correct: bool,
    pub(crate) points: i32,
    pub(crate) score: i32,
}

impl From<SubmitOutcome> for SubmitAnswerResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        Self { correct: outcome.correct, points: outcome.points, score: outcome.score }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StatsResponse {
    pub(crate) question_index: i32,
    pub(crate) question_number: i32,
    pub(crate) answer_counts: Vec<u32>,
    pub(crate) total_participants: u32,
    pub(crate) total_answered: u32,
}

impl From<LiveStats> for StatsResponse {
    fn from(stats: LiveStats) -> Self {
        Self {
            question_index: stats.question_index,
            question_number: stats.question_number,
            answer_counts: stats.answer_counts.to_vec(),
            total_participants: stats.total_participants,
            total_answered: stats.total_answered,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LeaderboardEntryResponse {
    pub(crate) rank: u32,
    pub(crate) user_id: String,
    pub(crate) display_name: String,
    pub(crate) score: i32,
    pub(crate) answered: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct LeaderboardResponse {
    pub(crate) quiz_id: String,
    pub(crate) status: LiveQuizStatus,
    pub(crate) entries: Vec<LeaderboardEntryResponse>,
}

impl From<Leaderboard> for LeaderboardResponse {
    fn from(board: Leaderboard) -> Self {
        Self {
            quiz_id: board.quiz.id,
            status: board.quiz.status,
            entries: board
                .entries
                .into_iter()
                .map(|entry| LeaderboardEntryResponse {
                    rank: entry.rank,
                    user_id: entry.user_id,
                    display_name: entry.display_name,
                    score: entry.score,
                    answered: entry.answered,
                })
                .collect(),
        }
    }
}
