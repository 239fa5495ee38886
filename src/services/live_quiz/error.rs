use thiserror::Error;

use crate::db::types::LiveQuizStatus;

#[derive(Debug, Error)]
pub(crate) enum QuizError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("not allowed to {0} this quiz")]
    NotAuthorized(&'static str),
    #[error("quiz is full ({capacity} participants)")]
    Full { capacity: i32 },
    #[error("{0}")]
    InvalidIndex(String),
    #[error("quiz has already been stopped")]
    AlreadyStopped,
    #[error("cannot {action} a quiz that is {status}")]
    InvalidState { status: LiveQuizStatus, action: &'static str },
    #[error("question {requested} is not open for answers (current question is {current})")]
    QuestionClosed { requested: i32, current: i32 },
    #[error("question {0} has already been answered")]
    AlreadyAnswered(i32),
    #[error("{0}")]
    Invalid(String),
    #[error("quiz was modified concurrently, try again")]
    Conflict,
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}
