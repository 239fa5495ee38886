use crate::db::models::LiveQuiz;
use crate::db::types::LiveQuizStatus;

use super::error::QuizError;

/// The mutable part of a quiz: its status and the open question pointer.
/// Transitions are computed here and persisted with a compare-and-set on the
/// previous value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SessionState {
    pub(crate) status: LiveQuizStatus,
    pub(crate) current_question: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    Start,
    Pause,
    Resume,
    Stop,
    Advance,
}

impl Transition {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Stop => "stop",
            Self::Advance => "advance",
        }
    }
}

impl SessionState {
    pub(crate) fn of(quiz: &LiveQuiz) -> Self {
        Self { status: quiz.status, current_question: quiz.current_question }
    }

    pub(crate) fn apply(
        self,
        transition: Transition,
        question_count: usize,
    ) -> Result<Self, QuizError> {
        use LiveQuizStatus::{Active, Paused, Stopped, Waiting};

        if self.status == Stopped {
            return Err(QuizError::AlreadyStopped);
        }

        match (transition, self.status) {
            (Transition::Start, Waiting) => Ok(Self { status: Active, current_question: 0 }),
            (Transition::Pause, Active) => Ok(Self { status: Paused, ..self }),
            (Transition::Resume, Paused) => Ok(Self { status: Active, ..self }),
            (Transition::Stop, _) => Ok(Self { status: Stopped, ..self }),
            (Transition::Advance, Active) => {
                let next = self.current_question + 1;
                if usize::try_from(next).map_or(true, |next| next >= question_count) {
                    return Err(QuizError::InvalidIndex(format!(
                        "question {} is the last question",
                        self.current_question
                    )));
                }
                Ok(Self { current_question: next, ..self })
            }
            (transition, status) => {
                Err(QuizError::InvalidState { status, action: transition.as_str() })
            }
        }
    }

    pub(crate) fn accepts_answers(self) -> bool {
        self.status == LiveQuizStatus::Active
    }
}
