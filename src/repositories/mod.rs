pub(crate) mod health;
pub(crate) mod live_quiz_answers;
pub(crate) mod live_quiz_participants;
pub(crate) mod live_quizzes;
pub(crate) mod practice_quizzes;
