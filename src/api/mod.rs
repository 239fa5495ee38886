pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod practice;
pub(crate) mod quizzes;
pub(crate) mod router;
