pub(crate) mod identity;
pub(crate) mod live_quiz;
pub(crate) mod practice;
