use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;
use crate::services::live_quiz::LiveQuizService;
use crate::services::practice::PracticeService;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: Option<PgPool>,
    quizzes: LiveQuizService,
    practice: PracticeService,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        db: Option<PgPool>,
        quizzes: LiveQuizService,
        practice: PracticeService,
    ) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, quizzes, practice }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// The pool is absent when quiz state is kept in memory.
    pub(crate) fn db(&self) -> Option<&PgPool> {
        self.inner.db.as_ref()
    }

    pub(crate) fn quizzes(&self) -> &LiveQuizService {
        &self.inner.quizzes
    }

    pub(crate) fn practice(&self) -> &PracticeService {
        &self.inner.practice
    }
}
