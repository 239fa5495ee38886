use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_join(outcome: &'static str) {
    metrics::counter!("quiz_joins_total", "outcome" => outcome).increment(1);
}

pub(crate) fn record_answer(correct: bool) {
    let label = if correct { "true" } else { "false" };
    metrics::counter!("quiz_answers_total", "correct" => label).increment(1);
}

pub(crate) fn record_transition(action: &'static str) {
    metrics::counter!("quiz_transitions_total", "action" => action).increment(1);
}

pub(crate) fn record_practice_submission(percentage: f64) {
    metrics::counter!("practice_submissions_total").increment(1);
    metrics::histogram!("practice_score_percentage").record(percentage);
}
