pub(crate) mod models;
pub(crate) mod types;

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};

use crate::core::config::DatabaseSettings;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);
const IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Opens the quiz database pool. Statement logging stays off; slow queries
/// surface through the request trace instead.
pub(crate) async fn connect(database: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let options = database
        .database_url()
        .parse::<PgConnectOptions>()?
        .application_name("classquiz")
        .log_statements(tracing::log::LevelFilter::Off);

    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .min_connections(1)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .connect_with(options)
        .await?;

    tracing::info!(max_connections = database.max_connections, "Quiz database pool ready");
    Ok(pool)
}

pub(crate) async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
