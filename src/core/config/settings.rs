use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_cors_origins, parse_environment,
    parse_store_backend, parse_u16, parse_u32, parse_u64,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    ApiSettings, ConfigError, CorsSettings, DatabaseSettings, QuizSettings, RuntimeSettings,
    SecuritySettings, ServerHost, ServerPort, ServerSettings, Settings, StoreBackend,
    TelemetrySettings,
};

/// Hard ceiling for a single quiz's capacity regardless of configuration.
const CAPACITY_CEILING: u32 = 10_000;

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("QUIZ_HOST", "0.0.0.0");
        let port = env_or_default("QUIZ_PORT", "8000");

        let environment =
            parse_environment(env_optional("QUIZ_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("QUIZ_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "ClassQuiz API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let secret_key = match env_optional("SECRET_KEY") {
            Some(value) => value,
            None => load_or_create_secret_key(),
        };
        let access_token_expire_minutes = parse_u64(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "10080"),
        )?;
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "classquiz");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "classquiz");
        let database_url = env_optional("DATABASE_URL");
        let max_connections =
            parse_u32("POSTGRES_MAX_CONNECTIONS", env_or_default("POSTGRES_MAX_CONNECTIONS", "30"))?;

        let store_backend = parse_store_backend(env_optional("QUIZ_STORE_BACKEND"))?;
        let max_participants =
            parse_u32("QUIZ_MAX_PARTICIPANTS", env_or_default("QUIZ_MAX_PARTICIPANTS", "500"))?;
        let max_questions =
            parse_u32("QUIZ_MAX_QUESTIONS", env_or_default("QUIZ_MAX_QUESTIONS", "100"))?;
        let code_attempts =
            parse_u32("QUIZ_CODE_ATTEMPTS", env_or_default("QUIZ_CODE_ATTEMPTS", "5"))?;
        let transition_retries = parse_u32(
            "QUIZ_TRANSITION_RETRIES",
            env_or_default("QUIZ_TRANSITION_RETRIES", "8"),
        )?;

        let log_level = env_or_default("QUIZ_LOG_LEVEL", "info");
        let json = env_optional("QUIZ_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings { secret_key, access_token_expire_minutes, algorithm },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
                max_connections,
            },
            quiz: QuizSettings {
                store_backend,
                max_participants,
                max_questions,
                code_attempts,
                transition_retries,
            },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn quiz(&self) -> &QuizSettings {
        &self.quiz
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.quiz.max_participants == 0 || self.quiz.max_participants > CAPACITY_CEILING {
            return Err(ConfigError::InvalidValue {
                field: "QUIZ_MAX_PARTICIPANTS",
                value: self.quiz.max_participants.to_string(),
            });
        }

        if self.quiz.max_questions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "QUIZ_MAX_QUESTIONS",
                value: "0".to_string(),
            });
        }

        if self.quiz.code_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "QUIZ_CODE_ATTEMPTS",
                value: "0".to_string(),
            });
        }

        if self.quiz.transition_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "QUIZ_TRANSITION_RETRIES",
                value: "0".to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "POSTGRES_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.quiz.store_backend == StoreBackend::Postgres
            && self.database.database_url.is_none()
            && self.database.postgres_password.is_empty()
        {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if env_optional("SECRET_KEY").is_none() {
            return Err(ConfigError::MissingSecret("SECRET_KEY"));
        }

        Ok(())
    }
}
