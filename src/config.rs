use secrecy::{ExposeSecret, SecretString};
use std::{env, time::Duration};

use crate::{
    errors::{AppError, AppResult},
    models::domain::Stage,
    services::stage_sequencer::StageSequencer,
};

const DEFAULT_STAGES: &str = "Understand:2,Implement:4,Review:2,Evaluate:1";
const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 3600;

#[derive(Clone, Debug)]
pub struct Config {
    pub web_server_host: String,
    pub web_server_port: u16,
    pub problems_dir: String,
    pub solution_extension: String,
    pub solution_language: String,
    pub openai_api_key: SecretString,
    pub openai_api_base: Option<String>,
    pub openai_model: String,
    pub openai_temperature: f32,
    pub mongo_conn_string: Option<String>,
    pub mongo_db_name: String,
    pub questions_collection: String,
    pub stages: Vec<Stage>,
    pub session_idle_ttl_secs: u64,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        let stages = Stage::parse_table(
            &env::var("QUIZ_STAGES").unwrap_or_else(|_| DEFAULT_STAGES.to_string()),
        )?;

        Ok(Self {
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            problems_dir: env::var("PROBLEMS_DIR").unwrap_or_else(|_| "./questions".to_string()),
            solution_extension: env::var("SOLUTION_EXTENSION")
                .unwrap_or_else(|_| "cpp".to_string()),
            solution_language: env::var("SOLUTION_LANGUAGE")
                .unwrap_or_else(|_| "C++".to_string()),
            openai_api_key: SecretString::from(env::var("OPENAI_API_KEY").unwrap_or_default()),
            openai_api_base: env::var("OPENAI_API_BASE").ok().filter(|v| !v.is_empty()),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_temperature: env::var("OPENAI_TEMPERATURE")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(0.0),
            mongo_conn_string: env::var("MONGO_CONN_STRING").ok().filter(|v| !v.is_empty()),
            mongo_db_name: env::var("MONGO_DB_NAME").unwrap_or_else(|_| "umpire-quiz".to_string()),
            questions_collection: env::var("QUESTIONS_COLLECTION")
                .unwrap_or_else(|_| "generated_questions".to_string()),
            stages,
            session_idle_ttl_secs: env::var("SESSION_IDLE_TTL_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(DEFAULT_SESSION_IDLE_TTL_SECS),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|origins| parse_list(&origins))
                .unwrap_or_default(),
        })
    }

    /// Checks settings the server cannot run without.
    pub fn validate(&self) -> AppResult<()> {
        if self.openai_api_key.expose_secret().trim().is_empty() {
            return Err(AppError::ValidationError(
                "OPENAI_API_KEY must be set".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.openai_temperature) {
            return Err(AppError::ValidationError(format!(
                "OPENAI_TEMPERATURE must be between 0 and 2, got {}",
                self.openai_temperature
            )));
        }
        if self.session_idle_ttl_secs == 0 {
            return Err(AppError::ValidationError(
                "SESSION_IDLE_TTL_SECS must be at least 1".to_string(),
            ));
        }
        self.stage_sequencer()?;
        Ok(())
    }

    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_ttl_secs)
    }

    pub fn stage_sequencer(&self) -> AppResult<StageSequencer> {
        StageSequencer::new(self.stages.clone())
    }

    /// Connection string for the question archive; `None` disables archiving.
    pub fn archive_conn_string(&self) -> Option<&str> {
        self.mongo_conn_string
            .as_deref()
            .filter(|conn| !conn.trim().is_empty())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            problems_dir: "./questions".to_string(),
            solution_extension: "cpp".to_string(),
            solution_language: "C++".to_string(),
            openai_api_key: SecretString::from("test-openai-key".to_string()),
            openai_api_base: None,
            openai_model: "gpt-4o-mini".to_string(),
            openai_temperature: 0.0,
            mongo_conn_string: None,
            mongo_db_name: "umpire-quiz-test".to_string(),
            questions_collection: "generated_questions".to_string(),
            stages: Stage::default_table(),
            session_idle_ttl_secs: DEFAULT_SESSION_IDLE_TTL_SECS,
            cors_allowed_origins: vec![],
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_with_defaults() {
        let config = Config::from_env().unwrap();

        assert!(!config.mongo_db_name.is_empty());
        assert!(!config.stages.is_empty());
        assert!(config.web_server_port > 0);
    }

    #[test]
    fn test_test_config() {
        let config = Config::test_config();

        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.stages, Stage::default_table());
        assert!(config.archive_conn_string().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_key() {
        let mut config = Config::test_config();
        config.openai_api_key = SecretString::from(String::new());

        assert!(matches!(
            config.validate(),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_idle_ttl() {
        let mut config = Config::test_config();
        config.session_idle_ttl_secs = 0;

        assert!(config.validate().is_err());
        assert_eq!(Config::test_config().session_idle_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn test_blank_conn_string_disables_archive() {
        let mut config = Config::test_config();
        config.mongo_conn_string = Some("  ".to_string());
        assert!(config.archive_conn_string().is_none());

        config.mongo_conn_string = Some("mongodb://localhost:27017".to_string());
        assert_eq!(config.archive_conn_string(), Some("mongodb://localhost:27017"));
    }

    #[test]
    fn test_validate_rejects_bad_stage_table() {
        let mut config = Config::test_config();
        config.stages = vec![Stage::new("Review", 1), Stage::new("Review", 1)];

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_list_skips_blanks() {
        assert_eq!(
            parse_list("http://localhost:3000, ,https://quiz.example.com"),
            vec!["http://localhost:3000", "https://quiz.example.com"]
        );
    }
}
