//! Shared types used across all Empath crates.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

impl Role {
    /// Label used when the history is flattened into prompt text.
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Ai => "AI",
        }
    }
}

/// One turn of the conversation, resent by the caller on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
        }
    }
}

/// Body of `POST /support`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
}

impl SupportRequest {
    /// Flattens the history into one `Role: content` line per turn, in conversation order.
    pub fn flattened_history(&self) -> String {
        self.history
            .iter()
            .map(|turn| format!("{}: {}", turn.role.label(), turn.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Successful result of the support pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportResponse {
    pub emotion: String,
    pub behaviour: String,
    pub intelligence: String,
    pub mood_description: String,
    pub final_response: String,
}

/// Global application configuration (gateway + generation client). Load from TOML or env.
///
/// The provider API key is not part of this struct; it is read from the environment only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Application identity reported by `/v1/status`.
    pub app_name: String,
    /// Bind address for the gateway.
    pub host: String,
    /// HTTP port for the gateway.
    pub port: u16,
    /// LLM mode: "live" (external provider) or "mock" (deterministic local text).
    pub llm_mode: String,
    /// Base URL of an OpenAI-compatible API; `/chat/completions` is appended.
    pub llm_api_url: String,
    /// Model name sent with every completion request.
    pub llm_model: String,
    /// Sampling temperature for every pipeline step.
    pub temperature: f32,
    /// Allowed CORS origins. Empty means any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl CoreConfig {
    /// Load config from file and environment. Precedence: env `EMPATH__*` > `EMPATH_CONFIG` path
    /// (default `config/gateway.toml`) > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("EMPATH_CONFIG").unwrap_or_else(|_| "config/gateway.toml".to_string());
        let builder = config::Config::builder()
            .set_default("app_name", "Empath Support Gateway")?
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8000_i64)?
            .set_default("llm_mode", "live")?
            .set_default("llm_api_url", "https://api.openai.com/v1")?
            .set_default("llm_model", "gpt-3.5-turbo")?
            .set_default("temperature", 0.3_f64)?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix("EMPATH")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins"),
            )
            .build()?;

        built.try_deserialize()
    }

    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            app_name: "Empath Support Gateway".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            llm_mode: "live".to_string(),
            llm_api_url: "https://api.openai.com/v1".to_string(),
            llm_model: "gpt-3.5-turbo".to_string(),
            temperature: 0.3,
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattened_history_preserves_order_and_labels() {
        let req = SupportRequest {
            message: "and now?".to_string(),
            history: vec![
                ConversationTurn::user("I can't sleep"),
                ConversationTurn::ai("That sounds rough. What's keeping you up?"),
                ConversationTurn::user("Work stuff"),
            ],
        };
        assert_eq!(
            req.flattened_history(),
            "User: I can't sleep\nAI: That sounds rough. What's keeping you up?\nUser: Work stuff"
        );
    }

    #[test]
    fn empty_history_flattens_to_empty_string() {
        let req: SupportRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert!(req.history.is_empty());
        assert_eq!(req.flattened_history(), "");
    }

    #[test]
    fn roles_deserialize_from_lowercase() {
        let turn: ConversationTurn =
            serde_json::from_str(r#"{"role":"ai","content":"hello"}"#).unwrap();
        assert_eq!(turn.role, Role::Ai);
        assert!(serde_json::from_str::<ConversationTurn>(r#"{"role":"bot","content":"x"}"#).is_err());
    }

    #[test]
    fn default_config_is_live_on_port_8000() {
        let config = CoreConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.llm_mode, "live");
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn env_overrides_include_cors_origin_list() {
        std::env::set_var("EMPATH_CONFIG", "/nonexistent/gateway.toml");
        std::env::set_var(
            "EMPATH__CORS_ALLOWED_ORIGINS",
            "http://localhost:5173,https://support.example.com",
        );
        std::env::set_var("EMPATH__PORT", "9100");
        let loaded = CoreConfig::load();
        std::env::remove_var("EMPATH_CONFIG");
        std::env::remove_var("EMPATH__CORS_ALLOWED_ORIGINS");
        std::env::remove_var("EMPATH__PORT");

        let config = loaded.unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:5173", "https://support.example.com"]
        );
        assert_eq!(config.port, 9100);
        assert_eq!(config.llm_mode, "live");
    }
}
