//! Model Router: sends a prompt to an LLM (mock or live API) and returns the generated text.

use empath_core::prompts::{AgentKind, PromptRole};
use empath_core::{tone, BoxError, CoreConfig, TextGenerator};
use serde::Serialize;
use serde_json::Value;

const CLIENT_NAME: &str = "ModelRouter";
/// Environment variable holding the provider API key (live mode only).
pub const ENV_LLM_API_KEY: &str = "OPENAI_API_KEY";
/// Tone the mock Mood Agent always reports.
const MOCK_TONE: &str = "neutral_checkin";

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("Missing {0}")]
    MissingApiKey(&'static str),

    #[error("Unknown llm_mode '{0}' (expected \"live\" or \"mock\")")]
    UnknownMode(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Provider response had no completion text")]
    EmptyCompletion,
}

/// Mode for LLM invocation: mock (deterministic local text) or live (external API).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LlmMode {
    Mock,
    Live,
}

impl LlmMode {
    pub fn parse(s: &str) -> Result<Self, RouterError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(LlmMode::Mock),
            "live" => Ok(LlmMode::Live),
            other => Err(RouterError::UnknownMode(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LlmMode::Mock => "mock",
            LlmMode::Live => "live",
        }
    }
}

struct LiveClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 1],
}

/// Routes a prompt to the mock generator or an OpenAI-compatible chat-completions API.
pub struct ModelRouter {
    mode: LlmMode,
    live: Option<LiveClient>,
}

impl ModelRouter {
    /// Mock-only router; never touches the network.
    pub fn mock() -> Self {
        Self {
            mode: LlmMode::Mock,
            live: None,
        }
    }

    /// Builds the router from config, reading the API key from the environment in live mode.
    pub fn from_config(config: &CoreConfig) -> Result<Self, RouterError> {
        let key = std::env::var(ENV_LLM_API_KEY).ok();
        Self::from_config_with_key(config, key)
    }

    /// Like [`ModelRouter::from_config`] with an explicit key. A blank key counts as missing.
    pub fn from_config_with_key(config: &CoreConfig, api_key: Option<String>) -> Result<Self, RouterError> {
        match LlmMode::parse(&config.llm_mode)? {
            LlmMode::Mock => Ok(Self::mock()),
            LlmMode::Live => {
                let api_key = api_key
                    .filter(|k| !k.trim().is_empty())
                    .ok_or(RouterError::MissingApiKey(ENV_LLM_API_KEY))?;
                Ok(Self {
                    mode: LlmMode::Live,
                    live: Some(LiveClient {
                        http: reqwest::Client::new(),
                        api_url: config.llm_api_url.trim_end_matches('/').to_string(),
                        api_key,
                        model: config.llm_model.clone(),
                        temperature: config.temperature,
                    }),
                })
            }
        }
    }

    pub fn mode(&self) -> LlmMode {
        self.mode
    }

    /// Mock LLM: deterministic, role-aware text so the whole pipeline runs without a key.
    /// The Mood Agent gets a valid JSON row from the tone table.
    fn mock_generate(&self, prompt: &str) -> String {
        match PromptRole::detect(prompt) {
            Some(PromptRole::Mood) => mock_mood_json(),
            Some(PromptRole::Agent(kind)) => mock_agent_sentence(kind).to_string(),
            Some(PromptRole::Reflection(_)) => {
                let original = quoted_insight(prompt).unwrap_or("the agent's suggestion");
                format!("Put another way: {}", original)
            }
            Some(PromptRole::Conductor) => {
                "That sounds like a lot to hold; a short walk could help you reset, and I'm here if you want to talk it through.".to_string()
            }
            None => {
                let preview = prompt
                    .chars()
                    .take(80)
                    .chain(if prompt.chars().count() > 80 { "…" } else { "" }.chars())
                    .collect::<String>();
                format!("[Generated – Mock LLM] Based on your prompt ({}), here is a response.", preview)
            }
        }
    }

    async fn live_generate(&self, client: &LiveClient, prompt: &str) -> Result<String, RouterError> {
        let url = format!("{}/chat/completions", client.api_url);
        let body = ChatCompletionRequest {
            model: &client.model,
            temperature: client.temperature,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let response = client
            .http
            .post(&url)
            .bearer_auth(&client.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RouterError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = response.json().await?;
        completion_text(&json)
    }
}

#[async_trait::async_trait]
impl TextGenerator for ModelRouter {
    fn name(&self) -> &str {
        CLIENT_NAME
    }

    async fn generate(&self, prompt: &str) -> Result<String, BoxError> {
        let generated = match (self.mode, self.live.as_ref()) {
            (LlmMode::Live, Some(client)) => self.live_generate(client, prompt).await?,
            _ => self.mock_generate(prompt),
        };
        tracing::debug!(
            target: "empath::router",
            mode = self.mode.as_str(),
            prompt_len = prompt.len(),
            generated_len = generated.len(),
            "Generation complete"
        );
        Ok(generated)
    }
}

/// Extracts `choices[0].message.content` from a chat-completions response.
pub fn completion_text(response: &Value) -> Result<String, RouterError> {
    response
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .ok_or(RouterError::EmptyCompletion)
}

fn mock_mood_json() -> String {
    let entry = tone::lookup(MOCK_TONE).unwrap_or(&tone::TONE_TABLE[0]);
    serde_json::json!({
        "tone": entry.label,
        "description": entry.description,
        "e_conf": entry.e_conf,
        "b_conf": entry.b_conf,
        "i_conf": entry.i_conf,
    })
    .to_string()
}

fn mock_agent_sentence(kind: AgentKind) -> &'static str {
    match kind {
        AgentKind::Emotion => "That sounds like a lot to carry today; what's weighing on you most?",
        AgentKind::Behaviour => "Maybe try a five-minute walk to clear your head before deciding anything.",
        AgentKind::Intelligence => {
            "Research suggests short movement breaks can lower stress, which may help you feel steadier."
        }
    }
}

/// The insight quoted on the line after `Original insight:` in a reflection prompt.
fn quoted_insight(prompt: &str) -> Option<&str> {
    let mut lines = prompt.lines().skip_while(|l| !l.starts_with("Original insight:"));
    lines.next()?;
    let line = lines.next()?.trim();
    Some(line.trim_matches('"')).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use empath_core::prompts;
    use empath_core::{MoodResult, Orchestrator, SupportRequest};
    use std::sync::Arc;

    fn live_config(api_url: &str) -> CoreConfig {
        CoreConfig {
            llm_mode: "live".to_string(),
            llm_api_url: api_url.to_string(),
            llm_model: "test-model".to_string(),
            ..CoreConfig::default()
        }
    }

    #[test]
    fn mode_parsing() {
        assert_eq!(LlmMode::parse("live").unwrap(), LlmMode::Live);
        assert_eq!(LlmMode::parse(" MOCK ").unwrap(), LlmMode::Mock);
        assert!(matches!(LlmMode::parse("local"), Err(RouterError::UnknownMode(m)) if m == "local"));
    }

    #[test]
    fn live_mode_requires_api_key() {
        let config = live_config("https://api.example.com/v1");
        let err = ModelRouter::from_config_with_key(&config, None).err().unwrap();
        assert!(matches!(err, RouterError::MissingApiKey(ENV_LLM_API_KEY)));
        let err = ModelRouter::from_config_with_key(&config, Some("  ".to_string())).err().unwrap();
        assert!(matches!(err, RouterError::MissingApiKey(_)));
    }

    #[test]
    fn default_config_selects_live_mode() {
        let router =
            ModelRouter::from_config_with_key(&CoreConfig::default(), Some("sk-test".to_string()))
                .unwrap();
        assert_eq!(router.mode(), LlmMode::Live);
        assert_eq!(router.mode().as_str(), CoreConfig::default().llm_mode);
    }

    #[test]
    fn mock_mode_needs_no_key() {
        let config = CoreConfig {
            llm_mode: "mock".to_string(),
            ..CoreConfig::default()
        };
        let router = ModelRouter::from_config_with_key(&config, None).unwrap();
        assert_eq!(router.mode(), LlmMode::Mock);
    }

    #[tokio::test]
    async fn mock_mood_output_decodes() {
        let router = ModelRouter::mock();
        let raw = router.generate(&prompts::mood_prompt("", "hi")).await.unwrap();
        let mood = MoodResult::decode(&raw).unwrap();
        assert_eq!(mood.tone, MOCK_TONE);
        assert!((mood.confidence_sum() - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn mock_reflection_echoes_the_insight() {
        let router = ModelRouter::mock();
        let prompt = prompts::reflection_prompt(AgentKind::Emotion, "Sounds tough, what happened?");
        let out = router.generate(&prompt).await.unwrap();
        assert_eq!(out, "Put another way: Sounds tough, what happened?");
    }

    #[tokio::test]
    async fn mock_router_drives_the_full_pipeline() {
        let orchestrator = Orchestrator::new(Arc::new(ModelRouter::mock()));
        let req = SupportRequest {
            message: "work has been rough".to_string(),
            history: Vec::new(),
        };
        let res = orchestrator.handle_at(&req, 15).await.unwrap();
        assert!(!res.emotion.is_empty());
        assert!(!res.behaviour.is_empty());
        assert!(!res.intelligence.is_empty());
        assert!(!res.mood_description.is_empty());
        assert!(!res.final_response.is_empty());
    }

    #[test]
    fn completion_text_extraction() {
        let ok = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "Hello there." } }]
        });
        assert_eq!(completion_text(&ok).unwrap(), "Hello there.");
        let empty = serde_json::json!({ "choices": [] });
        assert!(matches!(completion_text(&empty), Err(RouterError::EmptyCompletion)));
        let blank = serde_json::json!({ "choices": [{ "message": { "content": "  " } }] });
        assert!(completion_text(&blank).is_err());
    }

    async fn spawn_provider(status: u16, body: Value) -> String {
        use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};

        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap, Json(req): Json<Value>| {
                let body = body.clone();
                async move {
                    let authorized = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        == Some("Bearer test-key");
                    let well_formed = req["model"] == "test-model"
                        && req["messages"][0]["role"] == "user"
                        && (req["temperature"].as_f64().unwrap_or(0.0) - 0.3).abs() < 1e-6;
                    if !authorized || !well_formed {
                        return (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": "bad request" })));
                    }
                    (StatusCode::from_u16(status).unwrap(), Json(body))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1/", addr)
    }

    #[tokio::test]
    async fn live_mode_posts_chat_completion() {
        let url = spawn_provider(
            200,
            serde_json::json!({ "choices": [{ "message": { "content": "Live reply." } }] }),
        )
        .await;
        let router = ModelRouter::from_config_with_key(&live_config(&url), Some("test-key".to_string())).unwrap();
        assert_eq!(router.generate("hello").await.unwrap(), "Live reply.");
    }

    #[tokio::test]
    async fn live_mode_surfaces_provider_errors() {
        let url = spawn_provider(503, serde_json::json!({ "error": "overloaded" })).await;
        let router = ModelRouter::from_config_with_key(&live_config(&url), Some("test-key".to_string())).unwrap();
        let err = router.generate("hello").await.unwrap_err();
        assert!(err.to_string().contains("HTTP 503"));
    }
}
