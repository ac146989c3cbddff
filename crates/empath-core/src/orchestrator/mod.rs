//! Support pipeline: mood → three role agents → three reflections → conductor → safety.

mod mood;

pub use mood::MoodResult;

use crate::error::{BoxError, PipelineError, Result};
use crate::prompts::{self, AgentKind, ConductorInput, PromptRole};
use crate::safety;
use crate::shared::{SupportRequest, SupportResponse};
use chrono::Timelike;
use std::sync::Arc;

/// Trait implemented by every generation client.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Client name for logs and status.
    fn name(&self) -> &str;

    /// Sends one prompt and returns the generated text.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, BoxError>;
}

/// Raw and reflected output of one role agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInsight {
    pub kind: AgentKind,
    pub raw: String,
    pub reflected: String,
}

/// Runs the fixed support pipeline against a shared generation client.
pub struct Orchestrator {
    generator: Arc<dyn TextGenerator>,
}

impl Orchestrator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Name of the underlying generation client.
    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Handles one request using the local wall-clock hour for the context rules.
    pub async fn handle(&self, req: &SupportRequest) -> Result<SupportResponse> {
        self.handle_at(req, chrono::Local::now().hour()).await
    }

    /// Handles one request as if it arrived at `hour` (0–23, local time).
    pub async fn handle_at(&self, req: &SupportRequest, hour: u32) -> Result<SupportResponse> {
        let history = req.flattened_history();
        let user_input = req.message.as_str();
        let context = prompts::context_rules(hour);
        tracing::info!(
            target: "empath::pipeline",
            turns = req.history.len(),
            chars = user_input.chars().count(),
            "New support message"
        );
        tracing::debug!(target: "empath::pipeline", history = %history, context, "Pipeline context");

        let mood_raw = self
            .call(PromptRole::Mood, prompts::mood_prompt(&history, user_input))
            .await?;
        let mood = MoodResult::decode(&mood_raw)?;
        tracing::debug!(
            target: "empath::pipeline",
            tone = %mood.tone,
            e_conf = mood.e_conf,
            b_conf = mood.b_conf,
            i_conf = mood.i_conf,
            "Mood confidences"
        );

        let (e_raw, b_raw, i_raw) = tokio::try_join!(
            self.call(
                PromptRole::Agent(AgentKind::Emotion),
                prompts::emotion_prompt(&history, user_input),
            ),
            self.call(
                PromptRole::Agent(AgentKind::Behaviour),
                prompts::behaviour_prompt(&history, user_input),
            ),
            self.call(
                PromptRole::Agent(AgentKind::Intelligence),
                prompts::intelligence_prompt(&history, user_input, context),
            ),
        )?;

        let (emotion, behaviour, intelligence) = tokio::try_join!(
            self.reflect(AgentKind::Emotion, e_raw),
            self.reflect(AgentKind::Behaviour, b_raw),
            self.reflect(AgentKind::Intelligence, i_raw),
        )?;

        let final_response = self
            .call(
                PromptRole::Conductor,
                prompts::conductor_prompt(&ConductorInput {
                    history: &history,
                    user_input,
                    tone: &mood.tone,
                    tone_description: &mood.description,
                    e_insight: &emotion.reflected,
                    b_insight: &behaviour.reflected,
                    i_insight: &intelligence.reflected,
                    e_conf: mood.e_conf,
                    b_conf: mood.b_conf,
                    i_conf: mood.i_conf,
                }),
            )
            .await?;

        if !safety::validate_safety(&final_response) {
            tracing::warn!(target: "empath::safety", tone = %mood.tone, "Conductor reply blocked by safety policy");
            return Err(PipelineError::SafetyViolation);
        }
        let flags = safety::flag_content(&final_response);
        if !flags.is_empty() {
            tracing::warn!(target: "empath::safety", ?flags, "Content flags");
        }
        tracing::info!(target: "empath::pipeline", tone = %mood.tone, "Final reply merged");

        Ok(SupportResponse {
            emotion: emotion.reflected,
            behaviour: behaviour.reflected,
            intelligence: intelligence.reflected,
            mood_description: mood.description,
            final_response,
        })
    }

    async fn reflect(&self, kind: AgentKind, raw: String) -> Result<AgentInsight> {
        let reflected = self
            .call(PromptRole::Reflection(kind), prompts::reflection_prompt(kind, &raw))
            .await?;
        Ok(AgentInsight { kind, raw, reflected })
    }

    async fn call(&self, step: PromptRole, prompt: String) -> Result<String> {
        let text = self
            .generator
            .generate(&prompt)
            .await
            .map_err(PipelineError::generation(step))?;
        tracing::trace!(target: "empath::pipeline", %step, chars = text.chars().count(), "Generation step complete");
        Ok(text.trim().to_string())
    }
}
