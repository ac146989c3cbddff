//! Error types for the support pipeline.

use crate::prompts::PromptRole;
use thiserror::Error;

/// Boxed error returned by generation clients.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{step} generation failed: {source}")]
    Generation {
        step: PromptRole,
        #[source]
        source: BoxError,
    },

    #[error("Malformed mood output: {0}")]
    MalformedMood(String),

    /// The offending text is never part of the message.
    #[error("Safety policy violation")]
    SafetyViolation,
}

impl PipelineError {
    pub(crate) fn generation(step: PromptRole) -> impl FnOnce(BoxError) -> Self {
        move |source| PipelineError::Generation { step, source }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
