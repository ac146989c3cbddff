//! empath-core: shared types, tone table, prompt templates, safety checks, and the
//! support pipeline orchestrator.
//!
//! The pipeline itself never talks to a provider; it drives whatever [`TextGenerator`]
//! it is given (see `empath-skills` for the concrete clients).

mod error;
mod orchestrator;
mod safety;
mod shared;

pub mod prompts;
pub mod tone;

pub use error::{BoxError, PipelineError, Result};

pub use shared::{ConversationTurn, CoreConfig, Role, SupportRequest, SupportResponse};

pub use safety::{flag_content, validate_safety, ADVISORY_PATTERNS, BANNED_PATTERNS};

pub use tone::{ToneEntry, SMALL_TALK, TONE_TABLE};

pub use orchestrator::{AgentInsight, MoodResult, Orchestrator, TextGenerator};
