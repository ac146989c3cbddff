//! Concrete generation clients for the support pipeline.

pub use empath_core::TextGenerator;

mod model_router;

pub use model_router::{completion_text, LlmMode, ModelRouter, RouterError, ENV_LLM_API_KEY};
