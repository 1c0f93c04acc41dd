//! meetquiz-providers: LLM-backed content generation.
//!
//! Implements `LlmProvider` for OpenAI-compatible chat-completion APIs
//! (OpenRouter by default) and builds the engine's `ContentGenerator` on top of
//! any provider.

pub mod config;
pub mod error;
pub mod generator;
pub mod mock;
pub mod openai;
pub mod prompts;

pub use config::{
    create_generator, create_provider, load_config, load_config_from, MeetquizConfig, ProviderConfig,
};
pub use error::ProviderError;
pub use generator::{GenerationSettings, LlmContentGenerator};
