//! meetquiz-core: Quiz lifecycle and evaluation engine.
//!
//! This crate defines the data model, the content generator and store seams,
//! and the engine that creates meeting quizzes, grades attempts, and derives
//! user and team evaluations from them.

pub mod engine;
pub mod error;
pub mod evaluation;
pub mod grading;
pub mod locks;
pub mod memory;
pub mod model;
pub mod parser;
pub mod quiz;
pub mod report;
pub mod state_lock;
pub mod statistics;
pub mod store;
pub mod summary;
pub mod team;
pub mod traits;

#[cfg(test)]
mod fixtures;

pub use engine::{EngineConfig, QuizEngine};
pub use error::{GeneratorError, QuizError, StoreError};
pub use grading::SubmittedAnswer;
pub use memory::MemoryStore;
pub use model::QuizType;
pub use state_lock::StateLock;
pub use store::Store;
pub use traits::{ContentGenerator, LlmProvider};
