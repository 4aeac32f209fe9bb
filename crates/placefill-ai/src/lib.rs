//! Generated record content: one-line summaries and vocabulary-bound tags.
//!
//! Every generated field goes through [`ResilientGenerator`]: one prompt, an
//! ordered parse chain, validation, and a deterministic fallback. Callers
//! always get a value back.

pub mod generator;
pub mod llm;
pub mod parse;
pub mod summary;
pub mod tags;

pub use generator::{FallbackReason, Generation, GenerationTask, ResilientGenerator};
pub use llm::{LlmError, TextGenerator};
#[cfg(feature = "openai")]
pub use llm::{DEFAULT_MODEL, OpenAiClient};
pub use summary::{DEFAULT_LOCALITY, MIN_SUMMARY_CHARS, SummaryTask, fallback_summary, is_weak};
pub use tags::{TagSet, TagTask};
