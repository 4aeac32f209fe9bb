//! Generate-validate-fallback driver shared by every generated field.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm::TextGenerator;

/// Why the deterministic fallback was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No generator configured.
    Unavailable,
    /// The generation call itself failed.
    Transport(String),
    /// No structured value could be recovered from the response.
    Unparseable,
    /// The recovered value failed validation.
    Weak,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::Transport(_) => "transport",
            Self::Unparseable => "unparseable",
            Self::Weak => "weak",
        }
    }
}

/// Outcome of one generation. There is no failure state.
#[derive(Debug, Clone, PartialEq)]
pub enum Generation<T> {
    Generated(T),
    Fallback { value: T, reason: FallbackReason },
}

impl<T> Generation<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Generated(v) | Self::Fallback { value: v, .. } => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Generated(v) | Self::Fallback { value: v, .. } => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            Self::Generated(_) => None,
            Self::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// One kind of generated content: how to ask, how to read the answer, and
/// what to use when the answer is unusable.
pub trait GenerationTask {
    type Output;

    /// Short label for logs.
    fn label(&self) -> &'static str;

    fn prompt(&self) -> String;

    /// Parse and validate a raw response.
    fn interpret(&self, raw: &str) -> Result<Self::Output, FallbackReason>;

    /// Deterministic value used when generation is unavailable or unusable.
    fn fallback(&self) -> Self::Output;
}

/// Runs [`GenerationTask`]s against an optional text generator.
#[derive(Clone, Default)]
pub struct ResilientGenerator {
    llm: Option<Arc<dyn TextGenerator>>,
}

impl ResilientGenerator {
    pub fn new(llm: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { llm }
    }

    /// A generator that always falls back.
    pub fn unavailable() -> Self {
        Self { llm: None }
    }

    pub fn is_available(&self) -> bool {
        self.llm.is_some()
    }

    pub async fn run<T: GenerationTask>(&self, task: &T) -> Generation<T::Output> {
        let Some(llm) = &self.llm else {
            debug!(task = task.label(), "no generator configured, using fallback");
            return Generation::Fallback {
                value: task.fallback(),
                reason: FallbackReason::Unavailable,
            };
        };

        let raw = match llm.generate(&task.prompt()).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(task = task.label(), error = %e, "generation failed, using fallback");
                return Generation::Fallback {
                    value: task.fallback(),
                    reason: FallbackReason::Transport(e.to_string()),
                };
            }
        };

        match task.interpret(&raw) {
            Ok(value) => Generation::Generated(value),
            Err(reason) => {
                debug!(
                    task = task.label(),
                    reason = reason.as_str(),
                    raw = %raw.chars().take(200).collect::<String>(),
                    "generated output rejected, using fallback"
                );
                Generation::Fallback {
                    value: task.fallback(),
                    reason,
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;

    use crate::llm::{LlmError, TextGenerator};

    /// Replies with a fixed string, or fails with a server error.
    pub struct Canned(pub Result<&'static str, u16>);

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            match self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(LlmError::Server {
                    status,
                    body: "boom".into(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Canned;
    use super::*;

    struct Echo;

    impl GenerationTask for Echo {
        type Output = String;

        fn label(&self) -> &'static str {
            "echo"
        }

        fn prompt(&self) -> String {
            "say something".into()
        }

        fn interpret(&self, raw: &str) -> Result<String, FallbackReason> {
            if raw.is_empty() {
                Err(FallbackReason::Weak)
            } else {
                Ok(raw.to_uppercase())
            }
        }

        fn fallback(&self) -> String {
            "fallback".into()
        }
    }

    fn with(reply: Result<&'static str, u16>) -> ResilientGenerator {
        ResilientGenerator::new(Some(Arc::new(Canned(reply))))
    }

    #[tokio::test]
    async fn unavailable_uses_fallback() {
        let g = ResilientGenerator::unavailable().run(&Echo).await;
        assert_eq!(g.fallback_reason(), Some(&FallbackReason::Unavailable));
        assert_eq!(g.into_value(), "fallback");
    }

    #[tokio::test]
    async fn transport_error_uses_fallback() {
        let g = with(Err(503)).run(&Echo).await;
        assert!(matches!(
            g.fallback_reason(),
            Some(FallbackReason::Transport(_))
        ));
        assert_eq!(g.value(), "fallback");
    }

    #[tokio::test]
    async fn rejected_output_uses_fallback() {
        let g = with(Ok("")).run(&Echo).await;
        assert_eq!(g.fallback_reason(), Some(&FallbackReason::Weak));
    }

    #[tokio::test]
    async fn accepted_output_is_generated() {
        let g = with(Ok("hi")).run(&Echo).await;
        assert!(!g.is_fallback());
        assert_eq!(g.into_value(), "HI");
    }
}
