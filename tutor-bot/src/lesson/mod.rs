//! Lesson content generation
//!
//! The dispatcher talks to a [`LessonGenerator`]; production uses the
//! OpenRouter chat-completions client, tests plug in stubs.

use async_trait::async_trait;
use thiserror::Error;

pub mod openrouter;
pub mod prompt;

pub use openrouter::OpenRouterClient;

/// Parameters for one generated lesson part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonRequest {
    pub topic: String,
    pub age: i64,
    pub name: String,
    /// Lesson part within the topic, starting at 1
    pub stage: i64,
}

impl LessonRequest {
    /// First part of a topic
    pub fn new(topic: impl Into<String>, age: i64, name: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            age,
            name: name.into(),
            stage: 1,
        }
    }

    pub fn with_stage(mut self, stage: i64) -> Self {
        self.stage = stage.max(1);
        self
    }
}

/// Lesson generation failures (the ServiceError of the dispatcher)
#[derive(Debug, Error)]
pub enum LessonError {
    #[error("Lesson service not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Lesson service timed out after {0} seconds")]
    Timeout(u64),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unusable lesson content: {0}")]
    EmptyContent(String),
}

/// Source of lesson text
#[async_trait]
pub trait LessonGenerator: Send + Sync {
    /// Identifier used in logs and the health endpoint
    fn provider_id(&self) -> &'static str;

    /// Generate lesson text for `request`
    ///
    /// Implementations bound their own wait time and report expiry as
    /// [`LessonError::Timeout`].
    async fn generate_lesson(&self, request: &LessonRequest) -> Result<String, LessonError>;

    /// Whether the generator has what it needs to make calls
    fn is_configured(&self) -> bool {
        true
    }
}
