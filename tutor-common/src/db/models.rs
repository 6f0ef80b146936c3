//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Row of the `users` table
///
/// Keyed by phone number (without the `whatsapp:` transport prefix).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub phone_number: String,
    pub name: Option<String>,
    pub age: Option<i64>,
    pub country: Option<String>,
    /// JSON array of subject names
    pub preferred_subjects: Option<String>,
    pub learning_mode: Option<String>,
    pub language: String,
    pub onboarding_step: String,
    pub onboarded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Age assumed when a profile has none recorded
pub const DEFAULT_LEARNER_AGE: i64 = 10;

impl User {
    /// Name for greetings, empty when not yet collected
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn learner_age(&self) -> i64 {
        self.age.unwrap_or(DEFAULT_LEARNER_AGE)
    }

    /// Decode the stored subject list
    pub fn subjects(&self) -> Vec<String> {
        self.preferred_subjects
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default()
    }

    /// Stored step, or `None` when the column holds an unknown value
    pub fn step(&self) -> Option<OnboardingStep> {
        OnboardingStep::parse(&self.onboarding_step)
    }
}

/// Row of the `progress` table (append-only)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Progress {
    pub id: i64,
    pub phone_number: String,
    pub topic: String,
    /// Lesson part within the topic, starting at 1
    pub stage: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Onboarding state machine, persisted in `users.onboarding_step`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Name,
    Age,
    Country,
    Subjects,
    LearningMode,
    Language,
    Completed,
}

impl OnboardingStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStep::Name => "name",
            OnboardingStep::Age => "age",
            OnboardingStep::Country => "country",
            OnboardingStep::Subjects => "subjects",
            OnboardingStep::LearningMode => "learning_mode",
            OnboardingStep::Language => "language",
            OnboardingStep::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(OnboardingStep::Name),
            "age" => Some(OnboardingStep::Age),
            "country" => Some(OnboardingStep::Country),
            "subjects" => Some(OnboardingStep::Subjects),
            "learning_mode" => Some(OnboardingStep::LearningMode),
            "language" => Some(OnboardingStep::Language),
            "completed" => Some(OnboardingStep::Completed),
            _ => None,
        }
    }

    /// Step that follows this one
    pub fn next(&self) -> Self {
        match self {
            OnboardingStep::Name => OnboardingStep::Age,
            OnboardingStep::Age => OnboardingStep::Country,
            OnboardingStep::Country => OnboardingStep::Subjects,
            OnboardingStep::Subjects => OnboardingStep::LearningMode,
            OnboardingStep::LearningMode => OnboardingStep::Language,
            OnboardingStep::Language | OnboardingStep::Completed => OnboardingStep::Completed,
        }
    }
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
