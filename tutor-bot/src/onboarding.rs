//! Onboarding state machine
//!
//! New users walk through name → age → country → subjects → learning mode →
//! language before lessons unlock. Each inbound message answers the current
//! step; a valid answer is stored and the next prompt sent, an invalid one
//! re-asks the same question without changing state.

use sqlx::SqlitePool;
use tutor_common::db::{OnboardingStep, User};
use tutor_common::Result;
use tracing::{info, warn};

use crate::db::{advance_onboarding, get_user_by_phone, set_onboarding_step, ProfileField};
use crate::format::title_case;
use crate::replies;

const MAX_NAME_CHARS: usize = 50;
const MIN_AGE: i64 = 3;
const MAX_AGE: i64 = 100;
const MIN_COUNTRY_CHARS: usize = 2;
const MAX_SUBJECTS: usize = 10;

/// Accepted language answers, all mapping to the only supported code
const ENGLISH_ALIASES: [&str; 3] = ["english", "en", "eng"];

/// Known subject spellings and their canonical names
const SUBJECT_ALIASES: &[(&str, &str)] = &[
    ("math", "Mathematics"),
    ("maths", "Mathematics"),
    ("mathematics", "Mathematics"),
    ("science", "Science"),
    ("english", "English"),
    ("history", "History"),
    ("geography", "Geography"),
    ("physics", "Physics"),
    ("chemistry", "Chemistry"),
    ("biology", "Biology"),
    ("literature", "Literature"),
    ("art", "Art"),
    ("music", "Music"),
    ("pe", "Physical Education"),
    ("sports", "Sports"),
    ("computer", "Computer Science"),
    ("programming", "Programming"),
    ("coding", "Programming"),
];

/// Preferred lesson delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearningMode {
    Text,
    Audio,
}

impl LearningMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LearningMode::Text => "text",
            LearningMode::Audio => "audio",
        }
    }
}

pub fn validate_name(input: &str) -> Option<String> {
    let name = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let length = name.chars().count();
    (1..=MAX_NAME_CHARS).contains(&length).then_some(name)
}

pub fn validate_age(input: &str) -> Option<i64> {
    input
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|age| (MIN_AGE..=MAX_AGE).contains(age))
}

/// Letters, spaces, apostrophes and hyphens only; returned title-cased
pub fn validate_country(input: &str) -> Option<String> {
    let country = input.trim();
    if country.chars().count() < MIN_COUNTRY_CHARS {
        return None;
    }

    let allowed = country
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c == ' ' || c == '\'' || c == '-');
    if !allowed {
        return None;
    }

    Some(title_case(country))
}

/// Comma-separated subjects, normalized through the alias table
///
/// Unknown entries longer than two characters are kept title-cased.
/// Duplicates collapse and at most [`MAX_SUBJECTS`] are kept.
pub fn validate_subjects(input: &str) -> Option<Vec<String>> {
    let mut subjects: Vec<String> = Vec::new();

    for raw in input.split(',') {
        let entry = raw.trim().to_lowercase();
        if entry.is_empty() {
            continue;
        }

        let canonical = SUBJECT_ALIASES
            .iter()
            .find(|(alias, _)| *alias == entry)
            .map(|(_, name)| name.to_string())
            .or_else(|| (entry.chars().count() > 2).then(|| title_case(&entry)));

        if let Some(subject) = canonical {
            if !subjects.contains(&subject) {
                subjects.push(subject);
            }
        }

        if subjects.len() == MAX_SUBJECTS {
            break;
        }
    }

    (!subjects.is_empty()).then_some(subjects)
}

pub fn validate_learning_mode(input: &str) -> Option<LearningMode> {
    match input.trim().to_lowercase().as_str() {
        "text" | "reading" | "written" => Some(LearningMode::Text),
        "audio" | "voice" | "spoken" | "listening" => Some(LearningMode::Audio),
        _ => None,
    }
}

/// Language code for the answer; only English is supported
pub fn validate_language(input: &str) -> Option<&'static str> {
    let answer = input.trim().to_lowercase();
    ENGLISH_ALIASES.contains(&answer.as_str()).then_some("en")
}

/// Answer the current onboarding step for `user` with `message`
///
/// Returns the reply to send. Store failures propagate to the caller.
pub async fn handle_step(db: &SqlitePool, user: &User, message: &str) -> Result<String> {
    let phone = user.phone_number.as_str();

    let Some(step) = user.step() else {
        warn!(
            step = %user.onboarding_step,
            "Unknown onboarding step, restarting onboarding"
        );
        set_onboarding_step(db, phone, OnboardingStep::Name).await?;
        return Ok(replies::ONBOARDING_RESTART_REPLY.to_string());
    };

    let reply = match step {
        OnboardingStep::Name => match validate_name(message) {
            Some(name) => {
                let reply = format!(
                    "Nice to meet you, {}! {}\n\n{}",
                    name,
                    replies::greeting_emoji(25),
                    replies::AGE_PROMPT
                );
                advance_onboarding(db, phone, ProfileField::Name(name), step.next()).await?;
                reply
            }
            None => replies::INVALID_NAME_REPLY.to_string(),
        },

        OnboardingStep::Age => match validate_age(message) {
            Some(age) => {
                advance_onboarding(db, phone, ProfileField::Age(age), step.next()).await?;
                format!(
                    "Got it! {}\n\n{}",
                    replies::greeting_emoji(age),
                    replies::COUNTRY_PROMPT
                )
            }
            None => replies::INVALID_AGE_REPLY.to_string(),
        },

        OnboardingStep::Country => match validate_country(message) {
            Some(country) => {
                let reply = format!(
                    "Great! Welcome from {}! 🌍\n\n{}",
                    country,
                    replies::SUBJECTS_PROMPT
                );
                advance_onboarding(db, phone, ProfileField::Country(country), step.next()).await?;
                reply
            }
            None => replies::INVALID_COUNTRY_REPLY.to_string(),
        },

        OnboardingStep::Subjects => match validate_subjects(message) {
            Some(subjects) => {
                let reply = format!(
                    "Awesome! I see you're interested in: {} 📚\n\n{}",
                    subjects.join(", "),
                    replies::LEARNING_MODE_PROMPT
                );
                advance_onboarding(db, phone, ProfileField::Subjects(subjects), step.next())
                    .await?;
                reply
            }
            None => replies::INVALID_SUBJECTS_REPLY.to_string(),
        },

        OnboardingStep::LearningMode => match validate_learning_mode(message) {
            Some(mode) => {
                let description = match mode {
                    LearningMode::Text => "text-based",
                    LearningMode::Audio => "audio-based",
                };
                advance_onboarding(
                    db,
                    phone,
                    ProfileField::LearningMode(mode.as_str().to_string()),
                    step.next(),
                )
                .await?;
                format!(
                    "Perfect! I'll provide {} lessons. 📖\n\n{}",
                    description,
                    replies::LANGUAGE_PROMPT
                )
            }
            None => replies::INVALID_LEARNING_MODE_REPLY.to_string(),
        },

        OnboardingStep::Language => match validate_language(message) {
            Some(code) => {
                advance_onboarding(
                    db,
                    phone,
                    ProfileField::Language(code.to_string()),
                    OnboardingStep::Completed,
                )
                .await?;
                info!("Onboarding completed");
                complete_reply(db, user).await?
            }
            None => replies::INVALID_LANGUAGE_REPLY.to_string(),
        },

        // Step says completed but the flag was never set; repair the flag
        OnboardingStep::Completed => {
            set_onboarding_step(db, phone, OnboardingStep::Completed).await?;
            complete_reply(db, user).await?
        }
    };

    Ok(reply)
}

/// Welcome message built from the freshly stored profile
async fn complete_reply(db: &SqlitePool, user: &User) -> Result<String> {
    let stored = get_user_by_phone(db, &user.phone_number).await?;
    Ok(replies::onboarding_complete(stored.as_ref().unwrap_or(user)))
}
