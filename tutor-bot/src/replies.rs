//! Canned reply texts
//!
//! Everything the bot says that is not generated lesson content lives here,
//! including the fallback replies used when generation or the store fails.

use tutor_common::db::User;

/// Generation failed during `/lesson`
pub const LESSON_FAILURE_REPLY: &str =
    "Sorry, I couldn't generate a lesson right now. Please try again in a moment or pick a different topic! 📚";

/// Generation failed during `/next`
pub const NEXT_FAILURE_REPLY: &str =
    "Sorry, I couldn't generate a lesson right now. Type `/next` to try again, or start something new with `/lesson <topic>`! 📚";

/// Store unavailable
pub const STORE_FAILURE_REPLY: &str =
    "Sorry, I'm having some technical difficulties right now. Please try again later! 🔧";

pub const NO_LESSON_IN_PROGRESS_REPLY: &str =
    "You don't have any lessons in progress. Start a new lesson with `/lesson <topic>`! 📚";

pub const LESSON_USAGE_REPLY: &str =
    "Please specify a topic! For example: `/lesson fractions` or `/lesson photosynthesis` 📚";

pub const ONBOARDING_RESTART_REPLY: &str =
    "Something went wrong with onboarding. Let me help you start over! What's your name?";

pub const NAME_PROMPT: &str = "What should I call you? 😊";
pub const AGE_PROMPT: &str = "How old are you? (This helps me adjust lessons for you)";
pub const COUNTRY_PROMPT: &str = "Which country are you from?";
pub const SUBJECTS_PROMPT: &str =
    "What subjects interest you? (e.g., math, science, history - separate with commas)";
pub const LEARNING_MODE_PROMPT: &str =
    "Do you prefer learning through \"text\" or would you like \"audio\" lessons in the future?";
pub const LANGUAGE_PROMPT: &str =
    "What language would you like to learn in? (Currently supporting English - just type \"english\" or \"en\")";

pub const INVALID_NAME_REPLY: &str =
    "Please enter a name between 1 and 50 characters. What should I call you?";
pub const INVALID_AGE_REPLY: &str = "Please enter a valid age (between 3 and 100). How old are you?";
pub const INVALID_COUNTRY_REPLY: &str =
    "Please enter a valid country name. Which country are you from?";
pub const INVALID_SUBJECTS_REPLY: &str =
    "Please enter at least one subject you're interested in (e.g., math, science, history):";
pub const INVALID_LEARNING_MODE_REPLY: &str =
    "Please choose either \"text\" for written lessons or \"audio\" for spoken lessons (audio coming soon!):";
pub const INVALID_LANGUAGE_REPLY: &str =
    "Currently I only support English. Please type \"english\" or \"en\" to continue:";

/// Age-banded greeting emoji
pub fn greeting_emoji(age: i64) -> &'static str {
    match age {
        a if a <= 8 => "🌟",
        a if a <= 12 => "📚",
        a if a <= 16 => "🎓",
        _ => "👋",
    }
}

/// First reply to an unseen phone number
pub fn welcome_new_user() -> String {
    format!(
        "Welcome to your AI Tutor! {} \n\n\
         I'm here to help you learn anything you're curious about through fun, personalized lessons!\n\n{}",
        greeting_emoji(25),
        NAME_PROMPT
    )
}

/// Sent when the last onboarding step completes
pub fn onboarding_complete(user: &User) -> String {
    let age = user.learner_age();
    format!(
        "🎉 *Welcome to your personalized AI Tutor, {name}!* {emoji}\n\n\
         You're all set up! Here's what I know about you:\n\
         • Age: {age}\n\
         • Country: {country}\n\
         • Learning mode: {mode}\n\n\
         *Ready to learn? Try these commands:*\n\
         📚 `/lesson <topic>` - Start learning any topic\n\
         ❓ `/help` - Get help and see all commands\n\n\
         *Example:* Try typing `/lesson fractions` or `/lesson photosynthesis`\n\n\
         What would you like to learn about first? 🚀",
        name = user.display_name(),
        emoji = greeting_emoji(age),
        age = age,
        country = user.country.as_deref().unwrap_or("-"),
        mode = user.learning_mode.as_deref().unwrap_or("text"),
    )
}

/// `/help` text, with tips for the learner's age band
pub fn help_message(age: i64) -> String {
    let base = "🤖 *WhatsApp AI Tutor Commands*\n\n\
                📚 `/lesson <topic>` - Get a lesson on any topic\n\
                ➡️ `/next` - Continue to next part of lesson\n\
                ❓ `/help` - Show this help message\n\n\
                *Examples:*\n\
                • /lesson fractions\n\
                • /lesson photosynthesis\n\
                • /lesson world war 2";

    let tips = match age {
        a if a <= 8 => {
            "🌟 *Tips for little learners:*\n\
             • Ask about anything you're curious about!\n\
             • Try topics like: animals, colors, shapes, numbers\n\
             • I'll make it super fun and easy! 🎉"
        }
        a if a <= 12 => {
            "📖 *Study Tips:*\n\
             • Try school subjects: math, science, history\n\
             • Ask about homework topics\n\
             • Practice questions help you learn better! ✏️"
        }
        a if a <= 16 => {
            "🎓 *Study Smart:*\n\
             • Get help with exam topics\n\
             • Ask for explanations of difficult concepts\n\
             • Perfect for homework and test prep 📝"
        }
        _ => {
            "💼 *Professional Learning:*\n\
             • Explore any topic of interest\n\
             • Get clear, structured explanations\n\
             • Perfect for skill development and knowledge growth 📈"
        }
    };

    format!("{}\n\n{}", base, tips)
}

/// Longest phrase first where one is a prefix of another
const QUESTION_PHRASES: [&str; 6] = [
    "what is",
    "how does",
    "how do",
    "explain",
    "teach me",
    "learn about",
];

/// Canned reply to free text that is not a command
///
/// Questions that name a topic get a `/lesson` suggestion; anything else
/// gets an age-banded nudge.
pub fn conversation_reply(user: &User, text: &str) -> String {
    let lowered = text.to_lowercase();

    for phrase in QUESTION_PHRASES {
        if lowered.contains(phrase) {
            let topic = lowered
                .replace(phrase, "")
                .trim()
                .trim_matches('?')
                .trim()
                .to_string();
            if topic.chars().count() > 3 {
                return format!(
                    "Great question! Let me teach you about {topic}. 📚\n\n\
                     Try: `/lesson {topic}`\n\n\
                     Or type `/help` to see all available commands!",
                    topic = topic
                );
            }
        }
    }

    let name = user.display_name();
    match user.learner_age() {
        a if a <= 8 => format!(
            "Hi {}! 🌟 Want to learn something fun? Try `/lesson colors` or `/lesson animals`!",
            name
        ),
        a if a <= 12 => format!(
            "Hey {}! 📚 Ready for a lesson? Try `/lesson fractions` or `/lesson dinosaurs`!",
            name
        ),
        _ => {
            let variants = [
                format!(
                    "Hi {}! 👋 I'm here to help you learn. Try `/lesson <topic>` to start learning something new!",
                    name
                ),
                "Hello! Ready to learn something interesting? Use `/lesson <topic>` or type `/help` for commands! 📚"
                    .to_string(),
                "Hey there! What would you like to learn about today? Type `/lesson <topic>` to get started! 🎓"
                    .to_string(),
            ];
            // Stable per user so the same person sees a consistent greeting
            let index = user
                .phone_number
                .bytes()
                .fold(0usize, |acc, b| acc.wrapping_add(b as usize))
                % variants.len();
            variants[index].clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(age: i64) -> User {
        User {
            phone_number: "+15550001234".to_string(),
            name: Some("Ada".to_string()),
            age: Some(age),
            country: Some("Kenya".to_string()),
            preferred_subjects: None,
            learning_mode: Some("text".to_string()),
            language: "en".to_string(),
            onboarding_step: "completed".to_string(),
            onboarded: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_greeting_emoji_bands() {
        assert_eq!(greeting_emoji(5), "🌟");
        assert_eq!(greeting_emoji(12), "📚");
        assert_eq!(greeting_emoji(16), "🎓");
        assert_eq!(greeting_emoji(30), "👋");
    }

    #[test]
    fn test_help_lists_commands_and_age_tips() {
        let young = help_message(7);
        assert!(young.contains("/lesson <topic>"));
        assert!(young.contains("/next"));
        assert!(young.contains("little learners"));

        assert!(help_message(30).contains("Professional Learning"));
    }

    #[test]
    fn test_question_suggests_lesson() {
        let reply = conversation_reply(&user(14), "What is photosynthesis?");
        assert!(reply.contains("`/lesson photosynthesis`"));
    }

    #[test]
    fn test_short_question_topic_falls_back_to_greeting() {
        let reply = conversation_reply(&user(7), "what is it?");
        assert!(reply.contains("Hi Ada!"));
        assert!(reply.contains("/lesson colors"));
    }

    #[test]
    fn test_adult_greeting_is_stable() {
        let adult = user(30);
        assert_eq!(
            conversation_reply(&adult, "hello"),
            conversation_reply(&adult, "hey")
        );
    }

    #[test]
    fn test_onboarding_complete_mentions_profile() {
        let text = onboarding_complete(&user(11));
        assert!(text.contains("Ada"));
        assert!(text.contains("• Age: 11"));
        assert!(text.contains("• Country: Kenya"));
    }
}
