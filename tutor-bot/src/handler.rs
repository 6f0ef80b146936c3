//! Inbound message dispatcher
//!
//! Turns one `(phone, text)` pair into one reply string. New numbers are
//! registered and greeted, un-onboarded users are routed through the
//! onboarding flow, and everyone else gets command handling.

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{error, info, warn};
use tutor_common::db::User;
use tutor_common::Result;

use crate::commands::{self, Command};
use crate::db::{create_progress, create_user, get_current_lesson, get_user_by_phone};
use crate::format::{fit_to_length, format_for_whatsapp, title_case, WHATSAPP_MESSAGE_LIMIT};
use crate::lesson::{LessonGenerator, LessonRequest};
use crate::onboarding;
use crate::replies;

/// Mask a phone number for logs and listings, keeping the last 4 characters
pub fn mask_phone(phone: &str) -> String {
    let count = phone.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = phone.chars().skip(count - 4).collect();
    format!("***{}", tail)
}

/// Routes messages to onboarding, commands and lesson generation
#[derive(Clone)]
pub struct MessageHandler {
    db: SqlitePool,
    generator: Arc<dyn LessonGenerator>,
}

impl MessageHandler {
    pub fn new(db: SqlitePool, generator: Arc<dyn LessonGenerator>) -> Self {
        Self { db, generator }
    }

    /// Produce the reply for one inbound message
    ///
    /// Never fails: store errors become a canned "try again later" reply.
    /// The result always fits one WhatsApp message.
    pub async fn process_message(&self, phone_number: &str, text: &str) -> String {
        match self.dispatch(phone_number, text).await {
            Ok(reply) => format_for_whatsapp(&reply),
            Err(e) => {
                error!(phone = %mask_phone(phone_number), error = %e, "Failed to process message");
                replies::STORE_FAILURE_REPLY.to_string()
            }
        }
    }

    async fn dispatch(&self, phone_number: &str, text: &str) -> Result<String> {
        let user = match get_user_by_phone(&self.db, phone_number).await? {
            Some(user) => user,
            None => {
                let (user, created) = create_user(&self.db, phone_number).await?;
                if created {
                    info!(phone = %mask_phone(phone_number), "New user registered");
                    return Ok(replies::welcome_new_user());
                }
                user
            }
        };

        if !user.onboarded {
            return onboarding::handle_step(&self.db, &user, text).await;
        }

        let command = commands::parse(text);
        info!(
            phone = %mask_phone(phone_number),
            command = command_name(&command),
            "Handling message"
        );

        match command {
            Command::Help => Ok(replies::help_message(user.learner_age())),
            Command::LessonUsage => Ok(replies::LESSON_USAGE_REPLY.to_string()),
            Command::Lesson { topic } => self.start_lesson(&user, &topic).await,
            Command::Next => self.next_lesson(&user).await,
            Command::Plain { text } => Ok(replies::conversation_reply(&user, &text)),
        }
    }

    /// `/lesson <topic>`: generate part 1 and record it
    async fn start_lesson(&self, user: &User, topic: &str) -> Result<String> {
        let request = LessonRequest::new(topic, user.learner_age(), user.display_name());

        let content = match self.generator.generate_lesson(&request).await {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    provider = self.generator.provider_id(),
                    topic = %topic,
                    error = %e,
                    "Lesson generation failed"
                );
                return Ok(replies::LESSON_FAILURE_REPLY.to_string());
            }
        };

        create_progress(&self.db, &user.phone_number, topic, 1, &content).await?;

        Ok(compose_lesson_reply(
            &format!("📚 *Lesson: {}*", title_case(topic)),
            &content,
            "_Type `/next` for more on this topic or `/lesson <new topic>` for something else!_",
        ))
    }

    /// `/next`: continue the most recent topic one stage further
    async fn next_lesson(&self, user: &User) -> Result<String> {
        let Some(current) = get_current_lesson(&self.db, &user.phone_number, None).await? else {
            return Ok(replies::NO_LESSON_IN_PROGRESS_REPLY.to_string());
        };

        let stage = current.stage + 1;
        let request = LessonRequest::new(&current.topic, user.learner_age(), user.display_name())
            .with_stage(stage);

        let content = match self.generator.generate_lesson(&request).await {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    provider = self.generator.provider_id(),
                    topic = %current.topic,
                    stage,
                    error = %e,
                    "Continuation generation failed"
                );
                return Ok(replies::NEXT_FAILURE_REPLY.to_string());
            }
        };

        create_progress(&self.db, &user.phone_number, &current.topic, stage, &content).await?;

        Ok(compose_lesson_reply(
            &format!("📚 *{} - Part {}*", title_case(&current.topic), stage),
            &content,
            "_Type `/next` to continue or `/lesson <topic>` for something new!_",
        ))
    }
}

/// Header, lesson body and footer, with the body truncated so the footer
/// still fits in one message
fn compose_lesson_reply(header: &str, content: &str, footer: &str) -> String {
    let separators = 4;
    let budget = WHATSAPP_MESSAGE_LIMIT
        .saturating_sub(header.chars().count() + footer.chars().count() + separators);
    let body = fit_to_length(content, budget);
    format!("{}\n\n{}\n\n{}", header, body, footer)
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Lesson { .. } => "lesson",
        Command::LessonUsage => "lesson_usage",
        Command::Help => "help",
        Command::Next => "next",
        Command::Plain { .. } => "plain",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::TRUNCATION_INDICATOR;

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("+15551234567"), "***4567");
        assert_eq!(mask_phone("1234"), "****");
        assert_eq!(mask_phone(""), "");
    }

    #[test]
    fn test_compose_keeps_footer_for_long_content() {
        let reply = compose_lesson_reply("HEAD", &"word ".repeat(1000), "FOOT");

        assert!(reply.chars().count() <= WHATSAPP_MESSAGE_LIMIT);
        assert!(reply.starts_with("HEAD\n\n"));
        assert!(reply.ends_with("\n\nFOOT"));
        assert!(reply.contains(TRUNCATION_INDICATOR));
    }

    #[test]
    fn test_compose_short_content_is_verbatim() {
        let reply = compose_lesson_reply("H", "Fractions are parts of a whole.", "F");
        assert_eq!(reply, "H\n\nFractions are parts of a whole.\n\nF");
    }
}
