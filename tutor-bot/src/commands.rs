//! Command parsing for inbound message text
//!
//! Recognition is prefix-based: `/lesson <topic>`, `/help`, `/next`. The
//! keyword is matched case-insensitively and must be followed by whitespace
//! or the end of the message. Anything else is plain conversation.

/// Parsed message intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/lesson <topic>` with a non-empty topic
    Lesson { topic: String },
    /// `/lesson` without a topic
    LessonUsage,
    /// `/help`
    Help,
    /// `/next`
    Next,
    /// Free text with no recognized command prefix
    Plain { text: String },
}

const LESSON: &str = "/lesson";
const HELP: &str = "/help";
const NEXT: &str = "/next";

/// Parse raw message text into a [`Command`]
///
/// Never fails; unrecognized input becomes [`Command::Plain`].
pub fn parse(raw_text: &str) -> Command {
    let text = raw_text.trim();

    if let Some(rest) = strip_keyword(text, LESSON) {
        let topic = collapse_whitespace(rest);
        return if topic.is_empty() {
            Command::LessonUsage
        } else {
            Command::Lesson { topic }
        };
    }

    if strip_keyword(text, HELP).is_some() {
        return Command::Help;
    }

    if strip_keyword(text, NEXT).is_some() {
        return Command::Next;
    }

    Command::Plain {
        text: text.to_string(),
    }
}

/// Remainder after `keyword` when `text` starts with it as a whole word
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let head = text.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }

    let rest = &text[keyword.len()..];
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest),
        Some(_) => None,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
