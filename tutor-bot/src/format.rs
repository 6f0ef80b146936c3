//! WhatsApp reply formatting
//!
//! Replies go back inside a single TwiML `<Message>`, which Twilio caps at
//! [`WHATSAPP_MESSAGE_LIMIT`] characters. Text is whitespace-normalized and
//! then truncated with an indicator when it would not fit. No markup is
//! rewritten; WhatsApp renders `*bold*` and `_italic_` itself.

/// Maximum characters in one outbound WhatsApp message body
pub const WHATSAPP_MESSAGE_LIMIT: usize = 1600;

/// Appended to truncated replies
pub const TRUNCATION_INDICATOR: &str = "...";

/// Normalize and fit `text` into one WhatsApp message
///
/// Output is never longer than [`WHATSAPP_MESSAGE_LIMIT`] characters and
/// formatting an already formatted string returns it unchanged.
pub fn format_for_whatsapp(text: &str) -> String {
    fit_to_length(text, WHATSAPP_MESSAGE_LIMIT)
}

/// Normalize `text` and truncate it to at most `limit` characters
pub fn fit_to_length(text: &str, limit: usize) -> String {
    truncate_with_indicator(normalize_whitespace(text), limit)
}

/// Split `text` into ordered chunks of at most `limit` characters
///
/// Breaks prefer paragraph boundaries, then line breaks, then spaces.
/// Used for outbound sends where several messages are acceptable.
pub fn paginate_for_whatsapp(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let normalized = normalize_whitespace(text);
    let mut pages = Vec::new();
    let mut rest = normalized.as_str();

    while !rest.is_empty() {
        if rest.chars().count() <= limit {
            pages.push(rest.to_string());
            break;
        }

        let window_end = byte_offset_of_char(rest, limit);
        let window = &rest[..window_end];
        let split = window
            .rfind("\n\n")
            .or_else(|| window.rfind('\n'))
            .or_else(|| window.rfind(char::is_whitespace))
            .filter(|&pos| pos > 0)
            .unwrap_or(window_end);

        let page = rest[..split].trim_end();
        if !page.is_empty() {
            pages.push(page.to_string());
        }
        rest = rest[split..].trim_start();
    }

    pages
}

/// Collapse runs of blanks inside lines, trim every line, allow at most one
/// empty line between paragraphs, and trim the whole text
pub fn normalize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<String> = Vec::new();
    let mut previous_blank = false;

    for line in text.split('\n') {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            if !previous_blank {
                lines.push(String::new());
            }
            previous_blank = true;
        } else {
            lines.push(line);
            previous_blank = false;
        }
    }

    lines.join("\n").trim().to_string()
}

/// Title-case a topic for headings ("world war 2" → "World War 2")
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_with_indicator(text: String, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text;
    }

    let budget = limit.saturating_sub(TRUNCATION_INDICATOR.chars().count());
    let cut = byte_offset_of_char(&text, budget);
    let mut window = &text[..cut];

    // Break on whitespace when it costs at most the last fifth of the window
    if let Some(pos) = window.rfind(char::is_whitespace) {
        if window[..pos].chars().count() >= budget * 4 / 5 {
            window = &window[..pos];
        }
    }

    let mut truncated = window.trim_end().to_string();
    truncated.push_str(TRUNCATION_INDICATOR);
    truncated
}

/// Byte offset of the `n`th character, or the end of the string
fn byte_offset_of_char(text: &str, n: usize) -> usize {
    text.char_indices()
        .nth(n)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}
