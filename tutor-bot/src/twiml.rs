//! TwiML webhook responses

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Escape text for use inside an XML element
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `<Response>` carrying a single reply message
pub fn render_message_response(text: &str) -> String {
    format!(
        "{}<Response><Message>{}</Message></Response>",
        XML_DECLARATION,
        escape_xml(text)
    )
}

/// `<Response>` with no reply
pub fn render_empty_response() -> String {
    format!("{}<Response></Response>", XML_DECLARATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(
            escape_xml(r#"Tom & "Jerry" <3 'cheese'"#),
            "Tom &amp; &quot;Jerry&quot; &lt;3 &apos;cheese&apos;"
        );
        assert_eq!(escape_xml("📚 *Lesson*"), "📚 *Lesson*");
    }

    #[test]
    fn test_render_message_response() {
        assert_eq!(
            render_message_response("a < b"),
            r#"<?xml version="1.0" encoding="UTF-8"?><Response><Message>a &lt; b</Message></Response>"#
        );
    }

    #[test]
    fn test_render_empty_response() {
        assert!(render_empty_response().ends_with("<Response></Response>"));
    }
}
