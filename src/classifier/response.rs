//! Parsing of classifier responses.
//!
//! Models occasionally wrap even a one-word answer in Markdown code fencing,
//! so the raw text is unfenced before it is matched against a label.

use crate::gesture::GestureLabel;

/// Strip a surrounding Markdown code fence, if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// Turn raw response text into a label. Anything unrecognized is `None`.
pub fn parse_label(text: &str) -> GestureLabel {
    GestureLabel::parse(strip_code_fence(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_label() {
        assert_eq!(parse_label("FIST"), GestureLabel::Fist);
        assert_eq!(parse_label("open"), GestureLabel::Open);
        assert_eq!(parse_label("  Open \n"), GestureLabel::Open);
    }

    #[test]
    fn test_fenced_label() {
        assert_eq!(parse_label("```\nFIST\n```"), GestureLabel::Fist);
        assert_eq!(parse_label("```json\n\"OPEN\"\n```"), GestureLabel::None);
        assert_eq!(parse_label("```json\nOPEN\n```"), GestureLabel::Open);
    }

    #[test]
    fn test_unterminated_fence() {
        assert_eq!(parse_label("```\nFIST"), GestureLabel::Fist);
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(parse_label(""), GestureLabel::None);
        assert_eq!(parse_label("I see a hand"), GestureLabel::None);
        assert_eq!(parse_label("NONE"), GestureLabel::None);
    }
}
