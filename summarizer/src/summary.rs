use crate::models::{ChatResult, ChatTurn, Role};

pub const PROMPT_SEPARATOR: &str = "\n\nPDF Content:\n";
pub const MAX_SUMMARY_CHARS: usize = 1500;
pub const NO_SUMMARY: &str = "No summary available";

pub fn compose_prompt(question: &str, pdf_text: &str) -> String {
    format!("{question}{PROMPT_SEPARATOR}{pdf_text}")
}

/// Content of the first responder turn, in history order.
pub fn first_responder_reply(history: &[ChatTurn]) -> Option<&str> {
    history
        .iter()
        .find(|turn| turn.role == Role::Responder)
        .map(|turn| turn.content.as_str())
}

/// Keeps at most `max_chars` characters, appending `...` when cut.
pub fn truncate_summary(summary: &str, max_chars: usize) -> String {
    match summary.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &summary[..cut]),
        None => summary.to_string(),
    }
}

pub fn summarize_history(result: &ChatResult) -> String {
    match first_responder_reply(&result.history) {
        Some(reply) if !reply.is_empty() => truncate_summary(reply, MAX_SUMMARY_CHARS),
        _ => NO_SUMMARY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TerminationReason;

    fn result(history: Vec<ChatTurn>) -> ChatResult {
        ChatResult {
            history,
            termination: TerminationReason::AutoReplyLimit,
        }
    }

    #[test]
    fn prompt_layout() {
        assert_eq!(
            compose_prompt("What is this?", "page one"),
            "What is this?\n\nPDF Content:\npage one"
        );
    }

    #[test]
    fn short_summary_is_untouched() {
        let s = "a".repeat(MAX_SUMMARY_CHARS);
        assert_eq!(truncate_summary(&s, MAX_SUMMARY_CHARS), s);
    }

    #[test]
    fn long_summary_is_cut_with_ellipsis() {
        let s = "b".repeat(MAX_SUMMARY_CHARS + 1);
        let out = truncate_summary(&s, MAX_SUMMARY_CHARS);
        assert_eq!(out.len(), MAX_SUMMARY_CHARS + 3);
        assert!(out.ends_with("b..."));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let s = "é".repeat(5);
        assert_eq!(truncate_summary(&s, 3), "ééé...");
        assert_eq!(truncate_summary(&s, 5), s);
    }

    #[test]
    fn first_responder_turn_wins() {
        let r = result(vec![
            ChatTurn::driver("q"),
            ChatTurn::responder("first"),
            ChatTurn::driver("Continue."),
            ChatTurn::responder("second"),
        ]);
        assert_eq!(summarize_history(&r), "first");
    }

    #[test]
    fn no_responder_turn_gives_sentinel() {
        let r = result(vec![ChatTurn::driver("q")]);
        assert_eq!(summarize_history(&r), NO_SUMMARY);
    }

    #[test]
    fn empty_reply_gives_sentinel() {
        let r = result(vec![ChatTurn::driver("q"), ChatTurn::responder("")]);
        assert_eq!(summarize_history(&r), NO_SUMMARY);
    }
}
