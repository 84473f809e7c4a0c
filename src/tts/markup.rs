//! Speak-markup handling.
//!
//! Only the `<speak>` wrapper is recognized. Text outside the first speak
//! block is dropped before synthesis.

const OPEN: &str = "<speak>";
const CLOSE: &str = "</speak>";

/// Reduce `sentence` to the speakable text inside its speak block.
///
/// - no tags: the whole sentence is speakable
/// - only a closing tag: speech starts at the beginning
/// - only an opening tag: speech runs to the end
///
/// Returns an empty string when nothing speakable remains, e.g. for
/// `"</speak>Hello."`.
pub fn format_speak_tags(sentence: &str) -> String {
    let has_open = sentence.contains(OPEN);
    let has_close = sentence.contains(CLOSE);

    let wrapped = match (has_open, has_close) {
        (false, false) => format!("{OPEN}{sentence}{CLOSE}"),
        (false, true) => format!("{OPEN}{sentence}"),
        (true, false) => format!("{sentence}{CLOSE}"),
        (true, true) => sentence.to_string(),
    };

    let inner = match wrapped.split_once(OPEN) {
        Some((_, rest)) => match rest.split_once(CLOSE) {
            Some((block, _)) => block,
            None => rest,
        },
        None => "",
    };

    // Removing one tag can splice a new one together, so strip until stable.
    let mut text = inner.to_string();
    while text.contains(OPEN) || text.contains(CLOSE) {
        text = text.replace(OPEN, "").replace(CLOSE, "");
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn plain_sentence_is_kept() {
        assert_eq!(format_speak_tags("Hello."), "Hello.");
    }

    #[test]
    fn leading_close_tag_leaves_nothing() {
        assert_eq!(format_speak_tags("</speak>Hello."), "");
    }

    #[test]
    fn text_outside_block_is_dropped() {
        assert_eq!(
            format_speak_tags("before <speak>inside</speak> after"),
            "inside"
        );
    }

    #[test]
    fn unclosed_block_runs_to_end() {
        assert_eq!(format_speak_tags("skip <speak>say this"), "say this");
    }

    #[test]
    fn trailing_close_tag_starts_at_beginning() {
        assert_eq!(format_speak_tags("say this</speak> skip"), "say this");
    }

    #[test]
    fn whitespace_only_is_empty() {
        assert_eq!(format_speak_tags("<speak>   </speak>"), "");
        assert_eq!(format_speak_tags(""), "");
    }

    proptest! {
        #[test]
        fn output_never_contains_speak_tags(s in "[a-zA-Z ./<>]{0,40}") {
            let out = format_speak_tags(&s);
            prop_assert!(!out.contains(OPEN));
            prop_assert!(!out.contains(CLOSE));
        }

        #[test]
        fn untagged_text_only_loses_surrounding_whitespace(s in "[a-zA-Z .,!?]{0,40}") {
            prop_assert_eq!(format_speak_tags(&s), s.trim());
        }
    }
}
