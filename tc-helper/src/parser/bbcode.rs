//! BBCode tags accepted inside markdown.

use lazy_static::lazy_static;
use regex::{NoExpand, Regex};
use std::borrow::Cow;

/// Markdown marker toggling underline (rendered as `<ins>`).
pub const UNDERLINE_MARKER: &str = "++";

lazy_static! {
    static ref UNDERLINE_TAG: Regex = Regex::new(r"\[/?u\]").unwrap();
}

/// Replace every `[u]` and `[/u]` with the underline marker.
///
/// Tags are matched case-sensitively and independently; unbalanced tags
/// are replaced all the same.
pub fn underline_to_markdown(text: &str) -> Cow<'_, str> {
    UNDERLINE_TAG.replace_all(text, NoExpand(UNDERLINE_MARKER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair() {
        assert_eq!(underline_to_markdown("[u]hi[/u]"), "++hi++");
    }

    #[test]
    fn test_unbalanced() {
        assert_eq!(underline_to_markdown("[u]a [u]b"), "++a ++b");
        assert_eq!(underline_to_markdown("a[/u]"), "a++");
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(underline_to_markdown("[U]x[/U]"), "[U]x[/U]");
    }

    #[test]
    fn test_other_tags_untouched() {
        let text = "[b]bold[/b] [url]x[/url]";
        assert!(matches!(underline_to_markdown(text), Cow::Borrowed(t) if t == text));
    }
}
