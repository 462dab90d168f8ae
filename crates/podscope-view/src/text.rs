use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// CSI sequences, OSC sequences, and two-byte escapes
static ESCAPE_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[@-_]")
        .expect("escape pattern is valid")
});

const TAB: &str = "    ";

/// Make log text safe to draw as plain text in a terminal
///
/// Escape sequences are removed, tabs are expanded, and any other control
/// character except newline is dropped.
pub fn sanitize_log(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|c| c.is_control() && c != '\n') {
        return Cow::Borrowed(text);
    }

    let stripped = ESCAPE_SEQUENCE.replace_all(text, "");
    let mut out = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        match c {
            '\n' => out.push('\n'),
            '\t' => out.push_str(TAB),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_borrowed() {
        let text = "2024-01-15T10:30:00Z starting\n<pre>markup stays text</pre>\n";
        assert!(matches!(sanitize_log(text), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strips_color_codes() {
        assert_eq!(sanitize_log("\x1b[31mERROR\x1b[0m failed"), "ERROR failed");
    }

    #[test]
    fn test_strips_osc_title() {
        assert_eq!(sanitize_log("a\x1b]0;pwned\x07b"), "ab");
    }

    #[test]
    fn test_drops_carriage_returns_and_bells() {
        assert_eq!(sanitize_log("one\r\ntwo\x07\n"), "one\ntwo\n");
    }

    #[test]
    fn test_expands_tabs() {
        assert_eq!(sanitize_log("k\tv"), "k    v");
    }
}
