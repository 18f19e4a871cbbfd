//! Markdown-ish to HTML conversion for tutor explanations.
//!
//! Only the handful of constructs the tutor agent actually emits are handled:
//! `**bold**`, `*italic*`, `*`-bulleted lines, and blank-line separated
//! paragraphs. Anything else passes through untouched.

use once_cell::sync::Lazy;
use regex::Regex;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.+?)\*").expect("italic pattern"));

/// Convert tutor text into a small HTML fragment.
///
/// Inline emphasis is rewritten first (bold before italic, neither crossing a
/// newline), then the text is cut into blocks on blank lines. A block with no
/// bullet lines becomes a single `<p>`; otherwise each run of consecutive
/// bullet lines becomes one `<ul>` and every other non-empty line its own
/// `<p>`, in input order.
///
/// ```
/// use study_chat::format::format_html;
/// assert_eq!(
///     format_html("**bold** and *italic*"),
///     "<p><strong>bold</strong> and <em>italic</em></p>"
/// );
/// ```
pub fn format_html(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = BOLD.replace_all(&text, "<strong>${1}</strong>");
    let text = ITALIC.replace_all(&text, "<em>${1}</em>").into_owned();

    let formatted: String = text.split("\n\n").map(format_block).collect();
    if formatted.is_empty() {
        text
    } else {
        formatted
    }
}

fn format_block(block: &str) -> String {
    let lines: Vec<&str> = block.split('\n').collect();
    if !lines.iter().any(|line| is_bullet(line)) {
        let trimmed = block.trim();
        return if trimmed.is_empty() {
            String::new()
        } else {
            format!("<p>{}</p>", trimmed)
        };
    }

    let mut out = String::new();
    let mut items: Vec<&str> = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        if let Some(item) = trimmed.strip_prefix('*') {
            items.push(item.trim());
        } else if !trimmed.is_empty() {
            flush_list(&mut out, &mut items);
            out.push_str("<p>");
            out.push_str(trimmed);
            out.push_str("</p>");
        }
    }
    flush_list(&mut out, &mut items);
    out
}

fn is_bullet(line: &str) -> bool {
    line.trim().starts_with('*')
}

fn flush_list(out: &mut String, items: &mut Vec<&str>) {
    if items.is_empty() {
        return;
    }
    out.push_str("<ul>");
    for item in items.drain(..) {
        out.push_str("<li>");
        out.push_str(item);
        out.push_str("</li>");
    }
    out.push_str("</ul>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(
            format_html("**bold** and *italic*"),
            "<p><strong>bold</strong> and <em>italic</em></p>"
        );
    }

    #[test]
    fn test_paragraph_then_list() {
        assert_eq!(
            format_html("line1\n* a\n* b"),
            "<p>line1</p><ul><li>a</li><li>b</li></ul>"
        );
    }

    #[test]
    fn test_block_starting_inside_list() {
        assert_eq!(
            format_html("* a\n* b\nafter"),
            "<ul><li>a</li><li>b</li></ul><p>after</p>"
        );
    }

    #[test]
    fn test_list_interrupted_by_line() {
        assert_eq!(
            format_html("* a\nmiddle\n* b"),
            "<ul><li>a</li></ul><p>middle</p><ul><li>b</li></ul>"
        );
    }

    #[test]
    fn test_paragraphs_split_on_blank_lines() {
        assert_eq!(format_html("one\n\ntwo"), "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_plain_block_keeps_inner_newlines() {
        assert_eq!(format_html("one\ntwo"), "<p>one\ntwo</p>");
    }

    #[test]
    fn test_empty_blocks_are_skipped() {
        assert_eq!(format_html("one\n\n\n\ntwo"), "<p>one</p><p>two</p>");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\n")]
    fn test_blank_input_returned_as_is(#[case] input: &str) {
        assert_eq!(format_html(input), input);
    }

    #[test]
    fn test_bold_inside_bullet() {
        assert_eq!(
            format_html("* **Key** point"),
            "<ul><li><strong>Key</strong> point</li></ul>"
        );
    }

    #[test]
    fn test_emphasis_does_not_cross_lines() {
        assert_eq!(format_html("a *b\nc* d"), "<p>a *b\nc* d</p>");
    }

    #[test]
    fn test_html_is_passed_through() {
        assert_eq!(format_html("<strong>📚 Cells</strong>"), "<p><strong>📚 Cells</strong></p>");
    }

    #[test]
    fn test_crlf_is_normalised() {
        assert_eq!(format_html("one\r\n\r\ntwo"), "<p>one</p><p>two</p>");
    }
}
