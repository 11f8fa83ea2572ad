//! Markup-to-text extraction for content documents.
//!
//! Converts the raw XHTML of a spine entry into newline-normalized plain text
//! and pulls candidate titles out of headings and the `<title>` element.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap());
static RE_STYLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style>").unwrap());
static RE_BLOCK_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</p>|</div>").unwrap());
static RE_HEADING_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</h[1-6]>").unwrap());
static RE_BR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static RE_LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<li\b[^>]*>").unwrap());
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static RE_HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\r\x0B\x0C]+").unwrap());
static RE_EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n\s*\n+").unwrap());

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<h[12][^>]*>(.*?)</h[12]>").unwrap());
static RE_TITLE_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());

/// Convert raw content markup to plain text.
///
/// Script and style blocks are dropped wholesale. Block-level closing tags
/// become paragraph breaks, `<br>` a single newline, and list-item openers a
/// bullet marker, so the extracted text keeps the document's visual rhythm.
/// All remaining tags collapse to a single space (never deleted, so adjacent
/// words cannot merge). Horizontal whitespace is collapsed while newlines are
/// preserved, with runs capped at one blank line.
pub fn html_to_plain(raw: &str) -> String {
    let text = RE_SCRIPT.replace_all(raw, "");
    let text = RE_STYLE.replace_all(&text, "");
    let text = RE_BLOCK_CLOSE.replace_all(&text, "\n\n");
    let text = RE_BR.replace_all(&text, "\n");
    let text = RE_LIST_ITEM.replace_all(&text, "\n\u{2022} ");
    let text = RE_HEADING_CLOSE.replace_all(&text, "\n\n");
    let text = RE_TAG.replace_all(&text, " ");
    let text = RE_HORIZONTAL_WS.replace_all(&text, " ");
    let text = RE_EXCESS_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Textual content of the first `<h1>` or `<h2>`, with inner tags stripped.
pub fn extract_heading_title(raw: &str) -> Option<String> {
    let captures = RE_HEADING.captures(raw)?;
    let inner = RE_TAG.replace_all(&captures[1], " ");
    let title = inner.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Text of the HTML `<title>` element.
pub fn extract_title_element(raw: &str) -> Option<String> {
    let captures = RE_TITLE_ELEMENT.captures(raw)?;
    let title = captures[1].trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_tags_become_paragraph_breaks() {
        let html = "<p>First paragraph.</p><p>Second paragraph.</p>";
        let plain = html_to_plain(html);
        assert_eq!(plain, "First paragraph.\n\n Second paragraph.");
    }

    #[test]
    fn test_script_and_style_removed_wholesale() {
        let html = "<p>Keep.</p><script>var x = 1;</script><style>p { color: red }</style>";
        let plain = html_to_plain(html);
        assert!(plain.contains("Keep."));
        assert!(!plain.contains("var x"));
        assert!(!plain.contains("color"));
    }

    #[test]
    fn test_tags_replaced_with_space_not_deleted() {
        let html = "one<span>two</span>three";
        let plain = html_to_plain(html);
        assert!(plain.contains("one two"));
        assert!(plain.contains("two three"));
    }

    #[test]
    fn test_list_items_get_bullets() {
        let html = "<ul><li>apples</li><li>pears</li></ul>";
        let plain = html_to_plain(html);
        assert!(plain.contains("\u{2022} apples"));
        assert!(plain.contains("\u{2022} pears"));
    }

    #[test]
    fn test_newlines_capped_at_two() {
        let html = "<p>a</p><div></div><div></div><p>b</p>";
        let plain = html_to_plain(html);
        assert!(!plain.contains("\n\n\n"));
    }

    #[test]
    fn test_heading_title_extraction() {
        let html = "<html><body><h1>The <em>Real</em> Title</h1><p>text</p></body></html>";
        // Inner tags are stripped to spaces, so the em leaves doubled spaces.
        assert_eq!(
            extract_heading_title(html).as_deref(),
            Some("The  Real  Title")
        );
    }

    #[test]
    fn test_heading_title_empty_falls_through() {
        assert_eq!(extract_heading_title("<h1>   </h1>"), None);
        assert_eq!(extract_heading_title("<p>no headings</p>"), None);
    }

    #[test]
    fn test_title_element_extraction() {
        let html = "<html><head><title>Chapter One</title></head></html>";
        assert_eq!(extract_title_element(html).as_deref(), Some("Chapter One"));
    }
}
