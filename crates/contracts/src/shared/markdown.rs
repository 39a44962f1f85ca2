//! Lightweight markdown for assistant replies.
//!
//! Single forward pass over the lines of the reply. Supports three heading
//! levels, `-`/`•` bullet lists, `1.`/`1)` ordered lists, paragraphs and blank
//! lines, plus `**strong**` and `` `code` `` inside list items and paragraphs.
//! The result is an inner-markup fragment meant for `inner_html` of an
//! existing container, not a full document.

use once_cell::sync::Lazy;
use regex::Regex;

static ORDERED_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]").unwrap());
static ORDERED_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]\s*").unwrap());
static STRONG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`(.+?)`").unwrap());

/// Render a reply into an HTML fragment.
pub fn render(text: &str) -> String {
    let mut html = String::with_capacity(text.len() + 64);
    let mut in_list = false;
    let mut in_ordered = false;

    for line in text.split('\n') {
        let trimmed = line.trim();
        let bullet = bullet_content(line);

        if in_list && bullet.is_none() {
            html.push_str("</ul>");
            in_list = false;
        }
        if in_ordered && !ORDERED_MARKER.is_match(trimmed) {
            html.push_str("</ol>");
            in_ordered = false;
        }

        if trimmed.is_empty() {
            html.push_str("<br/>");
        } else if let Some(rest) = trimmed.strip_prefix("### ") {
            push_wrapped(&mut html, "h4", &escape(rest));
        } else if let Some(rest) = trimmed.strip_prefix("## ") {
            push_wrapped(&mut html, "h3", &escape(rest));
        } else if let Some(rest) = trimmed.strip_prefix("# ") {
            push_wrapped(&mut html, "h2", &escape(rest));
        } else if let Some(content) = bullet {
            if !in_list {
                html.push_str("<ul>");
                in_list = true;
            }
            push_wrapped(&mut html, "li", &format_inline(content));
        } else if ORDERED_MARKER.is_match(trimmed) {
            if !in_ordered {
                html.push_str("<ol>");
                in_ordered = true;
            }
            let content = ORDERED_PREFIX.replace(trimmed, "");
            push_wrapped(&mut html, "li", &format_inline(&content));
        } else {
            push_wrapped(&mut html, "p", &format_inline(trimmed));
        }
    }

    if in_list {
        html.push_str("</ul>");
    }
    if in_ordered {
        html.push_str("</ol>");
    }

    html
}

/// `**x**` becomes `<strong>x</strong>`, then `` `x` `` becomes `<code>x</code>`.
/// Markers never nest or overlap; the leftmost shortest match wins.
pub fn format_inline(text: &str) -> String {
    let escaped = escape(text);
    let strong = STRONG.replace_all(&escaped, "<strong>$1</strong>");
    CODE.replace_all(&strong, "<code>$1</code>").into_owned()
}

/// Content of a bullet item, if the line is one. Recognised on the
/// left-trimmed line so a bare `"- "` still yields an empty item.
fn bullet_content(line: &str) -> Option<&str> {
    let lead = line.trim_start();
    lead.strip_prefix("- ")
        .or_else(|| lead.strip_prefix("• "))
        .map(str::trim_end)
}

fn push_wrapped(html: &mut String, tag: &str, content: &str) {
    html.push('<');
    html.push_str(tag);
    html.push('>');
    html.push_str(content);
    html.push_str("</");
    html.push_str(tag);
    html.push('>');
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_lines_become_paragraphs() {
        assert_eq!(
            render("first\n\nsecond"),
            "<p>first</p><br/><p>second</p>"
        );
    }

    #[test]
    fn test_whitespace_only_line_is_a_break() {
        assert_eq!(render("a\n   \t\nb"), "<p>a</p><br/><p>b</p>");
    }

    #[test]
    fn test_consecutive_bullets_share_one_list() {
        assert_eq!(render("- a\n- b"), "<ul><li>a</li><li>b</li></ul>");
        assert_eq!(render("• a\n- b"), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_blank_line_splits_lists() {
        assert_eq!(
            render("- a\n\n- b"),
            "<ul><li>a</li></ul><br/><ul><li>b</li></ul>"
        );
    }

    #[test]
    fn test_empty_bullet_opens_list() {
        assert_eq!(render("- "), "<ul><li></li></ul>");
    }

    #[test]
    fn test_ordered_list() {
        assert_eq!(
            render("1. one\n2) two\n10.ten"),
            "<ol><li>one</li><li>two</li><li>ten</li></ol>"
        );
    }

    #[test]
    fn test_heading_closes_open_list() {
        assert_eq!(
            render("1. step\n### Next\n- item"),
            "<ol><li>step</li></ol><h4>Next</h4><ul><li>item</li></ul>"
        );
    }

    #[test]
    fn test_headings_are_not_inline_formatted() {
        assert_eq!(render("# **Big**"), "<h2>**Big**</h2>");
        assert_eq!(render("## Mid"), "<h3>Mid</h3>");
        assert_eq!(render("### `small`"), "<h4>`small`</h4>");
    }

    #[test]
    fn test_hash_without_space_is_paragraph() {
        assert_eq!(render("#"), "<p>#</p>");
        assert_eq!(render("###"), "<p>###</p>");
        assert_eq!(render("#tag"), "<p>#tag</p>");
    }

    #[test]
    fn test_inline_strong_and_code() {
        assert_eq!(render("**x**"), "<p><strong>x</strong></p>");
        assert_eq!(render("`x`"), "<p><code>x</code></p>");
        assert_eq!(
            render("use **bold** and `code` here"),
            "<p>use <strong>bold</strong> and <code>code</code> here</p>"
        );
        assert_eq!(
            render("- **a** then **b**"),
            "<ul><li><strong>a</strong> then <strong>b</strong></li></ul>"
        );
    }

    #[test]
    fn test_unmatched_markers_left_alone() {
        assert_eq!(render("**open"), "<p>**open</p>");
        assert_eq!(render("a ` b"), "<p>a ` b</p>");
    }

    #[test]
    fn test_markup_in_content_is_escaped() {
        assert_eq!(
            render("<script>x</script> & **b**"),
            "<p>&lt;script&gt;x&lt;/script&gt; &amp; <strong>b</strong></p>"
        );
    }

    #[test]
    fn test_end_of_input_closes_lists() {
        assert_eq!(render("text\n- a"), "<p>text</p><ul><li>a</li></ul>");
        assert_eq!(render("1. a"), "<ol><li>a</li></ol>");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(render(""), "<br/>");
    }
}
