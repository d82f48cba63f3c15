//! Rich-text cleanup for topic bodies
//!
//! Topic text embeds inline entities such as
//! `<e type="hashtag" title="%23rust%23" />` or
//! `<e type="web" href="https%3A%2F%2Fexample.com" title="Example" />`
//! with percent-encoded attributes. This module flattens them to Markdown.

use scraper::node::Element;
use scraper::{Html, Node};

/// Converts a topic body with inline entities to plain Markdown text
///
/// Unknown tags are dropped but their text content is kept. HTML entities are
/// decoded by the parser.
pub fn clean_text(raw: &str) -> String {
    if !raw.contains('<') && !raw.contains('&') {
        return raw.trim().to_string();
    }

    let fragment = Html::parse_fragment(raw);
    let mut out = String::with_capacity(raw.len());

    // Entity tags are not void elements, so the parser nests the text that
    // follows them as children. A pre-order walk still yields document order.
    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "e" => render_entity(el, &mut out),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            _ => {}
        }
    }

    out.trim().to_string()
}

fn render_entity(el: &Element, out: &mut String) {
    let title = el.attr("title").map(decode).unwrap_or_default();

    match el.attr("type").unwrap_or_default() {
        "web" => {
            let href = el.attr("href").map(decode).unwrap_or_default();
            if title.is_empty() || title == href {
                out.push_str(&href);
            } else {
                out.push_str(&format!("[{}]({})", title, href));
            }
        }
        "mention" => {
            if !title.starts_with('@') {
                out.push('@');
            }
            out.push_str(&title);
        }
        "text_bold" if !title.is_empty() => out.push_str(&format!("**{}**", title)),
        "text_italic" if !title.is_empty() => out.push_str(&format!("*{}*", title)),
        _ => out.push_str(&title),
    }
}

fn decode(value: &str) -> String {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(clean_text("  just words\nand lines  "), "just words\nand lines");
    }

    #[test]
    fn test_hashtag_and_mention() {
        let raw = r#"<e type="hashtag" hid="1" title="%23rust%23" /> thanks <e type="mention" uid="9" title="%40alice" /> !"#;
        assert_eq!(clean_text(raw), "#rust# thanks @alice !");
    }

    #[test]
    fn test_web_link() {
        let raw = r#"see <e type="web" href="https%3A%2F%2Fexample.com%2Fa" title="Example" cache="" /> now"#;
        assert_eq!(clean_text(raw), "see [Example](https://example.com/a) now");
    }

    #[test]
    fn test_web_link_without_title() {
        let raw = r#"<e type="web" href="https%3A%2F%2Fexample.com" title="" />"#;
        assert_eq!(clean_text(raw), "https://example.com");
    }

    #[test]
    fn test_bold_and_entities() {
        let raw = r#"<e type="text_bold" title="%E9%87%8D%E7%82%B9" /> a &amp; b"#;
        assert_eq!(clean_text(raw), "**重点** a & b");
    }
}
