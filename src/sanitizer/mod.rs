//! Markup sanitizer and link rewriter.
//!
//! Extracted article markup is reduced to a fixed set of structural and
//! text-formatting tags. Tags outside the set are unwrapped: the wrapper is
//! dropped and its text is kept. Scripts, styles and form widgets are
//! removed together with their content. Links on anchors and images are
//! rewritten to absolute URLs against the article URL.
//!
//! ```rust,ignore
//! let clean = sanitizer::sanitize(
//!     r#"<div class="post"><a href="../c">next</a><script>x()</script></div>"#,
//!     "https://example.com/a/b",
//! );
//! assert_eq!(clean, r#"<div><a href="https://example.com/c">next</a></div>"#);
//! ```

pub mod links;

use html_escape::{encode_double_quoted_attribute, encode_text};
use scraper::{ElementRef, Html, Node};
use url::Url;

const ALLOWED_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "p", "a", "ul", "ol", "nl", "li", "b", "i",
    "strong", "em", "strike", "abbr", "code", "hr", "br", "div", "table", "thead", "caption",
    "tbody", "tr", "th", "td", "pre", "img",
];

/// Elements written as `<tag />` without children
const VOID_TAGS: &[&str] = &["br", "hr", "img"];

/// Elements dropped with everything inside them
const NON_TEXT_TAGS: &[&str] = &["script", "style", "textarea", "option", "noscript"];

fn allowed_attributes(tag: &str) -> &'static [&'static str] {
    match tag {
        "a" => &["href", "name", "target"],
        "img" => &["src", "alt", "title", "width", "height"],
        _ => &[],
    }
}

/// Sanitize `markup` and resolve its links against `base_url`.
///
/// Never fails. A link that cannot be resolved loses its attribute while the
/// element itself is kept.
pub fn sanitize(markup: &str, base_url: &str) -> String {
    let base = Url::parse(base_url).ok();
    if base.is_none() {
        tracing::debug!("Base URL '{}' is not absolute, relative links will be dropped", base_url);
    }

    let fragment = Html::parse_fragment(markup);
    let mut out = String::with_capacity(markup.len());

    // Explicit stack: nesting depth must not be limited by the thread stack.
    let mut stack = Vec::new();
    push_children(&mut stack, fragment.root_element());

    while let Some(step) = stack.pop() {
        match step {
            Step::Text(text) => out.push_str(&encode_text(text)),
            Step::Close(tag) => {
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            Step::Open(element) => {
                let tag = element.value().name();

                if NON_TEXT_TAGS.contains(&tag) {
                    continue;
                }
                if !ALLOWED_TAGS.contains(&tag) {
                    push_children(&mut stack, element);
                    continue;
                }

                write_start_tag(element, base.as_ref(), &mut out);
                if VOID_TAGS.contains(&tag) {
                    continue;
                }

                stack.push(Step::Close(tag));
                push_children(&mut stack, element);
            }
        }
    }

    out
}

enum Step<'a> {
    Open(ElementRef<'a>),
    Text(&'a str),
    Close(&'a str),
}

/// Children are pushed last-first so they pop in document order.
fn push_children<'a>(stack: &mut Vec<Step<'a>>, parent: ElementRef<'a>) {
    for child in parent.children().rev() {
        match child.value() {
            Node::Text(text) => stack.push(Step::Text(&**text)),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    stack.push(Step::Open(element));
                }
            }
            _ => {}
        }
    }
}

/// Write `<tag attr="...">`, or `<tag ... />` for void elements.
fn write_start_tag(element: ElementRef<'_>, base: Option<&Url>, out: &mut String) {
    let tag = element.value().name();

    out.push('<');
    out.push_str(tag);

    // Attributes are written in policy order, not source order.
    for &attr in allowed_attributes(tag) {
        let Some(value) = element.value().attr(attr) else {
            continue;
        };

        let value = if links::is_link_attribute(tag, attr) && !value.is_empty() {
            match links::resolve(value, base) {
                Some(resolved) => resolved,
                None => {
                    tracing::debug!("Dropping unresolvable {}@{}: {}", tag, attr, value);
                    continue;
                }
            }
        } else {
            value.to_string()
        };

        out.push(' ');
        out.push_str(attr);
        out.push_str("=\"");
        out.push_str(&encode_double_quoted_attribute(&value));
        out.push('"');
    }

    if VOID_TAGS.contains(&tag) {
        out.push_str(" />");
    } else {
        out.push('>');
    }
}
