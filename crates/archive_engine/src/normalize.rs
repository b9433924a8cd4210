//! Post body to Markdown-ish text.
//!
//! The body is parsed once and walked: `<br>` becomes a newline, an anchor
//! whose only child is text becomes `[text](href)`, every other element
//! contributes its text, comments vanish, and the result is trimmed. Tables,
//! lists and nested links degrade to bare text.

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Normalize an HTML fragment such as a post body's inner HTML.
pub fn normalize(fragment_html: &str) -> String {
    let fragment = Html::parse_fragment(fragment_html);
    let mut out = String::new();
    for child in fragment.root_element().children() {
        visit_node(child, &mut out);
    }
    out.trim().to_string()
}

/// Normalize the children of an element already selected from a document.
pub fn normalize_element(element: ElementRef) -> String {
    let mut out = String::new();
    visit_children(*element, &mut out);
    out.trim().to_string()
}

fn visit_node(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Element(_) => {
            if let Some(element) = ElementRef::wrap(node) {
                visit_element(element, out);
            }
        }
        Node::Comment(_) | Node::ProcessingInstruction(_) | Node::Doctype(_) => {}
        _ => visit_children(node, out),
    }
}

fn visit_element(element: ElementRef, out: &mut String) {
    let value = element.value();
    if value.name().eq_ignore_ascii_case("br") {
        out.push('\n');
        return;
    }
    if value.name().eq_ignore_ascii_case("a") {
        if let (Some(href), Some(text)) = (value.attr("href"), sole_text_child(element)) {
            out.push('[');
            out.push_str(text);
            out.push_str("](");
            out.push_str(href);
            out.push(')');
            return;
        }
    }
    visit_children(*element, out);
}

fn visit_children(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        visit_node(child, out);
    }
}

fn sole_text_child<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    let mut children = element.children();
    let only = children.next()?;
    if children.next().is_some() {
        return None;
    }
    match only.value() {
        Node::Text(text) if !text.is_empty() => Some(&**text),
        _ => None,
    }
}
