//! Serialize the intermediate tree to an HTML string.

use super::dom::{Document, Element, Node};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "source", "track", "wbr",
];

pub fn render(doc: &Document) -> String {
    let mut out = String::new();
    render_nodes(&doc.children, &mut out);
    out
}

fn render_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Element(el) => render_element(el, out),
            Node::Text(text) => escape_text(text, out),
            Node::Raw(html) => out.push_str(html),
        }
    }
}

fn render_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            escape_attr(value, out);
            out.push('"');
        }
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&el.tag.as_str()) {
        return;
    }

    render_nodes(&el.children, out);
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::dom::from_markdown;

    #[test]
    fn test_render_paragraph() {
        let doc = from_markdown("hello *world*");
        assert_eq!(render(&doc), "<p>hello <em>world</em></p>");
    }

    #[test]
    fn test_render_escapes_text() {
        let doc = from_markdown("a < b & c > d");
        assert_eq!(render(&doc), "<p>a &lt; b &amp; c &gt; d</p>");
    }

    #[test]
    fn test_render_escapes_attrs() {
        let mut el = Element::new("a");
        el.set_attr("title", "say \"hi\"");
        let doc = Document {
            children: vec![Node::Element(el)],
        };
        assert_eq!(render(&doc), "<a title=\"say &quot;hi&quot;\"></a>");
    }

    #[test]
    fn test_render_void_elements() {
        let doc = from_markdown("---");
        assert_eq!(render(&doc), "<hr>");
    }

    #[test]
    fn test_render_empty_attr_is_bare() {
        let mut el = Element::new("input");
        el.set_attr("disabled", "");
        let doc = Document {
            children: vec![Node::Element(el)],
        };
        assert_eq!(render(&doc), "<input disabled>");
    }

    #[test]
    fn test_render_raw_unescaped() {
        let doc = Document {
            children: vec![Node::Raw("<aside>kept</aside>".to_string())],
        };
        assert_eq!(render(&doc), "<aside>kept</aside>");
    }
}
