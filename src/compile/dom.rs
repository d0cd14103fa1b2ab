//! Markdown to an owned HTML tree, via pulldown-cmark events.
//!
//! The tree is the unit the transform pipeline operates on: transforms
//! rewrite attributes, inject anchors, and replace children before the
//! tree is serialized to HTML. Raw HTML in the source passes through as
//! opaque `Node::Raw` nodes.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

/// A node in the intermediate document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Raw HTML emitted verbatim (author HTML or highlighter output).
    Raw(String),
}

/// An HTML element with ordered attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.attrs.iter_mut().find(|(k, _)| k == name) {
            entry.1 = value.to_string();
        } else {
            self.attrs.push((name.to_string(), value.to_string()));
        }
    }

    /// Append a class, preserving existing ones.
    pub fn append_class(&mut self, class: &str) {
        match self.attr("class") {
            Some(existing) => {
                let merged = format!("{existing} {class}");
                self.set_attr("class", &merged);
            }
            None => self.set_attr("class", class),
        }
    }

    /// Concatenated text content of all descendant text nodes.
    pub fn text_content(&self) -> String {
        fn collect(nodes: &[Node], out: &mut String) {
            for node in nodes {
                match node {
                    Node::Text(text) => out.push_str(text),
                    Node::Element(el) => collect(&el.children, out),
                    Node::Raw(_) => {}
                }
            }
        }
        let mut out = String::new();
        collect(&self.children, &mut out);
        out
    }
}

/// Root of the intermediate tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    /// Depth-first mutable walk over every element, parents first.
    pub fn visit_elements(&mut self, f: &mut impl FnMut(&mut Element)) {
        fn walk(nodes: &mut [Node], f: &mut impl FnMut(&mut Element)) {
            for node in nodes {
                if let Node::Element(el) = node {
                    f(el);
                    walk(&mut el.children, f);
                }
            }
        }
        walk(&mut self.children, f);
    }
}

// ============================================================================
// Conversion
// ============================================================================

/// How a finished stack frame joins its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Finish {
    /// Attach the element as-is.
    Plain,
    /// Wrap the element inside an outer tag (`code` inside `pre`).
    WrapOuter(&'static str),
    /// Wrap the element's children inside an inner tag (`thead` > `tr`).
    WrapInner(&'static str),
    /// Discard the element and splice its children into the parent.
    Splice,
    /// Flatten children into an `alt` attribute (images).
    IntoAlt,
}

struct StackFrame {
    element: Element,
    finish: Finish,
}

impl StackFrame {
    fn plain(tag: &str) -> Self {
        Self {
            element: Element::new(tag),
            finish: Finish::Plain,
        }
    }
}

/// Convert a markdown body into the intermediate tree.
///
/// Extensions beyond CommonMark: tables, footnotes, strikethrough, and
/// task lists.
pub fn from_markdown(body: &str) -> Document {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut converter = Converter::default();
    for event in Parser::new_ext(body, options) {
        converter.handle_event(event);
    }
    Document {
        children: converter.finish(),
    }
}

#[derive(Default)]
struct Converter {
    stack: Vec<StackFrame>,
    root: Vec<Node>,
    in_table_head: bool,
}

impl Converter {
    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(_) => self.end_tag(),
            Event::Text(text) => self.push_node(Node::Text(text.into_string())),
            Event::Code(code) => {
                let mut el = Element::new("code");
                el.children.push(Node::Text(code.into_string()));
                self.push_node(Node::Element(el));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push_node(Node::Raw(html.into_string()));
            }
            Event::SoftBreak => self.push_node(Node::Text("\n".to_string())),
            Event::HardBreak => self.push_node(Node::Element(Element::new("br"))),
            Event::Rule => self.push_node(Node::Element(Element::new("hr"))),
            Event::FootnoteReference(name) => {
                let mut link = Element::new("a");
                link.set_attr("href", &format!("#{name}"));
                link.children.push(Node::Text(name.to_string()));
                let mut sup = Element::new("sup");
                sup.set_attr("class", "footnote-reference");
                sup.children.push(Node::Element(link));
                self.push_node(Node::Element(sup));
            }
            Event::TaskListMarker(checked) => {
                let mut input = Element::new("input");
                input.set_attr("type", "checkbox");
                input.set_attr("disabled", "");
                if checked {
                    input.set_attr("checked", "");
                }
                self.push_node(Node::Element(input));
            }
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        let frame = match tag {
            Tag::Paragraph => StackFrame::plain("p"),
            Tag::Heading {
                level, id, classes, ..
            } => {
                let mut el = Element::new(heading_tag(level));
                if let Some(id) = id {
                    el.set_attr("id", &id);
                }
                for class in classes {
                    el.append_class(&class);
                }
                StackFrame {
                    element: el,
                    finish: Finish::Plain,
                }
            }
            Tag::BlockQuote(_) => StackFrame::plain("blockquote"),
            Tag::CodeBlock(kind) => {
                let mut el = Element::new("code");
                if let CodeBlockKind::Fenced(info) = kind {
                    // Info string may carry extra words after the language
                    let lang = info.split_whitespace().next().unwrap_or("");
                    if !lang.is_empty() {
                        el.set_attr("class", &format!("language-{lang}"));
                    }
                }
                StackFrame {
                    element: el,
                    finish: Finish::WrapOuter("pre"),
                }
            }
            Tag::List(Some(start)) => {
                let mut el = Element::new("ol");
                if start != 1 {
                    el.set_attr("start", &start.to_string());
                }
                StackFrame {
                    element: el,
                    finish: Finish::Plain,
                }
            }
            Tag::List(None) => StackFrame::plain("ul"),
            Tag::Item => StackFrame::plain("li"),
            Tag::Emphasis => StackFrame::plain("em"),
            Tag::Strong => StackFrame::plain("strong"),
            Tag::Strikethrough => StackFrame::plain("del"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut el = Element::new("a");
                el.set_attr("href", &dest_url);
                if !title.is_empty() {
                    el.set_attr("title", &title);
                }
                StackFrame {
                    element: el,
                    finish: Finish::Plain,
                }
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut el = Element::new("img");
                el.set_attr("src", &dest_url);
                if !title.is_empty() {
                    el.set_attr("title", &title);
                }
                StackFrame {
                    element: el,
                    finish: Finish::IntoAlt,
                }
            }
            Tag::Table(_) => StackFrame::plain("table"),
            Tag::TableHead => {
                self.in_table_head = true;
                StackFrame {
                    element: Element::new("thead"),
                    finish: Finish::WrapInner("tr"),
                }
            }
            Tag::TableRow => StackFrame::plain("tr"),
            Tag::TableCell => {
                StackFrame::plain(if self.in_table_head { "th" } else { "td" })
            }
            Tag::FootnoteDefinition(name) => {
                let mut el = Element::new("div");
                el.set_attr("class", "footnote-definition");
                el.set_attr("id", &name);
                StackFrame {
                    element: el,
                    finish: Finish::Plain,
                }
            }
            // Block containers with no HTML element of their own
            _ => StackFrame {
                element: Element::new("div"),
                finish: Finish::Splice,
            },
        };

        self.stack.push(frame);
    }

    fn end_tag(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let StackFrame { mut element, finish } = frame;

        if element.tag == "thead" {
            self.in_table_head = false;
        }

        match finish {
            Finish::Plain => self.push_node(Node::Element(element)),
            Finish::WrapOuter(tag) => {
                let mut outer = Element::new(tag);
                outer.children.push(Node::Element(element));
                self.push_node(Node::Element(outer));
            }
            Finish::WrapInner(tag) => {
                let mut inner = Element::new(tag);
                inner.children = std::mem::take(&mut element.children);
                element.children.push(Node::Element(inner));
                self.push_node(Node::Element(element));
            }
            Finish::Splice => {
                for child in element.children {
                    self.push_node(child);
                }
            }
            Finish::IntoAlt => {
                let alt = element.text_content();
                element.children.clear();
                element.set_attr("alt", &alt);
                self.push_node(Node::Element(element));
            }
        }
    }

    fn push_node(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(frame) => frame.element.children.push(node),
            None => self.root.push(node),
        }
    }

    fn finish(mut self) -> Vec<Node> {
        // The parser emits balanced events; drain anything left anyway
        while !self.stack.is_empty() {
            self.end_tag();
        }
        self.root
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_element(doc: &Document) -> &Element {
        match &doc.children[0] {
            Node::Element(el) => el,
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn test_paragraph() {
        let doc = from_markdown("hello world");
        let p = first_element(&doc);
        assert_eq!(p.tag, "p");
        assert_eq!(p.text_content(), "hello world");
    }

    #[test]
    fn test_heading_levels() {
        let doc = from_markdown("## Section\n\n### Subsection");
        assert_eq!(first_element(&doc).tag, "h2");
        if let Node::Element(h3) = &doc.children[1] {
            assert_eq!(h3.tag, "h3");
        } else {
            panic!("expected h3");
        }
    }

    #[test]
    fn test_fenced_code_block() {
        let doc = from_markdown("```rust\nfn main() {}\n```");
        let pre = first_element(&doc);
        assert_eq!(pre.tag, "pre");
        let Node::Element(code) = &pre.children[0] else {
            panic!("expected code child");
        };
        assert_eq!(code.tag, "code");
        assert_eq!(code.attr("class"), Some("language-rust"));
        assert_eq!(code.text_content(), "fn main() {}\n");
    }

    #[test]
    fn test_link_attrs() {
        let doc = from_markdown("[text](https://example.com)");
        let p = first_element(&doc);
        let Node::Element(a) = &p.children[0] else {
            panic!("expected anchor");
        };
        assert_eq!(a.attr("href"), Some("https://example.com"));
    }

    #[test]
    fn test_image_alt_flattened() {
        let doc = from_markdown("![my alt text](./pic.png)");
        let p = first_element(&doc);
        let Node::Element(img) = &p.children[0] else {
            panic!("expected img");
        };
        assert_eq!(img.tag, "img");
        assert_eq!(img.attr("src"), Some("./pic.png"));
        assert_eq!(img.attr("alt"), Some("my alt text"));
        assert!(img.children.is_empty());
    }

    #[test]
    fn test_raw_html_passthrough() {
        let doc = from_markdown("<aside>custom</aside>");
        assert!(
            doc.children
                .iter()
                .any(|n| matches!(n, Node::Raw(html) if html.contains("<aside>")))
        );
    }

    #[test]
    fn test_table_head_cells() {
        let doc = from_markdown("| a | b |\n|---|---|\n| 1 | 2 |");
        let table = first_element(&doc);
        assert_eq!(table.tag, "table");
        let Node::Element(thead) = &table.children[0] else {
            panic!("expected thead");
        };
        let Node::Element(tr) = &thead.children[0] else {
            panic!("expected tr inside thead");
        };
        assert!(matches!(&tr.children[0], Node::Element(th) if th.tag == "th"));
    }

    #[test]
    fn test_task_list_marker() {
        let doc = from_markdown("- [x] done\n- [ ] todo");
        let ul = first_element(&doc);
        let Node::Element(li) = &ul.children[0] else {
            panic!("expected li");
        };
        assert!(matches!(
            &li.children[0],
            Node::Element(input) if input.tag == "input" && input.attr("checked").is_some()
        ));
    }

    #[test]
    fn test_append_class() {
        let mut el = Element::new("a");
        el.append_class("external-link");
        assert_eq!(el.attr("class"), Some("external-link"));
        el.append_class("highlighted");
        assert_eq!(el.attr("class"), Some("external-link highlighted"));
    }
}
