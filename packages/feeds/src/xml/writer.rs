//! Serialization of the owned tree back to XML text.
//!
//! Output is deterministic: parsing it again and re-serializing yields the
//! same bytes.

use super::document::{Element, FeedDocument, Node};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

impl FeedDocument {
    /// Serialize the whole document, including the XML declaration.
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(16 * 1024);
        out.push_str(XML_DECLARATION);
        out.push('\n');
        for node in &self.prolog {
            write_node(node, &mut out);
            out.push('\n');
        }
        write_element(&self.root, &mut out);
        out.push('\n');
        for node in &self.epilog {
            write_node(node, &mut out);
            out.push('\n');
        }
        out
    }
}

impl Element {
    /// Serialize this element and its subtree.
    ///
    /// Namespace declarations inherited from ancestors are not repeated.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(el) => write_element(el, out),
        Node::Text(text) => escape_text(text, out),
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        Node::ProcessingInstruction { target, value } => {
            out.push_str("<?");
            out.push_str(target);
            if let Some(value) = value {
                out.push(' ');
                out.push_str(value);
            }
            out.push_str("?>");
        }
    }
}

fn write_qname(prefix: Option<&str>, name: &str, out: &mut String) {
    if let Some(prefix) = prefix {
        out.push_str(prefix);
        out.push(':');
    }
    out.push_str(name);
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    write_qname(el.prefix.as_deref(), &el.name, out);

    for decl in &el.namespace_decls {
        out.push_str(" xmlns");
        if let Some(prefix) = &decl.prefix {
            out.push(':');
            out.push_str(prefix);
        }
        out.push_str("=\"");
        escape_attribute(&decl.uri, out);
        out.push('"');
    }

    for attr in &el.attributes {
        out.push(' ');
        write_qname(attr.prefix.as_deref(), &attr.name, out);
        out.push_str("=\"");
        escape_attribute(&attr.value, out);
        out.push('"');
    }

    if el.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &el.children {
        write_node(child, out);
    }
    out.push_str("</");
    write_qname(el.prefix.as_deref(), &el.name, out);
    out.push('>');
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            // A literal CR would become LF on re-parse.
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            // Literal whitespace would be normalized to spaces on re-parse.
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(c),
        }
    }
}
