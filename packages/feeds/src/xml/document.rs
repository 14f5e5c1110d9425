//! Owned, mutable feed document.
//!
//! `roxmltree` gives a read-only view into the source text. Each edition is
//! parsed once and converted into this owned tree, which every variant then
//! clones and edits independently.

use roxmltree::NodeType;

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        value: Option<String>,
    },
}

/// An attribute, with the prefix it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub prefix: Option<String>,
    pub name: String,
    pub value: String,
}

/// A namespace declared on an element (`xmlns` or `xmlns:prefix`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub prefix: Option<String>,
    pub uri: String,
}

/// An element and its subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub prefix: Option<String>,
    pub name: String,
    pub namespace: Option<String>,
    pub namespace_decls: Vec<NamespaceDecl>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

/// A parsed feed: the root element plus anything around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDocument {
    /// Comments and processing instructions before the root element.
    pub prolog: Vec<Node>,
    pub root: Element,
    /// Comments and processing instructions after the root element.
    pub epilog: Vec<Node>,
}

impl FeedDocument {
    /// Parse XML text into an owned document.
    pub fn parse(xml: &str) -> Result<Self, roxmltree::Error> {
        let doc = roxmltree::Document::parse(xml)?;
        let root_element = doc.root_element();

        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut seen_root = false;
        for child in doc.root().children() {
            if child == root_element {
                seen_root = true;
                continue;
            }
            let Some(node) = convert_node(child) else {
                continue;
            };
            // Whitespace between top-level nodes is not kept; the writer adds newlines.
            if matches!(node, Node::Text(_)) {
                continue;
            }
            if seen_root {
                epilog.push(node);
            } else {
                prolog.push(node);
            }
        }

        Ok(Self {
            prolog,
            root: convert_element(root_element),
            epilog,
        })
    }
}

fn convert_node(node: roxmltree::Node<'_, '_>) -> Option<Node> {
    match node.node_type() {
        NodeType::Element => Some(Node::Element(convert_element(node))),
        NodeType::Text => Some(Node::Text(node.text().unwrap_or_default().to_string())),
        NodeType::Comment => Some(Node::Comment(node.text().unwrap_or_default().to_string())),
        NodeType::PI => node.pi().map(|pi| Node::ProcessingInstruction {
            target: pi.target.to_string(),
            value: pi.value.map(str::to_string),
        }),
        NodeType::Root => None,
    }
}

fn convert_element(node: roxmltree::Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let prefix = tag
        .namespace()
        .and_then(|uri| node.lookup_prefix(uri))
        .map(str::to_string);

    let attributes = node
        .attributes()
        .map(|attr| Attribute {
            prefix: attr
                .namespace()
                .and_then(|uri| node.lookup_prefix(uri))
                .map(str::to_string),
            name: attr.name().to_string(),
            value: attr.value().to_string(),
        })
        .collect();

    Element {
        prefix,
        name: tag.name().to_string(),
        namespace: tag.namespace().map(str::to_string),
        namespace_decls: declared_namespaces(node),
        attributes,
        children: node.children().filter_map(convert_node).collect(),
    }
}

/// Namespaces in scope on `node` that were not already in scope on its parent.
fn declared_namespaces(node: roxmltree::Node<'_, '_>) -> Vec<NamespaceDecl> {
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|parent| parent.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();

    node.namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| NamespaceDecl {
            prefix: ns.name().map(str::to_string),
            uri: ns.uri().to_string(),
        })
        .collect()
}

impl Element {
    /// Create an empty, unprefixed element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            prefix: None,
            name: name.into(),
            namespace: None,
            namespace_decls: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Whether this element is `<name>` written without a prefix.
    ///
    /// RSS elements have no namespace (or the document's default one), while
    /// extension elements such as `media:title` always carry a prefix.
    pub fn is_plain(&self, name: &str) -> bool {
        self.prefix.is_none() && self.name == name
    }

    /// Whether this element has the given namespace URI and local name.
    pub fn is_in(&self, namespace: &str, name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.name == name
    }

    /// All descendant elements in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        let mut text = String::new();
        collect_text(&self.children, &mut text);
        text
    }

    /// Replace all children with a single text node.
    ///
    /// An empty string leaves the element with no children at all, so it
    /// serializes as `<name/>` both before and after a re-parse.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.children.clear();
        if !text.is_empty() {
            self.children.push(Node::Text(text));
        }
    }

    /// Value of an unprefixed attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.prefix.is_none() && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an unprefixed attribute, adding it if absent.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|a| a.prefix.is_none() && a.name == name)
        {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute {
                prefix: None,
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Concatenated text of every unprefixed descendant named `name`,
    /// or `None` when there is no such element.
    pub fn child_text(&self, name: &str) -> Option<String> {
        let mut found = false;
        let mut text = String::new();
        for el in self.descendants().filter(|el| el.is_plain(name)) {
            found = true;
            text.push_str(&el.text());
        }
        found.then_some(text)
    }

    /// Visit every descendant element in document order.
    ///
    /// `f` may return a replacement node, which takes the element's place;
    /// the replaced element's subtree is not visited.
    pub fn replace_descendants<F>(&mut self, f: &mut F)
    where
        F: FnMut(&Element) -> Option<Node>,
    {
        for child in &mut self.children {
            let Node::Element(el) = child else {
                continue;
            };
            if let Some(replacement) = f(el) {
                *child = replacement;
            } else {
                el.replace_descendants(f);
            }
        }
    }

    /// Call `f` on every descendant element in document order.
    pub fn for_each_descendant_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Element),
    {
        for child in &mut self.children {
            if let Node::Element(el) = child {
                f(el);
                el.for_each_descendant_mut(f);
            }
        }
    }

    /// First descendant element matching `predicate`, in document order.
    pub fn find_descendant_mut<P>(&mut self, predicate: &P) -> Option<&mut Element>
    where
        P: Fn(&Element) -> bool,
    {
        for child in &mut self.children {
            if let Node::Element(el) = child {
                if predicate(el) {
                    return Some(el);
                }
                if let Some(found) = el.find_descendant_mut(predicate) {
                    return Some(found);
                }
            }
        }
        None
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => collect_text(&el.children, out),
            Node::Comment(_) | Node::ProcessingInstruction { .. } => {}
        }
    }
}

/// Depth-first iterator over descendant elements.
pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        while let Some(iter) = self.stack.last_mut() {
            match iter.next() {
                Some(Node::Element(el)) => {
                    self.stack.push(el.children.iter());
                    return Some(el);
                }
                Some(_) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}
