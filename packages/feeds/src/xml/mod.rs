//! Owned XML tree for feed documents.

mod document;
mod writer;

pub use document::{Attribute, Descendants, Element, FeedDocument, NamespaceDecl, Node};
