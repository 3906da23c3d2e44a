//! The read-only tree abstraction the engine evaluates against.
use std::hash::Hash;

/// An expanded, namespace-aware name as it appears in the source tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName<'a> {
    /// The prefix the *document* uses for this name, if any. Only used for
    /// display (`name()`); matching goes through `namespace`.
    pub prefix: Option<&'a str>,
    pub namespace: Option<&'a str>,
    pub local_part: &'a str,
}

impl<'a> QName<'a> {
    pub fn local(local_part: &'a str) -> Self {
        Self {
            prefix: None,
            namespace: None,
            local_part,
        }
    }

    pub fn qualified(&self) -> String {
        match self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local_part),
            None => self.local_part.to_string(),
        }
    }
}

/// The type of a node, aligned with the XPath 1.0 data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
}

/// A node in a read-only, hierarchical document.
///
/// The engine is written only against this trait. `Ord` must follow document
/// order: the engine sorts every step result with it.
///
/// `'a` is the lifetime of the underlying document.
pub trait DataSourceNode<'a>:
    std::fmt::Debug + Clone + Copy + PartialEq + Eq + Hash + PartialOrd + Ord
{
    fn node_type(&self) -> NodeType;

    /// `None` for text, comment and root nodes. For a processing instruction
    /// this is its target.
    fn name(&self) -> Option<QName<'a>>;

    /// The XPath 1.0 string value:
    /// - element / root: concatenation of all descendant text nodes
    /// - attribute: its value
    /// - text, comment, processing instruction: its content
    fn string_value(&self) -> String;

    /// Empty for anything but elements.
    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// The owning element for attributes; `None` only for the root.
    fn parent(&self) -> Option<Self>;

    /// The root of the tree this node belongs to.
    fn root(&self) -> Self {
        let mut current = *self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }
}
