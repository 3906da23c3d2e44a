//! An implementation of `DataSourceNode` for `roxmltree` documents.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use unxml_xpath1::{DataSourceNode, NodeType, QName, XML_NAMESPACE};

/// A parsed document. Every [`XmlNode`] borrows from it.
#[derive(Debug)]
pub struct XmlDocument<'input> {
    doc: roxmltree::Document<'input>,
}

impl<'input> XmlDocument<'input> {
    pub(crate) fn new(doc: roxmltree::Document<'input>) -> Self {
        Self { doc }
    }

    /// The document node, i.e. the parent of the document element.
    pub fn root_node(&self) -> XmlNode<'_> {
        XmlNode::Node(self.doc.root())
    }

    /// The outermost element of the document.
    pub fn root_element(&self) -> XmlNode<'_> {
        XmlNode::Node(self.doc.root_element())
    }
}

/// Any node of the XPath data model. `roxmltree` keeps attributes as data on
/// their element, so an attribute is addressed by its element and position.
#[derive(Debug, Clone, Copy)]
pub enum XmlNode<'a> {
    Node(roxmltree::Node<'a, 'a>),
    Attribute {
        parent: roxmltree::Node<'a, 'a>,
        index: usize,
    },
}

impl<'a> XmlNode<'a> {
    /// The wrapped tree node, `None` for attributes.
    pub fn inner(&self) -> Option<roxmltree::Node<'a, 'a>> {
        match self {
            XmlNode::Node(node) => Some(*node),
            XmlNode::Attribute { .. } => None,
        }
    }

    fn attribute(&self) -> Option<roxmltree::Attribute<'a, 'a>> {
        match self {
            XmlNode::Attribute { parent, index } => parent.attributes().nth(*index),
            XmlNode::Node(_) => None,
        }
    }

    /// Position in document order: an element sorts before its attributes,
    /// which sort before its children.
    fn order_key(&self) -> (u32, usize) {
        match self {
            XmlNode::Node(node) => (node.id().get(), 0),
            XmlNode::Attribute { parent, index } => (parent.id().get(), index + 1),
        }
    }

    /// The DOM-style node name: the qualified name of elements and
    /// attributes, the target of processing instructions, and `#text`,
    /// `#comment` or `#document` for the unnamed kinds.
    pub fn node_name(&self) -> String {
        match self.node_type() {
            NodeType::Root => "#document".to_string(),
            NodeType::Text => "#text".to_string(),
            NodeType::Comment => "#comment".to_string(),
            _ => self.name().map(|q| q.qualified()).unwrap_or_default(),
        }
    }

    /// The local part of the name, empty for unnamed nodes.
    pub fn local_name(&self) -> &'a str {
        self.name().map(|q| q.local_part).unwrap_or("")
    }
}

fn prefix_in_scope<'a>(scope: roxmltree::Node<'a, 'a>, uri: Option<&str>) -> Option<&'a str> {
    match uri {
        Some(XML_NAMESPACE) => Some("xml"),
        Some(uri) => scope.lookup_prefix(uri).filter(|prefix| !prefix.is_empty()),
        None => None,
    }
}

impl PartialEq for XmlNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.order_key() == other.order_key()
    }
}

impl Eq for XmlNode<'_> {}

impl PartialOrd for XmlNode<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for XmlNode<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl Hash for XmlNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.order_key().hash(state);
    }
}

impl<'a> DataSourceNode<'a> for XmlNode<'a> {
    fn node_type(&self) -> NodeType {
        match self {
            XmlNode::Attribute { .. } => NodeType::Attribute,
            XmlNode::Node(node) => match node.node_type() {
                roxmltree::NodeType::Root => NodeType::Root,
                roxmltree::NodeType::Element => NodeType::Element,
                roxmltree::NodeType::Text => NodeType::Text,
                roxmltree::NodeType::Comment => NodeType::Comment,
                roxmltree::NodeType::PI => NodeType::ProcessingInstruction,
            },
        }
    }

    fn name(&self) -> Option<QName<'a>> {
        match self {
            XmlNode::Node(node) if node.is_element() => {
                let tag = node.tag_name();
                Some(QName {
                    prefix: prefix_in_scope(*node, tag.namespace()),
                    namespace: tag.namespace(),
                    local_part: tag.name(),
                })
            }
            XmlNode::Node(node) => node.pi().map(|pi| QName::local(pi.target)),
            XmlNode::Attribute { parent, .. } => self.attribute().map(|attr| QName {
                prefix: prefix_in_scope(*parent, attr.namespace()),
                namespace: attr.namespace(),
                local_part: attr.name(),
            }),
        }
    }

    fn string_value(&self) -> String {
        match self {
            XmlNode::Attribute { .. } => self
                .attribute()
                .map(|attr| attr.value().to_string())
                .unwrap_or_default(),
            XmlNode::Node(node) if node.is_root() || node.is_element() => node
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect(),
            XmlNode::Node(node) if node.is_pi() => node
                .pi()
                .and_then(|pi| pi.value)
                .unwrap_or_default()
                .to_string(),
            XmlNode::Node(node) => node.text().unwrap_or_default().to_string(),
        }
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Node(node) if node.is_element() => {
                let parent = *node;
                let count = node.attributes().len();
                Box::new((0..count).map(move |index| XmlNode::Attribute { parent, index }))
            }
            _ => Box::new(std::iter::empty()),
        }
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        match self {
            XmlNode::Node(node) => Box::new(node.children().map(XmlNode::Node)),
            XmlNode::Attribute { .. } => Box::new(std::iter::empty()),
        }
    }

    fn parent(&self) -> Option<Self> {
        match self {
            XmlNode::Node(node) => node.parent().map(XmlNode::Node),
            XmlNode::Attribute { parent, .. } => Some(XmlNode::Node(*parent)),
        }
    }
}
