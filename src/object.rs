//! Builds parsers that produce JSON objects from named bindings.

use crate::error::UnXmlError;
use crate::parser::{IntoParser, Parser, ParserRef};
use crate::path::PathExpr;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use unxml_source::XmlNode;
use unxml_xpath1::{DataSourceNode, NamespaceContext};

/// One key of the output object.
#[derive(Clone)]
struct Binding {
    key: String,
    path: Option<PathExpr>,
    /// `None` extracts the string value of the resolved node.
    element: Option<ParserRef>,
}

impl Binding {
    fn resolve(&self, node: XmlNode<'_>, namespaces: &NamespaceContext) -> Result<Value, UnXmlError> {
        let target = match &self.path {
            None => node,
            Some(path) => {
                let matches = path.select(node, namespaces)?;
                log::trace!("'{}' matched {} node(s) for key '{}'", path.as_str(), matches.len(), self.key);
                match matches.as_slice() {
                    [] => return Ok(Value::Null),
                    [first] => *first,
                    [first, ..] => {
                        log::warn!(
                            "'{}' matched {} nodes for key '{}'; using the first",
                            path.as_str(),
                            matches.len(),
                            self.key
                        );
                        *first
                    }
                }
            }
        };
        match &self.element {
            Some(element) => element.apply(target),
            None => Ok(Value::String(target.string_value())),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("path", &self.path.as_ref().map(PathExpr::as_str))
            .field("has_element", &self.element.is_some())
            .finish()
    }
}

/// Accumulates bindings in declaration order.
///
/// Declaring a key a second time replaces the earlier binding but keeps its
/// position in the output.
#[derive(Debug, Clone)]
pub struct ObjectParserBuilder {
    namespaces: Arc<NamespaceContext>,
    bindings: Vec<Binding>,
}

impl ObjectParserBuilder {
    pub fn new(namespaces: Arc<NamespaceContext>) -> Self {
        Self {
            namespaces,
            bindings: Vec::new(),
        }
    }

    /// Binds `key` to the string value of the first node `path` selects.
    pub fn attribute(self, key: impl Into<String>, path: &str) -> Self {
        self.bind(Binding {
            key: key.into(),
            path: Some(PathExpr::new(path)),
            element: None,
        })
    }

    /// Binds `key` to `element` applied to the first node `path` selects.
    pub fn attribute_with(self, key: impl Into<String>, path: &str, element: impl IntoParser) -> Self {
        self.bind(Binding {
            key: key.into(),
            path: Some(PathExpr::new(path)),
            element: Some(element.into_parser()),
        })
    }

    /// Binds `key` to `element` applied to the context node itself.
    pub fn attribute_from(self, key: impl Into<String>, element: impl IntoParser) -> Self {
        self.bind(Binding {
            key: key.into(),
            path: None,
            element: Some(element.into_parser()),
        })
    }

    fn bind(mut self, binding: Binding) -> Self {
        match self.bindings.iter_mut().find(|b| b.key == binding.key) {
            Some(existing) => {
                log::debug!("Replacing binding for key '{}'", binding.key);
                *existing = binding;
            }
            None => self.bindings.push(binding),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn build(self) -> ObjectParser {
        log::debug!("Built object parser with {} binding(s)", self.bindings.len());
        ObjectParser {
            namespaces: self.namespaces,
            bindings: self.bindings.into(),
        }
    }
}

impl IntoParser for ObjectParserBuilder {
    fn into_parser(self) -> ParserRef {
        Arc::new(self.build())
    }
}

/// An immutable set of bindings producing a JSON object.
#[derive(Debug, Clone)]
pub struct ObjectParser {
    namespaces: Arc<NamespaceContext>,
    bindings: Arc<[Binding]>,
}

impl ObjectParser {
    /// The output keys, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|b| b.key.as_str())
    }

    pub fn parse_object(&self, node: XmlNode<'_>) -> Result<Map<String, Value>, UnXmlError> {
        let mut object = Map::with_capacity(self.bindings.len());
        for binding in self.bindings.iter() {
            let value = binding.resolve(node, &self.namespaces)?;
            object.insert(binding.key.clone(), value);
        }
        Ok(object)
    }
}

impl Parser for ObjectParser {
    fn apply(&self, node: XmlNode<'_>) -> Result<Value, UnXmlError> {
        self.parse_object(node).map(Value::Object)
    }
}
