//! Builds parsers that map every node a path selects into a JSON array.

use crate::error::UnXmlError;
use crate::parser::{IntoParser, Parser, ParserRef};
use crate::path::PathExpr;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use unxml_source::XmlNode;
use unxml_xpath1::NamespaceContext;

/// Pairs a path with the element logic applied to each of its matches.
#[derive(Clone)]
pub struct ArrayParserBuilder {
    namespaces: Arc<NamespaceContext>,
    path: String,
    element: ParserRef,
}

impl ArrayParserBuilder {
    pub fn new(namespaces: Arc<NamespaceContext>, path: &str, element: impl IntoParser) -> Self {
        Self {
            namespaces,
            path: path.to_string(),
            element: element.into_parser(),
        }
    }

    /// Replaces the element logic.
    pub fn element(mut self, element: impl IntoParser) -> Self {
        self.element = element.into_parser();
        self
    }

    pub fn build(self) -> ArrayParser {
        log::debug!("Built array parser over '{}'", self.path);
        ArrayParser {
            path: PathExpr::new(&self.path),
            namespaces: self.namespaces,
            element: self.element,
        }
    }
}

impl IntoParser for ArrayParserBuilder {
    fn into_parser(self) -> ParserRef {
        Arc::new(self.build())
    }
}

impl fmt::Debug for ArrayParserBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayParserBuilder").field("path", &self.path).finish()
    }
}

/// Produces one array element per match, in document order. No match gives
/// an empty array.
#[derive(Clone)]
pub struct ArrayParser {
    path: PathExpr,
    namespaces: Arc<NamespaceContext>,
    element: ParserRef,
}

impl ArrayParser {
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    pub fn parse_array(&self, node: XmlNode<'_>) -> Result<Vec<Value>, UnXmlError> {
        let matches = self.path.select(node, &self.namespaces)?;
        log::trace!("'{}' matched {} node(s)", self.path.as_str(), matches.len());
        matches.into_iter().map(|m| self.element.apply(m)).collect()
    }
}

impl Parser for ArrayParser {
    fn apply(&self, node: XmlNode<'_>) -> Result<Value, UnXmlError> {
        self.parse_array(node).map(Value::Array)
    }
}

impl fmt::Debug for ArrayParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayParser").field("path", &self.path.as_str()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::TextConverter;
    use crate::object::ObjectParserBuilder;
    use serde_json::json;
    use unxml_source::XmlLoader;

    const LIST: &str = "<list><n>3</n><n>1</n><skip/><n>2</n></list>";

    fn ns() -> Arc<NamespaceContext> {
        Arc::new(NamespaceContext::new())
    }

    fn int() -> ParserRef {
        Arc::new(TextConverter::new(str::parse::<i64>))
    }

    #[test]
    fn test_one_element_per_match_in_document_order() {
        let doc = XmlLoader::new().parse(LIST).unwrap();
        let parser = ArrayParserBuilder::new(ns(), "n", int()).build();
        assert_eq!(parser.apply(doc.root_element()).unwrap(), json!([3, 1, 2]));
        assert_eq!(parser.path(), "n");
    }

    #[test]
    fn test_no_match_yields_empty_array() {
        let doc = XmlLoader::new().parse(LIST).unwrap();
        let parser = ArrayParserBuilder::new(ns(), "missing", int()).build();
        assert_eq!(parser.parse_array(doc.root_element()).unwrap(), Vec::<Value>::new());
        assert_eq!(parser.apply(doc.root_element()).unwrap(), json!([]));
    }

    #[test]
    fn test_element_logic_can_be_replaced() {
        let doc = XmlLoader::new().parse(LIST).unwrap();
        let names = ObjectParserBuilder::new(ns()).attribute("value", ".");
        let parser = ArrayParserBuilder::new(ns(), "*", int()).element(names).build();
        assert_eq!(
            parser.apply(doc.root_element()).unwrap(),
            json!([{"value": "3"}, {"value": "1"}, {"value": ""}, {"value": "2"}])
        );
    }

    #[test]
    fn test_conversion_failure_aborts_the_array() {
        let doc = XmlLoader::new().parse(LIST).unwrap();
        let parser = ArrayParserBuilder::new(ns(), "*", int()).build();
        assert!(matches!(
            parser.apply(doc.root_element()),
            Err(UnXmlError::Conversion { ref input, .. }) if input.is_empty()
        ));
    }

    #[test]
    fn test_scalar_path_is_rejected() {
        let doc = XmlLoader::new().parse(LIST).unwrap();
        let parser = ArrayParserBuilder::new(ns(), "count(n)", int()).build();
        assert!(matches!(parser.apply(doc.root_element()), Err(UnXmlError::Path { .. })));
    }
}
