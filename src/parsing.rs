//! The entry point for declaring mappings.

use crate::array::ArrayParserBuilder;
use crate::config::UnXmlConfig;
use crate::converter::{NodeConverter, TextConverter};
use crate::error::UnXmlError;
use crate::lazy::LazyParser;
use crate::object::ObjectParserBuilder;
use crate::parser::IntoParser;
use crate::simple::SimpleParsers;
use serde::Serialize;
use std::error::Error;
use std::sync::Arc;
use unxml_source::{XmlLoader, XmlNode};
use unxml_xpath1::NamespaceContext;

/// Hands out builders and parsers that share one namespace context.
///
/// ```ignore
/// let parsing = Parsing::new(NamespaceContext::new().with("a", "http://www.w3.org/2005/Atom"));
/// let entries = parsing
///     .arr("/a:feed/a:entry", parsing.obj()
///         .attribute_with("id", "@id", parsing.with(str::parse::<i32>))
///         .attribute("name", "a:name"))
///     .build();
///
/// let text = parsing.xml().read_file("feed.xml")?;
/// let doc = parsing.xml().parse(&text)?;
/// let json = entries.apply(doc.root_node())?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Parsing {
    namespaces: Arc<NamespaceContext>,
    loader: XmlLoader,
}

impl Parsing {
    pub fn new(namespaces: NamespaceContext) -> Self {
        Self {
            namespaces: Arc::new(namespaces),
            loader: XmlLoader::new(),
        }
    }

    pub fn from_config(config: &UnXmlConfig) -> Result<Self, UnXmlError> {
        config.validate()?;
        Ok(Self {
            namespaces: Arc::new(config.namespace_context()),
            loader: config.loader(),
        })
    }

    pub fn namespaces(&self) -> &NamespaceContext {
        &self.namespaces
    }

    /// A new, empty object builder.
    pub fn obj(&self) -> ObjectParserBuilder {
        ObjectParserBuilder::new(self.namespaces.clone())
    }

    /// An array over every node `path` selects.
    pub fn arr(&self, path: &str, element: impl IntoParser) -> ArrayParserBuilder {
        ArrayParserBuilder::new(self.namespaces.clone(), path, element)
    }

    /// Lifts a text conversion into a parser.
    pub fn with<F, T, E>(&self, f: F) -> TextConverter<F, T, E>
    where
        F: Fn(&str) -> Result<T, E> + Send + Sync,
        T: Serialize,
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        TextConverter::new(f)
    }

    /// Lifts a conversion over the node itself into a parser.
    pub fn lift<F, T, E>(&self, f: F) -> NodeConverter<F, T, E>
    where
        F: Fn(XmlNode<'_>) -> Result<T, E> + Send + Sync,
        T: Serialize,
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        NodeConverter::new(f)
    }

    /// Defers producing a parser until it is first applied.
    pub fn lazy<F, P>(&self, producer: F) -> LazyParser
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: IntoParser,
    {
        LazyParser::new(producer)
    }

    pub fn simple(&self) -> SimpleParsers {
        SimpleParsers::new()
    }

    pub fn xml(&self) -> XmlLoader {
        self.loader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use serde_json::json;

    #[test]
    fn test_builders_share_namespaces() {
        let parsing = Parsing::new(NamespaceContext::new().with("x", "urn:x"));
        let text = r#"<r xmlns:y="urn:x"><y:v>1</y:v><y:v>2</y:v></r>"#;
        let doc = parsing.xml().parse(text).unwrap();

        let parser = parsing
            .obj()
            .attribute("first", "x:v")
            .attribute_from("all", parsing.arr("x:v", parsing.with(str::parse::<u8>)))
            .build();
        assert_eq!(
            parser.apply(doc.root_element()).unwrap(),
            json!({"first": "1", "all": [1, 2]})
        );
    }

    #[test]
    fn test_lift_node_function() {
        let parsing = Parsing::default();
        let doc = parsing.xml().parse(r#"<r a="1" b="2"/>"#).unwrap();
        let count = parsing.lift(|node: XmlNode<'_>| {
            use unxml_xpath1::DataSourceNode;
            Ok::<_, std::convert::Infallible>(node.attributes().count())
        });
        assert_eq!(count.apply(doc.root_element()).unwrap(), json!(2));
    }

    #[test]
    fn test_from_config() {
        let config = UnXmlConfig::new().with_namespace("a", "urn:a").with_nodes_limit(10);
        let parsing = Parsing::from_config(&config).unwrap();
        assert_eq!(parsing.namespaces().uri("a"), Some("urn:a"));
        assert_eq!(parsing.xml().nodes_limit(), 10);

        let invalid = UnXmlConfig::new().with_nodes_limit(0);
        assert!(matches!(Parsing::from_config(&invalid), Err(UnXmlError::Config(_))));
    }

    #[test]
    fn test_unbound_prefix_names_expression() {
        let parsing = Parsing::default();
        let doc = parsing.xml().parse("<r/>").unwrap();
        let parser = parsing.obj().attribute("v", "q:v").build();
        let err = parser.apply(doc.root_element()).unwrap_err();
        assert!(matches!(err, UnXmlError::Path { ref expression, .. } if expression == "q:v"));
        assert!(err.to_string().contains("q:v"));
    }
}
