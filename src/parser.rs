//! The `Parser` contract every mapping is built from.

use crate::error::UnXmlError;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use unxml_source::XmlNode;

/// Maps a context node to a JSON value.
///
/// Implementations hold no per-call state, so one parser can be applied to
/// any number of documents, from any number of threads.
pub trait Parser: Send + Sync {
    fn apply(&self, node: XmlNode<'_>) -> Result<Value, UnXmlError>;
}

/// A shared, type-erased parser. Composite parsers own their children this way.
pub type ParserRef = Arc<dyn Parser>;

/// Anything that can stand in as element logic: a built parser, a
/// [`ParserRef`], or a builder that is built on the spot.
pub trait IntoParser {
    fn into_parser(self) -> ParserRef;
}

impl<P: Parser + 'static> IntoParser for P {
    fn into_parser(self) -> ParserRef {
        Arc::new(self)
    }
}

impl IntoParser for ParserRef {
    fn into_parser(self) -> ParserRef {
        self
    }
}

/// Adapts a closure over the context node into a [`Parser`].
pub struct FnParser<F> {
    f: F,
}

impl<F> FnParser<F>
where
    F: Fn(XmlNode<'_>) -> Result<Value, UnXmlError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Parser for FnParser<F>
where
    F: Fn(XmlNode<'_>) -> Result<Value, UnXmlError> + Send + Sync,
{
    fn apply(&self, node: XmlNode<'_>) -> Result<Value, UnXmlError> {
        (self.f)(node)
    }
}

impl<F> fmt::Debug for FnParser<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnParser")
    }
}
