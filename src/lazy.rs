use crate::error::UnXmlError;
use crate::parser::{IntoParser, Parser, ParserRef};
use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;
use unxml_source::XmlNode;

type Producer = Box<dyn Fn() -> ParserRef + Send + Sync>;

/// A parser that is only produced when it is first applied.
///
/// This is how a mapping refers to itself: the producer may build the very
/// parser that contains this one, because it does not run until `build()`
/// has long returned. The produced parser is kept for later calls. Recursion
/// stops where the child-selecting path matches nothing; a mapping that never
/// reaches such a node recurses without bound.
pub struct LazyParser {
    producer: Producer,
    parser: OnceLock<ParserRef>,
}

impl LazyParser {
    pub fn new<F, P>(producer: F) -> Self
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: IntoParser,
    {
        Self {
            producer: Box::new(move || producer().into_parser()),
            parser: OnceLock::new(),
        }
    }

    fn resolve(&self) -> &ParserRef {
        self.parser.get_or_init(|| {
            log::trace!("Producing lazily referenced parser");
            (self.producer)()
        })
    }
}

impl Parser for LazyParser {
    fn apply(&self, node: XmlNode<'_>) -> Result<Value, UnXmlError> {
        self.resolve().apply(node)
    }
}

impl fmt::Debug for LazyParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyParser")
            .field("produced", &self.parser.get().is_some())
            .finish()
    }
}
