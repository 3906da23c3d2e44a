//! Declarative XML to JSON mapping.
//!
//! A mapping is a tree of [`Parser`]s, each turning a context node into a
//! `serde_json::Value`. Object parsers bind JSON keys to XPath expressions,
//! array parsers map every node a path selects, converters turn text into
//! typed values, and lazy parsers let a mapping refer to itself so trees of
//! any depth can be flattened. [`Parsing`] is the usual way in.
//!
//! Built parsers are immutable and `Send + Sync`; one parser can be applied
//! to many documents from many threads.

pub mod array;
pub mod config;
pub mod converter;
pub mod error;
pub mod lazy;
pub mod object;
pub mod parser;
pub mod parsing;
mod path;
pub mod simple;

pub use array::{ArrayParser, ArrayParserBuilder};
pub use config::UnXmlConfig;
pub use converter::{NodeConverter, TextConverter};
pub use error::UnXmlError;
pub use lazy::LazyParser;
pub use object::{ObjectParser, ObjectParserBuilder};
pub use parser::{FnParser, IntoParser, Parser, ParserRef};
pub use parsing::Parsing;
pub use simple::SimpleParsers;

pub use unxml_source::{SourceError, XmlDocument, XmlLoader, XmlNode};
pub use unxml_xpath1::{DataSourceNode, NamespaceContext, XPathError};
