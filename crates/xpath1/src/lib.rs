//! XPath 1.0 for `unxml`.
//!
//! Expressions are parsed with `nom` into an [`Expression`] tree and evaluated
//! against any tree implementing [`DataSourceNode`]. Name tests are
//! namespace-aware: prefixes are resolved through a [`NamespaceContext`] at
//! evaluation time, the way XPath 1.0 requires.

pub mod ast;
pub mod axes;
pub mod datasource;
pub mod engine;
pub mod error;
pub mod functions;
pub mod namespace;
pub mod operators;
pub mod parser;
pub mod xpath;

pub use ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, Step};
pub use datasource::{DataSourceNode, NodeType, QName};
pub use engine::{EvaluationContext, XPathValue, evaluate};
pub use error::XPathError;
pub use namespace::{NamespaceContext, XML_NAMESPACE};
pub use parser::parse_expression;
pub use xpath::XPath;
