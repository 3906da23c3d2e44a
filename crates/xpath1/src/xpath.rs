//! A compiled XPath expression that can be evaluated many times.

use crate::ast::{Expression, LocationPath, NodeTest};
use crate::datasource::DataSourceNode;
use crate::engine::{self, EvaluationContext, XPathValue};
use crate::error::XPathError;
use crate::namespace::NamespaceContext;
use crate::parser::parse_expression;
use std::fmt;

/// An XPath expression parsed once and kept alongside its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct XPath {
    source: String,
    expr: Expression,
}

impl XPath {
    pub fn compile(source: &str) -> Result<Self, XPathError> {
        let expr = parse_expression(source)?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn expression(&self) -> &Expression {
        &self.expr
    }

    /// Evaluates with `node` as the context node.
    pub fn evaluate<'a, N>(&self, node: N, namespaces: &NamespaceContext) -> Result<XPathValue<N>, XPathError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        check_prefixes(&self.expr, namespaces)?;
        let e_ctx = EvaluationContext::new(node, namespaces);
        engine::evaluate(&self.expr, &e_ctx)
    }

    /// Evaluates and returns the selected nodes in document order. Any
    /// result other than a node-set is an error.
    pub fn select<'a, N>(&self, node: N, namespaces: &NamespaceContext) -> Result<Vec<N>, XPathError>
    where
        N: DataSourceNode<'a> + 'a,
    {
        let mut nodes = self.evaluate(node, namespaces)?.into_nodes()?;
        nodes.sort();
        nodes.dedup();
        log::trace!("'{}' selected {} node(s)", self.source, nodes.len());
        Ok(nodes)
    }
}

/// Every prefix in the expression must be bound, whether or not evaluation
/// would reach the step that uses it.
fn check_prefixes(expr: &Expression, namespaces: &NamespaceContext) -> Result<(), XPathError> {
    match expr {
        Expression::Literal(_) | Expression::Number(_) => Ok(()),
        Expression::LocationPath(path) => check_path_prefixes(path, namespaces),
        Expression::Filter { base, predicates } => {
            check_prefixes(base, namespaces)?;
            predicates.iter().try_for_each(|p| check_prefixes(p, namespaces))
        }
        Expression::FunctionCall { args, .. } => {
            args.iter().try_for_each(|arg| check_prefixes(arg, namespaces))
        }
        Expression::BinaryOp { left, right, .. } => {
            check_prefixes(left, namespaces)?;
            check_prefixes(right, namespaces)
        }
        Expression::UnaryOp { expr, .. } => check_prefixes(expr, namespaces),
    }
}

fn check_path_prefixes(path: &LocationPath, namespaces: &NamespaceContext) -> Result<(), XPathError> {
    if let Some(start) = &path.start_point {
        check_prefixes(start, namespaces)?;
    }
    for step in &path.steps {
        match &step.node_test {
            NodeTest::Name {
                prefix: Some(prefix),
                ..
            }
            | NodeTest::NamespaceWildcard(prefix) => {
                namespaces.resolve(prefix)?;
            }
            _ => {}
        }
        for predicate in &step.predicates {
            check_prefixes(predicate, namespaces)?;
        }
    }
    Ok(())
}

impl fmt::Display for XPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
