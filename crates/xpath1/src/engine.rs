//! The evaluation engine for executing a parsed XPath AST against a generic `DataSourceNode`.

use crate::ast::{Axis, Expression, LocationPath, NodeTest, NodeTypeTest, Step, UnaryOperator};
use crate::datasource::{DataSourceNode, NodeType};
use crate::error::XPathError;
use crate::namespace::NamespaceContext;
use crate::{axes, functions, operators};
use std::fmt;
use std::marker::PhantomData;

/// Represents the possible result types of an XPath expression evaluation.
#[derive(Debug, Clone)]
pub enum XPathValue<N> {
    NodeSet(Vec<N>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<'a, N: DataSourceNode<'a>> XPathValue<N> {
    /// Coerces the XPath value to a boolean as per XPath 1.0 rules.
    pub fn to_bool(&self) -> bool {
        match self {
            XPathValue::NodeSet(nodes) => !nodes.is_empty(),
            XPathValue::String(s) => !s.is_empty(),
            XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XPathValue::Boolean(b) => *b,
        }
    }

    /// Coerces the XPath value to a number as per XPath 1.0 rules.
    pub fn to_number(&self) -> f64 {
        match self {
            XPathValue::Number(n) => *n,
            XPathValue::Boolean(b) => f64::from(u8::from(*b)),
            XPathValue::String(s) => string_to_number(s),
            XPathValue::NodeSet(nodes) => nodes
                .first()
                .map(|n| string_to_number(&n.string_value()))
                .unwrap_or(f64::NAN),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            XPathValue::NodeSet(_) => "node-set",
            XPathValue::String(_) => "string",
            XPathValue::Number(_) => "number",
            XPathValue::Boolean(_) => "boolean",
        }
    }

    pub fn into_nodes(self) -> Result<Vec<N>, XPathError> {
        match self {
            XPathValue::NodeSet(nodes) => Ok(nodes),
            other => Err(XPathError::NotANodeSet(other.type_name().to_string())),
        }
    }
}

/// XPath numbers only accept an optional minus sign, digits and one dot.
fn string_to_number(s: &str) -> f64 {
    let t = s.trim();
    let body = t.strip_prefix('-').unwrap_or(t);
    let well_formed = !body.is_empty()
        && body.chars().all(|c| c.is_ascii_digit() || c == '.')
        && body.chars().filter(|&c| c == '.').count() <= 1
        && body != ".";
    if well_formed {
        t.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

pub(crate) fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl<'a, N: DataSourceNode<'a>> fmt::Display for XPathValue<N> {
    /// Coerces the XPath value to a string as per XPath 1.0 rules.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XPathValue::NodeSet(nodes) => write!(
                f,
                "{}",
                nodes.first().map(|n| n.string_value()).unwrap_or_default()
            ),
            XPathValue::String(s) => write!(f, "{}", s),
            XPathValue::Number(n) => write!(f, "{}", number_to_string(*n)),
            XPathValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Everything an expression can see while it is being evaluated.
/// `'a` is the lifetime of the document, `'d` the lifetime of borrowed state.
pub struct EvaluationContext<'a, 'd, N: DataSourceNode<'a>> {
    pub context_node: N,
    pub root_node: N,
    pub namespaces: &'d NamespaceContext,
    pub context_position: usize, // 1-based
    pub context_size: usize,
    _marker: PhantomData<&'a ()>,
}

impl<'a, 'd, N: DataSourceNode<'a>> EvaluationContext<'a, 'd, N> {
    pub fn new(context_node: N, namespaces: &'d NamespaceContext) -> Self {
        Self {
            context_node,
            root_node: context_node.root(),
            namespaces,
            context_position: 1,
            context_size: 1,
            _marker: PhantomData,
        }
    }

    /// A context for evaluating a predicate against one node of a candidate set.
    fn focused(&self, node: N, position: usize, size: usize) -> Self {
        Self {
            context_node: node,
            root_node: self.root_node,
            namespaces: self.namespaces,
            context_position: position,
            context_size: size,
            _marker: PhantomData,
        }
    }
}

/// Evaluates a compiled expression and returns a concrete `XPathValue`.
pub fn evaluate<'a, N>(
    expr: &Expression,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    match expr {
        Expression::Literal(s) => Ok(XPathValue::String(s.clone())),
        Expression::Number(n) => Ok(XPathValue::Number(*n)),
        Expression::LocationPath(path) => evaluate_location_path(path, e_ctx).map(XPathValue::NodeSet),
        Expression::Filter { base, predicates } => {
            let mut nodes = evaluate(base, e_ctx)?.into_nodes()?;
            nodes.sort();
            nodes.dedup();
            apply_predicates(nodes, predicates, e_ctx).map(XPathValue::NodeSet)
        }
        Expression::FunctionCall { name, args } => {
            let evaluated_args = args
                .iter()
                .map(|arg| evaluate(arg, e_ctx))
                .collect::<Result<Vec<_>, _>>()?;
            functions::evaluate_function(name, evaluated_args, e_ctx)
        }
        Expression::BinaryOp { left, op, right } => {
            let left_val = evaluate(left, e_ctx)?;
            let right_val = evaluate(right, e_ctx)?;
            operators::evaluate(*op, left_val, right_val)
        }
        Expression::UnaryOp { op, expr } => {
            let val = evaluate(expr, e_ctx)?;
            match op {
                UnaryOperator::Minus => Ok(XPathValue::Number(-val.to_number())),
            }
        }
    }
}

fn evaluate_location_path<'a, N>(
    path: &LocationPath,
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut current_nodes = if let Some(start_expr) = &path.start_point {
        let mut nodes = evaluate(start_expr, e_ctx)?.into_nodes()?;
        nodes.sort();
        nodes.dedup();
        nodes
    } else if path.is_absolute {
        vec![e_ctx.root_node]
    } else {
        vec![e_ctx.context_node]
    };

    for step in &path.steps {
        current_nodes = evaluate_step(step, &current_nodes, e_ctx)?;
    }
    Ok(current_nodes)
}

/// Evaluates one step for every node of the input set and merges the results
/// into a single duplicate-free, document-ordered node-set.
fn evaluate_step<'a, N>(
    step: &Step,
    context_nodes: &[N],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut result = Vec::new();
    for &node in context_nodes {
        let mut axis_nodes = Vec::new();
        axes::collect(step.axis, node, &mut axis_nodes);
        let tested = filter_by_node_test(axis_nodes, &step.node_test, step.axis, e_ctx.namespaces)?;
        // Predicates see positions relative to one context node's axis, so
        // they run before the per-node results are merged.
        result.extend(apply_predicates(tested, &step.predicates, e_ctx)?);
    }
    result.sort();
    result.dedup();
    Ok(result)
}

/// The principal node type of an axis: attributes for `attribute::`, elements otherwise.
fn is_principal<'a, N: DataSourceNode<'a>>(node: &N, axis: Axis) -> bool {
    match axis {
        Axis::Attribute => node.node_type() == NodeType::Attribute,
        _ => node.node_type() == NodeType::Element,
    }
}

fn filter_by_node_test<'a, N>(
    nodes: Vec<N>,
    test: &NodeTest,
    axis: Axis,
    namespaces: &NamespaceContext,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    // Resolved once per call, before the nodes are tested. `XPath` checks
    // every prefix up front, so this only fails for bare `evaluate` calls.
    let expected_namespace = match test {
        NodeTest::Name {
            prefix: Some(prefix),
            ..
        }
        | NodeTest::NamespaceWildcard(prefix) => Some(namespaces.resolve(prefix)?),
        _ => None,
    };

    let keep = |node: &N| match test {
        NodeTest::Wildcard => is_principal(node, axis),
        NodeTest::NamespaceWildcard(_) => {
            is_principal(node, axis)
                && node.name().is_some_and(|q| q.namespace == expected_namespace)
        }
        NodeTest::Name { local, .. } => {
            is_principal(node, axis)
                && node
                    .name()
                    .is_some_and(|q| q.local_part == local && q.namespace == expected_namespace)
        }
        NodeTest::NodeType(ntt) => match ntt {
            NodeTypeTest::Node => true,
            NodeTypeTest::Text => node.node_type() == NodeType::Text,
            NodeTypeTest::Comment => node.node_type() == NodeType::Comment,
            NodeTypeTest::ProcessingInstruction => {
                node.node_type() == NodeType::ProcessingInstruction
            }
        },
    };
    Ok(nodes.into_iter().filter(keep).collect())
}

fn apply_predicates<'a, N>(
    nodes: Vec<N>,
    predicates: &[Expression],
    e_ctx: &EvaluationContext<'a, '_, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut current = nodes;
    for predicate in predicates {
        let size = current.len();
        let mut kept = Vec::with_capacity(size);
        for (i, node) in current.into_iter().enumerate() {
            let result = evaluate(predicate, &e_ctx.focused(node, i + 1, size))?;
            let keep = match result {
                XPathValue::Number(n) => n == (i + 1) as f64,
                other => other.to_bool(),
            };
            if keep {
                kept.push(node);
            }
        }
        current = kept;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::tests::*;
    use crate::parser::parse_expression;

    fn namespaces() -> NamespaceContext {
        NamespaceContext::new().with("a", ATOM).with("app", APP)
    }

    fn select<'t>(tree: &'t MockTree<'t>, context: usize, expr: &str) -> Result<Vec<usize>, XPathError> {
        let ns = namespaces();
        let e_ctx = EvaluationContext::new(tree.node(context), &ns);
        let expr = parse_expression(expr)?;
        Ok(evaluate(&expr, &e_ctx)?
            .into_nodes()?
            .into_iter()
            .map(|n| n.id)
            .collect())
    }

    #[test]
    fn test_absolute_namespaced_path() {
        let tree = create_test_tree();
        assert_eq!(
            select(&tree, NAME_1, "/a:feed/a:entry").unwrap(),
            vec![ENTRY_1, ENTRY_2, ENTRY_3]
        );
    }

    #[test]
    fn test_unprefixed_name_does_not_match_namespaced_element() {
        let tree = create_test_tree();
        assert!(select(&tree, ROOT, "feed").unwrap().is_empty());
        assert_eq!(select(&tree, ROOT, "a:feed").unwrap(), vec![FEED]);
    }

    #[test]
    fn test_relative_paths_and_attributes() {
        let tree = create_test_tree();
        assert_eq!(select(&tree, ENTRY_1, "@id").unwrap(), vec![ENTRY_1_ID]);
        assert_eq!(select(&tree, ENTRY_1, "app:email").unwrap(), vec![EMAIL_1]);
        assert_eq!(select(&tree, ENTRY_1, "app:*").unwrap(), vec![EMAIL_1]);
        assert_eq!(select(&tree, ENTRY_2, "@*").unwrap(), vec![ENTRY_2_ID, ENTRY_2_LANG]);
        assert_eq!(select(&tree, ENTRY_2, "@xml:lang").unwrap(), vec![ENTRY_2_LANG]);
        assert_eq!(select(&tree, NAME_2, "..").unwrap(), vec![ENTRY_2]);
        assert_eq!(select(&tree, NAME_2, ".").unwrap(), vec![NAME_2]);
    }

    #[test]
    fn test_node_and_text_tests() {
        let tree = create_test_tree();
        assert_eq!(
            select(&tree, FEED, "node()").unwrap(),
            vec![ENTRY_1, COMMENT, ENTRY_2, ENTRY_3]
        );
        assert_eq!(select(&tree, FEED, "*").unwrap(), vec![ENTRY_1, ENTRY_2, ENTRY_3]);
        assert_eq!(select(&tree, FEED, "comment()").unwrap(), vec![COMMENT]);
        assert_eq!(select(&tree, NAME_1, "text()").unwrap(), vec![NAME_1_TEXT]);
        assert!(select(&tree, NAME_1_TEXT, "node()").unwrap().is_empty());
    }

    #[test]
    fn test_descendant_abbreviation_in_document_order() {
        let tree = create_test_tree();
        assert_eq!(select(&tree, ENTRY_3, "//a:name").unwrap(), vec![NAME_1, NAME_2]);
        assert_eq!(
            select(&tree, ROOT, "//a:name/text() | //app:email").unwrap(),
            vec![NAME_1_TEXT, EMAIL_1, NAME_2_TEXT]
        );
    }

    #[test]
    fn test_predicates() {
        let tree = create_test_tree();
        assert_eq!(select(&tree, FEED, "a:entry[@id='2']").unwrap(), vec![ENTRY_2]);
        assert_eq!(select(&tree, FEED, "a:entry[2]").unwrap(), vec![ENTRY_2]);
        assert_eq!(select(&tree, FEED, "a:entry[last()]").unwrap(), vec![ENTRY_3]);
        assert_eq!(select(&tree, FEED, "a:entry[a:name]").unwrap(), vec![ENTRY_1, ENTRY_2]);
        assert_eq!(select(&tree, FEED, "a:entry[@id > 1][1]").unwrap(), vec![ENTRY_2]);
    }

    #[test]
    fn test_reverse_axis_predicate_counts_nearest_first() {
        let tree = create_test_tree();
        assert_eq!(select(&tree, NAME_1_TEXT, "ancestor::*[1]").unwrap(), vec![NAME_1]);
        assert_eq!(select(&tree, ENTRY_3, "preceding-sibling::a:entry[1]").unwrap(), vec![ENTRY_2]);
    }

    #[test]
    fn test_parenthesised_start_point() {
        let tree = create_test_tree();
        assert_eq!(select(&tree, ROOT, "(//a:entry)[1]/a:name").unwrap(), vec![NAME_1]);
    }

    #[test]
    fn test_unbound_prefix_is_reported() {
        let tree = create_test_tree();
        let err = select(&tree, ROOT, "x:feed").unwrap_err();
        assert_eq!(err, XPathError::UnresolvedPrefix { prefix: "x".into() });
    }

    #[test]
    fn test_scalar_result_is_not_a_node_set() {
        let tree = create_test_tree();
        let err = select(&tree, FEED, "count(a:entry)").unwrap_err();
        assert_eq!(err, XPathError::NotANodeSet("number".into()));
    }

    #[test]
    fn test_value_coercions() {
        let tree = create_test_tree();
        let ns = namespaces();
        let e_ctx = EvaluationContext::new(tree.node(FEED), &ns);
        let eval = |s: &str| evaluate(&parse_expression(s).unwrap(), &e_ctx).unwrap();
        assert_eq!(eval("a:entry[1]/@id + 41").to_number(), 42.0);
        assert_eq!(eval("a:entry/a:name").to_string(), "Homer");
        assert_eq!(eval("3 div 2").to_string(), "1.5");
        assert_eq!(eval("4 div 2").to_string(), "2");
        assert_eq!(eval("'abc' + 1").to_string(), "NaN");
        assert!(eval("a:entry").to_bool());
        assert!(!eval("a:missing").to_bool());
    }
}
