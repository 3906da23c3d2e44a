//! Syntax tree for XPath 1.0 expressions.

/// The top-level expression that can be evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(String),
    Number(f64),
    LocationPath(LocationPath),
    /// A primary expression followed by predicates, e.g. `(//entry)[1]`.
    /// Positions count over the whole node-set in document order.
    Filter {
        base: Box<Expression>,
        predicates: Vec<Expression>,
    },
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    UnaryOp {
        op: UnaryOperator,
        expr: Box<Expression>,
    },
}

impl Expression {
    pub fn is_location_path(&self) -> bool {
        matches!(self, Expression::LocationPath(_))
    }

    pub fn is_binary_op(&self) -> bool {
        matches!(self, Expression::BinaryOp { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Or,
    And,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Union,
}

/// A location path such as `/a:feed/a:entry`, `@id` or `(//x)[1]/y`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    /// A filter expression the path continues from, e.g. `(a | b)/c`.
    /// If `None`, the path starts from the context node or the root.
    pub start_point: Option<Box<Expression>>,
    /// True if the path starts from the document root. Ignored when
    /// `start_point` is set.
    pub is_absolute: bool,
    pub steps: Vec<Step>,
}

/// One step of a location path: `axis::node-test[predicate]*`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub node_test: NodeTest,
    pub predicates: Vec<Expression>,
}

impl Step {
    pub fn new(axis: Axis, node_test: NodeTest) -> Self {
        Self {
            axis,
            node_test,
            predicates: vec![],
        }
    }

    /// The step `//` expands to.
    pub(crate) fn descendant_or_self_node() -> Self {
        Self::new(Axis::DescendantOrSelf, NodeTest::NodeType(NodeTypeTest::Node))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Attribute,
    Parent,
    Ancestor,
    AncestorOrSelf,
    SelfAxis,
    FollowingSibling,
    PrecedingSibling,
    Following,
    Preceding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// A qualified name test. The prefix is resolved against the namespace
    /// context when the expression is evaluated.
    Name {
        prefix: Option<String>,
        local: String,
    },
    /// `prefix:*`
    NamespaceWildcard(String),
    /// `*`
    Wildcard,
    /// `text()`, `node()`, `comment()`, `processing-instruction()`
    NodeType(NodeTypeTest),
}

impl NodeTest {
    pub fn name(prefix: Option<&str>, local: &str) -> Self {
        NodeTest::Name {
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTypeTest {
    Text,
    Node,
    Comment,
    ProcessingInstruction,
}
