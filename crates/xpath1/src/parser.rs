//! A `nom`-based parser for the XPath 1.0 expression language.

use crate::ast::*;
use crate::error::XPathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0},
    combinator::{map, map_res, not, opt, recognize, value},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated},
};

pub fn parse_expression(input: &str) -> Result<Expression, XPathError> {
    match expression(input.trim()) {
        Ok(("", expr)) => Ok(expr),
        Ok((rem, _)) => Err(XPathError::XPathParse(
            input.to_string(),
            format!("unexpected input at '{}'", rem),
        )),
        Err(e) => Err(XPathError::XPathParse(input.to_string(), e.to_string())),
    }
}

// --- Combinators & Helpers ---

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

/// Folds `sub (op sub)*` into a left-associative chain of `BinaryOp`s.
fn left_assoc<'a, F, G>(
    sub_expr: F,
    op: G,
) -> impl FnMut(&'a str) -> IResult<&'a str, Expression>
where
    F: Parser<&'a str, Output = Expression, Error = nom::error::Error<&'a str>> + Clone,
    G: Parser<&'a str, Output = BinaryOperator, Error = nom::error::Error<&'a str>> + Clone,
{
    move |input: &'a str| {
        let (input, first) = sub_expr.clone().parse(input)?;
        let (input, rest) = many0(pair(ws(op.clone()), sub_expr.clone())).parse(input)?;
        let expr = rest.into_iter().fold(first, |left, (op, right)| Expression::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        });
        Ok((input, expr))
    }
}

/// Matches an operator name such as `and` or `div` that does not run on into
/// a longer name.
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| terminated(tag(word), not(take_while1(is_name_char))).parse(input)
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

// --- Operators ---

fn or_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(keyword("or"), |_| BinaryOperator::Or).parse(input)
}

fn and_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(keyword("and"), |_| BinaryOperator::And).parse(input)
}

fn equality_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::NotEquals, tag("!=")),
        value(BinaryOperator::Equals, tag("=")),
    ))
    .parse(input)
}

fn relational_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::LessThanOrEqual, tag("<=")),
        value(BinaryOperator::GreaterThanOrEqual, tag(">=")),
        value(BinaryOperator::LessThan, tag("<")),
        value(BinaryOperator::GreaterThan, tag(">")),
    ))
    .parse(input)
}

fn additive_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::Plus, char('+')),
        value(BinaryOperator::Minus, char('-')),
    ))
    .parse(input)
}

fn multiplicative_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::Multiply, char('*')),
        map(keyword("div"), |_| BinaryOperator::Divide),
        map(keyword("mod"), |_| BinaryOperator::Modulo),
    ))
    .parse(input)
}

fn union_op(input: &str) -> IResult<&str, BinaryOperator> {
    value(BinaryOperator::Union, char('|')).parse(input)
}

// --- Expression Parsers (lowest precedence first) ---

fn expression(input: &str) -> IResult<&str, Expression> {
    or_expr(input)
}

fn or_expr(input: &str) -> IResult<&str, Expression> {
    left_assoc(and_expr, or_op)(input)
}

fn and_expr(input: &str) -> IResult<&str, Expression> {
    left_assoc(equality_expr, and_op)(input)
}

fn equality_expr(input: &str) -> IResult<&str, Expression> {
    left_assoc(relational_expr, equality_op)(input)
}

fn relational_expr(input: &str) -> IResult<&str, Expression> {
    left_assoc(additive_expr, relational_op)(input)
}

fn additive_expr(input: &str) -> IResult<&str, Expression> {
    left_assoc(multiplicative_expr, additive_op)(input)
}

fn multiplicative_expr(input: &str) -> IResult<&str, Expression> {
    left_assoc(unary_expr, multiplicative_op)(input)
}

fn unary_expr(input: &str) -> IResult<&str, Expression> {
    let (i, minus) = opt(ws(char('-'))).parse(input)?;
    if minus.is_some() {
        let (i, expr) = unary_expr(i)?;
        let negated = Expression::UnaryOp {
            op: UnaryOperator::Minus,
            expr: Box::new(expr),
        };
        return Ok((i, negated));
    }
    union_expr(i)
}

fn union_expr(input: &str) -> IResult<&str, Expression> {
    left_assoc(path_expr, union_op)(input)
}

/// A location path, or a filter expression optionally continued by `/` steps.
fn path_expr(input: &str) -> IResult<&str, Expression> {
    // Primary expressions go first so that `count(x)` is not taken for a
    // step named `count`.
    if let Ok((i, base)) = filter_expr(input) {
        let (i, steps) = relative_steps(i)?;
        if steps.is_empty() {
            return Ok((i, base));
        }
        let path = LocationPath {
            start_point: Some(Box::new(base)),
            is_absolute: false,
            steps,
        };
        return Ok((i, Expression::LocationPath(path)));
    }
    map(ws(location_path), Expression::LocationPath).parse(input)
}

fn filter_expr(input: &str) -> IResult<&str, Expression> {
    let (i, base) = primary_expr(input)?;
    let (i, predicates) = many0(predicate).parse(i)?;
    if predicates.is_empty() {
        Ok((i, base))
    } else {
        let filter = Expression::Filter {
            base: Box::new(base),
            predicates,
        };
        Ok((i, filter))
    }
}

fn primary_expr(input: &str) -> IResult<&str, Expression> {
    ws(alt((
        map(number, Expression::Number),
        map(string_literal, Expression::Literal),
        function_call,
        delimited(char('('), expression, ws(char(')'))),
    )))
    .parse(input)
}

// --- Literals ---

/// `Digits ('.' Digits?)? | '.' Digits`
fn number(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        ))),
        str::parse::<f64>,
    )
    .parse(input)
}

fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        str::to_string,
    )
    .parse(input)
}

// --- Names and node tests ---

fn nc_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(take_while1(is_name_start), take_while(is_name_char))).parse(input)
}

/// `prefix:local` or `local`.
fn q_name(input: &str) -> IResult<&str, (Option<&str>, &str)> {
    let (i, first) = nc_name(input)?;
    match preceded(char(':'), nc_name).parse(i) {
        Ok((i, local)) => Ok((i, (Some(first), local))),
        Err(_) => Ok((i, (None, first))),
    }
}

fn node_type_test(input: &str) -> IResult<&str, NodeTest> {
    let kind = alt((
        value(NodeTypeTest::ProcessingInstruction, tag("processing-instruction")),
        value(NodeTypeTest::Comment, tag("comment")),
        value(NodeTypeTest::Text, tag("text")),
        value(NodeTypeTest::Node, tag("node")),
    ));
    let parens = pair(ws(char('(')), char(')'));
    map(terminated(kind, parens), NodeTest::NodeType).parse(input)
}

pub fn node_test(input: &str) -> IResult<&str, NodeTest> {
    alt((
        value(NodeTest::Wildcard, char('*')),
        node_type_test,
        map(terminated(nc_name, tag(":*")), |prefix| {
            NodeTest::NamespaceWildcard(prefix.to_string())
        }),
        map(q_name, |(prefix, local)| NodeTest::name(prefix, local)),
    ))
    .parse(input)
}

// --- Steps and location paths ---

fn axis(input: &str) -> IResult<&str, Axis> {
    let name = alt((
        value(Axis::AncestorOrSelf, tag("ancestor-or-self")),
        value(Axis::Ancestor, tag("ancestor")),
        value(Axis::Attribute, tag("attribute")),
        value(Axis::Child, tag("child")),
        value(Axis::DescendantOrSelf, tag("descendant-or-self")),
        value(Axis::Descendant, tag("descendant")),
        value(Axis::FollowingSibling, tag("following-sibling")),
        value(Axis::Following, tag("following")),
        value(Axis::Parent, tag("parent")),
        value(Axis::PrecedingSibling, tag("preceding-sibling")),
        value(Axis::Preceding, tag("preceding")),
        value(Axis::SelfAxis, tag("self")),
    ));
    terminated(name, tag("::")).parse(input)
}

fn predicate(input: &str) -> IResult<&str, Expression> {
    delimited(ws(char('[')), expression, ws(char(']'))).parse(input)
}

fn step(input: &str) -> IResult<&str, Step> {
    let any_node = || NodeTest::NodeType(NodeTypeTest::Node);
    let (i, (axis, node_test)) = alt((
        map(tag(".."), |_| (Axis::Parent, any_node())),
        map(tag("."), |_| (Axis::SelfAxis, any_node())),
        map(preceded(char('@'), node_test), |nt| (Axis::Attribute, nt)),
        map(pair(opt(axis), node_test), |(ax, nt)| (ax.unwrap_or(Axis::Child), nt)),
    ))
    .parse(input)?;
    let (i, predicates) = many0(predicate).parse(i)?;
    Ok((
        i,
        Step {
            axis,
            node_test,
            predicates,
        },
    ))
}

/// Zero or more `/step` or `//step` continuations.
fn relative_steps(input: &str) -> IResult<&str, Vec<Step>> {
    let (i, parts) = many0(pair(alt((tag("//"), tag("/"))), step)).parse(input)?;
    let mut steps = Vec::with_capacity(parts.len());
    for (sep, next) in parts {
        if sep == "//" {
            steps.push(Step::descendant_or_self_node());
        }
        steps.push(next);
    }
    Ok((i, steps))
}

fn location_path(input: &str) -> IResult<&str, LocationPath> {
    let (i, lead) = opt(alt((tag("//"), tag("/")))).parse(input)?;
    let (i, mut steps) = match lead {
        Some("//") => {
            let (i, first) = step(i)?;
            (i, vec![Step::descendant_or_self_node(), first])
        }
        // `/` on its own selects the root.
        Some(_) => match step(i) {
            Ok((i, first)) => (i, vec![first]),
            Err(_) => (i, vec![]),
        },
        None => {
            let (i, first) = step(i)?;
            (i, vec![first])
        }
    };

    let (i, rest) = relative_steps(i)?;
    steps.extend(rest);
    Ok((
        i,
        LocationPath {
            start_point: None,
            is_absolute: lead.is_some(),
            steps,
        },
    ))
}

fn function_call(input: &str) -> IResult<&str, Expression> {
    let (i, (prefix, local)) = q_name(input)?;
    // Node-type tests look like calls but are steps.
    if prefix.is_none() && matches!(local, "text" | "node" | "comment" | "processing-instruction") {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    let (i, args) = delimited(
        ws(char('(')),
        separated_list0(ws(char(',')), expression),
        ws(char(')')),
    )
    .parse(i)?;
    let name = match prefix {
        Some(prefix) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    };
    Ok((i, Expression::FunctionCall { name, args }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(is_absolute: bool, steps: Vec<Step>) -> Expression {
        Expression::LocationPath(LocationPath {
            start_point: None,
            is_absolute,
            steps,
        })
    }

    fn child(prefix: Option<&str>, local: &str) -> Step {
        Step::new(Axis::Child, NodeTest::name(prefix, local))
    }

    #[test]
    fn test_parse_namespaced_absolute_path() {
        assert_eq!(
            parse_expression("/a:feed/a:entry").unwrap(),
            path(true, vec![child(Some("a"), "feed"), child(Some("a"), "entry")])
        );
    }

    #[test]
    fn test_parse_relative_paths() {
        assert_eq!(parse_expression("root").unwrap(), path(false, vec![child(None, "root")]));
        assert_eq!(
            parse_expression("a:phoneNumbers/*").unwrap(),
            path(
                false,
                vec![
                    child(Some("a"), "phoneNumbers"),
                    Step::new(Axis::Child, NodeTest::Wildcard)
                ]
            )
        );
        assert_eq!(
            parse_expression("@id").unwrap(),
            path(false, vec![Step::new(Axis::Attribute, NodeTest::name(None, "id"))])
        );
    }

    #[test]
    fn test_parse_names_with_keywords_and_dots() {
        assert_eq!(parse_expression("order").unwrap(), path(false, vec![child(None, "order")]));
        assert_eq!(parse_expression("divider").unwrap(), path(false, vec![child(None, "divider")]));
        assert_eq!(parse_expression("info").unwrap(), path(false, vec![child(None, "info")]));
        assert_eq!(parse_expression("nodes").unwrap(), path(false, vec![child(None, "nodes")]));
        assert_eq!(
            parse_expression("v1.2/x-y").unwrap(),
            path(false, vec![child(None, "v1.2"), child(None, "x-y")])
        );
    }

    #[test]
    fn test_parse_node_type_tests() {
        let any = NodeTest::NodeType(NodeTypeTest::Node);
        assert_eq!(parse_expression("node()").unwrap(), path(false, vec![Step::new(Axis::Child, any.clone())]));
        assert_eq!(parse_expression(".").unwrap(), path(false, vec![Step::new(Axis::SelfAxis, any.clone())]));
        assert_eq!(parse_expression("..").unwrap(), path(false, vec![Step::new(Axis::Parent, any)]));
        assert_eq!(
            parse_expression("text()").unwrap(),
            path(false, vec![Step::new(Axis::Child, NodeTest::NodeType(NodeTypeTest::Text))])
        );
    }

    #[test]
    fn test_parse_namespace_wildcard() {
        assert_eq!(
            parse_expression("app:*").unwrap(),
            path(false, vec![Step::new(Axis::Child, NodeTest::NamespaceWildcard("app".into()))])
        );
    }

    #[test]
    fn test_parse_axes() {
        let Expression::LocationPath(lp) = parse_expression("ancestor-or-self::a:x/following-sibling::*").unwrap() else {
            panic!("Expected location path");
        };
        assert_eq!(lp.steps[0].axis, Axis::AncestorOrSelf);
        assert_eq!(lp.steps[1].axis, Axis::FollowingSibling);
    }

    #[test]
    fn test_parse_descendant_abbreviation() {
        assert_eq!(
            parse_expression("//a:name").unwrap(),
            path(true, vec![Step::descendant_or_self_node(), child(Some("a"), "name")])
        );
        assert_eq!(
            parse_expression("a//b").unwrap(),
            path(false, vec![child(None, "a"), Step::descendant_or_self_node(), child(None, "b")])
        );
        assert_eq!(parse_expression("/").unwrap(), path(true, vec![]));
    }

    #[test]
    fn test_parse_predicates() {
        let Expression::LocationPath(lp) = parse_expression("entry[ @id = '1' ][2]").unwrap() else {
            panic!("Expected location path");
        };
        let predicates = &lp.steps[0].predicates;
        assert_eq!(predicates.len(), 2);
        assert!(predicates[0].is_binary_op());
        assert_eq!(predicates[1], Expression::Number(2.0));
    }

    #[test]
    fn test_parse_filter_expression() {
        let expr = parse_expression("(//entry)[1]/name").unwrap();
        let Expression::LocationPath(lp) = expr else {
            panic!("Expected location path");
        };
        assert!(matches!(lp.start_point.as_deref(), Some(Expression::Filter { .. })));
        assert_eq!(lp.steps, vec![child(None, "name")]);
    }

    #[test]
    fn test_parse_function_calls() {
        assert_eq!(
            parse_expression("count(a:entry)").unwrap(),
            Expression::FunctionCall {
                name: "count".into(),
                args: vec![path(false, vec![child(Some("a"), "entry")])],
            }
        );
        assert!(matches!(
            parse_expression("concat('a', \"b\", 1.5)").unwrap(),
            Expression::FunctionCall { ref args, .. } if args.len() == 3
        ));
    }

    #[test]
    fn test_parse_operator_precedence() {
        assert_eq!(
            parse_expression("1 + 2 * 3").unwrap(),
            Expression::BinaryOp {
                left: Box::new(Expression::Number(1.0)),
                op: BinaryOperator::Plus,
                right: Box::new(Expression::BinaryOp {
                    left: Box::new(Expression::Number(2.0)),
                    op: BinaryOperator::Multiply,
                    right: Box::new(Expression::Number(3.0)),
                }),
            }
        );
        assert!(matches!(
            parse_expression("a = 1 or b != 2 and c &lt;= 3"),
            Err(XPathError::XPathParse(..))
        ));
        assert!(matches!(
            parse_expression("a = 1 or b != 2 and c <= 3").unwrap(),
            Expression::BinaryOp { op: BinaryOperator::Or, .. }
        ));
    }

    #[test]
    fn test_parse_unary_minus() {
        assert_eq!(
            parse_expression("10 - -5").unwrap(),
            Expression::BinaryOp {
                left: Box::new(Expression::Number(10.0)),
                op: BinaryOperator::Minus,
                right: Box::new(Expression::UnaryOp {
                    op: UnaryOperator::Minus,
                    expr: Box::new(Expression::Number(5.0)),
                }),
            }
        );
    }

    #[test]
    fn test_parse_errors_name_the_expression() {
        let err = parse_expression("a:entry[").unwrap_err();
        assert!(matches!(err, XPathError::XPathParse(ref expr, _) if expr == "a:entry["));
        assert!(parse_expression("").is_err());
        assert!(parse_expression("a b").is_err());
    }
}
