//! The XPath 1.0 core function library.
//!
//! `id()` and `lang()` are left out: the mapping layer has no DTD to declare
//! ID attributes and no use for language matching.

use crate::datasource::DataSourceNode;
use crate::engine::{EvaluationContext, XPathValue};
use crate::error::XPathError;
use std::ops::RangeInclusive;

/// Dispatches a function call to its implementation.
pub fn evaluate_function<'a, 'd, N: DataSourceNode<'a>>(
    name: &str,
    mut args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, 'd, N>,
) -> Result<XPathValue<N>, XPathError> {
    let arity = |range: RangeInclusive<usize>, args: &[XPathValue<N>]| {
        if range.contains(&args.len()) {
            Ok(())
        } else {
            Err(XPathError::FunctionError {
                function: format!("{}()", name),
                message: format!(
                    "Expected {} argument(s), got {}",
                    describe_arity(&range),
                    args.len()
                ),
            })
        }
    };

    let value = match name {
        // Node-set
        "last" => {
            arity(0..=0, &args)?;
            XPathValue::Number(e_ctx.context_size as f64)
        }
        "position" => {
            arity(0..=0, &args)?;
            XPathValue::Number(e_ctx.context_position as f64)
        }
        "count" => {
            arity(1..=1, &args)?;
            XPathValue::Number(node_set_arg(name, args.remove(0))?.len() as f64)
        }
        "local-name" => {
            arity(0..=1, &args)?;
            let node = node_or_context(name, args.pop(), e_ctx)?;
            XPathValue::String(
                node.and_then(|n| n.name())
                    .map(|q| q.local_part.to_string())
                    .unwrap_or_default(),
            )
        }
        "name" => {
            arity(0..=1, &args)?;
            let node = node_or_context(name, args.pop(), e_ctx)?;
            XPathValue::String(
                node.and_then(|n| n.name())
                    .map(|q| q.qualified())
                    .unwrap_or_default(),
            )
        }
        "namespace-uri" => {
            arity(0..=1, &args)?;
            let node = node_or_context(name, args.pop(), e_ctx)?;
            XPathValue::String(
                node.and_then(|n| n.name())
                    .and_then(|q| q.namespace)
                    .unwrap_or_default()
                    .to_string(),
            )
        }

        // String
        "string" => {
            arity(0..=1, &args)?;
            XPathValue::String(string_or_context(args.pop(), e_ctx))
        }
        "concat" => {
            if args.len() < 2 {
                return Err(XPathError::FunctionError {
                    function: "concat()".to_string(),
                    message: "Expected at least 2 arguments".to_string(),
                });
            }
            XPathValue::String(args.iter().map(|v| v.to_string()).collect())
        }
        "starts-with" => {
            arity(2..=2, &args)?;
            let (s1, s2) = two_strings(args);
            XPathValue::Boolean(s1.starts_with(&s2))
        }
        "contains" => {
            arity(2..=2, &args)?;
            let (s1, s2) = two_strings(args);
            XPathValue::Boolean(s1.contains(&s2))
        }
        "substring-before" => {
            arity(2..=2, &args)?;
            let (s1, s2) = two_strings(args);
            XPathValue::String(s1.find(&s2).map(|i| s1[..i].to_string()).unwrap_or_default())
        }
        "substring-after" => {
            arity(2..=2, &args)?;
            let (s1, s2) = two_strings(args);
            XPathValue::String(
                s1.find(&s2)
                    .map(|i| s1[i + s2.len()..].to_string())
                    .unwrap_or_default(),
            )
        }
        "substring" => {
            arity(2..=3, &args)?;
            let length = (args.len() == 3).then(|| args.remove(2).to_number());
            let start = args.remove(1).to_number();
            XPathValue::String(substring(&args.remove(0).to_string(), start, length))
        }
        "string-length" => {
            arity(0..=1, &args)?;
            XPathValue::Number(string_or_context(args.pop(), e_ctx).chars().count() as f64)
        }
        "normalize-space" => {
            arity(0..=1, &args)?;
            let s = string_or_context(args.pop(), e_ctx);
            XPathValue::String(s.split_whitespace().collect::<Vec<_>>().join(" "))
        }
        "translate" => {
            arity(3..=3, &args)?;
            let to: Vec<char> = args.remove(2).to_string().chars().collect();
            let from: Vec<char> = args.remove(1).to_string().chars().collect();
            let s = args.remove(0).to_string();
            XPathValue::String(translate(&s, &from, &to))
        }

        // Boolean
        "boolean" => {
            arity(1..=1, &args)?;
            XPathValue::Boolean(args.remove(0).to_bool())
        }
        "not" => {
            arity(1..=1, &args)?;
            XPathValue::Boolean(!args.remove(0).to_bool())
        }
        "true" => {
            arity(0..=0, &args)?;
            XPathValue::Boolean(true)
        }
        "false" => {
            arity(0..=0, &args)?;
            XPathValue::Boolean(false)
        }

        // Number
        "number" => {
            arity(0..=1, &args)?;
            let n = match args.pop() {
                Some(v) => v.to_number(),
                None => XPathValue::<N>::String(e_ctx.context_node.string_value()).to_number(),
            };
            XPathValue::Number(n)
        }
        "sum" => {
            arity(1..=1, &args)?;
            let sum = node_set_arg(name, args.remove(0))?
                .iter()
                .map(|n| XPathValue::<N>::String(n.string_value()).to_number())
                .sum();
            XPathValue::Number(sum)
        }
        "floor" => {
            arity(1..=1, &args)?;
            XPathValue::Number(args.remove(0).to_number().floor())
        }
        "ceiling" => {
            arity(1..=1, &args)?;
            XPathValue::Number(args.remove(0).to_number().ceil())
        }
        "round" => {
            arity(1..=1, &args)?;
            XPathValue::Number(round(args.remove(0).to_number()))
        }

        _ => {
            return Err(XPathError::FunctionError {
                function: name.to_string(),
                message: "Unknown XPath function".to_string(),
            });
        }
    };
    Ok(value)
}

fn describe_arity(range: &RangeInclusive<usize>) -> String {
    if range.start() == range.end() {
        range.start().to_string()
    } else {
        format!("{} to {}", range.start(), range.end())
    }
}

fn node_set_arg<'a, N: DataSourceNode<'a>>(
    function: &str,
    value: XPathValue<N>,
) -> Result<Vec<N>, XPathError> {
    match value {
        XPathValue::NodeSet(nodes) => Ok(nodes),
        other => Err(XPathError::TypeError(format!(
            "{}() argument must be a node-set, got {}",
            function,
            other.type_name()
        ))),
    }
}

/// The first node of the argument in document order, or the context node when
/// the argument is omitted.
fn node_or_context<'a, 'd, N: DataSourceNode<'a>>(
    function: &str,
    arg: Option<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, 'd, N>,
) -> Result<Option<N>, XPathError> {
    match arg {
        None => Ok(Some(e_ctx.context_node)),
        Some(value) => Ok(node_set_arg(function, value)?.into_iter().min()),
    }
}

fn string_or_context<'a, 'd, N: DataSourceNode<'a>>(
    arg: Option<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, 'd, N>,
) -> String {
    match arg {
        Some(value) => value.to_string(),
        None => e_ctx.context_node.string_value(),
    }
}

fn two_strings<'a, N: DataSourceNode<'a>>(mut args: Vec<XPathValue<N>>) -> (String, String) {
    let second = args.remove(1).to_string();
    let first = args.remove(0).to_string();
    (first, second)
}

/// XPath 1.0 `substring()`: 1-based, rounded positions; NaN bounds select nothing.
fn substring(s: &str, start: f64, length: Option<f64>) -> String {
    let first = round(start);
    let last = match length {
        Some(l) => first + round(l),
        None => f64::INFINITY,
    };
    s.chars()
        .enumerate()
        .filter(|(i, _)| {
            let pos = (i + 1) as f64;
            pos >= first && pos < last
        })
        .map(|(_, c)| c)
        .collect()
}

fn translate(s: &str, from: &[char], to: &[char]) -> String {
    s.chars()
        .filter_map(|c| match from.iter().position(|&f| f == c) {
            Some(i) => to.get(i).copied(),
            None => Some(c),
        })
        .collect()
}

/// Rounds halves towards positive infinity, as XPath requires.
fn round(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() || n == 0.0 {
        n
    } else {
        (n + 0.5).floor()
    }
}
