//! Ready-made parsers for the values most mappings need.

use crate::array::ArrayParserBuilder;
use crate::converter::TextConverter;
use crate::error::UnXmlError;
use crate::lazy::LazyParser;
use crate::object::ObjectParserBuilder;
use crate::parser::{FnParser, ParserRef};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use unxml_source::XmlNode;
use unxml_xpath1::NamespaceContext;

/// Key under which [`SimpleParsers::node_tree_parser`] stores the node name.
pub const NODE_TYPE_KEY: &str = "nodeType";
/// Key under which [`SimpleParsers::node_tree_parser`] stores the child nodes.
pub const CHILDREN_KEY: &str = "children";

#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleParsers;

impl SimpleParsers {
    pub fn new() -> Self {
        Self
    }

    /// The string value of the node.
    pub fn text_parser(&self) -> ParserRef {
        Arc::new(TextConverter::new(|s: &str| Ok::<_, Infallible>(s.to_string())))
    }

    /// The string value with surrounding whitespace removed.
    pub fn trimmed_text_parser(&self) -> ParserRef {
        Arc::new(TextConverter::new(|s: &str| Ok::<_, Infallible>(s.trim().to_string())))
    }

    /// `prefix:local` for elements and attributes, the target of a processing
    /// instruction, otherwise `#text`, `#comment` or `#document`.
    pub fn node_name_parser(&self) -> ParserRef {
        Arc::new(FnParser::new(|node: XmlNode<'_>| Ok(Value::String(node.node_name()))))
    }

    pub fn local_name_parser(&self) -> ParserRef {
        Arc::new(FnParser::new(|node: XmlNode<'_>| {
            Ok(Value::String(node.local_name().to_string()))
        }))
    }

    pub fn integer_parser(&self) -> ParserRef {
        Arc::new(TextConverter::new(|s: &str| s.trim().parse::<i64>()))
    }

    pub fn number_parser(&self) -> ParserRef {
        Arc::new(TextConverter::new(|s: &str| s.trim().parse::<f64>()))
    }

    /// Accepts the XML Schema lexical forms `true`, `false`, `1` and `0`.
    pub fn boolean_parser(&self) -> ParserRef {
        Arc::new(TextConverter::new(|s: &str| match s.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err("expected one of true, false, 1, 0"),
        }))
    }

    /// Parses a date into `[year, month, day]`.
    ///
    /// `pattern` is either a chrono format string such as `%Y-%m-%d` or a
    /// letter pattern such as `yyyy-MM-dd`.
    pub fn date_parser(&self, pattern: &str) -> Result<ParserRef, UnXmlError> {
        let format = date_format(pattern)?;
        Ok(Arc::new(TextConverter::new(move |s: &str| {
            NaiveDate::parse_from_str(s.trim(), &format)
                .map(|date| [date.year(), date.month() as i32, date.day() as i32])
        })))
    }

    /// Parses a date and time into `[year, month, day, hour, minute, second]`.
    pub fn date_time_parser(&self, pattern: &str) -> Result<ParserRef, UnXmlError> {
        let format = date_format(pattern)?;
        Ok(Arc::new(TextConverter::new(move |s: &str| {
            NaiveDateTime::parse_from_str(s.trim(), &format).map(|dt| {
                [
                    dt.year(),
                    dt.month() as i32,
                    dt.day() as i32,
                    dt.hour() as i32,
                    dt.minute() as i32,
                    dt.second() as i32,
                ]
            })
        })))
    }

    /// Flattens any subtree into `{"nodeType": name, "children": [...]}`,
    /// recursing over `node()` until a node has no children.
    pub fn node_tree_parser(&self) -> ParserRef {
        node_tree()
    }
}

fn node_tree() -> ParserRef {
    let namespaces = Arc::new(NamespaceContext::new());
    let children = ArrayParserBuilder::new(namespaces.clone(), "node()", LazyParser::new(node_tree));
    let parser = ObjectParserBuilder::new(namespaces)
        .attribute_from(NODE_TYPE_KEY, SimpleParsers.node_name_parser())
        .attribute_from(CHILDREN_KEY, children)
        .build();
    Arc::new(parser)
}

/// Turns a letter pattern into a chrono format string. Patterns that already
/// contain `%` are taken as chrono format strings.
fn date_format(pattern: &str) -> Result<String, UnXmlError> {
    if pattern.contains('%') {
        return Ok(pattern.to_string());
    }

    let mut format = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            // Quoted literal; `''` is a single quote.
            if chars.peek() == Some(&'\'') {
                chars.next();
                format.push('\'');
                continue;
            }
            loop {
                match chars.next() {
                    Some('\'') => break,
                    Some(literal) => format.push(literal),
                    None => {
                        return Err(UnXmlError::Config(format!(
                            "Unterminated quote in date pattern '{}'",
                            pattern
                        )));
                    }
                }
            }
            continue;
        }
        if !c.is_ascii_alphabetic() {
            format.push(c);
            continue;
        }

        let mut width = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            width += 1;
        }
        let spec = match (c, width) {
            ('y' | 'u', 2) => "%y",
            ('y' | 'u', _) => "%Y",
            ('M', 1 | 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', 1 | 2) => "%d",
            ('D', _) => "%j",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            ('H', _) => "%H",
            ('h', _) => "%I",
            ('m', _) => "%M",
            ('s', _) => "%S",
            ('S', 3) => "%3f",
            ('S', 6) => "%6f",
            ('S', 9) => "%9f",
            ('a', _) => "%p",
            _ => {
                return Err(UnXmlError::Config(format!(
                    "Unsupported field '{}' in date pattern '{}'",
                    c.to_string().repeat(width),
                    pattern
                )));
            }
        };
        format.push_str(spec);
    }
    log::debug!("Translated date pattern '{}' to '{}'", pattern, format);
    Ok(format)
}
