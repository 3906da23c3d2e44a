//! Lifts plain conversion functions into parsers.
//!
//! A converter never sees the tree. [`TextConverter`] hands it the string
//! value of the context node (an element's concatenated text, an attribute's
//! value, a text node's content); [`NodeConverter`] hands it the node itself.
//! Whatever the function returns is run through `serde_json::to_value`, so a
//! number lands as a JSON number, a tuple or `Vec` as an array, and a
//! `Value` as itself.

use crate::error::UnXmlError;
use crate::parser::Parser;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::marker::PhantomData;
use unxml_source::XmlNode;
use unxml_xpath1::DataSourceNode;

type BoxError = Box<dyn Error + Send + Sync>;

pub struct TextConverter<F, T, E> {
    f: F,
    _marker: PhantomData<fn() -> (T, E)>,
}

impl<F, T, E> TextConverter<F, T, E>
where
    F: Fn(&str) -> Result<T, E> + Send + Sync,
    T: Serialize,
    E: Into<BoxError>,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<F, T, E> Parser for TextConverter<F, T, E>
where
    F: Fn(&str) -> Result<T, E> + Send + Sync,
    T: Serialize,
    E: Into<BoxError>,
{
    fn apply(&self, node: XmlNode<'_>) -> Result<Value, UnXmlError> {
        let text = node.string_value();
        match (self.f)(&text) {
            Ok(converted) => Ok(serde_json::to_value(converted)?),
            Err(e) => Err(UnXmlError::conversion(text, e)),
        }
    }
}

impl<F, T, E> fmt::Debug for TextConverter<F, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TextConverter")
    }
}

pub struct NodeConverter<F, T, E> {
    f: F,
    _marker: PhantomData<fn() -> (T, E)>,
}

impl<F, T, E> NodeConverter<F, T, E>
where
    F: Fn(XmlNode<'_>) -> Result<T, E> + Send + Sync,
    T: Serialize,
    E: Into<BoxError>,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<F, T, E> Parser for NodeConverter<F, T, E>
where
    F: Fn(XmlNode<'_>) -> Result<T, E> + Send + Sync,
    T: Serialize,
    E: Into<BoxError>,
{
    fn apply(&self, node: XmlNode<'_>) -> Result<Value, UnXmlError> {
        match (self.f)(node) {
            Ok(converted) => Ok(serde_json::to_value(converted)?),
            Err(e) => Err(UnXmlError::conversion(node.string_value(), e)),
        }
    }
}

impl<F, T, E> fmt::Debug for NodeConverter<F, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NodeConverter")
    }
}
