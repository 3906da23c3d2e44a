//! Prefix → namespace URI bindings used when resolving qualified name tests.
//!
//! Prefixes in an expression are the caller's, not the document's: `a:entry`
//! matches an `entry` element in whatever namespace `a` is bound to here, no
//! matter which prefix (if any) the document itself uses.

use crate::error::XPathError;
use std::collections::BTreeMap;

/// The URI permanently bound to the `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceContext {
    bindings: BTreeMap<String, String>,
}

impl NamespaceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `prefix` to `uri`, replacing any earlier binding of the prefix.
    pub fn bind(&mut self, prefix: impl Into<String>, uri: impl Into<String>) -> &mut Self {
        self.bindings.insert(prefix.into(), uri.into());
        self
    }

    pub fn with(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.bind(prefix, uri);
        self
    }

    pub fn uri(&self, prefix: &str) -> Option<&str> {
        match self.bindings.get(prefix) {
            Some(uri) => Some(uri.as_str()),
            None if prefix == "xml" => Some(XML_NAMESPACE),
            None => None,
        }
    }

    pub fn resolve(&self, prefix: &str) -> Result<&str, XPathError> {
        self.uri(prefix).ok_or_else(|| XPathError::UnresolvedPrefix {
            prefix: prefix.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NamespaceContext {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut ctx = NamespaceContext::new();
        for (prefix, uri) in iter {
            ctx.bind(prefix, uri);
        }
        ctx
    }
}
