use crate::error::UnXmlError;
use unxml_source::XmlNode;
use unxml_xpath1::{NamespaceContext, XPath, XPathError};

/// A path compiled when a binding is declared. A compile error is kept and
/// surfaces on the first `select`, the same way an unbound prefix does.
#[derive(Debug, Clone)]
pub(crate) struct PathExpr {
    source: String,
    compiled: Result<XPath, XPathError>,
}

impl PathExpr {
    pub(crate) fn new(source: &str) -> Self {
        let compiled = XPath::compile(source);
        if let Err(e) = &compiled {
            log::debug!("Deferring XPath error for '{}': {}", source, e);
        }
        Self {
            source: source.to_string(),
            compiled,
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.source
    }

    pub(crate) fn select<'a>(
        &self,
        node: XmlNode<'a>,
        namespaces: &NamespaceContext,
    ) -> Result<Vec<XmlNode<'a>>, UnXmlError> {
        let path_error = |source| UnXmlError::Path {
            expression: self.source.clone(),
            source,
        };
        let xpath = self.compiled.as_ref().map_err(|e| path_error(e.clone()))?;
        xpath.select(node, namespaces).map_err(path_error)
    }
}
