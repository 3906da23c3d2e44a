use crate::error::UnXmlError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use unxml_source::XmlLoader;
use unxml_xpath1::NamespaceContext;

/// Namespace bindings and document limits, loadable from JSON:
///
/// ```json
/// {
///   "namespaces": { "a": "http://www.w3.org/2005/Atom" },
///   "nodesLimit": 100000
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnXmlConfig {
    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub namespaces: BTreeMap<String, String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_limit: Option<u32>,
}

impl UnXmlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, UnXmlError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, UnXmlError> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {}", path.display());
        let json = std::fs::read_to_string(path).map_err(|source| unxml_source::SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }

    pub fn with_nodes_limit(mut self, nodes_limit: u32) -> Self {
        self.nodes_limit = Some(nodes_limit);
        self
    }

    /// Rejects empty or malformed prefixes, empty URIs and a zero node limit.
    pub fn validate(&self) -> Result<(), UnXmlError> {
        for (prefix, uri) in &self.namespaces {
            let well_formed = prefix
                .chars()
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_')
                && prefix
                    .chars()
                    .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
            if !well_formed {
                return Err(UnXmlError::Config(format!("Invalid namespace prefix '{}'", prefix)));
            }
            if uri.is_empty() {
                return Err(UnXmlError::Config(format!("Namespace prefix '{}' is bound to an empty URI", prefix)));
            }
        }
        if self.nodes_limit == Some(0) {
            return Err(UnXmlError::Config("nodesLimit must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn namespace_context(&self) -> NamespaceContext {
        self.namespaces.iter().map(|(p, u)| (p.as_str(), u.as_str())).collect()
    }

    pub fn loader(&self) -> XmlLoader {
        match self.nodes_limit {
            Some(limit) => XmlLoader::new().with_nodes_limit(limit),
            None => XmlLoader::new(),
        }
    }
}
