use thiserror::Error;
use unxml_source::SourceError;
use unxml_xpath1::XPathError;

/// Everything that can go wrong while loading a document or applying a parser.
#[derive(Error, Debug)]
pub enum UnXmlError {
    /// A path that does not compile, uses an unbound prefix or does not
    /// select nodes. Reported on first use, naming the expression.
    #[error("XPath error in '{expression}': {source}")]
    Path {
        expression: String,
        #[source]
        source: XPathError,
    },

    #[error("Failed to convert '{input}': {source}")]
    Conversion {
        input: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document error: {0}")]
    Source(#[from] SourceError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl UnXmlError {
    pub(crate) fn conversion(
        input: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        UnXmlError::Conversion {
            input: input.into(),
            source: source.into(),
        }
    }
}
