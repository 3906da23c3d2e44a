//! Loads XML text into a read-only tree that `unxml-xpath1` can query.
//!
//! Parsing is delegated to `roxmltree`. Document type declarations are always
//! rejected, so there is no entity expansion and no external resource is ever
//! fetched. A node limit bounds the memory a single document may take.

mod node;

pub use node::{XmlDocument, XmlNode};

use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("XML parsing error (roxmltree): {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reads and parses XML documents with a fixed set of safety options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlLoader {
    nodes_limit: u32,
}

impl Default for XmlLoader {
    fn default() -> Self {
        Self {
            nodes_limit: u32::MAX,
        }
    }
}

impl XmlLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of nodes a document may contain.
    pub fn with_nodes_limit(mut self, nodes_limit: u32) -> Self {
        self.nodes_limit = nodes_limit;
        self
    }

    pub fn nodes_limit(&self) -> u32 {
        self.nodes_limit
    }

    /// Parses `text` into a document that borrows from it.
    pub fn parse<'input>(&self, text: &'input str) -> Result<XmlDocument<'input>, SourceError> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: false,
            nodes_limit: self.nodes_limit,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(text, options)?;
        log::debug!("Parsed XML document with {} nodes", doc.descendants().count());
        Ok(XmlDocument::new(doc))
    }

    /// Reads a whole file into memory. Parse the returned text with [`XmlLoader::parse`].
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<String, SourceError> {
        let path = path.as_ref();
        log::debug!("Reading XML from {}", path.display());
        std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Drains a reader into memory, e.g. standard input.
    pub fn read(&self, mut reader: impl Read) -> Result<String, SourceError> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|source| SourceError::Io {
                path: PathBuf::from("<stream>"),
                source,
            })?;
        Ok(text)
    }
}
