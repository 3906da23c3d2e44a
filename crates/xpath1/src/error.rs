use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum XPathError {
    #[error("XPath parse error in '{0}': {1}")]
    XPathParse(String, String),

    #[error("Namespace prefix '{prefix}' is not bound")]
    UnresolvedPrefix { prefix: String },

    #[error("Function '{function}' error: {message}")]
    FunctionError { function: String, message: String },

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Expression does not select nodes, it evaluates to {0}")]
    NotANodeSet(String),
}
