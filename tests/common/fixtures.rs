use std::path::PathBuf;
use unxml::{NamespaceContext, Parsing};

pub const ATOM: &str = "http://www.w3.org/2005/Atom";
pub const APP: &str = "http://www.w3.org/2007/app";

/// Path of a file under `tests/xml`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("xml").join(name)
}

/// A facade with the Atom feed prefixes `a` and `app` bound.
pub fn feed_parsing() -> Parsing {
    Parsing::new(NamespaceContext::new().with("a", ATOM).with("app", APP))
}
