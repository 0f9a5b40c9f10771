use std::fmt;

use thiserror::Error;
use tsd_syntax::{ParseError, SyntaxKind};

/// Reasons a declaration is dropped during extraction.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ExtractError {
    /// The declaration lacks something every element needs, e.g. a name.
    #[error("{0}")]
    Structural(String),
    #[error("{0} not supported")]
    UnsupportedKind(SyntaxKind),
    #[error("type `{0}` not supported")]
    UnsupportedType(String),
    #[error("{0} not implemented")]
    NotImplementedKind(SyntaxKind),
    #[error("{0} not implemented")]
    NotImplemented(&'static str),
    #[error("syntax error: {0}")]
    Syntax(#[from] ParseError),
}

/// A recoverable extraction failure. The named declaration is absent from the result.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub declaration: Option<String>,
    pub error: ExtractError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.declaration {
            Some(name) => write!(f, "{name}: {}", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

/// An element or property shape with no XSD projection. Aborts the whole emission.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EmissionError {
    #[error("attribute cannot have references: {element}.{attribute}")]
    AttributeReference { element: String, attribute: String },
    #[error("attribute must have a type: {element}.{attribute}")]
    MissingType { element: String, attribute: String },
    #[error("attribute must have a name: {element}")]
    UnnamedAttribute { element: String },
    #[error("not implemented yet: {0}")]
    NotImplemented(String),
}
