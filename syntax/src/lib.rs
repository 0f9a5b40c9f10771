//! Declaration-level syntax tree for TypeScript sources.
//!
//! [`parse`] turns source text into a tree of [`Node`]s whose kinds are drawn from the closed
//! [`SyntaxKind`] vocabulary. Nodes expose their direct children, optional identifier or literal
//! text, and the documentation tags attached to declarations.

pub mod kind;
pub mod lexer;
pub mod node;
pub mod parser;

pub use kind::SyntaxKind;
pub use node::{DocTag, Node};
pub use parser::{parse, Parse, ParseError};
