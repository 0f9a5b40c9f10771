//! Converts TypeScript interface and class declarations into an XML Schema.
//!
//! The pipeline runs in two stages. [`extract`] walks the declarations of a source text and
//! builds the [`Element`] model, dropping (and reporting) declarations it cannot map.
//! [`build_schema`] turns the model into a [`Tag`] tree rooted at `xs:schema`, failing as a
//! whole on any shape without an XSD projection.

pub mod attribute_decl;
pub mod builtins;
pub mod element_decl;
pub mod error;
pub mod extract;
pub mod model;
pub mod particle;
pub mod schema;
pub mod tag;

pub use element_decl::{Attribution, ContentTypeVariety};
pub use error::{Diagnostic, EmissionError, ExtractError};
pub use extract::{extract, extract_with, resolve_type, ExtractOptions, Extraction, Resolved};
pub use model::{Element, Literal, Property, Simple, TypeVariant, CHILDREN};
pub use schema::build_schema;
pub use tag::{Content, RenderOptions, Tag};
pub use tsd_syntax::SyntaxKind;

/// Result of [`convert`]: the schema, the model it was built from and the dropped declarations.
#[derive(Clone, Debug)]
pub struct Conversion {
    pub schema: Tag,
    pub elements: Vec<Element>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs extraction and emission on `source`.
pub fn convert(source: &str, options: &ExtractOptions) -> Result<Conversion, EmissionError> {
    let Extraction {
        elements,
        diagnostics,
    } = extract_with(source, options);
    let schema = build_schema(&elements)?;
    Ok(Conversion {
        schema,
        elements,
        diagnostics,
    })
}
