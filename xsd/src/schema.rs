use std::collections::HashSet;

use tracing::{debug, warn};

use crate::builtins::{XS_NAMESPACE, XS_PREFIX};
use crate::element_decl::element_declaration;
use crate::error::EmissionError;
use crate::model::{Element, TypeVariant};
use crate::tag::Tag;

/// Builds the `schema` root holding one global element per input element, in order.
///
/// Any element without an XSD projection fails the whole schema.
pub fn build_schema(elements: &[Element]) -> Result<Tag, EmissionError> {
    warn_dangling_references(elements);

    let mut schema = Tag::new("schema").with_attr(format!("xmlns:{XS_PREFIX}"), XS_NAMESPACE);
    for element in elements {
        schema.add(element_declaration(element)?);
    }
    debug!(elements = elements.len(), "schema built");
    Ok(schema)
}

/// References are emitted as they are; only log the ones no element declares.
fn warn_dangling_references(elements: &[Element]) {
    let declared: HashSet<&str> = elements.iter().map(|e| e.name.as_str()).collect();
    for element in elements {
        let references = element
            .properties
            .iter()
            .flat_map(|p| &p.types)
            .filter_map(|variant| match variant {
                TypeVariant::Reference { reference } => Some(reference.as_str()),
                _ => None,
            });
        for reference in references {
            if !declared.contains(reference) {
                warn!(element = %element.name, reference, "reference to undeclared element");
            }
        }
    }
}
