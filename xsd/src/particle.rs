//! Model groups for the `children` property of an element.

use std::fmt;

use tracing::debug;

use crate::error::EmissionError;
use crate::model::{Property, Simple, TypeVariant};
use crate::tag::Tag;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Compositor {
    All,
    Choice,
    Sequence,
}

impl Compositor {
    pub fn tag_name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Choice => "choice",
            Self::Sequence => "sequence",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MaxOccurs {
    Unbounded,
    Count(u64),
}

impl fmt::Display for MaxOccurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => f.write_str("unbounded"),
            Self::Count(count) => write!(f, "{count}"),
        }
    }
}

/// Occurrence bounds of a particle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Occurs {
    pub min: u64,
    pub max: MaxOccurs,
}

impl Occurs {
    pub fn of(property: &Property) -> Self {
        Self {
            min: if property.mandatory { 1 } else { 0 },
            max: if property.multiple {
                MaxOccurs::Unbounded
            } else {
                MaxOccurs::Count(1)
            },
        }
    }

    fn apply(self, tag: Tag) -> Tag {
        tag.with_attr("minOccurs", self.min.to_string())
            .with_attr("maxOccurs", self.max.to_string())
    }
}

/// Builds the model group for `children`. With `mixed`, plain string variants are carried by
/// the mixed flag of the enclosing type and skipped here.
///
/// Returns `None` when nothing is left to put in a group.
pub fn model_group(
    element: &str,
    children: &Property,
    mixed: bool,
) -> Result<Option<Tag>, EmissionError> {
    let mut references = Vec::new();
    for variant in &children.types {
        match variant {
            TypeVariant::Reference { reference } => references.push(reference.as_str()),
            TypeVariant::Simple(Simple::String) if mixed => {}
            TypeVariant::Simple(simple) => {
                return Err(EmissionError::NotImplemented(format!(
                    "{element}.children mixing {simple} with elements"
                )))
            }
            TypeVariant::Restricted { .. } => {
                return Err(EmissionError::NotImplemented(format!(
                    "{element}.children restricted to literal values"
                )))
            }
        }
    }

    let occurs = Occurs::of(children);
    let group = match references.as_slice() {
        [] => return Ok(None),
        [reference] => {
            // the bounds belong to the single element
            let particle = occurs.apply(reference_element(reference));
            Tag::new(Compositor::Sequence.tag_name()).with_child(particle)
        }
        references => occurs
            .apply(Tag::new(Compositor::Choice.tag_name()))
            .with_children(references.iter().map(|r| reference_element(r))),
    };
    debug!(element, references = references.len(), "model group");
    Ok(Some(group))
}

fn reference_element(reference: &str) -> Tag {
    Tag::new("element").with_attr("ref", reference)
}
