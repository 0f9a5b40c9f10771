//! Global element declarations, one per extracted [`Element`].

use tracing::trace;

use crate::attribute_decl::attribute;
use crate::builtins::{xs_type, XS_STRING};
use crate::error::EmissionError;
use crate::model::{Element, Property, Simple, TypeVariant};
use crate::particle::model_group;
use crate::tag::{Content, Tag};

/// Content an element allows, after the content type varieties of XSD.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ContentTypeVariety<'a> {
    /// No properties at all: present, but always empty.
    Empty,
    /// A `children` property with exactly one simple type. Text content has no occurrence
    /// bounds, so `multiple` is not carried here: `children: string[]` emits the same
    /// declaration as `children: string`.
    Simple(Simple),
    /// Child elements only. `None` when there is no `children` property, leaving attributes only.
    ElementOnly(Option<&'a Property>),
    /// Child elements interleaved with text.
    Mixed(&'a Property),
}

/// Whether an element carries attributes next to its content.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Attribution {
    Bare,
    Attributed,
}

pub fn content_type(element: &Element) -> ContentTypeVariety<'_> {
    if element.properties.is_empty() {
        return ContentTypeVariety::Empty;
    }
    let Some(children) = element.children() else {
        return ContentTypeVariety::ElementOnly(None);
    };
    match children.types.as_slice() {
        [TypeVariant::Simple(simple)] => ContentTypeVariety::Simple(*simple),
        types if types.contains(&TypeVariant::Simple(Simple::String)) => {
            ContentTypeVariety::Mixed(children)
        }
        _ => ContentTypeVariety::ElementOnly(Some(children)),
    }
}

pub fn attribution(element: &Element) -> Attribution {
    if element.attributes().next().is_some() {
        Attribution::Attributed
    } else {
        Attribution::Bare
    }
}

pub fn element_declaration(element: &Element) -> Result<Tag, EmissionError> {
    let content_type = content_type(element);
    let attribution = attribution(element);
    trace!(name = %element.name, ?content_type, ?attribution, "element");

    let declaration = Tag::new("element").with_attr("name", &element.name);
    let tag = match (content_type, attribution) {
        (ContentTypeVariety::Empty, _) => {
            let restriction = Tag::new("restriction")
                .with_attr("base", XS_STRING)
                .with_child(Tag::new("length").with_attr("value", "0"));
            Tag::nest([declaration, Tag::new("simpleType")], restriction)
        }
        (ContentTypeVariety::Simple(simple), Attribution::Bare) => {
            declaration.with_attr("type", xs_type(simple))
        }
        // xs:anyType is complex and cannot be the base of simple content
        (ContentTypeVariety::Simple(Simple::Any), Attribution::Attributed) => {
            return Err(EmissionError::NotImplemented(format!(
                "{}: attributes next to `any` content",
                element.name
            )));
        }
        (ContentTypeVariety::Simple(simple), Attribution::Attributed) => {
            let extension = Tag::new("extension")
                .with_attr("base", xs_type(simple))
                .with_children(attributes(element)?);
            Tag::nest(
                [declaration, Tag::new("complexType"), Tag::new("simpleContent")],
                extension,
            )
        }
        (ContentTypeVariety::ElementOnly(_), _) => {
            declaration.with_child(complex_type(element, false)?)
        }
        (ContentTypeVariety::Mixed(_), _) => {
            let complex = complex_type(element, true)?.with_attr("mixed", "true");
            declaration.with_child(complex)
        }
    };
    Ok(tag)
}

fn attributes(element: &Element) -> Result<Vec<Tag>, EmissionError> {
    element
        .attributes()
        .map(|property| attribute(&element.name, property))
        .collect()
}

/// Properties in declaration order, then particles moved before attributes.
fn complex_type(element: &Element, mixed: bool) -> Result<Tag, EmissionError> {
    let mut complex = Tag::new("complexType");
    for property in &element.properties {
        if property.is_children() {
            if let Some(group) = model_group(&element.name, property, mixed)? {
                complex.add(group);
            }
        } else {
            complex.add(attribute(&element.name, property)?);
        }
    }
    complex.sort_children_by_key(content_rank);
    Ok(complex)
}

/// Schema grammar order inside a complex type: model groups, then attribute declarations.
fn content_rank(content: &Content) -> u8 {
    match content {
        Content::Tag(tag) => match tag.name() {
            "sequence" | "choice" | "all" | "group" => 0,
            "attribute" | "attributeGroup" => 1,
            _ => 2,
        },
        Content::Text(_) => 2,
    }
}
