use crate::builtins::{xs_type, XS_DECIMAL, XS_STRING};
use crate::error::EmissionError;
use crate::model::{Literal, Property, Simple, TypeVariant};
use crate::tag::Tag;

/// Emits one non-`children` property of `element` as an attribute declaration.
pub fn attribute(element: &str, property: &Property) -> Result<Tag, EmissionError> {
    let name = property
        .name
        .as_deref()
        .ok_or_else(|| EmissionError::UnnamedAttribute {
            element: element.to_string(),
        })?;

    let mut simple: Vec<Simple> = Vec::new();
    let mut literals: Vec<&Literal> = Vec::new();
    for variant in &property.types {
        match variant {
            TypeVariant::Reference { .. } => {
                return Err(EmissionError::AttributeReference {
                    element: element.to_string(),
                    attribute: name.to_string(),
                })
            }
            TypeVariant::Restricted { value } => literals.extend(value),
            TypeVariant::Simple(s) => simple.push(*s),
        }
    }

    let mut tag = Tag::new("attribute").with_attr("name", name);
    match (simple.as_slice(), literals.is_empty()) {
        ([], false) => tag.add(enumeration(&literals)),
        ([single], true) => tag.set_attr("type", xs_type(*single)),
        ([], true) => {
            return Err(EmissionError::MissingType {
                element: element.to_string(),
                attribute: name.to_string(),
            })
        }
        (_, false) => {
            return Err(EmissionError::NotImplemented(format!(
                "attribute {element}.{name} mixing literal values and simple types"
            )))
        }
        (_, true) => {
            return Err(EmissionError::NotImplemented(format!(
                "attribute {element}.{name} with more than one simple type"
            )))
        }
    }
    if property.mandatory {
        tag.set_attr("use", "required");
    }
    Ok(tag)
}

/// `simpleType` restricting its base to the given literals.
fn enumeration(literals: &[&Literal]) -> Tag {
    let base = if literals.iter().all(|l| l.is_number()) {
        XS_DECIMAL
    } else {
        XS_STRING
    };
    let restriction = Tag::new("restriction").with_attr("base", base).with_children(
        literals
            .iter()
            .map(|literal| Tag::new("enumeration").with_attr("value", literal.to_string())),
    );
    Tag::new("simpleType").with_child(restriction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn property(name: Option<&str>, mandatory: bool, types: Vec<TypeVariant>) -> Property {
        Property {
            name: name.map(str::to_string),
            mandatory,
            types,
            multiple: false,
        }
    }

    #[test]
    fn simple_attribute() {
        let tag = attribute(
            "Point",
            &property(Some("x"), true, vec![Simple::Number.into()]),
        )
        .unwrap();
        assert_eq!(
            tag.to_string(),
            r#"<xs:attribute name="x" type="xs:decimal" use="required"/>"#
        );
    }

    #[test]
    fn optional_attribute_has_no_use() {
        let tag = attribute(
            "Point",
            &property(Some("label"), false, vec![Simple::String.into()]),
        )
        .unwrap();
        assert_eq!(tag.attr("use"), None);
    }

    #[test]
    fn restricted_attribute_is_an_enumeration() {
        let types = vec![TypeVariant::restricted([Literal::from("a"), Literal::from("b")])];
        let tag = attribute("Point", &property(Some("label"), false, types)).unwrap();
        assert_eq!(
            tag.to_string(),
            [
                r#"<xs:attribute name="label">"#,
                r#"  <xs:simpleType>"#,
                r#"    <xs:restriction base="xs:string">"#,
                r#"      <xs:enumeration value="a"/>"#,
                r#"      <xs:enumeration value="b"/>"#,
                r#"    </xs:restriction>"#,
                r#"  </xs:simpleType>"#,
                r#"</xs:attribute>"#,
            ]
            .join("\n")
        );
    }

    #[test]
    fn numeric_enumeration_uses_decimal() {
        let types = vec![TypeVariant::restricted([Literal::Number(1.0), Literal::Number(2.5)])];
        let tag = attribute("Level", &property(Some("value"), true, types)).unwrap();
        let restriction = tag.children().next().unwrap().children().next().unwrap();
        assert_eq!(restriction.attr("base"), Some("xs:decimal"));
        let values: Vec<_> = restriction.children().filter_map(|t| t.attr("value")).collect();
        assert_eq!(values, vec!["1", "2.5"]);
        assert_eq!(tag.attr("use"), Some("required"));
    }

    #[rstest]
    #[case(
        property(Some("owner"), true, vec![TypeVariant::reference("User")]),
        EmissionError::AttributeReference { element: "E".into(), attribute: "owner".into() }
    )]
    #[case(
        property(Some("empty"), true, vec![]),
        EmissionError::MissingType { element: "E".into(), attribute: "empty".into() }
    )]
    #[case(
        property(None, true, vec![Simple::String.into()]),
        EmissionError::UnnamedAttribute { element: "E".into() }
    )]
    #[case(
        property(Some("both"), true, vec![Simple::Null.into(), TypeVariant::restricted([Literal::from("a")])]),
        EmissionError::NotImplemented("attribute E.both mixing literal values and simple types".into())
    )]
    #[case(
        property(Some("many"), true, vec![Simple::String.into(), Simple::Null.into()]),
        EmissionError::NotImplemented("attribute E.many with more than one simple type".into())
    )]
    fn rejected_attributes(#[case] property: Property, #[case] expected: EmissionError) {
        assert_eq!(attribute("E", &property), Err(expected));
    }
}
