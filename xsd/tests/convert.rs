use roxmltree::Document;
use rstest::rstest;
use serde_json::json;
use tsd_xsd::builtins::XS_NAMESPACE;
use tsd_xsd::{
    convert, extract, Conversion, Element, ExtractError, ExtractOptions, RenderOptions, SyntaxKind,
};

const DOCUMENT: &str = include_str!("fixtures/document.ts");

fn convert_default(source: &str) -> Conversion {
    convert(source, &ExtractOptions::default()).expect("conversion failed")
}

fn xs<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> + 'a {
    node.children().filter(move |n| {
        n.is_element() && n.tag_name().namespace() == Some(XS_NAMESPACE) && n.tag_name().name() == name
    })
}

fn global_element<'a, 'input>(
    document: &'a Document<'input>,
    name: &str,
) -> roxmltree::Node<'a, 'input> {
    xs(document.root_element(), "element")
        .find(|n| n.attribute("name") == Some(name))
        .unwrap_or_else(|| panic!("no element {name}"))
}

#[test]
fn point_end_to_end() {
    let conversion = convert_default("interface Point { x: number; y: number }");
    assert_eq!(
        serde_json::to_value(&conversion.elements).unwrap(),
        json!([{
            "name": "Point",
            "properties": [
                { "name": "x", "mandatory": true, "types": ["number"] },
                { "name": "y", "mandatory": true, "types": ["number"] }
            ]
        }])
    );
    assert_eq!(
        conversion.schema.to_string(),
        [
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">"#,
            r#"  <xs:element name="Point">"#,
            r#"    <xs:complexType>"#,
            r#"      <xs:attribute name="x" type="xs:decimal" use="required"/>"#,
            r#"      <xs:attribute name="y" type="xs:decimal" use="required"/>"#,
            r#"    </xs:complexType>"#,
            r#"  </xs:element>"#,
            r#"</xs:schema>"#,
        ]
        .join("\n")
    );
}

#[test]
fn optional_literal_union_end_to_end() {
    let conversion = convert_default(r#"interface Labeled { label?: "a" | "b" }"#);
    assert_eq!(
        serde_json::to_value(&conversion.elements[0].properties[0]).unwrap(),
        json!({ "name": "label", "mandatory": false, "types": [{ "value": ["a", "b"] }] })
    );

    let text = conversion.schema.to_string();
    let document = Document::parse(&text).unwrap();
    let element = global_element(&document, "Labeled");
    let complex = xs(element, "complexType").next().unwrap();
    let attribute = xs(complex, "attribute").next().unwrap();
    assert_eq!(attribute.attribute("name"), Some("label"));
    assert_eq!(attribute.attribute("use"), None);

    let restriction = xs(xs(attribute, "simpleType").next().unwrap(), "restriction")
        .next()
        .unwrap();
    let values: Vec<_> = xs(restriction, "enumeration")
        .filter_map(|n| n.attribute("value"))
        .collect();
    assert_eq!(values, vec!["a", "b"]);
}

#[test]
fn fixture_declarations_in_order() {
    let conversion = convert_default(DOCUMENT);
    let names: Vec<_> = conversion.elements.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Document", "Section", "Paragraph", "Emphasis", "Figure", "Break"]
    );

    assert_eq!(conversion.diagnostics.len(), 1);
    let diagnostic = &conversion.diagnostics[0];
    assert_eq!(diagnostic.declaration.as_deref(), Some("Table"));
    assert_eq!(
        diagnostic.error,
        ExtractError::NotImplementedKind(SyntaxKind::TupleType)
    );
}

#[test]
fn fixture_schema_shapes() {
    let text = convert_default(DOCUMENT).schema.to_string();
    let document = Document::parse(&text).unwrap();
    assert_eq!(document.root_element().tag_name().name(), "schema");
    assert_eq!(document.root_element().tag_name().namespace(), Some(XS_NAMESPACE));

    // required list of sections
    let root = xs(global_element(&document, "Document"), "complexType").next().unwrap();
    let section = xs(xs(root, "sequence").next().unwrap(), "element").next().unwrap();
    assert_eq!(section.attribute("ref"), Some("Section"));
    assert_eq!(section.attribute("minOccurs"), Some("1"));
    assert_eq!(section.attribute("maxOccurs"), Some("unbounded"));
    let version = xs(root, "attribute")
        .find(|n| n.attribute("name") == Some("version"))
        .unwrap();
    let restriction = version.descendants().find(|n| n.has_tag_name((XS_NAMESPACE, "restriction"))).unwrap();
    assert_eq!(restriction.attribute("base"), Some("xs:decimal"));

    // optional choice, constructor parameter after the fields
    let complex = xs(global_element(&document, "Section"), "complexType").next().unwrap();
    let choice = xs(complex, "choice").next().unwrap();
    assert_eq!(choice.attribute("minOccurs"), Some("0"));
    assert_eq!(choice.attribute("maxOccurs"), Some("unbounded"));
    let attributes: Vec<_> = xs(complex, "attribute")
        .filter_map(|n| n.attribute("name"))
        .collect();
    assert_eq!(attributes, vec!["heading", "id"]);

    let paragraph = xs(global_element(&document, "Paragraph"), "complexType").next().unwrap();
    assert_eq!(paragraph.attribute("mixed"), Some("true"));

    let emphasis = global_element(&document, "Emphasis");
    assert_eq!(emphasis.attribute("type"), Some("xs:string"));
    assert!(!emphasis.has_children());

    let empty = global_element(&document, "Break");
    let length = empty.descendants().find(|n| n.has_tag_name((XS_NAMESPACE, "length"))).unwrap();
    assert_eq!(length.attribute("value"), Some("0"));
}

#[test]
fn groups_come_before_attributes_everywhere() {
    let text = convert_default(DOCUMENT).schema.to_string();
    let document = Document::parse(&text).unwrap();
    for complex in document
        .descendants()
        .filter(|n| n.has_tag_name((XS_NAMESPACE, "complexType")))
    {
        let names: Vec<_> = complex
            .children()
            .filter(|n| n.is_element())
            .map(|n| n.tag_name().name())
            .collect();
        let first_attribute = names.iter().position(|n| *n == "attribute");
        let last_group = names
            .iter()
            .rposition(|n| matches!(*n, "sequence" | "choice"));
        if let (Some(attribute), Some(group)) = (first_attribute, last_group) {
            assert!(group < attribute, "{names:?}");
        }
    }
}

#[rstest]
#[case("interface A { children: B; }\ninterface B {}", "1", "1")]
#[case("interface A { children?: B; }\ninterface B {}", "0", "1")]
#[case("interface A { children: B[]; }\ninterface B {}", "1", "unbounded")]
#[case("interface A { children?: B[]; }\ninterface B {}", "0", "unbounded")]
fn occurrence_bounds(#[case] source: &str, #[case] min: &str, #[case] max: &str) {
    let text = convert_default(source).schema.to_string();
    let document = Document::parse(&text).unwrap();
    let reference = document
        .descendants()
        .find(|n| n.attribute("ref") == Some("B"))
        .unwrap();
    assert_eq!(reference.attribute("minOccurs"), Some(min));
    assert_eq!(reference.attribute("maxOccurs"), Some(max));
}

#[test]
fn marked_classes_end_to_end() {
    let source = r#"
        /**
         * A labelled value.
         * @schema
         */
        export class Marked {
            constructor(public label: string) {}
        }

        /** @schema */
        export default class {
            value: number;
        }

        class Unmarked { hidden: string }
    "#;
    let conversion = convert_default(source);
    let names: Vec<_> = conversion.elements.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Marked"]);

    assert_eq!(conversion.diagnostics.len(), 1);
    assert_eq!(conversion.diagnostics[0].declaration, None);
    assert!(matches!(
        conversion.diagnostics[0].error,
        ExtractError::Structural(_)
    ));

    let text = conversion.schema.to_string();
    let document = Document::parse(&text).unwrap();
    let marked = global_element(&document, "Marked");
    let complex = xs(marked, "complexType").next().unwrap();
    let attribute = xs(complex, "attribute").next().unwrap();
    assert_eq!(attribute.attribute("name"), Some("label"));
    assert_eq!(attribute.attribute("type"), Some("xs:string"));
}

#[test]
fn emission_errors_yield_no_schema() {
    let result = convert(
        "interface User { name: string }\ninterface Post { author: User }",
        &ExtractOptions::default(),
    );
    assert_eq!(
        result.unwrap_err().to_string(),
        "attribute cannot have references: Post.author"
    );
}

#[test]
fn rendering_is_stable() {
    let schema = convert_default(DOCUMENT).schema;
    assert_eq!(schema.to_string(), schema.to_string());

    let tabs = schema.render_with(&RenderOptions::tabs());
    assert_eq!(tabs, schema.render_with(&RenderOptions::tabs()));
    assert_eq!(tabs.replace('\t', "  "), schema.to_string());
}

#[test]
fn model_dump_reads_back() {
    let elements = extract(DOCUMENT);
    let dump = serde_json::to_string(&elements).unwrap();
    let read: Vec<Element> = serde_json::from_str(&dump).unwrap();
    assert_eq!(read, elements);
}
