//! Builds the element model from declarations in source text.
//!
//! Failures are isolated per declaration: a declaration that cannot be mapped is dropped and
//! reported as a [`Diagnostic`], and extraction continues with the next one.

mod resolve;

use std::collections::HashSet;
use std::ops::Range;

use tracing::{debug, warn};
use tsd_syntax::{Node, ParseError, SyntaxKind};

use crate::error::{Diagnostic, ExtractError};
use crate::model::{Element, Property};
pub use resolve::{resolve_type, Resolved};

/// Which declarations become elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Documentation tag that marks a class for export, without the `@`.
    pub class_marker: String,
    pub interfaces: bool,
    /// Only consider declarations with an `export` modifier.
    pub exported_only: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            class_marker: "schema".to_string(),
            interfaces: true,
            exported_only: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extraction {
    pub elements: Vec<Element>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Extraction {
    fn report(&mut self, declaration: Option<String>, error: ExtractError) {
        let diagnostic = Diagnostic { declaration, error };
        warn!(%diagnostic, "declaration dropped");
        self.diagnostics.push(diagnostic);
    }

    /// A syntax error outside every selected declaration. Nothing was dropped for it.
    fn report_stray(&mut self, error: &ParseError) {
        let diagnostic = Diagnostic {
            declaration: None,
            error: ExtractError::Syntax(error.clone()),
        };
        warn!(%diagnostic, "syntax error outside of any declaration");
        self.diagnostics.push(diagnostic);
    }
}

/// Extracts with the default options, discarding diagnostics.
pub fn extract(source: &str) -> Vec<Element> {
    extract_with(source, &ExtractOptions::default()).elements
}

pub fn extract_with(source: &str, options: &ExtractOptions) -> Extraction {
    let parse = tsd_syntax::parse(source);
    let mut extraction = Extraction::default();
    let mut names = HashSet::new();
    let mut selected: Vec<Range<usize>> = Vec::new();

    for node in parse.root.descendants() {
        let Some(declaration) = Declaration::select(node, options) else {
            continue;
        };
        let span = node.span();
        let name = node
            .first_child(SyntaxKind::Identifier)
            .and_then(Node::text)
            .map(str::to_string);

        // a declaration the parser had to recover inside is incomplete
        let result = match parse.errors_within(&span).next() {
            Some(error) => Err(ExtractError::Syntax(error.clone())),
            None => declaration.extract(node),
        };
        selected.push(span);

        match result {
            Ok(element) if names.contains(&element.name) => extraction.report(
                name,
                ExtractError::Structural("duplicate declaration, keeping the first".into()),
            ),
            Ok(element) => {
                debug!(name = %element.name, properties = element.properties.len(), "extracted");
                names.insert(element.name.clone());
                extraction.elements.push(element);
            }
            Err(error) => extraction.report(name, error),
        }
    }

    for error in &parse.errors {
        if !selected.iter().any(|span| span.contains(&error.span.start)) {
            extraction.report_stray(error);
        }
    }

    extraction
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Declaration {
    Interface,
    Class,
}

impl Declaration {
    fn select(node: &Node, options: &ExtractOptions) -> Option<Self> {
        let declaration = match node.kind() {
            SyntaxKind::InterfaceDeclaration if options.interfaces => Self::Interface,
            SyntaxKind::ClassDeclaration if node.has_tag(&options.class_marker) => Self::Class,
            _ => return None,
        };
        if options.exported_only && !node.has_child(SyntaxKind::ExportKeyword) {
            return None;
        }
        Some(declaration)
    }

    fn extract(self, node: &Node) -> Result<Element, ExtractError> {
        match self {
            Self::Interface => interface(node),
            Self::Class => class(node),
        }
    }
}

fn declaration_name(node: &Node, what: &str) -> Result<String, ExtractError> {
    node.first_child(SyntaxKind::Identifier)
        .and_then(Node::text)
        .map(str::to_string)
        .ok_or_else(|| ExtractError::Structural(format!("no {what} identifier found")))
}

fn interface(node: &Node) -> Result<Element, ExtractError> {
    let name = declaration_name(node, "interface")?;
    let properties = node
        .children_of(&[SyntaxKind::PropertySignature])
        .map(property)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Element { name, properties })
}

/// Fields first, then the public parameters of the constructor.
fn class(node: &Node) -> Result<Element, ExtractError> {
    let name = declaration_name(node, "class")?;

    let mut properties = node
        .children_of(&[SyntaxKind::PropertyDeclaration])
        .filter(|field| is_instance_field(field))
        .map(property)
        .collect::<Result<Vec<_>, _>>()?;

    let parameters = node
        .children_of(&[SyntaxKind::Constructor])
        .flat_map(|constructor| constructor.children_of(&[SyntaxKind::Parameter]))
        .filter(|parameter| parameter.has_child(SyntaxKind::PublicKeyword));
    for parameter in parameters {
        properties.push(property(parameter)?);
    }

    Ok(Element { name, properties })
}

/// Static fields and `#private` fields are not part of an instance's data.
fn is_instance_field(field: &Node) -> bool {
    let private_name = field
        .first_child(SyntaxKind::Identifier)
        .and_then(Node::text)
        .is_some_and(|name| name.starts_with('#'));
    !field.has_child(SyntaxKind::StaticKeyword) && !private_name
}

fn property(node: &Node) -> Result<Property, ExtractError> {
    let name = node
        .first_child_of(&[SyntaxKind::Identifier, SyntaxKind::StringLiteral])
        .and_then(Node::text)
        .map(str::to_string);
    let mandatory = !node.has_child(SyntaxKind::QuestionToken);

    let annotation = node.first_child_where(SyntaxKind::is_type).ok_or_else(|| {
        ExtractError::Structural(format!(
            "no type found within {}",
            name.as_deref().unwrap_or(node.kind().name())
        ))
    })?;
    let Resolved { types, multiple } = resolve_type(annotation)?;

    Ok(Property {
        name,
        mandatory,
        types,
        multiple,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Simple, TypeVariant};

    fn names(extraction: &Extraction) -> Vec<&str> {
        extraction
            .elements
            .iter()
            .map(|e| e.name.as_str())
            .collect()
    }

    #[test]
    fn extracts_interface_properties() {
        let elements = extract("interface Point { x: number; y?: number }");
        assert_eq!(elements.len(), 1);
        let point = &elements[0];
        assert_eq!(point.name, "Point");
        assert_eq!(point.properties.len(), 2);
        assert_eq!(point.properties[0].name.as_deref(), Some("x"));
        assert!(point.properties[0].mandatory);
        assert!(!point.properties[1].mandatory);
        assert_eq!(
            point.properties[1].types,
            vec![TypeVariant::Simple(Simple::Number)]
        );
    }

    #[test]
    fn classes_need_the_marker() {
        let source = r#"
            /** @schema */
            class Marked { a: string }
            class Unmarked { b: string }
        "#;
        assert_eq!(names(&extract_with(source, &ExtractOptions::default())), vec!["Marked"]);
    }

    #[test]
    fn custom_marker() {
        let source = "/** @xsd */ class A { a: string }\n/** @schema */ class B { b: string }";
        let options = ExtractOptions {
            class_marker: "xsd".into(),
            ..ExtractOptions::default()
        };
        assert_eq!(names(&extract_with(source, &options)), vec!["A"]);
    }

    #[test]
    fn class_fields_then_public_parameters() {
        let source = r#"
            /** @schema */
            class Node {
                static count: number = 0;
                #secret: string;
                label: string;
                constructor(public id: number, hidden: string, private other: string, public children?: Node[]) {}
                describe(): string { return this.label }
            }
        "#;
        let elements = extract(source);
        let names: Vec<_> = elements[0]
            .properties
            .iter()
            .filter_map(|p| p.name.as_deref())
            .collect();
        assert_eq!(names, vec!["label", "id", "children"]);
        let children = elements[0].children().unwrap();
        assert!(!children.mandatory);
        assert!(children.multiple);
    }

    #[test]
    fn interfaces_can_be_disabled() {
        let source = "interface I { a: string }\n/** @schema */ class C { c: string }";
        let options = ExtractOptions {
            interfaces: false,
            ..ExtractOptions::default()
        };
        assert_eq!(names(&extract_with(source, &options)), vec!["C"]);
    }

    #[test]
    fn exported_only() {
        let source = "export interface A { a: string }\ninterface B { b: string }";
        let options = ExtractOptions {
            exported_only: true,
            ..ExtractOptions::default()
        };
        assert_eq!(names(&extract_with(source, &options)), vec!["A"]);
    }

    #[test]
    fn failing_declaration_does_not_stop_the_others() {
        let source = r#"
            interface Before { a: string }
            interface Broken { a: [string, number] }
            interface After { b: bigint }
            interface Last { c: number }
        "#;
        let extraction = extract_with(source, &ExtractOptions::default());
        assert_eq!(names(&extraction), vec!["Before", "Last"]);
        assert_eq!(extraction.diagnostics.len(), 2);
        assert_eq!(extraction.diagnostics[0].declaration.as_deref(), Some("Broken"));
        assert_eq!(
            extraction.diagnostics[0].error,
            ExtractError::NotImplementedKind(SyntaxKind::TupleType)
        );
        assert_eq!(
            extraction.diagnostics[1].to_string(),
            "After: BigIntKeyword not supported"
        );
    }

    #[test]
    fn duplicate_names_keep_the_first() {
        let source = "interface A { first: string }\ninterface A { second: string }";
        let extraction = extract_with(source, &ExtractOptions::default());
        assert_eq!(extraction.elements.len(), 1);
        assert_eq!(
            extraction.elements[0].properties[0].name.as_deref(),
            Some("first")
        );
        assert!(matches!(
            extraction.diagnostics[0].error,
            ExtractError::Structural(_)
        ));
    }

    #[test]
    fn syntax_errors_drop_only_their_declaration() {
        let source = "interface A { a: keyof B }\ninterface C { c: number }";
        let extraction = extract_with(source, &ExtractOptions::default());
        assert_eq!(names(&extraction), vec!["C"]);
        assert!(matches!(
            extraction.diagnostics[0].error,
            ExtractError::Syntax(_)
        ));
    }

    #[test]
    fn unparsable_declaration_is_reported_without_name() {
        let extraction = extract_with("interface A { a: string", &ExtractOptions::default());
        assert!(extraction.elements.is_empty());
        assert_eq!(extraction.diagnostics.len(), 1);
        assert_eq!(extraction.diagnostics[0].declaration, None);
    }

    #[test]
    fn stray_syntax_errors_keep_every_declaration() {
        let extraction = extract_with("interface A { a: string }\n}", &ExtractOptions::default());
        assert_eq!(names(&extraction), vec!["A"]);
        assert_eq!(extraction.diagnostics.len(), 1);
        assert_eq!(extraction.diagnostics[0].declaration, None);
        assert!(matches!(extraction.diagnostics[0].error, ExtractError::Syntax(_)));
    }

    #[test]
    fn unnamed_interface_is_a_syntax_error() {
        let extraction = extract_with("interface { a: string }", &ExtractOptions::default());
        assert!(extraction.elements.is_empty());
        assert_eq!(extraction.diagnostics.len(), 1);
        assert!(matches!(
            &extraction.diagnostics[0].error,
            ExtractError::Syntax(error) if error.message.contains("interface name")
        ));
    }

    #[test]
    fn unnamed_marked_class_is_structural() {
        let source = "/** @schema */\nexport default class { a: string }";
        let extraction = extract_with(source, &ExtractOptions::default());
        assert!(extraction.elements.is_empty());
        assert_eq!(
            extraction.diagnostics,
            vec![Diagnostic {
                declaration: None,
                error: ExtractError::Structural("no class identifier found".into()),
            }]
        );
    }

    #[test]
    fn accessors_are_ignored() {
        let elements = extract("interface A { get x(): string; set x(v: string); y: number }");
        assert_eq!(elements.len(), 1);
        let names: Vec<_> = elements[0]
            .properties
            .iter()
            .filter_map(|p| p.name.as_deref())
            .collect();
        assert_eq!(names, vec!["y"]);
    }

    #[test]
    fn members_without_annotation_fail() {
        let extraction = extract_with("interface A { a }", &ExtractOptions::default());
        assert!(extraction.elements.is_empty());
        assert_eq!(
            extraction.diagnostics[0].error,
            ExtractError::Structural("no type found within a".into())
        );
    }

    #[test]
    fn quoted_keys_are_names_computed_keys_are_anonymous() {
        let elements = extract("interface A { 'data-id': string; [key]: number }");
        let names: Vec<_> = elements[0]
            .properties
            .iter()
            .map(|p| p.name.as_deref())
            .collect();
        assert_eq!(names, vec![Some("data-id"), None]);
    }

    #[test]
    fn declarations_inside_namespaces() {
        let source = "namespace shapes { export interface Circle { r: number } }";
        assert_eq!(extract(source)[0].name, "Circle");
    }

    #[test]
    fn methods_and_index_signatures_are_ignored() {
        let elements = extract("interface A { a: string; b(): void; [key: string]: any }");
        assert_eq!(elements[0].properties.len(), 1);
    }
}
