//! Maps one type annotation to the type variants of a property.

use std::collections::HashMap;

use lazy_static::lazy_static;
use tracing::trace;
use tsd_syntax::{Node, SyntaxKind};

use crate::error::ExtractError;
use crate::model::{Literal, Simple, TypeVariant};

/// Types of one annotation, flattened, with whether the annotation itself was an array.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolved {
    pub types: Vec<TypeVariant>,
    pub multiple: bool,
}

impl Resolved {
    fn single(variant: TypeVariant) -> Self {
        Self {
            types: vec![variant],
            multiple: false,
        }
    }
}

/// Kinds outside of what a schema can express.
const UNSUPPORTED: &[SyntaxKind] = &[
    SyntaxKind::BigIntKeyword,
    SyntaxKind::SymbolKeyword,
    SyntaxKind::NeverKeyword,
    SyntaxKind::InterfaceKeyword,
    SyntaxKind::ClassKeyword,
    SyntaxKind::FunctionKeyword,
    SyntaxKind::ObjectKeyword,
    SyntaxKind::EnumKeyword,
    SyntaxKind::UnknownKeyword,
    SyntaxKind::FunctionType,
    SyntaxKind::TypeLiteral,
];

/// Kinds that could be mapped but are not yet.
const NOT_IMPLEMENTED: &[SyntaxKind] = &[
    SyntaxKind::TupleType,
    SyntaxKind::SpreadElement,
    SyntaxKind::IntersectionType,
    SyntaxKind::IndexedAccessType,
];

/// Kinds whose type children are resolved and flattened into one result.
const NESTING: &[SyntaxKind] = &[
    SyntaxKind::ParenthesizedType,
    SyntaxKind::UnionType,
    SyntaxKind::ArrayType,
];

/// How a named type operator is resolved through instead of becoming a reference.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Unwrap {
    /// `ReturnType<typeof f>` resolves as `typeof f`.
    QueryOperand,
    /// `Readonly<T>` resolves as `T`.
    TypeArgument,
}

lazy_static! {
    static ref KEYWORDS: HashMap<SyntaxKind, Simple> = HashMap::from([
        (SyntaxKind::AnyKeyword, Simple::Any),
        (SyntaxKind::BooleanKeyword, Simple::Boolean),
        (SyntaxKind::NumberKeyword, Simple::Number),
        (SyntaxKind::StringKeyword, Simple::String),
        (SyntaxKind::VoidKeyword, Simple::Undefined),
        (SyntaxKind::NullKeyword, Simple::Null),
        (SyntaxKind::UndefinedKeyword, Simple::Undefined),
    ]);
    static ref UNWRAP_RULES: HashMap<&'static str, Unwrap> = HashMap::from([
        ("ReturnType", Unwrap::QueryOperand),
        ("Readonly", Unwrap::TypeArgument),
    ]);
}

/// Resolves a type annotation node. Recursion follows the tree, whose depth the parser bounds.
pub fn resolve_type(node: &Node) -> Result<Resolved, ExtractError> {
    let kind = node.kind();
    trace!(%kind, "resolving type");

    if UNSUPPORTED.contains(&kind) {
        return Err(ExtractError::UnsupportedKind(kind));
    }
    if NOT_IMPLEMENTED.contains(&kind) {
        return Err(ExtractError::NotImplementedKind(kind));
    }
    if let Some(simple) = KEYWORDS.get(&kind) {
        return Ok(Resolved::single(TypeVariant::Simple(*simple)));
    }

    match kind {
        SyntaxKind::LiteralType => literal(node).map(Resolved::single),
        SyntaxKind::TypeQuery => query(node).map(Resolved::single),
        SyntaxKind::TypeReference => reference(node),
        _ if NESTING.contains(&kind) => nested(node),
        _ => fallback(node).map(Resolved::single),
    }
}

fn literal(node: &Node) -> Result<TypeVariant, ExtractError> {
    let mut values = Vec::new();
    for child in node.children() {
        match child.kind() {
            SyntaxKind::StringLiteral => {
                values.push(Literal::String(child.text().unwrap_or_default().to_string()))
            }
            SyntaxKind::NumericLiteral => {
                values.push(Literal::Number(parse_number(child.text().unwrap_or_default())?))
            }
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => {
                return Err(ExtractError::NotImplemented("boolean literal types"))
            }
            _ => {}
        }
    }
    if values.is_empty() {
        return Err(ExtractError::NotImplemented("literal types without a value"));
    }
    Ok(TypeVariant::restricted(values))
}

/// Name a reference or query points at. Qualified names refer to their last segment, which is
/// how the declaration inside the namespace is named.
fn target_name(node: &Node) -> Option<&str> {
    let name = node.first_child_of(&[SyntaxKind::Identifier, SyntaxKind::QualifiedName])?;
    let text = name.text()?;
    Some(text.rsplit('.').next().unwrap_or(text))
}

fn query(node: &Node) -> Result<TypeVariant, ExtractError> {
    target_name(node)
        .map(TypeVariant::reference)
        .ok_or_else(|| ExtractError::Structural("no reference identifier found".into()))
}

fn reference(node: &Node) -> Result<Resolved, ExtractError> {
    let name = target_name(node)
        .ok_or_else(|| ExtractError::Structural("no reference identifier found".into()))?;
    let is_plain = node.has_child(SyntaxKind::Identifier);

    match UNWRAP_RULES.get(name).filter(|_| is_plain) {
        Some(Unwrap::QueryOperand) => {
            let operand = node
                .first_child(SyntaxKind::TypeQuery)
                .ok_or_else(|| ExtractError::Structural(format!("no type query found in {name}")))?;
            resolve_type(operand)
        }
        Some(Unwrap::TypeArgument) => {
            let argument = node
                .first_child_where(SyntaxKind::is_type)
                .ok_or_else(|| ExtractError::Structural(format!("no type argument found in {name}")))?;
            resolve_type(argument)
        }
        None => Ok(Resolved::single(TypeVariant::reference(name))),
    }
}

fn nested(node: &Node) -> Result<Resolved, ExtractError> {
    let mut types = Vec::new();
    for child in node.children().filter(|c| c.kind().is_type()) {
        types.extend(resolve_type(child)?.types);
    }
    if types.is_empty() {
        return Err(ExtractError::Structural(format!("empty {}", node.kind())));
    }
    Ok(Resolved {
        types: merge_restricted(types),
        multiple: node.kind() == SyntaxKind::ArrayType,
    })
}

/// Folds every restriction into the first one, dropping repeated literals.
fn merge_restricted(types: Vec<TypeVariant>) -> Vec<TypeVariant> {
    let mut merged: Vec<TypeVariant> = Vec::with_capacity(types.len());
    let mut first_restricted = None;
    for variant in types {
        let TypeVariant::Restricted { value } = variant else {
            merged.push(variant);
            continue;
        };
        let index = *first_restricted.get_or_insert_with(|| {
            merged.push(TypeVariant::Restricted { value: Vec::new() });
            merged.len() - 1
        });
        if let TypeVariant::Restricted { value: existing } = &mut merged[index] {
            for literal in value {
                if !existing.contains(&literal) {
                    existing.push(literal);
                }
            }
        }
    }
    merged
}

/// Raw node text, accepted only when it names a simple type.
fn fallback(node: &Node) -> Result<TypeVariant, ExtractError> {
    let text = node
        .text()
        .ok_or(ExtractError::UnsupportedKind(node.kind()))?;
    text.parse::<Simple>()
        .map(TypeVariant::Simple)
        .map_err(|_| ExtractError::UnsupportedType(text.to_string()))
}

/// Value of a numeric literal: decimal, exponent, hex, binary or octal, with separators.
fn parse_number(text: &str) -> Result<f64, ExtractError> {
    let cleaned = text.replace('_', "");
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    let radix = match digits.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0b" | "0B") => Some(2),
        Some("0o" | "0O") => Some(8),
        _ => None,
    };
    let value = match radix {
        Some(radix) => u64::from_str_radix(&digits[2..], radix).map(|v| v as f64).ok(),
        None => digits.parse::<f64>().ok(),
    };

    // an overflowing literal has no decimal lexical form
    value
        .filter(|v| v.is_finite())
        .map(|v| if negative { -v } else { v })
        .ok_or_else(|| ExtractError::UnsupportedType(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn annotation(source: &str) -> Node {
        let parse = tsd_syntax::parse(&format!("interface T {{ a: {source} }}"));
        assert!(parse.ok(), "unexpected errors: {:?}", parse.errors);
        let interface = parse
            .root
            .first_child(SyntaxKind::InterfaceDeclaration)
            .expect("interface");
        let member = interface
            .first_child(SyntaxKind::PropertySignature)
            .expect("member");
        member
            .first_child_where(SyntaxKind::is_type)
            .expect("annotation")
            .clone()
    }

    fn resolve(source: &str) -> Result<Resolved, ExtractError> {
        resolve_type(&annotation(source))
    }

    fn simple(simple: Simple) -> TypeVariant {
        TypeVariant::Simple(simple)
    }

    #[rstest]
    #[case("any", Simple::Any)]
    #[case("boolean", Simple::Boolean)]
    #[case("number", Simple::Number)]
    #[case("string", Simple::String)]
    #[case("null", Simple::Null)]
    #[case("undefined", Simple::Undefined)]
    #[case("void", Simple::Undefined)]
    fn keywords_map_to_simple_types(#[case] source: &str, #[case] expected: Simple) {
        assert_eq!(resolve(source), Ok(Resolved::single(simple(expected))));
    }

    #[rstest]
    #[case("bigint", SyntaxKind::BigIntKeyword)]
    #[case("symbol", SyntaxKind::SymbolKeyword)]
    #[case("never", SyntaxKind::NeverKeyword)]
    #[case("object", SyntaxKind::ObjectKeyword)]
    #[case("unknown", SyntaxKind::UnknownKeyword)]
    #[case("(x: number) => void", SyntaxKind::FunctionType)]
    #[case("{ b: string }", SyntaxKind::TypeLiteral)]
    #[case("string | symbol", SyntaxKind::SymbolKeyword)]
    fn unsupported_kinds(#[case] source: &str, #[case] kind: SyntaxKind) {
        assert_eq!(resolve(source), Err(ExtractError::UnsupportedKind(kind)));
    }

    #[rstest]
    #[case("[string, number]", SyntaxKind::TupleType)]
    #[case("[...string[]]", SyntaxKind::TupleType)]
    #[case("A & B", SyntaxKind::IntersectionType)]
    #[case("A['b']", SyntaxKind::IndexedAccessType)]
    #[case("string | [number]", SyntaxKind::TupleType)]
    fn not_implemented_kinds(#[case] source: &str, #[case] kind: SyntaxKind) {
        assert_eq!(resolve(source), Err(ExtractError::NotImplementedKind(kind)));
    }

    #[test]
    fn spread_element_is_not_implemented() {
        let tuple = annotation("[...rest: string[]]");
        let spread = tuple.first_child(SyntaxKind::SpreadElement).unwrap();
        assert_eq!(
            resolve_type(spread),
            Err(ExtractError::NotImplementedKind(SyntaxKind::SpreadElement))
        );
    }

    #[test]
    fn arrays_are_multiple() {
        let resolved = resolve("string[]").unwrap();
        assert_eq!(resolved.types, vec![simple(Simple::String)]);
        assert!(resolved.multiple);
    }

    #[test]
    fn unions_flatten_in_order() {
        let resolved = resolve("(string | null)[]").unwrap();
        assert_eq!(
            resolved.types,
            vec![simple(Simple::String), simple(Simple::Null)]
        );
        assert!(resolved.multiple);
    }

    #[rstest]
    #[case("Item[] | null")]
    #[case("(Item[])")]
    fn only_the_outermost_array_sets_multiple(#[case] source: &str) {
        assert!(!resolve(source).unwrap().multiple);
    }

    #[test]
    fn string_literals_merge_into_one_restriction() {
        let resolved = resolve("'a' | 'b' | 'a'").unwrap();
        assert_eq!(
            resolved.types,
            vec![TypeVariant::restricted([Literal::from("a"), Literal::from("b")])]
        );
    }

    #[test]
    fn restriction_keeps_position_of_first_literal() {
        let resolved = resolve("null | 'a' | number | 'b'").unwrap();
        assert_eq!(
            resolved.types,
            vec![
                simple(Simple::Null),
                TypeVariant::restricted([Literal::from("a"), Literal::from("b")]),
                simple(Simple::Number),
            ]
        );
    }

    #[test]
    fn numeric_literals_are_numbers() {
        let resolved = resolve("1 | 0x10 | -2.5 | 1_000").unwrap();
        assert_eq!(
            resolved.types,
            vec![TypeVariant::restricted([
                Literal::Number(1.0),
                Literal::Number(16.0),
                Literal::Number(-2.5),
                Literal::Number(1000.0),
            ])]
        );
    }

    #[rstest]
    #[case("1e400")]
    #[case("-1e400")]
    #[case("'a' | 1e400")]
    fn overflowing_numbers_are_rejected(#[case] source: &str) {
        assert!(matches!(
            resolve(source),
            Err(ExtractError::UnsupportedType(text)) if text.contains("1e400")
        ));
    }

    #[rstest]
    #[case("true")]
    #[case("false")]
    #[case("'a' | true")]
    fn boolean_literals_are_not_implemented(#[case] source: &str) {
        assert_eq!(
            resolve(source),
            Err(ExtractError::NotImplemented("boolean literal types"))
        );
    }

    #[rstest]
    #[case("Point", "Point")]
    #[case("shapes.Point", "Point")]
    #[case("typeof point", "point")]
    #[case("ReturnType<typeof makePoint>", "makePoint")]
    fn references(#[case] source: &str, #[case] name: &str) {
        assert_eq!(
            resolve(source),
            Ok(Resolved::single(TypeVariant::reference(name)))
        );
    }

    #[test]
    fn readonly_resolves_through_its_argument() {
        let resolved = resolve("Readonly<Item[]>").unwrap();
        assert_eq!(resolved.types, vec![TypeVariant::reference("Item")]);
        assert!(resolved.multiple);
    }

    #[test]
    fn return_type_needs_a_query() {
        assert!(matches!(
            resolve("ReturnType<Factory>"),
            Err(ExtractError::Structural(_))
        ));
    }

    #[test]
    fn fallback_accepts_only_simple_names() {
        let node = Node::with_text(SyntaxKind::Identifier, "string", 0..6);
        assert_eq!(
            resolve_type(&node),
            Ok(Resolved::single(simple(Simple::String)))
        );
        let node = Node::with_text(SyntaxKind::Identifier, "Date", 0..4);
        assert_eq!(
            resolve_type(&node),
            Err(ExtractError::UnsupportedType("Date".into()))
        );
        let node = Node::new(SyntaxKind::HeritageClause, 0..0);
        assert_eq!(
            resolve_type(&node),
            Err(ExtractError::UnsupportedKind(SyntaxKind::HeritageClause))
        );
    }
}
