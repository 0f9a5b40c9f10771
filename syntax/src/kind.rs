use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

/// Node kinds of the declaration tree.
///
/// The vocabulary is closed: every node the parser produces carries one of these kinds, and
/// consumers dispatch on it with exhaustive matches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    SourceFile,
    ModuleDeclaration,
    ModuleBlock,
    InterfaceDeclaration,
    ClassDeclaration,
    TypeAliasDeclaration,
    EnumDeclaration,
    HeritageClause,
    TypeParameter,

    // Members
    PropertySignature,
    MethodSignature,
    IndexSignature,
    PropertyDeclaration,
    MethodDeclaration,
    Constructor,
    Parameter,

    // Names and literals
    Identifier,
    QualifiedName,
    StringLiteral,
    NumericLiteral,

    // Tokens
    QuestionToken,

    // Modifiers
    ExportKeyword,
    DeclareKeyword,
    PublicKeyword,
    PrivateKeyword,
    ProtectedKeyword,
    ReadonlyKeyword,
    StaticKeyword,
    AbstractKeyword,

    // Keyword types
    AnyKeyword,
    BooleanKeyword,
    NumberKeyword,
    StringKeyword,
    VoidKeyword,
    NullKeyword,
    UndefinedKeyword,
    BigIntKeyword,
    SymbolKeyword,
    NeverKeyword,
    ObjectKeyword,
    UnknownKeyword,
    TrueKeyword,
    FalseKeyword,

    // Declaration keywords showing up in type position
    InterfaceKeyword,
    ClassKeyword,
    FunctionKeyword,
    EnumKeyword,

    // Type nodes
    TypeReference,
    TypeQuery,
    LiteralType,
    ParenthesizedType,
    UnionType,
    IntersectionType,
    ArrayType,
    TupleType,
    SpreadElement,
    FunctionType,
    TypeLiteral,
    IndexedAccessType,
}

impl SyntaxKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::SourceFile => "SourceFile",
            Self::ModuleDeclaration => "ModuleDeclaration",
            Self::ModuleBlock => "ModuleBlock",
            Self::InterfaceDeclaration => "InterfaceDeclaration",
            Self::ClassDeclaration => "ClassDeclaration",
            Self::TypeAliasDeclaration => "TypeAliasDeclaration",
            Self::EnumDeclaration => "EnumDeclaration",
            Self::HeritageClause => "HeritageClause",
            Self::TypeParameter => "TypeParameter",
            Self::PropertySignature => "PropertySignature",
            Self::MethodSignature => "MethodSignature",
            Self::IndexSignature => "IndexSignature",
            Self::PropertyDeclaration => "PropertyDeclaration",
            Self::MethodDeclaration => "MethodDeclaration",
            Self::Constructor => "Constructor",
            Self::Parameter => "Parameter",
            Self::Identifier => "Identifier",
            Self::QualifiedName => "QualifiedName",
            Self::StringLiteral => "StringLiteral",
            Self::NumericLiteral => "NumericLiteral",
            Self::QuestionToken => "QuestionToken",
            Self::ExportKeyword => "ExportKeyword",
            Self::DeclareKeyword => "DeclareKeyword",
            Self::PublicKeyword => "PublicKeyword",
            Self::PrivateKeyword => "PrivateKeyword",
            Self::ProtectedKeyword => "ProtectedKeyword",
            Self::ReadonlyKeyword => "ReadonlyKeyword",
            Self::StaticKeyword => "StaticKeyword",
            Self::AbstractKeyword => "AbstractKeyword",
            Self::AnyKeyword => "AnyKeyword",
            Self::BooleanKeyword => "BooleanKeyword",
            Self::NumberKeyword => "NumberKeyword",
            Self::StringKeyword => "StringKeyword",
            Self::VoidKeyword => "VoidKeyword",
            Self::NullKeyword => "NullKeyword",
            Self::UndefinedKeyword => "UndefinedKeyword",
            Self::BigIntKeyword => "BigIntKeyword",
            Self::SymbolKeyword => "SymbolKeyword",
            Self::NeverKeyword => "NeverKeyword",
            Self::ObjectKeyword => "ObjectKeyword",
            Self::UnknownKeyword => "UnknownKeyword",
            Self::TrueKeyword => "TrueKeyword",
            Self::FalseKeyword => "FalseKeyword",
            Self::InterfaceKeyword => "InterfaceKeyword",
            Self::ClassKeyword => "ClassKeyword",
            Self::FunctionKeyword => "FunctionKeyword",
            Self::EnumKeyword => "EnumKeyword",
            Self::TypeReference => "TypeReference",
            Self::TypeQuery => "TypeQuery",
            Self::LiteralType => "LiteralType",
            Self::ParenthesizedType => "ParenthesizedType",
            Self::UnionType => "UnionType",
            Self::IntersectionType => "IntersectionType",
            Self::ArrayType => "ArrayType",
            Self::TupleType => "TupleType",
            Self::SpreadElement => "SpreadElement",
            Self::FunctionType => "FunctionType",
            Self::TypeLiteral => "TypeLiteral",
            Self::IndexedAccessType => "IndexedAccessType",
        }
    }

    /// Kinds that may stand in the type annotation slot of a member.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            Self::AnyKeyword
                | Self::BooleanKeyword
                | Self::NumberKeyword
                | Self::StringKeyword
                | Self::VoidKeyword
                | Self::NullKeyword
                | Self::UndefinedKeyword
                | Self::BigIntKeyword
                | Self::SymbolKeyword
                | Self::NeverKeyword
                | Self::ObjectKeyword
                | Self::UnknownKeyword
                | Self::InterfaceKeyword
                | Self::ClassKeyword
                | Self::FunctionKeyword
                | Self::EnumKeyword
                | Self::TypeReference
                | Self::TypeQuery
                | Self::LiteralType
                | Self::ParenthesizedType
                | Self::UnionType
                | Self::IntersectionType
                | Self::ArrayType
                | Self::TupleType
                | Self::SpreadElement
                | Self::FunctionType
                | Self::TypeLiteral
                | Self::IndexedAccessType
        )
    }

    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Self::ExportKeyword
                | Self::DeclareKeyword
                | Self::PublicKeyword
                | Self::PrivateKeyword
                | Self::ProtectedKeyword
                | Self::ReadonlyKeyword
                | Self::StaticKeyword
                | Self::AbstractKeyword
        )
    }

    /// Looks up the keyword type spelled `word`, e.g. `string` or `never`.
    pub fn keyword_type(word: &str) -> Option<Self> {
        KEYWORD_TYPES.get(word).copied()
    }

    /// Looks up the modifier spelled `word`, e.g. `public` or `readonly`.
    pub fn modifier(word: &str) -> Option<Self> {
        MODIFIERS.get(word).copied()
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

lazy_static! {
    static ref KEYWORD_TYPES: HashMap<&'static str, SyntaxKind> = HashMap::from([
        ("any", SyntaxKind::AnyKeyword),
        ("boolean", SyntaxKind::BooleanKeyword),
        ("number", SyntaxKind::NumberKeyword),
        ("string", SyntaxKind::StringKeyword),
        ("void", SyntaxKind::VoidKeyword),
        ("null", SyntaxKind::NullKeyword),
        ("undefined", SyntaxKind::UndefinedKeyword),
        ("bigint", SyntaxKind::BigIntKeyword),
        ("symbol", SyntaxKind::SymbolKeyword),
        ("never", SyntaxKind::NeverKeyword),
        ("object", SyntaxKind::ObjectKeyword),
        ("unknown", SyntaxKind::UnknownKeyword),
        ("interface", SyntaxKind::InterfaceKeyword),
        ("class", SyntaxKind::ClassKeyword),
        ("function", SyntaxKind::FunctionKeyword),
        ("enum", SyntaxKind::EnumKeyword),
    ]);
    static ref MODIFIERS: HashMap<&'static str, SyntaxKind> = HashMap::from([
        ("export", SyntaxKind::ExportKeyword),
        ("declare", SyntaxKind::DeclareKeyword),
        ("public", SyntaxKind::PublicKeyword),
        ("private", SyntaxKind::PrivateKeyword),
        ("protected", SyntaxKind::ProtectedKeyword),
        ("readonly", SyntaxKind::ReadonlyKeyword),
        ("static", SyntaxKind::StaticKeyword),
        ("abstract", SyntaxKind::AbstractKeyword),
    ]);
}
