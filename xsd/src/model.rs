//! The type model connecting extraction to schema emission.
//!
//! The JSON form (via serde) keeps simple types as bare strings, restrictions as
//! `{"value": [...]}` and references as `{"reference": "..."}`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Name of the property that holds an element's content rather than an attribute.
pub const CHILDREN: &str = "children";

/// An extracted declaration; becomes one global element of the schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    /// In declaration order, which is also the output order.
    pub properties: Vec<Property>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub mandatory: bool,
    /// Never empty for extracted properties; more than one entry means a union.
    pub types: Vec<TypeVariant>,
    /// Only meaningful on the `children` property.
    #[serde(default, skip_serializing_if = "is_false")]
    pub multiple: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Property {
    pub fn is_children(&self) -> bool {
        self.name.as_deref() == Some(CHILDREN)
    }
}

impl Element {
    /// The `children` property, if the element declares one.
    pub fn children(&self) -> Option<&Property> {
        self.properties.iter().find(|p| p.is_children())
    }

    /// Every property that becomes an attribute.
    pub fn attributes(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|p| !p.is_children())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeVariant {
    Simple(Simple),
    /// A finite set of allowed literal values.
    Restricted { value: Vec<Literal> },
    /// A pointer to another declared element.
    Reference { reference: String },
}

impl TypeVariant {
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference {
            reference: name.into(),
        }
    }

    pub fn restricted(values: impl IntoIterator<Item = Literal>) -> Self {
        Self::Restricted {
            value: values.into_iter().collect(),
        }
    }
}

impl From<Simple> for TypeVariant {
    fn from(simple: Simple) -> Self {
        Self::Simple(simple)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Simple {
    Any,
    Boolean,
    Number,
    String,
    Null,
    Undefined,
}

impl Simple {
    pub const ALL: [Simple; 6] = [
        Self::Any,
        Self::Boolean,
        Self::Number,
        Self::String,
        Self::Null,
        Self::Undefined,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Null => "null",
            Self::Undefined => "undefined",
        }
    }
}

impl fmt::Display for Simple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownSimple(pub String);

impl fmt::Display for UnknownSimple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a simple type", self.0)
    }
}

impl std::error::Error for UnknownSimple {}

impl FromStr for Simple {
    type Err = UnknownSimple;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|simple| simple.as_str() == s)
            .ok_or_else(|| UnknownSimple(s.to_string()))
    }
}

/// A literal value of a restriction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    String(String),
    Number(f64),
}

impl Literal {
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => f.write_str(value),
            Self::Number(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}
