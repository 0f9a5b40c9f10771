use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::model::Simple;

pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
/// Prefix bound to [`XS_NAMESPACE`] in every emitted schema.
pub const XS_PREFIX: &str = "xs";

pub const XS_STRING: &str = "xs:string";
pub const XS_DECIMAL: &str = "xs:decimal";

lazy_static! {
    static ref XS_TYPE_NAMES: HashMap<Simple, &'static str> = HashMap::from([
        (Simple::Any, "xs:anyType"),
        (Simple::Boolean, "xs:boolean"),
        (Simple::Number, XS_DECIMAL),
        (Simple::String, XS_STRING),
        (Simple::Null, "xs:null"),
        (Simple::Undefined, "xs:undefined"),
    ]);
}

/// The built-in type a simple value is emitted as.
pub fn xs_type(simple: Simple) -> &'static str {
    XS_TYPE_NAMES[&simple]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_simple_value_has_a_type() {
        for simple in Simple::ALL {
            assert!(xs_type(simple).starts_with("xs:"));
        }
        assert_eq!(xs_type(Simple::Number), "xs:decimal");
    }
}
