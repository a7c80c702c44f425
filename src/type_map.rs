//! Maps protobuf types and identifiers to their OpenAPI counterparts.
//!
//! # Type Mapping Table
//!
//! | Proto type | OpenAPI type | Format |
//! |------------|--------------|--------|
//! | `double` | `number` | `double` |
//! | `float` | `number` | `float` |
//! | `int32`, `sint32`, `sfixed32` | `integer` | `int32` |
//! | `int64`, `sint64`, `sfixed64` | `integer` | `int64` |
//! | `uint32`, `uint64`, `fixed32`, `fixed64` | `number` | |
//! | `bool` | `boolean` | |
//! | `string`, `bytes` | `string` | |
//! | Anything else | schema reference | Qualified as `<package>.<type>` |

use crate::error::{Error, Result};

/// The OpenAPI rendering of a protobuf field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenApiType {
    /// OpenAPI `type` for scalars, or the qualified schema name for references.
    pub type_name: String,
    /// OpenAPI `format`; empty when the type has none.
    pub format: &'static str,
    /// `true` when the type refers to another schema rather than a scalar.
    pub custom: bool,
}

/// Look up a proto3 scalar type.
///
/// Returns `None` for anything that is not one of the fifteen scalar types.
pub fn scalar_type(proto_type: &str) -> Option<(&'static str, &'static str)> {
    let mapped = match proto_type {
        "double" => ("number", "double"),
        "float" => ("number", "float"),
        "int32" | "sint32" | "sfixed32" => ("integer", "int32"),
        "int64" | "sint64" | "sfixed64" => ("integer", "int64"),
        // Unsigned types have no OpenAPI format.
        "uint32" | "uint64" | "fixed32" | "fixed64" => ("number", ""),
        "bool" => ("boolean", ""),
        "string" => ("string", ""),
        // No binary encoding is declared for bytes.
        "bytes" => ("string", ""),
        _ => return None,
    };
    Some(mapped)
}

/// Map a protobuf type name to its OpenAPI type.
///
/// Scalar types map through the table above. Every other name is treated as
/// a message in `package` and returned as a reference to
/// `<package>.<proto_type>`; an empty package leaves the name unqualified.
pub fn proto_to_openapi_type(package: &str, proto_type: &str) -> OpenApiType {
    match scalar_type(proto_type) {
        Some((type_name, format)) => OpenApiType {
            type_name: type_name.to_string(),
            format,
            custom: false,
        },
        None => OpenApiType {
            type_name: qualify(package, proto_type),
            format: "",
            custom: true,
        },
    }
}

/// Join a package and a type name with `.`.
pub fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

/// Convert a snake_case field name to a camelCase property name.
///
/// The input is lower-cased and every `_`-separated word is capitalised;
/// the first character is then taken verbatim from the input so
/// its case is preserved:
/// - `"user_name"` → `"userName"`
/// - `"HTTP_status"` → `"HttpStatus"`
/// - `"userName"` → `"username"`
///
/// Fails with [`Error::MalformedFieldName`] on an empty name.
pub fn to_property_name(field_name: &str) -> Result<String> {
    let Some(head) = field_name.chars().next() else {
        return Err(Error::MalformedFieldName(
            "field name must not be empty".to_string(),
        ));
    };

    let title_cased: String = field_name
        .to_lowercase()
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect();

    let mut out = String::with_capacity(field_name.len());
    out.push(head);
    out.extend(title_cased.chars().skip(1));
    Ok(out)
}
