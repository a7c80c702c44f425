//! OpenAPI schema generation from a protobuf definition tree.
//!
//! Renders the `components.schemas` fragment of an OpenAPI document:
//! - One schema entry per top-level message, keyed `<package>.<Message>`
//! - One property per normal or map field, in declaration order
//! - Scalars as `type`/`format`, other types as `$ref`, repeated fields as
//!   `type: array` with `items`
//! - Comments as `description`
//!
//! Output is deterministic: the same definition always renders to the same
//! bytes. Nested messages, enums, and oneofs are not rendered.

use std::borrow::Cow;
use std::path::Path;

use tracing::{debug, warn};

use crate::definition::{Comment, Definition, Element, Message, MessageElement, ProtoField};
use crate::error::{Error, Result};
use crate::parser;
use crate::type_map::{proto_to_openapi_type, qualify, to_property_name};
use crate::yaml::YamlWriter;

/// Field option that marks a property as nullable when set to `true`.
pub const NULLABLE_OPTION: &str = "(gogoproto.nullable)";

/// Nesting depth of schema entries below `schemas:`.
const SCHEMA_DEPTH: usize = 2;

/// Statistics collected during conversion for reporting.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionStats {
    pub messages_emitted: usize,
    pub fields_emitted: usize,
    pub elements_skipped: usize,
}

/// Parse protobuf source text and render its schemas.
///
/// A parse failure aborts the conversion; no partial document is returned.
pub fn convert(source: &str) -> Result<String> {
    let definition = parser::parse(source)?;
    build_document(&definition)
}

/// Convert a `.proto` file and write the schema document to `output`.
///
/// Nothing is written unless parsing and rendering both succeed.
pub fn convert_file(proto: &Path, output: &Path) -> Result<ConversionStats> {
    let definition = parser::parse_file(proto)?;
    let (document, stats) = build_document_with_stats(&definition)?;
    write_file(output, &document)?;
    Ok(stats)
}

/// Render the `schemas` fragment for every top-level message.
pub fn build_document(definition: &Definition) -> Result<String> {
    build_document_with_stats(definition).map(|(document, _)| document)
}

/// Like [`build_document`], also returning conversion statistics.
///
/// A definition without messages renders to the bare preamble.
pub fn build_document_with_stats(definition: &Definition) -> Result<(String, ConversionStats)> {
    let mut stats = ConversionStats::default();
    let package = match package_name(definition) {
        Some(name) => {
            debug!(package = name, "resolved package name");
            name
        }
        None => {
            warn!("no package declared, schema names will be unqualified");
            ""
        }
    };

    let mut w = YamlWriter::new();
    w.key(1, "schemas");

    for element in &definition.elements {
        match element {
            Element::Message(message) => {
                write_message(&mut w, SCHEMA_DEPTH, package, message, &mut stats)?;
            }
            Element::Package(_) => {}
            other => debug!(kind = other.kind(), "skipping top-level element"),
        }
    }

    Ok((w.finish(), stats))
}

/// The name of the last `package` declaration, if any.
///
/// Earlier declarations are ignored, not merged.
pub fn package_name(definition: &Definition) -> Option<&str> {
    definition
        .elements
        .iter()
        .filter_map(|element| match element {
            Element::Package(package) => Some(package.name.as_str()),
            _ => None,
        })
        .last()
}

/// Render one message as a schema entry at the root of a YAML fragment.
pub fn emit_message(package: &str, message: &Message) -> Result<String> {
    let mut w = YamlWriter::new();
    write_message(&mut w, 0, package, message, &mut ConversionStats::default())?;
    Ok(w.finish())
}

/// Render one field as a property entry at the root of a YAML fragment.
pub fn emit_field<F: ProtoField + ?Sized>(package: &str, field: &F) -> Result<String> {
    let mut w = YamlWriter::new();
    write_field(&mut w, 0, package, field)?;
    Ok(w.finish())
}

fn write_message(
    w: &mut YamlWriter,
    depth: usize,
    package: &str,
    message: &Message,
    stats: &mut ConversionStats,
) -> Result<()> {
    w.key(depth, &qualify(package, &message.name));
    w.entry(depth + 1, "type", "object");

    if let Some(comment) = &message.comment {
        w.description(depth + 1, comment);
    }

    let has_fields = message.elements.iter().any(|element| {
        matches!(
            element,
            MessageElement::NormalField(_) | MessageElement::MapField(_)
        )
    });
    if has_fields {
        w.key(depth + 1, "properties");
    }

    for element in &message.elements {
        let written = match element {
            MessageElement::NormalField(field) => write_field(w, depth + 2, package, field),
            MessageElement::MapField(field) => write_field(w, depth + 2, package, field),
            MessageElement::Oneof(_)
            | MessageElement::Message(_)
            | MessageElement::Enum(_)
            | MessageElement::Reserved(_)
            | MessageElement::Extensions(_)
            | MessageElement::Option(_) => {
                debug!(
                    message = %message.name,
                    kind = element.kind(),
                    "skipping message element"
                );
                stats.elements_skipped += 1;
                continue;
            }
        };
        written.map_err(|e| match e {
            Error::MalformedFieldName(reason) => {
                Error::MalformedFieldName(format!("{reason} (message '{}')", message.name))
            }
            other => other,
        })?;
        stats.fields_emitted += 1;
    }

    stats.messages_emitted += 1;
    Ok(())
}

fn write_field<F: ProtoField + ?Sized>(
    w: &mut YamlWriter,
    depth: usize,
    package: &str,
    field: &F,
) -> Result<()> {
    let property = to_property_name(field.name())?;
    let mapped = proto_to_openapi_type(package, field.type_name());

    w.key(depth, &property);

    let type_depth = if field.repeated() {
        w.entry(depth + 1, "type", "array");
        w.key(depth + 1, "items");
        depth + 2
    } else {
        depth + 1
    };

    if mapped.custom {
        w.entry(type_depth, "$ref", &schema_ref(&mapped.type_name));
    } else {
        w.entry(type_depth, "type", &mapped.type_name);
        if !mapped.format.is_empty() {
            w.entry(type_depth, "format", mapped.format);
        }
    }

    if field
        .option(NULLABLE_OPTION)
        .is_some_and(|option| option.value == "true")
    {
        w.entry(depth + 1, "nullable", "true");
    }

    if let Some(description) = field_description(field) {
        w.description(depth + 1, &description);
    }

    Ok(())
}

/// Merge a field's leading and inline comments into one description.
///
/// Leading lines come first. A single comment is used as is.
fn field_description<F: ProtoField + ?Sized>(field: &F) -> Option<Cow<'_, Comment>> {
    match (field.comment(), field.inline_comment()) {
        (Some(leading), Some(inline)) => Some(Cow::Owned(Comment::new(
            leading.lines.iter().chain(&inline.lines).cloned(),
        ))),
        (Some(only), None) | (None, Some(only)) => Some(Cow::Borrowed(only)),
        (None, None) => None,
    }
}

fn schema_ref(type_name: &str) -> String {
    format!("'#/components/schemas/{type_name}'")
}

/// Write content to a file, creating parent directories as needed.
fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, content).map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{MapField, NormalField, Package, ProtoOption};

    fn field(name: &str, type_name: &str) -> NormalField {
        NormalField {
            name: name.to_string(),
            type_name: type_name.to_string(),
            number: 1,
            ..Default::default()
        }
    }

    fn message(name: &str, elements: Vec<MessageElement>) -> Message {
        Message {
            name: name.to_string(),
            comment: None,
            elements,
        }
    }

    fn package(name: &str) -> Element {
        Element::Package(Package {
            name: name.to_string(),
            comment: None,
        })
    }

    #[test]
    fn scalar_field() {
        assert_eq!(
            emit_field("pkg", &field("user_id", "int64")).unwrap(),
            "userId:\n  type: integer\n  format: int64\n"
        );
        assert_eq!(
            emit_field("pkg", &field("active", "bool")).unwrap(),
            "active:\n  type: boolean\n"
        );
    }

    #[test]
    fn reference_field() {
        assert_eq!(
            emit_field("pkg", &field("home", "Address")).unwrap(),
            "home:\n  $ref: '#/components/schemas/pkg.Address'\n"
        );
    }

    #[test]
    fn repeated_scalar_field() {
        let f = NormalField {
            repeated: true,
            ..field("scores", "double")
        };
        assert_eq!(
            emit_field("pkg", &f).unwrap(),
            "scores:\n  type: array\n  items:\n    type: number\n    format: double\n"
        );
    }

    #[test]
    fn repeated_reference_field() {
        let f = NormalField {
            repeated: true,
            ..field("addresses", "Address")
        };
        assert_eq!(
            emit_field("pkg", &f).unwrap(),
            "addresses:\n  type: array\n  items:\n    $ref: '#/components/schemas/pkg.Address'\n"
        );
    }

    #[test]
    fn map_field_renders_value_type_only() {
        let f = MapField {
            name: "project_ids".to_string(),
            key_type: "string".to_string(),
            type_name: "Project".to_string(),
            number: 1,
            ..Default::default()
        };
        assert_eq!(
            emit_field("pkg", &f).unwrap(),
            "projectIds:\n  $ref: '#/components/schemas/pkg.Project'\n"
        );
    }

    #[test]
    fn nullable_option() {
        let f = NormalField {
            options: vec![ProtoOption {
                name: NULLABLE_OPTION.to_string(),
                value: "true".to_string(),
            }],
            ..field("nickname", "string")
        };
        assert_eq!(
            emit_field("pkg", &f).unwrap(),
            "nickname:\n  type: string\n  nullable: true\n"
        );

        let not_nullable = NormalField {
            options: vec![ProtoOption {
                name: NULLABLE_OPTION.to_string(),
                value: "false".to_string(),
            }],
            ..field("nickname", "string")
        };
        assert_eq!(
            emit_field("pkg", &not_nullable).unwrap(),
            "nickname:\n  type: string\n"
        );
    }

    #[test]
    fn field_descriptions() {
        let leading = NormalField {
            comment: Some(Comment::new([" The login name."])),
            ..field("login", "string")
        };
        assert_eq!(
            emit_field("pkg", &leading).unwrap(),
            "login:\n  type: string\n  description: The login name.\n"
        );

        let inline = NormalField {
            inline_comment: Some(Comment::new([" unique"])),
            ..field("login", "string")
        };
        assert_eq!(
            emit_field("pkg", &inline).unwrap(),
            "login:\n  type: string\n  description: unique\n"
        );
    }

    #[test]
    fn leading_and_inline_comments_merge_into_one_description() {
        let f = NormalField {
            comment: Some(Comment::new([" The login name."])),
            inline_comment: Some(Comment::new([" unique"])),
            ..field("login", "string")
        };
        let out = emit_field("pkg", &f).unwrap();
        assert_eq!(
            out,
            "login:\n  type: string\n  description: |-\n    The login name.\n    unique\n"
        );
        assert_eq!(out.matches("description:").count(), 1);
    }

    #[test]
    fn empty_field_name_is_malformed() {
        let err = emit_field("pkg", &field("", "string")).unwrap_err();
        assert!(matches!(err, Error::MalformedFieldName(_)));

        let msg = message(
            "User",
            vec![MessageElement::NormalField(field("", "string"))],
        );
        let err = emit_message("pkg", &msg).unwrap_err();
        assert!(err.to_string().contains("'User'"), "{err}");
    }

    #[test]
    fn message_with_one_field() {
        let user = message(
            "User",
            vec![MessageElement::NormalField(field("user_name", "string"))],
        );
        assert_eq!(
            emit_message("pkg", &user).unwrap(),
            "pkg.User:\n  type: object\n  properties:\n    userName:\n      type: string\n"
        );
    }

    #[test]
    fn message_description_and_field_order() {
        let msg = Message {
            comment: Some(Comment::new([" A user.", " Has fields."])),
            ..message(
                "User",
                vec![
                    MessageElement::NormalField(field("z_last", "string")),
                    MessageElement::NormalField(field("a_first", "int32")),
                ],
            )
        };
        assert_eq!(
            emit_message("pkg", &msg).unwrap(),
            "pkg.User:\n  type: object\n  description: |-\n    A user.\n    Has fields.\n  properties:\n    zLast:\n      type: string\n    aFirst:\n      type: integer\n      format: int32\n"
        );
    }

    #[test]
    fn message_without_elements_has_no_properties() {
        assert_eq!(
            emit_message("pkg", &message("Empty", vec![])).unwrap(),
            "pkg.Empty:\n  type: object\n"
        );
    }

    #[test]
    fn message_with_only_skipped_elements_has_no_properties() {
        let msg = message(
            "Holder",
            vec![
                MessageElement::Enum(crate::definition::Enum {
                    name: "Kind".to_string(),
                    comment: None,
                }),
                MessageElement::Reserved("1".to_string()),
            ],
        );
        assert_eq!(
            emit_message("pkg", &msg).unwrap(),
            "pkg.Holder:\n  type: object\n"
        );
    }

    #[test]
    fn unsupported_elements_are_skipped() {
        let msg = message(
            "Outer",
            vec![
                MessageElement::Message(message("Inner", vec![])),
                MessageElement::Reserved("2".to_string()),
                MessageElement::NormalField(field("id", "string")),
            ],
        );
        let def = Definition {
            elements: vec![package("pkg"), Element::Message(msg)],
        };
        let (doc, stats) = build_document_with_stats(&def).unwrap();
        assert_eq!(
            doc,
            "  schemas:\n    pkg.Outer:\n      type: object\n      properties:\n        id:\n          type: string\n"
        );
        assert_eq!(
            stats,
            ConversionStats {
                messages_emitted: 1,
                fields_emitted: 1,
                elements_skipped: 2,
            }
        );
    }

    #[test]
    fn last_package_wins() {
        let def = Definition {
            elements: vec![
                package("first"),
                Element::Message(message(
                    "A",
                    vec![MessageElement::NormalField(field("b", "B"))],
                )),
                package("second"),
            ],
        };
        assert_eq!(package_name(&def), Some("second"));
        let doc = build_document(&def).unwrap();
        assert!(doc.contains("second.A:"));
        assert!(doc.contains("'#/components/schemas/second.B'"));
        assert!(!doc.contains("first"));
    }

    #[test]
    fn no_messages_yields_preamble() {
        let def = Definition {
            elements: vec![package("pkg")],
        };
        assert_eq!(build_document(&def).unwrap(), "  schemas:\n");
        assert_eq!(build_document(&Definition::default()).unwrap(), "  schemas:\n");
    }

    #[test]
    fn missing_package_uses_bare_names() {
        let def = Definition {
            elements: vec![Element::Message(message(
                "A",
                vec![MessageElement::NormalField(field("b", "B"))],
            ))],
        };
        assert_eq!(
            build_document(&def).unwrap(),
            "  schemas:\n    A:\n      type: object\n      properties:\n        b:\n          $ref: '#/components/schemas/B'\n"
        );
    }

    #[test]
    fn description_indents_in_document() {
        let msg = Message {
            comment: Some(Comment::new(["one", "two"])),
            ..message(
                "M",
                vec![MessageElement::NormalField(NormalField {
                    comment: Some(Comment::new(["three", "four"])),
                    ..field("f", "string")
                })],
            )
        };
        let def = Definition {
            elements: vec![package("p"), Element::Message(msg)],
        };
        assert_eq!(
            build_document(&def).unwrap(),
            "  schemas:\n    p.M:\n      type: object\n      description: |-\n        one\n        two\n      properties:\n        f:\n          type: string\n          description: |-\n            three\n            four\n"
        );
    }

    #[test]
    fn convert_propagates_parse_errors() {
        let err = convert("message {").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}
