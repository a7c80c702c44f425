//! Protobuf definition tree.
//!
//! Produced by [`crate::parser`] and consumed read-only by [`crate::codegen`].
//! The tree keeps declarations in source order; nothing is merged, resolved,
//! or validated.

/// A parsed `.proto` file: its top-level declarations in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definition {
    pub elements: Vec<Element>,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// `syntax = "proto3";`
    Syntax(String),
    /// `edition = "2023";`
    Edition(String),
    Package(Package),
    Import(Import),
    Option(ProtoOption),
    Message(Message),
    Enum(Enum),
    Service(Service),
    /// `extend <type> { ... }`; the body is not represented.
    Extend(String),
}

impl Element {
    /// Short declaration keyword, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Syntax(_) => "syntax",
            Element::Edition(_) => "edition",
            Element::Package(_) => "package",
            Element::Import(_) => "import",
            Element::Option(_) => "option",
            Element::Message(_) => "message",
            Element::Enum(_) => "enum",
            Element::Service(_) => "service",
            Element::Extend(_) => "extend",
        }
    }
}

/// `package foo.bar;`
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    /// Dotted namespace (e.g., `"acme.billing.v1"`).
    pub name: String,
    pub comment: Option<Comment>,
}

/// `import [weak|public] "path";`
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub path: String,
    /// `"weak"` or `"public"` when present.
    pub kind: Option<String>,
}

/// An `option name = value;` statement or a `[name = value]` field option.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtoOption {
    /// Option name as written, including parentheses for extensions
    /// (e.g., `"(gogoproto.nullable)"`).
    pub name: String,
    /// Constant source text. String literals are stored without quotes.
    pub value: String,
}

/// A `message` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub name: String,
    pub comment: Option<Comment>,
    /// Body elements in declaration order.
    pub elements: Vec<MessageElement>,
}

/// An element inside a message body.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageElement {
    NormalField(NormalField),
    MapField(MapField),
    Oneof(Oneof),
    Message(Message),
    Enum(Enum),
    /// `reserved ...;` with the raw range or name list.
    Reserved(String),
    /// `extensions ...;` with the raw range list.
    Extensions(String),
    Option(ProtoOption),
}

impl MessageElement {
    /// Short element keyword, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            MessageElement::NormalField(_) => "field",
            MessageElement::MapField(_) => "map",
            MessageElement::Oneof(_) => "oneof",
            MessageElement::Message(_) => "message",
            MessageElement::Enum(_) => "enum",
            MessageElement::Reserved(_) => "reserved",
            MessageElement::Extensions(_) => "extensions",
            MessageElement::Option(_) => "option",
        }
    }
}

/// A scalar or message-typed field, optionally labelled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalField {
    /// Snake_case identifier (e.g., `"user_name"`).
    pub name: String,
    /// Scalar type name or (possibly dotted) message type name.
    pub type_name: String,
    pub number: u32,
    pub repeated: bool,
    pub optional: bool,
    pub required: bool,
    pub options: Vec<ProtoOption>,
    /// Comment block directly above the field.
    pub comment: Option<Comment>,
    /// Comment trailing the field on the same line.
    pub inline_comment: Option<Comment>,
}

/// `map<K, V> name = N;`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapField {
    pub name: String,
    pub key_type: String,
    /// The map's value type.
    pub type_name: String,
    pub number: u32,
    pub options: Vec<ProtoOption>,
    pub comment: Option<Comment>,
    pub inline_comment: Option<Comment>,
}

/// `oneof name { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Oneof {
    pub name: String,
    pub comment: Option<Comment>,
    pub fields: Vec<NormalField>,
}

/// An `enum` declaration. Values are not represented.
#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: String,
    pub comment: Option<Comment>,
}

/// A `service` declaration. Methods are not represented.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub name: String,
    pub comment: Option<Comment>,
}

/// A source comment, one entry per physical line, delimiters stripped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comment {
    pub lines: Vec<String>,
}

impl Comment {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// The comment's text: its lines joined with newlines.
    pub fn message(&self) -> String {
        self.lines.join("\n")
    }
}

/// Read access shared by normal and map fields.
///
/// Map fields report their value type as [`ProtoField::type_name`] and are
/// never repeated.
pub trait ProtoField {
    fn name(&self) -> &str;
    fn type_name(&self) -> &str;
    fn repeated(&self) -> bool;
    fn options(&self) -> &[ProtoOption];
    fn comment(&self) -> Option<&Comment>;
    fn inline_comment(&self) -> Option<&Comment>;

    /// Look up a field option by its exact name.
    fn option(&self, name: &str) -> Option<&ProtoOption> {
        self.options().iter().find(|o| o.name == name)
    }
}

impl ProtoField for NormalField {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn repeated(&self) -> bool {
        self.repeated
    }

    fn options(&self) -> &[ProtoOption] {
        &self.options
    }

    fn comment(&self) -> Option<&Comment> {
        self.comment.as_ref()
    }

    fn inline_comment(&self) -> Option<&Comment> {
        self.inline_comment.as_ref()
    }
}

impl ProtoField for MapField {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn repeated(&self) -> bool {
        false
    }

    fn options(&self) -> &[ProtoOption] {
        &self.options
    }

    fn comment(&self) -> Option<&Comment> {
        self.comment.as_ref()
    }

    fn inline_comment(&self) -> Option<&Comment> {
        self.inline_comment.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_message_joins_lines() {
        assert_eq!(Comment::new(["Hello"]).message(), "Hello");
        assert_eq!(Comment::new(["a", " b", ""]).message(), "a\n b\n");
        assert_eq!(Comment::default().message(), "");
    }

    #[test]
    fn map_field_reports_value_type() {
        let field = MapField {
            name: "labels".to_string(),
            key_type: "string".to_string(),
            type_name: "int64".to_string(),
            number: 1,
            ..Default::default()
        };
        assert_eq!(ProtoField::type_name(&field), "int64");
        assert!(!ProtoField::repeated(&field));
    }

    #[test]
    fn option_lookup_by_name() {
        let field = NormalField {
            name: "id".to_string(),
            type_name: "string".to_string(),
            options: vec![ProtoOption {
                name: "(gogoproto.nullable)".to_string(),
                value: "true".to_string(),
            }],
            ..Default::default()
        };
        assert_eq!(
            field.option("(gogoproto.nullable)").map(|o| o.value.as_str()),
            Some("true")
        );
        assert!(field.option("deprecated").is_none());
    }
}
