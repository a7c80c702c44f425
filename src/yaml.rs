//! YAML text emission.
//!
//! [`YamlWriter`] owns the output buffer and is the only place that decides
//! indentation: callers pass a nesting depth, and the writer renders two
//! spaces per level. Description values go through
//! [`format_comment`], which picks between a plain scalar and a `|-` literal
//! block.

use std::borrow::Cow;

use crate::definition::Comment;

/// Spaces per nesting level.
pub const INDENT_WIDTH: usize = 2;

/// Characters that cannot start a plain YAML scalar.
const INDICATORS: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`',
];

/// Plain scalars that YAML would not read back as strings.
const RESERVED_WORDS: &[&str] = &[
    "true", "false", "yes", "no", "on", "off", "y", "n", "null", "~",
];

/// A growable YAML document buffer.
#[derive(Debug, Default)]
pub struct YamlWriter {
    out: String,
}

impl YamlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `key:` opening a nested mapping.
    pub fn key(&mut self, depth: usize, key: &str) {
        self.indent(depth);
        self.out.push_str(key);
        self.out.push_str(":\n");
    }

    /// Write `key: value`. The value is emitted verbatim.
    pub fn entry(&mut self, depth: usize, key: &str, value: &str) {
        self.indent(depth);
        self.out.push_str(key);
        self.out.push_str(": ");
        self.out.push_str(value);
        self.out.push('\n');
    }

    /// Write `description: ...` for a comment, block lines nested one level
    /// below the key.
    pub fn description(&mut self, depth: usize, comment: &Comment) {
        let block_indent = (depth + 1) * INDENT_WIDTH;
        self.indent(depth);
        self.out.push_str("description: ");
        self.out.push_str(&format_comment(Some(comment), block_indent));
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn indent(&mut self, depth: usize) {
        let width = depth * INDENT_WIDTH;
        self.out.extend(std::iter::repeat_n(' ', width));
    }
}

/// Render a comment as the value of a YAML `description` key.
///
/// - `None` renders as an empty string.
/// - A comment with at most one line renders as its trimmed text followed by
///   a newline, single-quoted only when the text would not survive as a
///   plain scalar.
/// - Longer comments render as a `|-` literal block, one trimmed line per
///   non-blank source line, each prefixed with `indent` spaces. Blank lines
///   are dropped.
pub fn format_comment(comment: Option<&Comment>, indent: usize) -> String {
    let Some(comment) = comment else {
        return String::new();
    };

    if comment.lines.len() > 1 {
        let pad = " ".repeat(indent);
        let mut out = String::from("|-\n");
        for line in comment.lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
            out.push_str(&pad);
            out.push_str(line);
            out.push('\n');
        }
        out
    } else {
        let text = comment.message();
        format!("{}\n", plain_scalar(text.trim()))
    }
}

/// Return `text` unchanged if it reads back as the same plain string,
/// otherwise a single-quoted scalar.
pub fn plain_scalar(text: &str) -> Cow<'_, str> {
    if needs_quoting(text) {
        Cow::Owned(format!("'{}'", text.replace('\'', "''")))
    } else {
        Cow::Borrowed(text)
    }
}

fn needs_quoting(text: &str) -> bool {
    let Some(first) = text.chars().next() else {
        return true;
    };
    INDICATORS.contains(&first)
        || text.contains(": ")
        || text.contains(" #")
        || text.contains('\t')
        || text.ends_with(':')
        || RESERVED_WORDS.contains(&text.to_ascii_lowercase().as_str())
        || is_yaml_number(text)
}

/// Plain scalars that a YAML 1.2 core-schema reader resolves to a number.
fn is_yaml_number(text: &str) -> bool {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    text.parse::<f64>().is_ok()
        || matches!(unsigned, ".inf" | ".Inf" | ".INF")
        || matches!(text, ".nan" | ".NaN" | ".NAN")
        || text
            .strip_prefix("0x")
            .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit()))
        || text
            .strip_prefix("0o")
            .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| matches!(c, '0'..='7')))
}
