//! Field-level validation errors.
//!
//! Mirrors the Kubernetes API machinery shape: every error names the field
//! path, the offending value and a human-readable detail. Validators push
//! into an [`ErrorList`] and never stop at the first problem; the list is
//! folded into a single [`Aggregate`] when the request is rejected.

use std::fmt;

use serde_json::Value;

/// Dotted path to a field, e.g. `spec.address` or `spec.options[2]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Create a path rooted at `root`.
    pub fn new(root: &str) -> Self {
        Self {
            segments: vec![root.to_string()],
        }
    }

    /// Path to a named child field.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// Path to an element of a list field.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        match segments.last_mut() {
            Some(last) => last.push_str(&format!("[{}]", index)),
            None => segments.push(format!("[{}]", index)),
        }
        Self { segments }
    }

    /// Path to a map entry.
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        match segments.last_mut() {
            Some(last) => last.push_str(&format!("[{}]", key)),
            None => segments.push(format!("[{}]", key)),
        }
        Self { segments }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Kind of field error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorType {
    /// The value is present but not acceptable.
    Invalid,
    /// A required value is missing.
    Required,
    /// The field may not be set.
    Forbidden,
    /// The value is not one of the supported options.
    NotSupported,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorType::Invalid => "Invalid value",
            ErrorType::Required => "Required value",
            ErrorType::Forbidden => "Forbidden",
            ErrorType::NotSupported => "Unsupported value",
        };
        write!(f, "{}", s)
    }
}

/// A single field validation failure.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    pub error_type: ErrorType,
    pub field: FieldPath,
    pub value: Value,
    pub detail: String,
}

impl FieldError {
    /// The value is present but not acceptable.
    pub fn invalid(field: FieldPath, value: impl Into<Value>, detail: &str) -> Self {
        Self {
            error_type: ErrorType::Invalid,
            field,
            value: value.into(),
            detail: detail.to_string(),
        }
    }

    /// A required value is missing.
    pub fn required(field: FieldPath, detail: &str) -> Self {
        Self {
            error_type: ErrorType::Required,
            field,
            value: Value::Null,
            detail: detail.to_string(),
        }
    }

    /// The field may not be set.
    pub fn forbidden(field: FieldPath, detail: &str) -> Self {
        Self {
            error_type: ErrorType::Forbidden,
            field,
            value: Value::Null,
            detail: detail.to_string(),
        }
    }

    /// The value is not among `supported`.
    pub fn not_supported(field: FieldPath, value: impl Into<Value>, supported: &[&str]) -> Self {
        let quoted: Vec<String> = supported.iter().map(|s| format!("\"{}\"", s)).collect();
        Self {
            error_type: ErrorType::NotSupported,
            field,
            value: value.into(),
            detail: format!("supported values: {}", quoted.join(", ")),
        }
    }

    /// Everything after the field path.
    fn body(&self) -> String {
        match self.error_type {
            ErrorType::Required | ErrorType::Forbidden => {
                if self.detail.is_empty() {
                    self.error_type.to_string()
                } else {
                    format!("{}: {}", self.error_type, self.detail)
                }
            }
            _ => {
                let mut body = format!("{}: {}", self.error_type, render_value(&self.value));
                if !self.detail.is_empty() {
                    body.push_str(": ");
                    body.push_str(&self.detail);
                }
                body
            }
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.body())
    }
}

impl std::error::Error for FieldError {}

/// Strings are quoted like Go's `%q`, everything else is printed as JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => quote(s),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Double-quote `s` with Go escaping: printable characters, including
/// non-ASCII ones, are kept as-is; control and non-space whitespace characters
/// become `\xNN`, `\uNNNN` or `\UNNNNNNNN`.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{b}' => out.push_str("\\v"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if c.is_control() || (c.is_whitespace() && c != ' ') => {
                let code = c as u32;
                if code <= 0xffff {
                    out.push_str(&format!("\\u{:04x}", code));
                } else {
                    out.push_str(&format!("\\U{:08x}", code));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Accumulated field errors for one object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErrorList(Vec<FieldError>);

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn extend(&mut self, other: ErrorList) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Fold the list into one error, or `None` when there is nothing to report.
    pub fn to_aggregate(&self) -> Option<Aggregate> {
        if self.0.is_empty() {
            None
        } else {
            Some(Aggregate {
                messages: self.0.iter().map(ToString::to_string).collect(),
            })
        }
    }
}

impl FromIterator<FieldError> for ErrorList {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Several field errors reported as one.
///
/// A single message is shown as-is; several are bracketed and comma-joined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Aggregate {
    messages: Vec<String>,
}

impl Aggregate {
    /// The individual messages, in the order they were reported.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.messages.as_slice() {
            [single] => write!(f, "{}", single),
            many => write!(f, "[{}]", many.join(", ")),
        }
    }
}

impl std::error::Error for Aggregate {}
