//! Field type inference.
//!
//! Filter values arrive as strings, so the compiler needs to know whether a
//! field should be compared as a number or as text. Callers may declare types
//! explicitly through a [`FieldTypeRegistry`]; undeclared fields fall back to a
//! naming heuristic where any name containing "year" is numeric.

use std::collections::HashMap;
use std::fmt;

use super::field_name::sanitize_field_name;

/// The comparison type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Values are compared as numbers when they parse as one.
    Numeric,
    /// Values are always compared as quoted strings.
    String,
}

impl FieldType {
    /// Infer a field type from the field name alone.
    #[must_use]
    pub fn infer(name: &str) -> Self {
        if name.to_ascii_lowercase().contains("year") {
            Self::Numeric
        } else {
            Self::String
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::String => write!(f, "string"),
        }
    }
}

/// Parse one `name:type` entry.
fn parse_spec(entry: &str) -> Result<FieldSpec, FieldTypeError> {
    let Some((name, declared)) = entry.rsplit_once(':') else {
        return Err(FieldTypeError::MalformedEntry(entry.to_owned()));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(FieldTypeError::MalformedEntry(entry.to_owned()));
    }
    let field_type = match declared.trim().to_ascii_lowercase().as_str() {
        "numeric" | "number" => FieldType::Numeric,
        "string" | "text" => FieldType::String,
        _ => {
            return Err(FieldTypeError::UnknownType {
                field: name.to_owned(),
                declared: declared.trim().to_owned(),
            });
        }
    };
    Ok(FieldSpec {
        name: name.to_owned(),
        field_type,
    })
}

/// A field name together with its comparison type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
}

/// Error returned when parsing field type declarations fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTypeError {
    /// An entry is not of the form `name:type`.
    MalformedEntry(String),
    /// The type part of an entry is not `numeric` or `string`.
    UnknownType { field: String, declared: String },
}

impl fmt::Display for FieldTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedEntry(entry) => {
                write!(f, "malformed field type entry '{entry}' (expected name:type)")
            }
            Self::UnknownType { field, declared } => {
                write!(
                    f,
                    "unknown type '{declared}' for field '{field}' (expected numeric or string)"
                )
            }
        }
    }
}

impl std::error::Error for FieldTypeError {}

/// Explicit field type declarations with heuristic fallback.
///
/// Declarations are keyed by sanitized field name, so a declaration matches
/// exactly the identifier the compiler will emit.
#[derive(Debug, Clone, Default)]
pub struct FieldTypeRegistry {
    declared: HashMap<String, FieldType>,
}

impl FieldTypeRegistry {
    /// Create an empty registry; every lookup uses the heuristic.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from explicit field specs.
    #[must_use]
    pub fn from_specs(specs: impl IntoIterator<Item = FieldSpec>) -> Self {
        let mut registry = Self::new();
        for spec in specs {
            registry.declare(&spec.name, spec.field_type);
        }
        registry
    }

    /// Parse declarations of the form `Revenue:numeric,Region:string`.
    ///
    /// Whitespace around entries, names and types is ignored, as are empty
    /// entries. Type names are case-insensitive.
    pub fn parse(declarations: &str) -> Result<Self, FieldTypeError> {
        let specs = declarations
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(parse_spec)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_specs(specs))
    }

    /// Declare the type of a field, replacing any earlier declaration.
    pub fn declare(&mut self, name: &str, field_type: FieldType) {
        self.declared.insert(sanitize_field_name(name), field_type);
    }

    /// Look up the type of a sanitized field name.
    #[must_use]
    pub fn type_of(&self, sanitized: &str) -> FieldType {
        self.declared
            .get(sanitized)
            .copied()
            .unwrap_or_else(|| FieldType::infer(sanitized))
    }

    /// Resolve the [`FieldSpec`] of a sanitized field name.
    #[must_use]
    pub fn spec_of(&self, sanitized: &str) -> FieldSpec {
        FieldSpec {
            name: sanitized.to_owned(),
            field_type: self.type_of(sanitized),
        }
    }

    /// Number of explicit declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declared.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }
}
