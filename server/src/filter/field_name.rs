//! Field name sanitization.
//!
//! Field names arrive as raw query-string keys and are interpolated into the
//! predicate as document paths. The store's query language has no parameter
//! binding for identifiers, so this allow-list is the only thing standing
//! between a query-string key and the predicate text.
//!
//! # Invariants
//!
//! - The output only contains ASCII letters, digits, space, `_` and `-`.
//! - Sanitization is idempotent.
//! - Sanitization never fails; unsafe input degrades to a partial or empty name.

/// Returns true if `c` may appear in a field reference.
const fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-')
}

/// Remove every character outside the field name allow-list.
#[must_use]
pub fn sanitize_field_name(raw: &str) -> String {
    raw.chars().filter(|&c| is_allowed(c)).collect()
}

/// Render a sanitized field name as a bracketed document path, e.g. `c["Unit Price"]`.
///
/// Callers must pass a name produced by [`sanitize_field_name`]; the allow-list
/// guarantees the name cannot contain a `"` or `\`.
#[must_use]
pub fn field_reference(sanitized: &str) -> String {
    debug_assert!(sanitized.chars().all(is_allowed));
    format!("c[\"{sanitized}\"]")
}
