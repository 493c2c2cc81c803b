//! Import id normalization.
//!
//! Rows are partitioned by an import id of the form `import_<base>`. Callers
//! sometimes pass the bare base, sometimes the correctly prefixed id, and some
//! producers have stored ids with the prefix applied twice. Instead of
//! migrating data, lookups match against every plausible stored form.

use std::fmt;

/// The prefix every stored import id starts with.
pub const IMPORT_PREFIX: &str = "import_";

const DOUBLE_IMPORT_PREFIX: &str = "import_import_";

/// Strip every leading repetition of `import_`.
#[must_use]
pub fn strip_import_prefixes(raw: &str) -> &str {
    let mut base = raw;
    while let Some(rest) = base.strip_prefix(IMPORT_PREFIX) {
        base = rest;
    }
    base
}

/// The stored partition-key values a raw file identifier may correspond to.
///
/// Only [`normalize_import_id`] builds these. Never empty; the first
/// candidate is always the canonical `import_<base>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportIdCandidates {
    candidates: Vec<String>,
}

impl ImportIdCandidates {
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.candidates
    }
}

impl fmt::Display for ImportIdCandidates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.candidates.join(", "))
    }
}

/// Produce the candidate stored ids for a raw file identifier.
///
/// 1. `import_<base>`, where `base` is `raw` with all leading `import_` removed.
/// 2. `import_<raw>`, unless `raw` already starts with `import_import_` (or the
///    result equals the first candidate).
#[must_use]
pub fn normalize_import_id(raw: &str) -> ImportIdCandidates {
    let canonical = format!("{IMPORT_PREFIX}{}", strip_import_prefixes(raw));
    let mut candidates = vec![canonical];

    if !raw.starts_with(DOUBLE_IMPORT_PREFIX) {
        let literal = format!("{IMPORT_PREFIX}{raw}");
        if literal != candidates[0] {
            candidates.push(literal);
        }
    }

    ImportIdCandidates { candidates }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(raw: &str) -> Vec<String> {
        normalize_import_id(raw).as_slice().to_vec()
    }

    #[test]
    fn test_bare_id() {
        assert_eq!(candidates("42"), vec!["import_42"]);
    }

    #[test]
    fn test_single_prefixed_id_also_matches_double_prefixed_storage() {
        assert_eq!(candidates("import_42"), vec!["import_42", "import_import_42"]);
    }

    #[test]
    fn test_double_prefixed_id_only_yields_canonical() {
        // Regression guard: the double-prefix check must suppress the literal form.
        assert_eq!(candidates("import_import_42"), vec!["import_42"]);
    }

    #[test]
    fn test_many_prefixes_collapse() {
        assert_eq!(candidates("import_import_import_abc"), vec!["import_abc"]);
    }

    #[test]
    fn test_empty_id() {
        assert_eq!(candidates(""), vec!["import_"]);
    }

    #[test]
    fn test_canonical_always_present_and_first() {
        for raw in ["", "x", "import_x", "import_import_x", "importx", "import__x"] {
            let set = normalize_import_id(raw);
            assert!(!set.as_slice().is_empty());
            assert_eq!(set.as_slice()[0], format!("import_{}", strip_import_prefixes(raw)));
        }
    }

    #[test]
    fn test_never_more_than_two_stacked_prefixes() {
        for raw in ["42", "import_42", "import_import_42", "import_import_import_42"] {
            for candidate in normalize_import_id(raw).as_slice() {
                assert!(!candidate.starts_with("import_import_import_"));
            }
        }
    }

    #[test]
    fn test_strip_import_prefixes() {
        assert_eq!(strip_import_prefixes("import_import_7"), "7");
        assert_eq!(strip_import_prefixes("imported_7"), "imported_7");
        assert_eq!(strip_import_prefixes("import_"), "");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            normalize_import_id("import_42").to_string(),
            "[import_42, import_import_42]"
        );
    }
}
