//! Predicate compilation.
//!
//! A predicate is always anchored by the document kind discriminator, then
//! optionally narrowed to a set of imports and by any number of field clauses:
//!
//! ```text
//! c.documentType = 'excel-row'
//!     AND (c._partitionKey = 'import_42' OR c._partitionKey = 'import_import_42')
//!     AND c["Region"] IN ('EU','US')
//! ```
//!
//! Pagination is deliberately absent here; see `storage::DocumentStore::query_page`.

use std::fmt;

use super::clause::FilterClause;
use super::field_name::field_reference;
use super::value::escape_string;

/// Document attribute holding the discriminator.
pub const DOCUMENT_TYPE_FIELD: &str = "documentType";
/// Document attribute holding the import id rows are partitioned by.
pub const PARTITION_KEY_FIELD: &str = "_partitionKey";

/// The logical kind of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// One spreadsheet row.
    Row,
    /// Metadata describing one imported file.
    Import,
}

impl DocumentKind {
    /// The stored `documentType` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Row => "excel-row",
            Self::Import => "excel-import",
        }
    }

    /// The clause selecting documents of this kind.
    #[must_use]
    pub fn discriminator(self) -> String {
        format!("c.{DOCUMENT_TYPE_FIELD} = '{}'", self.as_str())
    }
}

/// A compiled predicate, ready to be placed after `WHERE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPredicate {
    sql: String,
}

impl CompiledPredicate {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.sql
    }

    /// `SELECT * FROM c WHERE <predicate>`.
    #[must_use]
    pub fn select_all(&self) -> String {
        format!("SELECT * FROM c WHERE {}", self.sql)
    }

    /// Distinct values of one sanitized field among matching documents that
    /// define it.
    #[must_use]
    pub fn select_distinct(&self, sanitized_field: &str) -> String {
        let reference = field_reference(sanitized_field);
        format!(
            "SELECT DISTINCT VALUE {reference} FROM c WHERE {} AND IS_DEFINED({reference})",
            self.sql
        )
    }

    /// Distinct import ids among matching documents.
    #[must_use]
    pub fn select_distinct_import_ids(&self) -> String {
        format!(
            "SELECT DISTINCT VALUE c.{PARTITION_KEY_FIELD} FROM c WHERE {}",
            self.sql
        )
    }
}

impl fmt::Display for CompiledPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Render the ORed import-id segment, e.g. `(c._partitionKey = 'a' OR ...)`.
fn import_segment(import_ids: &[String]) -> String {
    if import_ids.is_empty() {
        // Contradicts the discriminator, so nothing matches.
        return format!("NOT IS_DEFINED(c.{DOCUMENT_TYPE_FIELD})");
    }
    let alternatives: Vec<String> = import_ids
        .iter()
        .map(|id| format!("c.{PARTITION_KEY_FIELD} = '{}'", escape_string(id)))
        .collect();
    format!("({})", alternatives.join(" OR "))
}

/// Assemble the final predicate.
///
/// `import_ids` are matched literally: pass the normalizer's candidates for a
/// caller-supplied id, or partition keys read back from storage. `None`
/// queries across every import; an empty slice matches nothing.
#[must_use]
pub fn compile(
    kind: DocumentKind,
    import_ids: Option<&[String]>,
    clauses: &[FilterClause],
) -> CompiledPredicate {
    let mut segments = Vec::with_capacity(clauses.len() + 2);
    segments.push(kind.discriminator());
    if let Some(import_ids) = import_ids {
        segments.push(import_segment(import_ids));
    }
    segments.extend(clauses.iter().map(ToString::to_string));

    let sql = segments.join(" AND ");
    tracing::trace!(predicate = %sql, "compiled predicate");
    CompiledPredicate { sql }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::clause::build_filter_clauses;
    use crate::filter::field_type::FieldTypeRegistry;
    use crate::filter::import_id::normalize_import_id;
    use crate::filter::params::{QueryParams, ReservedParameters};

    fn clauses(raw: &[(&str, &str)]) -> Vec<FilterClause> {
        let params =
            QueryParams::from_pairs(raw.iter().map(|(n, v)| ((*n).to_string(), (*v).to_string())));
        build_filter_clauses(&params, &ReservedParameters::default(), &FieldTypeRegistry::new())
    }

    #[test]
    fn test_discriminator_only() {
        let predicate = compile(DocumentKind::Row, None, &[]);
        assert_eq!(predicate.as_str(), "c.documentType = 'excel-row'");
    }

    #[test]
    fn test_import_segment_is_ored() {
        let candidates = normalize_import_id("import_42");
        let predicate = compile(DocumentKind::Row, Some(candidates.as_slice()), &[]);
        assert_eq!(
            predicate.as_str(),
            "c.documentType = 'excel-row' AND \
             (c._partitionKey = 'import_42' OR c._partitionKey = 'import_import_42')"
        );
    }

    #[test]
    fn test_double_prefixed_file_id_end_to_end() {
        let candidates = normalize_import_id("import_import_42");
        let predicate = compile(DocumentKind::Row, Some(candidates.as_slice()), &[]);
        assert_eq!(
            predicate.as_str(),
            "c.documentType = 'excel-row' AND (c._partitionKey = 'import_42')"
        );
    }

    #[test]
    fn test_full_predicate() {
        let candidates = normalize_import_id("7");
        let predicate = compile(
            DocumentKind::Row,
            Some(candidates.as_slice()),
            &clauses(&[("Category", "A,B"), ("Year", "2020")]),
        );
        assert_eq!(
            predicate.as_str(),
            "c.documentType = 'excel-row' AND (c._partitionKey = 'import_7') \
             AND c[\"Category\"] IN ('A','B') AND c[\"Year\"] = 2020"
        );
    }

    #[test]
    fn test_import_ids_are_escaped() {
        let candidates = normalize_import_id("x' OR '1'='1");
        let predicate = compile(DocumentKind::Row, Some(candidates.as_slice()), &[]);
        assert!(predicate.as_str().contains("'import_x\\' OR \\'1\\'=\\'1'"));
    }

    #[test]
    fn test_stored_ids_are_matched_literally() {
        let stored = vec!["import_a1".to_string(), "import_import_b2".to_string()];
        let predicate = compile(DocumentKind::Import, Some(stored.as_slice()), &[]);
        assert_eq!(
            predicate.as_str(),
            "c.documentType = 'excel-import' AND \
             (c._partitionKey = 'import_a1' OR c._partitionKey = 'import_import_b2')"
        );
    }

    #[test]
    fn test_empty_import_ids_match_nothing() {
        let predicate = compile(DocumentKind::Import, Some(Vec::new().as_slice()), &[]);
        assert_eq!(
            predicate.as_str(),
            "c.documentType = 'excel-import' AND NOT IS_DEFINED(c.documentType)"
        );
    }

    #[test]
    fn test_import_kind_discriminator() {
        let predicate = compile(DocumentKind::Import, None, &[]);
        assert_eq!(predicate.to_string(), "c.documentType = 'excel-import'");
    }

    #[test]
    fn test_select_statements() {
        let predicate = compile(DocumentKind::Row, None, &[]);
        assert_eq!(
            predicate.select_all(),
            "SELECT * FROM c WHERE c.documentType = 'excel-row'"
        );
        assert_eq!(
            predicate.select_distinct("Year"),
            "SELECT DISTINCT VALUE c[\"Year\"] FROM c WHERE c.documentType = 'excel-row' \
             AND IS_DEFINED(c[\"Year\"])"
        );
        assert_eq!(
            predicate.select_distinct_import_ids(),
            "SELECT DISTINCT VALUE c._partitionKey FROM c WHERE c.documentType = 'excel-row'"
        );
    }
}
