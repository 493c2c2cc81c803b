//! Filter-to-predicate compiler.
//!
//! Every row endpoint funnels its query string through this module:
//!
//! 1. [`QueryParams`] folds the raw query pairs (repeated keys become arrays).
//! 2. [`build_filter_clauses`] drops reserved and blank parameters, sanitizes
//!    field names and encodes values by field type.
//! 3. [`normalize_import_id`] expands the file identifier into the stored
//!    partition keys it may correspond to.
//! 4. [`compile`] anchors everything on the document kind discriminator.
//!
//! Results travel the other way through [`sanitize_document`], and filter
//! pickers use [`extract_distinct`].
//!
//! # Example
//!
//! ```ignore
//! let params = QueryParams::from_pairs(pairs);
//! let clauses = build_filter_clauses(&params, &ReservedParameters::default(), &registry);
//! let candidates = params.first_non_blank("fileId").map(normalize_import_id);
//! let predicate = compile(
//!     DocumentKind::Row,
//!     candidates.as_ref().map(ImportIdCandidates::as_slice),
//!     &clauses,
//! );
//! let rows = store.query(&predicate.select_all()).await?;
//! ```
//!
//! Nothing in here rejects input. Unsafe field names are reduced to their
//! allowed characters, which at worst yields a predicate that matches nothing.

pub mod clause;
pub mod compiler;
pub mod distinct;
pub mod document;
pub mod field_name;
pub mod field_type;
pub mod import_id;
pub mod params;
pub mod value;

pub use clause::{Condition, FilterClause, FilterEntry, build_filter_clauses};
pub use compiler::{CompiledPredicate, DocumentKind, PARTITION_KEY_FIELD, compile};
pub use distinct::{DistinctError, extract_distinct, retain_distinct_values};
pub use document::{is_internal_key, sanitize_document, sanitize_results};
pub use field_name::sanitize_field_name;
pub use field_type::{FieldSpec, FieldType, FieldTypeError, FieldTypeRegistry};
pub use import_id::{IMPORT_PREFIX, ImportIdCandidates, normalize_import_id};
pub use params::{ParamValue, QueryParams, ReservedParameters};
pub use value::{Literal, encode};
