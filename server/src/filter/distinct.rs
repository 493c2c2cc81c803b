//! Distinct value extraction for filter pickers.
//!
//! One DISTINCT query is issued per requested field, sequentially, each scoped
//! by the same predicate. Results drop nulls and blank strings; numeric fields
//! are coerced to numbers and values that fail coercion are dropped.
//!
//! Failure policy: the whole extraction fails on the first storage error. A
//! caller never receives a map where some fields silently came back empty
//! because their query failed.

use serde_json::{Map, Number, Value};

use super::compiler::CompiledPredicate;
use super::field_name::sanitize_field_name;
use super::field_type::{FieldType, FieldTypeRegistry};
use super::value::parse_number;
use crate::storage::{DocumentStore, StorageError};

/// Error returned when extracting distinct values fails.
#[derive(Debug)]
pub struct DistinctError {
    /// The requested field whose query failed.
    pub field: String,
    pub source: StorageError,
}

impl std::fmt::Display for DistinctError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "distinct value query for field '{}' failed: {}",
            self.field, self.source
        )
    }
}

impl std::error::Error for DistinctError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Convert a finite float into a JSON number, preferring the integer form.
#[allow(clippy::cast_possible_truncation)]
fn to_json_number(n: f64) -> Option<Number> {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Some(Number::from(n as i64));
    }
    Number::from_f64(n)
}

fn coerce_number(value: &Value) -> Option<Value> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_number(s)?,
        _ => return None,
    };
    to_json_number(n).map(Value::Number)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Post-filter the raw distinct values of one field.
///
/// Order follows the storage result. Coercion can map several raw values to
/// the same number (`"2020"` and `2020`); only the first is kept.
#[must_use]
pub fn retain_distinct_values(raw: Vec<Value>, field_type: FieldType) -> Vec<Value> {
    let present = raw.into_iter().filter(|v| !is_blank(v));
    match field_type {
        FieldType::String => present.collect(),
        FieldType::Numeric => {
            let mut values: Vec<Value> = Vec::new();
            for value in present.filter_map(|v| coerce_number(&v)) {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
            values
        }
    }
}

/// Extract the distinct values of each requested field.
///
/// Keys of the returned map are the requested field names as given; queries
/// use their sanitized form. A field requested twice is extracted once.
pub async fn extract_distinct(
    store: &dyn DocumentStore,
    predicate: &CompiledPredicate,
    fields: &[String],
    field_types: &FieldTypeRegistry,
) -> Result<Map<String, Value>, DistinctError> {
    let mut result = Map::new();

    for field in fields {
        if result.contains_key(field) {
            continue;
        }

        let spec = field_types.spec_of(&sanitize_field_name(field));
        let sql = predicate.select_distinct(&spec.name);
        tracing::debug!(
            field = %spec.name,
            field_type = %spec.field_type,
            "extracting distinct values"
        );

        let raw = store.query(&sql).await.map_err(|source| DistinctError {
            field: field.to_owned(),
            source,
        })?;
        let values = retain_distinct_values(raw, spec.field_type);
        result.insert(field.to_owned(), Value::Array(values));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_year_values_are_coerced_and_filtered() {
        let raw = vec![json!("2020"), json!("abc"), json!(""), json!(null), json!("2021")];
        assert_eq!(
            retain_distinct_values(raw, FieldType::Numeric),
            vec![json!(2020), json!(2021)]
        );
    }

    #[test]
    fn test_coercion_collapses_duplicates() {
        let raw = vec![json!(2020), json!("2020"), json!(" 2020 "), json!(2019.5)];
        assert_eq!(
            retain_distinct_values(raw, FieldType::Numeric),
            vec![json!(2020), json!(2019.5)]
        );
    }

    #[test]
    fn test_numeric_drops_non_scalar_values() {
        let raw = vec![json!(true), json!([2020]), json!({"y": 2020}), json!(1)];
        assert_eq!(retain_distinct_values(raw, FieldType::Numeric), vec![json!(1)]);
    }

    #[test]
    fn test_string_values_keep_type_and_order() {
        let raw = vec![json!("EU"), json!("  "), json!(null), json!(3), json!(false)];
        assert_eq!(
            retain_distinct_values(raw, FieldType::String),
            vec![json!("EU"), json!(3), json!(false)]
        );
    }

    #[test]
    fn test_to_json_number() {
        assert_eq!(to_json_number(2020.0), Some(Number::from(2020)));
        assert_eq!(to_json_number(-3.0), Some(Number::from(-3)));
        assert_eq!(to_json_number(0.5), Number::from_f64(0.5));
    }

    #[test]
    fn test_distinct_error_display() {
        let error = DistinctError {
            field: "Year".to_string(),
            source: StorageError::Timeout,
        };
        assert_eq!(
            error.to_string(),
            "distinct value query for field 'Year' failed: storage query timed out"
        );
    }
}
