//! Filter clause construction.
//!
//! Turns request parameters into one boolean clause per filtered field:
//! `c["Field"] = literal` for a single value, `c["Field"] IN (...)` for
//! several. Reserved parameters and blank values never produce a clause.

use std::fmt;

use super::field_name::{field_reference, sanitize_field_name};
use super::field_type::{FieldSpec, FieldType, FieldTypeRegistry};
use super::params::{ParamValue, QueryParams, ReservedParameters};
use super::value::{Literal, encode, encode_list};

/// One filter field with its raw values, before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEntry {
    pub field: String,
    pub raw_values: Vec<String>,
    pub is_multi_value: bool,
}

impl FilterEntry {
    /// Interpret a parameter value as a filter.
    ///
    /// A transport-level array is multi-valued as-is; a single string is split
    /// on commas when it contains one. Values are trimmed and blank values
    /// dropped. Returns `None` when nothing usable is left.
    #[must_use]
    pub fn from_param(field: &str, value: &ParamValue) -> Option<Self> {
        let (raw_values, is_multi_value): (Vec<String>, bool) = match value {
            ParamValue::Many(values) => (non_blank(values.iter().map(String::as_str)), true),
            ParamValue::Single(value) if value.contains(',') => {
                (non_blank(value.split(',')), true)
            }
            ParamValue::Single(value) => (non_blank(std::iter::once(value.as_str())), false),
        };

        if raw_values.is_empty() {
            return None;
        }

        Some(Self {
            field: field.to_owned(),
            raw_values,
            is_multi_value,
        })
    }
}

fn non_blank<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .collect()
}

/// The condition applied to a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Equals(Literal),
    In(String),
}

/// One ANDed condition over a sanitized field.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub field: String,
    pub field_type: FieldType,
    pub condition: Condition,
}

impl FilterClause {
    /// Encode a filter entry into a clause.
    #[must_use]
    pub fn from_entry(entry: &FilterEntry, field_types: &FieldTypeRegistry) -> Self {
        let FieldSpec {
            name: field,
            field_type,
        } = field_types.spec_of(&sanitize_field_name(&entry.field));
        let condition = if entry.is_multi_value {
            Condition::In(encode_list(&entry.raw_values, field_type))
        } else {
            Condition::Equals(encode(&entry.raw_values[0], field_type))
        };
        Self {
            field,
            field_type,
            condition,
        }
    }
}

impl fmt::Display for FilterClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reference = field_reference(&self.field);
        match &self.condition {
            Condition::Equals(literal) => write!(f, "{reference} = {literal}"),
            Condition::In(list) => write!(f, "{reference} IN ({list})"),
        }
    }
}

/// Build one clause per non-reserved, non-blank parameter, in request order.
#[must_use]
pub fn build_filter_clauses(
    params: &QueryParams,
    reserved: &ReservedParameters,
    field_types: &FieldTypeRegistry,
) -> Vec<FilterClause> {
    params
        .iter()
        .filter(|(name, _)| !reserved.contains(name))
        .filter_map(|(name, value)| FilterEntry::from_param(name, value))
        .map(|entry| FilterClause::from_entry(&entry, field_types))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(raw: &[(&str, &str)]) -> QueryParams {
        QueryParams::from_pairs(raw.iter().map(|(n, v)| ((*n).to_string(), (*v).to_string())))
    }

    fn rendered(params: &QueryParams) -> Vec<String> {
        build_filter_clauses(
            params,
            &ReservedParameters::default(),
            &FieldTypeRegistry::new(),
        )
        .iter()
        .map(ToString::to_string)
        .collect()
    }

    #[test]
    fn test_comma_values_become_in_lists() {
        let clauses = rendered(&params(&[("Category", "A,B"), ("Year", "2020,2021")]));
        assert_eq!(
            clauses,
            vec![
                "c[\"Category\"] IN ('A','B')",
                "c[\"Year\"] IN (2020,2021)",
            ]
        );
    }

    #[test]
    fn test_single_values_become_equality() {
        let clauses = rendered(&params(&[("Name", "Bob"), ("Year", "2020")]));
        assert_eq!(clauses, vec!["c[\"Name\"] = 'Bob'", "c[\"Year\"] = 2020"]);
    }

    #[test]
    fn test_repeated_parameter_becomes_in_list() {
        let clauses = rendered(&params(&[("Region", "EU"), ("Region", "US")]));
        assert_eq!(clauses, vec!["c[\"Region\"] IN ('EU','US')"]);
    }

    #[test]
    fn test_empty_value_produces_no_clause() {
        assert!(rendered(&params(&[("Name", "")])).is_empty());
        assert!(rendered(&params(&[("Name", "   ")])).is_empty());
        assert!(rendered(&params(&[("Name", ",,")])).is_empty());
    }

    #[test]
    fn test_reserved_parameters_are_ignored() {
        let clauses = rendered(&params(&[
            ("fileId", "42"),
            ("token", "abc"),
            ("limit", "10"),
            ("offset", "5"),
            ("fields", "Year"),
            ("Name", "Bob"),
        ]));
        assert_eq!(clauses, vec!["c[\"Name\"] = 'Bob'"]);
    }

    #[test]
    fn test_field_names_are_sanitized() {
        let clauses = rendered(&params(&[("Unit\"] = 1 OR c[\"Price", "5")]));
        assert_eq!(clauses, vec!["c[\"Unit  1 OR cPrice\"] = '5'"]);
    }

    #[test]
    fn test_fully_invalid_name_still_constrains() {
        let clauses = rendered(&params(&[("'\"", "x")]));
        assert_eq!(clauses, vec!["c[\"\"] = 'x'"]);
    }

    #[test]
    fn test_values_are_escaped() {
        let clauses = rendered(&params(&[("Name", "O'Brien"), ("Tag", "a',b")]));
        assert_eq!(
            clauses,
            vec!["c[\"Name\"] = 'O\\'Brien'", "c[\"Tag\"] IN ('a\\'','b')"]
        );
    }

    #[test]
    fn test_numeric_field_with_non_numeric_value() {
        let clauses = rendered(&params(&[("Year", "2020,unknown")]));
        assert_eq!(clauses, vec!["c[\"Year\"] IN (2020,'unknown')"]);
    }

    #[test]
    fn test_registry_declared_numeric_field() {
        let mut registry = FieldTypeRegistry::new();
        registry.declare("Revenue", FieldType::Numeric);
        let clauses: Vec<String> = build_filter_clauses(
            &params(&[("Revenue", "100")]),
            &ReservedParameters::default(),
            &registry,
        )
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(clauses, vec!["c[\"Revenue\"] = 100"]);
    }

    #[test]
    fn test_filter_entry_from_param() {
        let entry = FilterEntry::from_param("Region", &ParamValue::Single("EU, US".to_string()))
            .expect("entry");
        assert_eq!(
            entry,
            FilterEntry {
                field: "Region".to_string(),
                raw_values: vec!["EU".to_string(), "US".to_string()],
                is_multi_value: true,
            }
        );
        assert!(FilterEntry::from_param("Region", &ParamValue::Many(vec![])).is_none());
    }
}
