//! Request query parameters.
//!
//! The transport hands us ordered `(name, value)` pairs. Repeated names are
//! folded into a multi-valued entry so that `?Region=EU&Region=US` and
//! `?Region=EU,US` end up meaning the same thing.

use std::collections::{HashMap, HashSet};

/// A query parameter value as produced by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// The parameter appeared once.
    Single(String),
    /// The parameter appeared several times.
    Many(Vec<String>),
}

impl ParamValue {
    /// The first value, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Many(values) => values.first().map(String::as_str),
        }
    }

    /// Every non-blank value, splitting each one on commas.
    #[must_use]
    pub fn comma_separated(&self) -> Vec<String> {
        let values: &[String] = match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        };
        values
            .iter()
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
            .collect()
    }

    fn push(&mut self, value: String) {
        match self {
            Self::Single(first) => {
                *self = Self::Many(vec![std::mem::take(first), value]);
            }
            Self::Many(values) => values.push(value),
        }
    }
}

/// Ordered query parameters, keyed by first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, ParamValue)>,
    /// Name to index into `entries`.
    positions: HashMap<String, usize>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold raw pairs into parameters, merging repeated names.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut params = Self::new();
        for (name, value) in pairs {
            params.insert(name, value);
        }
        params
    }

    /// Add a value; a repeated name turns the entry into [`ParamValue::Many`].
    pub fn insert(&mut self, name: String, value: String) {
        if let Some(&index) = self.positions.get(&name) {
            self.entries[index].1.push(value);
        } else {
            self.positions.insert(name.clone(), self.entries.len());
            self.entries.push((name, ParamValue::Single(value)));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.positions.get(name).map(|&index| &self.entries[index].1)
    }

    /// The first value of a parameter, ignoring blank values.
    #[must_use]
    pub fn first_non_blank(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(ParamValue::first)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parameter names that control a request and are never treated as filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedParameters {
    names: HashSet<String>,
}

impl ReservedParameters {
    /// The reserved names of the row endpoints.
    pub const DEFAULT_NAMES: [&'static str; 5] = ["fileId", "token", "limit", "offset", "fields"];

    #[must_use]
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            names: names.into_iter().map(str::to_owned).collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

impl Default for ReservedParameters {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAMES)
    }
}
