//! End-to-end tests at the handler level.
//!
//! Each test file covers one scenario, driving the HTTP handlers directly
//! against the fixture store and checking the full response envelope.

#![cfg(test)]

mod helpers;

mod test_auth;
mod test_distinct_values;
mod test_files_by_filter;
mod test_filters;
mod test_import_id_normalization;
mod test_imports;
mod test_many_filters;
mod test_pagination;
mod test_rows_by_file;
mod test_sanitization;
