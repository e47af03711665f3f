/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Tokenization helpers shared by the section extractors

use super::errors::{InputError, Result};
use std::str::FromStr;

/// Leading whitespace-separated tokens that parse as numbers.
///
/// Stops at the first token that is not a number, so `"1.0 2.0 C 3.0"`
/// yields two values.
pub fn numeric_prefix(line: &str) -> Vec<f64> {
    line.split_whitespace()
        .map_while(|token| token.parse::<f64>().ok())
        .collect()
}

/// Parse one token, reporting the line and the expected shape on failure
pub fn parse_token<T: FromStr>(
    token: Option<&str>,
    expected: &str,
    line_number: usize,
    line: &str,
) -> Result<T> {
    let token = token.ok_or_else(|| InputError::format(line_number, expected, line.trim()))?;
    token
        .parse::<T>()
        .map_err(|_| InputError::format(line_number, expected, token))
}

/// Parse the first token following `marker` on the line.
///
/// Used for the header counts, e.g. `N. OF ATOMS PER CELL   2  COULOMB ...`.
pub fn value_after<T: FromStr>(line: &str, marker: &str, line_number: usize) -> Result<T> {
    let rest = line
        .find(marker)
        .map(|pos| &line[pos + marker.len()..])
        .unwrap_or("");
    parse_token(
        rest.split_whitespace().next(),
        &format!("a value after '{}'", marker),
        line_number,
        line,
    )
}

/// Parse every token on the line as `T`
pub fn parse_all<T: FromStr>(line: &str, expected: &str, line_number: usize) -> Result<Vec<T>> {
    line.split_whitespace()
        .map(|token| parse_token(Some(token), expected, line_number, line))
        .collect()
}
