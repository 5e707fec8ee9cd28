//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Uppercases the first character.
///
/// Usage in templates: `{{ category|capitalize_first }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn capitalize_first(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let value = value.to_string();
    let mut chars = value.chars();
    Ok(chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    }))
}

/// Star rating rounded to one decimal place.
///
/// Usage in templates: `{{ product.rating.rate|rating }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn rating(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let value = value.to_string();
    Ok(value
        .parse::<f64>()
        .map_or(value, |rate| format!("{rate:.1}")))
}
