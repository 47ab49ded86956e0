//! Raw upstream responses and the transformers that normalize them.
//!
//! Vendors return JSON of loosely known shape. Each source wraps the decoded
//! body in its own [`RawResponse`] variant; its [`Transformer`] maps that onto
//! a canonical [`Payload`]. Transformers are total over missing or mistyped
//! fields: they substitute defaults instead of failing. The only case they
//! reject is a missing top-level container, which the calling source reports
//! as a parse error.

use serde_json::Value;

use crate::{Payload, ResourceKind, Sport, UNKNOWN};

/// Decoded upstream body, tagged with the source family it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    Backend(Value),
    SportsData(Value),
    OddsApi(Value),
    Espn(Value),
    /// Canned body used by fixtures and custom sources.
    Fixture(Value),
}

impl RawResponse {
    pub const fn family(&self) -> &'static str {
        match self {
            Self::Backend(_) => "backend",
            Self::SportsData(_) => "sportsdata",
            Self::OddsApi(_) => "odds_api",
            Self::Espn(_) => "espn",
            Self::Fixture(_) => "fixture",
        }
    }

    pub const fn body(&self) -> &Value {
        match self {
            Self::Backend(body)
            | Self::SportsData(body)
            | Self::OddsApi(body)
            | Self::Espn(body)
            | Self::Fixture(body) => body,
        }
    }
}

/// Normalizes one source's raw responses into canonical payloads.
pub trait Transformer: Send + Sync {
    /// Returns `None` only when the response lacks its required top-level
    /// container or belongs to another source family.
    fn transform(&self, kind: ResourceKind, sport: Option<Sport>, raw: &RawResponse)
        -> Option<Payload>;
}

/// Lenient accessors over `serde_json::Value`.
///
/// Upstreams disagree on types (ESPN sends scores as strings, some vendors
/// send ids as numbers), so each accessor accepts any reasonable encoding.
pub mod fields {
    use serde_json::Value;

    use super::UNKNOWN;
    use crate::UtcDateTime;

    /// Follows a `/`-separated path through objects and array indices.
    pub fn at<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
        path.split('/').try_fold(value, |current, segment| {
            match segment.parse::<usize>() {
                Ok(index) if current.is_array() => current.get(index),
                _ => current.get(segment),
            }
        })
    }

    /// First path that resolves to a non-null value.
    pub fn first<'a>(value: &'a Value, paths: &[&str]) -> Option<&'a Value> {
        paths
            .iter()
            .filter_map(|path| at(value, path))
            .find(|found| !found.is_null())
    }

    pub fn opt_string(value: &Value, paths: &[&str]) -> Option<String> {
        match first(value, paths)? {
            Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    /// Timestamp rendered as RFC3339 UTC when recognized, verbatim otherwise.
    pub fn opt_timestamp(value: &Value, paths: &[&str]) -> Option<String> {
        let text = opt_string(value, paths)?;
        Some(UtcDateTime::from_upstream(&text).map_or(text, UtcDateTime::format_rfc3339))
    }

    pub fn string_or(value: &Value, paths: &[&str], default: &str) -> String {
        opt_string(value, paths).unwrap_or_else(|| default.to_owned())
    }

    /// String field defaulting to `"Unknown"`.
    pub fn name(value: &Value, paths: &[&str]) -> String {
        string_or(value, paths, UNKNOWN)
    }

    pub fn opt_f64(value: &Value, paths: &[&str]) -> Option<f64> {
        let number = match first(value, paths)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().trim_start_matches('+').parse::<f64>().ok(),
            _ => None,
        }?;
        number.is_finite().then_some(number)
    }

    pub fn f64_or_zero(value: &Value, paths: &[&str]) -> f64 {
        opt_f64(value, paths).unwrap_or(0.0)
    }

    pub fn opt_u32(value: &Value, paths: &[&str]) -> Option<u32> {
        let number = opt_f64(value, paths)?;
        (number >= 0.0 && number <= f64::from(u32::MAX)).then_some(number as u32)
    }

    pub fn u32_or_zero(value: &Value, paths: &[&str]) -> u32 {
        opt_u32(value, paths).unwrap_or(0)
    }

    pub fn opt_i32(value: &Value, paths: &[&str]) -> Option<i32> {
        let number = opt_f64(value, paths)?;
        (number >= f64::from(i32::MIN) && number <= f64::from(i32::MAX))
            .then_some(number.round() as i32)
    }

    /// Items of the array at the first matching path; empty when absent.
    pub fn items<'a>(value: &'a Value, paths: &[&str]) -> &'a [Value] {
        first(value, paths)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Locates the list container of a response: a bare array, or an array under
/// one of `keys`. `None` when neither is present.
pub fn list_container<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a [Value]> {
    if let Some(items) = body.as_array() {
        return Some(items.as_slice());
    }
    keys.iter()
        .find_map(|key| fields::at(body, key).and_then(Value::as_array))
        .map(Vec::as_slice)
}
