//! Lenient serde helpers.
//!
//! Documents authored by an LLM are loosely typed: `version: 1.0` arrives as
//! a float, `estimated_tasks: "3"` as a string, and optional scalars as
//! `null`. These helpers are used with `#[serde(deserialize_with = ...)]`
//! so such documents still load into the strict domain types.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Str(s) => s,
            Scalar::Int(i) => i.to_string(),
            // `1.0` must stay "1.0", not "1"
            Scalar::Float(f) if f.fract() == 0.0 => format!("{:.1}", f),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

/// Deserialize any scalar (or `null`) into a `String`.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Scalar> = Option::deserialize(deserializer)?;
    Ok(value.map(Scalar::into_string).unwrap_or_default())
}

/// Deserialize any scalar into `Some(String)`; `null` and `""` become `None`.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Scalar> = Option::deserialize(deserializer)?;
    Ok(value.map(Scalar::into_string).filter(|s| !s.is_empty()))
}

/// Deserialize an integer, a numeric string, or `null` into a `u32`.
pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Option<Scalar> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(0),
        Some(Scalar::Int(i)) => u32::try_from(i).map_err(D::Error::custom),
        Some(Scalar::Float(f)) if f >= 0.0 && f.fract() == 0.0 => Ok(f as u32),
        Some(Scalar::Str(s)) => s
            .trim()
            .parse::<u32>()
            .map_err(|_| D::Error::custom(format!("expected a number, got '{}'", s))),
        Some(_) => Err(D::Error::custom("expected a non-negative integer")),
    }
}
