//! Tolerant number decoding for saved state and server responses.
//!
//! Older clients stored numbers as form strings (`"31"`, `""`), and the
//! scanner does the same for quantities. Unusable values decode as absent
//! instead of failing the whole record.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

fn raw_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let n = match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Some(n),
        Raw::Text(s) => s.trim().parse().ok(),
        Raw::Other(_) => None,
    };
    Ok(n.filter(|n: &f64| n.is_finite()))
}

/// Number or numeric string; anything else is `0.0`.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(raw_number(deserializer)?.unwrap_or(0.0))
}

pub(crate) fn optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    raw_number(deserializer)
}

/// Whole non-negative number, rounded. Negative or oversized values are `None`.
pub(crate) fn optional_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(raw_number(deserializer)?
        .map(f64::round)
        .filter(|n| (0.0..=u32::MAX as f64).contains(n))
        .map(|n| n as u32))
}
