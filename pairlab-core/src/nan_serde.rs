//! Serde adapter writing non-finite floats as `null` and reading `null` back as NaN.
//!
//! JSON has no NaN literal; metrics such as an undefined Sharpe ratio need to
//! survive a manifest round trip.
//!
//! ```ignore
//! #[serde(with = "crate::nan_serde")]
//! pub sharpe: f64,
//! ```

use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_some(value)
    } else {
        serializer.serialize_none()
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}
