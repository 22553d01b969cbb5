//! Serde codec for floats that may be NaN or infinite.
//!
//! JSON has no NaN or infinity. Finite values are written as numbers, NaN
//! as `null`, and infinities as the strings `"inf"` and `"-inf"`. Reading
//! accepts the same forms plus `"NaN"`.
//!
//! Use the module with `#[serde(with = "keel_core::float_serde")]` on an
//! `f64` field, or the [`vec`] and [`nested`] submodules on `Vec<f64>` and
//! `Vec<Vec<f64>>` fields.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// An `f64` that serializes through this codec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Float(pub f64);

impl Serialize for Float {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.0;
        if value.is_finite() {
            serializer.serialize_f64(value)
        } else if value.is_nan() {
            serializer.serialize_none()
        } else if value > 0.0 {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }
}

struct FloatVisitor;

impl<'de> Visitor<'de> for FloatVisitor {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, null, \"NaN\", \"inf\" or \"-inf\"")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_none<E: de::Error>(self) -> Result<f64, E> {
        Ok(f64::NAN)
    }

    fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
        Ok(f64::NAN)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
        match v.trim().to_ascii_lowercase().as_str() {
            "nan" => Ok(f64::NAN),
            "inf" | "+inf" | "infinity" => Ok(f64::INFINITY),
            "-inf" | "-infinity" => Ok(f64::NEG_INFINITY),
            other => other
                .parse()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self)),
        }
    }
}

impl<'de> Deserialize<'de> for Float {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FloatVisitor).map(Float)
    }
}

/// Serializes one `f64`.
pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    Float(*value).serialize(serializer)
}

/// Deserializes one `f64`.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Float::deserialize(deserializer).map(|f| f.0)
}

/// Codec for `Vec<f64>`.
pub mod vec {
    use super::Float;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes a vector of floats.
    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|v| Float(*v)))
    }

    /// Deserializes a vector of floats.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let values = Vec::<Float>::deserialize(deserializer)?;
        Ok(values.into_iter().map(|f| f.0).collect())
    }
}

/// Codec for `Vec<Vec<f64>>`.
pub mod nested {
    use super::Float;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes nested vectors of floats.
    pub fn serialize<S: Serializer>(values: &[Vec<f64>], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            values
                .iter()
                .map(|inner| inner.iter().map(|v| Float(*v)).collect::<Vec<_>>()),
        )
    }

    /// Deserializes nested vectors of floats.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<f64>>, D::Error> {
        let values = Vec::<Vec<Float>>::deserialize(deserializer)?;
        Ok(values
            .into_iter()
            .map(|inner| inner.into_iter().map(|f| f.0).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "crate::float_serde")]
        x: f64,
        #[serde(with = "crate::float_serde::vec")]
        xs: Vec<f64>,
    }

    #[test]
    fn test_non_finite_json() {
        let sample = Sample {
            x: f64::NAN,
            xs: vec![1.5, f64::INFINITY, f64::NEG_INFINITY, f64::NAN],
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(json, r#"{"x":null,"xs":[1.5,"inf","-inf",null]}"#);

        let back: Sample = serde_json::from_str(&json).unwrap();
        assert!(back.x.is_nan());
        assert_eq!(back.xs[0], 1.5);
        assert_eq!(back.xs[1], f64::INFINITY);
        assert_eq!(back.xs[2], f64::NEG_INFINITY);
        assert!(back.xs[3].is_nan());
    }

    #[test]
    fn test_reads_integers_and_strings() {
        let back: Sample = serde_json::from_str(r#"{"x":"NaN","xs":[2,"-3.5"]}"#).unwrap();
        assert!(back.x.is_nan());
        assert_eq!(back.xs, vec![2.0, -3.5]);
        assert!(serde_json::from_str::<Sample>(r#"{"x":"abc","xs":[]}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"x":true,"xs":[]}"#).is_err());
    }
}
