//! Serde helpers that keep non-finite floats in JSON.
//!
//! `serde_json` writes `inf`/`NaN` as `null` and then refuses to read it back
//! as `f64`. An unidentifiable covariance (`n ≤ p`) is all `+∞`, so these
//! fields store non-finite values as the strings `"inf"`, `"-inf"` and `"nan"`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum JsonFloat {
    Number(f64),
    Text(String),
}

impl JsonFloat {
    fn from_f64(v: f64) -> Self {
        if v.is_finite() {
            JsonFloat::Number(v)
        } else if v.is_nan() {
            JsonFloat::Text("nan".to_string())
        } else if v > 0.0 {
            JsonFloat::Text("inf".to_string())
        } else {
            JsonFloat::Text("-inf".to_string())
        }
    }

    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            JsonFloat::Number(v) => Ok(v),
            JsonFloat::Text(s) => match s.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "nan" => Ok(f64::NAN),
                other => Err(E::custom(format!("expected a number, \"inf\", \"-inf\" or \"nan\", got \"{other}\""))),
            },
        }
    }
}

/// `#[serde(with = "json_float::vec")]` for `Vec<f64>`.
pub mod vec {
    use super::*;

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded: Vec<JsonFloat> = values.iter().map(|&v| JsonFloat::from_f64(v)).collect();
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Vec::<JsonFloat>::deserialize(deserializer)?
            .into_iter()
            .map(JsonFloat::into_f64)
            .collect()
    }
}

/// `#[serde(with = "json_float::matrix")]` for `Vec<Vec<f64>>`.
pub mod matrix {
    use super::*;

    pub fn serialize<S: Serializer>(rows: &[Vec<f64>], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded: Vec<Vec<JsonFloat>> = rows
            .iter()
            .map(|row| row.iter().map(|&v| JsonFloat::from_f64(v)).collect())
            .collect();
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<f64>>, D::Error> {
        Vec::<Vec<JsonFloat>>::deserialize(deserializer)?
            .into_iter()
            .map(|row| row.into_iter().map(JsonFloat::into_f64).collect())
            .collect()
    }
}
