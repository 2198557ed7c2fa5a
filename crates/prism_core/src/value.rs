//! Scalar values read from an object graph.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A leaf value of an object graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Unsigned integer beyond the signed range
    UInt(u64),
    /// Floating point number
    Float(f64),
    /// Text, including timestamps in their serialized form
    String(String),
}

impl Scalar {
    /// Compare two scalars for sorting.
    ///
    /// Returns `None` when the kinds are not comparable with each other
    /// (a string against a number, a boolean against null, ...).
    /// Numbers compare by exact value whatever their representation, so
    /// the order stays transitive beyond 2^53. Positive NaN sorts above
    /// every number and negative NaN below.
    #[must_use]
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, Self::Null) => Some(Ordering::Equal),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            _ => Some(compare_numbers(self.number()?, other.number()?)),
        }
    }

    fn number(&self) -> Option<Number> {
        match self {
            Self::Int(i) => Some(Number::Integer(i128::from(*i))),
            Self::UInt(u) => Some(Number::Integer(i128::from(*u))),
            Self::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    /// Get a string representation of the scalar kind
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }

    /// Convert a JSON value into a scalar.
    ///
    /// Arrays and objects are not scalars and yield `None`. Integers keep
    /// their exact value; only JSON floats become [`Scalar::Float`].
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Self::Null),
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Some(Self::UInt(u))
                } else {
                    n.as_f64().map(Self::Float)
                }
            }
            serde_json::Value::String(s) => Some(Self::String(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    /// Convert into a JSON value. Non-finite floats become null.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::UInt(u) => serde_json::Value::from(*u),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Self::UInt(value), Self::Int)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Integer(i128),
    Float(f64),
}

// 2^127, the first float above every i128
const I128_LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

fn compare_numbers(a: Number, b: Number) -> Ordering {
    match (a, b) {
        (Number::Integer(a), Number::Integer(b)) => a.cmp(&b),
        (Number::Integer(a), Number::Float(b)) => compare_integer_float(a, b),
        (Number::Float(a), Number::Integer(b)) => compare_integer_float(b, a).reverse(),
        // -0.0 and 0.0 are equal, as they are against the integer 0
        (Number::Float(a), Number::Float(b)) => {
            a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
        }
    }
}

fn compare_integer_float(int: i128, float: f64) -> Ordering {
    if float.is_nan() {
        return if float.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if float >= I128_LIMIT {
        return Ordering::Less;
    }
    if float < -I128_LIMIT {
        return Ordering::Greater;
    }
    // in range and integral, so the cast is exact
    let whole = float.trunc();
    match int.cmp(&(whole as i128)) {
        Ordering::Equal if float > whole => Ordering::Less,
        Ordering::Equal if float < whole => Ordering::Greater,
        ordering => ordering,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_compare_same_kind() {
        assert_eq!(
            Scalar::from(1).compare(&Scalar::from(2)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Scalar::from("2024-01-02").compare(&Scalar::from("2024-01-01")),
            Some(Ordering::Greater)
        );
        assert_eq!(Scalar::Null.compare(&Scalar::Null), Some(Ordering::Equal));
    }

    #[test]
    fn test_compare_numeric_mix() {
        assert_eq!(
            Scalar::Int(2).compare(&Scalar::Float(1.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Scalar::Float(0.5).compare(&Scalar::Int(1)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Scalar::Int(-1).compare(&Scalar::Float(-1.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Scalar::Int(0).compare(&Scalar::Float(-0.0)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_compare_large_integers_exactly() {
        let above = Scalar::Int((1 << 53) + 1);
        let float = Scalar::Float((1u64 << 53) as f64);
        let exact = Scalar::Int(1 << 53);

        assert_eq!(above.compare(&float), Some(Ordering::Greater));
        assert_eq!(float.compare(&exact), Some(Ordering::Equal));
        assert_eq!(above.compare(&exact), Some(Ordering::Greater));

        let max = Scalar::from(u64::MAX);
        assert_eq!(max.compare(&Scalar::Int(i64::MAX)), Some(Ordering::Greater));
        assert_eq!(max.compare(&Scalar::Float(u64::MAX as f64)), Some(Ordering::Less));
        assert_eq!(Scalar::Int(i64::MIN).compare(&max), Some(Ordering::Less));
    }

    #[test]
    fn test_compare_against_nan_and_infinity() {
        assert_eq!(
            Scalar::from(u64::MAX).compare(&Scalar::Float(f64::INFINITY)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Scalar::Int(i64::MIN).compare(&Scalar::Float(f64::NEG_INFINITY)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Scalar::Int(0).compare(&Scalar::Float(f64::NAN)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Scalar::Float(f64::NAN).compare(&Scalar::Float(f64::INFINITY)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_compare_incomparable() {
        assert_eq!(Scalar::from("a").compare(&Scalar::from(1)), None);
        assert_eq!(Scalar::Null.compare(&Scalar::Bool(true)), None);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Scalar::from_json(&json!(null)), Some(Scalar::Null));
        assert_eq!(Scalar::from_json(&json!(3)), Some(Scalar::Int(3)));
        assert_eq!(Scalar::from_json(&json!(1.5)), Some(Scalar::Float(1.5)));
        assert_eq!(
            Scalar::from_json(&json!(u64::MAX)),
            Some(Scalar::UInt(u64::MAX))
        );
        assert_eq!(Scalar::from_json(&json!([1])), None);
        assert_eq!(Scalar::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_to_json() {
        assert_eq!(Scalar::from("x").to_json(), json!("x"));
        assert_eq!(Scalar::Float(f64::NAN).to_json(), json!(null));
        assert_eq!(Scalar::from(Some(4)).to_json(), json!(4));
        assert_eq!(Scalar::from(None::<i64>).to_json(), json!(null));
        assert_eq!(Scalar::from(u64::MAX).to_json(), json!(u64::MAX));
        assert_eq!(Scalar::from(7u64), Scalar::Int(7));
    }

    #[test]
    fn test_serialize_untagged() {
        let values = vec![Scalar::Null, Scalar::Bool(true), Scalar::Int(7), Scalar::from("s")];
        let encoded = serde_json::to_string(&values).unwrap();
        assert_eq!(encoded, r#"[null,true,7,"s"]"#);

        let decoded: Scalar = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(decoded, Scalar::UInt(u64::MAX));
    }

    fn numeric_scalar() -> impl Strategy<Value = Scalar> {
        let near = 1i64 << 53;
        prop_oneof![
            ((near - 4)..(near + 4)).prop_map(Scalar::Int),
            ((near - 4)..(near + 4)).prop_map(|i| Scalar::Float(i as f64)),
            (-4i64..4).prop_map(Scalar::Int),
            (-4.0f64..4.0).prop_map(Scalar::Float),
            any::<i64>().prop_map(Scalar::Int),
            any::<u64>().prop_map(Scalar::from),
            any::<f64>().prop_map(Scalar::Float),
        ]
    }

    proptest! {
        #[test]
        fn prop_numeric_order_is_consistent(
            a in numeric_scalar(),
            b in numeric_scalar(),
            c in numeric_scalar(),
        ) {
            let ab = a.compare(&b).unwrap();
            let bc = b.compare(&c).unwrap();
            prop_assert_eq!(b.compare(&a).unwrap(), ab.reverse());
            if ab != Ordering::Greater && bc != Ordering::Greater {
                prop_assert_ne!(a.compare(&c).unwrap(), Ordering::Greater);
            }
        }
    }
}
