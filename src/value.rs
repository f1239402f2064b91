//! The runtime JSON value type shared by the evaluator, the built-in
//! operators, and the sugar front end.
///
/// Uses `Int(i64)`/`Float(f64)` as distinct variants (not a single `f64`)
/// so arithmetic can preserve integer results: `5 + 5` stays an integer,
/// `5 + 5.0` does not (§3). `Object` is a `serde_json::Map`, which with the
/// `preserve_order` feature keeps key insertion order for serialization
/// while equality (`Value::equals`) is defined order-insensitively.
use std::cmp::Ordering;
use std::fmt;

use serde_json::Map;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map<String, Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// §4.2 truthiness: null is false, booleans are themselves, numbers are
    /// nonzero, strings/sequences/objects are nonempty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Unwraps either a bare array or a `{array_key: [...]}` wrapper,
    /// matching the HOF operators' dual-accepting contract (§4.5).
    pub fn as_array_data<'a>(&'a self, array_key: &str) -> Option<&'a [Value]> {
        match self {
            Value::Array(a) => Some(a),
            Value::Object(o) if o.len() == 1 => o.get(array_key).and_then(Value::as_array),
            _ => None,
        }
    }

    pub fn wrap_array(items: Vec<Value>, array_key: &str) -> Value {
        let mut obj = Map::new();
        obj.insert(array_key.to_string(), Value::Array(items));
        Value::Object(obj)
    }

    /// Is this the `{array_key: [...]}` literal-array disambiguator?
    pub fn is_array_literal_form(&self, array_key: &str) -> bool {
        matches!(self, Value::Object(o) if o.len() == 1 && matches!(o.get(array_key), Some(Value::Array(_))))
    }

    /// Numeric equality (`5 == 5.0`), structural equality otherwise.
    /// Object equality is key-set and value-wise, order-insensitive
    /// (resolved Open Question 3 — see DESIGN.md).
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| b.get(k).is_some_and(|bv| v.equals(bv)))
            }
            _ => false,
        }
    }

    /// Fixed type-class ordering for `sort`: null < number < string <
    /// boolean < array < object (§4.5).
    fn type_class(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Int(_) | Value::Float(_) => 1,
            Value::String(_) => 2,
            Value::Bool(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    /// Type-aware total order used by `sort`/DSU comparators.
    pub fn type_aware_cmp(&self, other: &Value) -> Ordering {
        let (ca, cb) = (self.type_class(), other.type_class());
        if ca != cb {
            return ca.cmp(&cb);
        }
        match (self, other) {
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => self
                .as_f64()
                .unwrap()
                .partial_cmp(&other.as_f64().unwrap())
                .unwrap_or(Ordering::Equal),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = x.type_aware_cmp(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Object(a), Value::Object(b)) => {
                let mut ak: Vec<_> = a.iter().collect();
                let mut bk: Vec<_> = b.iter().collect();
                ak.sort_by(|x, y| x.0.cmp(y.0));
                bk.sort_by(|x, y| x.0.cmp(y.0));
                for ((ka, va), (kb, vb)) in ak.iter().zip(bk.iter()) {
                    let kord = ka.cmp(kb);
                    if kord != Ordering::Equal {
                        return kord;
                    }
                    let vord = va.type_aware_cmp(vb);
                    if vord != Ordering::Equal {
                        return vord;
                    }
                }
                ak.len().cmp(&bk.len())
            }
            _ => Ordering::Equal,
        }
    }

    pub fn from_json(v: serde_json::Value) -> Value {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(a) => Value::Array(a.into_iter().map(Value::from_json).collect()),
            serde_json::Value::Object(o) => {
                Value::Object(o.into_iter().map(|(k, v)| (k, Value::from_json(v))).collect())
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(a) => serde_json::Value::Array(a.iter().map(Value::to_json).collect()),
            Value::Object(o) => {
                serde_json::Value::Object(o.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
            _ => write!(f, "{}", self.to_json()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Bool(true).type_name(), "boolean");
        assert_eq!(Value::Int(42).type_name(), "integer");
        assert_eq!(Value::Float(3.14).type_name(), "number");
    }

    #[test]
    fn truthy_null_is_false() {
        assert!(!Value::Null.is_truthy());
    }

    #[test]
    fn truthy_zero_is_false() {
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
    }

    #[test]
    fn truthy_nonempty_string() {
        assert!(Value::String("x".into()).is_truthy());
        assert!(!Value::String("".into()).is_truthy());
    }

    #[test]
    fn truthy_empty_collections_are_false() {
        assert!(!Value::Array(vec![]).is_truthy());
        assert!(!Value::Object(Map::new()).is_truthy());
    }

    #[test]
    fn numeric_equality_crosses_int_float() {
        assert!(Value::Int(5).equals(&Value::Float(5.0)));
    }

    #[test]
    fn object_equality_is_order_insensitive() {
        let mut a = Map::new();
        a.insert("x".into(), Value::Int(1));
        a.insert("y".into(), Value::Int(2));
        let mut b = Map::new();
        b.insert("y".into(), Value::Int(2));
        b.insert("x".into(), Value::Int(1));
        assert!(Value::Object(a).equals(&Value::Object(b)));
    }

    #[test]
    fn type_class_ordering() {
        assert_eq!(Value::Null.type_aware_cmp(&Value::Int(1)), Ordering::Less);
        assert_eq!(Value::Int(1).type_aware_cmp(&Value::String("a".into())), Ordering::Less);
        assert_eq!(
            Value::String("a".into()).type_aware_cmp(&Value::Bool(false)),
            Ordering::Less
        );
    }

    #[test]
    fn array_literal_form_detection() {
        let wrapped = Value::wrap_array(vec![Value::Int(1)], "array");
        assert!(wrapped.is_array_literal_form("array"));
        assert!(!Value::Array(vec![Value::Int(1)]).is_array_literal_form("array"));
    }
}
