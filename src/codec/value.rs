/// Typed scalar values carried by parameter maps
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single parameter value
///
/// Text is coerced once, when it is parsed: a token made only of ASCII digits
/// becomes an [`Value::Integer`], anything else stays a [`Value::String`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Digit-only token
    Integer(i64),
    /// Any other token
    String(String),
}

impl Value {
    /// Coerce a raw text token into a typed value
    ///
    /// Coercion never fails. Digit-only text that would not render back to
    /// the same digits stays a string: a leading zero (`01234`) or a value
    /// that does not fit in an `i64`.
    ///
    /// # Examples
    ///
    /// ```
    /// use paramwire::codec::Value;
    ///
    /// assert_eq!(Value::coerce("42"), Value::Integer(42));
    /// assert_eq!(Value::coerce("abc"), Value::String("abc".to_string()));
    /// assert_eq!(Value::coerce("-1"), Value::String("-1".to_string()));
    /// assert_eq!(Value::coerce("007"), Value::String("007".to_string()));
    /// ```
    pub fn coerce(raw: &str) -> Self {
        let canonical = raw == "0" || !raw.starts_with('0');
        if canonical && !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = raw.parse::<i64>() {
                return Value::Integer(n);
            }
        }
        Value::String(raw.to_string())
    }

    /// Integer payload, if this is an integer value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::String(_) => None,
        }
    }

    /// String payload, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Integer(_) => None,
            Value::String(s) => Some(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
