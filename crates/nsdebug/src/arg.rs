//! Tagged argument values passed to log calls

use serde_json::Value;

/// A single log call argument.
///
/// The variant decides which formatter a value reaches: text is substituted
/// as-is, structured values and byte sequences go through inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Plain text
    Text(String),
    /// Any JSON-shaped value, scalar or structured
    Value(Value),
    /// Raw bytes, rendered by the `%B` formatter
    Bytes(Vec<u8>),
}

impl Arg {
    /// Whether the value is rendered by the default object formatter when it
    /// is not consumed by a verb.
    pub fn is_object(&self) -> bool {
        match self {
            Arg::Text(_) => false,
            Arg::Bytes(_) => true,
            Arg::Value(value) => matches!(value, Value::Object(_) | Value::Array(_) | Value::Null),
        }
    }

    /// Text content when this argument is plain text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Arg::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Numeric view used by `%d`, `%i` and `%f`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Arg::Text(text) | Arg::Value(Value::String(text)) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Some(0.0)
                } else {
                    trimmed.parse().ok()
                }
            }
            Arg::Value(Value::Number(n)) => n.as_f64(),
            Arg::Value(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
            Arg::Value(Value::Null) => Some(0.0),
            _ => None,
        }
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Text(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Text(value)
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Arg::Text(value.clone())
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

impl From<Vec<u8>> for Arg {
    fn from(value: Vec<u8>) -> Self {
        Arg::Bytes(value)
    }
}

impl From<&[u8]> for Arg {
    fn from(value: &[u8]) -> Self {
        Arg::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Arg {
    fn from(value: &[u8; N]) -> Self {
        Arg::Bytes(value.to_vec())
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Value(Value::Bool(value))
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::Value(Value::from(value))
                }
            }
        )*
    };
}

impl_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Build a `Vec<Arg>` from heterogeneous values.
///
/// ```
/// use nsdebug::{args, Arg};
///
/// let values = args!["id", 7, b"raw"];
/// assert_eq!(values[1], Arg::from(7));
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::Arg::from($value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_classification() {
        assert!(Arg::from(json!({ "a": 1 })).is_object());
        assert!(Arg::from(json!([1, 2])).is_object());
        assert!(Arg::from(Value::Null).is_object());
        assert!(Arg::from(b"abc".as_slice()).is_object());

        assert!(!Arg::from("text").is_object());
        assert!(!Arg::from(42).is_object());
        assert!(!Arg::from(true).is_object());
    }

    #[test]
    fn test_numeric_view() {
        assert_eq!(Arg::from("12.5").as_number(), Some(12.5));
        assert_eq!(Arg::from("").as_number(), Some(0.0));
        assert_eq!(Arg::from("abc").as_number(), None);
        assert_eq!(Arg::from(json!("12")).as_number(), Some(12.0));
        assert_eq!(Arg::from(json!(" 7.5 ")).as_number(), Some(7.5));
        assert_eq!(Arg::from(json!("seven")).as_number(), None);
        assert_eq!(Arg::from(true).as_number(), Some(1.0));
        assert_eq!(Arg::from(json!({})).as_number(), None);
    }

    #[test]
    fn test_args_macro() {
        let values = args!["a", 1, json!(null)];
        assert_eq!(values.len(), 3);
        assert_eq!(values[0].as_text(), Some("a"));
        assert!(args![].is_empty());
    }
}
