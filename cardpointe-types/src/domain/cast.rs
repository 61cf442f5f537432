//! Serialization-time value casts.

use super::attributes::Value;

/// How a field is rendered when a payload is built for the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cast {
    /// Booleans become the gateway's `"Y"` / `"N"` flags. Anything else,
    /// including an already-encoded `"Y"` or `"N"`, passes through.
    YesNo,
}

impl Cast {
    /// Returns the cast form of `value`.
    pub fn apply(self, value: &Value) -> Value {
        match self {
            Cast::YesNo => match value {
                Value::Bool(true) => Value::from("Y"),
                Value::Bool(false) => Value::from("N"),
                other => other.clone(),
            },
        }
    }
}
