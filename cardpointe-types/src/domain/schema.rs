//! Static field rules for requests and responses.

use super::attributes::{Attributes, Map, Value};
use super::cast::Cast;
use super::numeric;
use crate::error::ValidationError;

/// Declares which fields a payload requires, how fields are cast on the
/// way out and which fields are normalized to integers on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub required: &'static [&'static str],
    pub casts: &'static [(&'static str, Cast)],
    pub numeric: &'static [&'static str],
}

impl Schema {
    /// No rules at all.
    pub const EMPTY: Schema = Schema {
        required: &[],
        casts: &[],
        numeric: &[],
    };

    /// Checks every required field is present and not `null`.
    ///
    /// Reports the first missing field in declaration order.
    pub fn validate(&self, attrs: &Attributes) -> Result<(), ValidationError> {
        for field in self.required {
            match attrs.get(field) {
                None | Some(Value::Null) => return Err(ValidationError::missing(*field)),
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Renders `attrs` with this schema's casts applied.
    pub fn serialize(&self, attrs: &Attributes) -> Map {
        attrs.to_serializable(self.casts)
    }

    /// Normalizes this schema's numeric fields in place.
    pub fn normalize(&self, attrs: &mut Attributes) {
        numeric::normalize(attrs, self.numeric);
    }
}
