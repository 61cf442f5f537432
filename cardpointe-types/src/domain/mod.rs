//! Core building blocks shared by requests and responses.

pub mod attributes;
pub mod cast;
pub mod numeric;
pub mod schema;
pub mod settlement_day;

pub use attributes::{Attributes, Map, Value};
pub use cast::Cast;
pub use schema::Schema;
pub use settlement_day::SettlementDay;
