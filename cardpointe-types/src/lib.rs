//! # CardPointe Types
//!
//! Data types for the CardPointe gateway REST API. This crate has ZERO
//! IO dependencies - only the attribute container, request builders,
//! response wrappers and the rules that shape them on the wire.
//!
//! ## Layout
//!
//! - `domain/` - Attribute container, cast rules, numeric normalization, schemas
//! - `requests` - Builders for the payloads each gateway operation accepts
//! - `responses/` - Wrappers that normalize gateway replies
//! - `error` - Validation errors raised before anything is sent

pub mod domain;
pub mod error;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use domain::{Attributes, Cast, Schema, SettlementDay, Value};
pub use error::{InvalidSettlementDay, ValidationError};
pub use requests::{
    AuthorizationRequest, CaptureRequest, GatewayRequest, ProfileRequest, RefundRequest,
    VoidRequest,
};
pub use responses::{
    APPROVED, AuthorizationResponse, AuthorizationResult, CaptureResponse, InquireResponse,
    RefundResponse, Response, SettlementResponse, SettlementStatus, SettlementTransaction,
    VoidResponse,
};
