//! Request builders, one per gateway operation that takes a body.
//!
//! Each builder wraps an [`Attributes`] container. Typed setters cover the
//! fields the gateway documents; [`with`](AuthorizationRequest::with) sets
//! anything else. Required fields are only checked by `validate`, which the
//! client calls before sending.

use std::ops::Index;

use serde::{Serialize, Serializer};

use crate::domain::{Attributes, Cast, Map, Schema, Value};
use crate::error::ValidationError;

/// A payload for one gateway operation.
pub trait GatewayRequest {
    /// Field rules for this operation.
    const SCHEMA: Schema;

    fn attributes(&self) -> &Attributes;

    /// Fails with the first missing required field.
    fn validate(&self) -> Result<(), ValidationError> {
        Self::SCHEMA.validate(self.attributes())
    }

    /// The wire form, with casts applied.
    fn to_payload(&self) -> Map {
        Self::SCHEMA.serialize(self.attributes())
    }
}

macro_rules! define_requests {
    ($(
        $(#[$meta:meta])*
        $name:ident {
            required: [$($required:literal),* $(,)?],
            casts: [$($cast:literal),* $(,)?] $(,)?
        }
    ),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Default, PartialEq)]
            pub struct $name(Attributes);

            impl $name {
                pub fn new() -> Self {
                    Self::default()
                }

                /// Sets any field, documented or not.
                pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
                    self.0.set(key, value);
                    self
                }

                /// Sets a field in place.
                pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
                    self.0.set(key, value);
                    self
                }

                pub fn get(&self, key: &str) -> Option<&Value> {
                    self.0.get(key)
                }

                pub fn into_attributes(self) -> Attributes {
                    self.0
                }
            }

            impl GatewayRequest for $name {
                const SCHEMA: Schema = Schema {
                    required: &[$($required),*],
                    casts: &[$(($cast, Cast::YesNo)),*],
                    numeric: &[],
                };

                fn attributes(&self) -> &Attributes {
                    &self.0
                }
            }

            impl From<Attributes> for $name {
                fn from(attrs: Attributes) -> Self {
                    Self(attrs)
                }
            }

            impl From<Map> for $name {
                fn from(map: Map) -> Self {
                    Self(Attributes::from(map))
                }
            }

            impl Index<&str> for $name {
                type Output = Value;

                fn index(&self, key: &str) -> &Value {
                    &self.0[key]
                }
            }

            impl Serialize for $name {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    self.to_payload().serialize(serializer)
                }
            }
        )*
    };
}

/// Generates consuming setters for plain string fields.
macro_rules! string_fields {
    ($($(#[$meta:meta])* $field:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $field(self, value: impl Into<String>) -> Self {
                let value: String = value.into();
                self.with(stringify!($field), value)
            }
        )*
    };
}

/// Generates consuming setters for `Y`/`N` flag fields.
macro_rules! flag_fields {
    ($($(#[$meta:meta])* $field:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $field(self, on: bool) -> Self {
                self.with(stringify!($field), on)
            }
        )*
    };
}

define_requests! {
    /// Authorize (and optionally capture) a card or ACH payment.
    AuthorizationRequest {
        required: ["amount", "expiry"],
        casts: ["taxexempt", "tokenize", "capture", "profile", "receipt"],
    },
    /// Capture a previously authorized transaction.
    CaptureRequest {
        required: [],
        casts: [],
    },
    /// Void a transaction before it settles.
    VoidRequest {
        required: [],
        casts: [],
    },
    /// Refund a settled transaction.
    RefundRequest {
        required: ["retref"],
        casts: [],
    },
    /// Create or update a stored payment profile.
    ProfileRequest {
        required: ["account"],
        casts: ["defaultacct", "profileupdate"],
    },
}

impl AuthorizationRequest {
    /// Amount in minor units, or a decimal string such as `"5.00"`.
    pub fn amount(self, amount: impl Into<Value>) -> Self {
        self.with("amount", amount)
    }

    string_fields! {
        /// Merchant ID. Defaults to the client's.
        merchid,
        /// Card expiration, `MMYY` or `YYYYMM`.
        expiry,
        /// CardSecure token or PAN.
        account,
        /// Currency code. Defaults to the client's.
        currency,
        /// Routing number for ACH.
        bankaba,
        /// Track data.
        track,
        /// Base64 encoded, gzipped BMP of signature data.
        signature,
        cvv2,
        name,
        address,
        city,
        postal,
        region,
        /// Two letter country code.
        country,
        phone,
        email,
        orderid,
        authcode,
        /// Terminal device ID.
        termid,
        /// `PPAL`, `PAID`, `GIFT` or `PDEBIT`.
        accttype,
        /// E-commerce indicator, `T`, `R` or `E`.
        ecomind,
    }

    flag_fields! {
        /// Capture the payment if the authorization succeeds.
        capture,
        /// Return a payment token in the response.
        tokenize,
        /// Include receipt data in the response.
        receipt,
        taxexempt,
    }

    /// Create a profile from this request's account.
    pub fn profile(self, create: bool) -> Self {
        self.with("profile", create)
    }

    /// Charge an account stored on an existing profile.
    pub fn existing_profile(self, profile_id: &str, account_id: &str) -> Self {
        self.with("profile", format!("{}/{}", profile_id, account_id))
    }

    /// Whether the gateway will capture as part of this authorization.
    ///
    /// True for boolean `true` or a `"Y"` flag.
    pub fn wants_capture(&self) -> bool {
        match self.0.get("capture") {
            Some(Value::Bool(on)) => *on,
            Some(Value::String(flag)) => flag.eq_ignore_ascii_case("Y"),
            _ => false,
        }
    }
}

impl CaptureRequest {
    /// Capture a different amount than was authorized.
    pub fn amount(self, amount: impl Into<Value>) -> Self {
        self.with("amount", amount)
    }

    string_fields! {
        authcode,
        invoiceid,
        ponumber,
        taxamnt,
    }
}

impl VoidRequest {
    /// Partially void the authorization.
    pub fn amount(self, amount: impl Into<Value>) -> Self {
        self.with("amount", amount)
    }
}

impl RefundRequest {
    /// Refund the transaction identified by `retref`.
    pub fn for_retref(retref: impl Into<String>) -> Self {
        let retref: String = retref.into();
        Self::new().with("retref", retref)
    }

    /// Partial refund amount. Omit to refund in full.
    pub fn amount(self, amount: impl Into<Value>) -> Self {
        self.with("amount", amount)
    }
}

impl ProfileRequest {
    string_fields! {
        /// Update this profile instead of creating a new one.
        profile,
        account,
        expiry,
        name,
        address,
        city,
        region,
        country,
        postal,
        phone,
        email,
        company,
    }

    flag_fields! {
        /// Make this account the profile's default.
        defaultacct,
        /// Update the account already on the profile.
        profileupdate,
    }
}
