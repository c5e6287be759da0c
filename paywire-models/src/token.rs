//! Access tokens.
//!
//! A [`Token`] is built by the caller to request a capability and then filled
//! in by the server's reply. The server-issued half (`policies`, `resource`,
//! the token value, the creation dates) is never sent back, even when the same
//! instance is reused for a second request.

use paywire::config::Facade;
use paywire::convert::Timestamp;
use paywire::policy::{FieldDescriptor, WireDefault, WireModel, encode};
use serde::Deserialize;
use serde_with::{DefaultOnNull, serde_as};

/// One policy attached to an issued token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Policy kind, e.g. `"id"`.
    pub policy: String,
    /// Policy method, e.g. `"active"` or `"inactive"`.
    pub method: String,
    /// Policy parameters.
    pub params: Vec<String>,
}

/// A capability token.
///
/// # JSON Format
///
/// ```json
/// {
///   "id": "Tf2yXsY49iFyDfxt3b2kf9VPRMwPxxAyCRW",
///   "facade": "merchant",
///   "pairingCode": "C4Lg7oW",
///   "policies": [{
///     "policy": "id",
///     "method": "inactive",
///     "params": ["Tf2yXsY49iFyDfxt3b2kf9VPRMwPxxAyCRW"]
///   }],
///   "resource": "J8G1Fjsrbm4JFtMdv7y4RpafYfU3CFwG3tkQH5Q7tmdr",
///   "token": "t3sa0Zl2Mxy8bL2xgb7LTfcXrCwiBzqsk4nuSr5Q8K9",
///   "dateCreated": 1500000000000,
///   "pairingExpiration": 1500086400000
/// }
/// ```
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Token {
    /// Client identifier the token is requested for.
    pub id: String,
    /// Idempotency key for the request.
    pub guid: Option<String>,
    /// Request nonce.
    pub nonce: Option<u64>,
    /// Pairing code obtained out of band.
    pub pairing_code: Option<String>,
    /// Requested facade.
    pub facade: Option<Facade>,
    /// Free-form label shown in the dashboard.
    pub label: Option<String>,
    /// Number of tokens to create.
    pub count: u32,

    /// Policies attached by the server.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub policies: Vec<Policy>,
    /// Resource the token grants access to.
    pub resource: Option<String>,
    /// Issued token value.
    #[serde(rename = "token")]
    pub value: Option<String>,
    /// When the token was created.
    #[serde(deserialize_with = "paywire::convert::timestamp::deserialize_option")]
    pub date_created: Option<Timestamp>,
    /// When the pairing code stops being redeemable.
    #[serde(deserialize_with = "paywire::convert::timestamp::deserialize_option")]
    pub pairing_expiration: Option<Timestamp>,
}

impl Token {
    /// Creates a token request for a client identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Requests the token for a facade.
    #[must_use]
    pub fn with_facade(mut self, facade: Facade) -> Self {
        self.facade = Some(facade);
        self
    }

    /// Redeems a pairing code.
    #[must_use]
    pub fn with_pairing_code(mut self, code: impl Into<String>) -> Self {
        self.pairing_code = Some(code.into());
        self
    }

    /// Returns `true` once the server has issued a value.
    #[must_use]
    pub fn is_issued(&self) -> bool {
        !self.value.is_wire_default()
    }
}

impl WireModel for Token {
    const MODEL: &'static str = "Token";
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::always("id", |t: &Self| encode(&t.id)),
        FieldDescriptor::if_non_default(
            "guid",
            |t: &Self| t.guid.is_wire_default(),
            |t: &Self| encode(&t.guid),
        ),
        FieldDescriptor::if_non_default(
            "nonce",
            |t: &Self| t.nonce.is_wire_default(),
            |t: &Self| encode(&t.nonce),
        ),
        FieldDescriptor::if_non_default(
            "pairingCode",
            |t: &Self| t.pairing_code.is_wire_default(),
            |t: &Self| encode(&t.pairing_code),
        ),
        FieldDescriptor::if_non_default(
            "facade",
            |t: &Self| t.facade.is_none(),
            |t: &Self| encode(&t.facade),
        ),
        FieldDescriptor::if_non_default(
            "label",
            |t: &Self| t.label.is_wire_default(),
            |t: &Self| encode(&t.label),
        ),
        FieldDescriptor::if_non_default(
            "count",
            |t: &Self| t.count.is_wire_default(),
            |t: &Self| encode(&t.count),
        ),
        FieldDescriptor::response_only("policies"),
        FieldDescriptor::response_only("resource"),
        FieldDescriptor::response_only("token"),
        FieldDescriptor::response_only("dateCreated"),
        FieldDescriptor::response_only("pairingExpiration"),
    ];
}

outbound_serialize!(Token);
