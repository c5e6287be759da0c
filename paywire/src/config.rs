//! Codec configuration.
//!
//! Holds the environment and the API tokens issued per facade. Tokens are
//! injected into outbound payloads by [`Codec::encode_for`](crate::codec::Codec::encode_for)
//! when a model leaves its own `token` field empty.
//!
//! # Example
//!
//! ```rust
//! use paywire::config::{CodecConfig, Environment, Facade};
//!
//! let config = CodecConfig::from_json(r#"{
//!     "environment": "test",
//!     "apiTokens": { "merchant": "merchant-token" }
//! }"#).unwrap();
//!
//! assert_eq!(config.environment, Environment::Test);
//! assert_eq!(config.token(Facade::Merchant), Some("merchant-token"));
//! assert_eq!(config.token(Facade::Payout), None);
//! ```

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Target environment of the remote API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Sandbox environment.
    #[default]
    Test,
    /// Production environment.
    Prod,
}

/// Capability scope of an API token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facade {
    /// Merchant facade: invoices, bills, ledgers, settlements.
    Merchant,
    /// Payout facade: payout batches and recipients.
    Payout,
    /// Point-of-sale facade: limited invoice creation.
    Pos,
}

impl Facade {
    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Merchant => "merchant",
            Self::Payout => "payout",
            Self::Pos => "pos",
        }
    }
}

impl Display for Facade {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration carried by a [`Codec`](crate::codec::Codec).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodecConfig {
    /// Target environment.
    #[serde(default)]
    pub environment: Environment,

    /// API tokens keyed by facade.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub api_tokens: BTreeMap<Facade, String>,
}

impl CodecConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        serde_json::from_str(json).map_err(|source| CodecError::Decode {
            model: "CodecConfig",
            source,
        })
    }

    /// Sets the token for a facade.
    #[must_use]
    pub fn with_token(mut self, facade: Facade, token: impl Into<String>) -> Self {
        self.api_tokens.insert(facade, token.into());
        self
    }

    /// Returns the token for a facade, ignoring empty entries.
    #[must_use]
    pub fn token(&self, facade: Facade) -> Option<&str> {
        self.api_tokens
            .get(&facade)
            .map(String::as_str)
            .filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CodecConfig::from_json("{}").unwrap();
        assert_eq!(config.environment, Environment::Test);
        assert!(config.api_tokens.is_empty());
    }

    #[test]
    fn test_empty_token_is_absent() {
        let config = CodecConfig::default().with_token(Facade::Pos, "");
        assert_eq!(config.token(Facade::Pos), None);
    }

    #[test]
    fn test_unknown_facade_rejected() {
        let err = CodecConfig::from_json(r#"{"apiTokens": {"admin": "x"}}"#).unwrap_err();
        assert!(err.to_string().starts_with("failed to decode CodecConfig"));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = CodecConfig {
            environment: Environment::Prod,
            ..Default::default()
        }
        .with_token(Facade::Payout, "p-token");
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"environment":"prod","apiTokens":{"payout":"p-token"}}"#);
        assert_eq!(CodecConfig::from_json(&json).unwrap(), config);
    }
}
