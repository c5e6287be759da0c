//! Dynamic currency map.
//!
//! Some payloads use a JSON object as a dictionary whose property names are
//! currency codes:
//!
//! ```json
//! { "USD": { "payPro": true, "p2p": false }, "BTC": { "payPro": false } }
//! ```
//!
//! Inbound, each value is a full [`CurrencySettings`] record. Outbound, only the
//! enabled flag of each record is projected:
//!
//! ```json
//! { "BTC": false, "USD": true }
//! ```
//!
//! The two shapes are intentionally asymmetric; an outbound payload does not
//! read back into the same records.
//!
//! A repeated currency code is rejected and named. A top-level `null` is an
//! absent map, distinct from the empty map `{}`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::CodecError;
use crate::policy::WireDefault;

/// QR presentation settings attached to a currency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QrSettings {
    /// QR code type, e.g. `"BIP21"`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Whether the QR code is shown collapsed.
    pub collapsed: bool,
}

/// Per-currency settings record, as read from the server.
///
/// `enabled` is the one field projected back onto the wire. The server names
/// it `payPro`; `enabled` is accepted as an alias.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CurrencySettings {
    /// Whether the currency is enabled for payment.
    #[serde(rename = "payPro", alias = "enabled")]
    pub enabled: bool,
    /// Whether peer-to-peer payment is supported.
    pub p2p: bool,
    /// Whether in-wallet dapp browser payment is supported.
    pub dapp_browser: bool,
    /// Whether `WalletConnect` payment is supported.
    pub wallet_connect: bool,
    /// Icon URL.
    pub image: Option<String>,
    /// Withdrawal fee as reported by the server.
    pub withdrawal_fee: Option<String>,
    /// Reason the currency is disabled, when it is.
    pub reason: Option<String>,
    /// QR presentation settings.
    pub qr: Option<QrSettings>,
}

/// Currency code → settings, with duplicate codes rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrencyMap(BTreeMap<String, CurrencySettings>);

impl CurrencyMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Inserts settings for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DuplicateKey`] if `code` is already present; the
    /// existing entry is left untouched.
    pub fn try_insert(
        &mut self,
        code: impl Into<String>,
        settings: CurrencySettings,
    ) -> Result<(), CodecError> {
        match self.0.entry(code.into()) {
            Entry::Occupied(entry) => Err(CodecError::DuplicateKey(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(settings);
                Ok(())
            }
        }
    }

    /// Returns the settings for `code`.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&CurrencySettings> {
        self.0.get(code)
    }

    /// Returns `true` if `code` is present and enabled.
    #[must_use]
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get(code).is_some_and(|settings| settings.enabled)
    }

    /// Number of currencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map holds no currencies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(code, settings)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CurrencySettings)> {
        self.0.iter().map(|(code, settings)| (code.as_str(), settings))
    }

    /// Iterates over the currency codes in order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Reads a map from wire JSON.
    ///
    /// Returns `Ok(None)` for a top-level `null`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DuplicateKey`] for a repeated code, and
    /// [`CodecError::Decode`] for any other malformed input, including a
    /// top-level token that is neither an object nor `null`.
    pub fn from_wire(json: &str) -> Result<Option<Self>, CodecError> {
        let duplicate = RefCell::new(None);
        let mut deserializer = serde_json::Deserializer::from_str(json);
        OptionalMapSeed {
            duplicate: &duplicate,
        }
        .deserialize(&mut deserializer)
        .and_then(|map| deserializer.end().map(|()| map))
        .map_err(|source| match duplicate.take() {
            Some(code) => CodecError::DuplicateKey(code),
            None => CodecError::Decode {
                model: "CurrencyMap",
                source,
            },
        })
    }

    /// Projects the map onto its outbound shape: `code → enabled`.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        let projected: Map<String, Value> = self
            .iter()
            .map(|(code, settings)| (code.to_owned(), Value::Bool(settings.enabled)))
            .collect();
        Value::Object(projected)
    }
}

impl WireDefault for CurrencyMap {
    fn is_wire_default(&self) -> bool {
        self.is_empty()
    }
}

impl Serialize for CurrencyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (code, settings) in self.iter() {
            map.serialize_entry(code, &settings.enabled)?;
        }
        map.end()
    }
}

/// Collects entries, rejecting repeated codes. When `duplicate` is set the
/// rejected code is also stored there, so callers get it back without
/// reading the error text.
struct CurrencyMapVisitor<'a> {
    duplicate: Option<&'a RefCell<Option<String>>>,
}

impl<'de> Visitor<'de> for CurrencyMapVisitor<'_> {
    type Value = CurrencyMap;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON object keyed by currency code")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = CurrencyMap::new();
        while let Some(code) = access.next_key::<String>()? {
            let settings = access.next_value::<CurrencySettings>()?;
            map.try_insert(code, settings).map_err(|err| {
                if let (Some(slot), CodecError::DuplicateKey(code)) = (self.duplicate, &err) {
                    *slot.borrow_mut() = Some(code.clone());
                }
                de::Error::custom(err)
            })?;
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for CurrencyMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CurrencyMapVisitor { duplicate: None })
    }
}

/// `null` or a map, reporting a repeated code through `duplicate`.
struct OptionalMapSeed<'a> {
    duplicate: &'a RefCell<Option<String>>,
}

impl<'de> DeserializeSeed<'de> for OptionalMapSeed<'_> {
    type Value = Option<CurrencyMap>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_option(self)
    }
}

impl<'de> Visitor<'de> for OptionalMapSeed<'_> {
    type Value = Option<CurrencyMap>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON object keyed by currency code")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        let visitor = CurrencyMapVisitor {
            duplicate: Some(self.duplicate),
        };
        deserializer.deserialize_map(visitor).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE: &str = r#"{"USD": {"payPro": true, "p2p": false}, "BTC": {"payPro": false}}"#;

    #[test]
    fn test_inbound_keys() {
        let map = CurrencyMap::from_wire(SAMPLE).unwrap().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.codes().collect::<Vec<_>>(), vec!["BTC", "USD"]);
        assert!(map.is_enabled("USD"));
        assert!(!map.is_enabled("BTC"));
        assert!(!map.get("USD").unwrap().p2p);
    }

    #[test]
    fn test_outbound_projects_enabled_flag() {
        let map = CurrencyMap::from_wire(SAMPLE).unwrap().unwrap();
        assert_eq!(map.to_wire(), json!({"USD": true, "BTC": false}));
        assert_eq!(
            serde_json::to_value(&map).unwrap(),
            json!({"USD": true, "BTC": false})
        );
    }

    #[test]
    fn test_outbound_is_not_readable_as_inbound() {
        let map = CurrencyMap::from_wire(SAMPLE).unwrap().unwrap();
        let outbound = map.to_wire().to_string();
        assert!(CurrencyMap::from_wire(&outbound).is_err());
    }

    #[test]
    fn test_null_is_absent_and_empty_is_present() {
        assert_eq!(CurrencyMap::from_wire("null").unwrap(), None);
        let empty = CurrencyMap::from_wire("{}").unwrap().unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_rejects_non_object_token() {
        let err = CurrencyMap::from_wire(r#"["USD"]"#).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("invalid type: sequence"), "{message}");
        assert!(message.contains("a JSON object keyed by currency code"));

        assert!(CurrencyMap::from_wire("42").is_err());
    }

    #[test]
    fn test_rejects_duplicate_key() {
        let err =
            CurrencyMap::from_wire(r#"{"USD": {"payPro": true}, "USD": {"payPro": false}}"#)
                .unwrap_err();
        assert!(matches!(err, CodecError::DuplicateKey(ref code) if code == "USD"));
    }

    #[test]
    fn test_duplicate_key_with_backtick_is_reported_verbatim() {
        let err = CurrencyMap::from_wire(r#"{"A`B": {"payPro": true}, "A`B": {}}"#).unwrap_err();
        assert!(matches!(err, CodecError::DuplicateKey(ref code) if code == "A`B"));

        let err = CurrencyMap::from_wire(r#"{"`": {}, "`": {}}"#).unwrap_err();
        assert!(matches!(err, CodecError::DuplicateKey(ref code) if code == "`"));
    }

    #[test]
    fn test_error_text_resembling_duplicate_is_a_decode_error() {
        let err =
            CurrencyMap::from_wire(r#"{"USD": {"payPro": "duplicate currency key `X`"}}"#)
                .unwrap_err();
        assert!(matches!(err, CodecError::Decode { model: "CurrencyMap", .. }), "{err:?}");
    }

    #[test]
    fn test_try_insert_keeps_first_entry() {
        let mut map = CurrencyMap::new();
        let enabled = CurrencySettings {
            enabled: true,
            ..Default::default()
        };
        map.try_insert("EUR", enabled).unwrap();
        let err = map.try_insert("EUR", CurrencySettings::default()).unwrap_err();
        assert_eq!(err.to_string(), "duplicate currency key `EUR`");
        assert!(map.is_enabled("EUR"));
    }

    #[test]
    fn test_nested_records() {
        let json = r#"{"ETH": {"enabled": true, "dappBrowser": true,
            "qr": {"type": "BIP21", "collapsed": true}, "withdrawalFee": "0.01"}}"#;
        let map = CurrencyMap::from_wire(json).unwrap().unwrap();
        let eth = map.get("ETH").unwrap();
        assert!(eth.enabled);
        assert!(eth.dapp_browser);
        assert_eq!(eth.qr.as_ref().unwrap().kind.as_deref(), Some("BIP21"));
        assert_eq!(eth.withdrawal_fee.as_deref(), Some("0.01"));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert!(CurrencyMap::from_wire("{} x").is_err());
    }
}
