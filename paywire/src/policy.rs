//! Directional field policy.
//!
//! A model is one record used in two directions: callers fill it in to build a
//! request, and the inbound path hydrates it from a response. Inbound
//! hydration accepts every field; outbound serialization is gated per field by
//! a [`FieldRule`].
//!
//! Each model declares a static table of [`FieldDescriptor`]s through
//! [`WireModel`]. The pure function [`outbound_fields`] computes the inclusion
//! set for an instance, and [`to_wire`] renders exactly that set.
//!
//! ```rust
//! use paywire::policy::{FieldDescriptor, WireDefault, WireModel, encode, to_wire};
//!
//! #[derive(Default)]
//! struct Refund {
//!     amount: f64,
//!     reference: Option<String>,
//!     status: String,
//! }
//!
//! impl WireModel for Refund {
//!     const MODEL: &'static str = "Refund";
//!     const FIELDS: &'static [FieldDescriptor<Self>] = &[
//!         FieldDescriptor::always("amount", |r: &Self| encode(&r.amount)),
//!         FieldDescriptor::if_non_default(
//!             "reference",
//!             |r: &Self| r.reference.is_wire_default(),
//!             |r: &Self| encode(&r.reference),
//!         ),
//!         FieldDescriptor::response_only("status"),
//!     ];
//! }
//!
//! let refund = Refund { amount: 5.0, status: "complete".into(), ..Default::default() };
//! let wire = to_wire(&refund).unwrap();
//! assert_eq!(wire.len(), 1);
//! assert!(wire.contains_key("amount"));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::CodecError;

/// Renders one field of `M` to its wire value.
pub type Encoder<M> = fn(&M) -> Result<Value, CodecError>;

/// Answers whether a field of `M` currently holds its default value.
pub type DefaultProbe<M> = fn(&M) -> bool;

/// Outbound inclusion rule for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRule {
    /// Required domain field, always sent.
    Always,
    /// Optional field, sent only when it holds a non-default value.
    ///
    /// Strings and collections must be non-empty, flags must be `true`.
    IfNonDefault,
    /// Server-assigned field. Hydrated inbound, never sent.
    ResponseOnly,
}

/// Describes one attribute of a wire model: its wire name, its outbound rule,
/// and how to probe and render its value.
pub struct FieldDescriptor<M> {
    name: &'static str,
    rule: FieldRule,
    is_default: DefaultProbe<M>,
    encoder: Option<Encoder<M>>,
}

fn never_default<M>(_: &M) -> bool {
    false
}

fn always_default<M>(_: &M) -> bool {
    true
}

impl<M> FieldDescriptor<M> {
    /// A required field, always included outbound.
    #[must_use]
    pub const fn always(name: &'static str, encoder: Encoder<M>) -> Self {
        Self {
            name,
            rule: FieldRule::Always,
            is_default: never_default::<M>,
            encoder: Some(encoder),
        }
    }

    /// An optional field, included outbound when `is_default` returns `false`.
    #[must_use]
    pub const fn if_non_default(
        name: &'static str,
        is_default: DefaultProbe<M>,
        encoder: Encoder<M>,
    ) -> Self {
        Self {
            name,
            rule: FieldRule::IfNonDefault,
            is_default,
            encoder: Some(encoder),
        }
    }

    /// A server-assigned field. It has no encoder and can never be emitted.
    #[must_use]
    pub const fn response_only(name: &'static str) -> Self {
        Self {
            name,
            rule: FieldRule::ResponseOnly,
            is_default: always_default::<M>,
            encoder: None,
        }
    }

    /// Wire name of the field.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Outbound rule of the field.
    #[must_use]
    pub const fn rule(&self) -> FieldRule {
        self.rule
    }

    /// Evaluates the outbound predicate against the current field value.
    #[must_use]
    pub fn includes(&self, model: &M) -> bool {
        match self.rule {
            FieldRule::Always => true,
            FieldRule::IfNonDefault => !(self.is_default)(model),
            FieldRule::ResponseOnly => false,
        }
    }

    /// Renders the field's current value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::ServerAssigned`] for response-only fields, and
    /// whatever the field's encoder reports otherwise.
    pub fn encode(&self, model: &M) -> Result<Value, CodecError> {
        let encoder = self
            .encoder
            .ok_or(CodecError::ServerAssigned { field: self.name })?;
        encoder(model)
    }
}

impl<M> fmt::Debug for FieldDescriptor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("rule", &self.rule)
            .finish_non_exhaustive()
    }
}

/// A record that can be rendered to the outbound wire format.
pub trait WireModel: Sized + 'static {
    /// Human-readable model name, used in diagnostics.
    const MODEL: &'static str;

    /// Field table, in declaration order.
    const FIELDS: &'static [FieldDescriptor<Self>];
}

/// What counts as "unset" for an optional wire field.
pub trait WireDefault {
    /// Returns `true` if the value should be left off the outbound payload.
    fn is_wire_default(&self) -> bool;
}

impl WireDefault for str {
    fn is_wire_default(&self) -> bool {
        self.is_empty()
    }
}

impl WireDefault for String {
    fn is_wire_default(&self) -> bool {
        self.is_empty()
    }
}

impl WireDefault for bool {
    fn is_wire_default(&self) -> bool {
        !*self
    }
}

impl WireDefault for u32 {
    fn is_wire_default(&self) -> bool {
        *self == 0
    }
}

impl WireDefault for u64 {
    fn is_wire_default(&self) -> bool {
        *self == 0
    }
}

impl WireDefault for f64 {
    fn is_wire_default(&self) -> bool {
        *self == 0.0
    }
}

impl<T> WireDefault for Vec<T> {
    fn is_wire_default(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> WireDefault for BTreeMap<K, V> {
    fn is_wire_default(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> WireDefault for HashMap<K, V, S> {
    fn is_wire_default(&self) -> bool {
        self.is_empty()
    }
}

impl<Tz: chrono::TimeZone> WireDefault for chrono::DateTime<Tz> {
    fn is_wire_default(&self) -> bool {
        false
    }
}

impl<T: WireDefault> WireDefault for Option<T> {
    fn is_wire_default(&self) -> bool {
        self.as_ref().is_none_or(WireDefault::is_wire_default)
    }
}

/// Renders a value through its `Serialize` implementation.
///
/// This is the default encoder used in field tables.
///
/// # Errors
///
/// Returns the serializer's error wrapped in [`CodecError::Encode`]; the field
/// name is filled in by [`to_wire`].
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Value, CodecError> {
    serde_json::to_value(value).map_err(|source| CodecError::Encode { field: "", source })
}

/// Names of the fields that `model` would currently send, in table order.
#[must_use]
pub fn outbound_fields<M: WireModel>(model: &M) -> Vec<&'static str> {
    M::FIELDS
        .iter()
        .filter(|field| field.includes(model))
        .map(FieldDescriptor::name)
        .collect()
}

/// Renders the outbound payload of `model`.
///
/// Only fields selected by [`outbound_fields`] are present. Keys are sorted, so
/// an unmodified instance always renders to the same payload.
///
/// # Errors
///
/// Returns a [`CodecError`] naming the first field that failed to render.
pub fn to_wire<M: WireModel>(model: &M) -> Result<Map<String, Value>, CodecError> {
    let mut wire = Map::new();
    for field in M::FIELDS.iter().filter(|field| field.includes(model)) {
        let value = field.encode(model).map_err(|err| match err {
            CodecError::Encode { source, .. } => CodecError::Encode {
                field: field.name(),
                source,
            },
            other => other,
        })?;
        wire.insert(field.name().to_owned(), value);
    }
    Ok(wire)
}

/// Renders the outbound payload of `model` as a JSON string.
///
/// # Errors
///
/// See [`to_wire`].
pub fn to_wire_string<M: WireModel>(model: &M) -> Result<String, CodecError> {
    let wire = to_wire(model)?;
    serde_json::to_string(&wire).map_err(|source| CodecError::Encode {
        field: M::MODEL,
        source,
    })
}

/// Serializes `model` as its outbound view.
///
/// Models implement [`Serialize`] by delegating here, so that nested models
/// are filtered by their own field policy.
///
/// # Errors
///
/// Returns the serializer's error, or a custom error carrying the
/// [`CodecError`] message.
pub fn serialize_outbound<M: WireModel, S: Serializer>(
    model: &M,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let wire = to_wire(model).map_err(serde::ser::Error::custom)?;
    wire.serialize(serializer)
}
