//! Bills.

use paywire::convert::{Timestamp, timestamp};
use paywire::policy::{FieldDescriptor, WireDefault, WireModel, encode};
use serde::Deserialize;
use serde_with::{DefaultOnNull, serde_as};

/// One line of a bill.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BillItem {
    /// Server-assigned line identifier.
    pub id: Option<String>,
    /// Line description.
    pub description: String,
    /// Unit price.
    #[serde(deserialize_with = "paywire::convert::numeric::deserialize")]
    pub price: f64,
    /// Quantity, left off the wire when unset.
    pub quantity: Option<u32>,
}

impl BillItem {
    /// Creates a bill line.
    #[must_use]
    pub fn new(description: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            description: description.into(),
            price,
            quantity: Some(quantity),
            ..Default::default()
        }
    }
}

impl WireModel for BillItem {
    const MODEL: &'static str = "BillItem";
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::response_only("id"),
        FieldDescriptor::always("description", |i: &Self| encode(&i.description)),
        FieldDescriptor::always("price", |i: &Self| encode(&i.price)),
        FieldDescriptor::if_non_default(
            "quantity",
            |i: &Self| i.quantity.is_wire_default(),
            |i: &Self| encode(&i.quantity),
        ),
    ];
}

/// A bill sent to a customer.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Bill {
    /// Bill currency code.
    pub currency: String,
    /// Bill lines.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub items: Vec<BillItem>,
    /// Merchant bill number.
    pub number: Option<String>,
    /// Customer name.
    pub name: Option<String>,
    /// First address line.
    pub address1: Option<String>,
    /// Second address line.
    pub address2: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State or province.
    pub state: Option<String>,
    /// Postal code.
    pub zip: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// Customer e-mail.
    pub email: Option<String>,
    /// Addresses copied on the bill e-mail.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub cc: Vec<String>,
    /// Customer phone.
    pub phone: Option<String>,
    /// Payment due date.
    #[serde(deserialize_with = "paywire::convert::timestamp::deserialize_option")]
    pub due_date: Option<Timestamp>,
    /// Facade token the bill is created with.
    pub token: Option<String>,
    /// Pass the processing fee on to the customer.
    pub pass_processing_fee: bool,

    /// Server-assigned identifier.
    pub id: Option<String>,
    /// Bill status.
    pub status: Option<String>,
    /// Hosted bill URL.
    pub url: Option<String>,
    /// When the bill was created.
    #[serde(deserialize_with = "paywire::convert::timestamp::deserialize_option")]
    pub create_date: Option<Timestamp>,
    /// Owning merchant identifier.
    pub merchant: Option<String>,
}

impl Bill {
    /// Creates a bill with the required fields.
    #[must_use]
    pub fn new(currency: impl Into<String>, items: Vec<BillItem>) -> Self {
        Self {
            currency: currency.into(),
            items,
            ..Default::default()
        }
    }

    /// Sum of `price * quantity` over all lines, a missing quantity counting as one.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.price * f64::from(item.quantity.unwrap_or(1)))
            .sum()
    }
}

impl WireModel for Bill {
    const MODEL: &'static str = "Bill";
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::always("currency", |b: &Self| encode(&b.currency)),
        FieldDescriptor::always("items", |b: &Self| encode(&b.items)),
        FieldDescriptor::if_non_default(
            "number",
            |b: &Self| b.number.is_wire_default(),
            |b: &Self| encode(&b.number),
        ),
        FieldDescriptor::if_non_default(
            "name",
            |b: &Self| b.name.is_wire_default(),
            |b: &Self| encode(&b.name),
        ),
        FieldDescriptor::if_non_default(
            "address1",
            |b: &Self| b.address1.is_wire_default(),
            |b: &Self| encode(&b.address1),
        ),
        FieldDescriptor::if_non_default(
            "address2",
            |b: &Self| b.address2.is_wire_default(),
            |b: &Self| encode(&b.address2),
        ),
        FieldDescriptor::if_non_default(
            "city",
            |b: &Self| b.city.is_wire_default(),
            |b: &Self| encode(&b.city),
        ),
        FieldDescriptor::if_non_default(
            "state",
            |b: &Self| b.state.is_wire_default(),
            |b: &Self| encode(&b.state),
        ),
        FieldDescriptor::if_non_default(
            "zip",
            |b: &Self| b.zip.is_wire_default(),
            |b: &Self| encode(&b.zip),
        ),
        FieldDescriptor::if_non_default(
            "country",
            |b: &Self| b.country.is_wire_default(),
            |b: &Self| encode(&b.country),
        ),
        FieldDescriptor::if_non_default(
            "email",
            |b: &Self| b.email.is_wire_default(),
            |b: &Self| encode(&b.email),
        ),
        FieldDescriptor::if_non_default(
            "cc",
            |b: &Self| b.cc.is_wire_default(),
            |b: &Self| encode(&b.cc),
        ),
        FieldDescriptor::if_non_default(
            "phone",
            |b: &Self| b.phone.is_wire_default(),
            |b: &Self| encode(&b.phone),
        ),
        FieldDescriptor::if_non_default(
            "dueDate",
            |b: &Self| b.due_date.is_none(),
            |b: &Self| encode(&b.due_date.as_ref().map(timestamp::format)),
        ),
        FieldDescriptor::if_non_default(
            "token",
            |b: &Self| b.token.is_wire_default(),
            |b: &Self| encode(&b.token),
        ),
        FieldDescriptor::if_non_default(
            "passProcessingFee",
            |b: &Self| !b.pass_processing_fee,
            |b: &Self| encode(&b.pass_processing_fee),
        ),
        FieldDescriptor::response_only("id"),
        FieldDescriptor::response_only("status"),
        FieldDescriptor::response_only("url"),
        FieldDescriptor::response_only("createDate"),
        FieldDescriptor::response_only("merchant"),
    ];
}

outbound_serialize!(Bill, BillItem);
