//! # Metadata Record
//!
//! The normalized output of a scrape: a classification [`Kind`], the name of
//! the provider that produced it, and an open attribute bag of typed
//! [`Value`]s. Serializes to `{"type", "provider", "attributes"}`.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute bag keyed by attribute name
pub type Attributes = BTreeMap<String, Value>;

/// Names of the attributes every record carries
pub mod attr {
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const THUMBNAIL_URL: &str = "thumbnailUrl";
    pub const URL: &str = "url";
}

/// Classification of a scraped page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    #[default]
    Webpage,
    Product,
    Video,
    Audio,
    Profile,
    Status,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Webpage => "Webpage",
            Kind::Product => "Product",
            Kind::Video => "Video",
            Kind::Audio => "Audio",
            Kind::Profile => "Profile",
            Kind::Status => "Status",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single attribute value
///
/// Serialized without a tag: text as a string, numbers as numbers,
/// timestamps as RFC 3339 strings, maps and records as objects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<FixedOffset>),
    List(Vec<Value>),
    Map(Attributes),
    Record(Box<Metadata>),
}

impl Value {
    /// Returns the text if this is a `Text` value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Attributes> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Metadata> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => Value::Integer(n),
            Err(_) => Value::Float(n as f64),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(t: DateTime<FixedOffset>) -> Self {
        Value::Timestamp(t)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t.fixed_offset())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Attributes> for Value {
    fn from(map: Attributes) -> Self {
        Value::Map(map)
    }
}

impl From<Metadata> for Value {
    fn from(record: Metadata) -> Self {
        Value::Record(Box::new(record))
    }
}

/// Metadata extracted from a single page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    #[serde(rename = "type")]
    kind: Kind,

    provider: String,

    attributes: Attributes,
}

impl Metadata {
    /// An empty `Webpage` record with no provider
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: Kind) {
        self.kind = kind;
    }

    /// Provider name, empty for generic pages
    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn set_provider(&mut self, provider: impl Into<String>) {
        self.provider = provider.into();
    }

    /// Set an attribute, returning the value it replaced
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes.insert(name.into(), value.into())
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Shorthand for attributes holding text
    pub fn text_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(Value::as_str)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}
