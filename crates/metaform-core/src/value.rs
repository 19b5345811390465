//! Candidate and normalized property values

use crate::error::{Error, Result};
use crate::id::PropertyId;
use crate::kind::PropertyKind;
use crate::property::PropertySchema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Binary resource payload together with its full file name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePayload {
    /// File name including extension, e.g. `pump-42.png`
    pub file_name: String,

    /// Raw bytes, stored and retrieved by an external collaborator
    pub bytes: Vec<u8>,
}

impl ResourcePayload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// A resource with no content
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// File name without the extension
    pub fn stem(&self) -> Option<&str> {
        Path::new(&self.file_name).file_stem().and_then(|s| s.to_str())
    }

    /// Extension of the file name, without the dot
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.file_name).extension().and_then(|s| s.to_str())
    }
}

/// A candidate value, tagged close to the shape its target kind expects
///
/// Scalars may also arrive as `Text`, in which case the whole string must parse.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Absent value
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Json(serde_json::Value),
    Set(BTreeSet<String>),
    Pair { key: String, value: String },
    Map(BTreeMap<String, String>),
    Resource(ResourcePayload),
}

impl RawValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Build a set candidate from any list of strings
    pub fn set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Set(items.into_iter().map(Into::into).collect())
    }

    /// Build a key/value pair candidate
    pub fn pair(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Pair {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Build a mapping candidate from any list of pairs
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Name of the shape, used in error messages
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::DateTime(_) => "date-time",
            Self::Json(_) => "json",
            Self::Set(_) => "set",
            Self::Pair { .. } => "pair",
            Self::Map(_) => "map",
            Self::Resource(_) => "resource",
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i32> for RawValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<DateTime<Utc>> for RawValue {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::DateTime(ts)
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(doc: serde_json::Value) -> Self {
        Self::Json(doc)
    }
}

impl From<BTreeSet<String>> for RawValue {
    fn from(set: BTreeSet<String>) -> Self {
        Self::Set(set)
    }
}

impl From<BTreeMap<String, String>> for RawValue {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self::Map(map)
    }
}

impl From<ResourcePayload> for RawValue {
    fn from(payload: ResourcePayload) -> Self {
        Self::Resource(payload)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A normalized value that passed validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    Float(f64),
    DateTime(DateTime<Utc>),
    Text(String),
    Json(serde_json::Value),
    SingleOption(String),
    MultiOption(BTreeSet<String>),
    SinglePair { key: String, value: String },
    MultiPair(BTreeMap<String, String>),
    Resource(ResourcePayload),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Text content of text and single-option values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::SingleOption(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::DateTime(ts) => Some(ts),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&ResourcePayload> {
        match self {
            Self::Resource(payload) => Some(payload),
            _ => None,
        }
    }
}

/// A property value bound to exactly one property schema
///
/// The binding is held by identifier; the schema itself is passed in again on
/// every assignment so it can be resolved from wherever the caller keeps it.
/// A value is never in a state its schema would reject: construction and
/// assignment both validate first and only then store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
    property_id: PropertyId,
    property_name: String,
    kind: PropertyKind,
    #[serde(default)]
    value: Option<Value>,
}

impl PropertyValue {
    /// Validate `raw` against `schema` and bind the result to it
    pub fn bind(schema: &PropertySchema, raw: impl Into<RawValue>) -> Result<Self> {
        if !schema.is_persisted() {
            return Err(Error::UnpersistedReference(format!(
                "property schema '{}'",
                schema.name()
            )));
        }
        let value = schema.validate(raw.into())?;
        Ok(Self {
            property_id: schema.id(),
            property_name: schema.name().to_string(),
            kind: schema.kind(),
            value,
        })
    }

    /// Bind an absent value; only nullable schemas accept this
    pub fn absent(schema: &PropertySchema) -> Result<Self> {
        Self::bind(schema, RawValue::Null)
    }

    /// Replace the stored value with `raw` once it passes validation
    ///
    /// On failure the previous value is kept.
    pub fn assign(&mut self, schema: &PropertySchema, raw: impl Into<RawValue>) -> Result<()> {
        self.ensure_bound_to(schema)?;
        let value = schema.validate(raw.into())?;
        tracing::trace!(property = %self.property_name, "Assigned property value");
        self.value = value;
        Ok(())
    }

    fn ensure_bound_to(&self, schema: &PropertySchema) -> Result<()> {
        if schema.id() != self.property_id {
            return Err(Error::InvalidArgument(format!(
                "value of '{}' is bound to property schema {}, not {}",
                self.property_name,
                self.property_id,
                schema.id()
            )));
        }
        if schema.kind() != self.kind {
            return Err(Error::KindMismatch {
                expected: self.kind,
                actual: schema.kind(),
            });
        }
        Ok(())
    }

    pub fn property_id(&self) -> PropertyId {
        self.property_id
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }

    pub fn into_value(self) -> Option<Value> {
        self.value
    }
}
