//! Property schema: one property's kind, name, nullability and constraint

use crate::error::{Error, Result};
use crate::id::{Identifier, PropertyId};
use crate::kind::{Constraint, DateFormat, PropertyKind, ResourceKind, DEFAULT_SHORT_TEXT_MAX_LEN};
use crate::validate;
use crate::value::{RawValue, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Definition of a single property
///
/// Name, nullability and constraint are fixed once the schema is built. Only
/// the identifier changes, when a store persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PropertySchemaRecord")]
pub struct PropertySchema {
    /// Assigned by the persistence collaborator; `0` until then
    id: PropertyId,

    /// Property name (unique within its object schema, enforced by the caller)
    name: String,

    /// Whether an absent value is acceptable
    nullable: bool,

    /// Kind and kind-specific constraint
    constraint: Constraint,
}

#[derive(Deserialize)]
struct PropertySchemaRecord {
    #[serde(default)]
    id: PropertyId,
    name: String,
    #[serde(default)]
    nullable: bool,
    constraint: Constraint,
}

impl TryFrom<PropertySchemaRecord> for PropertySchema {
    type Error = Error;

    fn try_from(record: PropertySchemaRecord) -> Result<Self> {
        let mut schema = Self::new(record.name, record.constraint)?;
        schema.nullable = record.nullable;
        schema.id = record.id;
        Ok(schema)
    }
}

impl PropertySchema {
    /// Create a non-nullable property schema
    pub fn new(name: impl Into<String>, constraint: Constraint) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidArgument(
                "property name cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            id: PropertyId::UNPERSISTED,
            name,
            nullable: false,
            constraint,
        })
    }

    pub fn integer(name: impl Into<String>) -> Result<Self> {
        Self::new(name, Constraint::Integer)
    }

    pub fn boolean(name: impl Into<String>) -> Result<Self> {
        Self::new(name, Constraint::Boolean)
    }

    pub fn float(name: impl Into<String>) -> Result<Self> {
        Self::new(name, Constraint::Float)
    }

    pub fn date_time(name: impl Into<String>, format: DateFormat) -> Result<Self> {
        Self::new(name, Constraint::DateTime { format })
    }

    /// Short text limited to the default length
    pub fn short_text(name: impl Into<String>) -> Result<Self> {
        Self::short_text_with_max_len(name, DEFAULT_SHORT_TEXT_MAX_LEN)
    }

    pub fn short_text_with_max_len(name: impl Into<String>, max_len: usize) -> Result<Self> {
        Self::new(name, Constraint::ShortText { max_len })
    }

    /// Long text; there is no default limit
    pub fn long_text(name: impl Into<String>, max_len: usize) -> Result<Self> {
        Self::new(name, Constraint::LongText { max_len })
    }

    pub fn value_object(name: impl Into<String>) -> Result<Self> {
        Self::new(name, Constraint::ValueObject)
    }

    /// Single-select option over `allowed`
    ///
    /// An empty `allowed` set is accepted here, but every later validation
    /// fails with `ConstraintSetEmpty`.
    pub fn single_option<I, S>(name: impl Into<String>, allowed: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            Constraint::SingleOption {
                allowed: collect_set(allowed),
            },
        )
    }

    pub fn multi_option<I, S>(name: impl Into<String>, allowed: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            Constraint::MultiOption {
                allowed: collect_set(allowed),
            },
        )
    }

    pub fn single_pair<I, K, V>(name: impl Into<String>, allowed: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            name,
            Constraint::SinglePair {
                allowed: collect_map(allowed),
            },
        )
    }

    pub fn multi_pair<I, K, V>(name: impl Into<String>, allowed: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            name,
            Constraint::MultiPair {
                allowed: collect_map(allowed),
            },
        )
    }

    /// Resource property of a fixed category
    pub fn resource(name: impl Into<String>, category: ResourceKind) -> Result<Self> {
        Self::new(name, Constraint::Resource { category })
    }

    /// Mark the schema as accepting absent values
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Record the identifier handed out by the persistence collaborator
    pub fn assign_id(&mut self, id: PropertyId) {
        tracing::trace!(property = %self.name, %id, "Assigned property schema id");
        self.id = id;
    }

    /// Builder form of [`assign_id`](Self::assign_id)
    pub fn with_id(mut self, id: PropertyId) -> Self {
        self.assign_id(id);
        self
    }

    pub fn id(&self) -> PropertyId {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_persisted()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PropertyKind {
        self.constraint.kind()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    /// Check a candidate value and return its normalized form
    ///
    /// `Ok(None)` means the schema accepted an absent value.
    pub fn validate(&self, raw: RawValue) -> Result<Option<Value>> {
        validate::validate(self, raw)
    }
}

fn collect_set<I, S>(items: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

fn collect_map<I, K, V>(entries: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
