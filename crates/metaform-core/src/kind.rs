//! Property kind catalog
//!
//! The set of kinds is closed. Adding one means adding a `PropertyKind`
//! variant, a `Constraint` variant and a rule in the validator; the compiler
//! points at every match that needs the new arm.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Default maximum length of a short-text property
pub const DEFAULT_SHORT_TEXT_MAX_LEN: usize = 10;

/// Tag selecting the validation rule of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Integer,
    Boolean,
    Float,
    DateTime,
    ShortText,
    LongText,
    /// Opaque structured document
    ValueObject,
    /// Single-select option
    SingleOption,
    /// Multi-select options
    MultiOption,
    /// Single-select key/value pair
    SinglePair,
    /// Multi-select key/value pairs
    MultiPair,
    /// Binary payload of a fixed category
    Resource(ResourceKind),
}

impl PropertyKind {
    pub fn is_resource(&self) -> bool {
        matches!(self, Self::Resource(_))
    }

    pub fn resource_kind(&self) -> Option<ResourceKind> {
        match self {
            Self::Resource(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => f.write_str("integer"),
            Self::Boolean => f.write_str("boolean"),
            Self::Float => f.write_str("float"),
            Self::DateTime => f.write_str("date-time"),
            Self::ShortText => f.write_str("short text"),
            Self::LongText => f.write_str("long text"),
            Self::ValueObject => f.write_str("value object"),
            Self::SingleOption => f.write_str("single-select option"),
            Self::MultiOption => f.write_str("multi-select options"),
            Self::SinglePair => f.write_str("single-select pair"),
            Self::MultiPair => f.write_str("multi-select pairs"),
            Self::Resource(kind) => write!(f, "{} resource", kind),
        }
    }
}

/// Category of a resource property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Image,
    File,
    Table,
    Audio,
    CompressedFile,
    Video,
    WebPage,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        Self::Image,
        Self::File,
        Self::Table,
        Self::Audio,
        Self::CompressedFile,
        Self::Video,
        Self::WebPage,
    ];

    /// Extensions conventionally stored under this category
    ///
    /// Informational only: file names are never checked against this list.
    pub fn typical_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Image => &["bmp", "jpeg", "jpg", "png", "gif"],
            Self::File => &["txt", "pdf", "doc", "docx"],
            Self::Table => &["csv", "xls", "xlsx"],
            Self::Audio => &["mp3", "wav"],
            Self::CompressedFile => &["zip", "7z", "rar"],
            Self::Video => &["avi", "mp4", "mov", "mpeg"],
            Self::WebPage => &["html", "htm"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::File => "file",
            Self::Table => "table",
            Self::Audio => "audio",
            Self::CompressedFile => "compressed file",
            Self::Video => "video",
            Self::WebPage => "web page",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation format of a date-time property. All values are UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    Time24Hours,
    #[default]
    Time12Hours,
}

impl DateFormat {
    /// `chrono` format string used for display
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::Time24Hours => "%Y-%m-%d %H:%M:%S",
            Self::Time12Hours => "%Y-%m-%d %I:%M:%S %p",
        }
    }

    /// Render a timestamp for display
    pub fn render(&self, value: &DateTime<Utc>) -> String {
        value.format(self.pattern()).to_string()
    }
}

/// Kind-specific constraint carried by a property schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    Integer,
    Boolean,
    Float,
    DateTime {
        #[serde(default)]
        format: DateFormat,
    },
    ShortText {
        max_len: usize,
    },
    LongText {
        max_len: usize,
    },
    ValueObject,
    SingleOption {
        allowed: BTreeSet<String>,
    },
    MultiOption {
        allowed: BTreeSet<String>,
    },
    SinglePair {
        allowed: BTreeMap<String, String>,
    },
    MultiPair {
        allowed: BTreeMap<String, String>,
    },
    Resource {
        category: ResourceKind,
    },
}

impl Constraint {
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Integer => PropertyKind::Integer,
            Self::Boolean => PropertyKind::Boolean,
            Self::Float => PropertyKind::Float,
            Self::DateTime { .. } => PropertyKind::DateTime,
            Self::ShortText { .. } => PropertyKind::ShortText,
            Self::LongText { .. } => PropertyKind::LongText,
            Self::ValueObject => PropertyKind::ValueObject,
            Self::SingleOption { .. } => PropertyKind::SingleOption,
            Self::MultiOption { .. } => PropertyKind::MultiOption,
            Self::SinglePair { .. } => PropertyKind::SinglePair,
            Self::MultiPair { .. } => PropertyKind::MultiPair,
            Self::Resource { category } => PropertyKind::Resource(*category),
        }
    }

    /// Maximum text length, for text kinds
    pub fn max_len(&self) -> Option<usize> {
        match self {
            Self::ShortText { max_len } | Self::LongText { max_len } => Some(*max_len),
            _ => None,
        }
    }

    /// Whether the kind carries an option or pair set that is empty.
    ///
    /// A schema in this state can be constructed but never satisfied.
    pub fn is_unsatisfiable(&self) -> bool {
        match self {
            Self::SingleOption { allowed } | Self::MultiOption { allowed } => allowed.is_empty(),
            Self::SinglePair { allowed } | Self::MultiPair { allowed } => allowed.is_empty(),
            _ => false,
        }
    }
}
