//! Display and internal names of schemas

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Caller-chosen name shown to operators
///
/// Any format is accepted as long as it is not empty. Uniqueness among sibling
/// schemas is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(Error::InvalidArgument(
                "display name cannot be empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stable identifier-style name of a schema
///
/// Immutable once set; conventionally derived from the display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InternalName(String);

impl InternalName {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(Error::InvalidArgument(
                "internal name cannot be empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Derive a PascalCase internal name from a display name
    ///
    /// Words are split on every non-alphanumeric character. A leading digit is
    /// prefixed with `_`. Fails when the display name has no alphanumeric
    /// character at all.
    pub fn derive_from(display: &DisplayName) -> Result<Self> {
        let mut derived = String::with_capacity(display.as_str().len());
        for word in display
            .as_str()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                derived.extend(first.to_uppercase());
                derived.push_str(chars.as_str());
            }
        }

        if derived.starts_with(|c: char| c.is_ascii_digit()) {
            derived.insert(0, '_');
        }

        if derived.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "cannot derive an internal name from '{}'",
                display.as_str()
            )));
        }
        Ok(Self(derived))
    }

    /// Whether the name is identifier-style: ASCII letter or `_` first, then
    /// ASCII alphanumerics or `_`
    pub fn is_identifier(&self) -> bool {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_conversions {
    ($name:ident) => {
        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(value: String) -> Result<Self> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = Error;

            fn try_from(value: &str) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(name: $name) -> Self {
                name.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_conversions!(DisplayName);
string_conversions!(InternalName);
