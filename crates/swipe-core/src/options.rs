//! String-keyed domain options as they arrive from the transport layer.
//!
//! Each service parses the options it understands into a typed struct; keys a
//! domain does not know are ignored. A value that does not parse is an
//! `InvalidInput` failure raised before any network call.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::{CalendarDate, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap(BTreeMap<String, String>);

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Trimmed value of `name`; blank values count as absent.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool, ValidationError> {
        let Some(raw) = self.get_str(name) else {
            return Ok(default);
        };

        match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(invalid(name, raw, "expected true or false")),
        }
    }

    pub fn u32(&self, name: &str) -> Result<Option<u32>, ValidationError> {
        self.get_str(name)
            .map(|raw| {
                raw.parse::<u32>()
                    .map_err(|_| invalid(name, raw, "expected a non-negative integer"))
            })
            .transpose()
    }

    pub fn date(&self, name: &str) -> Result<Option<CalendarDate>, ValidationError> {
        CalendarDate::parse_optional(self.get_str(name))
    }

    /// Parses with the type's own validation error, e.g. [`crate::Interval`].
    pub fn parsed<T>(&self, name: &str) -> Result<Option<T>, ValidationError>
    where
        T: FromStr<Err = ValidationError>,
    {
        self.get_str(name).map(str::parse).transpose()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn invalid(name: &str, value: &str, reason: &'static str) -> ValidationError {
    ValidationError::InvalidOption {
        name: name.to_owned(),
        value: value.to_owned(),
        reason,
    }
}

impl From<BTreeMap<String, String>> for OptionMap {
    fn from(values: BTreeMap<String, String>) -> Self {
        Self(values)
    }
}

impl<K, V> FromIterator<(K, V)> for OptionMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}
