//! Dot-separated addressing into JSON-like documents.
//!
//! A keypath such as `FunctionConfiguration.Environment.AccessSysfs` walks
//! nested mappings by key and nested sequences by index (`Functions.0.Id`).

mod coerce;

use std::{fmt, str::FromStr};

use displaydoc::Display;
use serde_json::Value;
use thiserror::Error;

pub use crate::coerce::{CoerceError, to_bool, to_int, truthy};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Keypath {
    segments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Display)]
pub enum KeypathError {
    /// Keypath is empty
    Empty,
    /// Invalid sequence index "{segment}" in keypath "{keypath}"
    InvalidIndex { keypath: String, segment: String },
    /// Sequence index {index} is out of bounds (length {len}) in keypath "{keypath}"
    IndexOutOfBounds {
        keypath: String,
        index: usize,
        len: usize,
    },
    /// Value at segment "{segment}" of keypath "{keypath}" is neither a mapping nor a sequence
    NotAContainer { keypath: String, segment: String },
    /// Failed to transform value at keypath "{keypath}"
    Transform {
        keypath: String,
        #[source]
        source: CoerceError,
    },
}

impl FromStr for Keypath {
    type Err = KeypathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(KeypathError::Empty);
        }
        Ok(Self {
            segments: s.split('.').map(ToOwned::to_owned).collect(),
        })
    }
}

impl fmt::Display for Keypath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl Keypath {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the value at this keypath, or `None` if a mapping key along the
    /// way is missing.
    pub fn search<'a>(&self, value: &'a Value) -> Result<Option<&'a Value>, KeypathError> {
        let mut current = value;
        for segment in &self.segments {
            current = match current {
                Value::Array(items) => {
                    let index = self.index(segment, items.len())?;
                    &items[index]
                }
                Value::Object(map) => match map.get(segment.as_str()) {
                    Some(next) => next,
                    None => return Ok(None),
                },
                _ => return Err(self.not_a_container(segment)),
            };
        }
        Ok(Some(current))
    }

    /// Replaces the value at this keypath with `transform(value)`, in place.
    ///
    /// Returns `false` and leaves `value` untouched when a mapping key along
    /// the keypath does not exist.
    pub fn replace<F>(&self, value: &mut Value, transform: F) -> Result<bool, KeypathError>
    where
        F: FnOnce(Value) -> Result<Value, CoerceError>,
    {
        let Some((last, parents)) = self.segments.split_last() else {
            return Err(KeypathError::Empty);
        };

        let mut current = value;
        for segment in parents {
            current = match current {
                Value::Array(items) => {
                    let index = self.index(segment, items.len())?;
                    &mut items[index]
                }
                Value::Object(map) => match map.get_mut(segment.as_str()) {
                    Some(next) => next,
                    None => return Ok(false),
                },
                _ => return Err(self.not_a_container(segment)),
            };
        }

        let slot = match current {
            Value::Array(items) => {
                let index = self.index(last, items.len())?;
                &mut items[index]
            }
            Value::Object(map) => match map.get_mut(last.as_str()) {
                Some(slot) => slot,
                None => return Ok(false),
            },
            _ => return Err(self.not_a_container(last)),
        };

        *slot = transform(slot.clone()).map_err(|source| KeypathError::Transform {
            keypath: self.to_string(),
            source,
        })?;
        Ok(true)
    }

    /// Like [`Keypath::replace`], but on a copy: `value` is never modified.
    pub fn replaced<F>(&self, value: &Value, transform: F) -> Result<Value, KeypathError>
    where
        F: FnOnce(Value) -> Result<Value, CoerceError>,
    {
        let mut copy = value.clone();
        self.replace(&mut copy, transform)?;
        Ok(copy)
    }

    fn index(&self, segment: &str, len: usize) -> Result<usize, KeypathError> {
        let index: usize = segment.parse().map_err(|_| KeypathError::InvalidIndex {
            keypath: self.to_string(),
            segment: segment.to_owned(),
        })?;
        if index >= len {
            return Err(KeypathError::IndexOutOfBounds {
                keypath: self.to_string(),
                index,
                len,
            });
        }
        Ok(index)
    }

    fn not_a_container(&self, segment: &str) -> KeypathError {
        KeypathError::NotAContainer {
            keypath: self.to_string(),
            segment: segment.to_owned(),
        }
    }
}
