//! Byte-to-name mappings used by the decoder.
//!
//! Mappings are serialized as JSON objects keyed by strings, the same shape the
//! device configuration files use:
//!
//! ```json
//! {
//!   "buttons": { "1:8": "TopLeft", "2": "Thumb" },
//!   "scrollWheels": { "6": "Scroll", "7": "Jog" }
//! }
//! ```
//!
//! Keys are parsed into integer byte indices when the mapping is loaded, so the
//! decoder never compares stringified indices.

use crate::error::MappingError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Button mapping: exact `(index, value)` entries take priority over
/// whole-byte `index` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct ButtonMap {
    exact: BTreeMap<(usize, u8), String>,
    by_index: BTreeMap<usize, String>,
}

impl ButtonMap {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a specific value of a byte to a button name.
    pub fn insert_exact(&mut self, index: usize, value: u8, name: impl Into<String>) {
        self.exact.insert((index, value), name.into());
    }

    /// Map any non-zero value of a byte to a button name.
    pub fn insert_index(&mut self, index: usize, name: impl Into<String>) {
        self.by_index.insert(index, name.into());
    }

    /// Resolve the button name for `value` at `index`.
    pub fn resolve(&self, index: usize, value: u8) -> Option<&str> {
        self.exact
            .get(&(index, value))
            .or_else(|| self.by_index.get(&index))
            .map(String::as_str)
    }

    /// Whether any entry refers to `index`.
    pub fn covers_index(&self, index: usize) -> bool {
        self.by_index.contains_key(&index) || self.exact.keys().any(|(i, _)| *i == index)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.exact.len() + self.by_index.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.by_index.is_empty()
    }
}

impl TryFrom<BTreeMap<String, String>> for ButtonMap {
    type Error = MappingError;

    fn try_from(raw: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut map = ButtonMap::new();
        for (key, name) in raw {
            if name.trim().is_empty() {
                return Err(MappingError::EmptyName(key));
            }
            match key.split_once(':') {
                Some((index, value)) => {
                    let index = parse_index(&key, index)?;
                    let value = value
                        .trim()
                        .parse::<u8>()
                        .ok()
                        .ok_or_else(|| MappingError::InvalidValue(key.clone()))?;
                    map.insert_exact(index, value, name);
                }
                None => {
                    let index = parse_index(&key, &key)?;
                    map.insert_index(index, name);
                }
            }
        }
        Ok(map)
    }
}

impl From<ButtonMap> for BTreeMap<String, String> {
    fn from(map: ButtonMap) -> Self {
        let exact = map
            .exact
            .into_iter()
            .map(|((index, value), name)| (format!("{index}:{value}"), name));
        let by_index = map
            .by_index
            .into_iter()
            .map(|(index, name)| (index.to_string(), name));
        exact.chain(by_index).collect()
    }
}

/// Scroll wheel mapping: byte index to wheel name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct ScrollWheelMap {
    wheels: BTreeMap<usize, String>,
}

impl ScrollWheelMap {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a byte index to a wheel name.
    pub fn insert(&mut self, index: usize, name: impl Into<String>) {
        self.wheels.insert(index, name.into());
    }

    /// Wheel name for `index`, if configured.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.wheels.get(&index).map(String::as_str)
    }

    /// Iterate configured `(index, name)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.wheels.iter().map(|(i, n)| (*i, n.as_str()))
    }

    /// Number of configured wheels.
    pub fn len(&self) -> usize {
        self.wheels.len()
    }

    /// Whether no wheel is configured.
    pub fn is_empty(&self) -> bool {
        self.wheels.is_empty()
    }
}

impl TryFrom<BTreeMap<String, String>> for ScrollWheelMap {
    type Error = MappingError;

    fn try_from(raw: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut map = ScrollWheelMap::new();
        for (key, name) in raw {
            if name.trim().is_empty() {
                return Err(MappingError::EmptyName(key));
            }
            let index = parse_index(&key, &key)?;
            map.insert(index, name);
        }
        Ok(map)
    }
}

impl From<ScrollWheelMap> for BTreeMap<String, String> {
    fn from(map: ScrollWheelMap) -> Self {
        map.wheels
            .into_iter()
            .map(|(index, name)| (index.to_string(), name))
            .collect()
    }
}

fn parse_index(key: &str, index: &str) -> Result<usize, MappingError> {
    index
        .trim()
        .parse::<usize>()
        .ok()
        .ok_or_else(|| MappingError::InvalidKey(key.to_string()))
}

/// Complete decoder mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecoderConfig {
    /// Button mapping.
    pub buttons: ButtonMap,
    /// Scroll wheel mapping.
    pub scroll_wheels: ScrollWheelMap,
}

impl DecoderConfig {
    /// Mapping for the MX Dialpad vendor interface.
    ///
    /// Byte 1 carries the four buttons as a bitmask, bytes 6 and 7 carry the
    /// scroll and jog wheel velocity codes.
    pub fn mx_dialpad() -> Self {
        let mut buttons = ButtonMap::new();
        buttons.insert_exact(1, 8, "TopLeft");
        buttons.insert_exact(1, 16, "TopRight");
        buttons.insert_exact(1, 32, "BottomLeft");
        buttons.insert_exact(1, 64, "BottomRight");

        let mut scroll_wheels = ScrollWheelMap::new();
        scroll_wheels.insert(6, "Scroll");
        scroll_wheels.insert(7, "Jog");

        Self {
            buttons,
            scroll_wheels,
        }
    }
}
