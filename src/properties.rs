//! Normalized map properties.
//!
//! [`Properties`] is the instrument-agnostic key set a map container is built
//! from. Data sources start from the container's defaults (a
//! [`PropertyDefaults`] provider) and overlay their own fields on top.

use crate::header::HeaderValue;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Semantic property keys understood by the map container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKey {
    Date,
    Detector,
    Instrument,
    Measurement,
    Observatory,
    Name,
    SolarRadius,
    Normalization,
    Colormap,
}

impl PropertyKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKey::Date => "date",
            PropertyKey::Detector => "detector",
            PropertyKey::Instrument => "instrument",
            PropertyKey::Measurement => "measurement",
            PropertyKey::Observatory => "observatory",
            PropertyKey::Name => "name",
            PropertyKey::SolarRadius => "solar_radius",
            PropertyKey::Normalization => "normalization",
            PropertyKey::Colormap => "colormap",
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Linear intensity normalization handed through to rendering untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, serde::Deserialize)]
pub struct Normalization {
    pub vmin: f64,
    pub vmax: f64,
    pub clip: bool,
}

/// A typed property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Explicitly unset. Distinct from the key being absent.
    Null,
    Date(NaiveDateTime),
    Text(String),
    /// A header value passed through verbatim, type preserved.
    Header(HeaderValue),
    Normalization(Normalization),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => f.write_str("None"),
            PropertyValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S%.6f")),
            PropertyValue::Text(s) => f.write_str(s),
            PropertyValue::Header(v) => write!(f, "{v}"),
            PropertyValue::Normalization(n) => {
                write!(f, "linear [{}, {}] clip={}", n.vmin, n.vmax, n.clip)
            }
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<NaiveDateTime> for PropertyValue {
    fn from(d: NaiveDateTime) -> Self {
        PropertyValue::Date(d)
    }
}

impl From<HeaderValue> for PropertyValue {
    fn from(v: HeaderValue) -> Self {
        PropertyValue::Header(v)
    }
}

impl From<Normalization> for PropertyValue {
    fn from(n: Normalization) -> Self {
        PropertyValue::Normalization(n)
    }
}

/// Property mapping consumed by the map container.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Properties {
    values: BTreeMap<PropertyKey, PropertyValue>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: PropertyKey, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: PropertyKey, value: impl Into<PropertyValue>) {
        self.values.insert(key, value.into());
    }

    pub fn get(&self, key: PropertyKey) -> Option<&PropertyValue> {
        self.values.get(&key)
    }

    pub fn contains_key(&self, key: PropertyKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropertyKey, &PropertyValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Overlay `overrides` onto `self`. Keys present in both take the value
    /// from `overrides`; everything else is kept.
    pub fn merge(&mut self, overrides: Properties) {
        self.values.extend(overrides.values);
    }

    /// Convenience accessor for the display name.
    pub fn name(&self) -> Option<&str> {
        match self.get(PropertyKey::Name) {
            Some(PropertyValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn date(&self) -> Option<NaiveDateTime> {
        match self.get(PropertyKey::Date) {
            Some(PropertyValue::Date(d)) => Some(*d),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults provider
// ---------------------------------------------------------------------------

/// Source of the container's default properties.
///
/// Called once per normalization; every call must return a fresh mapping.
pub trait PropertyDefaults: Send + Sync {
    fn default_properties(&self) -> Properties;
}

impl<F> PropertyDefaults for F
where
    F: Fn() -> Properties + Send + Sync,
{
    fn default_properties(&self) -> Properties {
        self()
    }
}

/// Stock defaults of the generic map: every semantic key present and unset,
/// plus a colormap and linear normalization taken from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseMapDefaults {
    pub colormap: String,
    pub normalization: Normalization,
}

impl Default for BaseMapDefaults {
    fn default() -> Self {
        Self {
            colormap: "gray".to_string(),
            normalization: Normalization {
                vmin: 5.0,
                vmax: 1024.0,
                clip: true,
            },
        }
    }
}

impl PropertyDefaults for BaseMapDefaults {
    fn default_properties(&self) -> Properties {
        Properties::new()
            .with(PropertyKey::Colormap, self.colormap.as_str())
            .with(PropertyKey::Normalization, self.normalization)
            .with(PropertyKey::Date, PropertyValue::Null)
            .with(PropertyKey::Detector, PropertyValue::Null)
            .with(PropertyKey::Instrument, PropertyValue::Null)
            .with(PropertyKey::Measurement, PropertyValue::Null)
            .with(PropertyKey::Observatory, PropertyValue::Null)
            .with(PropertyKey::Name, PropertyValue::Null)
            .with(PropertyKey::SolarRadius, PropertyValue::Null)
    }
}
