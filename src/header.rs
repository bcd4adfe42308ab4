//! Raw instrument headers.
//!
//! A [`Header`] is the keyword/value record attached to a solar image. FITS
//! keywords are case-insensitive, so keys are folded to lower case on insert
//! and on lookup: `TELESCOP`, `Telescop` and `telescop` name the same card.

use crate::error::{Result, SourceError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A primitive header value as it appears on a FITS card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl HeaderValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            HeaderValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HeaderValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            HeaderValue::Str(_) => "string",
            HeaderValue::Int(_) => "integer",
            HeaderValue::Float(_) => "float",
            HeaderValue::Bool(_) => "boolean",
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Str(s) => write!(f, "{s}"),
            HeaderValue::Int(i) => write!(f, "{i}"),
            // Whole floats keep their decimal point: 1600.0 prints as "1600.0"
            HeaderValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{v:.1}")
            }
            HeaderValue::Float(v) => write!(f, "{v}"),
            HeaderValue::Bool(true) => write!(f, "True"),
            HeaderValue::Bool(false) => write!(f, "False"),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(s: &str) -> Self {
        HeaderValue::Str(s.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(s: String) -> Self {
        HeaderValue::Str(s)
    }
}

impl From<i64> for HeaderValue {
    fn from(i: i64) -> Self {
        HeaderValue::Int(i)
    }
}

impl From<f64> for HeaderValue {
    fn from(v: f64) -> Self {
        HeaderValue::Float(v)
    }
}

impl From<bool> for HeaderValue {
    fn from(b: bool) -> Self {
        HeaderValue::Bool(b)
    }
}

/// Keyword/value record for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Header {
    cards: BTreeMap<String, HeaderValue>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a keyword. Later cards win over earlier ones.
    pub fn insert(&mut self, key: &str, value: impl Into<HeaderValue>) {
        self.cards.insert(key.to_lowercase(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.cards.contains_key(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.cards.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up a keyword, failing with [`SourceError::MissingKey`] when absent.
    pub fn get(&self, key: &str) -> Result<&HeaderValue> {
        self.cards
            .get(&key.to_lowercase())
            .ok_or_else(|| SourceError::MissingKey(key.to_lowercase()))
    }

    /// Look up a keyword that must hold a string.
    pub fn get_str(&self, key: &str) -> Result<&str> {
        let value = self.get(key)?;
        value.as_str().ok_or_else(|| SourceError::WrongType {
            key: key.to_lowercase(),
            expected: "string",
            found: value.kind(),
        })
    }
}

impl<K: AsRef<str>, V: Into<HeaderValue>> FromIterator<(K, V)> for Header {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut header = Header::new();
        for (k, v) in iter {
            header.insert(k.as_ref(), v);
        }
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_case_insensitive() {
        let mut header = Header::new();
        header.insert("TELESCOP", "SDO/AIA");
        assert_eq!(header.get("telescop").unwrap().as_str(), Some("SDO/AIA"));
        assert_eq!(header.get("Telescop").unwrap().as_str(), Some("SDO/AIA"));
        assert!(header.contains_key("TeLeScOp"));
    }

    #[test]
    fn missing_key_names_the_keyword() {
        let header = Header::new();
        match header.get("DATE-OBS") {
            Err(SourceError::MissingKey(key)) => assert_eq!(key, "date-obs"),
            other => panic!("expected MissingKey, got {other:?}"),
        }
    }

    #[test]
    fn get_str_rejects_numbers() {
        let header: Header = [("wavelnth", 171i64)].into_iter().collect();
        assert!(matches!(
            header.get_str("wavelnth"),
            Err(SourceError::WrongType { expected: "string", found: "integer", .. })
        ));
    }

    #[test]
    fn display_matches_header_text() {
        assert_eq!(HeaderValue::Int(171).to_string(), "171");
        assert_eq!(HeaderValue::Float(1600.0).to_string(), "1600.0");
        assert_eq!(HeaderValue::Float(975.5).to_string(), "975.5");
        assert_eq!(HeaderValue::Bool(true).to_string(), "True");
        assert_eq!(HeaderValue::from("SDO/AIA").to_string(), "SDO/AIA");
    }
}
