//! Power measures as published by the API.
//!
//! The API is inconsistent about `ki`/`maxKi`: some entries are JSON numbers,
//! most are display strings such as `"60.000.000"` or `"90 Septillion"`, and a
//! few are `"unknown"`. [`Ki`] keeps the raw text for display and parses it on
//! demand into a comparable magnitude.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Named magnitudes used by the dataset, short scale.
const MAGNITUDES: &[(&str, f64)] = &[
    ("thousand", 1e3),
    ("million", 1e6),
    ("billion", 1e9),
    ("trillion", 1e12),
    ("quadrillion", 1e15),
    ("quintillion", 1e18),
    ("sextillion", 1e21),
    ("septillion", 1e24),
    ("octillion", 1e27),
    ("nonillion", 1e30),
    ("decillion", 1e33),
    ("googol", 1e100),
];

/// A raw power value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ki(String);

impl Ki {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The value exactly as the API sent it.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric magnitude, or `None` when the value is unknown or unparseable.
    pub fn power(&self) -> Option<f64> {
        parse_power(&self.0)
    }
}

impl From<&str> for Ki {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl Serialize for Ki {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Ki {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawKi {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        Ok(match RawKi::deserialize(deserializer)? {
            RawKi::Text(text) => Ki(text),
            RawKi::Integer(n) => Ki(n.to_string()),
            RawKi::Float(n) => Ki(n.to_string()),
        })
    }
}

fn parse_power(raw: &str) -> Option<f64> {
    let text = raw.trim().to_ascii_lowercase();
    if matches!(text.as_str(), "infinite" | "infinity") {
        return Some(f64::INFINITY);
    }

    let mut words = text.split_whitespace();
    let number = words.next()?;
    let scale = match words.next() {
        None => return parse_grouped(number),
        Some(word) => MAGNITUDES
            .iter()
            .find(|(name, _)| *name == word)
            .map(|(_, scale)| *scale)?,
    };
    if words.next().is_some() {
        return None;
    }

    parse_grouped(number).map(|n| n * scale)
}

/// Parses digits that may use `.` or `,` either as thousands separators
/// (`"60.000.000"`) or as a single decimal point (`"11.7"`).
fn parse_grouped(number: &str) -> Option<f64> {
    if !number.chars().any(|c| c.is_ascii_digit())
        || !number
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return None;
    }

    let groups: Vec<&str> = number.split(['.', ',']).collect();
    let thousands = groups.len() > 1
        && !groups[0].is_empty()
        && groups[0].len() <= 3
        && groups[1..].iter().all(|g| g.len() == 3);

    if thousands {
        groups.concat().parse().ok()
    } else if groups.len() <= 2 {
        number.replace(',', ".").parse().ok()
    } else {
        None
    }
}
