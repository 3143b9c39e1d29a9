//! Character model matching the API character payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Identified, Ki};

/// Gender as published by the API. Unrecognised values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    Unknown,
    Other(String),
}

impl Gender {
    pub fn as_str(&self) -> &str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Unknown => "Unknown",
            Gender::Other(value) => value,
        }
    }
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Male" => Gender::Male,
            "Female" => Gender::Female,
            "Unknown" => Gender::Unknown,
            _ => Gender::Other(value),
        }
    }
}

impl From<Gender> for String {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

/// Weak reference to a character's origin planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetRef {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Weak reference to one of a character's transformations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationRef {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ki: Option<Ki>,
}

/// A character from the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ki: Option<Ki>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ki: Option<Ki>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_planet: Option<PlanetRef>,
    /// `None` means unknown, which is distinct from `Some(false)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_alive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformations: Option<Vec<TransformationRef>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Character {
    /// Power used for range filtering: parsed `maxKi`, or `0` when unknown.
    pub fn power(&self) -> f64 {
        self.max_ki.as_ref().and_then(Ki::power).unwrap_or(0.0)
    }

    pub fn origin_planet_id(&self) -> Option<i64> {
        self.origin_planet.as_ref().map(|planet| planet.id)
    }

    pub fn has_transformations(&self) -> bool {
        self.transformations
            .as_ref()
            .is_some_and(|list| !list.is_empty())
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Identified for Character {
    fn id(&self) -> i64 {
        self.id
    }
}
