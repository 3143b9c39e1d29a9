//! Weak references between collections.
//!
//! Depending on the endpoint and schema revision, a reference to another
//! entity arrives either as a bare id or as an embedded object. Both decode into
//! [`Ref`], and [`Ref::resolve`] is the single place where one is dereferenced.

use serde::{Deserialize, Serialize};

use super::{Character, Identified};

/// Reference to an entity owned by another collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Id(i64),
    Embedded(T),
}

impl<T: Identified + Clone> Ref<T> {
    /// Id of the referenced entity, whichever form it arrived in.
    pub fn id(&self) -> i64 {
        match self {
            Ref::Id(id) => *id,
            Ref::Embedded(value) => value.id(),
        }
    }

    /// Dereference: embedded values are returned as-is, bare ids go through
    /// `lookup` against whatever has been loaded so far.
    pub fn resolve<F>(&self, lookup: F) -> Option<T>
    where
        F: FnOnce(i64) -> Option<T>,
    {
        match self {
            Ref::Id(id) => lookup(*id),
            Ref::Embedded(value) => Some(value.clone()),
        }
    }
}

/// Minimal view of a character used wherever another entity points at one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSummary {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CharacterSummary {
    /// Placeholder for an id whose character has not been loaded.
    pub fn unknown(id: i64) -> Self {
        Self {
            id,
            name: None,
            image: None,
        }
    }
}

impl Identified for CharacterSummary {
    fn id(&self) -> i64 {
        self.id
    }
}

impl From<&Character> for CharacterSummary {
    fn from(character: &Character) -> Self {
        Self {
            id: character.id,
            name: Some(character.name.clone()),
            image: character.image.clone(),
        }
    }
}
