//! Resolution of weak references across collections.
//!
//! Auxiliary collections may be only partially loaded when these run, so every
//! lookup degrades to an "unknown" value instead of failing.

use serde::Serialize;

use crate::models::{Character, CharacterSummary, Planet, Ref, Transformation};

pub const UNKNOWN_LABEL: &str = "Unknown";

/// How a planet's resident list was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResidentSource {
    /// The planet payload carried its own list.
    PlanetList,
    /// Derived from the characters' `originPlanet`.
    OriginPlanet,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Residents {
    pub source: ResidentSource,
    pub characters: Vec<CharacterSummary>,
}

/// Residents of `planet_id`. Uses the planet's own list when it carries a
/// non-empty one, otherwise filters `characters` by origin planet.
pub fn residents(planet_id: i64, planet: Option<&Planet>, characters: &[Character]) -> Residents {
    match planet.and_then(|p| p.characters.as_ref()).filter(|list| !list.is_empty()) {
        Some(list) => Residents {
            source: ResidentSource::PlanetList,
            characters: list
                .iter()
                .map(|reference| resolve_character(reference, characters))
                .collect(),
        },
        None => Residents {
            source: ResidentSource::OriginPlanet,
            characters: characters
                .iter()
                .filter(|c| c.origin_planet_id() == Some(planet_id))
                .map(CharacterSummary::from)
                .collect(),
        },
    }
}

/// Owner of a transformation, if the payload references one.
pub fn transformation_owner(
    transformation: &Transformation,
    characters: &[Character],
) -> Option<CharacterSummary> {
    transformation
        .character
        .as_ref()
        .map(|reference| resolve_character(reference, characters))
}

/// Display name of a character's origin planet.
pub fn planet_label(character: &Character, planets: &[Planet]) -> String {
    let Some(origin) = &character.origin_planet else {
        return UNKNOWN_LABEL.to_string();
    };
    origin
        .name
        .clone()
        .or_else(|| {
            planets
                .iter()
                .find(|p| p.id == origin.id)
                .map(|p| p.name.clone())
        })
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

fn resolve_character(
    reference: &Ref<CharacterSummary>,
    characters: &[Character],
) -> CharacterSummary {
    reference
        .resolve(|id| {
            characters
                .iter()
                .find(|c| c.id == id)
                .map(CharacterSummary::from)
        })
        .unwrap_or_else(|| CharacterSummary::unknown(reference.id()))
}
