//! Planet model matching the API planet payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CharacterSummary, Identified, Ref};

/// A planet from the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planet {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub is_destroyed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Residents, when the endpoint carries them (bare ids or embedded characters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<Vec<Ref<CharacterSummary>>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Planet {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Identified for Planet {
    fn id(&self) -> i64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planet_with_resident_ids() {
        let planet: Planet = serde_json::from_str(
            r#"{"id": 1, "name": "Namek", "isDestroyed": true, "characters": [7, 8]}"#,
        )
        .unwrap();
        let ids: Vec<i64> = planet.characters.unwrap().iter().map(Ref::id).collect();
        assert_eq!(ids, vec![7, 8]);
    }

    #[test]
    fn test_planet_with_embedded_residents() {
        let planet: Planet = serde_json::from_str(
            r#"{"id": 2, "name": "Tierra", "characters": [{"id": 1, "name": "Goku", "ki": "60.000.000"}]}"#,
        )
        .unwrap();
        assert!(!planet.is_destroyed);
        assert!(matches!(
            planet.characters.as_deref(),
            Some([Ref::Embedded(CharacterSummary { id: 1, .. })])
        ));
    }
}
