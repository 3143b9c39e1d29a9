//! Client-side search and filter engine for the character list.
//!
//! [`derive_view`] is a pure function of the loaded characters and the current
//! [`FilterCriteria`]. The view is recomputed from scratch on every read; the
//! loaded collection is bounded by what pagination has fetched.

mod relations;

pub use relations::*;

use serde::{Deserialize, Serialize};

use crate::models::Character;

/// Inclusive power bounds, compared against `maxKi` (unknown counts as 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerRange {
    pub min: f64,
    pub max: f64,
}

impl PowerRange {
    pub fn contains(&self, power: f64) -> bool {
        power >= self.min && power <= self.max
    }
}

/// Attribute predicates, each optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_alive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_transformations: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_range: Option<PowerRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
}

/// Everything the character list is currently filtered by.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default)]
    pub search_query: String,
    #[serde(default)]
    pub selected_planet_id: Option<i64>,
    #[serde(default)]
    pub active_filters: ActiveFilters,
    /// Soft-deleted characters are kept unless this is set.
    #[serde(default)]
    pub hide_deleted: bool,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// All predicates combined with logical AND.
    pub fn matches(&self, character: &Character) -> bool {
        let query = self.search_query.as_str();
        if !query.is_empty() && !contains_ignore_case(&character.name, query) {
            return false;
        }

        if let Some(planet_id) = self.selected_planet_id {
            if character.origin_planet_id() != Some(planet_id) {
                return false;
            }
        }

        let filters = &self.active_filters;

        // Unknown liveness never matches either value.
        if let Some(alive) = filters.is_alive {
            if character.is_alive != Some(alive) {
                return false;
            }
        }

        if filters.has_transformations == Some(true) && !character.has_transformations() {
            return false;
        }

        if let Some(range) = filters.power_range {
            if !range.contains(character.power()) {
                return false;
            }
        }

        if !attribute_matches(filters.race.as_deref(), character.race.as_deref())
            || !attribute_matches(
                filters.gender.as_deref(),
                character.gender.as_ref().map(|g| g.as_str()),
            )
            || !attribute_matches(
                filters.affiliation.as_deref(),
                character.affiliation.as_deref(),
            )
        {
            return false;
        }

        !(self.hide_deleted && character.is_deleted())
    }
}

/// Filtered subsequence of `characters`, in their original order.
pub fn derive_view<'a, I>(characters: I, criteria: &FilterCriteria) -> Vec<&'a Character>
where
    I: IntoIterator<Item = &'a Character>,
{
    if criteria.is_empty() {
        return characters.into_iter().collect();
    }
    characters
        .into_iter()
        .filter(|character| criteria.matches(character))
        .collect()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn attribute_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted.map(str::trim).filter(|w| !w.is_empty()) {
        None => true,
        Some(wanted) => actual.is_some_and(|actual| actual.trim().eq_ignore_ascii_case(wanted)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn character(value: serde_json::Value) -> Character {
        serde_json::from_value(value).unwrap()
    }

    fn roster() -> Vec<Character> {
        vec![
            character(json!({
                "id": 1, "name": "Goku", "race": "Saiyan", "gender": "Male",
                "affiliation": "Z Fighter", "maxKi": "90 Septillion", "isAlive": true,
                "originPlanet": {"id": 3, "name": "Vegeta"},
                "transformations": [{"id": 1, "name": "Goku SSJ"}]
            })),
            character(json!({
                "id": 2, "name": "Gohan", "race": "Half-Saiyan", "gender": "Male",
                "affiliation": "Z Fighter", "maxKi": "40.000.000", "isAlive": true,
                "originPlanet": {"id": 1, "name": "Tierra"}, "transformations": []
            })),
            character(json!({
                "id": 3, "name": "Vegeta", "race": "Saiyan", "gender": "Male",
                "maxKi": "19.84 Septillion", "isAlive": false,
                "originPlanet": {"id": 3, "name": "Vegeta"}
            })),
            character(json!({
                "id": 4, "name": "Bulma", "race": "Human", "gender": "Female",
                "maxKi": "unknown", "deletedAt": "2024-01-01T00:00:00Z"
            })),
        ]
    }

    fn ids(view: &[&Character]) -> Vec<i64> {
        view.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_empty_criteria_is_identity() {
        let characters = roster();
        let view = derive_view(&characters, &FilterCriteria::default());
        assert_eq!(ids(&view), vec![1, 2, 3, 4]);
        assert!(FilterCriteria::default().is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let characters = vec![
            character(json!({"id": 1, "name": "Goku"})),
            character(json!({"id": 2, "name": "Gohan"})),
            character(json!({"id": 3, "name": "Vegeta"})),
        ];
        let criteria = FilterCriteria {
            search_query: "go".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&derive_view(&characters, &criteria)), vec![1, 2]);

        let criteria = FilterCriteria {
            search_query: "VEG".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&derive_view(&characters, &criteria)), vec![3]);

        // Whitespace is part of the query
        let criteria = FilterCriteria {
            search_query: "goku ".to_string(),
            ..Default::default()
        };
        assert!(derive_view(&characters, &criteria).is_empty());
    }

    #[test]
    fn test_blank_query_matches_only_names_with_spaces() {
        let characters = vec![
            character(json!({"id": 1, "name": "Goku"})),
            character(json!({"id": 2, "name": "Master Roshi"})),
        ];
        let criteria = FilterCriteria {
            search_query: " ".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&derive_view(&characters, &criteria)), vec![2]);
    }

    #[test]
    fn test_planet_filter_excludes_missing_planet() {
        let characters = vec![
            character(json!({"id": 1, "name": "a", "originPlanet": {"id": 10}})),
            character(json!({"id": 2, "name": "b"})),
        ];
        let criteria = FilterCriteria {
            selected_planet_id: Some(10),
            ..Default::default()
        };
        assert_eq!(ids(&derive_view(&characters, &criteria)), vec![1]);
    }

    #[test]
    fn test_power_range_treats_unknown_as_zero() {
        let characters = vec![
            character(json!({"id": 1, "name": "a"})),
            character(json!({"id": 2, "name": "b", "maxKi": 500})),
        ];
        let criteria = FilterCriteria {
            active_filters: ActiveFilters {
                power_range: Some(PowerRange { min: 0.0, max: 100.0 }),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(ids(&derive_view(&characters, &criteria)), vec![1]);

        let criteria = FilterCriteria {
            active_filters: ActiveFilters {
                power_range: Some(PowerRange { min: 500.0, max: 500.0 }),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(ids(&derive_view(&characters, &criteria)), vec![2]);
    }

    #[test]
    fn test_liveness_unknown_never_matches() {
        let characters = roster();
        let alive = FilterCriteria {
            active_filters: ActiveFilters {
                is_alive: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(ids(&derive_view(&characters, &alive)), vec![1, 2]);

        let dead = FilterCriteria {
            active_filters: ActiveFilters {
                is_alive: Some(false),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(ids(&derive_view(&characters, &dead)), vec![3]);
    }

    #[test]
    fn test_has_transformations() {
        let characters = roster();
        let criteria = FilterCriteria {
            active_filters: ActiveFilters {
                has_transformations: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(ids(&derive_view(&characters, &criteria)), vec![1]);

        let unconstrained = FilterCriteria {
            active_filters: ActiveFilters {
                has_transformations: Some(false),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(derive_view(&characters, &unconstrained).len(), 4);
    }

    #[test]
    fn test_attribute_filters() {
        let characters = roster();
        let criteria = FilterCriteria {
            active_filters: ActiveFilters {
                race: Some("saiyan".to_string()),
                gender: Some("Male".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(ids(&derive_view(&characters, &criteria)), vec![1, 3]);

        let criteria = FilterCriteria {
            active_filters: ActiveFilters {
                affiliation: Some("z fighter".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(ids(&derive_view(&characters, &criteria)), vec![1, 2]);
    }

    #[test]
    fn test_hide_deleted_is_opt_in() {
        let characters = roster();
        let criteria = FilterCriteria {
            hide_deleted: true,
            ..Default::default()
        };
        assert_eq!(ids(&derive_view(&characters, &criteria)), vec![1, 2, 3]);
    }

    #[test]
    fn test_combined_criteria_are_subsequence_and_idempotent() {
        let characters = roster();
        let criteria = FilterCriteria {
            search_query: "e".to_string(),
            selected_planet_id: Some(3),
            active_filters: ActiveFilters {
                power_range: Some(PowerRange {
                    min: 1.0,
                    max: f64::MAX,
                }),
                ..Default::default()
            },
            hide_deleted: false,
        };

        let first = derive_view(&characters, &criteria);
        assert_eq!(ids(&first), vec![3]);

        let second = derive_view(first.iter().copied(), &criteria);
        assert_eq!(ids(&second), ids(&first));

        // Every result appears in the source in the same relative order.
        let mut source = characters.iter().map(|c| c.id);
        assert!(ids(&first).iter().all(|id| source.any(|s| s == *id)));
    }
}
