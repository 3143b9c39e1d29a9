//! Data models for the Dragon Ball API.
//!
//! These models match the API's JSON payloads (camelCase) so they can be passed
//! straight through to the rendering layer.

mod character;
mod ki;
mod page;
mod planet;
mod reference;
mod transformation;

pub use character::*;
pub use ki::*;
pub use page::*;
pub use planet::*;
pub use reference::*;
pub use transformation::*;

use serde::{Deserialize, Serialize};

/// One of the three paginated collections exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Characters,
    Planets,
    Transformations,
}

impl Resource {
    pub const ALL: [Resource; 3] = [
        Resource::Characters,
        Resource::Planets,
        Resource::Transformations,
    ];

    /// Path segment of the collection endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Characters => "characters",
            Resource::Planets => "planets",
            Resource::Transformations => "transformations",
        }
    }

    /// Query parameters the API filters this collection by.
    pub fn filter_params(&self) -> &'static [&'static str] {
        match self {
            Resource::Characters => &["name", "race", "gender", "affiliation"],
            Resource::Planets => &["name", "isDestroyed"],
            Resource::Transformations => &["name", "characterId"],
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything carrying a dataset-wide integer identity.
pub trait Identified {
    fn id(&self) -> i64;
}
