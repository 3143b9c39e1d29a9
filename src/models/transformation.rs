//! Transformation model matching the API transformation payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CharacterSummary, Identified, Ki, Ref};

/// A transformation from the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transformation {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ki: Option<Ki>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ki: Option<Ki>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning character, as a bare id or an embedded object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<Ref<CharacterSummary>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Identified for Transformation {
    fn id(&self) -> i64 {
        self.id
    }
}
