use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Entity id as the API sends it, either a JSON string or a number.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => EntityId(s),
            Raw::Number(n) => EntityId(n.to_string()),
        })
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId(s.into())
    }
}

/// Top-level index of segments, teams, players and matches.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPayload {
    #[serde(default)]
    pub current_segments: Vec<Value>,
    #[serde(default)]
    pub segments: Value,
    /// Either an object keyed by team id or a list of team records.
    #[serde(default)]
    pub teams: Value,
    #[serde(default)]
    pub players: Value,
    #[serde(default)]
    pub matches: Value,
}

/// Standings and team records stay raw JSON so a single malformed record
/// can be dropped by the transformers without failing the whole payload.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SegmentPayload {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub standings: Option<Vec<Value>>,
    #[serde(default)]
    pub teams: Option<Vec<Value>>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPayload {
    pub id: Option<EntityId>,
    /// Segment records name the team by `teamId` instead of `id`.
    pub team_id: Option<EntityId>,
    pub name: Option<String>,
    pub code: Option<String>,
    pub logo: Option<String>,
    pub icon: Option<String>,
    #[serde(alias = "primaryColor")]
    pub color: Option<String>,
}

impl TeamPayload {
    pub fn key(&self) -> Option<EntityId> {
        self.id.clone().or_else(|| self.team_id.clone())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PlayerPayload {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MatchPayload {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
