use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::types::{EntityId, SegmentPayload, SummaryPayload, TeamPayload};

/// Display metadata for one team.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TeamMeta {
    pub name: Option<String>,
    pub logo: Option<String>,
    pub color: Option<String>,
}

impl TeamMeta {
    /// The logo, or the icon when the team has no logo.
    pub fn from_payload(team: &TeamPayload) -> Self {
        Self {
            name: team.name.clone(),
            logo: team.logo.clone().or_else(|| team.icon.clone()),
            color: team.color.clone(),
        }
    }

    /// Fills the gaps of `self` from `other`.
    pub fn or(self, other: TeamMeta) -> TeamMeta {
        TeamMeta {
            name: self.name.or(other.name),
            logo: self.logo.or(other.logo),
            color: self.color.or(other.color),
        }
    }
}

/// Session-owned side table of team metadata, keyed by team id.
///
/// `populated` is set once the bulk load from the summary has happened; teams
/// added one by one afterwards do not change it.
#[derive(Clone, Debug, Default)]
pub struct TeamDirectory {
    teams: HashMap<EntityId, TeamMeta>,
    populated: bool,
}

impl TeamDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// Loads every team listed in the summary, whether the API sends them as
    /// an object keyed by id or as a list. Unreadable records are skipped.
    pub fn populate_from_summary(&mut self, summary: &SummaryPayload) {
        let records: Vec<(Option<EntityId>, &Value)> = match &summary.teams {
            Value::Object(map) => map
                .iter()
                .map(|(id, team)| (Some(EntityId(id.clone())), team))
                .collect(),
            Value::Array(list) => list.iter().map(|team| (None, team)).collect(),
            _ => Vec::new(),
        };

        for (key, record) in records {
            let team = match TeamPayload::deserialize(record) {
                Ok(team) => team,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable team in summary");
                    continue;
                }
            };
            match team.key().or(key) {
                Some(id) => self.insert(id, TeamMeta::from_payload(&team)),
                None => tracing::warn!("skipping summary team without id"),
            }
        }

        self.populated = true;
        tracing::debug!(teams = self.teams.len(), "team directory populated");
    }

    pub fn insert(&mut self, id: EntityId, meta: TeamMeta) {
        self.teams.insert(id, meta);
    }

    pub fn get(&self, id: &EntityId) -> Option<&TeamMeta> {
        self.teams.get(id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.teams.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Metadata for `id`, with gaps filled from the segment's own records.
    pub fn resolve(&self, id: &EntityId, segment_teams: &HashMap<EntityId, TeamMeta>) -> TeamMeta {
        let known = self.get(id).cloned().unwrap_or_default();
        match segment_teams.get(id) {
            Some(meta) => known.or(meta.clone()),
            None => known,
        }
    }
}

/// Display metadata carried by the segment's `teams` records, if any.
pub fn segment_team_meta(segment: &SegmentPayload) -> HashMap<EntityId, TeamMeta> {
    segment
        .teams
        .iter()
        .flatten()
        .filter_map(|record| TeamPayload::deserialize(record).ok())
        .filter_map(|team| {
            let meta = TeamMeta::from_payload(&team);
            team.key().map(|id| (id, meta))
        })
        .collect()
}
