use serde::Deserialize;
use serde_json::Value;

use crate::client::Client;
use crate::error::Error;
use crate::standings::{build_standings, team_ids_in_region, StandingsRow};
use crate::team_stats::{build_team_stats, TeamStatsRow};
use crate::teams::{segment_team_meta, TeamDirectory, TeamMeta};
use crate::types::{EntityId, SegmentPayload};

/// The tables the presentation layer asks for, built on one session.
pub struct Dashboard<C> {
    client: C,
    teams: TeamDirectory,
}

impl<C: Client> Dashboard<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            teams: TeamDirectory::new(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn teams(&self) -> &TeamDirectory {
        &self.teams
    }

    /// Ids of the segments the summary marks as current.
    pub async fn current_segments(&self) -> Result<Vec<EntityId>, Error> {
        let summary = self.client.get_summary().await?;
        Ok(summary
            .current_segments
            .iter()
            .filter_map(|segment| match segment {
                Value::Object(fields) => fields.get("id").and_then(entity_id),
                other => entity_id(other),
            })
            .collect())
    }

    /// Loads the team directory from the summary, once per session.
    pub async fn load_teams(&mut self) -> Result<(), Error> {
        if !self.teams.is_populated() {
            let summary = self.client.get_summary().await?;
            self.teams.populate_from_summary(&summary);
        }
        Ok(())
    }

    pub async fn segment(&self, segment_id: &str) -> Result<SegmentPayload, Error> {
        self.client.get_segment(segment_id).await
    }

    pub async fn standings(
        &mut self,
        segment_id: &str,
        region: &str,
    ) -> Result<Option<Vec<StandingsRow>>, Error> {
        let segment = self.segment(segment_id).await?;
        self.load_teams().await?;
        let ids = team_ids_in_region(&segment, region);
        self.fetch_unknown_teams(&segment, ids, true).await?;
        Ok(build_standings(&segment, region, &self.teams))
    }

    pub async fn team_stats(&mut self, segment_id: &str) -> Result<Option<Vec<TeamStatsRow>>, Error> {
        let segment = self.segment(segment_id).await?;
        self.load_teams().await?;
        let ids = record_team_ids(segment.teams.as_deref());
        self.fetch_unknown_teams(&segment, ids, false).await?;
        Ok(build_team_stats(&segment, &self.teams))
    }

    /// Fetches the teams among `ids` that neither the directory nor the
    /// segment can name, or show a logo for when `needs_logo` is set. A failed
    /// fetch only costs that team its row, except for authentication failures
    /// which abort.
    async fn fetch_unknown_teams(
        &mut self,
        segment: &SegmentPayload,
        ids: Vec<EntityId>,
        needs_logo: bool,
    ) -> Result<(), Error> {
        let segment_teams = segment_team_meta(segment);

        for team_id in ids {
            let known = self.teams.resolve(&team_id, &segment_teams);
            if known.name.is_some() && (known.logo.is_some() || !needs_logo) {
                continue;
            }

            match self.client.get_team(&team_id.0).await {
                Ok(team) => {
                    let meta = TeamMeta::from_payload(&team);
                    let merged = match self.teams.get(&team_id) {
                        Some(existing) => existing.clone().or(meta),
                        None => meta,
                    };
                    self.teams.insert(team_id, merged);
                }
                Err(Error::Auth(e)) => return Err(Error::Auth(e)),
                Err(e) => {
                    tracing::warn!(team = %team_id, error = %e, "could not load team metadata")
                }
            }
        }
        Ok(())
    }
}

fn entity_id(value: &Value) -> Option<EntityId> {
    EntityId::deserialize(value).ok()
}

fn record_team_ids(records: Option<&[Value]>) -> Vec<EntityId> {
    let mut ids: Vec<EntityId> = Vec::new();
    for record in records.into_iter().flatten() {
        if let Some(id) = record.get("teamId").and_then(entity_id) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}
