use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DataError;
use crate::teams::{segment_team_meta, TeamDirectory, TeamMeta};
use crate::types::{EntityId, SegmentPayload};

/// One line of a regional standings table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StandingsRow {
    pub rank: u32,
    pub team_id: EntityId,
    pub team_name: String,
    pub logo_url: String,
    pub region: String,
    pub wins: u32,
    pub losses: u32,
    pub matches_played: u32,
    /// `None` when the team has not played yet.
    pub win_pct: Option<String>,
    pub game_wins: u32,
    pub game_losses: u32,
    pub game_ties: u32,
    pub map_record: String,
    pub differential: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StandingRecord {
    team_id: Option<EntityId>,
    match_wins: Option<u32>,
    match_losses: Option<u32>,
    game_wins: Option<u32>,
    game_losses: Option<u32>,
    game_ties: Option<u32>,
    game_differential: Option<i64>,
    divisions: Option<HashMap<String, DivisionEntry>>,
}

#[derive(Deserialize)]
struct DivisionEntry {
    rank: Option<u32>,
}

/// Builds the standings table of `region` for a segment.
///
/// Returns `None` when the segment has no standings published, or when no
/// team of the region survives validation. Records missing a required field
/// are logged and dropped one by one. Rows come back sorted by rank; teams
/// sharing a rank keep their input order.
pub fn build_standings(
    segment: &SegmentPayload,
    region: &str,
    teams: &TeamDirectory,
) -> Option<Vec<StandingsRow>> {
    let records = segment.standings.as_deref().filter(|s| !s.is_empty())?;
    let segment_id = segment_label(segment);
    let segment_teams = segment_team_meta(segment);

    let mut rows = Vec::new();
    for (index, record) in records.iter().enumerate() {
        match standing_row(&segment_id, index, record, region, teams, &segment_teams) {
            Ok(Some(row)) => rows.push(row),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "dropping standings record"),
        }
    }

    if rows.is_empty() {
        tracing::debug!(segment = %segment_id, %region, "no standings");
        return None;
    }

    rows.sort_by_key(|row| row.rank);
    Some(rows)
}

/// The distinct regions present in a segment's standings, sorted.
pub fn regions(segment: &SegmentPayload) -> Vec<String> {
    let segment_id = segment_label(segment);
    segment
        .standings
        .iter()
        .flatten()
        .enumerate()
        .filter_map(|(index, record)| {
            let record = parse_record(&segment_id, index, record).ok()?;
            let team_id = record.team_id.clone().unwrap_or_else(|| unknown_team(index));
            division(&segment_id, &team_id, &record).ok().map(|(r, _)| r)
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Ids of the teams ranked in `region`, deduplicated in input order.
pub fn team_ids_in_region(segment: &SegmentPayload, region: &str) -> Vec<EntityId> {
    let segment_id = segment_label(segment);
    let mut ids: Vec<EntityId> = Vec::new();
    for (index, record) in segment.standings.iter().flatten().enumerate() {
        let Ok(record) = parse_record(&segment_id, index, record) else {
            continue;
        };
        let Some(team_id) = record.team_id.clone() else {
            continue;
        };
        match division(&segment_id, &team_id, &record) {
            Ok((row_region, _)) if row_region == region && !ids.contains(&team_id) => {
                ids.push(team_id)
            }
            _ => {}
        }
    }
    ids
}

pub(crate) fn segment_label(segment: &SegmentPayload) -> String {
    segment
        .id
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "<unknown>".into())
}

pub(crate) fn unknown_team(index: usize) -> EntityId {
    EntityId(format!("<record #{index}>"))
}

fn parse_record(segment_id: &str, index: usize, record: &Value) -> Result<StandingRecord, DataError> {
    StandingRecord::deserialize(record).map_err(|source| DataError::Malformed {
        segment_id: segment_id.into(),
        index,
        source,
    })
}

/// A team belongs to exactly one division per segment; anything else is
/// rejected rather than guessing which entry to use.
fn division(
    segment_id: &str,
    team_id: &EntityId,
    record: &StandingRecord,
) -> Result<(String, u32), DataError> {
    let divisions = required(record.divisions.as_ref(), "divisions", segment_id, team_id)?;
    if divisions.len() != 1 {
        return Err(DataError::DivisionCardinality {
            segment_id: segment_id.into(),
            team_id: team_id.to_string(),
            count: divisions.len(),
        });
    }

    let (region, entry) = divisions
        .iter()
        .next()
        .ok_or_else(|| missing(segment_id, team_id, "divisions"))?;
    let rank = required(entry.rank, "rank", segment_id, team_id)?;
    Ok((region.clone(), rank))
}

fn standing_row(
    segment_id: &str,
    index: usize,
    record: &Value,
    region: &str,
    teams: &TeamDirectory,
    segment_teams: &HashMap<EntityId, TeamMeta>,
) -> Result<Option<StandingsRow>, DataError> {
    let record = parse_record(segment_id, index, record)?;
    let team_id = required(record.team_id.clone(), "teamId", segment_id, &unknown_team(index))?;

    let (row_region, rank) = division(segment_id, &team_id, &record)?;
    if row_region != region {
        return Ok(None);
    }

    let wins = required(record.match_wins, "matchWins", segment_id, &team_id)?;
    let losses = required(record.match_losses, "matchLosses", segment_id, &team_id)?;
    let game_wins = required(record.game_wins, "gameWins", segment_id, &team_id)?;
    let game_losses = required(record.game_losses, "gameLosses", segment_id, &team_id)?;
    let game_ties = required(record.game_ties, "gameTies", segment_id, &team_id)?;
    let differential =
        required(record.game_differential, "gameDifferential", segment_id, &team_id)?;

    let meta = teams.resolve(&team_id, segment_teams);
    let team_name = required(meta.name, "name", segment_id, &team_id)?;
    let logo_url = required(meta.logo, "logo", segment_id, &team_id)?;

    let matches_played = wins
        .checked_add(losses)
        .ok_or_else(|| DataError::OutOfRange {
            segment_id: segment_id.into(),
            team_id: team_id.to_string(),
            field: "matchesPlayed",
        })?;

    Ok(Some(StandingsRow {
        rank,
        team_id,
        team_name,
        logo_url,
        region: row_region,
        wins,
        losses,
        matches_played,
        win_pct: win_pct(wins, matches_played),
        game_wins,
        game_losses,
        game_ties,
        map_record: format!("{game_wins}-{game_losses}-{game_ties}"),
        differential,
    }))
}

/// `"70.0%"` style percentage, `None` for a team without matches.
pub fn win_pct(wins: u32, matches_played: u32) -> Option<String> {
    if matches_played == 0 {
        return None;
    }
    Some(format!(
        "{:.1}%",
        f64::from(wins) / f64::from(matches_played) * 100.0
    ))
}

pub(crate) fn required<T>(
    value: Option<T>,
    field: &'static str,
    segment_id: &str,
    team_id: &EntityId,
) -> Result<T, DataError> {
    value.ok_or_else(|| missing(segment_id, team_id, field))
}

fn missing(segment_id: &str, team_id: &EntityId, field: &'static str) -> DataError {
    DataError::MissingField {
        segment_id: segment_id.into(),
        team_id: team_id.to_string(),
        field,
    }
}
