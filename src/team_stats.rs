use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DataError;
use crate::standings::{required, segment_label, unknown_team};
use crate::teams::{segment_team_meta, TeamDirectory, TeamMeta};
use crate::types::{EntityId, SegmentPayload};

/// Chart color for teams whose metadata carries none.
pub const DEFAULT_TEAM_COLOR: &str = "#7F7F7F";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TeamStatsRow {
    pub team_id: EntityId,
    pub name: String,
    pub damage_taken: f64,
    pub deaths: f64,
    pub eliminations: f64,
    pub final_blows: f64,
    pub healing_done: f64,
    pub hero_damage: f64,
    pub color: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamRecord {
    team_id: Option<EntityId>,
    team_stats: Option<StatsRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsRecord {
    damage_taken: Option<f64>,
    deaths: Option<f64>,
    eliminations: Option<f64>,
    final_blows: Option<f64>,
    healing_done: Option<f64>,
    hero_damage: Option<f64>,
}

/// Flattens every team's `teamStats` into one row of six metrics.
///
/// A team missing any metric is dropped; the others are unaffected. `None`
/// when the segment lists no teams or none survive.
pub fn build_team_stats(segment: &SegmentPayload, teams: &TeamDirectory) -> Option<Vec<TeamStatsRow>> {
    let records = segment.teams.as_deref().filter(|t| !t.is_empty())?;
    let segment_id = segment_label(segment);
    let segment_teams = segment_team_meta(segment);

    let rows: Vec<TeamStatsRow> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            team_stats_row(&segment_id, index, record, teams, &segment_teams)
                .map_err(|e| tracing::warn!(error = %e, "dropping team stats record"))
                .ok()
        })
        .collect();

    if rows.is_empty() {
        tracing::debug!(segment = %segment_id, "no team stats");
        return None;
    }
    Some(rows)
}

fn team_stats_row(
    segment_id: &str,
    index: usize,
    record: &Value,
    teams: &TeamDirectory,
    segment_teams: &HashMap<EntityId, TeamMeta>,
) -> Result<TeamStatsRow, DataError> {
    let record = TeamRecord::deserialize(record).map_err(|source| DataError::Malformed {
        segment_id: segment_id.into(),
        index,
        source,
    })?;
    let team_id = required(record.team_id, "teamId", segment_id, &unknown_team(index))?;
    let stats = required(record.team_stats, "teamStats", segment_id, &team_id)?;

    let meta = teams.resolve(&team_id, segment_teams);

    Ok(TeamStatsRow {
        damage_taken: required(stats.damage_taken, "damageTaken", segment_id, &team_id)?,
        deaths: required(stats.deaths, "deaths", segment_id, &team_id)?,
        eliminations: required(stats.eliminations, "eliminations", segment_id, &team_id)?,
        final_blows: required(stats.final_blows, "finalBlows", segment_id, &team_id)?,
        healing_done: required(stats.healing_done, "healingDone", segment_id, &team_id)?,
        hero_damage: required(stats.hero_damage, "heroDamage", segment_id, &team_id)?,
        name: meta.name.unwrap_or_else(|| team_id.to_string()),
        color: meta.color.unwrap_or_else(|| DEFAULT_TEAM_COLOR.into()),
        team_id,
    })
}

#[cfg(test)]
mod test {
    use serde_json::{json, Value};

    use super::*;

    fn team(id: u32) -> Value {
        json!({
            "teamId": id,
            "name": format!("Team {id}"),
            "teamStats": {
                "damageTaken": 150000.5,
                "deaths": 120,
                "eliminations": 300,
                "finalBlows": 140,
                "healingDone": 98000.0,
                "heroDamage": 160000.25
            }
        })
    }

    fn segment(teams: Vec<Value>) -> SegmentPayload {
        SegmentPayload {
            id: Some(EntityId::from("owl2-test")),
            standings: None,
            teams: Some(teams),
        }
    }

    #[test]
    fn flattens_metrics() {
        let mut directory = TeamDirectory::new();
        directory.insert(
            EntityId::from("1"),
            TeamMeta {
                name: Some("Dallas Fuel".into()),
                logo: None,
                color: Some("#0F57EA".into()),
            },
        );

        let rows = build_team_stats(&segment(vec![team(1)]), &directory).unwrap();
        assert_eq!(
            rows,
            vec![TeamStatsRow {
                team_id: EntityId::from("1"),
                name: "Dallas Fuel".into(),
                damage_taken: 150000.5,
                deaths: 120.0,
                eliminations: 300.0,
                final_blows: 140.0,
                healing_done: 98000.0,
                hero_damage: 160000.25,
                color: "#0F57EA".into(),
            }]
        );
    }

    #[test]
    fn drops_team_missing_healing_done() {
        let mut incomplete = team(2);
        incomplete["teamStats"]
            .as_object_mut()
            .unwrap()
            .remove("healingDone");

        let rows = build_team_stats(
            &segment(vec![team(1), incomplete, team(3)]),
            &TeamDirectory::new(),
        )
        .unwrap();

        let ids: Vec<&str> = rows.iter().map(|r| r.team_id.0.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(rows[0], {
            let only = build_team_stats(&segment(vec![team(1)]), &TeamDirectory::new()).unwrap();
            only[0].clone()
        });
    }

    #[test]
    fn falls_back_to_segment_name_and_default_color() {
        let rows = build_team_stats(&segment(vec![team(7)]), &TeamDirectory::new()).unwrap();
        assert_eq!(rows[0].name, "Team 7");
        assert_eq!(rows[0].color, DEFAULT_TEAM_COLOR);

        let mut nameless = team(8);
        nameless.as_object_mut().unwrap().remove("name");
        let rows = build_team_stats(&segment(vec![nameless]), &TeamDirectory::new()).unwrap();
        assert_eq!(rows[0].name, "8");
    }

    #[test]
    fn empty_or_absent_teams_is_no_data() {
        assert!(build_team_stats(&segment(vec![]), &TeamDirectory::new()).is_none());
        assert!(build_team_stats(&SegmentPayload::default(), &TeamDirectory::new()).is_none());
    }

    #[test]
    fn all_rows_invalid_is_no_data() {
        let segment = segment(vec![json!({"teamId": 1}), json!("not a team")]);
        assert!(build_team_stats(&segment, &TeamDirectory::new()).is_none());
    }
}
