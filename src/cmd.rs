use clap::Parser;

use owl_standings::client::Client;
use owl_standings::standings::{self, StandingsRow};
use owl_standings::team_stats::TeamStatsRow;
use owl_standings::{ApiConfig, Dashboard, OwlApiClient};

#[derive(Parser, Debug)]
pub enum Cmd {
    /// Segments currently in progress
    Segments,
    /// Regional standings of a segment
    Standings {
        segment: String,
        #[arg(long, default_value = "west")]
        region: String,
    },
    /// Regions present in a segment's standings
    Regions { segment: String },
    /// Per-team stats of a segment
    TeamStats { segment: String },
    Team { id: String },
    Player { id: String },
    Match { id: String },
}

fn print_standings(rows: &[StandingsRow]) {
    println!("  # | TEAM                         |  W |  L | MP | WIN%   | MAP W-L-T | DIFF | LOGO");
    for row in rows {
        println!(
            "{:>3} | {:<28} | {:>2} | {:>2} | {:>2} | {:<6} | {:<9} | {:>4} | {}",
            row.rank,
            row.team_name,
            row.wins,
            row.losses,
            row.matches_played,
            row.win_pct.as_deref().unwrap_or("-"),
            row.map_record,
            row.differential,
            row.logo_url
        );
    }
}

fn print_team_stats(rows: &[TeamStatsRow]) {
    println!("TEAM                         | DMG TAKEN | DEATHS | ELIMS | FINAL BLOWS | HEALING | HERO DMG | COLOR");
    for row in rows {
        println!(
            "{:<28} | {:>9.0} | {:>6.0} | {:>5.0} | {:>11.0} | {:>7.0} | {:>8.0} | {}",
            row.name,
            row.damage_taken,
            row.deaths,
            row.eliminations,
            row.final_blows,
            row.healing_done,
            row.hero_damage,
            row.color
        );
    }
}

impl Cmd {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = ApiConfig::from_env()?;
        tracing::info!(region = %config.region, "connecting");
        let mut dashboard = Dashboard::new(OwlApiClient::connect(config).await?);

        match self {
            Cmd::Segments => {
                for segment in dashboard.current_segments().await? {
                    println!("{segment}");
                }
            }
            Cmd::Standings { segment, region } => {
                match dashboard.standings(&segment, &region).await? {
                    Some(rows) => print_standings(&rows),
                    None => println!("no standings published for {segment} ({region})"),
                }
            }
            Cmd::Regions { segment } => {
                let payload = dashboard.segment(&segment).await?;
                for region in standings::regions(&payload) {
                    println!("{region}");
                }
            }
            Cmd::TeamStats { segment } => match dashboard.team_stats(&segment).await? {
                Some(rows) => print_team_stats(&rows),
                None => println!("no team stats published for {segment}"),
            },
            Cmd::Team { id } => {
                let team = dashboard.client().get_team(&id).await?;
                println!("{team:#?}");
            }
            Cmd::Player { id } => {
                let player = dashboard.client().get_player(&id).await?;
                println!("{player:#?}");
            }
            Cmd::Match { id } => {
                let game = dashboard.client().get_match(&id).await?;
                println!("{game:#?}");
            }
        }

        Ok(())
    }
}
