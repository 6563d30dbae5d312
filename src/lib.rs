pub mod api_client;
pub mod auth;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod response_cache;
pub mod standings;
pub mod team_stats;
pub mod teams;
pub mod types;

pub use api_client::OwlApiClient;
pub use client::Client;
pub use config::{ApiConfig, Region};
pub use dashboard::Dashboard;
pub use error::{AuthError, DataError, Error};
pub use standings::{build_standings, StandingsRow};
pub use team_stats::{build_team_stats, TeamStatsRow};
