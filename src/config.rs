use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{EnvVarError, Error};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Region {
    #[default]
    Us,
    Eu,
    Kr,
    Tw,
    Cn,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Us => "us",
            Region::Eu => "eu",
            Region::Kr => "kr",
            Region::Tw => "tw",
            Region::Cn => "cn",
        }
    }

    pub fn oauth_url(&self) -> String {
        match self {
            Region::Cn => "https://oauth.battlenet.com.cn/token".into(),
            r => format!("https://{}.battle.net/oauth/token", r.as_str()),
        }
    }

    pub fn api_url(&self) -> String {
        match self {
            Region::Cn => "https://gateway.battlenet.com.cn".into(),
            r => format!("https://{}.api.blizzard.com", r.as_str()),
        }
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "us" => Ok(Region::Us),
            "eu" => Ok(Region::Eu),
            "kr" => Ok(Region::Kr),
            "tw" => Ok(Region::Tw),
            "cn" => Ok(Region::Cn),
            _ => Err(Error::InvalidRegion(s.into())),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource path templates, relative to the API base URL. `{id}` is replaced
/// by the percent-encoded resource id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiPaths {
    pub summary: String,
    pub player: String,
    pub matches: String,
    pub segment: String,
    pub team: String,
}

impl Default for ApiPaths {
    fn default() -> Self {
        Self {
            summary: "owl/v1/owl2".into(),
            player: "owl/v1/players/{id}".into(),
            matches: "owl/v1/matches/{id}".into(),
            segment: "owl/v1/segments/{id}".into(),
            team: "owl/v1/teams/{id}".into(),
        }
    }
}

/// Bounded retries on transient failures with doubling delays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub region: Region,
    pub oauth_url: String,
    pub api_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub paths: ApiPaths,
    pub retry: RetryPolicy,
    pub cache_ttl: Duration,
    /// Wait after every successful network fetch, to stay under the
    /// provider's rate limit.
    pub pacing_delay: Duration,
}

impl ApiConfig {
    pub fn new(region: Region, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            region,
            oauth_url: region.oauth_url(),
            api_url: region.api_url(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            paths: ApiPaths::default(),
            retry: RetryPolicy::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            pacing_delay: DEFAULT_PACING_DELAY,
        }
    }

    // requires BLIZZARD_CLIENT_ID and BLIZZARD_CLIENT_SECRET env vars
    // can use dotenv
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|var| env::var(var))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let required = |var: &str| lookup(var).map_err(|e| EnvVarError::new(var, e));
        let optional = |var: &str| lookup(var).ok().filter(|v| !v.trim().is_empty());

        let region = match optional("BLIZZARD_REGION") {
            Some(r) => r.parse()?,
            None => Region::default(),
        };

        let mut config = Self::new(
            region,
            required("BLIZZARD_CLIENT_ID")?,
            required("BLIZZARD_CLIENT_SECRET")?,
        );

        if let Some(url) = optional("BLIZZARD_OAUTH_URL") {
            config.oauth_url = url;
        }
        if let Some(url) = optional("BLIZZARD_API_URL") {
            config.api_url = url;
        }
        if let Some(secs) = optional("OWL_CACHE_TTL_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) => config.cache_ttl = Duration::from_secs(secs),
                Err(_) => tracing::warn!(value = %secs, "ignoring invalid OWL_CACHE_TTL_SECS"),
            }
        }

        Ok(config)
    }
}
