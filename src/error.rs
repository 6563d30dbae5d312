use reqwest::StatusCode;

/// Status codes worth another attempt.
pub const TRANSIENT_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("failed to fetch data from {url} with status code {status}")]
    Api { status: u16, url: String },

    #[error("JSON decode error: {0}")]
    Decode(#[from] JSONError),

    #[error(transparent)]
    EnvVar(#[from] EnvVarError),

    #[error("unknown region {0:?}, expected one of us, eu, kr, tw, cn")]
    InvalidRegion(String),
}

impl Error {
    pub fn api(status: StatusCode, url: impl Into<String>) -> Self {
        Self::Api {
            status: status.as_u16(),
            url: url.into(),
        }
    }

    /// Whether the retry policy should try the request again.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Api { status, .. } => TRANSIENT_STATUS_CODES.contains(status),
            Error::Request(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("token endpoint {url} answered with status code {status}")]
    Status { status: u16, url: String },

    #[error("token endpoint {url} response has no access_token")]
    MissingToken { url: String },

    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(thiserror::Error, Debug)]
#[error("{source} ({url})")]
pub struct JSONError {
    url: String,
    #[source]
    source: serde_json::Error,
}

impl JSONError {
    pub fn new(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self {
            url: url.into(),
            source,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(thiserror::Error, Debug)]
#[error("{source} ({var})")]
pub struct EnvVarError {
    var: String,
    #[source]
    source: std::env::VarError,
}

impl EnvVarError {
    pub fn new(var: &str, source: std::env::VarError) -> Self {
        Self {
            var: var.into(),
            source,
        }
    }
}

/// A single record that could not be turned into a table row.
///
/// These are data-quality problems in an otherwise successful response, kept
/// apart from [`Error`] so one bad team never discards the whole table.
#[derive(thiserror::Error, Debug)]
pub enum DataError {
    #[error("segment {segment_id}: team {team_id} is missing required field `{field}`")]
    MissingField {
        segment_id: String,
        team_id: String,
        field: &'static str,
    },

    #[error("segment {segment_id}: record #{index} is malformed: {source}")]
    Malformed {
        segment_id: String,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("segment {segment_id}: team {team_id} has {count} division entries, expected exactly one")]
    DivisionCardinality {
        segment_id: String,
        team_id: String,
        count: usize,
    },

    #[error("segment {segment_id}: team {team_id} has an out-of-range `{field}`")]
    OutOfRange {
        segment_id: String,
        team_id: String,
        field: &'static str,
    },
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn transient_statuses() {
        for status in [429, 500, 502, 503, 504] {
            let err = Error::Api {
                status,
                url: "http://x".into(),
            };
            assert!(err.is_transient(), "{status} should be transient");
        }
        for status in [400, 401, 403, 404] {
            let err = Error::Api {
                status,
                url: "http://x".into(),
            };
            assert!(!err.is_transient(), "{status} should be terminal");
        }
    }

    #[test]
    fn auth_and_decode_are_terminal() {
        let auth = Error::Auth(AuthError::MissingToken {
            url: "http://x/token".into(),
        });
        assert!(!auth.is_transient());

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let decode = Error::Decode(JSONError::new("http://x/segments/1", source));
        assert!(!decode.is_transient());
        assert!(decode.to_string().contains("http://x/segments/1"));
    }

    #[test]
    fn api_error_message_names_url_and_status() {
        let err = Error::api(StatusCode::NOT_FOUND, "http://x/teams/9");
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.to_string(),
            "failed to fetch data from http://x/teams/9 with status code 404"
        );
    }
}
