use async_trait::async_trait;

use crate::api_client::OwlApiClient;
use crate::error::Error;
use crate::types::{MatchPayload, PlayerPayload, SegmentPayload, SummaryPayload, TeamPayload};

/// Typed access to the stats resources.
#[async_trait]
pub trait Client: Send + Sync {
    async fn get_summary(&self) -> Result<SummaryPayload, Error>;
    async fn get_segment(&self, segment_id: &str) -> Result<SegmentPayload, Error>;
    async fn get_team(&self, team_id: &str) -> Result<TeamPayload, Error>;
    async fn get_player(&self, player_id: &str) -> Result<PlayerPayload, Error>;
    async fn get_match(&self, match_id: &str) -> Result<MatchPayload, Error>;
}

#[async_trait]
impl Client for OwlApiClient {
    async fn get_summary(&self) -> Result<SummaryPayload, Error> {
        let url = self.resource_url(&self.config().paths.summary, None);
        self.fetch_json(&url).await
    }

    async fn get_segment(&self, segment_id: &str) -> Result<SegmentPayload, Error> {
        let url = self.resource_url(&self.config().paths.segment, Some(segment_id));
        self.fetch_json(&url).await
    }

    async fn get_team(&self, team_id: &str) -> Result<TeamPayload, Error> {
        let url = self.resource_url(&self.config().paths.team, Some(team_id));
        self.fetch_json(&url).await
    }

    async fn get_player(&self, player_id: &str) -> Result<PlayerPayload, Error> {
        let url = self.resource_url(&self.config().paths.player, Some(player_id));
        self.fetch_json(&url).await
    }

    async fn get_match(&self, match_id: &str) -> Result<MatchPayload, Error> {
        let url = self.resource_url(&self.config().paths.matches, Some(match_id));
        self.fetch_json(&url).await
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use crate::api_client::OwlApiClient;
    use crate::client::Client;
    use crate::config::{ApiConfig, Region};
    use crate::error::Error;
    use crate::types::EntityId;

    async fn connect(server: &mut mockito::Server) -> (OwlApiClient, mockito::Mock) {
        let token = server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_body(r#"{"access_token":"token123"}"#)
            .create_async()
            .await;

        let mut config = ApiConfig::new(Region::Us, "client", "secret");
        config.oauth_url = format!("{}/oauth/token", server.url());
        config.api_url = server.url();
        config.pacing_delay = Duration::ZERO;

        (OwlApiClient::connect(config).await.unwrap(), token)
    }

    #[tokio::test]
    async fn test_get_segment() {
        let mut server = mockito::Server::new_async().await;
        let (client, _token) = connect(&mut server).await;

        let json = r###"
            {
              "id": "owl2-2023-midseason-madness-tournament-qualifiers",
              "standings": [
                {
                  "teamId": 4523,
                  "matchWins": 7,
                  "matchLosses": 3,
                  "gameWins": 23,
                  "gameLosses": 12,
                  "gameTies": 1,
                  "gameDifferential": 11,
                  "divisions": { "west": { "rank": 1 } }
                }
              ],
              "teams": [
                {
                  "teamId": 4523,
                  "teamStats": { "eliminations": 1200.0 }
                }
              ]
            }
        "###;

        let mock = server
            .mock(
                "GET",
                "/owl/v1/segments/owl2-2023-midseason-madness-tournament-qualifiers",
            )
            .match_header("authorization", "Bearer token123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json)
            .expect(1)
            .create_async()
            .await;

        let segment = client
            .get_segment("owl2-2023-midseason-madness-tournament-qualifiers")
            .await
            .unwrap();
        // served from the cache
        client
            .get_segment("owl2-2023-midseason-madness-tournament-qualifiers")
            .await
            .unwrap();
        mock.assert_async().await;

        assert_eq!(
            segment.id,
            Some(EntityId::from("owl2-2023-midseason-madness-tournament-qualifiers"))
        );
        assert_eq!(segment.standings.map(|s| s.len()), Some(1));
        assert_eq!(segment.teams.map(|t| t.len()), Some(1));
    }

    #[tokio::test]
    async fn test_get_team() {
        let mut server = mockito::Server::new_async().await;
        let (client, _token) = connect(&mut server).await;

        let mock = server
            .mock("GET", "/owl/v1/teams/4523")
            .with_status(200)
            .with_body(
                r##"{"id":4523,"name":"Dallas Fuel","logo":"https://img/fuel.png","primaryColor":"#0F57EA"}"##,
            )
            .create_async()
            .await;

        let team = client.get_team("4523").await.unwrap();
        mock.assert_async().await;

        assert_eq!(team.name.as_deref(), Some("Dallas Fuel"));
        assert_eq!(team.logo.as_deref(), Some("https://img/fuel.png"));
        assert_eq!(team.color.as_deref(), Some("#0F57EA"));
    }

    #[tokio::test]
    async fn test_summary_player_and_match() {
        let mut server = mockito::Server::new_async().await;
        let (client, _token) = connect(&mut server).await;

        let summary = server
            .mock("GET", "/owl/v1/owl2")
            .with_status(200)
            .with_body(r#"{"currentSegments":["s1"],"teams":{"1":{"id":1,"name":"A"}}}"#)
            .create_async()
            .await;
        let player = server
            .mock("GET", "/owl/v1/players/8")
            .with_status(200)
            .with_body(r#"{"id":8,"name":"Proper","teamId":1}"#)
            .create_async()
            .await;
        let game = server
            .mock("GET", "/owl/v1/matches/42")
            .with_status(200)
            .with_body(r#"{"id":42,"segmentId":"s1"}"#)
            .create_async()
            .await;

        let s = client.get_summary().await.unwrap();
        let p = client.get_player("8").await.unwrap();
        let m = client.get_match("42").await.unwrap();
        summary.assert_async().await;
        player.assert_async().await;
        game.assert_async().await;

        assert_eq!(s.current_segments.len(), 1);
        assert_eq!(p.name.as_deref(), Some("Proper"));
        assert_eq!(m.id, Some(EntityId::from("42")));
        assert!(m.extra.contains_key("segmentId"));
    }

    #[tokio::test]
    async fn invalid_json_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let (client, _token) = connect(&mut server).await;

        let _mock = server
            .mock("GET", "/owl/v1/teams/1")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = client.get_team("1").await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
