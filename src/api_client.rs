use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio_retry::RetryIf;

use crate::auth::TokenManager;
use crate::config::{ApiConfig, RetryPolicy};
use crate::error::{Error, JSONError};
use crate::response_cache::{CacheKey, ResponseCache};

/// One authenticated session against the Battle.net API: a connection pool,
/// the bearer token and the response cache.
pub struct OwlApiClient {
    client: reqwest::Client,
    config: ApiConfig,
    auth: TokenManager,
    cache: ResponseCache,
}

impl OwlApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert("accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        let auth = TokenManager::new(
            client.clone(),
            config.oauth_url.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
        );

        Ok(Self {
            client,
            config,
            auth,
            cache: ResponseCache::new(),
        })
    }

    /// Builds the session and exchanges the client credentials right away,
    /// so bad credentials fail here rather than on the first resource call.
    pub async fn connect(config: ApiConfig) -> Result<Self, Error> {
        let client = Self::new(config)?;
        client.auth.authenticate().await?;
        Ok(client)
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// `<api_url>/<template>` with `{id}` replaced by the percent-encoded id.
    pub fn resource_url(&self, template: &str, id: Option<&str>) -> String {
        let path = match id {
            Some(id) => template.replace("{id}", &urlencoding::encode(id)),
            None => template.to_owned(),
        };
        format!(
            "{}/{}",
            self.config.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn get_once(&self, url: &str, params: &[(&str, &str)]) -> Result<Arc<str>, Error> {
        let token = self.auth.bearer().await?;

        let response = self
            .client
            .get(url)
            .query(params)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                Ok(Arc::from(body))
            }
            status => {
                if status == StatusCode::UNAUTHORIZED {
                    self.auth.invalidate().await;
                }
                let err = Error::api(status, url);
                if err.is_transient() {
                    tracing::warn!(%url, status = status.as_u16(), "transient failure");
                }
                Err(err)
            }
        }
    }

    /// GET with the retry policy applied. Pays the pacing delay after every
    /// successful fetch.
    pub async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<Arc<str>, Error> {
        let body = RetryIf::spawn(
            retry_strategy(&self.config.retry),
            || self.get_once(url, params),
            Error::is_transient,
        )
        .await?;

        tokio::time::sleep(self.config.pacing_delay).await;
        Ok(body)
    }

    /// [`get`](Self::get) behind the response cache. Only successful bodies
    /// are stored.
    pub async fn cached_get(
        &self,
        url: &str,
        params: &[(&str, &str)],
        ttl: Duration,
    ) -> Result<Arc<str>, Error> {
        let key = CacheKey::new(url, params);
        if let Some(body) = self.cache.get(&key, ttl).await {
            return Ok(body);
        }

        let body = self.get(url, params).await?;
        self.cache.insert(key, body.clone()).await;
        Ok(body)
    }

    /// Cached GET of `url` decoded into `T` with the configured TTL.
    pub(crate) async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, Error> {
        let body = self.cached_get(url, &[], self.config.cache_ttl).await?;
        decode(url, &body)
    }
}

pub fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| JSONError::new(url, e).into())
}

/// Doubling delays starting at `base_delay`, one fewer than the attempts.
fn retry_strategy(policy: &RetryPolicy) -> impl Iterator<Item = Duration> {
    std::iter::successors(Some(policy.base_delay), |delay| delay.checked_mul(2))
        .take(policy.max_attempts.saturating_sub(1))
}
