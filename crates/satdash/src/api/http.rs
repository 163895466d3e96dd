//! HTTP implementation of [`SatelliteApi`].

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{endpoints, join_ids, SatelliteApi};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{
    HealthStatus, PositionBatch, RefreshStatus, Satellite, SatelliteList, SatelliteQuery,
};

/// Client for the tracking backend.
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: Client,
    base_url: String,
}

impl HttpApi {
    /// Create a client for `base_url` whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Url::parse(base_url).map_err(|e| Error::ConfigValidation {
            message: format!("invalid base URL {base_url}: {e}"),
        })?;
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("satdash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::http(base_url, e))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the `[api]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api.base_url, config.request_timeout())
    }

    /// The underlying HTTP client, shared with other fetches such as the atlas.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.http
    }

    /// Absolute URL of an endpoint path.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL does not parse.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!("{}{path}", self.base_url);
        Url::parse(&joined).map_err(|e| Error::internal(format!("bad endpoint URL {joined}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| request_error(path, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::status(path, status.as_u16()));
        }
        response.json::<T>().await.map_err(|e| request_error(path, e))
    }
}

fn request_error(endpoint: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout(endpoint)
    } else {
        Error::http(endpoint, err)
    }
}

#[async_trait::async_trait]
impl SatelliteApi for HttpApi {
    async fn health(&self) -> Result<HealthStatus> {
        self.get_json(endpoints::HEALTH, &[]).await
    }

    async fn refresh(&self) -> Result<RefreshStatus> {
        let url = self.endpoint(endpoints::REFRESH)?;
        debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .send()
            .await
            .map_err(|e| request_error(endpoints::REFRESH, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| request_error(endpoints::REFRESH, e))?;

        match serde_json::from_slice::<RefreshStatus>(&body) {
            Ok(payload) => {
                if !status.is_success() {
                    warn!(
                        status = status.as_u16(),
                        message = payload.message.as_deref().unwrap_or(""),
                        "refresh reported failure"
                    );
                }
                Ok(payload)
            }
            Err(_) if !status.is_success() => {
                Err(Error::status(endpoints::REFRESH, status.as_u16()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn satellites(&self, query: &SatelliteQuery) -> Result<SatelliteList> {
        self.get_json(endpoints::SATELLITES, &query.to_pairs()).await
    }

    async fn satellite(&self, norad_id: u32) -> Result<Option<Satellite>> {
        let path = format!("{}/{norad_id}", endpoints::SATELLITES);
        match self.get_json(&path, &[]).await {
            Ok(satellite) => Ok(Some(satellite)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn positions(&self, norad_ids: &[u32]) -> Result<PositionBatch> {
        self.get_json(endpoints::POSITIONS, &[("norad_ids", join_ids(norad_ids))])
            .await
    }
}
