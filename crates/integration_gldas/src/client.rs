//! Earthdata GLDAS client
//!
//! HTTP client for CMR granule search and OPeNDAP point extraction.

use std::{collections::BTreeMap, fmt, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::{
    auth,
    models::{CmrSearchResponse, Granule},
    opendap,
};

/// CMR temporal bound format
const CMR_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// GLDAS client errors
#[derive(Debug, Error)]
pub enum GldasError {
    /// Connection to the archive failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the archive failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse a response from the archive
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid coordinates provided
    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,

    /// Credentials missing or rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The granule publishes no OPeNDAP endpoint
    #[error("Granule {0} has no OPeNDAP endpoint")]
    NoAccessLink(String),

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

/// Archive configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct GldasConfig {
    /// CMR base URL (default: <https://cmr.earthdata.nasa.gov>)
    #[serde(default = "default_cmr_base_url")]
    pub cmr_base_url: String,

    /// Earthdata Login base URL (default: <https://urs.earthdata.nasa.gov>)
    #[serde(default = "default_urs_base_url")]
    pub urs_base_url: String,

    /// Product short name (default: GLDAS_NOAH025_3H)
    #[serde(default = "default_short_name")]
    pub short_name: String,

    /// Product version (default: 2.1)
    #[serde(default = "default_version")]
    pub version: String,

    /// Request timeout in seconds (default: 60)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum granules returned by a search (default: 10)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Earthdata bearer token (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub token: Option<SecretString>,

    /// Earthdata Login username
    #[serde(default)]
    pub username: Option<String>,

    /// Earthdata Login password (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub password: Option<SecretString>,
}

fn default_cmr_base_url() -> String {
    "https://cmr.earthdata.nasa.gov".to_string()
}

fn default_urs_base_url() -> String {
    "https://urs.earthdata.nasa.gov".to_string()
}

fn default_short_name() -> String {
    "GLDAS_NOAH025_3H".to_string()
}

fn default_version() -> String {
    "2.1".to_string()
}

const fn default_timeout() -> u64 {
    60
}

const fn default_page_size() -> u32 {
    10
}

impl Default for GldasConfig {
    fn default() -> Self {
        Self {
            cmr_base_url: default_cmr_base_url(),
            urs_base_url: default_urs_base_url(),
            short_name: default_short_name(),
            version: default_version(),
            timeout_secs: default_timeout(),
            page_size: default_page_size(),
            token: None,
            username: None,
            password: None,
        }
    }
}

impl GldasConfig {
    /// Configured bearer token, if non-empty
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|t| !t.is_empty())
    }

    /// Configured username, if non-empty
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.is_empty())
    }

    /// Configured password, if non-empty
    pub fn password(&self) -> Option<&str> {
        self.password
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|p| !p.is_empty())
    }
}

impl fmt::Debug for GldasConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GldasConfig")
            .field("cmr_base_url", &self.cmr_base_url)
            .field("urs_base_url", &self.urs_base_url)
            .field("short_name", &self.short_name)
            .field("version", &self.version)
            .field("timeout_secs", &self.timeout_secs)
            .field("page_size", &self.page_size)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Values read at the grid cell nearest to a requested coordinate
#[derive(Debug, Clone, PartialEq)]
pub struct PointSample {
    /// Latitude of the snapped grid cell
    pub latitude: f64,
    /// Longitude of the snapped grid cell
    pub longitude: f64,
    /// Raw value per archive variable; fill values decode to NaN
    pub values: BTreeMap<String, f64>,
}

impl PointSample {
    /// Raw value of an archive variable, if it was returned
    pub fn value(&self, variable: &str) -> Option<f64> {
        self.values.get(variable).copied()
    }
}

/// Archive operations used by the history fetcher
#[async_trait]
pub trait GranuleArchive: Send + Sync {
    /// Granules of the configured product overlapping `[start, end]`
    async fn search(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Granule>, GldasError>;

    /// Read `variables` at the grid cell nearest to the coordinate
    async fn read_point(
        &self,
        granule: &Granule,
        latitude: f64,
        longitude: f64,
        variables: &[&str],
    ) -> Result<PointSample, GldasError>;
}

/// Earthdata HTTP client implementation
pub struct GldasClient {
    client: Client,
    config: GldasConfig,
    token: Option<SecretString>,
}

impl fmt::Debug for GldasClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GldasClient")
            .field("config", &self.config)
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl GldasClient {
    /// Create a client using only the configured token
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: GldasConfig) -> Result<Self, GldasError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GldasError::ConnectionFailed(e.to_string()))?;
        let token = config.token().map(|t| SecretString::from(t.to_owned()));

        Ok(Self {
            client,
            config,
            token,
        })
    }

    /// Create a client and resolve the Earthdata token, logging in with
    /// username and password when no token is configured
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized or the login fails.
    pub async fn connect(config: GldasConfig) -> Result<Self, GldasError> {
        let mut client = Self::new(config)?;
        client.token = auth::resolve_token(&client.client, &client.config).await?;
        info!(
            product = %client.config.short_name,
            version = %client.config.version,
            authenticated = client.token.is_some(),
            "Initialized GLDAS client"
        );
        Ok(client)
    }

    /// Validate coordinates
    fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), GldasError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(GldasError::InvalidCoordinates);
        }
        Ok(())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match auth::bearer(self.token.as_ref()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and map failure statuses
    async fn send(&self, request: RequestBuilder) -> Result<Response, GldasError> {
        let response = self.authorized(request).send().await.map_err(|e| {
            if e.is_connect() {
                GldasError::ConnectionFailed(e.to_string())
            } else {
                GldasError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(GldasError::Unauthorized(format!("HTTP {status}")));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GldasError::RateLimitExceeded);
        }
        if status.is_server_error() {
            return Err(GldasError::ServiceUnavailable(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(GldasError::RequestFailed(format!("HTTP {status}")));
        }
        Ok(response)
    }

    /// Fetch and parse a DAP2 ASCII rendering
    async fn fetch_ascii(
        &self,
        endpoint: &str,
        constraint: &str,
    ) -> Result<BTreeMap<String, Vec<f64>>, GldasError> {
        let url = format!("{endpoint}.ascii?{constraint}");
        debug!(url = %url, "Fetching OPeNDAP subset");

        let body = self
            .send(self.client.get(&url))
            .await?
            .text()
            .await
            .map_err(|e| GldasError::ParseError(e.to_string()))?;

        Ok(opendap::parse_ascii(&body))
    }
}

#[async_trait]
impl GranuleArchive for GldasClient {
    #[instrument(skip(self), fields(start = %start, end = %end))]
    async fn search(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Granule>, GldasError> {
        let url = format!(
            "{}/search/granules.json",
            self.config.cmr_base_url.trim_end_matches('/')
        );
        let temporal = format!(
            "{},{}",
            start.format(CMR_TIME_FORMAT),
            end.format(CMR_TIME_FORMAT)
        );
        let page_size = self.config.page_size.to_string();

        let request = self.client.get(&url).query(&[
            ("short_name", self.config.short_name.as_str()),
            ("version", self.config.version.as_str()),
            ("temporal", temporal.as_str()),
            ("page_size", page_size.as_str()),
            ("sort_key", "start_date"),
        ]);

        let response: CmrSearchResponse = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| GldasError::ParseError(e.to_string()))?;

        let granules: Vec<Granule> = response.feed.entry.into_iter().map(Granule::from).collect();
        debug!(count = granules.len(), "Granule search completed");
        Ok(granules)
    }

    #[instrument(skip(self, granule, variables), fields(granule = %granule.title))]
    async fn read_point(
        &self,
        granule: &Granule,
        latitude: f64,
        longitude: f64,
        variables: &[&str],
    ) -> Result<PointSample, GldasError> {
        Self::validate_coordinates(latitude, longitude)?;

        let endpoint = granule
            .opendap_url
            .as_deref()
            .ok_or_else(|| GldasError::NoAccessLink(granule.id.clone()))?;

        let coords = self.fetch_ascii(endpoint, "lat,lon").await?;
        let lats = opendap::block(&coords, "lat")?;
        let lons = opendap::block(&coords, "lon")?;
        let (Some(lat_index), Some(lon_index)) = (
            opendap::nearest_index(lats, latitude),
            opendap::nearest_index(lons, longitude),
        ) else {
            return Err(GldasError::ParseError("empty coordinate axis".to_string()));
        };

        let blocks = self
            .fetch_ascii(
                endpoint,
                &opendap::point_constraint(variables, lat_index, lon_index),
            )
            .await?;

        let values = variables
            .iter()
            .filter_map(|name| {
                let value = blocks.get(*name)?.first().copied()?;
                let value = if opendap::is_fill(value) { f64::NAN } else { value };
                Some(((*name).to_string(), value))
            })
            .collect();

        Ok(PointSample {
            latitude: lats[lat_index],
            longitude: lons[lon_index],
            values,
        })
    }
}
