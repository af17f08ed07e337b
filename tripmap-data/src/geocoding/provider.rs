//! HTTP-based `Geocoder` using the Nominatim search API.
//!
//! This module provides [`NominatimGeocoder`], an implementation of the
//! [`Geocoder`] trait that resolves free-form text through any
//! Nominatim-compatible `/search` endpoint.
//!
//! # Example
//!
//! ```no_run
//! use tripmap_data::geocoding::NominatimGeocoder;
//! use tripmap_core::search::{GeocodeQuery, Geocoder};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let geocoder = NominatimGeocoder::new("https://nominatim.openstreetmap.org")?;
//! let hits = geocoder
//!     .geocode(&GeocodeQuery { text: "Karnak".into(), country: Some("eg".into()), limit: 10 })
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tripmap_core::search::{GeocodeError, GeocodeHit, GeocodeQuery, Geocoder};
use url::Url;

use super::nominatim::Place;

/// Error type for [`NominatimGeocoder`] construction failures.
#[derive(Debug)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// The base URL could not be parsed.
    BaseUrl(url::ParseError),
}

impl std::fmt::Display for ProviderBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::BaseUrl(err) => write!(f, "invalid geocoder base URL: {err}"),
        }
    }
}

impl std::error::Error for ProviderBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::HttpClient(err) => Some(err),
            Self::BaseUrl(err) => Some(err),
        }
    }
}

/// Default Nominatim instance.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Default user agent for geocoding requests.
///
/// The public Nominatim usage policy requires an identifying user agent.
pub const DEFAULT_USER_AGENT: &str = "tripmap-geocoder/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for [`NominatimGeocoder`].
#[derive(Debug, Clone)]
pub struct NominatimGeocoderConfig {
    /// Base URL of the service, without the `/search` path.
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Preferred result language sent as `accept-language`, e.g. `"ar,en"`.
    pub language: Option<String>,
}

impl Default for NominatimGeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            language: None,
        }
    }
}

impl NominatimGeocoderConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the preferred result language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Geocoder backed by a Nominatim-compatible search endpoint.
///
/// The client is reused across requests. Requests always ask for
/// `jsonv2` output with address details so that city scoping can inspect
/// address components.
#[derive(Debug)]
pub struct NominatimGeocoder {
    client: Client,
    config: NominatimGeocoderConfig,
    search_url: Url,
}

impl NominatimGeocoder {
    /// Create a geocoder with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(NominatimGeocoderConfig::new(base_url))
    }

    /// Create a geocoder with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn with_config(config: NominatimGeocoderConfig) -> Result<Self, ProviderBuildError> {
        let search_url = Url::parse(&format!(
            "{}/search",
            config.base_url.trim_end_matches('/')
        ))
        .map_err(ProviderBuildError::BaseUrl)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        Ok(Self {
            client,
            config,
            search_url,
        })
    }

    /// Build the search URL for `query`.
    fn build_search_url(&self, query: &GeocodeQuery) -> Url {
        let mut url = self.search_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", &query.text)
                .append_pair("format", "jsonv2")
                .append_pair("addressdetails", "1")
                .append_pair("limit", &query.limit.to_string());
            if let Some(country) = &query.country {
                pairs.append_pair("countrycodes", &country.to_lowercase());
            }
            if let Some(language) = &self.config.language {
                pairs.append_pair("accept-language", language);
            }
        }
        url
    }

    /// Convert a reqwest error to a `GeocodeError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> GeocodeError {
        if error.is_timeout() {
            return GeocodeError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return GeocodeError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        if error.is_decode() {
            return GeocodeError::Parse {
                message: error.to_string(),
            };
        }

        GeocodeError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

/// Convert places to hits, keeping provider order.
fn convert_response(places: Vec<Place>) -> Vec<GeocodeHit> {
    places.into_iter().filter_map(Place::into_hit).collect()
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &GeocodeQuery) -> Result<Vec<GeocodeHit>, GeocodeError> {
        let url = self.build_search_url(query);
        log::debug!("geocoding {:?} via {}", query.text, self.search_url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?;

        let places: Vec<Place> = response.json().await.map_err(|err| GeocodeError::Parse {
            message: err.to_string(),
        })?;

        Ok(convert_response(places))
    }
}
