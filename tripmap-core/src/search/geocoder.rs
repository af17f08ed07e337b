//! Geocoding provider contract.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::LatLng;

/// A forward-geocoding request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeQuery {
    /// Free-form query text.
    pub text: String,
    /// Optional ISO 3166-1 alpha-2 country hint.
    pub country: Option<String>,
    /// Maximum number of hits the provider should return.
    pub limit: usize,
}

/// A single provider hit.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    /// Human-readable label.
    pub label: String,
    /// Position in canonical order.
    pub coordinates: LatLng,
    /// Structured address components such as `city` or `state`.
    pub address: BTreeMap<String, String>,
}

impl GeocodeHit {
    /// Construct a hit without address components.
    #[must_use]
    pub fn new(label: impl Into<String>, coordinates: LatLng) -> Self {
        Self {
            label: label.into(),
            coordinates,
            address: BTreeMap::new(),
        }
    }

    /// Add an address component.
    #[must_use]
    pub fn with_address(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.address.insert(key.into(), value.into());
        self
    }
}

/// Errors from [`Geocoder::geocode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The request could not be sent or the connection failed.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Request URL.
        url: String,
        /// Underlying error message.
        message: String,
    },
    /// The request exceeded its timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout.
        timeout_secs: u64,
    },
    /// The provider answered with a non-success status.
    #[error("provider returned HTTP {status} for {url}: {message}")]
    Http {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Underlying error message.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse provider response: {message}")]
    Parse {
        /// Underlying error message.
        message: String,
    },
}

/// Resolve free-form text to candidate places.
///
/// Implementations must be cheap to share: the search service keeps one
/// behind an `Arc` and may have several requests in flight.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use tripmap_core::LatLng;
/// use tripmap_core::search::{GeocodeError, GeocodeHit, GeocodeQuery, Geocoder};
///
/// struct Fixed;
///
/// #[async_trait]
/// impl Geocoder for Fixed {
///     async fn geocode(&self, _query: &GeocodeQuery) -> Result<Vec<GeocodeHit>, GeocodeError> {
///         Ok(vec![GeocodeHit::new("Karnak, Luxor", LatLng::new(25.7188, 32.6573))])
///     }
/// }
/// ```
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Return hits for `query`, best match first.
    async fn geocode(&self, query: &GeocodeQuery) -> Result<Vec<GeocodeHit>, GeocodeError>;
}

#[async_trait]
impl<G: Geocoder + ?Sized> Geocoder for std::sync::Arc<G> {
    async fn geocode(&self, query: &GeocodeQuery) -> Result<Vec<GeocodeHit>, GeocodeError> {
        (**self).geocode(query).await
    }
}
