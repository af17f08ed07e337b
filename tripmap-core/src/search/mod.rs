//! Place search: geocoder contract, city scoping and the debounced service.
//!
//! [`PlaceSearch`] runs as a background task. Query changes are debounced and
//! every change bumps a generation counter, so a response that arrives after
//! the query moved on is dropped instead of overwriting newer results.

mod filter;
mod geocoder;
mod service;

pub use filter::{CityScope, refine};
pub use geocoder::{GeocodeError, GeocodeHit, GeocodeQuery, Geocoder};
pub use service::PlaceSearch;

use crate::{LatLng, SearchConfig};

#[cfg(feature = "serde")]
use serde::Serialize;

/// A result offered to the user.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SearchResult {
    /// Human-readable label.
    pub label: String,
    /// Position in canonical order.
    pub coordinates: LatLng,
}

impl From<GeocodeHit> for SearchResult {
    fn from(hit: GeocodeHit) -> Self {
        Self {
            label: hit.label,
            coordinates: hit.coordinates,
        }
    }
}

/// Published state of a [`PlaceSearch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSnapshot {
    /// Query the results belong to, or the query awaiting a response.
    pub query: String,
    /// Current results, best match first.
    pub results: Vec<SearchResult>,
    /// Whether a request for `query` is scheduled or in flight.
    pub pending: bool,
}

/// Run a single provider request and refine its hits.
///
/// Provider failures are logged and produce an empty list; search errors
/// never reach the editor as failures.
pub async fn search_once(
    geocoder: &dyn Geocoder,
    text: &str,
    scope: Option<&CityScope>,
    config: &SearchConfig,
) -> Vec<SearchResult> {
    let query = GeocodeQuery {
        text: text.trim().to_owned(),
        country: config.country.clone(),
        limit: config.provider_limit,
    };
    match geocoder.geocode(&query).await {
        Ok(hits) => refine(hits, scope, config.max_results),
        Err(err) => {
            log::warn!("place search for {:?} failed: {err}", query.text);
            Vec::new()
        }
    }
}
