//! Test utilities for place search.
//!
//! [`StubGeocoder`] is a deterministic [`Geocoder`] that answers from a table
//! of canned responses, optionally after a per-query delay, and records every
//! request it receives.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::search::{GeocodeError, GeocodeHit, GeocodeQuery, Geocoder};

/// Stub geocoder for tests.
///
/// Queries without a configured response yield no hits.
///
/// # Example
///
/// ```
/// use tripmap_core::LatLng;
/// use tripmap_core::search::GeocodeHit;
/// use tripmap_core::test_support::StubGeocoder;
///
/// let stub = StubGeocoder::new()
///     .respond("Karnak", vec![GeocodeHit::new("Karnak", LatLng::new(25.7, 32.6))]);
/// assert!(stub.queries().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct StubGeocoder {
    responses: BTreeMap<String, Vec<GeocodeHit>>,
    delays: BTreeMap<String, Duration>,
    failure: Option<GeocodeError>,
    requests: Mutex<Vec<GeocodeQuery>>,
}

impl StubGeocoder {
    /// Create a stub with no canned responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `hits`.
    #[must_use]
    pub fn respond(mut self, query: impl Into<String>, hits: Vec<GeocodeHit>) -> Self {
        self.responses.insert(query.into(), hits);
        self
    }

    /// Wait `delay` before answering `query`.
    #[must_use]
    pub fn delay(mut self, query: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(query.into(), delay);
        self
    }

    /// Fail every request with `error`.
    #[must_use]
    pub fn fail_with(mut self, error: GeocodeError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Requests received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<GeocodeQuery> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Query texts received so far, in arrival order.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.requests().into_iter().map(|query| query.text).collect()
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, query: &GeocodeQuery) -> Result<Vec<GeocodeHit>, GeocodeError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());
        if let Some(delay) = self.delays.get(&query.text) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(self.responses.get(&query.text).cloned().unwrap_or_default())
    }
}
