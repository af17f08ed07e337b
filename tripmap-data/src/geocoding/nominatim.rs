//! Nominatim search API response types.
//!
//! The `/search` endpoint with `format=jsonv2` returns a JSON array of places.
//! Coordinates arrive as decimal strings; `address` is only present when
//! `addressdetails=1` was requested.
//!
//! See: <https://nominatim.org/release-docs/latest/api/Search/>

use std::collections::BTreeMap;

use serde::Deserialize;
use tripmap_core::LatLng;
use tripmap_core::search::GeocodeHit;

/// A single place returned by the search endpoint.
#[derive(Debug, Deserialize)]
pub struct Place {
    /// Full comma-separated label, e.g. `"Karnak, Luxor, Egypt"`.
    pub display_name: String,
    /// Latitude as a decimal string.
    pub lat: String,
    /// Longitude as a decimal string.
    pub lon: String,
    /// Structured address components keyed by type (`city`, `state`, ...).
    #[serde(default)]
    pub address: BTreeMap<String, String>,
}

impl Place {
    /// Parse the coordinate strings into a canonical pair.
    ///
    /// Returns `None` if either value is not a finite number.
    #[must_use]
    pub fn coordinates(&self) -> Option<LatLng> {
        let lat = self.lat.trim().parse::<f64>().ok()?;
        let lng = self.lon.trim().parse::<f64>().ok()?;
        let point = LatLng::new(lat, lng);
        point.is_finite().then_some(point)
    }

    /// Convert to a provider-neutral hit, dropping places without usable
    /// coordinates.
    #[must_use]
    pub fn into_hit(self) -> Option<GeocodeHit> {
        let Some(coordinates) = self.coordinates() else {
            log::warn!("skipping place {:?} with unusable coordinates", self.display_name);
            return None;
        };
        Some(GeocodeHit {
            label: self.display_name,
            coordinates,
            address: self.address,
        })
    }
}
