//! HTTP geocoding providers for place search.
//!
//! This module provides [`NominatimGeocoder`], an implementation of
//! [`tripmap_core::search::Geocoder`] that resolves free-form text through a
//! Nominatim-compatible search service.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tripmap_data::geocoding::{NominatimGeocoder, NominatimGeocoderConfig};
//!
//! let config = NominatimGeocoderConfig::new("https://nominatim.openstreetmap.org")
//!     .with_timeout(Duration::from_secs(5))
//!     .with_user_agent("my-trip-app/1.0")
//!     .with_language("ar,en");
//! let geocoder = NominatimGeocoder::with_config(config)?;
//! # Ok::<(), tripmap_data::geocoding::ProviderBuildError>(())
//! ```

mod nominatim;
mod provider;

pub use nominatim::Place;
pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, NominatimGeocoder, NominatimGeocoderConfig,
    ProviderBuildError,
};
