//! Facade crate for the trip map editor.
//!
//! This crate re-exports the editing engine and, behind the
//! `geocoder-nominatim` feature, the HTTP geocoding provider.

#![forbid(unsafe_code)]

pub use tripmap_core::{
    EditorConfig, EditorSession, InteractionMode, LatLng, Location, LocationId, LocationPatch,
    LocationStore, MapInitError, MapSurface, MediaHandle, PlaceSearch, Route, SearchConfig,
    SearchResult, StoreError, SurfaceEvent, TripDraft,
};
pub use tripmap_core::{search, surface};

#[cfg(feature = "geocoder-nominatim")]
pub use tripmap_data::geocoding::{NominatimGeocoder, NominatimGeocoderConfig};
