//! Canonical coordinate pairs and native axis-order conversion.
//!
//! Everything above the map surface adapters speaks [`LatLng`]. Map engines
//! disagree on how they store a pair: some use `[lat, lng]`, others
//! `[lng, lat]`. [`AxisOrder`] is the only place that knowledge lives.

use geo::Coord;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A WGS84 position in canonical `(latitude, longitude)` order.
///
/// Serialised as a two-element array `[lat, lng]` regardless of which map
/// engine produced it.
///
/// # Examples
/// ```
/// use tripmap_core::LatLng;
///
/// let cairo = LatLng::new(30.0444, 31.2357);
/// assert_eq!(cairo.lat, 30.0444);
/// assert_eq!(cairo.lng, 31.2357);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(from = "[f64; 2]", into = "[f64; 2]")
)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Construct a coordinate from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self::new(lat, lng)
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(value: LatLng) -> Self {
        [value.lat, value.lng]
    }
}

impl From<LatLng> for Coord<f64> {
    /// `geo` uses `x = longitude`, `y = latitude`.
    fn from(value: LatLng) -> Self {
        Coord {
            x: value.lng,
            y: value.lat,
        }
    }
}

impl From<Coord<f64>> for LatLng {
    fn from(value: Coord<f64>) -> Self {
        Self::new(value.y, value.x)
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

/// Axis order a map engine uses for its native coordinate pairs.
///
/// # Examples
/// ```
/// use tripmap_core::{AxisOrder, LatLng};
///
/// let point = LatLng::new(25.7, 32.6);
/// assert_eq!(AxisOrder::LngLat.to_native(point), [32.6, 25.7]);
/// assert_eq!(AxisOrder::LngLat.to_canonical([32.6, 25.7]), point);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisOrder {
    /// Native pairs are `[lat, lng]`.
    LatLng,
    /// Native pairs are `[lng, lat]`.
    LngLat,
}

impl AxisOrder {
    /// Convert a canonical coordinate into the engine's native pair.
    #[must_use]
    pub const fn to_native(self, point: LatLng) -> [f64; 2] {
        match self {
            Self::LatLng => [point.lat, point.lng],
            Self::LngLat => [point.lng, point.lat],
        }
    }

    /// Convert a native pair back into canonical order.
    #[must_use]
    pub const fn to_canonical(self, native: [f64; 2]) -> LatLng {
        match self {
            Self::LatLng => LatLng::new(native[0], native[1]),
            Self::LngLat => LatLng::new(native[1], native[0]),
        }
    }

    /// Convert a canonical polyline into native pairs.
    #[must_use]
    pub fn polyline_to_native(self, points: &[LatLng]) -> Vec<[f64; 2]> {
        points.iter().map(|point| self.to_native(*point)).collect()
    }
}
