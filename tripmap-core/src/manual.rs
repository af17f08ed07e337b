//! Typed-in coordinates.
//!
//! Invalid input is ignored without feedback: submitting leaves both fields
//! untouched and creates nothing.

use crate::LatLng;

/// Raw latitude and longitude text fields.
///
/// # Examples
/// ```
/// use tripmap_core::{LatLng, ManualEntry};
///
/// let mut entry = ManualEntry::default();
/// entry.set_latitude("25.7188");
/// entry.set_longitude("32.6573");
///
/// assert_eq!(entry.submit(), Some(LatLng::new(25.7188, 32.6573)));
/// assert!(entry.latitude().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualEntry {
    latitude: String,
    longitude: String,
}

impl ManualEntry {
    /// Replace the latitude text.
    pub fn set_latitude(&mut self, text: impl Into<String>) {
        self.latitude = text.into();
    }

    /// Replace the longitude text.
    pub fn set_longitude(&mut self, text: impl Into<String>) {
        self.longitude = text.into();
    }

    /// Current latitude text.
    #[must_use]
    pub fn latitude(&self) -> &str {
        &self.latitude
    }

    /// Current longitude text.
    #[must_use]
    pub fn longitude(&self) -> &str {
        &self.longitude
    }

    /// Parse both fields. On success the fields are cleared and the
    /// coordinate is returned; on failure nothing changes.
    pub fn submit(&mut self) -> Option<LatLng> {
        let lat = parse_component(&self.latitude)?;
        let lng = parse_component(&self.longitude)?;
        self.latitude.clear();
        self.longitude.clear();
        Some(LatLng::new(lat, lng))
    }
}

fn parse_component(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
