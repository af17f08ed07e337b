//! Trip locations and the partial updates the media manager issues.

use crate::LatLng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque identifier of a [`Location`], unique for the lifetime of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct LocationId(u64);

impl LocationId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to an attachment owned by the media-manager collaborator.
///
/// The editor stores and returns these verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct MediaHandle(String);

impl MediaHandle {
    /// Wrap a collaborator-issued handle.
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Borrow the raw handle.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A named point of interest in a trip.
///
/// `id` and `coordinates` are fixed at creation. Only `name`, `description`
/// and `media` change afterwards, through [`LocationPatch`].
///
/// # Examples
/// ```
/// use tripmap_core::{LatLng, Location, LocationId};
///
/// let location = Location::new(LocationId::new(1), LatLng::new(25.7, 32.6), "Karnak");
/// assert_eq!(location.name, "Karnak");
/// assert!(location.description.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Stable identifier.
    pub id: LocationId,
    /// Position in canonical order.
    pub coordinates: LatLng,
    /// Display name, possibly empty.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Free-form description, possibly empty.
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    /// Attached media handles.
    #[cfg_attr(feature = "serde", serde(default))]
    pub media: Vec<MediaHandle>,
}

impl Location {
    /// Construct a location with an empty description and no media.
    #[must_use]
    pub fn new(id: LocationId, coordinates: LatLng, name: impl Into<String>) -> Self {
        Self {
            id,
            coordinates,
            name: name.into(),
            description: String::new(),
            media: Vec::new(),
        }
    }

    /// Text shown in the marker popup: the name, or the coordinates when
    /// the location is still unnamed.
    #[must_use]
    pub fn display_label(&self) -> String {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            self.coordinates.to_string()
        } else {
            trimmed.to_owned()
        }
    }

    /// Apply a partial update. `id` and `coordinates` are never touched.
    pub fn apply(&mut self, patch: LocationPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(media) = patch.media {
            self.media = media;
        }
    }
}

/// Partial, id-keyed update issued by the media-manager collaborator.
///
/// # Examples
/// ```
/// use tripmap_core::LocationPatch;
///
/// let patch = LocationPatch::default().with_name("Luxor Temple");
/// assert_eq!(patch.name.as_deref(), Some("Luxor Temple"));
/// assert!(patch.description.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationPatch {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement media list.
    pub media: Option<Vec<MediaHandle>>,
}

impl LocationPatch {
    /// Set the replacement name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the replacement description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the replacement media list.
    #[must_use]
    pub fn with_media(mut self, media: Vec<MediaHandle>) -> Self {
        self.media = Some(media);
        self
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.media.is_none()
    }
}
