//! Canonical holder of a trip's locations and route.
//!
//! The store is passive: it never talks to a map surface. Every mutation bumps
//! [`LocationStore::revision`] so the reconciler can tell when a snapshot has
//! changed.

use std::collections::HashSet;

use thiserror::Error;

use crate::{LatLng, Location, LocationId, LocationPatch, Route};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors returned by [`LocationStore`] mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No location with the given id exists.
    #[error("no location with id {id}")]
    UnknownLocation {
        /// The id that was looked up.
        id: LocationId,
    },
}

/// Serialisable trip state handed to the persistence collaborator.
///
/// Coordinates are always `[lat, lng]`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TripDraft {
    /// Locations in creation order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub locations: Vec<Location>,
    /// Route vertices in path order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub route: Route,
}

/// Locations and route for one editor session.
///
/// # Examples
/// ```
/// use tripmap_core::{LatLng, LocationPatch, LocationStore};
///
/// # fn main() -> Result<(), tripmap_core::StoreError> {
/// let mut store = LocationStore::new();
/// let id = store.add_location(LatLng::new(25.7, 32.6), "");
/// store.update_location(id, LocationPatch::default().with_name("Karnak"))?;
///
/// assert_eq!(store.location(id).map(|l| l.name.as_str()), Some("Karnak"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocationStore {
    locations: Vec<Location>,
    route: Route,
    next_id: u64,
    revision: u64,
}

impl LocationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a store from a previously saved draft.
    ///
    /// New ids are allocated above the highest id in the draft.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the draft contains duplicate location ids.
    /// Release builds log the defect and keep the first occurrence.
    #[must_use]
    pub fn from_draft(draft: TripDraft) -> Self {
        let mut seen = HashSet::with_capacity(draft.locations.len());
        let mut locations = Vec::with_capacity(draft.locations.len());
        for location in draft.locations {
            if seen.insert(location.id) {
                locations.push(location);
                continue;
            }
            if cfg!(debug_assertions) {
                panic!("duplicate location id {} in trip draft", location.id);
            }
            log::error!(
                "dropping duplicate location id {} from trip draft",
                location.id
            );
        }
        let next_id = locations
            .iter()
            .map(|location| location.id.get().saturating_add(1))
            .max()
            .unwrap_or(0);
        Self {
            locations,
            route: draft.route,
            next_id,
            revision: 0,
        }
    }

    /// Snapshot the current state for persistence.
    #[must_use]
    pub fn to_draft(&self) -> TripDraft {
        TripDraft {
            locations: self.locations.clone(),
            route: self.route.clone(),
        }
    }

    /// Create a location and return its freshly allocated id.
    pub fn add_location(&mut self, coordinates: LatLng, name: impl Into<String>) -> LocationId {
        let id = LocationId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.locations.push(Location::new(id, coordinates, name));
        self.bump();
        id
    }

    /// Apply a partial update to the location with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownLocation`] when no such location exists.
    pub fn update_location(&mut self, id: LocationId, patch: LocationPatch) -> Result<(), StoreError> {
        let location = self
            .locations
            .iter_mut()
            .find(|location| location.id == id)
            .ok_or(StoreError::UnknownLocation { id })?;
        if patch.is_empty() {
            return Ok(());
        }
        location.apply(patch);
        self.bump();
        Ok(())
    }

    /// Remove the location with `id`, returning it if it existed.
    pub fn remove_location(&mut self, id: LocationId) -> Option<Location> {
        let index = self.locations.iter().position(|location| location.id == id)?;
        let removed = self.locations.remove(index);
        self.bump();
        Some(removed)
    }

    /// Append a vertex to the end of the route.
    pub fn append_route_vertex(&mut self, vertex: LatLng) {
        self.route.push(vertex);
        self.bump();
    }

    /// Remove every route vertex.
    pub fn clear_route(&mut self) {
        if self.route.is_empty() {
            return;
        }
        self.route.clear();
        self.bump();
    }

    /// Locations in creation order.
    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Look up a location by id.
    #[must_use]
    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.iter().find(|location| location.id == id)
    }

    /// Whether a location with `id` exists.
    #[must_use]
    pub fn contains(&self, id: LocationId) -> bool {
        self.location(id).is_some()
    }

    /// The route.
    #[must_use]
    pub const fn route(&self) -> &Route {
        &self.route
    }

    /// Monotonic counter bumped on every mutation.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
