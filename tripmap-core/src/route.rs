//! The ordered polyline a trip follows.
//!
//! A route is independent of named locations. It only grows by appending
//! vertices and only shrinks by a full clear.

use geo::{BoundingRect, LineString, Rect};

use crate::LatLng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ordered vertices in canonical order. Sequence order is path order.
///
/// # Examples
/// ```
/// use tripmap_core::{LatLng, Route};
///
/// let mut route = Route::empty();
/// route.push(LatLng::new(30.05, 31.24));
/// route.push(LatLng::new(30.06, 31.25));
///
/// assert_eq!(route.len(), 2);
/// assert_eq!(route.vertices()[0], LatLng::new(30.05, 31.24));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Route {
    vertices: Vec<LatLng>,
}

impl Route {
    /// Construct a route from vertices already in path order.
    #[must_use]
    pub const fn new(vertices: Vec<LatLng>) -> Self {
        Self { vertices }
    }

    /// Construct an empty route.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Append a vertex at the end of the path.
    pub fn push(&mut self, vertex: LatLng) {
        self.vertices.push(vertex);
    }

    /// Remove every vertex.
    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Borrow the vertices in path order.
    #[must_use]
    pub fn vertices(&self) -> &[LatLng] {
        &self.vertices
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the route has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The route as a `geo` line string (`x = lng`, `y = lat`).
    #[must_use]
    pub fn to_line_string(&self) -> LineString<f64> {
        self.vertices.iter().copied().map(geo::Coord::from).collect()
    }

    /// Bounding box of all vertices, or `None` for an empty route.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.to_line_string().bounding_rect()
    }
}

impl From<Vec<LatLng>> for Route {
    fn from(vertices: Vec<LatLng>) -> Self {
        Self::new(vertices)
    }
}
