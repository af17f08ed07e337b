//! Bring a map surface into agreement with a store snapshot.
//!
//! The reconciler remembers what it last rendered and, given a new snapshot,
//! computes the minimal set of surface mutations. A marker whose id survives a
//! change is never removed and recreated: it is moved or relabelled in place,
//! so popups bound to it stay open.

use std::collections::{BTreeMap, BTreeSet};

use crate::surface::MapSurface;
use crate::{LatLng, Location, LocationId, LocationStore};

/// A marker to create.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    /// Location the marker belongs to.
    pub id: LocationId,
    /// Marker position.
    pub at: LatLng,
    /// Popup content.
    pub label: String,
}

/// Surface mutations needed to reach a snapshot.
///
/// `remove`, `add`, `reposition` and `relabel` are pairwise disjoint by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    /// Markers whose location no longer exists.
    pub remove: Vec<LocationId>,
    /// Markers for new locations.
    pub add: Vec<MarkerSpec>,
    /// Existing markers whose coordinates changed.
    pub reposition: Vec<(LocationId, LatLng)>,
    /// Existing markers whose popup label changed.
    pub relabel: Vec<(LocationId, String)>,
    /// Replacement route geometry, if the route changed.
    pub route: Option<Vec<LatLng>>,
}

impl ReconcilePlan {
    /// Whether applying the plan would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty()
            && self.add.is_empty()
            && self.reposition.is_empty()
            && self.relabel.is_empty()
            && self.route.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Rendered {
    at: LatLng,
    label: String,
}

/// Tracks rendered markers and route, and diffs them against store snapshots.
///
/// # Examples
/// ```
/// use tripmap_core::surface::{MapSurface, TileSurface, headless::HeadlessTileEngine};
/// use tripmap_core::{LatLng, LocationStore, MarkerReconciler};
///
/// let engine = HeadlessTileEngine::new();
/// let mut surface = TileSurface::new(engine.clone());
/// let mut reconciler = MarkerReconciler::new();
/// let mut store = LocationStore::new();
///
/// let id = store.add_location(LatLng::new(25.7, 32.6), "Karnak");
/// reconciler.settle(&store, &mut surface);
///
/// assert_eq!(surface.marker_ids(), vec![id]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MarkerReconciler {
    rendered: BTreeMap<LocationId, Rendered>,
    route: Vec<LatLng>,
    settled_revision: Option<u64>,
}

impl MarkerReconciler {
    /// Create a reconciler that has rendered nothing yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of the markers this reconciler believes are rendered.
    #[must_use]
    pub fn rendered_ids(&self) -> BTreeSet<LocationId> {
        self.rendered.keys().copied().collect()
    }

    /// Whether `store` has changed since the last settle.
    #[must_use]
    pub fn is_stale(&self, store: &LocationStore) -> bool {
        self.settled_revision != Some(store.revision())
    }

    /// Compute the mutations needed to render `locations` and `route`.
    #[must_use]
    pub fn plan(&self, locations: &[Location], route: &[LatLng]) -> ReconcilePlan {
        let mut plan = ReconcilePlan::default();
        let current: BTreeSet<LocationId> = locations.iter().map(|location| location.id).collect();

        plan.remove = self
            .rendered
            .keys()
            .filter(|id| !current.contains(*id))
            .copied()
            .collect();

        for location in locations {
            let label = location.display_label();
            match self.rendered.get(&location.id) {
                None => plan.add.push(MarkerSpec {
                    id: location.id,
                    at: location.coordinates,
                    label,
                }),
                Some(rendered) => {
                    if rendered.at != location.coordinates {
                        plan.reposition.push((location.id, location.coordinates));
                    }
                    if rendered.label != label {
                        plan.relabel.push((location.id, label));
                    }
                }
            }
        }

        if self.route != route {
            plan.route = Some(route.to_vec());
        }
        plan
    }

    /// Apply `plan` to `surface` and record the result as rendered.
    pub fn apply<S: MapSurface + ?Sized>(&mut self, plan: ReconcilePlan, surface: &mut S) {
        for id in plan.remove {
            surface.remove_marker(id);
            self.rendered.remove(&id);
        }
        for spec in plan.add {
            surface.upsert_marker(spec.id, spec.at, &spec.label);
            self.rendered.insert(
                spec.id,
                Rendered {
                    at: spec.at,
                    label: spec.label,
                },
            );
        }
        for (id, at) in plan.reposition {
            if let Some(rendered) = self.rendered.get_mut(&id) {
                surface.upsert_marker(id, at, &rendered.label);
                rendered.at = at;
            }
        }
        for (id, label) in plan.relabel {
            if let Some(rendered) = self.rendered.get_mut(&id) {
                surface.set_marker_label(id, &label);
                rendered.label = label;
            }
        }
        if let Some(route) = plan.route {
            surface.render_route(&route);
            self.route = route;
        }
    }

    /// Reconcile `surface` against `store` if the store changed since the
    /// last settle. Returns whether any surface mutation was issued.
    pub fn settle<S: MapSurface + ?Sized>(&mut self, store: &LocationStore, surface: &mut S) -> bool {
        surface.flush();
        if !self.is_stale(store) {
            return false;
        }
        let plan = self.plan(store.locations(), store.route().vertices());
        self.settled_revision = Some(store.revision());
        if plan.is_empty() {
            return false;
        }
        log::debug!(
            "reconciling revision {}: -{} +{} ~{} markers",
            store.revision(),
            plan.remove.len(),
            plan.add.len(),
            plan.reposition.len() + plan.relabel.len()
        );
        self.apply(plan, surface);
        true
    }
}
