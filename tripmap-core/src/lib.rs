//! Core model and editing engine for trip maps.
//!
//! The crate keeps a declarative list of trip [`Location`]s and an ordered
//! [`Route`] in a [`LocationStore`], and keeps an imperatively managed map in
//! step with it:
//!
//! - [`surface`] defines the [`MapSurface`](surface::MapSurface) contract,
//!   the adapters for the two supported engine families and, in
//!   [`surface::headless`], in-memory engines of both families.
//! - [`MarkerReconciler`] diffs store snapshots against what is rendered and
//!   issues the minimal set of marker and route mutations.
//! - [`search`] runs debounced, latest-query-wins place search against a
//!   [`Geocoder`](search::Geocoder).
//! - [`EditorSession`] ties these together for one editing session.
//!
//! Coordinates are always canonical `(latitude, longitude)`; only the surface
//! adapters know an engine's native axis order.

mod config;
mod coord;
mod location;
mod manual;
mod mode;
mod reconcile;
mod route;
mod session;
mod store;

pub mod search;
pub mod surface;

#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;

pub use config::{
    DEFAULT_DEBOUNCE, DEFAULT_FOCUS_ZOOM, DEFAULT_MAX_RESULTS, DEFAULT_MIN_QUERY_CHARS,
    DEFAULT_PROVIDER_LIMIT, EditorConfig, SearchConfig,
};
pub use coord::{AxisOrder, LatLng};
pub use location::{Location, LocationId, LocationPatch, MediaHandle};
pub use manual::ManualEntry;
pub use mode::{InteractionMode, ModeController};
pub use reconcile::{MarkerReconciler, MarkerSpec, ReconcilePlan};
pub use route::Route;
pub use search::{CityScope, PlaceSearch, SearchResult, SearchSnapshot};
pub use session::{EditorSession, EditorState, MapView};
pub use store::{LocationStore, StoreError, TripDraft};
pub use surface::{MapInitError, MapSurface, SurfaceEvent};
