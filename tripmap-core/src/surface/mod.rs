//! The map surface contract and its two engine-family adapters.
//!
//! A [`MapSurface`] owns one live map engine instance. It is the only layer
//! that knows the engine's native axis order; everything it emits and accepts
//! is a canonical [`LatLng`].
//!
//! Two engine families are supported:
//!
//! - [`TileEngine`]: `[lat, lng]` pairs; markers, popups and polylines are
//!   layers. Wrapped by [`TileSurface`].
//! - [`StyleEngine`]: `[lng, lat]` pairs; the route is a line source plus a
//!   line layer that can only be added once the style has loaded. Wrapped by
//!   [`StyleSurface`].
//!
//! [`headless`] provides in-memory engines of both families.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use crate::{LatLng, LocationId};

pub mod headless;
mod style;
mod tile;

pub use style::{ROUTE_LAYER_ID, ROUTE_SOURCE_ID, StyleEngine, StyleSurface};
pub use tile::{TileEngine, TileSurface};

/// Something that happened on the map, in canonical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    /// The user clicked the map background.
    Click(LatLng),
    /// The user opened the popup bound to a location's marker.
    MarkerActivated(LocationId),
}

/// Callback receiving every [`SurfaceEvent`] of a surface.
pub type SurfaceEventHandler = Box<dyn FnMut(SurfaceEvent)>;

/// Engine-side listener for background clicks, receiving a native pair.
pub type NativeClickListener = Box<dyn FnMut([f64; 2])>;

/// Engine-side listener without a payload, e.g. a marker click.
pub type NativeListener = Box<dyn FnMut()>;

/// Opaque handle to an engine-owned object (marker, popup, listener, layer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NativeHandle(u64);

impl NativeHandle {
    /// Wrap a raw engine handle.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw engine handle.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Errors raised while creating a map engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapInitError {
    /// The engine rejected its access credential.
    #[error("map engine rejected the access credential: {message}")]
    InvalidCredential {
        /// Engine-supplied detail.
        message: String,
    },
    /// The engine could not start for another reason.
    #[error("map engine unavailable: {message}")]
    Unavailable {
        /// Engine-supplied detail.
        message: String,
    },
}

/// Contract every map engine adapter satisfies.
///
/// Only the marker reconciler mutates markers and the route, and only in
/// response to an observed store change.
pub trait MapSurface {
    /// Install the handler receiving [`SurfaceEvent`]s, replacing any previous
    /// one. The engine-level listener itself is registered once, when the
    /// adapter is constructed.
    fn set_event_handler(&mut self, handler: SurfaceEventHandler);

    /// Drop the installed handler; later events are discarded.
    fn clear_event_handler(&mut self);

    /// Create the marker for `id` with a popup bound to it, or move and
    /// relabel the existing one in place.
    fn upsert_marker(&mut self, id: LocationId, at: LatLng, label: &str);

    /// Update the popup content of an existing marker.
    fn set_marker_label(&mut self, id: LocationId, label: &str);

    /// Remove the marker for `id`, releasing its listener, popup and marker
    /// handles.
    fn remove_marker(&mut self, id: LocationId);

    /// Draw `polyline` as the route, replacing any previous geometry.
    fn render_route(&mut self, polyline: &[LatLng]);

    /// Move the camera.
    fn fly_to(&mut self, at: LatLng, zoom: f64);

    /// Retry work the engine's lifecycle forced the adapter to defer.
    fn flush(&mut self) {}

    /// Ids of the markers currently rendered.
    fn marker_ids(&self) -> Vec<LocationId>;

    /// Release every engine resource and destroy the engine instance.
    ///
    /// Calling this more than once is harmless.
    fn dispose(&mut self);
}

/// Lets callers pick the engine family at runtime with
/// `Box<dyn MapSurface>`.
impl<S: MapSurface + ?Sized> MapSurface for Box<S> {
    fn set_event_handler(&mut self, handler: SurfaceEventHandler) {
        (**self).set_event_handler(handler);
    }

    fn clear_event_handler(&mut self) {
        (**self).clear_event_handler();
    }

    fn upsert_marker(&mut self, id: LocationId, at: LatLng, label: &str) {
        (**self).upsert_marker(id, at, label);
    }

    fn set_marker_label(&mut self, id: LocationId, label: &str) {
        (**self).set_marker_label(id, label);
    }

    fn remove_marker(&mut self, id: LocationId) {
        (**self).remove_marker(id);
    }

    fn render_route(&mut self, polyline: &[LatLng]) {
        (**self).render_route(polyline);
    }

    fn fly_to(&mut self, at: LatLng, zoom: f64) {
        (**self).fly_to(at, zoom);
    }

    fn flush(&mut self) {
        (**self).flush();
    }

    fn marker_ids(&self) -> Vec<LocationId> {
        (**self).marker_ids()
    }

    fn dispose(&mut self) {
        (**self).dispose();
    }
}

/// Shared slot through which native listeners reach the installed handler.
///
/// Native listeners hold clones of the sink, so installing a new handler
/// never requires re-registering them with the engine.
#[derive(Clone, Default)]
pub(crate) struct EventSink(Rc<RefCell<Option<SurfaceEventHandler>>>);

impl EventSink {
    pub(crate) fn replace(&self, handler: Option<SurfaceEventHandler>) {
        match self.0.try_borrow_mut() {
            Ok(mut slot) => *slot = handler,
            Err(_) => log::warn!("cannot swap surface event handler while it is running"),
        }
    }

    pub(crate) fn emit(&self, event: SurfaceEvent) {
        let Ok(mut slot) = self.0.try_borrow_mut() else {
            log::warn!("dropping re-entrant surface event {event:?}");
            return;
        };
        if let Some(handler) = slot.as_mut() {
            handler(event);
        }
    }
}

/// Engine resources owned by one rendered marker.
#[derive(Debug, Clone)]
pub(crate) struct MarkerSlot {
    pub(crate) marker: NativeHandle,
    pub(crate) popup: NativeHandle,
    pub(crate) listener: NativeHandle,
    pub(crate) at: LatLng,
    pub(crate) label: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn sink_without_handler_discards_events() {
        let sink = EventSink::default();
        sink.emit(SurfaceEvent::Click(LatLng::new(0.0, 0.0)));
    }

    #[rstest]
    fn sink_forwards_to_latest_handler() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = EventSink::default();
        let first = Rc::clone(&seen);
        sink.replace(Some(Box::new(move |_| first.borrow_mut().push("first"))));
        let second = Rc::clone(&seen);
        sink.replace(Some(Box::new(move |_| second.borrow_mut().push("second"))));

        sink.emit(SurfaceEvent::MarkerActivated(LocationId::new(1)));

        assert_eq!(*seen.borrow(), vec!["second"]);
    }
}
