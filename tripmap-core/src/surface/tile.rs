//! Adapter for tile-layer engines that store pairs as `[lat, lng]`.

use std::collections::BTreeMap;

use crate::{AxisOrder, LatLng, LocationId};

use super::{
    EventSink, MapSurface, MarkerSlot, NativeClickListener, NativeHandle, NativeListener,
    SurfaceEvent, SurfaceEventHandler,
};

const AXIS: AxisOrder = AxisOrder::LatLng;

/// Native API of the tile-layer engine family.
///
/// Every pair is `[lat, lng]`. Markers and polylines are layers removed with
/// [`TileEngine::remove_layer`]; popups are bound to a marker.
pub trait TileEngine {
    /// Register the map background click listener.
    fn on_click(&mut self, listener: NativeClickListener);
    /// Deregister the map background click listener.
    fn off_click(&mut self);
    /// Add a marker layer.
    fn add_marker(&mut self, at: [f64; 2]) -> NativeHandle;
    /// Move a marker layer.
    fn set_marker_position(&mut self, marker: NativeHandle, at: [f64; 2]);
    /// Bind a popup to a marker.
    fn bind_popup(&mut self, marker: NativeHandle, content: &str) -> NativeHandle;
    /// Replace the content of a bound popup.
    fn set_popup_content(&mut self, popup: NativeHandle, content: &str);
    /// Unbind and destroy the popup bound to a marker.
    fn unbind_popup(&mut self, marker: NativeHandle);
    /// Listen for clicks on a marker.
    fn on_marker_click(&mut self, marker: NativeHandle, listener: NativeListener) -> NativeHandle;
    /// Deregister a listener.
    fn off(&mut self, listener: NativeHandle);
    /// Add a polyline layer.
    fn add_polyline(&mut self, points: &[[f64; 2]]) -> NativeHandle;
    /// Replace the points of a polyline layer.
    fn set_polyline_points(&mut self, polyline: NativeHandle, points: &[[f64; 2]]);
    /// Remove a marker or polyline layer from the map.
    fn remove_layer(&mut self, layer: NativeHandle);
    /// Animate the view to `at` and `zoom`.
    fn fly_to(&mut self, at: [f64; 2], zoom: f64);
    /// Destroy the map instance.
    fn remove(&mut self);
}

/// [`MapSurface`] over a [`TileEngine`].
///
/// # Examples
/// ```
/// use tripmap_core::surface::{MapSurface, TileSurface, headless::HeadlessTileEngine};
/// use tripmap_core::{LatLng, LocationId};
///
/// let engine = HeadlessTileEngine::new();
/// let mut surface = TileSurface::new(engine.clone());
/// surface.upsert_marker(LocationId::new(1), LatLng::new(25.7, 32.6), "Karnak");
///
/// assert_eq!(engine.marker_positions(), vec![[25.7, 32.6]]);
/// ```
pub struct TileSurface<E: TileEngine> {
    engine: E,
    sink: EventSink,
    markers: BTreeMap<LocationId, MarkerSlot>,
    route_layer: Option<NativeHandle>,
    disposed: bool,
}

impl<E: TileEngine> TileSurface<E> {
    /// Wrap `engine`, registering the single background click listener.
    pub fn new(mut engine: E) -> Self {
        let sink = EventSink::default();
        let forward = sink.clone();
        engine.on_click(Box::new(move |native| {
            forward.emit(SurfaceEvent::Click(AXIS.to_canonical(native)));
        }));
        Self {
            engine,
            sink,
            markers: BTreeMap::new(),
            route_layer: None,
            disposed: false,
        }
    }

    /// Borrow the wrapped engine.
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    fn create_marker(&mut self, id: LocationId, at: LatLng, label: &str) {
        let marker = self.engine.add_marker(AXIS.to_native(at));
        let popup = self.engine.bind_popup(marker, label);
        let sink = self.sink.clone();
        let listener = self.engine.on_marker_click(
            marker,
            Box::new(move || sink.emit(SurfaceEvent::MarkerActivated(id))),
        );
        self.markers.insert(
            id,
            MarkerSlot {
                marker,
                popup,
                listener,
                at,
                label: label.to_owned(),
            },
        );
    }

    fn release(&mut self, slot: &MarkerSlot) {
        self.engine.off(slot.listener);
        self.engine.unbind_popup(slot.marker);
        self.engine.remove_layer(slot.marker);
    }
}

impl<E: TileEngine> MapSurface for TileSurface<E> {
    fn set_event_handler(&mut self, handler: SurfaceEventHandler) {
        self.sink.replace(Some(handler));
    }

    fn clear_event_handler(&mut self) {
        self.sink.replace(None);
    }

    fn upsert_marker(&mut self, id: LocationId, at: LatLng, label: &str) {
        if self.disposed {
            log::warn!("ignoring marker {id} on a disposed tile surface");
            return;
        }
        let Some(slot) = self.markers.get_mut(&id) else {
            self.create_marker(id, at, label);
            return;
        };
        if slot.at != at {
            self.engine.set_marker_position(slot.marker, AXIS.to_native(at));
            slot.at = at;
        }
        if slot.label != label {
            self.engine.set_popup_content(slot.popup, label);
            label.clone_into(&mut slot.label);
        }
    }

    fn set_marker_label(&mut self, id: LocationId, label: &str) {
        if let Some(slot) = self.markers.get_mut(&id) {
            self.engine.set_popup_content(slot.popup, label);
            label.clone_into(&mut slot.label);
        }
    }

    fn remove_marker(&mut self, id: LocationId) {
        if let Some(slot) = self.markers.remove(&id) {
            self.release(&slot);
        }
    }

    fn render_route(&mut self, polyline: &[LatLng]) {
        if self.disposed {
            return;
        }
        let native = AXIS.polyline_to_native(polyline);
        match self.route_layer {
            Some(layer) if native.is_empty() => {
                self.engine.remove_layer(layer);
                self.route_layer = None;
            }
            Some(layer) => self.engine.set_polyline_points(layer, &native),
            None if native.is_empty() => {}
            None => self.route_layer = Some(self.engine.add_polyline(&native)),
        }
    }

    fn fly_to(&mut self, at: LatLng, zoom: f64) {
        if !self.disposed {
            self.engine.fly_to(AXIS.to_native(at), zoom);
        }
    }

    fn marker_ids(&self) -> Vec<LocationId> {
        self.markers.keys().copied().collect()
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.engine.off_click();
        self.sink.replace(None);
        let markers = std::mem::take(&mut self.markers);
        for slot in markers.values() {
            self.release(slot);
        }
        if let Some(layer) = self.route_layer.take() {
            self.engine.remove_layer(layer);
        }
        self.engine.remove();
        self.disposed = true;
    }
}

impl<E: TileEngine> Drop for TileSurface<E> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::headless::HeadlessTileEngine;
    use rstest::{fixture, rstest};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[fixture]
    fn engine() -> HeadlessTileEngine {
        HeadlessTileEngine::new()
    }

    #[rstest]
    fn clicks_arrive_in_canonical_order(engine: HeadlessTileEngine) {
        let mut surface = TileSurface::new(engine.clone());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        surface.set_event_handler(Box::new(move |event| sink.borrow_mut().push(event)));

        engine.click([30.0444, 31.2357]);

        assert_eq!(
            *seen.borrow(),
            vec![SurfaceEvent::Click(LatLng::new(30.0444, 31.2357))]
        );
    }

    #[rstest]
    fn upsert_moves_existing_marker_in_place(engine: HeadlessTileEngine) {
        let mut surface = TileSurface::new(engine.clone());
        let id = LocationId::new(1);
        surface.upsert_marker(id, LatLng::new(1.0, 2.0), "a");
        surface.upsert_marker(id, LatLng::new(3.0, 4.0), "b");

        assert_eq!(engine.markers_created(), 1);
        assert_eq!(engine.marker_positions(), vec![[3.0, 4.0]]);
        assert_eq!(engine.popup_contents(), vec!["b".to_owned()]);
    }

    #[rstest]
    fn removing_marker_releases_every_handle(engine: HeadlessTileEngine) {
        let mut surface = TileSurface::new(engine.clone());
        let id = LocationId::new(1);
        surface.upsert_marker(id, LatLng::new(1.0, 2.0), "a");
        surface.remove_marker(id);

        assert_eq!(engine.marker_count(), 0);
        assert_eq!(engine.popup_count(), 0);
        assert_eq!(engine.marker_listener_count(), 0);
    }

    #[rstest]
    fn empty_route_removes_polyline_layer(engine: HeadlessTileEngine) {
        let mut surface = TileSurface::new(engine.clone());
        surface.render_route(&[LatLng::new(1.0, 2.0), LatLng::new(3.0, 4.0)]);
        assert_eq!(engine.route_points(), Some(vec![[1.0, 2.0], [3.0, 4.0]]));

        surface.render_route(&[]);
        assert_eq!(engine.route_points(), None);
    }

    #[rstest]
    fn dropping_surface_destroys_engine(engine: HeadlessTileEngine) {
        let mut surface = TileSurface::new(engine.clone());
        surface.upsert_marker(LocationId::new(1), LatLng::new(1.0, 2.0), "a");
        surface.render_route(&[LatLng::new(1.0, 2.0)]);
        drop(surface);

        assert!(engine.is_destroyed());
        assert!(!engine.has_click_listener());
        assert_eq!(engine.marker_count(), 0);
        assert_eq!(engine.route_points(), None);
    }
}
