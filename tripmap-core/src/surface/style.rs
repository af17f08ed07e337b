//! Adapter for style-driven engines that store pairs as `[lng, lat]`.
//!
//! The route lives in a line source rendered by a line layer. Sources and
//! layers can only be added once the style has loaded, so route updates
//! requested earlier are queued until [`MapSurface::flush`] finds the style
//! ready.

use std::collections::BTreeMap;

use crate::{AxisOrder, LatLng, LocationId};

use super::{
    EventSink, MapSurface, MarkerSlot, NativeClickListener, NativeHandle, NativeListener,
    SurfaceEvent, SurfaceEventHandler,
};

const AXIS: AxisOrder = AxisOrder::LngLat;

/// Source id used for the route geometry.
pub const ROUTE_SOURCE_ID: &str = "tripmap-route";

/// Layer id used to draw the route.
pub const ROUTE_LAYER_ID: &str = "tripmap-route-line";

/// Native API of the style-driven engine family.
///
/// Every pair is `[lng, lat]`. Sources and layers are addressed by string id.
pub trait StyleEngine {
    /// Register the map background click listener.
    fn on_click(&mut self, listener: NativeClickListener);
    /// Deregister the map background click listener.
    fn off_click(&mut self);
    /// Whether the style has finished loading.
    fn is_style_loaded(&self) -> bool;
    /// Add a marker at `at`.
    fn add_marker(&mut self, at: [f64; 2]) -> NativeHandle;
    /// Move a marker.
    fn set_marker_lng_lat(&mut self, marker: NativeHandle, at: [f64; 2]);
    /// Remove a marker from the map.
    fn remove_marker(&mut self, marker: NativeHandle);
    /// Attach a popup to a marker.
    fn set_popup(&mut self, marker: NativeHandle, html: &str) -> NativeHandle;
    /// Replace the content of a popup.
    fn set_popup_html(&mut self, popup: NativeHandle, html: &str);
    /// Destroy a popup.
    fn remove_popup(&mut self, popup: NativeHandle);
    /// Listen for clicks on a marker element.
    fn on_marker_click(&mut self, marker: NativeHandle, listener: NativeListener) -> NativeHandle;
    /// Deregister a listener.
    fn off(&mut self, listener: NativeHandle);
    /// Add a line-string source.
    fn add_line_source(&mut self, source_id: &str, coordinates: &[[f64; 2]]);
    /// Replace the data of a line-string source.
    fn set_line_source_data(&mut self, source_id: &str, coordinates: &[[f64; 2]]);
    /// Add a line layer drawing `source_id`.
    fn add_line_layer(&mut self, layer_id: &str, source_id: &str);
    /// Remove a layer.
    fn remove_layer(&mut self, layer_id: &str);
    /// Remove a source. Layers using it must already be gone.
    fn remove_source(&mut self, source_id: &str);
    /// Animate the camera to `center` and `zoom`.
    fn fly_to(&mut self, center: [f64; 2], zoom: f64);
    /// Destroy the map instance.
    fn remove(&mut self);
}

/// [`MapSurface`] over a [`StyleEngine`].
///
/// # Examples
/// ```
/// use tripmap_core::surface::{MapSurface, StyleSurface, headless::HeadlessStyleEngine};
/// use tripmap_core::{LatLng, LocationId};
///
/// # fn main() -> Result<(), tripmap_core::MapInitError> {
/// let engine = HeadlessStyleEngine::connect("pk.test")?;
/// let mut surface = StyleSurface::new(engine.clone());
/// surface.upsert_marker(LocationId::new(1), LatLng::new(25.7, 32.6), "Karnak");
///
/// assert_eq!(engine.marker_positions(), vec![[32.6, 25.7]]);
/// # Ok(())
/// # }
/// ```
pub struct StyleSurface<E: StyleEngine> {
    engine: E,
    sink: EventSink,
    markers: BTreeMap<LocationId, MarkerSlot>,
    route_live: bool,
    pending_route: Option<Vec<[f64; 2]>>,
    disposed: bool,
}

impl<E: StyleEngine> StyleSurface<E> {
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
            route_live: false,
            pending_route: None,
            disposed: false,
        }
    }

    /// Borrow the wrapped engine.
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    fn create_marker(&mut self, id: LocationId, at: LatLng, label: &str) {
        let marker = self.engine.add_marker(AXIS.to_native(at));
        let popup = self.engine.set_popup(marker, label);
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
        self.engine.remove_popup(slot.popup);
        self.engine.remove_marker(slot.marker);
    }

    fn apply_route(&mut self, native: &[[f64; 2]]) {
        if self.route_live {
            self.engine.set_line_source_data(ROUTE_SOURCE_ID, native);
            return;
        }
        if native.is_empty() {
            return;
        }
        self.engine.add_line_source(ROUTE_SOURCE_ID, native);
        self.engine.add_line_layer(ROUTE_LAYER_ID, ROUTE_SOURCE_ID);
        self.route_live = true;
    }
}

impl<E: StyleEngine> MapSurface for StyleSurface<E> {
    fn set_event_handler(&mut self, handler: SurfaceEventHandler) {
        self.sink.replace(Some(handler));
    }

    fn clear_event_handler(&mut self) {
        self.sink.replace(None);
    }

    fn upsert_marker(&mut self, id: LocationId, at: LatLng, label: &str) {
        if self.disposed {
            log::warn!("ignoring marker {id} on a disposed style surface");
            return;
        }
        let Some(slot) = self.markers.get_mut(&id) else {
            self.create_marker(id, at, label);
            return;
        };
        if slot.at != at {
            self.engine.set_marker_lng_lat(slot.marker, AXIS.to_native(at));
            slot.at = at;
        }
        if slot.label != label {
            self.engine.set_popup_html(slot.popup, label);
            label.clone_into(&mut slot.label);
        }
    }

    fn set_marker_label(&mut self, id: LocationId, label: &str) {
        if let Some(slot) = self.markers.get_mut(&id) {
            self.engine.set_popup_html(slot.popup, label);
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
        if !self.engine.is_style_loaded() {
            log::debug!("style not loaded; deferring route with {} vertices", native.len());
            self.pending_route = Some(native);
            return;
        }
        self.pending_route = None;
        self.apply_route(&native);
    }

    fn fly_to(&mut self, at: LatLng, zoom: f64) {
        if !self.disposed {
            self.engine.fly_to(AXIS.to_native(at), zoom);
        }
    }

    fn flush(&mut self) {
        if self.disposed || !self.engine.is_style_loaded() {
            return;
        }
        if let Some(native) = self.pending_route.take() {
            self.apply_route(&native);
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
        if self.route_live {
            self.engine.remove_layer(ROUTE_LAYER_ID);
            self.engine.remove_source(ROUTE_SOURCE_ID);
            self.route_live = false;
        }
        self.pending_route = None;
        self.engine.remove();
        self.disposed = true;
    }
}

impl<E: StyleEngine> Drop for StyleSurface<E> {
    fn drop(&mut self) {
        self.dispose();
    }
}
