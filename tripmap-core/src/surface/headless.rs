//! In-memory map engines for both engine families.
//!
//! A headless engine keeps its scene (markers, popups, listeners, route
//! geometry, camera) in memory and lets callers inject native clicks. Clones
//! share the same scene, so a caller can hand one clone to a surface adapter
//! and keep another to drive and inspect it.
//!
//! Destroying the map only flags the scene as destroyed; markers or
//! listeners the adapter failed to release stay visible.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::rc::Rc;

use super::{
    MapInitError, NativeClickListener, NativeHandle, NativeListener, StyleEngine, TileEngine,
    style::ROUTE_SOURCE_ID,
};

/// Marker type for the tile-layer family.
#[derive(Debug, Clone, Copy, Default)]
pub struct TileFamily;

/// Marker type for the style-driven family.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleFamily;

/// Headless engine of the tile-layer family (`[lat, lng]`).
pub type HeadlessTileEngine = HeadlessEngine<TileFamily>;

/// Headless engine of the style-driven family (`[lng, lat]`).
pub type HeadlessStyleEngine = HeadlessEngine<StyleFamily>;

type SharedClickListener = Rc<RefCell<NativeClickListener>>;
type SharedListener = Rc<RefCell<NativeListener>>;

struct Popup {
    marker: NativeHandle,
    content: String,
}

struct MarkerListener {
    marker: NativeHandle,
    listener: SharedListener,
}

#[derive(Default)]
struct Scene {
    next_handle: u64,
    markers: BTreeMap<NativeHandle, [f64; 2]>,
    popups: BTreeMap<NativeHandle, Popup>,
    marker_listeners: BTreeMap<NativeHandle, MarkerListener>,
    click_listener: Option<SharedClickListener>,
    polylines: BTreeMap<NativeHandle, Vec<[f64; 2]>>,
    sources: BTreeMap<String, Vec<[f64; 2]>>,
    layers: BTreeMap<String, String>,
    camera: Option<([f64; 2], f64)>,
    style_loaded: bool,
    destroyed: bool,
    markers_created: usize,
}

impl Scene {
    fn allocate(&mut self) -> NativeHandle {
        self.next_handle += 1;
        NativeHandle::new(self.next_handle)
    }

    fn add_marker(&mut self, at: [f64; 2]) -> NativeHandle {
        let handle = self.allocate();
        self.markers.insert(handle, at);
        self.markers_created += 1;
        handle
    }

    fn move_marker(&mut self, marker: NativeHandle, at: [f64; 2]) {
        if let Some(position) = self.markers.get_mut(&marker) {
            *position = at;
        }
    }

    fn add_popup(&mut self, marker: NativeHandle, content: &str) -> NativeHandle {
        let handle = self.allocate();
        self.popups.insert(
            handle,
            Popup {
                marker,
                content: content.to_owned(),
            },
        );
        handle
    }

    fn set_popup_content(&mut self, popup: NativeHandle, content: &str) {
        if let Some(entry) = self.popups.get_mut(&popup) {
            content.clone_into(&mut entry.content);
        }
    }

    fn listen(&mut self, marker: NativeHandle, listener: NativeListener) -> NativeHandle {
        let handle = self.allocate();
        self.marker_listeners.insert(
            handle,
            MarkerListener {
                marker,
                listener: Rc::new(RefCell::new(listener)),
            },
        );
        handle
    }
}

/// In-memory engine; see the module documentation.
pub struct HeadlessEngine<F> {
    scene: Rc<RefCell<Scene>>,
    family: PhantomData<F>,
}

impl<F> Clone for HeadlessEngine<F> {
    fn clone(&self) -> Self {
        Self {
            scene: Rc::clone(&self.scene),
            family: PhantomData,
        }
    }
}

impl<F> std::fmt::Debug for HeadlessEngine<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scene = self.scene.borrow();
        f.debug_struct("HeadlessEngine")
            .field("markers", &scene.markers.len())
            .field("popups", &scene.popups.len())
            .field("destroyed", &scene.destroyed)
            .finish_non_exhaustive()
    }
}

impl HeadlessEngine<TileFamily> {
    /// Create a tile-layer engine. Tile engines need no credential.
    #[must_use]
    pub fn new() -> Self {
        Self::with_scene(Scene {
            style_loaded: true,
            ..Scene::default()
        })
    }
}

impl Default for HeadlessEngine<TileFamily> {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessEngine<StyleFamily> {
    /// Create a style engine whose style has already loaded.
    ///
    /// # Errors
    ///
    /// Returns [`MapInitError::InvalidCredential`] for a blank access token.
    pub fn connect(access_token: &str) -> Result<Self, MapInitError> {
        let engine = Self::connect_unloaded(access_token)?;
        engine.finish_loading();
        Ok(engine)
    }

    /// Create a style engine that is still loading its style.
    ///
    /// # Errors
    ///
    /// Returns [`MapInitError::InvalidCredential`] for a blank access token.
    pub fn connect_unloaded(access_token: &str) -> Result<Self, MapInitError> {
        if access_token.trim().is_empty() {
            return Err(MapInitError::InvalidCredential {
                message: "access token is empty".to_owned(),
            });
        }
        Ok(Self::with_scene(Scene::default()))
    }

    /// Mark the style as loaded.
    pub fn finish_loading(&self) {
        self.scene.borrow_mut().style_loaded = true;
    }
}

impl<F> HeadlessEngine<F> {
    fn with_scene(scene: Scene) -> Self {
        Self {
            scene: Rc::new(RefCell::new(scene)),
            family: PhantomData,
        }
    }

    /// Deliver a background click at the native pair `at`.
    ///
    /// Returns `false` when no click listener is registered.
    pub fn click(&self, at: [f64; 2]) -> bool {
        let listener = self.scene.borrow().click_listener.clone();
        let Some(listener) = listener else {
            return false;
        };
        (listener.borrow_mut())(at);
        true
    }

    /// Deliver a click to every listener of the marker at the native pair
    /// `at`. Returns the number of listeners invoked.
    pub fn click_marker(&self, at: [f64; 2]) -> usize {
        let listeners: Vec<SharedListener> = {
            let scene = self.scene.borrow();
            let hit: Vec<NativeHandle> = scene
                .markers
                .iter()
                .filter(|(_, position)| **position == at)
                .map(|(handle, _)| *handle)
                .collect();
            scene
                .marker_listeners
                .values()
                .filter(|entry| hit.contains(&entry.marker))
                .map(|entry| Rc::clone(&entry.listener))
                .collect()
        };
        for listener in &listeners {
            (listener.borrow_mut())();
        }
        listeners.len()
    }

    /// Native positions of every live marker, in creation order.
    #[must_use]
    pub fn marker_positions(&self) -> Vec<[f64; 2]> {
        self.scene.borrow().markers.values().copied().collect()
    }

    /// Number of live markers.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.scene.borrow().markers.len()
    }

    /// Number of markers ever created.
    #[must_use]
    pub fn markers_created(&self) -> usize {
        self.scene.borrow().markers_created
    }

    /// Number of live popups.
    #[must_use]
    pub fn popup_count(&self) -> usize {
        self.scene.borrow().popups.len()
    }

    /// Contents of every live popup, in creation order.
    #[must_use]
    pub fn popup_contents(&self) -> Vec<String> {
        self.scene
            .borrow()
            .popups
            .values()
            .map(|popup| popup.content.clone())
            .collect()
    }

    /// Number of registered marker listeners.
    #[must_use]
    pub fn marker_listener_count(&self) -> usize {
        self.scene.borrow().marker_listeners.len()
    }

    /// Whether a background click listener is registered.
    #[must_use]
    pub fn has_click_listener(&self) -> bool {
        self.scene.borrow().click_listener.is_some()
    }

    /// Native points of the rendered route, if any route geometry exists.
    #[must_use]
    pub fn route_points(&self) -> Option<Vec<[f64; 2]>> {
        let scene = self.scene.borrow();
        scene
            .polylines
            .values()
            .next()
            .or_else(|| scene.sources.get(ROUTE_SOURCE_ID))
            .cloned()
    }

    /// Ids of live style layers.
    #[must_use]
    pub fn layer_ids(&self) -> Vec<String> {
        self.scene.borrow().layers.keys().cloned().collect()
    }

    /// Last camera target and zoom.
    #[must_use]
    pub fn camera(&self) -> Option<([f64; 2], f64)> {
        self.scene.borrow().camera
    }

    /// Whether the map instance has been destroyed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.scene.borrow().destroyed
    }

    fn set_click_listener(&self, listener: Option<NativeClickListener>) {
        self.scene.borrow_mut().click_listener = listener.map(|l| Rc::new(RefCell::new(l)));
    }

    fn remove_listener(&self, listener: NativeHandle) {
        self.scene.borrow_mut().marker_listeners.remove(&listener);
    }

    fn set_camera(&self, at: [f64; 2], zoom: f64) {
        self.scene.borrow_mut().camera = Some((at, zoom));
    }

    fn destroy(&self) {
        let mut scene = self.scene.borrow_mut();
        scene.destroyed = true;
        scene.click_listener = None;
    }
}

impl TileEngine for HeadlessEngine<TileFamily> {
    fn on_click(&mut self, listener: NativeClickListener) {
        self.set_click_listener(Some(listener));
    }

    fn off_click(&mut self) {
        self.set_click_listener(None);
    }

    fn add_marker(&mut self, at: [f64; 2]) -> NativeHandle {
        self.scene.borrow_mut().add_marker(at)
    }

    fn set_marker_position(&mut self, marker: NativeHandle, at: [f64; 2]) {
        self.scene.borrow_mut().move_marker(marker, at);
    }

    fn bind_popup(&mut self, marker: NativeHandle, content: &str) -> NativeHandle {
        self.scene.borrow_mut().add_popup(marker, content)
    }

    fn set_popup_content(&mut self, popup: NativeHandle, content: &str) {
        self.scene.borrow_mut().set_popup_content(popup, content);
    }

    fn unbind_popup(&mut self, marker: NativeHandle) {
        self.scene
            .borrow_mut()
            .popups
            .retain(|_, popup| popup.marker != marker);
    }

    fn on_marker_click(&mut self, marker: NativeHandle, listener: NativeListener) -> NativeHandle {
        self.scene.borrow_mut().listen(marker, listener)
    }

    fn off(&mut self, listener: NativeHandle) {
        self.remove_listener(listener);
    }

    fn add_polyline(&mut self, points: &[[f64; 2]]) -> NativeHandle {
        let mut scene = self.scene.borrow_mut();
        let handle = scene.allocate();
        scene.polylines.insert(handle, points.to_vec());
        handle
    }

    fn set_polyline_points(&mut self, polyline: NativeHandle, points: &[[f64; 2]]) {
        if let Some(existing) = self.scene.borrow_mut().polylines.get_mut(&polyline) {
            *existing = points.to_vec();
        }
    }

    fn remove_layer(&mut self, layer: NativeHandle) {
        let mut scene = self.scene.borrow_mut();
        scene.markers.remove(&layer);
        scene.polylines.remove(&layer);
    }

    fn fly_to(&mut self, at: [f64; 2], zoom: f64) {
        self.set_camera(at, zoom);
    }

    fn remove(&mut self) {
        self.destroy();
    }
}

impl StyleEngine for HeadlessEngine<StyleFamily> {
    fn on_click(&mut self, listener: NativeClickListener) {
        self.set_click_listener(Some(listener));
    }

    fn off_click(&mut self) {
        self.set_click_listener(None);
    }

    fn is_style_loaded(&self) -> bool {
        self.scene.borrow().style_loaded
    }

    fn add_marker(&mut self, at: [f64; 2]) -> NativeHandle {
        self.scene.borrow_mut().add_marker(at)
    }

    fn set_marker_lng_lat(&mut self, marker: NativeHandle, at: [f64; 2]) {
        self.scene.borrow_mut().move_marker(marker, at);
    }

    fn remove_marker(&mut self, marker: NativeHandle) {
        self.scene.borrow_mut().markers.remove(&marker);
    }

    fn set_popup(&mut self, marker: NativeHandle, html: &str) -> NativeHandle {
        self.scene.borrow_mut().add_popup(marker, html)
    }

    fn set_popup_html(&mut self, popup: NativeHandle, html: &str) {
        self.scene.borrow_mut().set_popup_content(popup, html);
    }

    fn remove_popup(&mut self, popup: NativeHandle) {
        self.scene.borrow_mut().popups.remove(&popup);
    }

    fn on_marker_click(&mut self, marker: NativeHandle, listener: NativeListener) -> NativeHandle {
        self.scene.borrow_mut().listen(marker, listener)
    }

    fn off(&mut self, listener: NativeHandle) {
        self.remove_listener(listener);
    }

    fn add_line_source(&mut self, source_id: &str, coordinates: &[[f64; 2]]) {
        self.scene
            .borrow_mut()
            .sources
            .insert(source_id.to_owned(), coordinates.to_vec());
    }

    fn set_line_source_data(&mut self, source_id: &str, coordinates: &[[f64; 2]]) {
        if let Some(existing) = self.scene.borrow_mut().sources.get_mut(source_id) {
            *existing = coordinates.to_vec();
        }
    }

    fn add_line_layer(&mut self, layer_id: &str, source_id: &str) {
        self.scene
            .borrow_mut()
            .layers
            .insert(layer_id.to_owned(), source_id.to_owned());
    }

    fn remove_layer(&mut self, layer_id: &str) {
        self.scene.borrow_mut().layers.remove(layer_id);
    }

    fn remove_source(&mut self, source_id: &str) {
        let mut scene = self.scene.borrow_mut();
        if scene.layers.values().any(|source| source == source_id) {
            log::warn!("source {source_id} removed while a layer still uses it");
        }
        scene.sources.remove(source_id);
    }

    fn fly_to(&mut self, center: [f64; 2], zoom: f64) {
        self.set_camera(center, zoom);
    }

    fn remove(&mut self) {
        self.destroy();
    }
}
