//! One editing session: store, modes, manual entry, map view and search.
//!
//! The session registers a single event handler on its map surface when it
//! opens. The handler reaches the editor state through a [`Weak`] reference
//! and so always sees the current mode and store, never a copy captured at
//! registration time.
//!
//! Engine events mutate the store directly. Hosts pump their engine and then
//! call [`EditorSession::settle`] to push the change to the map; the
//! session's own mutating methods settle immediately.

use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

use crate::search::{PlaceSearch, SearchResult};
use crate::surface::{MapInitError, MapSurface, SurfaceEvent};
use crate::{
    EditorConfig, InteractionMode, LatLng, Location, LocationId, LocationPatch, LocationStore,
    ManualEntry, MarkerReconciler, ModeController, StoreError, TripDraft,
};

/// State shared between the session and its surface event handler.
#[derive(Debug, Default)]
pub struct EditorState {
    store: LocationStore,
    modes: ModeController,
    selected: Option<LocationId>,
}

impl EditorState {
    /// Create state over `store` in `mode`.
    #[must_use]
    pub const fn new(store: LocationStore, mode: InteractionMode) -> Self {
        Self {
            store,
            modes: ModeController::new(mode),
            selected: None,
        }
    }

    /// Apply a surface event according to the active mode.
    pub fn handle_surface_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Click(at) => match self.modes.active_mode() {
                InteractionMode::PlaceLocation => {
                    let id = self.store.add_location(at, "");
                    log::debug!("placed location {id} at {at}");
                    self.selected = Some(id);
                }
                InteractionMode::DrawRoute => self.store.append_route_vertex(at),
                InteractionMode::Idle => {}
            },
            SurfaceEvent::MarkerActivated(id) => {
                if self.store.contains(id) {
                    self.selected = Some(id);
                }
            }
        }
    }

    /// The store.
    #[must_use]
    pub const fn store(&self) -> &LocationStore {
        &self.store
    }

    /// The active interaction mode.
    #[must_use]
    pub const fn active_mode(&self) -> InteractionMode {
        self.modes.active_mode()
    }

    /// The location whose popup was last opened or that was last created.
    #[must_use]
    pub const fn selected(&self) -> Option<LocationId> {
        self.selected
    }
}

/// What the session renders into.
pub enum MapView<S> {
    /// A working map surface.
    Live {
        /// The adapter.
        surface: S,
        /// Tracks what has been rendered on `surface`.
        reconciler: MarkerReconciler,
    },
    /// The map failed to start; data operations keep working.
    Placeholder {
        /// Why the map is unavailable.
        reason: MapInitError,
    },
}

/// An open editor.
///
/// # Examples
/// ```
/// use tripmap_core::surface::{TileSurface, headless::HeadlessTileEngine};
/// use tripmap_core::{EditorConfig, EditorSession, LatLng, LocationStore};
///
/// let engine = HeadlessTileEngine::new();
/// let mut session = EditorSession::open(
///     Ok(TileSurface::new(engine.clone())),
///     LocationStore::new(),
///     EditorConfig::default(),
/// );
///
/// engine.click([30.0444, 31.2357]);
/// session.settle();
///
/// assert_eq!(session.store().locations()[0].coordinates, LatLng::new(30.0444, 31.2357));
/// assert_eq!(engine.marker_count(), 1);
/// ```
pub struct EditorSession<S: MapSurface> {
    state: Rc<RefCell<EditorState>>,
    view: MapView<S>,
    manual: ManualEntry,
    search: Option<PlaceSearch>,
    config: EditorConfig,
}

impl<S: MapSurface> EditorSession<S> {
    /// Open a session over `store`.
    ///
    /// When `surface` is an error the session falls back to a placeholder
    /// view.
    pub fn open(surface: Result<S, MapInitError>, store: LocationStore, config: EditorConfig) -> Self {
        let state = Rc::new(RefCell::new(EditorState::new(store, config.initial_mode)));
        let view = match surface {
            Ok(mut surface) => {
                surface.set_event_handler(dispatch_to(Rc::downgrade(&state)));
                let mut reconciler = MarkerReconciler::new();
                reconciler.settle(state.borrow().store(), &mut surface);
                MapView::Live {
                    surface,
                    reconciler,
                }
            }
            Err(reason) => {
                log::warn!("map unavailable, editing without it: {reason}");
                MapView::Placeholder { reason }
            }
        };
        Self {
            state,
            view,
            manual: ManualEntry::default(),
            search: None,
            config,
        }
    }

    /// Attach a place search.
    #[must_use]
    pub fn with_search(mut self, search: PlaceSearch) -> Self {
        self.search = Some(search);
        self
    }

    /// The attached place search, if any.
    #[must_use]
    pub const fn search(&self) -> Option<&PlaceSearch> {
        self.search.as_ref()
    }

    /// The map view.
    #[must_use]
    pub const fn view(&self) -> &MapView<S> {
        &self.view
    }

    /// Why the map is unavailable, when running in placeholder mode.
    #[must_use]
    pub const fn placeholder_reason(&self) -> Option<&MapInitError> {
        match &self.view {
            MapView::Placeholder { reason } => Some(reason),
            MapView::Live { .. } => None,
        }
    }

    /// Switch the interaction mode. Data is never touched.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.state.borrow_mut().modes.set_mode(mode);
    }

    /// The active interaction mode.
    #[must_use]
    pub fn active_mode(&self) -> InteractionMode {
        self.state.borrow().active_mode()
    }

    /// Borrow the store.
    ///
    /// # Panics
    ///
    /// Panics if called from inside the surface event handler.
    #[must_use]
    pub fn store(&self) -> Ref<'_, LocationStore> {
        Ref::map(self.state.borrow(), EditorState::store)
    }

    /// The selected location.
    #[must_use]
    pub fn selected(&self) -> Option<LocationId> {
        self.state.borrow().selected()
    }

    /// Render pending store changes. Returns whether the map was touched.
    pub fn settle(&mut self) -> bool {
        let MapView::Live {
            surface,
            reconciler,
        } = &mut self.view
        else {
            return false;
        };
        let state = self.state.borrow();
        reconciler.settle(state.store(), surface)
    }

    /// Apply a partial update to a location.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownLocation`] when `id` does not exist.
    pub fn update_location(&mut self, id: LocationId, patch: LocationPatch) -> Result<(), StoreError> {
        self.state.borrow_mut().store.update_location(id, patch)?;
        self.settle();
        Ok(())
    }

    /// Delete a location and its marker.
    pub fn remove_location(&mut self, id: LocationId) -> Option<Location> {
        let removed = {
            let mut state = self.state.borrow_mut();
            if state.selected == Some(id) {
                state.selected = None;
            }
            state.store.remove_location(id)
        };
        self.settle();
        removed
    }

    /// Remove every route vertex.
    pub fn clear_route(&mut self) {
        self.state.borrow_mut().store.clear_route();
        self.settle();
    }

    /// Replace the raw latitude text.
    pub fn set_manual_latitude(&mut self, text: impl Into<String>) {
        self.manual.set_latitude(text);
    }

    /// Replace the raw longitude text.
    pub fn set_manual_longitude(&mut self, text: impl Into<String>) {
        self.manual.set_longitude(text);
    }

    /// The manual entry fields.
    #[must_use]
    pub const fn manual_entry(&self) -> &ManualEntry {
        &self.manual
    }

    /// Create a location from the manual entry fields.
    ///
    /// Invalid input leaves everything unchanged and returns `None`.
    pub fn submit_manual_entry(&mut self) -> Option<LocationId> {
        let at = self.manual.submit()?;
        Some(self.place(at, String::new()))
    }

    /// Turn the search result at `index` into a location.
    ///
    /// Returns `None` without a search attached or for an unknown index.
    pub fn choose_search_result(&mut self, index: usize) -> Option<LocationId> {
        let result = self.search.as_ref()?.select(index)?;
        Some(self.add_search_result(result))
    }

    /// Turn a search result into a location and focus it.
    pub fn add_search_result(&mut self, result: SearchResult) -> LocationId {
        self.place(result.coordinates, result.label)
    }

    /// Fly to a location and select it. Returns `false` for an unknown id.
    pub fn focus_location(&mut self, id: LocationId) -> bool {
        let at = {
            let mut state = self.state.borrow_mut();
            let Some(at) = state.store.location(id).map(|location| location.coordinates) else {
                return false;
            };
            state.selected = Some(id);
            at
        };
        self.fly_to(at);
        true
    }

    /// Serializable trip state.
    #[must_use]
    pub fn to_draft(&self) -> TripDraft {
        self.state.borrow().store.to_draft()
    }

    /// Stop the search and release every map resource.
    pub fn close(mut self) {
        self.teardown();
    }

    fn place(&mut self, at: LatLng, name: String) -> LocationId {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.store.add_location(at, name);
            state.selected = Some(id);
            id
        };
        self.settle();
        self.fly_to(at);
        id
    }

    fn fly_to(&mut self, at: LatLng) {
        if let MapView::Live { surface, .. } = &mut self.view {
            surface.fly_to(at, self.config.focus_zoom);
        }
    }

    fn teardown(&mut self) {
        if let Some(search) = self.search.take() {
            search.shutdown();
        }
        if let MapView::Live { surface, .. } = &mut self.view {
            surface.clear_event_handler();
            surface.dispose();
        }
    }
}

impl<S: MapSurface> Drop for EditorSession<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn dispatch_to(state: Weak<RefCell<EditorState>>) -> crate::surface::SurfaceEventHandler {
    Box::new(move |event| {
        let Some(state) = state.upgrade() else {
            return;
        };
        match state.try_borrow_mut() {
            Ok(mut state) => state.handle_surface_event(event),
            Err(_) => log::warn!("dropping surface event {event:?} raised while editor state is busy"),
        }
    })
}
