//! Behavioural tests for the editor session over both headless engine
//! families.

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tripmap_core::surface::headless::{HeadlessStyleEngine, HeadlessTileEngine};
use tripmap_core::surface::{StyleSurface, TileSurface};
use tripmap_core::{
    AxisOrder, EditorConfig, EditorSession, InteractionMode, LatLng, LocationPatch, LocationStore,
    MapSurface, TripDraft,
};

const CAIRO: LatLng = LatLng::new(30.0444, 31.2357);
const ROUTE: [LatLng; 3] = [
    LatLng::new(30.05, 31.24),
    LatLng::new(30.06, 31.25),
    LatLng::new(30.07, 31.26),
];

enum Engine {
    Tile(HeadlessTileEngine),
    Style(HeadlessStyleEngine),
    Absent,
}

impl Engine {
    fn click(&self, at: LatLng) {
        let delivered = match self {
            Self::Tile(engine) => engine.click(AxisOrder::LatLng.to_native(at)),
            Self::Style(engine) => engine.click(AxisOrder::LngLat.to_native(at)),
            Self::Absent => false,
        };
        assert!(delivered, "expected a registered click listener");
    }

    fn marker_positions(&self) -> Vec<[f64; 2]> {
        match self {
            Self::Tile(engine) => engine.marker_positions(),
            Self::Style(engine) => engine.marker_positions(),
            Self::Absent => Vec::new(),
        }
    }
}

struct Editor {
    engine: Engine,
    session: Option<EditorSession<Box<dyn MapSurface>>>,
    before: Option<TripDraft>,
}

impl Editor {
    fn session(&mut self) -> &mut EditorSession<Box<dyn MapSurface>> {
        self.session.as_mut().expect("editor open")
    }

    fn click(&mut self, at: LatLng) {
        self.engine.click(at);
        self.session().settle();
    }
}

fn open(engine: Engine, surface: Result<Box<dyn MapSurface>, tripmap_core::MapInitError>) -> Editor {
    Editor {
        engine,
        session: Some(EditorSession::open(
            surface,
            LocationStore::new(),
            EditorConfig::default(),
        )),
        before: None,
    }
}

fn tile_editor() -> Editor {
    let engine = HeadlessTileEngine::new();
    let surface: Box<dyn MapSurface> = Box::new(TileSurface::new(engine.clone()));
    open(Engine::Tile(engine), Ok(surface))
}

#[fixture]
fn editor() -> RefCell<Option<Editor>> {
    RefCell::new(None)
}

fn with_editor<R>(editor: &RefCell<Option<Editor>>, f: impl FnOnce(&mut Editor) -> R) -> R {
    let mut guard = editor.borrow_mut();
    f(guard.as_mut().expect("editor must be initialised"))
}

// --- Given steps ---

#[given("an empty editor on a tile map")]
fn given_tile_editor(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    *editor.borrow_mut() = Some(tile_editor());
}

#[given("an empty editor on a style map")]
fn given_style_editor(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    let engine = HeadlessStyleEngine::connect("pk.test").expect("valid token");
    let surface: Box<dyn MapSurface> = Box::new(StyleSurface::new(engine.clone()));
    *editor.borrow_mut() = Some(open(Engine::Style(engine), Ok(surface)));
}

#[given("an editor with one placed location")]
fn given_one_location(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    let mut built = tile_editor();
    built.click(CAIRO);
    built.before = Some(built.session().to_draft());
    *editor.borrow_mut() = Some(built);
}

#[given("an editor whose map rejected its access token")]
fn given_placeholder(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    let surface = HeadlessStyleEngine::connect("  ")
        .map(|engine| Box::new(StyleSurface::new(engine)) as Box<dyn MapSurface>);
    *editor.borrow_mut() = Some(open(Engine::Absent, surface));
}

// --- When steps ---

#[when("I click the map in central Cairo")]
fn when_click_cairo(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    with_editor(editor, |editor| editor.click(CAIRO));
}

#[when("I switch to route drawing")]
fn when_route_mode(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    with_editor(editor, |editor| {
        editor.session().set_mode(InteractionMode::DrawRoute);
    });
}

#[when("I click the three route points")]
fn when_click_route(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    with_editor(editor, |editor| {
        for point in ROUTE {
            editor.click(point);
        }
    });
}

#[when("I switch to route drawing and back without clicking")]
fn when_toggle_modes(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    with_editor(editor, |editor| {
        let session = editor.session();
        session.set_mode(InteractionMode::DrawRoute);
        session.set_mode(InteractionMode::PlaceLocation);
        session.settle();
    });
}

#[when("I rename the location to Karnak")]
fn when_rename(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    with_editor(editor, |editor| {
        let session = editor.session();
        let id = session.store().locations()[0].id;
        session
            .update_location(id, LocationPatch::default().with_name("Karnak"))
            .expect("known id");
    });
}

#[when("I close the editor")]
fn when_close(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    with_editor(editor, |editor| {
        if let Some(session) = editor.session.take() {
            session.close();
        }
    });
}

#[when("I submit valid manual coordinates")]
fn when_manual(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    with_editor(editor, |editor| {
        let session = editor.session();
        session.set_manual_latitude("25.6872");
        session.set_manual_longitude(" 32.6396 ");
        assert!(session.submit_manual_entry().is_some());
    });
}

// --- Then steps ---

#[then("the store holds one unnamed location in central Cairo")]
fn then_cairo_location(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    with_editor(editor, |editor| {
        let session = editor.session();
        let store = session.store();
        assert_eq!(store.locations().len(), 1);
        let location = &store.locations()[0];
        assert_eq!(location.coordinates, CAIRO);
        assert!(location.name.is_empty());
        assert!(location.description.is_empty());
    });
}

#[then("exactly one marker is rendered")]
fn then_one_marker(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    with_editor(editor, |editor| {
        assert_eq!(editor.engine.marker_positions(), vec![[30.0444, 31.2357]]);
    });
}

#[then("the route lists the three points in click order")]
fn then_route_order(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    with_editor(editor, |editor| {
        let session = editor.session();
        assert_eq!(session.store().route().vertices(), &ROUTE);
        assert!(session.store().locations().is_empty());
    });
}

#[then("the store is unchanged")]
fn then_unchanged(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    with_editor(editor, |editor| {
        let before = editor.before.clone().expect("snapshot taken");
        assert_eq!(editor.session().to_draft(), before);
    });
}

#[then("the marker popup reads Karnak without the marker being recreated")]
fn then_relabelled(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    with_editor(editor, |editor| {
        let Engine::Tile(engine) = &editor.engine else {
            panic!("expected a tile engine");
        };
        assert_eq!(engine.markers_created(), 1);
        assert_eq!(engine.popup_contents(), vec!["Karnak".to_owned()]);
    });
}

#[then("the marker sits at the native longitude-latitude pair")]
fn then_native_pair(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    with_editor(editor, |editor| {
        assert_eq!(editor.engine.marker_positions(), vec![[31.2357, 30.0444]]);
    });
}

#[then("no engine resources remain")]
fn then_released(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    with_editor(editor, |editor| {
        let Engine::Tile(engine) = &editor.engine else {
            panic!("expected a tile engine");
        };
        assert!(engine.is_destroyed());
        assert!(!engine.has_click_listener());
        assert_eq!(engine.marker_count(), 0);
        assert_eq!(engine.popup_count(), 0);
        assert_eq!(engine.marker_listener_count(), 0);
    });
}

#[then("the store holds the manually entered location")]
fn then_manual_location(#[from(editor)] editor: &RefCell<Option<Editor>>) {
    with_editor(editor, |editor| {
        let session = editor.session();
        assert!(session.placeholder_reason().is_some());
        assert_eq!(
            session.store().locations()[0].coordinates,
            LatLng::new(25.6872, 32.6396)
        );
    });
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $index:literal) => {
        #[scenario(path = "tests/features/editor.feature", index = $index)]
        fn $fn_name(editor: RefCell<Option<Editor>>) {
            let _ = editor;
        }
    };
}

register_scenario!(placing_a_location, 0);
register_scenario!(drawing_a_route, 1);
register_scenario!(switching_modes, 2);
register_scenario!(renaming_a_location, 3);
register_scenario!(style_map_canonical_order, 4);
register_scenario!(closing_the_editor, 5);
register_scenario!(editing_without_a_map, 6);
