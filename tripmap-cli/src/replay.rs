//! Replay command: drive an editor session from a JSON script.
//!
//! A script optionally seeds the editor with an existing [`TripDraft`] and
//! then lists events in order:
//!
//! ```json
//! {
//!   "events": [
//!     { "click": [30.0444, 31.2357] },
//!     { "set_mode": "draw-route" },
//!     { "click": [30.05, 31.24] },
//!     { "manual_entry": { "latitude": "25.7", "longitude": "32.65" } },
//!     { "update": { "id": 0, "name": "Cairo" } },
//!     "clear_route"
//!   ]
//! }
//! ```
//!
//! Clicks are injected as native clicks on a headless engine, so they pass
//! through the same axis conversion and mode dispatch as a real map.

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use tripmap_core::surface::headless::{HeadlessStyleEngine, HeadlessTileEngine};
use tripmap_core::surface::{StyleSurface, TileSurface};
use tripmap_core::{
    AxisOrder, EditorConfig, EditorSession, InteractionMode, LatLng, LocationId, LocationPatch,
    LocationStore, MapInitError, MapSurface, MediaHandle, SearchResult, StoreError, TripDraft,
};

use crate::{
    ARG_REPLAY_ACCESS_TOKEN, ARG_REPLAY_ENGINE, ARG_REPLAY_OUTPUT, ARG_REPLAY_SCRIPT, CliError,
    ENV_REPLAY_SCRIPT,
};

/// Map engine family used for a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum EngineKind {
    /// Tile-layer engine with `[lat, lng]` native pairs.
    #[default]
    Tile,
    /// Style engine with `[lng, lat]` native pairs.
    Style,
}

/// CLI arguments for the `replay` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Replay a JSON script of editor events (mode changes, map \
                 clicks, manual coordinates, search picks, edits and \
                 removals) against a headless map engine and write the \
                 resulting trip draft as JSON.",
    about = "Replay scripted editor events"
)]
#[ortho_config(prefix = "TRIPMAP")]
pub(crate) struct ReplayArgs {
    /// Path to a JSON replay script.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) script: Option<Utf8PathBuf>,
    /// Write the trip draft here instead of stdout.
    #[arg(long = ARG_REPLAY_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Engine family to replay against.
    #[arg(long = ARG_REPLAY_ENGINE, value_enum, value_name = "family")]
    #[serde(default)]
    pub(crate) engine: Option<EngineKind>,
    /// Access token for the style engine.
    #[arg(long = ARG_REPLAY_ACCESS_TOKEN, value_name = "token")]
    #[serde(default)]
    pub(crate) access_token: Option<String>,
}

impl ReplayArgs {
    pub(crate) fn into_config(self) -> Result<ReplayConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ReplayConfig::try_from(merged)
    }
}

/// Resolved `replay` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReplayConfig {
    pub(crate) script: Utf8PathBuf,
    pub(crate) output: Option<Utf8PathBuf>,
    pub(crate) engine: EngineKind,
    pub(crate) access_token: String,
}

impl ReplayConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        match tripmap_fs::file_is_file(&self.script) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::MissingSourceFile {
                field: ARG_REPLAY_SCRIPT,
                path: self.script.clone(),
            }),
            Err(source) => Err(CliError::InspectSourcePath {
                field: ARG_REPLAY_SCRIPT,
                path: self.script.clone(),
                source,
            }),
        }
    }
}

impl TryFrom<ReplayArgs> for ReplayConfig {
    type Error = CliError;

    fn try_from(args: ReplayArgs) -> Result<Self, Self::Error> {
        let script = args.script.ok_or(CliError::MissingArgument {
            field: ARG_REPLAY_SCRIPT,
            env: ENV_REPLAY_SCRIPT,
        })?;
        Ok(Self {
            script,
            output: args.output,
            engine: args.engine.unwrap_or_default(),
            access_token: args.access_token.unwrap_or_default(),
        })
    }
}

/// A replay script.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub(crate) struct ReplayScript {
    /// Trip to edit; an empty trip when absent.
    #[serde(default)]
    pub(crate) draft: Option<TripDraft>,
    /// Events applied in order.
    #[serde(default)]
    pub(crate) events: Vec<ReplayEvent>,
}

/// One scripted editor interaction.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ReplayEvent {
    SetMode(InteractionMode),
    /// Background click at a canonical `[lat, lng]` position.
    Click(LatLng),
    ManualEntry {
        latitude: String,
        longitude: String,
    },
    /// A search result picked by the user.
    AddResult {
        label: String,
        coordinates: LatLng,
    },
    Update {
        id: LocationId,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        media: Option<Vec<MediaHandle>>,
    },
    Remove {
        id: LocationId,
    },
    Focus {
        id: LocationId,
    },
    ClearRoute,
}

/// A headless engine kept alongside the session so clicks can be injected.
enum ReplayEngine {
    Tile(HeadlessTileEngine),
    Style(HeadlessStyleEngine),
}

impl ReplayEngine {
    fn connect(
        config: &ReplayConfig,
    ) -> Result<(Self, Box<dyn MapSurface>), MapInitError> {
        match config.engine {
            EngineKind::Tile => {
                let engine = HeadlessTileEngine::new();
                let surface = TileSurface::new(engine.clone());
                Ok((Self::Tile(engine), Box::new(surface)))
            }
            EngineKind::Style => {
                let engine = HeadlessStyleEngine::connect(&config.access_token)?;
                let surface = StyleSurface::new(engine.clone());
                Ok((Self::Style(engine), Box::new(surface)))
            }
        }
    }

    fn click(&self, at: LatLng) -> bool {
        match self {
            Self::Tile(engine) => engine.click(AxisOrder::LatLng.to_native(at)),
            Self::Style(engine) => engine.click(AxisOrder::LngLat.to_native(at)),
        }
    }
}

struct Replay {
    engine: Option<ReplayEngine>,
    session: EditorSession<Box<dyn MapSurface>>,
}

impl Replay {
    fn open(config: &ReplayConfig, draft: TripDraft) -> Self {
        let store = LocationStore::from_draft(draft);
        let (engine, surface) = match ReplayEngine::connect(config) {
            Ok((engine, surface)) => (Some(engine), Ok(surface)),
            Err(reason) => (None, Err(reason)),
        };
        Self {
            engine,
            session: EditorSession::open(surface, store, EditorConfig::default()),
        }
    }

    fn apply(&mut self, step: usize, event: ReplayEvent) -> Result<(), CliError> {
        match event {
            ReplayEvent::SetMode(mode) => self.session.set_mode(mode),
            ReplayEvent::Click(at) => self.click(step, at),
            ReplayEvent::ManualEntry {
                latitude,
                longitude,
            } => {
                self.session.set_manual_latitude(latitude);
                self.session.set_manual_longitude(longitude);
                if self.session.submit_manual_entry().is_none() {
                    log::warn!("step {step}: manual coordinates rejected");
                }
            }
            ReplayEvent::AddResult { label, coordinates } => {
                self.session
                    .add_search_result(SearchResult { label, coordinates });
            }
            ReplayEvent::Update {
                id,
                name,
                description,
                media,
            } => {
                let patch = LocationPatch {
                    name,
                    description,
                    media,
                };
                self.session
                    .update_location(id, patch)
                    .map_err(|source| CliError::ReplayStep { step, source })?;
            }
            ReplayEvent::Remove { id } => {
                if self.session.remove_location(id).is_none() {
                    return Err(unknown(step, id));
                }
            }
            ReplayEvent::Focus { id } => {
                if !self.session.focus_location(id) {
                    return Err(unknown(step, id));
                }
            }
            ReplayEvent::ClearRoute => self.session.clear_route(),
        }
        Ok(())
    }

    fn click(&mut self, step: usize, at: LatLng) {
        let Some(engine) = &self.engine else {
            log::warn!("step {step}: map unavailable, click at {at} ignored");
            return;
        };
        if engine.click(at) {
            self.session.settle();
        } else {
            log::warn!("step {step}: no click listener, click at {at} ignored");
        }
    }

    fn finish(self) -> TripDraft {
        let draft = self.session.to_draft();
        self.session.close();
        draft
    }
}

const fn unknown(step: usize, id: LocationId) -> CliError {
    CliError::ReplayStep {
        step,
        source: StoreError::UnknownLocation { id },
    }
}

pub(super) fn run_replay(args: ReplayArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_replay_with(args, &mut stdout)
}

pub(super) fn run_replay_with(args: ReplayArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let script = load_replay_script(&config.script)?;
    let draft = replay(&config, script)?;
    write_draft(writer, config.output.as_deref(), &draft)
}

/// Apply every event in `script` and return the resulting draft.
pub(super) fn replay(config: &ReplayConfig, script: ReplayScript) -> Result<TripDraft, CliError> {
    let draft = script.draft.unwrap_or_default();
    check_unique_ids(&draft)?;
    let mut replay = Replay::open(config, draft);
    for (step, event) in script.events.into_iter().enumerate() {
        replay.apply(step, event)?;
    }
    Ok(replay.finish())
}

fn check_unique_ids(draft: &TripDraft) -> Result<(), CliError> {
    let mut seen = HashSet::with_capacity(draft.locations.len());
    match draft.locations.iter().find(|location| !seen.insert(location.id)) {
        Some(duplicate) => Err(CliError::DuplicateDraftLocation { id: duplicate.id }),
        None => Ok(()),
    }
}

/// Loads a JSON-encoded [`ReplayScript`] from disk.
pub(super) fn load_replay_script(path: &Utf8Path) -> Result<ReplayScript, CliError> {
    let text = tripmap_fs::read_utf8_file(path).map_err(|source| CliError::ReadReplayScript {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::ParseReplayScript {
        path: path.to_path_buf(),
        source,
    })
}

fn write_draft(
    writer: &mut dyn Write,
    output: Option<&Utf8Path>,
    draft: &TripDraft,
) -> Result<(), CliError> {
    let mut payload = serde_json::to_string_pretty(draft).map_err(CliError::SerializeDraft)?;
    payload.push('\n');
    match output {
        Some(path) => {
            tripmap_fs::write_utf8_file(path, &payload).map_err(|source| CliError::WriteDraft {
                path: path.to_path_buf(),
                source,
            })?;
            log::info!("wrote trip draft to {path}");
            Ok(())
        }
        None => writer
            .write_all(payload.as_bytes())
            .map_err(CliError::WriteOutput),
    }
}
