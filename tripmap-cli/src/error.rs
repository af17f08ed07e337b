//! Error types emitted by the trip map CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use tripmap_core::{LocationId, StoreError};
use tripmap_data::geocoding::ProviderBuildError;

/// Errors emitted by the trip map CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Constructing the geocoding provider failed.
    #[error("failed to build geocoder for {base_url:?}: {source}")]
    BuildGeocoder {
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// The async runtime for the search request could not start.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Serializing search results failed.
    #[error("failed to serialize search results: {0}")]
    SerializeSearchResults(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
    /// Reading the replay script failed.
    #[error("failed to read replay script at {path:?}: {source}")]
    ReadReplayScript {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The replay script JSON could not be decoded.
    #[error("failed to parse replay script JSON at {path:?}: {source}")]
    ParseReplayScript {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The seed draft lists the same location id more than once.
    #[error("replay script draft repeats location id {id}")]
    DuplicateDraftLocation { id: LocationId },
    /// A replay step referenced a location the editor does not hold.
    #[error("replay step {step} failed: {source}")]
    ReplayStep {
        step: usize,
        #[source]
        source: StoreError,
    },
    /// Serializing the trip draft failed.
    #[error("failed to serialize trip draft: {0}")]
    SerializeDraft(#[source] serde_json::Error),
    /// Writing the trip draft to disk failed.
    #[error("failed to write trip draft to {path:?}: {source}")]
    WriteDraft {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}
