//! Test helpers for scratch workspaces and canned geocoders.

use super::*;
use crate::search::{GeocoderBuilder, SearchCommandConfig};
use camino::Utf8PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tripmap_core::LatLng;
use tripmap_core::search::{GeocodeHit, Geocoder};
use tripmap_core::test_support::StubGeocoder;

/// A temporary directory addressed through UTF-8 paths.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        tripmap_fs::write_utf8_file(&path, contents).expect("write workspace file");
        path
    }
}

/// Hands out a shared [`StubGeocoder`] so tests can inspect its requests.
#[derive(Debug)]
pub(super) struct StubGeocoderBuilder {
    pub(super) geocoder: Arc<StubGeocoder>,
}

impl StubGeocoderBuilder {
    pub(super) fn new(geocoder: StubGeocoder) -> Self {
        Self {
            geocoder: Arc::new(geocoder),
        }
    }
}

impl GeocoderBuilder for StubGeocoderBuilder {
    fn build(&self, _config: &SearchCommandConfig) -> Result<Box<dyn Geocoder>, CliError> {
        Ok(Box::new(Arc::clone(&self.geocoder)))
    }
}

pub(super) fn karnak_hits() -> Vec<GeocodeHit> {
    vec![
        GeocodeHit::new(
            "Karnak Temple Complex, Luxor, Egypt",
            LatLng::new(25.7188, 32.6573),
        ),
        GeocodeHit::new("Karnak, Kerala, India", LatLng::new(10.2, 76.3)),
        GeocodeHit::new("معبد الكرنك، الأقصر", LatLng::new(25.719, 32.657))
            .with_address("city", "الأقصر"),
        GeocodeHit::new("Karnak, Illinois, United States", LatLng::new(37.29, -88.97)),
    ]
}
