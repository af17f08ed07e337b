//! Search command implementation for the trip map CLI.

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tripmap_core::search::{Geocoder, search_once};
use tripmap_core::{
    CityScope, DEFAULT_MAX_RESULTS, DEFAULT_PROVIDER_LIMIT, SearchConfig, SearchResult,
};
use tripmap_data::geocoding::{DEFAULT_BASE_URL, NominatimGeocoder, NominatimGeocoderConfig};

use crate::{
    ARG_SEARCH_CITY, ARG_SEARCH_CITY_LOCAL, ARG_SEARCH_COUNTRY, ARG_SEARCH_GEOCODER_URL,
    ARG_SEARCH_MAX_RESULTS, ARG_SEARCH_QUERY, CliError, ENV_SEARCH_QUERY,
};

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Send one query to a Nominatim-compatible geocoder and print \
                 the results as JSON. When a city is given, results outside \
                 it are dropped; both the local and the transliterated city \
                 name are matched against labels and address components.",
    about = "Look up places by name"
)]
#[ortho_config(prefix = "TRIPMAP")]
pub(crate) struct SearchArgs {
    /// Free-text place query.
    #[arg(value_name = "query")]
    #[serde(default)]
    pub(crate) query: Option<String>,
    /// Transliterated destination city name, e.g. "Luxor".
    #[arg(long = ARG_SEARCH_CITY, value_name = "name")]
    #[serde(default)]
    pub(crate) city: Option<String>,
    /// Destination city name in the local script, e.g. "الأقصر".
    #[arg(long = ARG_SEARCH_CITY_LOCAL, value_name = "name")]
    #[serde(default)]
    pub(crate) city_local: Option<String>,
    /// ISO 3166-1 country code hint sent to the geocoder.
    #[arg(long = ARG_SEARCH_COUNTRY, value_name = "code")]
    #[serde(default)]
    pub(crate) country: Option<String>,
    /// Base URL of the geocoder (e.g. "https://nominatim.openstreetmap.org").
    #[arg(long = ARG_SEARCH_GEOCODER_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) geocoder_url: Option<String>,
    /// Preferred result language, e.g. "ar,en".
    #[arg(long, value_name = "tags")]
    #[serde(default)]
    pub(crate) language: Option<String>,
    /// Maximum number of results to print.
    #[arg(long = ARG_SEARCH_MAX_RESULTS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_results: Option<usize>,
}

impl SearchArgs {
    pub(crate) fn into_config(self) -> Result<SearchCommandConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SearchCommandConfig::try_from(merged)
    }
}

/// Resolved `search` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchCommandConfig {
    /// Trimmed query text.
    pub(crate) query: String,
    /// City filter applied after the provider call.
    pub(crate) scope: Option<CityScope>,
    /// Geocoder base URL.
    pub(crate) geocoder_url: String,
    /// Preferred result language.
    pub(crate) language: Option<String>,
    /// Search tuning shared with the editor.
    pub(crate) search: SearchConfig,
}

impl TryFrom<SearchArgs> for SearchCommandConfig {
    type Error = CliError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        let query = args
            .query
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_SEARCH_QUERY,
                env: ENV_SEARCH_QUERY,
            })?;

        let scope = match (args.city_local, args.city) {
            (None, None) => None,
            (localized, transliterated) => Some(CityScope::new(
                localized.unwrap_or_default(),
                transliterated.unwrap_or_default(),
            )),
        };

        let max_results = args.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
        let mut search = SearchConfig::default()
            .with_max_results(max_results)
            .with_provider_limit(max_results.max(DEFAULT_PROVIDER_LIMIT));
        if let Some(country) = args.country {
            search = search.with_country(country);
        }

        Ok(Self {
            query,
            scope,
            geocoder_url: args
                .geocoder_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            language: args.language,
            search,
        })
    }
}

/// Builds a geocoder for the current search invocation.
pub(super) trait GeocoderBuilder {
    fn build(&self, config: &SearchCommandConfig) -> Result<Box<dyn Geocoder>, CliError>;
}

pub(super) struct NominatimGeocoderBuilder;

impl GeocoderBuilder for NominatimGeocoderBuilder {
    fn build(&self, config: &SearchCommandConfig) -> Result<Box<dyn Geocoder>, CliError> {
        let mut provider_config = NominatimGeocoderConfig::new(config.geocoder_url.clone());
        if let Some(language) = &config.language {
            provider_config = provider_config.with_language(language.clone());
        }
        let geocoder = NominatimGeocoder::with_config(provider_config).map_err(|source| {
            CliError::BuildGeocoder {
                base_url: config.geocoder_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(geocoder))
    }
}

pub(super) fn run_search(args: SearchArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_search_with(args, &NominatimGeocoderBuilder, &mut stdout)
}

pub(super) fn run_search_with(
    args: SearchArgs,
    builder: &dyn GeocoderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let results = execute_search(&config, builder)?;
    write_search_results(writer, &results)
}

fn execute_search(
    config: &SearchCommandConfig,
    builder: &dyn GeocoderBuilder,
) -> Result<Vec<SearchResult>, CliError> {
    let geocoder = builder.build(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let results = runtime.block_on(search_once(
        geocoder.as_ref(),
        &config.query,
        config.scope.as_ref(),
        &config.search,
    ));
    log::debug!("search for {:?} returned {} results", config.query, results.len());
    Ok(results)
}

fn write_search_results(writer: &mut dyn Write, results: &[SearchResult]) -> Result<(), CliError> {
    let payload =
        serde_json::to_string_pretty(results).map_err(CliError::SerializeSearchResults)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SearchCommandConfig, CliError> {
    let merged = SearchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SearchCommandConfig::try_from(merged)
}
