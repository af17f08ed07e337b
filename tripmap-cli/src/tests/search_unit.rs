//! Focused unit tests covering search CLI configuration and output.

use super::helpers::{StubGeocoderBuilder, karnak_hits};
use super::*;
use crate::search::{SearchCommandConfig, config_from_layers_for_test, run_search_with};
use rstest::rstest;
use tripmap_core::search::GeocodeError;
use tripmap_core::test_support::StubGeocoder;
use tripmap_core::{CityScope, DEFAULT_MAX_RESULTS};
use tripmap_data::geocoding::DEFAULT_BASE_URL;

#[rstest]
#[case::absent(None)]
#[case::blank(Some("   ".to_owned()))]
fn converting_search_without_query_errors(#[case] query: Option<String>) {
    let args = SearchArgs {
        query,
        ..SearchArgs::default()
    };

    let err = SearchCommandConfig::try_from(args).expect_err("missing query should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_SEARCH_QUERY);
            assert_eq!(env, ENV_SEARCH_QUERY);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn search_config_applies_defaults() {
    let args = SearchArgs {
        query: Some("  Karnak ".to_owned()),
        ..SearchArgs::default()
    };

    let config = SearchCommandConfig::try_from(args).expect("config should build");
    assert_eq!(config.query, "Karnak");
    assert_eq!(config.scope, None);
    assert_eq!(config.geocoder_url, DEFAULT_BASE_URL);
    assert_eq!(config.search.max_results, DEFAULT_MAX_RESULTS);
    assert_eq!(config.search.country, None);
}

#[rstest]
#[case::both(Some("الأقصر"), Some("Luxor"), CityScope::new("الأقصر", "Luxor"))]
#[case::transliterated_only(None, Some("Luxor"), CityScope::new("", "Luxor"))]
#[case::local_only(Some("الأقصر"), None, CityScope::new("الأقصر", ""))]
fn city_flags_build_a_scope(
    #[case] local: Option<&str>,
    #[case] city: Option<&str>,
    #[case] expected: CityScope,
) {
    let args = SearchArgs {
        query: Some("Karnak".to_owned()),
        city: city.map(str::to_owned),
        city_local: local.map(str::to_owned),
        ..SearchArgs::default()
    };

    let config = SearchCommandConfig::try_from(args).expect("config should build");
    assert_eq!(config.scope, Some(expected));
}

#[rstest]
fn large_result_caps_raise_the_provider_limit() {
    let args = SearchArgs {
        query: Some("Karnak".to_owned()),
        max_results: Some(25),
        ..SearchArgs::default()
    };

    let config = SearchCommandConfig::try_from(args).expect("config should build");
    assert_eq!(config.search.max_results, 25);
    assert_eq!(config.search.provider_limit, 25);
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "geocoder_url": "http://from-file:8080",
            "country": "gb",
            "city": "London",
        }),
        None,
    );
    composer.push_environment(json!({
        "query": "Karnak",
        "country": "eg",
    }));
    composer.push_cli(json!({
        "city": "Luxor",
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.query, "Karnak");
    assert_eq!(config.geocoder_url, "http://from-file:8080");
    assert_eq!(config.search.country.as_deref(), Some("eg"));
    assert_eq!(config.scope, Some(CityScope::new("", "Luxor")));
}

#[rstest]
fn invalid_layer_maps_to_configuration_error() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "max_results": "many" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn search_prints_scoped_results_as_json() {
    let builder = StubGeocoderBuilder::new(StubGeocoder::new().respond("Karnak", karnak_hits()));
    let args = SearchArgs {
        query: Some("Karnak".to_owned()),
        city: Some("Luxor".to_owned()),
        city_local: Some("الأقصر".to_owned()),
        country: Some("EG".to_owned()),
        ..SearchArgs::default()
    };
    let mut stdout = Vec::new();

    run_search_with(args, &builder, &mut stdout).expect("search should succeed");

    let printed: serde_json::Value =
        serde_json::from_slice(&stdout).expect("output should be JSON");
    let labels: Vec<&str> = printed
        .as_array()
        .expect("results array")
        .iter()
        .filter_map(|result| result["label"].as_str())
        .collect();
    assert_eq!(
        labels,
        vec!["Karnak Temple Complex, Luxor, Egypt", "معبد الكرنك، الأقصر"]
    );
    assert_eq!(printed[0]["coordinates"], serde_json::json!([25.7188, 32.6573]));

    let requests = builder.geocoder.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].country.as_deref(), Some("EG"));
}

#[rstest]
fn provider_failures_print_an_empty_list() {
    let builder = StubGeocoderBuilder::new(StubGeocoder::new().fail_with(GeocodeError::Http {
        url: "http://localhost/search".to_owned(),
        status: 503,
        message: "unavailable".to_owned(),
    }));
    let args = SearchArgs {
        query: Some("Karnak".to_owned()),
        ..SearchArgs::default()
    };
    let mut stdout = Vec::new();

    run_search_with(args, &builder, &mut stdout).expect("search should still succeed");

    assert_eq!(String::from_utf8(stdout).expect("utf-8"), "[]\n");
}
