//! Behaviour-driven step definitions driving the search CLI scenarios.

use super::helpers::{StubGeocoderBuilder, karnak_hits};
use super::*;
use crate::search::run_search_with;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tripmap_core::test_support::StubGeocoder;

#[derive(Debug)]
struct SearchWorld {
    builder: RefCell<Option<StubGeocoderBuilder>>,
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl SearchWorld {
    fn new() -> Self {
        Self {
            builder: RefCell::new(None),
            cli_args: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn run(&self, query: Option<&str>) {
        let mut argv = vec!["tripmap".to_owned(), "search".to_owned()];
        argv.extend(query.map(str::to_owned));
        argv.extend(self.cli_args.borrow().iter().cloned());

        let parsed = Cli::try_parse_from(argv).map_err(CliError::from);
        let builder = self.builder.borrow();
        let builder = builder.as_ref().expect("geocoder configured");
        let outcome = parsed.and_then(|cli| match cli.command {
            Command::Search(args) => {
                let mut buffer = self.stdout.borrow_mut();
                run_search_with(args, builder, &mut *buffer)
            }
            Command::Replay(_) => panic!("expected search command"),
        });
        self.result.replace(Some(outcome));
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected error")
        })
    }
}

#[fixture]
fn world() -> SearchWorld {
    SearchWorld::new()
}

#[given("a geocoder that knows several places called Karnak")]
fn geocoder_knows_karnak(#[from(world)] world: &SearchWorld) {
    let geocoder = StubGeocoder::new().respond("Karnak", karnak_hits());
    world
        .builder
        .replace(Some(StubGeocoderBuilder::new(geocoder)));
}

#[given("I pass the destination city in both spellings")]
fn pass_city(#[from(world)] world: &SearchWorld) {
    world.cli_args.borrow_mut().extend([
        format!("--{ARG_SEARCH_CITY}"),
        "Luxor".to_owned(),
        format!("--{ARG_SEARCH_CITY_LOCAL}"),
        "الأقصر".to_owned(),
    ]);
}

#[when("I run the search command for Karnak")]
fn run_search_for_karnak(#[from(world)] world: &SearchWorld) {
    world.run(Some("Karnak"));
}

#[when("I run the search command without a query")]
fn run_search_without_query(#[from(world)] world: &SearchWorld) {
    world.run(None);
}

#[then("the command prints only results in Luxor")]
fn prints_luxor_results(#[from(world)] world: &SearchWorld) {
    let borrowed = world.result.borrow();
    borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect("expected success");

    let stdout = world.stdout.borrow();
    let results: Vec<serde_json::Value> =
        serde_json::from_slice(&stdout).expect("output should be a JSON array");
    assert_eq!(results.len(), 2);
    for result in &results {
        let label = result["label"].as_str().expect("label");
        assert!(
            label.contains("Luxor") || label.contains("الأقصر"),
            "{label} is outside Luxor"
        );
    }
}

#[then("the command fails because the query is missing")]
fn fails_missing_query(#[from(world)] world: &SearchWorld) {
    match &*world.error() {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_SEARCH_QUERY),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

macro_rules! register_search_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/search_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: SearchWorld) {
            let _ = world;
        }
    };
}

register_search_scenario!(search_within_city, "searching within a destination city");
register_search_scenario!(search_missing_query, "rejecting a missing query");
