//! Debounced, latest-query-wins search task.

use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::FuturesUnordered;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};

use super::{CityScope, Geocoder, SearchResult, SearchSnapshot, search_once};
use crate::SearchConfig;

#[derive(Debug)]
enum Command {
    Query(String),
    Scope(Option<CityScope>),
    Clear,
}

type Response = (u64, Vec<SearchResult>);

/// Handle to a running place search task.
///
/// Dropping the handle stops the task; responses still in flight are
/// discarded.
///
/// # Examples
/// ```no_run
/// # async fn demo(geocoder: std::sync::Arc<dyn tripmap_core::search::Geocoder>) {
/// use tripmap_core::{PlaceSearch, SearchConfig};
///
/// let search = PlaceSearch::spawn(geocoder, SearchConfig::default());
/// search.set_query("Karnak");
/// let mut updates = search.subscribe();
/// let _ = updates.wait_for(|snapshot| !snapshot.pending).await;
/// println!("{:?}", search.snapshot().results);
/// # }
/// ```
#[derive(Debug)]
pub struct PlaceSearch {
    commands: mpsc::UnboundedSender<Command>,
    publisher: Arc<watch::Sender<SearchSnapshot>>,
    snapshot: watch::Receiver<SearchSnapshot>,
    task: JoinHandle<()>,
}

impl PlaceSearch {
    /// Start the search task on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn spawn(geocoder: Arc<dyn Geocoder>, config: SearchConfig) -> Self {
        let (commands, inbox) = mpsc::unbounded_channel();
        let (publisher, snapshot) = watch::channel(SearchSnapshot::default());
        let publisher = Arc::new(publisher);
        let actor = SearchActor {
            geocoder,
            config,
            query: String::new(),
            scope: None,
            generation: 0,
            publisher: Arc::clone(&publisher),
        };
        let task = tokio::spawn(actor.run(inbox));
        Self {
            commands,
            publisher,
            snapshot,
            task,
        }
    }

    /// Replace the query text. A request fires once the text has been stable
    /// for the debounce window.
    pub fn set_query(&self, text: impl Into<String>) {
        self.send(Command::Query(text.into()));
    }

    /// Replace the city scope and re-run the current query.
    pub fn set_city_scope(&self, scope: Option<CityScope>) {
        self.send(Command::Scope(scope));
    }

    /// Current published state.
    #[must_use]
    pub fn snapshot(&self) -> SearchSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver notified on every published change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.snapshot.clone()
    }

    /// Take the result at `index` and clear the query and results.
    ///
    /// The published snapshot is cleared before this returns, so a result can
    /// be taken at most once. Returns `None` when `index` is out of range.
    pub fn select(&self, index: usize) -> Option<SearchResult> {
        let mut chosen = None;
        self.publisher.send_if_modified(|snapshot| {
            if index >= snapshot.results.len() {
                return false;
            }
            chosen = Some(std::mem::take(&mut snapshot.results).swap_remove(index));
            snapshot.query.clear();
            snapshot.pending = false;
            true
        });
        let chosen = chosen?;
        self.send(Command::Clear);
        Some(chosen)
    }

    /// Stop the task. Equivalent to dropping the handle.
    pub fn shutdown(self) {}

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            log::warn!("place search task is no longer running");
        }
    }
}

impl Drop for PlaceSearch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct SearchActor {
    geocoder: Arc<dyn Geocoder>,
    config: SearchConfig,
    query: String,
    scope: Option<CityScope>,
    generation: u64,
    publisher: Arc<watch::Sender<SearchSnapshot>>,
}

impl SearchActor {
    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Command>) {
        let debounce = sleep(self.config.debounce);
        tokio::pin!(debounce);
        let mut armed = false;
        let mut in_flight: FuturesUnordered<BoxFuture<'static, Response>> =
            FuturesUnordered::new();

        loop {
            tokio::select! {
                command = inbox.recv() => {
                    let Some(command) = command else { break };
                    armed = self.handle(command);
                    if armed {
                        debounce.as_mut().reset(Instant::now() + self.config.debounce);
                    }
                }
                () = &mut debounce, if armed => {
                    armed = false;
                    in_flight.push(self.request());
                }
                Some((generation, results)) = in_flight.next(), if !in_flight.is_empty() => {
                    self.complete(generation, results);
                }
            }
        }
        log::debug!("place search task stopped");
    }

    /// Apply a command. Returns whether a request should be scheduled.
    fn handle(&mut self, command: Command) -> bool {
        self.generation += 1;
        match command {
            Command::Query(text) => self.query = text,
            Command::Scope(scope) => self.scope = scope,
            Command::Clear => self.query.clear(),
        }
        let accepted = self.config.accepts(&self.query);
        let query = self.query.clone();
        self.publisher.send_modify(|snapshot| {
            snapshot.query = query;
            snapshot.pending = accepted;
            if !accepted {
                snapshot.results.clear();
            }
        });
        accepted
    }

    fn request(&self) -> BoxFuture<'static, Response> {
        let geocoder = Arc::clone(&self.geocoder);
        let generation = self.generation;
        let query = self.query.clone();
        let scope = self.scope.clone();
        let config = self.config.clone();
        log::debug!("issuing place search {generation} for {query:?}");
        async move {
            let results = search_once(geocoder.as_ref(), &query, scope.as_ref(), &config).await;
            (generation, results)
        }
        .boxed()
    }

    fn complete(&mut self, generation: u64, results: Vec<SearchResult>) {
        if generation != self.generation {
            log::debug!(
                "discarding stale place search {generation}; current is {}",
                self.generation
            );
            return;
        }
        // A selection clears the snapshot ahead of its queued command.
        let query = &self.query;
        self.publisher.send_if_modified(|snapshot| {
            if snapshot.query != *query {
                return false;
            }
            snapshot.results = results;
            snapshot.pending = false;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LatLng;
    use crate::search::GeocodeHit;
    use crate::test_support::StubGeocoder;
    use std::time::Duration;

    fn karnak() -> GeocodeHit {
        GeocodeHit::new("Karnak Temple, Luxor", LatLng::new(25.7188, 32.6573))
    }

    async fn settled(search: &PlaceSearch, query: &str) -> SearchSnapshot {
        let mut updates = search.subscribe();
        updates
            .wait_for(|snapshot| snapshot.query == query && !snapshot.pending)
            .await
            .expect("search task running")
            .clone()
    }

    #[tokio::test(start_paused = true)]
    async fn typing_within_the_window_issues_one_request() {
        let geocoder = Arc::new(StubGeocoder::new().respond("Karnak", vec![karnak()]));
        let search = PlaceSearch::spawn(geocoder.clone(), SearchConfig::default());

        search.set_query("Kar");
        tokio::time::sleep(Duration::from_millis(100)).await;
        search.set_query("Karn");
        tokio::time::sleep(Duration::from_millis(100)).await;
        search.set_query("Karnak");

        let snapshot = settled(&search, "Karnak").await;
        assert_eq!(snapshot.results.len(), 1);
        assert_eq!(geocoder.queries(), vec!["Karnak".to_owned()]);
    }

    #[tokio::test(start_paused = true)]
    async fn late_response_for_an_old_query_is_discarded() {
        let geocoder = Arc::new(
            StubGeocoder::new()
                .respond("Luxor", vec![GeocodeHit::new("Luxor, Egypt", LatLng::new(25.69, 32.64))])
                .delay("Luxor", Duration::from_secs(3))
                .respond("Luxor temple", vec![karnak()]),
        );
        let search = PlaceSearch::spawn(geocoder.clone(), SearchConfig::default());

        search.set_query("Luxor");
        tokio::time::sleep(Duration::from_millis(600)).await;
        search.set_query("Luxor temple");

        let snapshot = settled(&search, "Luxor temple").await;
        assert_eq!(snapshot.results[0].label, "Karnak Temple, Luxor");

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(search.snapshot().results[0].label, "Karnak Temple, Luxor");
        assert_eq!(
            geocoder.queries(),
            vec!["Luxor".to_owned(), "Luxor temple".to_owned()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn short_queries_clear_without_requesting() {
        let geocoder = Arc::new(StubGeocoder::new().respond("Aswan", vec![karnak()]));
        let search = PlaceSearch::spawn(geocoder.clone(), SearchConfig::default());

        search.set_query("Aswan");
        assert!(!settled(&search, "Aswan").await.results.is_empty());
        search.set_query("As");
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(search.snapshot().results.is_empty());
        assert_eq!(geocoder.queries(), vec!["Aswan".to_owned()]);
    }

    #[tokio::test(start_paused = true)]
    async fn selecting_clears_query_and_results() {
        let geocoder = Arc::new(StubGeocoder::new().respond("Karnak", vec![karnak()]));
        let search = PlaceSearch::spawn(geocoder, SearchConfig::default());
        search.set_query("Karnak");
        settled(&search, "Karnak").await;

        let chosen = search.select(0).expect("one result");
        assert_eq!(chosen.label, "Karnak Temple, Luxor");
        assert!(search.select(3).is_none());

        tokio::time::sleep(Duration::from_millis(10)).await;
        let snapshot = search.snapshot();
        assert!(snapshot.query.is_empty());
        assert!(snapshot.results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn a_result_can_only_be_taken_once() {
        let geocoder = Arc::new(StubGeocoder::new().respond("Karnak", vec![karnak()]));
        let search = PlaceSearch::spawn(geocoder, SearchConfig::default());
        search.set_query("Karnak");
        settled(&search, "Karnak").await;

        assert!(search.select(0).is_some());
        assert!(search.select(0).is_none());
        let snapshot = search.snapshot();
        assert!(snapshot.query.is_empty());
        assert!(snapshot.results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn scope_change_reruns_the_query() {
        let geocoder = Arc::new(StubGeocoder::new().respond(
            "Karnak",
            vec![karnak(), GeocodeHit::new("Karnak, Kerala", LatLng::new(10.0, 76.0))],
        ));
        let search = PlaceSearch::spawn(geocoder.clone(), SearchConfig::default());
        search.set_query("Karnak");
        assert_eq!(settled(&search, "Karnak").await.results.len(), 2);

        search.set_city_scope(Some(CityScope::new("الأقصر", "Luxor")));
        tokio::time::sleep(Duration::from_millis(1)).await;
        let snapshot = settled(&search, "Karnak").await;

        assert_eq!(snapshot.results.len(), 1);
        assert_eq!(geocoder.queries().len(), 2);
    }
}
