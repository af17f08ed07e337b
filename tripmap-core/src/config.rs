//! Tunables for the editor session and the place search.

use std::time::Duration;

use crate::InteractionMode;

/// Default quiet period before a search request is issued.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
/// Default number of results shown to the user.
pub const DEFAULT_MAX_RESULTS: usize = 5;
/// Default number of hits requested from the provider before filtering.
pub const DEFAULT_PROVIDER_LIMIT: usize = 10;
/// Default minimum query length (in characters) that triggers a request.
pub const DEFAULT_MIN_QUERY_CHARS: usize = 3;
/// Default zoom used when focusing a single location.
pub const DEFAULT_FOCUS_ZOOM: f64 = 14.0;

/// Configuration for [`crate::PlaceSearch`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use tripmap_core::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_debounce(Duration::from_millis(250))
///     .with_country("eg");
/// assert_eq!(config.max_results, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a request fires.
    pub debounce: Duration,
    /// Results kept after city filtering.
    pub max_results: usize,
    /// Hits requested from the provider.
    pub provider_limit: usize,
    /// Queries shorter than this clear the results instead of searching.
    pub min_query_chars: usize,
    /// Optional country hint forwarded to the provider.
    pub country: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            max_results: DEFAULT_MAX_RESULTS,
            provider_limit: DEFAULT_PROVIDER_LIMIT,
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
            country: None,
        }
    }
}

impl SearchConfig {
    /// Override the debounce window.
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Override the number of results shown.
    #[must_use]
    pub const fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Override the number of hits requested from the provider.
    #[must_use]
    pub const fn with_provider_limit(mut self, provider_limit: usize) -> Self {
        self.provider_limit = provider_limit;
        self
    }

    /// Override the minimum query length.
    #[must_use]
    pub const fn with_min_query_chars(mut self, min_query_chars: usize) -> Self {
        self.min_query_chars = min_query_chars;
        self
    }

    /// Restrict provider results to a country.
    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub(crate) fn accepts(&self, query: &str) -> bool {
        query.trim().chars().count() >= self.min_query_chars
    }
}

/// Configuration for [`crate::EditorSession`].
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Mode active when the session opens.
    pub initial_mode: InteractionMode,
    /// Zoom used by [`crate::EditorSession::focus_location`].
    pub focus_zoom: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            initial_mode: InteractionMode::default(),
            focus_zoom: DEFAULT_FOCUS_ZOOM,
        }
    }
}

impl EditorConfig {
    /// Override the initial mode.
    #[must_use]
    pub const fn with_initial_mode(mut self, mode: InteractionMode) -> Self {
        self.initial_mode = mode;
        self
    }

    /// Override the focus zoom.
    #[must_use]
    pub const fn with_focus_zoom(mut self, zoom: f64) -> Self {
        self.focus_zoom = zoom;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Lu", false)]
    #[case("Lux", true)]
    #[case("  Lu  ", false)]
    #[case("الأق", true)]
    fn minimum_length_counts_characters(#[case] query: &str, #[case] accepted: bool) {
        assert_eq!(SearchConfig::default().accepts(query), accepted);
    }

    #[rstest]
    fn editor_defaults_to_placing_locations() {
        assert_eq!(
            EditorConfig::default().initial_mode,
            InteractionMode::PlaceLocation
        );
    }
}
