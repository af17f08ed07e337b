//! Client-side city scoping and result capping.
//!
//! Providers handle city restriction unreliably, so scoping happens after the
//! provider call by substring matching on labels and address components.

use super::{GeocodeHit, SearchResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A destination city known by a localized and a transliterated name.
///
/// # Examples
/// ```
/// use tripmap_core::LatLng;
/// use tripmap_core::search::{CityScope, GeocodeHit};
///
/// let luxor = CityScope::new("الأقصر", "Luxor");
/// let hit = GeocodeHit::new("Karnak Temple, LUXOR, Egypt", LatLng::new(25.7, 32.6));
/// assert!(luxor.matches(&hit));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CityScope {
    /// Name in the local script.
    pub localized: String,
    /// Latin transliteration.
    pub transliterated: String,
}

impl CityScope {
    /// Construct a scope from both spellings.
    #[must_use]
    pub fn new(localized: impl Into<String>, transliterated: impl Into<String>) -> Self {
        Self {
            localized: localized.into(),
            transliterated: transliterated.into(),
        }
    }

    fn needles(&self) -> Vec<String> {
        [&self.localized, &self.transliterated]
            .into_iter()
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Whether the hit's label or any address component mentions the city.
    ///
    /// A scope with two blank names matches everything.
    #[must_use]
    pub fn matches(&self, hit: &GeocodeHit) -> bool {
        let needles = self.needles();
        if needles.is_empty() {
            return true;
        }
        std::iter::once(&hit.label)
            .chain(hit.address.values())
            .map(|text| text.to_lowercase())
            .any(|text| needles.iter().any(|needle| text.contains(needle.as_str())))
    }
}

/// Apply the optional city scope, then keep at most `max_results` hits.
#[must_use]
pub fn refine(hits: Vec<GeocodeHit>, scope: Option<&CityScope>, max_results: usize) -> Vec<SearchResult> {
    hits.into_iter()
        .filter(|hit| scope.is_none_or(|scope| scope.matches(hit)))
        .take(max_results)
        .map(SearchResult::from)
        .collect()
}
