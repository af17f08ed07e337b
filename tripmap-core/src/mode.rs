//! What a click on the map means.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The active interaction mode of the editor.
///
/// Exactly one mode is active at a time. Switching modes never touches
/// location or route data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum InteractionMode {
    /// A click creates a new location.
    #[default]
    PlaceLocation,
    /// A click appends a route vertex.
    DrawRoute,
    /// Clicks are ignored.
    Idle,
}

/// Selector state for [`InteractionMode`].
///
/// There are no timed or automatic transitions: the mode only changes through
/// [`ModeController::set_mode`].
///
/// # Examples
/// ```
/// use tripmap_core::{InteractionMode, ModeController};
///
/// let mut modes = ModeController::new(InteractionMode::PlaceLocation);
/// modes.set_mode(InteractionMode::DrawRoute);
/// assert_eq!(modes.active_mode(), InteractionMode::DrawRoute);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeController {
    active: InteractionMode,
}

impl ModeController {
    /// Start in `initial`.
    #[must_use]
    pub const fn new(initial: InteractionMode) -> Self {
        Self { active: initial }
    }

    /// The currently active mode.
    #[must_use]
    pub const fn active_mode(&self) -> InteractionMode {
        self.active
    }

    /// Make `mode` the active mode.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        if self.active != mode {
            log::debug!("interaction mode {:?} -> {mode:?}", self.active);
        }
        self.active = mode;
    }
}
