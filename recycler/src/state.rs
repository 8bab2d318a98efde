use alloc::vec::Vec;

use crate::Window;

/// A serializable snapshot of a [`crate::ViewabilityTracker`].
///
/// Useful for debugging overlays and for asserting tracker state without holding a borrow of
/// the renderer.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackerSnapshot {
    /// Logically corrected offset the windows were computed at.
    pub offset: f64,
    /// Last offset reported by the scroll surface.
    pub actual_offset: f64,
    pub render_ahead_offset: f64,
    pub visible_window: Window,
    pub engaged_window: Window,
    pub visible_indexes: Vec<usize>,
    pub engaged_indexes: Vec<usize>,
}
