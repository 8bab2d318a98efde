use alloc::sync::Arc;
use alloc::vec::Vec;

use recycler::{Dimension, Layout, Orientation};

use crate::WrapGridLayoutManager;
use crate::grid::clamp_to_window;

pub type ItemSizeFn = Arc<dyn Fn(usize) -> Dimension + Send + Sync>;

/// Supplies the expected size of every item and builds layout managers from it.
///
/// Cheap to clone: the size callback is stored in an `Arc`.
#[derive(Clone)]
pub struct LayoutProvider {
    item_size: ItemSizeFn,
    should_refresh_with_anchoring: bool,
}

impl LayoutProvider {
    pub fn new(item_size: impl Fn(usize) -> Dimension + Send + Sync + 'static) -> Self {
        Self {
            item_size: Arc::new(item_size),
            should_refresh_with_anchoring: true,
        }
    }

    /// Whether switching to this provider keeps the first visible item in place.
    ///
    /// Defaults to `true`. Disable it when the new layout does not need the first visible
    /// index preserved.
    pub fn with_refresh_with_anchoring(mut self, enabled: bool) -> Self {
        self.should_refresh_with_anchoring = enabled;
        self
    }

    pub fn should_refresh_with_anchoring(&self) -> bool {
        self.should_refresh_with_anchoring
    }

    /// The size `index` is expected to have before it is measured.
    pub fn item_size(&self, index: usize) -> Dimension {
        (self.item_size)(index)
    }

    /// Builds a grid layout manager for a viewport of size `window`.
    ///
    /// `cached_layouts` seeds the layout table, e.g. with previously measured sizes.
    pub fn new_layout_manager(
        &self,
        window: Dimension,
        orientation: Orientation,
        cached_layouts: Option<Vec<Layout>>,
    ) -> WrapGridLayoutManager {
        match cached_layouts {
            Some(layouts) => {
                WrapGridLayoutManager::with_cached_layouts(self.clone(), window, orientation, layouts)
            }
            None => WrapGridLayoutManager::new(self.clone(), window, orientation),
        }
    }

    /// Returns `true` when a rendered `dimension` disagrees with the expected size of `index`.
    ///
    /// The expected size is clamped to `window` on the cross axis first, the same way the grid
    /// layout clamps it.
    pub fn check_dimension_discrepancy(
        &self,
        dimension: Dimension,
        index: usize,
        window: Dimension,
        orientation: Orientation,
    ) -> bool {
        let expected = clamp_to_window(self.item_size(index), window, orientation);
        expected != dimension
    }

    /// Whether `other` shares this provider's size callback.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.item_size, &other.item_size)
    }
}

impl core::fmt::Debug for LayoutProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayoutProvider")
            .field(
                "should_refresh_with_anchoring",
                &self.should_refresh_with_anchoring,
            )
            .finish_non_exhaustive()
    }
}
