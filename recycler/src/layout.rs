use crate::{Dimension, Layout, Point};

/// Supplies the per-index layout table consumed by the renderer.
///
/// How items are placed (list, grid, staggered) is entirely up to the implementation. The only
/// requirement is that leading edges along the scroll axis are non-decreasing by index and that
/// items are contiguous along that axis.
pub trait LayoutManager {
    /// Recomputes layouts from `start_index` onward for a collection of `item_count` items.
    ///
    /// Layouts past `item_count` must be dropped.
    fn relayout_from_index(&mut self, start_index: usize, item_count: usize);

    /// The layout table, one entry per logical index.
    fn layouts(&self) -> &[Layout];

    /// Total size of the laid out content.
    fn content_dimension(&self) -> Dimension;

    /// The scroll offset that puts `index` at the viewport's leading edge.
    fn offset_for_index(&self, index: usize) -> Point {
        self.layouts()
            .get(index)
            .map(|l| Point { x: l.x, y: l.y })
            .unwrap_or_default()
    }

    /// Stores an externally measured size for `index`.
    ///
    /// Returns `true` when the measurement differs from the stored size enough that layouts
    /// after `index` need to be recomputed.
    fn override_layout(&mut self, index: usize, dimension: Dimension) -> bool;
}
